//! Geometry derived from merged blocks: top surfaces, side walls, colliders.
//!
//! All positions are chunk-local in world units; the surface origin carries the
//! terrain position and chunk offset.

use glam::{IVec2, Vec3};
use terrace_core::direction::CARDINAL_DIRECTIONS;
use terrace_core::tile::TileRect;

use crate::merge::Block;

/// Vertex buffers handed to the sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Append a quad given counter-clockwise corners as seen from its front.
    fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3, uvs: [[f32; 2]; 4]) {
        let base = self.positions.len() as u32;
        for (corner, uv) in corners.iter().zip(uvs) {
            self.positions.push(corner.to_array());
            self.normals.push(normal.to_array());
            self.uvs.push(uv);
        }
        self.indices
            .extend([0, 1, 2, 0, 2, 3].iter().map(|i| base + i));
    }
}

/// Top faces of every block, textured from the chunk atlas (uv = cell / n).
pub fn top_mesh(blocks: &[Block], n: i32, unit: f32) -> MeshData {
    let mut mesh = MeshData::default();
    let n = n as f32;
    for b in blocks {
        let y = b.h1 as f32 * unit;
        let (u0, u1, v0, v1) = (b.u0 as f32, b.u1 as f32, b.v0 as f32, b.v1 as f32);
        // Looking down +y the corners run (u0,v0) (u0,v1) (u1,v1) (u1,v0).
        let corners = [
            Vec3::new(u0 * unit, y, v0 * unit),
            Vec3::new(u0 * unit, y, v1 * unit),
            Vec3::new(u1 * unit, y, v1 * unit),
            Vec3::new(u1 * unit, y, v0 * unit),
        ];
        let uvs = [[u0 / n, v0 / n], [u0 / n, v1 / n], [u1 / n, v1 / n], [u1 / n, v0 / n]];
        mesh.push_quad(corners, Vec3::Y, uvs);
    }
    mesh
}

/// One unit of vertical wall on a block edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideQuad {
    /// Chunk-local cell the wall belongs to.
    pub cell: IVec2,
    /// Outward direction as a cell offset.
    pub facing: IVec2,
    /// Bottom of the unit step; the quad spans `[y, y + 1)`.
    pub y: i32,
}

/// Walls along block edges wherever the outward neighbour is lower.
///
/// `height_at` is asked for chunk-local coordinates, including ones just
/// outside `[0, n)` which belong to neighbouring chunks. Steps below the
/// block's own floor are covered by the block underneath and are skipped.
pub fn side_quads(blocks: &[Block], height_at: impl Fn(IVec2) -> i32) -> Vec<SideQuad> {
    let mut quads = Vec::new();
    for b in blocks {
        for dir in CARDINAL_DIRECTIONS {
            let facing = dir.offset();
            for cell in edge_cells(b, facing) {
                let nh = height_at(cell + facing);
                for y in nh.max(b.h0)..b.h1 {
                    quads.push(SideQuad { cell, facing, y });
                }
            }
        }
    }
    quads
}

/// Cells of `b` on the edge facing `facing`.
fn edge_cells(b: &Block, facing: IVec2) -> Vec<IVec2> {
    match (facing.x, facing.y) {
        (1, _) => (b.v0..b.v1).map(|v| IVec2::new(b.u1 - 1, v)).collect(),
        (-1, _) => (b.v0..b.v1).map(|v| IVec2::new(b.u0, v)).collect(),
        (_, 1) => (b.u0..b.u1).map(|u| IVec2::new(u, b.v1 - 1)).collect(),
        _ => (b.u0..b.u1).map(|u| IVec2::new(u, b.v0)).collect(),
    }
}

/// Wall mesh for `quads`. Uvs are pixel coordinates inside the tile returned by
/// `texture_of` for the wall's cell.
pub fn side_mesh(quads: &[SideQuad], unit: f32, texture_of: impl Fn(IVec2) -> TileRect) -> MeshData {
    let mut mesh = MeshData::default();
    for q in quads {
        let normal = Vec3::new(q.facing.x as f32, 0.0, q.facing.y as f32);
        // Viewer's right when facing the wall from outside.
        let right = Vec3::new(normal.z, 0.0, -normal.x);
        let centre = Vec3::new(q.cell.x as f32 + 0.5, 0.0, q.cell.y as f32 + 0.5);
        let mid = centre + normal * 0.5;
        let left_end = (mid - right * 0.5) * unit;
        let right_end = (mid + right * 0.5) * unit;
        let y0 = Vec3::Y * (q.y as f32 * unit);
        let y1 = Vec3::Y * ((q.y + 1) as f32 * unit);
        let corners = [left_end + y0, right_end + y0, right_end + y1, left_end + y1];

        let r = texture_of(q.cell);
        let (x0, x1) = (r.x as f32, (r.x + r.w) as f32);
        let (t0, t1) = (r.y as f32, (r.y + r.h) as f32);
        mesh.push_quad(corners, normal, [[x0, t1], [x1, t1], [x1, t0], [x0, t0]]);
    }
    mesh
}

/// Axis-aligned box collider for one block, chunk-local.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderBox {
    pub center: Vec3,
    pub scaling: Vec3,
}

pub fn collider_box(b: &Block, unit: f32) -> ColliderBox {
    let min = Vec3::new(b.u0 as f32, b.h0 as f32, b.v0 as f32);
    let max = Vec3::new(b.u1 as f32, b.h1 as f32, b.v1 as f32);
    ColliderBox {
        center: (min + max) * 0.5 * unit,
        scaling: (max - min) * unit,
    }
}
