//! Outbound interface to the rendering and physics backend.
//!
//! The terrain never owns GPU or physics objects; it asks the sink to create
//! them and keeps only the returned ids, indexed by chunk.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Quat, Vec3};
use terrace_core::tile::TileRect;
use terrace_core::ChunkCoord;

use crate::mesh::MeshData;

/// Backend id of one chunk's surface (top mesh, side mesh and atlas texture).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// Backend id of a composite autotile image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeId(pub u64);

/// Backend id of a static collider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub u64);

/// Which mesh of a chunk surface a mesh upload targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshPart {
    Top,
    Side,
}

/// An image the sink can draw from or into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageKey {
    /// A source image by asset name.
    Source(String),
    /// A composite image built by the autotile registry.
    Composite(CompositeId),
    /// The texture atlas of a chunk surface.
    Atlas(SurfaceId),
}

/// Identity of a chunk surface request.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceRequest<'a> {
    pub terrain: &'a str,
    pub chunk: ChunkCoord,
    /// World-space origin of the chunk's local mesh coordinates.
    pub origin: Vec3,
    /// Atlas edge length in pixels.
    pub atlas_px: u32,
}

pub trait TerrainSink {
    /// Create the surface for a chunk, or return the one already created for it.
    fn create_or_get_chunk_surface(&mut self, request: &SurfaceRequest<'_>) -> SurfaceId;

    fn apply_mesh_data(&mut self, surface: SurfaceId, part: MeshPart, data: &MeshData);

    /// Allocate a blank image of the given pixel size.
    fn create_composite_image(&mut self, width: u32, height: u32) -> CompositeId;

    fn draw_tile_image(&mut self, target: &ImageKey, source: &ImageKey, src: TileRect, dst: TileRect);

    /// Fill a rect with a flat colour (fallback for missing tiles).
    fn fill_tile(&mut self, target: &ImageKey, dst: TileRect, rgba: [u8; 4]);

    /// Upload a chunk atlas after a batch of draws.
    fn flush_atlas(&mut self, surface: SurfaceId);

    fn create_static_box_collider(
        &mut self,
        position: Vec3,
        scaling: Vec3,
        rotation: Option<Quat>,
    ) -> ColliderId;

    fn dispose_collider(&mut self, collider: ColliderId);

    fn translate_surface(&mut self, surface: SurfaceId, delta: Vec3);

    fn translate_collider(&mut self, collider: ColliderId, delta: Vec3);

    fn set_surface_visibility(&mut self, surface: SurfaceId, visible: bool, opacity: f32);

    fn dispose_chunk_surface(&mut self, surface: SurfaceId);
}

/// Sink that hands out ids and discards everything else. Useful headless.
#[derive(Debug, Default)]
pub struct NullSink {
    next_id: u64,
}

impl NullSink {
    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl TerrainSink for NullSink {
    fn create_or_get_chunk_surface(&mut self, _request: &SurfaceRequest<'_>) -> SurfaceId {
        SurfaceId(self.next())
    }

    fn apply_mesh_data(&mut self, _surface: SurfaceId, _part: MeshPart, _data: &MeshData) {}

    fn create_composite_image(&mut self, _width: u32, _height: u32) -> CompositeId {
        CompositeId(self.next())
    }

    fn draw_tile_image(&mut self, _: &ImageKey, _: &ImageKey, _: TileRect, _: TileRect) {}

    fn fill_tile(&mut self, _: &ImageKey, _: TileRect, _: [u8; 4]) {}

    fn flush_atlas(&mut self, _surface: SurfaceId) {}

    fn create_static_box_collider(&mut self, _: Vec3, _: Vec3, _: Option<Quat>) -> ColliderId {
        ColliderId(self.next())
    }

    fn dispose_collider(&mut self, _collider: ColliderId) {}

    fn translate_surface(&mut self, _surface: SurfaceId, _delta: Vec3) {}

    fn translate_collider(&mut self, _collider: ColliderId, _delta: Vec3) {}

    fn set_surface_visibility(&mut self, _surface: SurfaceId, _visible: bool, _opacity: f32) {}

    fn dispose_chunk_surface(&mut self, _surface: SurfaceId) {}
}

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkOp {
    CreateSurface { id: SurfaceId, terrain: String, chunk: ChunkCoord },
    Mesh { surface: SurfaceId, part: MeshPart, vertices: usize, indices: usize },
    CreateComposite { id: CompositeId, width: u32, height: u32 },
    Draw { target: ImageKey, source: ImageKey, src: TileRect, dst: TileRect },
    Fill { target: ImageKey, dst: TileRect },
    Flush { surface: SurfaceId },
    CreateCollider { id: ColliderId, position: Vec3, scaling: Vec3 },
    DisposeCollider { id: ColliderId },
    TranslateSurface { surface: SurfaceId, delta: Vec3 },
    TranslateCollider { collider: ColliderId, delta: Vec3 },
    Visibility { surface: SurfaceId, visible: bool, opacity: f32 },
    DisposeSurface { surface: SurfaceId },
}

/// Sink that logs every call into a shared list. Clones share the same log,
/// so a test can keep one clone while the world owns the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    ops: Rc<RefCell<Vec<SinkOp>>>,
    surfaces: Rc<RefCell<Vec<(String, ChunkCoord, SurfaceId)>>>,
    next_id: Rc<RefCell<u64>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u64 {
        let mut id = self.next_id.borrow_mut();
        *id += 1;
        *id
    }

    fn push(&self, op: SinkOp) {
        self.ops.borrow_mut().push(op);
    }

    pub fn ops(&self) -> Vec<SinkOp> {
        self.ops.borrow().clone()
    }

    pub fn clear(&self) {
        self.ops.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&SinkOp) -> bool) -> usize {
        self.ops.borrow().iter().filter(|op| pred(op)).count()
    }

    pub fn flush_count(&self) -> usize {
        self.count(|op| matches!(op, SinkOp::Flush { .. }))
    }

    pub fn live_colliders(&self) -> usize {
        let created = self.count(|op| matches!(op, SinkOp::CreateCollider { .. }));
        let disposed = self.count(|op| matches!(op, SinkOp::DisposeCollider { .. }));
        created - disposed
    }
}

impl TerrainSink for RecordingSink {
    fn create_or_get_chunk_surface(&mut self, request: &SurfaceRequest<'_>) -> SurfaceId {
        let existing = self
            .surfaces
            .borrow()
            .iter()
            .find(|(t, c, _)| t == request.terrain && *c == request.chunk)
            .map(|(_, _, id)| *id);
        if let Some(id) = existing {
            return id;
        }
        let id = SurfaceId(self.next());
        self.surfaces
            .borrow_mut()
            .push((request.terrain.to_string(), request.chunk, id));
        self.push(SinkOp::CreateSurface {
            id,
            terrain: request.terrain.to_string(),
            chunk: request.chunk,
        });
        id
    }

    fn apply_mesh_data(&mut self, surface: SurfaceId, part: MeshPart, data: &MeshData) {
        self.push(SinkOp::Mesh {
            surface,
            part,
            vertices: data.vertex_count(),
            indices: data.indices.len(),
        });
    }

    fn create_composite_image(&mut self, width: u32, height: u32) -> CompositeId {
        let id = CompositeId(self.next());
        self.push(SinkOp::CreateComposite { id, width, height });
        id
    }

    fn draw_tile_image(&mut self, target: &ImageKey, source: &ImageKey, src: TileRect, dst: TileRect) {
        self.push(SinkOp::Draw {
            target: target.clone(),
            source: source.clone(),
            src,
            dst,
        });
    }

    fn fill_tile(&mut self, target: &ImageKey, dst: TileRect, _rgba: [u8; 4]) {
        self.push(SinkOp::Fill {
            target: target.clone(),
            dst,
        });
    }

    fn flush_atlas(&mut self, surface: SurfaceId) {
        self.push(SinkOp::Flush { surface });
    }

    fn create_static_box_collider(
        &mut self,
        position: Vec3,
        scaling: Vec3,
        _rotation: Option<Quat>,
    ) -> ColliderId {
        let id = ColliderId(self.next());
        self.push(SinkOp::CreateCollider {
            id,
            position,
            scaling,
        });
        id
    }

    fn dispose_collider(&mut self, collider: ColliderId) {
        self.push(SinkOp::DisposeCollider { id: collider });
    }

    fn translate_surface(&mut self, surface: SurfaceId, delta: Vec3) {
        self.push(SinkOp::TranslateSurface { surface, delta });
    }

    fn translate_collider(&mut self, collider: ColliderId, delta: Vec3) {
        self.push(SinkOp::TranslateCollider { collider, delta });
    }

    fn set_surface_visibility(&mut self, surface: SurfaceId, visible: bool, opacity: f32) {
        self.push(SinkOp::Visibility {
            surface,
            visible,
            opacity,
        });
    }

    fn dispose_chunk_surface(&mut self, surface: SurfaceId) {
        self.surfaces.borrow_mut().retain(|(_, _, id)| *id != surface);
        self.push(SinkOp::DisposeSurface { surface });
    }
}
