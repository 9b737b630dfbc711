use terrace_core::types::{CellPatch, HeightPatch, TileId};

/// What a stroke does to the cells it passes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeKind {
    /// Tile changes only: exercises autotile redraws.
    Paint,
    /// `+1` height steps: exercises merging, walls and colliders.
    Raise,
    /// Tile and absolute height together, building terraces.
    Terrace,
}

/// Configuration for a single benchmark scene.
pub struct SceneConfig {
    pub name: &'static str,
    /// World units per chunk side, with unit-size cells.
    pub chunk_size: f32,
    /// Side of the square region strokes wander over, in cells.
    pub extent: i32,
    pub strokes: u32,
    pub stroke_len: u32,
    pub kind: StrokeKind,
}

/// Return the standard suite of benchmark scenes (small brush to whole-map edits).
pub fn standard_scenes() -> Vec<SceneConfig> {
    vec![
        SceneConfig {
            name: "paint-16",
            chunk_size: 16.0,
            extent: 64,
            strokes: 60,
            stroke_len: 24,
            kind: StrokeKind::Paint,
        },
        SceneConfig {
            name: "raise-16",
            chunk_size: 16.0,
            extent: 64,
            strokes: 60,
            stroke_len: 24,
            kind: StrokeKind::Raise,
        },
        SceneConfig {
            name: "terrace-32",
            chunk_size: 32.0,
            extent: 128,
            strokes: 40,
            stroke_len: 64,
            kind: StrokeKind::Terrace,
        },
        SceneConfig {
            name: "terrace-64",
            chunk_size: 64.0,
            extent: 256,
            strokes: 20,
            stroke_len: 256,
            kind: StrokeKind::Terrace,
        },
    ]
}

fn hash(a: u32, b: u32) -> u32 {
    a.wrapping_mul(31337) ^ b.wrapping_mul(7919) ^ (a.wrapping_add(b) >> 3)
}

/// Deterministic random-walk stroke: a list of cell edits.
pub fn generate_stroke(config: &SceneConfig, stroke: u32) -> Vec<(i32, i32, CellPatch)> {
    let extent = config.extent.max(1);
    let mut x = (hash(stroke, 1) % extent as u32) as i32;
    let mut z = (hash(stroke, 2) % extent as u32) as i32;
    let tile = TileId(1 + (hash(stroke, 3) % 5) as u16);
    let level = (hash(stroke, 4) % 6) as i32;

    let mut edits = Vec::with_capacity(config.stroke_len as usize);
    for step in 0..config.stroke_len {
        let patch = match config.kind {
            StrokeKind::Paint => CellPatch::tile(tile),
            StrokeKind::Raise => CellPatch::height(HeightPatch::Relative(1)),
            StrokeKind::Terrace => CellPatch::tile(tile).with_height(level),
        };
        edits.push((x, z, patch));
        match hash(stroke, step + 10) % 4 {
            0 => x += 1,
            1 => x -= 1,
            2 => z += 1,
            _ => z -= 1,
        }
        x = x.rem_euclid(extent);
        z = z.rem_euclid(extent);
    }
    edits
}
