use std::rc::Rc;
use std::time::Instant;

use glam::Vec3;
use terrace_core::constants::REBUILD_DELAY_MS;
use terrace_world::clock::ManualClock;
use terrace_world::config::TerrainConfig;
use terrace_world::loader::load_all_tiles;
use terrace_world::sink::NullSink;
use terrace_world::TerrainWorld;

use crate::scenes::{generate_stroke, SceneConfig};

/// Timing data for a single benchmark run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Result of a single scene benchmark.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    pub scene_name: String,
    pub edits: u32,
    pub chunk_count: u32,
    pub block_count: usize,
    /// Size of the scene's saved JSON.
    pub saved_bytes: usize,
    /// Time from stroke end to rebuilt geometry, one sample per stroke.
    pub timings: TimingSeries,
}

/// Runs paint scenes headless against a null sink.
pub struct BenchmarkRunner {
    stroke_scale: f32,
}

const TERRAIN_RON: &str = include_str!("../../../data/tiles/terrain.ron");

impl BenchmarkRunner {
    /// `stroke_scale` multiplies every scene's stroke count.
    pub fn new(stroke_scale: f32) -> Self {
        Self {
            stroke_scale: stroke_scale.max(0.01),
        }
    }

    /// Run a single benchmark scene and return timing results.
    pub fn run_scene(&self, config: &SceneConfig) -> Result<BenchmarkResult, String> {
        let strokes = ((config.strokes as f32 * self.stroke_scale).ceil() as u32).max(1);
        log::info!("Running scene '{}' ({} strokes)...", config.name, strokes);

        let tiles = load_all_tiles(&[TERRAIN_RON]).map_err(|e| e.to_string())?;
        let clock = Rc::new(ManualClock::new(0));
        let mut world = TerrainWorld::new(tiles, Box::new(NullSink::default()), clock.clone());
        world
            .add_terrain("bench", TerrainConfig::new(1.0, config.chunk_size), Vec3::ZERO)
            .map_err(|e| e.to_string())?;

        let mut times = Vec::with_capacity(strokes as usize);
        let mut edits = 0u32;
        for stroke in 0..strokes {
            for (x, z, patch) in generate_stroke(config, stroke) {
                world
                    .set_pixel("bench", x, z, &patch)
                    .map_err(|e| e.to_string())?;
                edits += 1;
            }
            clock.advance(REBUILD_DELAY_MS);
            let start = Instant::now();
            world.update();
            times.push(start.elapsed().as_secs_f64() * 1000.0);
            world.drain_events();
        }

        let terrain = world.terrain("bench").ok_or("bench terrain vanished")?;
        let chunk_count = terrain.chunks().loaded_count();
        let block_count = terrain
            .chunks()
            .sorted_coords()
            .into_iter()
            .map(|c| terrain.blocks(c).len())
            .sum();
        let map = terrace_persist::MapData {
            terrains: world.serialize(),
            ..Default::default()
        };
        let saved_bytes = terrace_persist::save(&map).map_err(|e| e.to_string())?.len();

        Ok(BenchmarkResult {
            scene_name: config.name.to_string(),
            edits,
            chunk_count,
            block_count,
            saved_bytes,
            timings: compute_timings(&times),
        })
    }
}

/// Compute timing statistics from a list of rebuild times in milliseconds.
fn compute_timings(times: &[f64]) -> TimingSeries {
    if times.is_empty() {
        return TimingSeries {
            mean_ms: 0.0,
            median_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        };
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let p95_idx = ((n as f64) * 0.95).ceil() as usize;
    let p99_idx = ((n as f64) * 0.99).ceil() as usize;

    TimingSeries {
        mean_ms: mean,
        median_ms: median,
        p95_ms: sorted[p95_idx.min(n - 1)],
        p99_ms: sorted[p99_idx.min(n - 1)],
        min_ms: sorted[0],
        max_ms: sorted[n - 1],
    }
}
