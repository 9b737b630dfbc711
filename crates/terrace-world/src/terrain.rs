use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use glam::{IVec2, Vec3};
use terrace_core::constants::TILE_PX;
use terrace_core::math::{cell_to_local, chunk_local_to_cell, local_index, world_to_cell};
use terrace_core::tile::{AutotileKind, TileRect, TileTable};
use terrace_core::types::{chunk_key, parse_chunk_key, Cell, CellCoord, CellPatch, ChunkCoord, TileId};
use terrace_core::TerraceError;
use terrace_persist::{ChunkData, TerrainData};

use crate::autotile::{neighbor_mask, AutotileRegistry, TileImage};
use crate::chunk::{Chunk, ChunkHandles, DrawnTile};
use crate::chunk_map::ChunkMap;
use crate::clock::Clock;
use crate::config::TerrainConfig;
use crate::dirty::{DirtyBatch, DirtySet};
use crate::error::WorldError;
use crate::events::TerrainEvent;
use crate::merge::{baseline_for, merge_blocks, Block};
use crate::mesh::{collider_box, side_mesh, side_quads, top_mesh};
use crate::sink::{ImageKey, MeshPart, SurfaceId, SurfaceRequest, TerrainSink};
use crate::throttle::RebuildThrottle;

/// One named heightmap terrain: cell data, backend handles per chunk, and the
/// pending rebuild state.
///
/// Heights are stored relative to the terrain's vertical offset
/// (`round(position.y / unit_size)`); every public cell value is a world height.
pub struct Terrain {
    id: String,
    config: TerrainConfig,
    position: Vec3,
    chunks: ChunkMap,
    handles: HashMap<ChunkCoord, ChunkHandles>,
    tiles: Rc<TileTable>,
    dirty: DirtySet,
    throttle: RebuildThrottle,
    clock: Rc<dyn Clock>,
    visible: bool,
    opacity: f32,
    events: Vec<TerrainEvent>,
}

impl Terrain {
    pub fn new(
        id: &str,
        config: TerrainConfig,
        position: Vec3,
        tiles: Rc<TileTable>,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, TerraceError> {
        config.validate()?;
        let fill = Cell::new(TileId::EMPTY, config.min_height);
        Ok(Self {
            id: id.to_string(),
            config,
            position,
            chunks: ChunkMap::new(config.chunk_units(), fill),
            handles: HashMap::new(),
            tiles,
            dirty: DirtySet::new(),
            throttle: RebuildThrottle::new(config.rebuild_delay_ms),
            clock,
            visible: true,
            opacity: 1.0,
            events: Vec::new(),
        })
    }

    /// Restore a terrain from its persisted form. Every restored chunk is
    /// queued for a full rebuild.
    pub fn from_data(
        id: &str,
        data: &TerrainData,
        tiles: Rc<TileTable>,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, WorldError> {
        let config = TerrainConfig::new(data.unit, data.size);
        let position = Vec3::new(data.x, data.y, data.z);
        let mut terrain = Self::new(id, config, position, tiles, clock)?;
        let n = terrain.chunk_units();
        for (key, chunk_data) in &data.chunks {
            let coord = parse_chunk_key(key)?;
            let (tiles, heights) = chunk_data.decode(key, config.cells_per_chunk())?;
            terrain.chunks.insert(Chunk::from_layers(coord, n, &tiles, &heights));
            terrain.on_chunk_created(coord);
        }
        log::info!("terrain {id}: restored {} chunks", data.chunks.len());
        Ok(terrain)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn chunk_units(&self) -> i32 {
        self.config.chunk_units()
    }

    /// Vertical offset added to stored heights.
    pub fn height_offset(&self) -> i32 {
        (self.position.y / self.config.unit_size).round() as i32
    }

    pub fn chunks(&self) -> &ChunkMap {
        &self.chunks
    }

    pub fn handles(&self, chunk: ChunkCoord) -> Option<&ChunkHandles> {
        self.handles.get(&chunk)
    }

    /// Blocks from the last merge of `chunk`.
    pub fn blocks(&self, chunk: ChunkCoord) -> &[Block] {
        self.handles
            .get(&chunk)
            .map(|h| h.blocks.as_slice())
            .unwrap_or(&[])
    }

    /// What the atlas currently shows for a cell, if drawn.
    pub fn drawn_tile(&self, cell: CellCoord) -> Option<DrawnTile> {
        let n = self.chunk_units();
        let handles = self.handles.get(&self.chunks.chunk_of(cell))?;
        handles.drawn[local_index(cell_to_local(cell, n), n)]
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn pending(&self) -> &DirtySet {
        &self.dirty
    }

    pub fn is_rebuild_scheduled(&self) -> bool {
        self.throttle.is_armed()
    }

    /// Cell under a world-space (x, z) position.
    pub fn cell_at(&self, x: f32, z: f32) -> CellCoord {
        world_to_cell(x, z, self.position.x, self.position.z, self.config.unit_size)
    }

    fn to_world(&self, cell: Cell) -> Cell {
        Cell::new(cell.tile, cell.height.saturating_add(self.height_offset()))
    }

    fn on_chunk_created(&mut self, chunk: ChunkCoord) {
        log::debug!("terrain {}: chunk {} loaded", self.id, chunk_key(chunk));
        self.events.push(TerrainEvent::ChunkLoaded {
            terrain: self.id.clone(),
            chunk,
        });
        self.dirty.mark_chunk(chunk);
        self.schedule_rebuild();
    }

    fn schedule_rebuild(&mut self) {
        if self.throttle.arm(self.clock.now_ms()) {
            log::trace!("terrain {}: rebuild scheduled", self.id);
        }
    }

    /// Read a cell in world height, creating its chunk if absent.
    pub fn get_pixel(&mut self, x: i32, z: i32) -> Cell {
        let cell = IVec2::new(x, z);
        let (value, created) = self.chunks.cell(cell);
        if created {
            self.on_chunk_created(self.chunks.chunk_of(cell));
        }
        self.to_world(value)
    }

    /// Read a cell in world height without creating anything.
    pub fn peek_pixel(&self, x: i32, z: i32) -> Cell {
        self.to_world(self.chunks.peek_cell(IVec2::new(x, z)))
    }

    /// Apply `patch` to a cell and return the result in world height.
    ///
    /// Heights below `min_height` are clamped. Only an actual change marks the
    /// cell dirty and schedules a rebuild.
    pub fn set_pixel(&mut self, x: i32, z: i32, patch: &CellPatch) -> Cell {
        let cell = IVec2::new(x, z);
        let chunk = self.chunks.chunk_of(cell);
        let (current, created) = self.chunks.cell(cell);
        if created {
            self.on_chunk_created(chunk);
        }

        let offset = self.height_offset();
        let mut next = current;
        if let Some(tile) = patch.tile {
            next.tile = tile;
        }
        if let Some(height) = patch.height {
            let world = height.resolve(current.height.saturating_add(offset));
            next.height = world.saturating_sub(offset).max(self.config.min_height);
        }

        if next != current {
            self.chunks.set_cell(cell, next);
            self.dirty.mark_texture(cell);
            if next.height != current.height {
                let n = self.chunk_units();
                self.dirty.mark_height(chunk, cell_to_local(cell, n), n);
            }
            self.schedule_rebuild();
        }
        self.to_world(next)
    }

    /// Run the pending rebuild if its window has elapsed. Returns true if it ran.
    pub fn update(&mut self, sink: &mut dyn TerrainSink, registry: &mut AutotileRegistry) -> bool {
        if !self.throttle.poll(self.clock.now_ms()) {
            return false;
        }
        self.rebuild(sink, registry);
        true
    }

    /// Rebuild now, regardless of the throttle.
    pub fn flush(&mut self, sink: &mut dyn TerrainSink, registry: &mut AutotileRegistry) {
        self.throttle.clear();
        self.rebuild(sink, registry);
    }

    fn rebuild(&mut self, sink: &mut dyn TerrainSink, registry: &mut AutotileRegistry) {
        let batch = self.dirty.take();
        if batch.is_empty() {
            return;
        }
        let redrawn = self.redraw_textures(&batch, sink, registry);
        let mut merged = Vec::new();
        for &chunk in &batch.height_chunks {
            if self.remerge(chunk, sink) {
                merged.push(chunk);
            }
        }
        let walls = self.rebuild_sides(&batch, &mut merged, sink);
        merged.sort_by_key(|c| (c.x, c.y));

        log::debug!(
            "terrain {}: rebuilt {} cells, {} merged chunks, {} wall meshes",
            self.id,
            redrawn,
            merged.len(),
            walls
        );
        if redrawn > 0 {
            self.events.push(TerrainEvent::TileUpdated {
                terrain: self.id.clone(),
            });
        }
        if !merged.is_empty() {
            self.events.push(TerrainEvent::HeightUpdated {
                terrain: self.id.clone(),
                chunks: merged,
            });
        }
    }

    fn chunk_origin(&self, chunk: ChunkCoord) -> Vec3 {
        let size = self.chunk_units() as f32 * self.config.unit_size;
        self.position + Vec3::new(chunk.x as f32 * size, 0.0, chunk.y as f32 * size)
    }

    fn ensure_surface(&mut self, chunk: ChunkCoord, sink: &mut dyn TerrainSink) -> SurfaceId {
        let n = self.chunk_units();
        let origin = self.chunk_origin(chunk);
        let handles = self
            .handles
            .entry(chunk)
            .or_insert_with(|| ChunkHandles::new((n * n) as usize));
        if let Some(surface) = handles.surface {
            return surface;
        }
        let surface = sink.create_or_get_chunk_surface(&SurfaceRequest {
            terrain: &self.id,
            chunk,
            origin,
            atlas_px: n as u32 * TILE_PX,
        });
        handles.surface = Some(surface);
        sink.set_surface_visibility(surface, self.visible, self.opacity);
        surface
    }

    /// Redraw dirty cells whose (tile, mask) differs from the atlas, flushing
    /// each touched atlas once. Cells of absent chunks are skipped.
    fn redraw_textures(
        &mut self,
        batch: &DirtyBatch,
        sink: &mut dyn TerrainSink,
        registry: &mut AutotileRegistry,
    ) -> usize {
        let n = self.chunk_units();
        let mut per_chunk: BTreeMap<(i32, i32), Vec<IVec2>> = BTreeMap::new();
        for &chunk in &batch.texture_chunks {
            if !self.chunks.contains(&chunk) {
                continue;
            }
            if let Some(handles) = self.handles.get_mut(&chunk) {
                handles.drawn.fill(None);
            }
            let locals = per_chunk.entry((chunk.x, chunk.y)).or_default();
            for u in 0..n {
                for v in 0..n {
                    locals.push(IVec2::new(u, v));
                }
            }
        }
        for &cell in &batch.texture_cells {
            let chunk = self.chunks.chunk_of(cell);
            if self.chunks.contains(&chunk) {
                per_chunk
                    .entry((chunk.x, chunk.y))
                    .or_default()
                    .push(cell_to_local(cell, n));
            }
        }

        let mut redrawn = 0;
        for ((i, j), locals) in per_chunk {
            let chunk = IVec2::new(i, j);
            let surface = self.ensure_surface(chunk, sink);
            let atlas = ImageKey::Atlas(surface);
            let Some(handles) = self.handles.get_mut(&chunk) else {
                continue;
            };
            let mut touched = false;
            for local in locals {
                let global = chunk_local_to_cell(chunk, local, n);
                let center = self.chunks.peek_cell(global);
                let mask = neighbor_mask(center, |dir| self.chunks.peek_cell(global + dir.offset()));
                let drawn = DrawnTile {
                    tile: center.tile,
                    mask,
                };
                let idx = local_index(local, n);
                if handles.drawn[idx] == Some(drawn) {
                    continue;
                }
                let dst = TileRect::tile_at(local.x as u32 * TILE_PX, local.y as u32 * TILE_PX);
                match registry.resolve(&self.tiles, center.tile, mask, sink) {
                    TileImage::Fill(rgba) => sink.fill_tile(&atlas, dst, rgba),
                    TileImage::Image { source, rect } => {
                        sink.draw_tile_image(&atlas, &source, rect, dst)
                    }
                }
                handles.drawn[idx] = Some(drawn);
                touched = true;
                redrawn += 1;
            }
            if touched {
                sink.flush_atlas(surface);
            }
        }
        redrawn
    }

    /// Merge a chunk's heights into blocks and replace its top mesh and
    /// colliders. Returns false if the chunk no longer exists.
    fn remerge(&mut self, chunk: ChunkCoord, sink: &mut dyn TerrainSink) -> bool {
        let n = self.chunk_units();
        let unit = self.config.unit_size;
        let Some(heights) = self.chunks.get(&chunk).map(Chunk::heights) else {
            return false;
        };
        let blocks = merge_blocks(&heights, n, baseline_for(&heights, self.config.min_height));
        let surface = self.ensure_surface(chunk, sink);
        sink.apply_mesh_data(surface, MeshPart::Top, &top_mesh(&blocks, n, unit));

        let origin = self.chunk_origin(chunk);
        let Some(handles) = self.handles.get_mut(&chunk) else {
            return false;
        };
        for collider in handles.colliders.drain(..) {
            sink.dispose_collider(collider);
        }
        for block in &blocks {
            let b = collider_box(block, unit);
            let id = sink.create_static_box_collider(origin + b.center, b.scaling, None);
            handles.colliders.push(id);
        }
        handles.blocks = blocks;
        true
    }

    /// Rebuild wall meshes of height-dirty and side-dirty chunks. Chunks never
    /// merged before are merged first and added to `merged`.
    fn rebuild_sides(
        &mut self,
        batch: &DirtyBatch,
        merged: &mut Vec<ChunkCoord>,
        sink: &mut dyn TerrainSink,
    ) -> usize {
        let n = self.chunk_units();
        let unit = self.config.unit_size;
        let targets: BTreeSet<(i32, i32)> = batch
            .height_chunks
            .iter()
            .chain(&batch.side_chunks)
            .map(|c| (c.x, c.y))
            .collect();

        let mut walls = 0;
        for (i, j) in targets {
            let chunk = IVec2::new(i, j);
            if !self.chunks.contains(&chunk) {
                continue;
            }
            let merged_before = self.handles.get(&chunk).is_some_and(|h| !h.blocks.is_empty());
            if !merged_before && self.remerge(chunk, sink) {
                merged.push(chunk);
            }

            let origin_cell = chunk * n;
            let chunks = &self.chunks;
            let tiles = &self.tiles;
            let quads = side_quads(self.blocks(chunk), |local| {
                chunks.peek_cell(origin_cell + local).height
            });
            let mesh = side_mesh(&quads, unit, |local| {
                edge_rect(tiles, chunks.peek_cell(origin_cell + local).tile)
            });

            let surface = self.ensure_surface(chunk, sink);
            sink.apply_mesh_data(surface, MeshPart::Side, &mesh);
            walls += 1;
        }
        walls
    }

    /// Move the terrain origin, translating every built surface and collider.
    pub fn set_position(&mut self, position: Vec3, sink: &mut dyn TerrainSink) {
        let delta = position - self.position;
        if delta == Vec3::ZERO {
            return;
        }
        self.position = position;
        for handles in self.handles.values() {
            if let Some(surface) = handles.surface {
                sink.translate_surface(surface, delta);
            }
            for &collider in &handles.colliders {
                sink.translate_collider(collider, delta);
            }
        }
        self.events.push(TerrainEvent::PositionUpdated {
            terrain: self.id.clone(),
            delta,
        });
    }

    pub fn set_visible(&mut self, visible: bool, sink: &mut dyn TerrainSink) {
        self.visible = visible;
        self.apply_visibility(sink);
    }

    pub fn set_opacity(&mut self, opacity: f32, sink: &mut dyn TerrainSink) {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.apply_visibility(sink);
    }

    fn apply_visibility(&self, sink: &mut dyn TerrainSink) {
        for surface in self.handles.values().filter_map(|h| h.surface) {
            sink.set_surface_visibility(surface, self.visible, self.opacity);
        }
    }

    /// Persisted form: geometry, origin, and RLE layers per chunk key.
    pub fn serialize(&self) -> TerrainData {
        let chunks = self
            .chunks
            .sorted_coords()
            .into_iter()
            .filter_map(|coord| {
                let chunk = self.chunks.get(&coord)?;
                Some((chunk_key(coord), ChunkData::encode(&chunk.tiles(), &chunk.heights())))
            })
            .collect();
        TerrainData {
            unit: self.config.unit_size,
            size: self.config.chunk_size,
            x: self.position.x,
            y: self.position.y,
            z: self.position.z,
            chunks,
        }
    }

    /// Remove a chunk and release its backend handles. Pending work for it is dropped.
    pub fn dispose_chunk(&mut self, chunk: ChunkCoord, sink: &mut dyn TerrainSink) -> bool {
        let existed = self.chunks.remove(&chunk).is_some();
        if let Some(handles) = self.handles.remove(&chunk) {
            for collider in handles.colliders {
                sink.dispose_collider(collider);
            }
            if let Some(surface) = handles.surface {
                sink.dispose_chunk_surface(surface);
            }
        }
        self.dirty.forget_chunk(chunk, self.chunk_units());
        existed
    }

    /// Release every chunk. A rebuild scheduled before disposal becomes a no-op.
    pub fn dispose(&mut self, sink: &mut dyn TerrainSink) {
        for chunk in self.chunks.sorted_coords() {
            self.dispose_chunk(chunk, sink);
        }
        self.throttle.clear();
        self.dirty = DirtySet::new();
        log::info!("terrain {} disposed", self.id);
    }

    pub fn drain_events(&mut self) -> Vec<TerrainEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Source rect drawn on walls under a cell showing `tile`.
fn edge_rect(tiles: &TileTable, tile: TileId) -> TileRect {
    match tiles.get(tiles.edge_tile(tile)) {
        Some(def) if def.autotile == AutotileKind::None => def.rect,
        Some(def) => TileRect::tile_at(def.rect.x, def.rect.y),
        None => TileRect::default(),
    }
}
