//! Greedy rectangle merging of a chunk heightmap into solid blocks.
//!
//! Each pass raises a per-cell working floor (`val`) from the baseline to the
//! top of the block just emitted, so stacked terrain comes out as layers of
//! disjoint prisms. The policy is fixed: identical input always produces the
//! identical block list in the identical order.

/// A rectangular prism over cells `[u0, u1) x [v0, v1)` from `h0` to `h1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pub u0: i32,
    pub u1: i32,
    pub v0: i32,
    pub v1: i32,
    pub h0: i32,
    pub h1: i32,
}

impl Block {
    pub fn from_array([u0, u1, v0, v1, h0, h1]: [i32; 6]) -> Self {
        Self {
            u0,
            u1,
            v0,
            v1,
            h0,
            h1,
        }
    }

    pub fn to_array(self) -> [i32; 6] {
        [self.u0, self.u1, self.v0, self.v1, self.h0, self.h1]
    }

    pub fn contains(&self, u: i32, v: i32) -> bool {
        u >= self.u0 && u < self.u1 && v >= self.v0 && v < self.v1
    }

    pub fn footprint(&self) -> i32 {
        (self.u1 - self.u0) * (self.v1 - self.v0)
    }

    pub fn volume(&self) -> i32 {
        self.footprint() * (self.h1 - self.h0)
    }
}

/// Baseline for a merge pass: one below the lowest cell, never below `min_height - 1`.
pub fn baseline_for(heights: &[i32], min_height: i32) -> i32 {
    let lowest = heights.iter().copied().min().unwrap_or(min_height);
    (lowest - 1).max(min_height - 1)
}

/// Merge an `n x n` row-major height array into blocks above `baseline`.
///
/// Blocks are returned upper layers first: a block resting on another block
/// precedes it. An array with nothing above the baseline yields no blocks.
pub fn merge_blocks(heights: &[i32], n: i32, baseline: i32) -> Vec<Block> {
    let n = n.max(0) as usize;
    debug_assert_eq!(heights.len(), n * n);
    let mut val = vec![baseline; heights.len()];
    let mut blocks = Vec::new();
    let idx = |i: usize, j: usize| i * n + j;
    let mut scan = 0;

    loop {
        // Cells before `scan` are all settled; raising never unsettles them.
        let Some(seed) = (scan..heights.len()).find(|&c| heights[c] > val[c]) else {
            break;
        };
        scan = seed;
        let (i0, j0) = (seed / n, seed % n);
        let base = val[seed];
        let open = |c: usize, val: &[i32]| heights[c] > base && val[c] == base;

        let mut i1 = i0 + 1;
        while i1 < n && open(idx(i1, j0), &val) {
            i1 += 1;
        }
        let mut j1 = j0 + 1;
        while j1 < n && (i0..i1).all(|i| open(idx(i, j1), &val)) {
            j1 += 1;
        }

        let mut h1 = i32::MAX;
        for i in i0..i1 {
            for j in j0..j1 {
                h1 = h1.min(heights[idx(i, j)]);
            }
        }
        for i in i0..i1 {
            for j in j0..j1 {
                val[idx(i, j)] = h1;
            }
        }

        blocks.push(Block {
            u0: i0 as i32,
            u1: i1 as i32,
            v0: j0 as i32,
            v1: j1 as i32,
            h0: base,
            h1,
        });
    }

    blocks.reverse();
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_volume(heights: &[i32], baseline: i32) -> i32 {
        heights.iter().map(|&h| (h - baseline).max(0)).sum()
    }

    /// Check that blocks tile the column `(u, v)` exactly from baseline to height.
    fn assert_exact_cover(heights: &[i32], n: i32, baseline: i32, blocks: &[Block]) {
        for u in 0..n {
            for v in 0..n {
                let h = heights[(u * n + v) as usize];
                let mut spans: Vec<(i32, i32)> = blocks
                    .iter()
                    .filter(|b| b.contains(u, v))
                    .map(|b| (b.h0, b.h1))
                    .collect();
                spans.sort();
                let mut top = baseline;
                for (h0, h1) in spans {
                    assert_eq!(h0, top, "gap or overlap in column ({u},{v})");
                    top = h1;
                }
                assert_eq!(top, h.max(baseline), "column ({u},{v}) height");
            }
        }
    }

    #[test]
    fn test_raised_cell_on_plain() {
        let mut heights = vec![0; 16];
        heights[4 + 1] = 2;
        let blocks = merge_blocks(&heights, 4, -1);
        let arrays: Vec<[i32; 6]> = blocks.iter().map(|b| b.to_array()).collect();
        assert_eq!(arrays, vec![[1, 2, 1, 2, 0, 2], [0, 4, 0, 4, -1, 0]]);
    }

    #[test]
    fn test_nothing_above_baseline_is_empty() {
        assert!(merge_blocks(&[0; 9], 3, 0).is_empty());
        assert!(merge_blocks(&[-3, -2, -5, -1], 2, 0).is_empty());
        assert!(merge_blocks(&[], 0, 0).is_empty());
    }

    #[test]
    fn test_flat_chunk_single_block() {
        let heights = vec![3; 64];
        let base = baseline_for(&heights, 0);
        assert_eq!(base, 2);
        let blocks = merge_blocks(&heights, 8, base);
        assert_eq!(blocks, vec![Block::from_array([0, 8, 0, 8, 2, 3])]);
    }

    #[test]
    fn test_baseline_clamped_to_min_height() {
        assert_eq!(baseline_for(&[5, 6, 7], 0), 4);
        assert_eq!(baseline_for(&[0, 6], 0), -1);
        assert_eq!(baseline_for(&[2, 2], 3), 2);
        assert_eq!(baseline_for(&[], 0), -1);
    }

    #[test]
    fn test_cover_and_disjoint_terraces() {
        #[rustfmt::skip]
        let heights = vec![
            1, 1, 2, 2, 0,
            1, 3, 3, 2, 0,
            1, 3, 4, 2, 1,
            0, 0, 2, 2, 1,
            0, 5, 0, 1, 1,
        ];
        let base = baseline_for(&heights, 0);
        let blocks = merge_blocks(&heights, 5, base);
        assert_exact_cover(&heights, 5, base, &blocks);
        let volume: i32 = blocks.iter().map(|b| b.volume()).sum();
        assert_eq!(volume, solid_volume(&heights, base));
    }

    #[test]
    fn test_footprint_union_matches_cells_above_baseline() {
        let heights = vec![0, 2, 0, 0, 1, 0, 3, 0, 0];
        let blocks = merge_blocks(&heights, 3, 0);
        for u in 0..3 {
            for v in 0..3 {
                let covered = blocks.iter().any(|b| b.contains(u, v));
                assert_eq!(covered, heights[(u * 3 + v) as usize] > 0);
            }
        }
        // Cells above the baseline in one layer are never claimed twice.
        let first_layer: Vec<&Block> = blocks.iter().filter(|b| b.h0 == 0).collect();
        for (a, x) in first_layer.iter().enumerate() {
            for y in &first_layer[a + 1..] {
                let overlap = x.u0 < y.u1 && y.u0 < x.u1 && x.v0 < y.v1 && y.v0 < x.v1;
                assert!(!overlap, "{x:?} overlaps {y:?}");
            }
        }
    }

    #[test]
    fn test_merge_deterministic() {
        let heights: Vec<i32> = (0..256).map(|i| ((i * 7919) % 13) as i32 % 5).collect();
        let a = merge_blocks(&heights, 16, -1);
        let b = merge_blocks(&heights, 16, -1);
        assert_eq!(a, b);
        assert_exact_cover(&heights, 16, -1, &a);
    }

    #[test]
    fn test_rectangle_grows_rows_then_columns() {
        // An L-shaped plateau: rows grow first, so the long arm along u is one block.
        #[rustfmt::skip]
        let heights = vec![
            1, 1, 0,
            1, 0, 0,
            1, 0, 0,
        ];
        let blocks = merge_blocks(&heights, 3, 0);
        assert_eq!(
            blocks,
            vec![
                Block::from_array([0, 1, 1, 2, 0, 1]),
                Block::from_array([0, 3, 0, 1, 0, 1]),
            ]
        );
    }
}
