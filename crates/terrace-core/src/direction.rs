use glam::IVec2;

/// One of the 8 compass neighbours of a cell on the (u, v) grid.
/// u grows east, v grows south. The discriminant is the bit index of
/// the direction in an autotile mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
}

/// All 8 directions in mask bit order.
pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::North,
    Direction::NorthEast,
    Direction::East,
    Direction::SouthEast,
    Direction::South,
    Direction::SouthWest,
    Direction::West,
    Direction::NorthWest,
];

/// The 4 edge-sharing directions, used for side walls.
pub const CARDINAL_DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

impl Direction {
    /// Offset in (u, v) cell space.
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::North => IVec2::new(0, -1),
            Direction::NorthEast => IVec2::new(1, -1),
            Direction::East => IVec2::new(1, 0),
            Direction::SouthEast => IVec2::new(1, 1),
            Direction::South => IVec2::new(0, 1),
            Direction::SouthWest => IVec2::new(-1, 1),
            Direction::West => IVec2::new(-1, 0),
            Direction::NorthWest => IVec2::new(-1, -1),
        }
    }

    /// Mask bit for this neighbour.
    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn opposite(self) -> Direction {
        ALL_DIRECTIONS[((self as usize) + 4) % 8]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_directions_unique() {
        for (i, a) in ALL_DIRECTIONS.iter().enumerate() {
            for (j, b) in ALL_DIRECTIONS.iter().enumerate() {
                if i != j {
                    assert_ne!(a.offset(), b.offset(), "directions {i} and {j} share offset");
                }
            }
        }
    }

    #[test]
    fn test_bits_follow_enumeration_order() {
        for (i, dir) in ALL_DIRECTIONS.iter().enumerate() {
            assert_eq!(dir.bit(), 1 << i);
        }
    }

    #[test]
    fn test_opposite_cancels_offset() {
        for dir in ALL_DIRECTIONS {
            assert_eq!(dir.offset() + dir.opposite().offset(), IVec2::ZERO, "{dir:?}");
        }
    }

    #[test]
    fn test_cardinals() {
        for dir in CARDINAL_DIRECTIONS {
            let o = dir.offset();
            assert_eq!(o.x.abs() + o.y.abs(), 1);
        }
    }
}
