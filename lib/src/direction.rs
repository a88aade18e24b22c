//! Compass directions of the 8-connected neighborhood.
//!
//! The directions are numbered clockwise, starting at west:
//! ```text
//! | 1 | 2 | 3 |
//! | 0 | . | 4 |
//! | 7 | 6 | 5 |
//! ```

/// One of the 8 neighbor directions. `y` grows downwards, so north is `dy == -1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    West = 0,
    NorthWest = 1,
    North = 2,
    NorthEast = 3,
    East = 4,
    SouthEast = 5,
    South = 6,
    SouthWest = 7,
}

const OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::West,
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The `(dx, dy)` step to the neighbor in this direction.
    pub fn offset(self) -> (i32, i32) {
        OFFSETS[self.index()]
    }

    /// Quantize a gradient angle in degrees (`[0, 360)`, `y` down) into a direction.
    ///
    /// The bins are 45 degrees wide and centered on the compass directions, `[0, 22.5)` and
    /// `[337.5, 360)` both land on `West`.
    pub fn from_angle(degrees: f32) -> Direction {
        let divisor = 180.0 / 8.0;
        let step = (degrees / divisor).floor();
        // truncation toward zero matters for the first bin, where (step - 1) / 2 is negative
        let bin = (((step - 1.0) / 2.0) + 1.0) as i32;
        Direction::ALL[bin.rem_euclid(8) as usize]
    }
}

/// A set of neighbor directions, stored as an 8 bit mask indexed by [Direction::index].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeighborSet(u8);

impl NeighborSet {
    pub fn new() -> Self {
        NeighborSet(0)
    }

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= 1 << direction.index();
    }

    pub fn contains(self, direction: Direction) -> bool {
        self.0 & (1 << direction.index()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .iter()
            .copied()
            .filter(move |&d| self.contains(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_angle() {
        assert_eq!(Direction::from_angle(0.0), Direction::West);
        assert_eq!(Direction::from_angle(22.4), Direction::West);
        assert_eq!(Direction::from_angle(22.5), Direction::NorthWest);
        assert_eq!(Direction::from_angle(67.0), Direction::NorthWest);
        assert_eq!(Direction::from_angle(90.0), Direction::North);
        assert_eq!(Direction::from_angle(135.0), Direction::NorthEast);
        assert_eq!(Direction::from_angle(180.0), Direction::East);
        assert_eq!(Direction::from_angle(225.0), Direction::SouthEast);
        assert_eq!(Direction::from_angle(270.0), Direction::South);
        assert_eq!(Direction::from_angle(315.0), Direction::SouthWest);
        assert_eq!(Direction::from_angle(337.5), Direction::West);
        assert_eq!(Direction::from_angle(359.9), Direction::West);
    }

    #[test]
    fn test_offsets_are_distinct_neighbors() {
        for (i, a) in Direction::ALL.iter().enumerate() {
            let (dx, dy) = a.offset();
            assert!(dx.abs() <= 1 && dy.abs() <= 1 && (dx, dy) != (0, 0));
            assert_eq!(a.index(), i);
            for b in Direction::ALL.iter().skip(i + 1) {
                assert_ne!(a.offset(), b.offset());
            }
        }
    }

    #[test]
    fn test_neighbor_set() {
        let mut set = NeighborSet::new();
        assert!(set.is_empty());
        set.insert(Direction::West);
        set.insert(Direction::South);
        assert_eq!(set.bits(), 0b0100_0001);
        assert!(set.contains(Direction::South));
        assert!(!set.contains(Direction::North));
        let dirs: Vec<_> = set.iter().collect();
        assert_eq!(dirs, vec![Direction::West, Direction::South]);
    }
}
