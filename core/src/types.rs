use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Single grid axis used for field width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional grid coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

/// Delay in milliseconds for a deferred tick.
pub type Millis = u32;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    (a as CellCount).saturating_mul(b as CellCount)
}

/// Grid shape of a 2D array as `Coord2`, saturating oversized axes.
pub fn grid_size<T>(array: &Array2<T>) -> Coord2 {
    let (x, y) = array.dim();
    (
        x.try_into().unwrap_or(Coord::MAX),
        y.try_into().unwrap_or(Coord::MAX),
    )
}

pub trait MooreExt {
    /// Iterates the in-bounds cells of the 8-connected neighborhood around `center`.
    fn moore(&self, center: Coord2) -> Moore;
}

impl<T> MooreExt for Array2<T> {
    fn moore(&self, center: Coord2) -> Moore {
        Moore::new(center, grid_size(self))
    }
}

const OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

fn offset_within(center: Coord2, (dx, dy): (i8, i8), bounds: Coord2) -> Option<Coord2> {
    let x = center.0.checked_add_signed(dx).filter(|&x| x < bounds.0)?;
    let y = center.1.checked_add_signed(dy).filter(|&y| y < bounds.1)?;
    Some((x, y))
}

/// Moore neighborhood iterator, clamped to the grid bounds.
#[derive(Clone, Debug)]
pub struct Moore {
    center: Coord2,
    bounds: Coord2,
    next: usize,
}

impl Moore {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            next: 0,
        }
    }
}

impl Iterator for Moore {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&offset) = OFFSETS.get(self.next) {
            self.next += 1;
            if let Some(coords) = offset_within(self.center, offset, self.bounds) {
                return Some(coords);
            }
        }
        None
    }
}

/// Viewport in CSS pixels, used to place popups.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Below this width the layout switches to the compact (mobile) metrics.
    pub const COMPACT_WIDTH: f64 = 600.0;

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_compact(&self) -> bool {
        self.width < Self::COMPACT_WIDTH
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Top-left corner of an overlay, in CSS pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPos {
    pub x: f64,
    pub y: f64,
}
