use core::ops::{BitOr, Index};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use game::*;
pub use generator::*;
pub use tile::*;

use crate::*;

mod engine;
mod game;
mod generator;
mod tile;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl FieldConfig {
    /// The 10x10 field with 15 mines used by the final stage.
    pub const CHALLENGE: Self = Self::new_unchecked((10, 10), 15);

    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub fn new((size_x, size_y): Coord2, mines: CellCount) -> Self {
        let size_x = size_x.max(1);
        let size_y = size_y.max(1);
        let capacity = mult(size_x, size_y);
        if mines > capacity {
            log::warn!("Requested {} mines but only {} cells, clamping", mines, capacity);
        }
        Self::new_unchecked((size_x, size_y), mines.min(capacity))
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::CHALLENGE
    }
}

/// Mine placement plus everything derived from it at generation time.
///
/// Adjacency counts are computed once here and never recomputed afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    adjacency: Array2<u8>,
    mine_art: Array2<Option<u8>>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_art = mine_mask.map(|&is_mine| is_mine.then_some(0));
        Self::with_art(mine_mask, mine_art)
    }

    pub(crate) fn with_art(mine_mask: Array2<bool>, mine_art: Array2<Option<u8>>) -> Self {
        let mine_count = mine_mask
            .iter()
            .filter(|&&is_mine| is_mine)
            .count()
            .try_into()
            .unwrap_or(CellCount::MAX);
        let adjacency = Array2::from_shape_fn(mine_mask.dim(), |(x, y)| {
            let coords = (x as Coord, y as Coord);
            mine_mask
                .moore(coords)
                .filter(|&pos| mine_mask[pos.to_nd_index()])
                .count() as u8
        });
        Self {
            mine_mask,
            adjacency,
            mine_art,
            mine_count,
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord2 {
        grid_size(&self.mine_mask)
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len().try_into().unwrap_or(CellCount::MAX)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mines(&self, coords: Coord2) -> u8 {
        self.adjacency[coords.to_nd_index()]
    }

    /// Index into the catalog's mine art, `None` for safe cells.
    pub fn mine_art(&self, coords: Coord2) -> Option<u8> {
        self.mine_art[coords.to_nd_index()]
    }

    pub fn neighbors(&self, coords: Coord2) -> Moore {
        self.mine_mask.moore(coords)
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Merges outcomes of a batch reveal, a detonation dominates everything.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) | (_, HitMine) => HitMine,
            (Won, _) | (_, Won) => Won,
            (Revealed, _) | (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}
