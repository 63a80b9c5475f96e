use ndarray::Array2;
use rand::prelude::*;

use crate::*;

pub trait LayoutGenerator {
    fn generate(self, config: FieldConfig) -> MineLayout;
}

/// Uniform placement at distinct coordinates, each mine tagged with random art.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomLayoutGenerator {
    seed: u64,
    art_variants: u8,
}

impl RandomLayoutGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            art_variants: 1,
        }
    }

    /// Number of art variants to pick from per mine (at least one).
    pub fn with_art_variants(mut self, art_variants: u8) -> Self {
        self.art_variants = art_variants.max(1);
        self
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(self, config: FieldConfig) -> MineLayout {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let dim = config.size.to_nd_index();
        let mut mine_mask: Array2<bool> = Array2::default(dim);
        let mut mine_art: Array2<Option<u8>> = Array2::default(dim);

        let total_cells = config.total_cells();
        let mines = if config.mines > total_cells {
            log::warn!(
                "Field already full, requested {} but only fits {}",
                config.mines,
                total_cells
            );
            total_cells
        } else {
            config.mines
        };

        let mut placed: CellCount = 0;
        while placed < mines {
            let coords = (
                rng.random_range(0..config.size.0),
                rng.random_range(0..config.size.1),
            );
            let cell = &mut mine_mask[coords.to_nd_index()];
            if *cell {
                continue;
            }
            *cell = true;
            mine_art[coords.to_nd_index()] = Some(rng.random_range(0..self.art_variants));
            placed += 1;
        }

        log::debug!("generated {:?} field with {} mines", config.size, placed);
        MineLayout::with_art(mine_mask, mine_art)
    }
}
