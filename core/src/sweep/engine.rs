use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::num::Saturating;
use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Ready,
    Active,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Grid rules: reveal with flood fill, chord reveal, flagging, win and loss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepEngine {
    mine_layout: MineLayout,
    board: Array2<EngineCell>,
    revealed_count: Saturating<CellCount>,
    flagged_count: Saturating<CellCount>,
    state: EngineState,
    detonated: Option<Coord2>,
}

impl SweepEngine {
    pub fn new(mine_layout: MineLayout) -> Self {
        let size = mine_layout.size();
        Self {
            mine_layout,
            board: Array2::default(size.to_nd_index()),
            revealed_count: Saturating(0),
            flagged_count: Saturating(0),
            state: EngineState::default(),
            detonated: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.mine_layout.size()
    }

    pub fn layout(&self) -> &MineLayout {
        &self.mine_layout
    }

    /// Mines minus flags. Goes negative when the player over-flags.
    pub fn mines_left(&self) -> i32 {
        i32::from(self.mine_layout.mine_count()) - i32::from(self.flagged_count.0)
    }

    pub fn revealed_safe_count(&self) -> CellCount {
        self.revealed_count.0
    }

    pub fn cell_at(&self, coords: Coord2) -> EngineCell {
        self.board[coords.to_nd_index()]
    }

    pub fn detonated(&self) -> Option<Coord2> {
        self.detonated
    }

    pub fn has_mine_at(&self, coords: Coord2) -> bool {
        self.mine_layout.contains_mine(coords)
    }

    pub fn can_chord_reveal_at(&self, coords: Coord2) -> bool {
        if self.is_finished() {
            return false;
        }
        match self.cell_at(coords) {
            EngineCell::Revealed(count) => count == self.count_flagged_neighbors(coords),
            _ => false,
        }
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.mine_layout.validate_coords(coords)?;
        self.check_not_finished()?;

        let cell = &mut self.board[coords.to_nd_index()];
        Ok(match *cell {
            EngineCell::Hidden => {
                *cell = EngineCell::Flagged;
                self.flagged_count += 1;
                MarkOutcome::Changed
            }
            EngineCell::Flagged => {
                *cell = EngineCell::Hidden;
                self.flagged_count -= 1;
                MarkOutcome::Changed
            }
            EngineCell::Revealed(_) | EngineCell::Detonated => MarkOutcome::NoChange,
        })
    }

    /// Click on a cell: hidden cells are revealed, revealed numbers chord,
    /// flagged cells are protected.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.mine_layout.validate_coords(coords)?;
        self.check_not_finished()?;

        Ok(match self.cell_at(coords) {
            EngineCell::Hidden => self.reveal_targets(&[coords]),
            EngineCell::Revealed(_) => self.chord_reveal(coords)?,
            EngineCell::Flagged | EngineCell::Detonated => RevealOutcome::NoChange,
        })
    }

    /// Reveals every unflagged hidden neighbor of a revealed cell once the
    /// flags around it account for all its mines. Otherwise nothing happens.
    /// A revealed zero with no flags around it reopens whatever was unflagged
    /// next to it.
    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.mine_layout.validate_coords(coords)?;
        self.check_not_finished()?;

        if !self.can_chord_reveal_at(coords) {
            return Ok(RevealOutcome::NoChange);
        }

        let targets: Vec<Coord2> = self
            .mine_layout
            .neighbors(coords)
            .filter(|&pos| self.cell_at(pos) == EngineCell::Hidden)
            .collect();
        log::trace!("chord at {:?} reveals {:?}", coords, targets);
        Ok(self.reveal_targets(&targets))
    }

    /// Batch reveal. Mines are checked across the whole batch before anything
    /// else is opened, so a wrong chord never half-opens the board.
    fn reveal_targets(&mut self, targets: &[Coord2]) -> RevealOutcome {
        if let Some(&mine) = targets
            .iter()
            .find(|&&pos| self.mine_layout.contains_mine(pos))
        {
            self.board[mine.to_nd_index()] = EngineCell::Detonated;
            self.detonated = Some(mine);
            self.end_game(false);
            return RevealOutcome::HitMine;
        }

        let opened = targets
            .iter()
            .map(|&pos| self.flood_reveal(pos))
            .sum::<CellCount>();

        if self.revealed_count.0 == self.mine_layout.safe_cell_count() {
            self.end_game(true);
            RevealOutcome::Won
        } else if opened > 0 {
            self.mark_started();
            RevealOutcome::Revealed
        } else {
            RevealOutcome::NoChange
        }
    }

    /// Breadth-first reveal from a safe cell. Zero cells expand into their
    /// hidden, unflagged neighbors; flags and mines are never crossed.
    fn flood_reveal(&mut self, start: Coord2) -> CellCount {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([start]);
        let mut opened: CellCount = 0;

        while let Some(coords) = queue.pop_front() {
            if !visited.insert(coords) {
                continue;
            }
            if self.cell_at(coords) != EngineCell::Hidden || self.mine_layout.contains_mine(coords)
            {
                continue;
            }

            let adjacent = self.mine_layout.adjacent_mines(coords);
            self.board[coords.to_nd_index()] = EngineCell::Revealed(adjacent);
            self.revealed_count += 1;
            opened += 1;

            if adjacent == 0 {
                queue.extend(self.mine_layout.neighbors(coords).filter(|pos| {
                    !visited.contains(pos) && self.cell_at(*pos) == EngineCell::Hidden
                }));
            }
        }

        opened
    }

    /// Ends the game as lost without a detonation, e.g. after too many
    /// ignored distractions.
    pub fn forfeit(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.end_game(false);
        true
    }

    fn mark_started(&mut self) {
        if self.state == EngineState::Ready {
            self.state = EngineState::Active;
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.is_finished() {
            return;
        }
        self.state = if won {
            EngineState::Won
        } else {
            EngineState::Lost
        };
        log::debug!("field finished: {:?}", self.state);
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.mine_layout
            .neighbors(coords)
            .filter(|&pos| self.cell_at(pos) == EngineCell::Flagged)
            .count() as u8
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(size: Coord2, mines: &[Coord2]) -> MineLayout {
        MineLayout::from_mine_coords(size, mines).unwrap()
    }

    fn revealed_cells(engine: &SweepEngine) -> usize {
        engine.board.iter().filter(|cell| cell.is_revealed()).count()
    }

    #[test]
    fn reveal_hits_mine_and_marks_it_detonated() {
        let mut engine = SweepEngine::new(layout((2, 2), &[(0, 0)]));

        let outcome = engine.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(engine.state(), EngineState::Lost);
        assert_eq!(engine.detonated(), Some((0, 0)));
        assert_eq!(engine.cell_at((0, 0)), EngineCell::Detonated);
    }

    #[test]
    fn finished_engine_rejects_moves() {
        let mut engine = SweepEngine::new(layout((2, 2), &[(0, 0)]));
        engine.reveal((0, 0)).unwrap();

        assert_eq!(engine.reveal((1, 1)), Err(GameError::AlreadyEnded));
        assert_eq!(engine.toggle_flag((1, 1)), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn flood_fill_opens_zero_region_and_its_border() {
        let mut engine = SweepEngine::new(layout((3, 3), &[(2, 2)]));

        let outcome = engine.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(engine.cell_at((0, 0)), EngineCell::Revealed(0));
        assert_eq!(engine.cell_at((1, 1)), EngineCell::Revealed(1));
        assert_eq!(engine.cell_at((2, 2)), EngineCell::Hidden);
    }

    #[test]
    fn flood_fill_does_not_cross_flags() {
        // Column x = 2 is a wall of flags on a mine-free 5x3 field with one
        // mine tucked in the corner so the board is not trivially won.
        let mut engine = SweepEngine::new(layout((5, 3), &[(4, 2)]));
        for y in 0..3 {
            engine.toggle_flag((2, y)).unwrap();
        }

        engine.reveal((0, 0)).unwrap();

        for y in 0..3 {
            assert_eq!(engine.cell_at((2, y)), EngineCell::Flagged);
            assert_eq!(engine.cell_at((0, y)), EngineCell::Revealed(0));
            assert_eq!(engine.cell_at((3, y)), EngineCell::Hidden);
        }
        assert_eq!(engine.state(), EngineState::Active);
    }

    #[test]
    fn flood_fill_terminates_on_mine_free_field() {
        let mut engine = SweepEngine::new(layout((10, 10), &[]));

        assert_eq!(engine.reveal((4, 4)).unwrap(), RevealOutcome::Won);
        assert_eq!(revealed_cells(&engine), 100);
    }

    #[test]
    fn flagged_cell_cannot_be_revealed() {
        let mut engine = SweepEngine::new(layout((3, 3), &[(0, 0)]));
        engine.toggle_flag((0, 0)).unwrap();

        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(engine.state(), EngineState::Ready);
    }

    #[test]
    fn flag_only_toggles_unrevealed_cells() {
        let mut engine = SweepEngine::new(layout((3, 1), &[(0, 0)]));
        engine.reveal((1, 0)).unwrap();

        assert_eq!(engine.toggle_flag((1, 0)).unwrap(), MarkOutcome::NoChange);
        assert_eq!(engine.toggle_flag((0, 0)).unwrap(), MarkOutcome::Changed);
        assert_eq!(engine.mines_left(), 0);
        assert_eq!(engine.toggle_flag((0, 0)).unwrap(), MarkOutcome::Changed);
        assert_eq!(engine.mines_left(), 1);
    }

    #[test]
    fn over_flagging_drives_counter_negative() {
        let mut engine = SweepEngine::new(layout((3, 3), &[(0, 0)]));
        engine.toggle_flag((0, 0)).unwrap();
        engine.toggle_flag((1, 0)).unwrap();
        engine.toggle_flag((2, 0)).unwrap();

        assert_eq!(engine.mines_left(), -2);
    }

    #[test]
    fn chord_reveal_uses_flagged_neighbors() {
        let mut engine = SweepEngine::new(layout((3, 3), &[(0, 1), (2, 1)]));

        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 1)).unwrap();
        engine.toggle_flag((2, 1)).unwrap();

        let outcome = engine.reveal((1, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(engine.cell_at((1, 0)), EngineCell::Revealed(2));
        assert_eq!(engine.cell_at((1, 2)), EngineCell::Revealed(2));
    }

    #[test]
    fn chord_with_misplaced_flag_detonates() {
        let mut engine = SweepEngine::new(layout((3, 3), &[(0, 0)]));
        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((2, 2)).unwrap();

        let outcome = engine.reveal((1, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(engine.detonated(), Some((0, 0)));
        // The batch was checked first: no safe neighbor got opened.
        assert_eq!(engine.cell_at((1, 0)), EngineCell::Hidden);
    }

    #[test]
    fn chord_with_wrong_flag_count_is_no_op() {
        let mut engine = SweepEngine::new(layout((3, 3), &[(0, 1), (2, 1)]));
        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 1)).unwrap();

        assert_eq!(engine.reveal((1, 1)).unwrap(), RevealOutcome::NoChange);
        assert_eq!(engine.cell_at((1, 0)), EngineCell::Hidden);
    }

    #[test]
    fn chord_on_zero_opens_neighbor_that_was_unflagged() {
        let mut engine = SweepEngine::new(layout((4, 1), &[(3, 0)]));
        engine.toggle_flag((1, 0)).unwrap();
        engine.reveal((0, 0)).unwrap();
        assert_eq!(engine.cell_at((1, 0)), EngineCell::Flagged);
        engine.toggle_flag((1, 0)).unwrap();

        assert!(engine.can_chord_reveal_at((0, 0)));
        assert_eq!(engine.reveal((0, 0)).unwrap(), RevealOutcome::Won);
        assert_eq!(engine.cell_at((1, 0)), EngineCell::Revealed(0));
        assert_eq!(engine.cell_at((2, 0)), EngineCell::Revealed(1));
    }

    #[test]
    fn winning_board_transitions_to_won_state() {
        let mut engine = SweepEngine::new(layout((2, 1), &[(0, 0)]));

        assert_eq!(engine.reveal((1, 0)).unwrap(), RevealOutcome::Won);
        assert_eq!(engine.state(), EngineState::Won);
        assert_eq!(engine.revealed_safe_count(), 1);
    }

    #[test]
    fn forfeit_ends_once() {
        let mut engine = SweepEngine::new(layout((2, 2), &[(0, 0)]));
        assert!(engine.forfeit());
        assert!(!engine.forfeit());
        assert_eq!(engine.state(), EngineState::Lost);
        assert_eq!(engine.detonated(), None);
    }
}
