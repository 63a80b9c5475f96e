use alloc::vec::Vec;
use core::ops::Range;
use rand::Rng;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepRules {
    /// Auto-expired distractions that end the game.
    pub miss_limit: u8,
    pub distraction_delay_ms: Range<Millis>,
    pub won_delay_ms: Millis,
    pub explode_delay_ms: Millis,
    pub missed_delay_ms: Millis,
    /// How long a closing popup keeps rendering its exit animation.
    pub popup_exit_ms: Millis,
}

impl Default for SweepRules {
    fn default() -> Self {
        Self {
            miss_limit: 3,
            distraction_delay_ms: 2000..6000,
            won_delay_ms: 1000,
            explode_delay_ms: 2000,
            missed_delay_ms: 1000,
            popup_exit_ms: 250,
        }
    }
}

/// Every tick is valid only for the field `epoch` it was scheduled by.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SweepTick {
    Distraction { epoch: u32 },
    RetirePopup { epoch: u32, id: PopupId },
    Finish { epoch: u32, result: StageResult },
}

impl SweepTick {
    pub fn epoch(&self) -> u32 {
        match *self {
            SweepTick::Distraction { epoch }
            | SweepTick::RetirePopup { epoch, .. }
            | SweepTick::Finish { epoch, .. } => epoch,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SweepEffect {
    Schedule(Deferred<SweepTick>),
    /// Start the explosion clip over the board.
    Explode,
    Finished(StageResult),
}

/// Everything a tick needs from the outside world.
pub struct TickEnv<'a, R: Rng + ?Sized> {
    pub rng: &'a mut R,
    pub viewport: Viewport,
    pub now: Instant,
}

/// The final stage: a minesweeper field plus distraction popups that count
/// as misses when they play out unclosed.
#[derive(Clone, Debug)]
pub struct SweepGame {
    engine: SweepEngine,
    popups: PopupManager,
    distraction_videos: Vec<AssetKey>,
    rules: SweepRules,
    missed: u8,
    epoch: u32,
    result: ReportOnce,
    exploding: bool,
}

impl SweepGame {
    pub fn new(layout: MineLayout, catalog: &AssetCatalog, rules: SweepRules) -> Self {
        Self {
            engine: SweepEngine::new(layout),
            popups: PopupManager::new(),
            distraction_videos: catalog.distraction_videos.clone(),
            rules,
            missed: 0,
            epoch: 0,
            result: ReportOnce::default(),
            exploding: false,
        }
    }

    /// Arms the distraction scheduler. Call once after mounting.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Effects<SweepEffect> {
        let mut effects = Effects::new();
        if !self.is_over() {
            effects.push(self.next_distraction(rng));
        }
        effects
    }

    /// Swaps in a fresh field and invalidates every tick of the previous one.
    pub fn reset<R: Rng + ?Sized>(&mut self, layout: MineLayout, rng: &mut R) -> Effects<SweepEffect> {
        self.engine = SweepEngine::new(layout);
        for report in self.popups.close_all(CloseReason::Manual) {
            self.popups.retire(report.id);
        }
        self.missed = 0;
        self.epoch = self.epoch.wrapping_add(1);
        self.result = ReportOnce::default();
        self.exploding = false;
        self.start(rng)
    }

    pub fn engine(&self) -> &SweepEngine {
        &self.engine
    }

    pub fn popups(&self) -> &PopupManager {
        &self.popups
    }

    pub fn rules(&self) -> &SweepRules {
        &self.rules
    }

    pub fn missed(&self) -> u8 {
        self.missed
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn is_exploding(&self) -> bool {
        self.exploding
    }

    /// Terminal once the field is finished or the distractions won.
    pub fn is_over(&self) -> bool {
        self.engine.is_finished()
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<Effects<SweepEffect>> {
        let outcome = self.engine.reveal(coords)?;
        Ok(self.after_reveal(outcome))
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        self.engine.toggle_flag(coords)
    }

    fn after_reveal(&mut self, outcome: RevealOutcome) -> Effects<SweepEffect> {
        let mut effects = Effects::new();
        match outcome {
            RevealOutcome::NoChange | RevealOutcome::Revealed => {}
            RevealOutcome::HitMine => {
                self.exploding = true;
                effects.push(SweepEffect::Explode);
                effects.push(self.finish_after(self.rules.explode_delay_ms, StageResult::Fail));
            }
            RevealOutcome::Won => {
                effects.push(self.finish_after(self.rules.won_delay_ms, StageResult::Complete));
            }
        }
        effects
    }

    /// Feeds back a tick that was scheduled earlier.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        tick: SweepTick,
        env: TickEnv<'_, R>,
    ) -> Effects<SweepEffect> {
        let TickEnv { rng, viewport, now } = env;
        let mut effects = Effects::new();
        if tick.epoch() != self.epoch {
            log::trace!("stale {:?} (now at epoch {})", tick, self.epoch);
            return effects;
        }
        match tick {
            SweepTick::Distraction { .. } => {
                if self.is_over() {
                    return effects;
                }
                if let Some(video) = pick(&self.distraction_videos, &mut *rng).cloned() {
                    let position = pick_popup_position(viewport, &mut *rng);
                    self.popups
                        .spawn(PopupSpec::distraction(video, position), now);
                }
                effects.push(self.next_distraction(rng));
            }
            SweepTick::RetirePopup { id, .. } => {
                self.popups.retire(id);
            }
            SweepTick::Finish { result, .. } => {
                if let Some(result) = self.result.report(result) {
                    effects.push(SweepEffect::Finished(result));
                }
            }
        }
        effects
    }

    /// Handles a popup close, whichever of the video `ended` event or the close
    /// button got there first. Only the first close of an id counts.
    pub fn close_popup(&mut self, id: PopupId, reason: CloseReason) -> Effects<SweepEffect> {
        let mut effects = Effects::new();
        let Some(report) = self.popups.close(id, reason) else {
            return effects;
        };
        effects.push(SweepEffect::Schedule(Deferred::new(
            self.rules.popup_exit_ms,
            SweepTick::RetirePopup {
                epoch: self.epoch,
                id: report.id,
            },
        )));

        if report.reason == CloseReason::Auto && !self.is_over() {
            self.missed = self.missed.saturating_add(1);
            log::debug!("missed distraction {} ({}/{})", id, self.missed, self.rules.miss_limit);
            if self.missed >= self.rules.miss_limit && self.engine.forfeit() {
                effects.push(self.finish_after(self.rules.missed_delay_ms, StageResult::Fail));
            }
        }
        effects
    }

    fn next_distraction<R: Rng + ?Sized>(&self, rng: &mut R) -> SweepEffect {
        SweepEffect::Schedule(Deferred::new(
            pick_delay(&self.rules.distraction_delay_ms, rng),
            SweepTick::Distraction { epoch: self.epoch },
        ))
    }

    fn finish_after(&self, after_ms: Millis, result: StageResult) -> SweepEffect {
        SweepEffect::Schedule(Deferred::new(
            after_ms,
            SweepTick::Finish {
                epoch: self.epoch,
                result,
            },
        ))
    }
}
