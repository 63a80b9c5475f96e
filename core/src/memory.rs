use alloc::vec::Vec;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use web_time::Instant;

use crate::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryRules {
    pub match_delay_ms: Millis,
    pub mismatch_delay_ms: Millis,
    /// Lag between a mismatch and its punishment video showing up.
    pub punish_delay_ms: Millis,
    pub fail_delay_ms: Millis,
    pub complete_delay_ms: Millis,
}

impl Default for MemoryRules {
    fn default() -> Self {
        Self {
            match_delay_ms: 800,
            mismatch_delay_ms: 1500,
            punish_delay_ms: 300,
            fail_delay_ms: 800,
            complete_delay_ms: 1000,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCard {
    pub id: usize,
    /// Index into the face list; the two cards of a pair share it.
    pub face: usize,
    pub face_up: bool,
    pub matched: bool,
}

impl MemoryCard {
    pub const fn is_flippable(&self) -> bool {
        !self.face_up && !self.matched
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryState {
    #[default]
    Playing,
    /// Two cards are up and input is locked until they resolve.
    Checking,
    Won,
    Lost,
}

impl MemoryState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemoryTick {
    ResolveMatch,
    Punish,
    FlipBack,
    Finish(StageResult),
}

#[derive(Clone, Debug, PartialEq)]
pub enum MemoryEffect {
    PlayCue(AssetKey),
    Schedule(Deferred<MemoryTick>),
    Finished(StageResult),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlipOutcome {
    Ignored,
    Flipped,
}

/// The first stage: flip pairs, mismatches cost a chance and earn a video.
#[derive(Clone, Debug)]
pub struct MemoryEngine {
    faces: Vec<CardFace>,
    punish_videos: Vec<AssetKey>,
    cards: Vec<MemoryCard>,
    face_up: SmallVec<[usize; 2]>,
    state: MemoryState,
    matched_pairs: usize,
    fail_count: u8,
    max_fails: u8,
    punishment: Option<PopupId>,
    popups: PopupManager,
    rules: MemoryRules,
    result: ReportOnce,
}

impl MemoryEngine {
    pub fn new<R: Rng + ?Sized>(
        catalog: &AssetCatalog,
        max_fails: u8,
        rules: MemoryRules,
        rng: &mut R,
    ) -> Result<Self> {
        if catalog.card_faces.is_empty() {
            return Err(GameError::EmptyCatalog("card faces"));
        }

        let mut cards: Vec<MemoryCard> = (0..catalog.card_faces.len())
            .flat_map(|face| [face, face])
            .map(|face| MemoryCard {
                id: 0,
                face,
                face_up: false,
                matched: false,
            })
            .collect();
        // Fisher-Yates, then hand out ids in table order.
        cards.shuffle(rng);
        for (id, card) in cards.iter_mut().enumerate() {
            card.id = id;
        }

        Ok(Self {
            faces: catalog.card_faces.clone(),
            punish_videos: catalog.mismatch_videos.clone(),
            cards,
            face_up: SmallVec::new(),
            state: MemoryState::default(),
            matched_pairs: 0,
            fail_count: 0,
            max_fails: max_fails.max(1),
            punishment: None,
            popups: PopupManager::new(),
            rules,
            result: ReportOnce::default(),
        })
    }

    pub fn cards(&self) -> &[MemoryCard] {
        &self.cards
    }

    pub fn face(&self, card: &MemoryCard) -> &CardFace {
        &self.faces[card.face]
    }

    pub fn state(&self) -> MemoryState {
        self.state
    }

    pub fn pair_count(&self) -> usize {
        self.faces.len()
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn fail_count(&self) -> u8 {
        self.fail_count
    }

    pub fn max_fails(&self) -> u8 {
        self.max_fails
    }

    pub fn chances_left(&self) -> u8 {
        self.max_fails.saturating_sub(self.fail_count)
    }

    /// The punishment video currently on screen, if any.
    pub fn popups(&self) -> &PopupManager {
        &self.popups
    }

    /// Turns a card face up. Locked input, face-up and matched cards are ignored.
    pub fn flip(&mut self, card_id: usize) -> Result<(FlipOutcome, Effects<MemoryEffect>)> {
        let mut effects = Effects::new();
        let card = *self
            .cards
            .get(card_id)
            .ok_or(GameError::InvalidCard(card_id))?;

        if self.state != MemoryState::Playing || !card.is_flippable() || self.face_up.len() >= 2 {
            log::trace!("flip of card {} ignored in {:?}", card_id, self.state);
            return Ok((FlipOutcome::Ignored, effects));
        }

        self.cards[card_id].face_up = true;
        self.face_up.push(card_id);
        effects.push(MemoryEffect::PlayCue(self.faces[card.face].sound.clone()));

        if let [first, second] = self.face_up[..] {
            self.state = MemoryState::Checking;
            if self.cards[first].face == self.cards[second].face {
                effects.push(self.schedule(self.rules.match_delay_ms, MemoryTick::ResolveMatch));
            } else {
                self.fail_count = self.fail_count.saturating_add(1);
                log::debug!("mismatch {}/{}", self.fail_count, self.max_fails);
                if self.fail_count >= self.max_fails {
                    self.state = MemoryState::Lost;
                    effects.push(self.schedule(
                        self.rules.fail_delay_ms,
                        MemoryTick::Finish(StageResult::Fail),
                    ));
                } else {
                    effects.push(self.schedule(self.rules.punish_delay_ms, MemoryTick::Punish));
                    effects.push(self.schedule(self.rules.mismatch_delay_ms, MemoryTick::FlipBack));
                }
            }
        }

        Ok((FlipOutcome::Flipped, effects))
    }

    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        tick: MemoryTick,
        env: TickEnv<'_, R>,
    ) -> Effects<MemoryEffect> {
        let TickEnv { rng, viewport, now } = env;
        let mut effects = Effects::new();
        match tick {
            MemoryTick::ResolveMatch if self.state == MemoryState::Checking => {
                for &id in &self.face_up {
                    self.cards[id].matched = true;
                }
                self.face_up.clear();
                self.matched_pairs += 1;
                if self.matched_pairs == self.pair_count() {
                    self.state = MemoryState::Won;
                    effects.push(self.schedule(
                        self.rules.complete_delay_ms,
                        MemoryTick::Finish(StageResult::Complete),
                    ));
                } else {
                    self.state = MemoryState::Playing;
                }
            }
            MemoryTick::Punish if self.state == MemoryState::Checking => {
                if let Some(video) = pick(&self.punish_videos, &mut *rng).cloned() {
                    let position = pick_popup_position(viewport, rng);
                    let id = self
                        .popups
                        .spawn(PopupSpec::punishment(video, position), now);
                    self.punishment = Some(id);
                }
            }
            MemoryTick::FlipBack if self.state == MemoryState::Checking => {
                for &id in &self.face_up {
                    self.cards[id].face_up = false;
                }
                self.face_up.clear();
                self.hide_punishment();
                self.state = MemoryState::Playing;
            }
            MemoryTick::Finish(result) => {
                self.hide_punishment();
                if let Some(result) = self.result.report(result) {
                    effects.push(MemoryEffect::Finished(result));
                }
            }
            other => log::trace!("stale memory tick {:?} in {:?}", other, self.state),
        }
        effects
    }

    fn hide_punishment(&mut self) {
        if let Some(id) = self.punishment.take() {
            self.popups.close(id, CloseReason::Manual);
            self.popups.retire(id);
        }
    }

    fn schedule(&self, after_ms: Millis, tick: MemoryTick) -> MemoryEffect {
        MemoryEffect::Schedule(Deferred::new(after_ms, tick))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec;

    fn catalog(pairs: usize) -> AssetCatalog {
        AssetCatalog {
            card_faces: (0..pairs)
                .map(|i| CardFace {
                    id: format!("{i}"),
                    image: AssetKey::new(format!("/img/{i}.png")),
                    sound: AssetKey::new(format!("/snd/{i}.mp3")),
                })
                .collect(),
            mismatch_videos: vec!["/no.mp4".into()],
            ..Default::default()
        }
    }

    fn engine(pairs: usize, max_fails: u8) -> (MemoryEngine, SmallRng) {
        let mut rng = SmallRng::seed_from_u64(11);
        let engine =
            MemoryEngine::new(&catalog(pairs), max_fails, MemoryRules::default(), &mut rng)
                .unwrap();
        (engine, rng)
    }

    fn env(rng: &mut SmallRng) -> TickEnv<'_, SmallRng> {
        TickEnv {
            rng,
            viewport: Viewport::default(),
            now: Instant::now(),
        }
    }

    fn pair_of(engine: &MemoryEngine, face: usize) -> (usize, usize) {
        let ids: Vec<usize> = engine
            .cards()
            .iter()
            .filter(|card| card.face == face)
            .map(|card| card.id)
            .collect();
        (ids[0], ids[1])
    }

    fn mismatch(engine: &MemoryEngine) -> (usize, usize) {
        (pair_of(engine, 0).0, pair_of(engine, 1).0)
    }

    fn ticks(effects: &[MemoryEffect]) -> Vec<MemoryTick> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                MemoryEffect::Schedule(deferred) => Some(deferred.tick),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn deck_has_exactly_two_cards_per_face() {
        let (engine, _) = engine(6, 3);
        assert_eq!(engine.cards().len(), 12);
        for face in 0..6 {
            assert_eq!(engine.cards().iter().filter(|c| c.face == face).count(), 2);
        }
        for (index, card) in engine.cards().iter().enumerate() {
            assert_eq!(card.id, index);
        }
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let mut rng = SmallRng::seed_from_u64(0);
        let result = MemoryEngine::new(&catalog(0), 3, MemoryRules::default(), &mut rng);
        assert!(matches!(result, Err(GameError::EmptyCatalog(_))));
    }

    #[test]
    fn flip_plays_the_card_cue() {
        let (mut engine, _) = engine(2, 3);
        let card = engine.cards()[0];

        let (outcome, effects) = engine.flip(card.id).unwrap();

        assert_eq!(outcome, FlipOutcome::Flipped);
        assert_eq!(
            effects.as_slice(),
            [MemoryEffect::PlayCue(engine.face(&card).sound.clone())]
        );
    }

    #[test]
    fn unknown_card_is_an_error() {
        let (mut engine, _) = engine(2, 3);
        assert_eq!(engine.flip(99).unwrap_err(), GameError::InvalidCard(99));
    }

    #[test]
    fn third_flip_is_ignored_while_pair_is_pending() {
        let (mut engine, _) = engine(3, 3);
        let (a, b) = mismatch(&engine);
        let third = pair_of(&engine, 2).0;
        engine.flip(a).unwrap();
        engine.flip(b).unwrap();
        let before: Vec<MemoryCard> = engine.cards().to_vec();

        let (outcome, effects) = engine.flip(third).unwrap();

        assert_eq!(outcome, FlipOutcome::Ignored);
        assert!(effects.is_empty());
        assert_eq!(engine.cards(), before.as_slice());
    }

    #[test]
    fn same_card_twice_is_ignored() {
        let (mut engine, _) = engine(2, 3);
        engine.flip(0).unwrap();
        assert_eq!(engine.flip(0).unwrap().0, FlipOutcome::Ignored);
    }

    #[test]
    fn match_resolves_after_delay() {
        let (mut engine, mut rng) = engine(2, 3);
        let (a, b) = pair_of(&engine, 0);
        engine.flip(a).unwrap();
        let (_, effects) = engine.flip(b).unwrap();
        assert_eq!(ticks(&effects), [MemoryTick::ResolveMatch]);
        assert_eq!(engine.state(), MemoryState::Checking);

        engine.tick(MemoryTick::ResolveMatch, env(&mut rng));

        assert_eq!(engine.matched_pairs(), 1);
        assert_eq!(engine.state(), MemoryState::Playing);
        assert!(engine.cards()[a].matched && engine.cards()[b].matched);
        assert_eq!(engine.flip(a).unwrap().0, FlipOutcome::Ignored);
    }

    #[test]
    fn mismatch_punishes_then_flips_back() {
        let (mut engine, mut rng) = engine(2, 3);
        let (a, b) = mismatch(&engine);
        engine.flip(a).unwrap();
        let (_, effects) = engine.flip(b).unwrap();
        assert_eq!(ticks(&effects), [MemoryTick::Punish, MemoryTick::FlipBack]);
        assert_eq!(engine.fail_count(), 1);

        engine.tick(MemoryTick::Punish, env(&mut rng));
        let punishment = engine.popups().visible().next().unwrap();
        assert!(!punishment.spec.show_close_button);

        engine.tick(MemoryTick::FlipBack, env(&mut rng));
        assert_eq!(engine.popups().visible().count(), 0);
        assert!(!engine.cards()[a].face_up && !engine.cards()[b].face_up);
        assert_eq!(engine.state(), MemoryState::Playing);
        assert_eq!(engine.chances_left(), 2);
    }

    #[test]
    fn reaching_max_fails_is_terminal_and_reported_once() {
        let (mut engine, mut rng) = engine(3, 2);
        for round in 1..=2u8 {
            let (a, b) = mismatch(&engine);
            engine.flip(a).unwrap();
            let (_, effects) = engine.flip(b).unwrap();
            if round < 2 {
                engine.tick(MemoryTick::FlipBack, env(&mut rng));
            } else {
                assert_eq!(ticks(&effects), [MemoryTick::Finish(StageResult::Fail)]);
            }
        }
        assert_eq!(engine.state(), MemoryState::Lost);

        let first = engine.tick(MemoryTick::Finish(StageResult::Fail), env(&mut rng));
        let second = engine.tick(MemoryTick::Finish(StageResult::Fail), env(&mut rng));
        assert_eq!(first.as_slice(), [MemoryEffect::Finished(StageResult::Fail)]);
        assert!(second.is_empty());
        assert_eq!(engine.flip(pair_of(&engine, 2).0).unwrap().0, FlipOutcome::Ignored);
    }

    #[test]
    fn clearing_every_pair_completes() {
        let (mut engine, mut rng) = engine(3, 3);
        let mut last = Effects::new();
        for face in 0..3 {
            let (a, b) = pair_of(&engine, face);
            engine.flip(a).unwrap();
            engine.flip(b).unwrap();
            last = engine.tick(MemoryTick::ResolveMatch, env(&mut rng));
        }

        assert_eq!(engine.state(), MemoryState::Won);
        assert_eq!(ticks(&last), [MemoryTick::Finish(StageResult::Complete)]);
        let done = engine.tick(MemoryTick::Finish(StageResult::Complete), env(&mut rng));
        assert_eq!(done.as_slice(), [MemoryEffect::Finished(StageResult::Complete)]);
    }

    #[test]
    fn stale_flip_back_after_loss_is_ignored() {
        let (mut engine, mut rng) = engine(2, 1);
        let (a, b) = mismatch(&engine);
        engine.flip(a).unwrap();
        engine.flip(b).unwrap();

        let effects = engine.tick(MemoryTick::FlipBack, env(&mut rng));

        assert!(effects.is_empty());
        assert!(engine.cards()[a].face_up);
        assert_eq!(engine.state(), MemoryState::Lost);
    }
}
