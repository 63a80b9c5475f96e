use gauntlet_core::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use web_time::Instant;

fn env(rng: &mut SmallRng) -> TickEnv<'_, SmallRng> {
    TickEnv {
        rng,
        viewport: Viewport::new(1024.0, 768.0),
        now: Instant::now(),
    }
}

fn catalog() -> AssetCatalog {
    AssetCatalog {
        card_faces: (0..6)
            .map(|i| CardFace {
                id: i.to_string(),
                image: AssetKey::new(format!("/cards/{i}.png")),
                sound: AssetKey::new(format!("/cards/{i}.mp3")),
            })
            .collect(),
        mismatch_videos: vec!["/videos/oops.mp4".into()],
        distraction_videos: vec!["/videos/a.mp4".into(), "/videos/b.mp4".into()],
        ..Default::default()
    }
}

/// Runs every scheduled tick immediately, closing nothing, until `Finished`.
fn drain(game: &mut SweepGame, effects: Effects<SweepEffect>, rng: &mut SmallRng) -> Vec<StageResult> {
    let mut queue: Vec<SweepEffect> = effects.into_vec();
    let mut results = Vec::new();
    while let Some(effect) = queue.pop() {
        match effect {
            SweepEffect::Schedule(Deferred { tick, .. }) => {
                if matches!(tick, SweepTick::Distraction { .. }) {
                    continue;
                }
                queue.extend(game.tick(tick, env(rng)));
            }
            SweepEffect::Finished(result) => results.push(result),
            SweepEffect::Explode => {}
        }
    }
    results
}

#[test]
fn chord_reveal_opens_the_unflagged_neighbors() {
    // . 1 .
    // * 1 .
    // . 1 .
    let layout = MineLayout::from_mine_coords((3, 3), &[(0, 1)]).unwrap();
    let mut engine = SweepEngine::new(layout);

    assert_eq!(engine.reveal((1, 1)).unwrap(), RevealOutcome::Revealed);
    assert!(!engine.can_chord_reveal_at((1, 1)));
    engine.toggle_flag((0, 1)).unwrap();
    assert!(engine.can_chord_reveal_at((1, 1)));

    let outcome = engine.reveal((1, 1)).unwrap();

    assert_eq!(outcome, RevealOutcome::Won);
    assert_eq!(engine.cell_at((0, 0)), EngineCell::Revealed(1));
    assert_eq!(engine.cell_at((2, 1)), EngineCell::Revealed(0));
    assert_eq!(engine.cell_at((0, 1)), EngineCell::Flagged);
}

#[test]
fn three_unclosed_distractions_fail_the_minesweeper_stage() {
    let mut rng = SmallRng::seed_from_u64(21);
    let layout = RandomLayoutGenerator::new(21).generate(FieldConfig::CHALLENGE);
    let mut game = SweepGame::new(layout, &catalog(), SweepRules::default());
    game.start(&mut rng);

    let mut effects = Effects::new();
    for _ in 0..3 {
        let epoch = game.epoch();
        game.tick(SweepTick::Distraction { epoch }, env(&mut rng));
        let id = game.popups().visible().last().unwrap().id;
        effects = game.close_popup(id, CloseReason::Auto);
    }

    assert_eq!(game.missed(), 3);
    assert!(game.is_over());
    assert_eq!(drain(&mut game, effects, &mut rng), [StageResult::Fail]);
    assert_eq!(
        game.reveal((0, 0)).unwrap_err(),
        GameError::AlreadyEnded
    );
}

#[test]
fn closing_a_distraction_by_hand_does_not_count_as_a_miss() {
    let mut rng = SmallRng::seed_from_u64(22);
    let layout = RandomLayoutGenerator::new(22).generate(FieldConfig::CHALLENGE);
    let mut game = SweepGame::new(layout, &catalog(), SweepRules::default());

    let mut ids = Vec::new();
    for _ in 0..3 {
        let epoch = game.epoch();
        game.tick(SweepTick::Distraction { epoch }, env(&mut rng));
        ids.push(game.popups().visible().last().unwrap().id);
    }
    game.close_popup(ids[0], CloseReason::Auto);
    game.close_popup(ids[1], CloseReason::Manual);
    game.close_popup(ids[2], CloseReason::Auto);
    // The video of the hand-closed popup still fires `ended` afterwards.
    game.close_popup(ids[1], CloseReason::Auto);

    assert_eq!(game.missed(), 2);
    assert!(!game.is_over());
}

#[test]
fn clearing_the_field_reports_complete_once() {
    let mut rng = SmallRng::seed_from_u64(23);
    let layout = MineLayout::from_mine_coords((4, 4), &[(3, 3)]).unwrap();
    let mut game = SweepGame::new(layout, &catalog(), SweepRules::default());

    let effects = game.reveal((0, 0)).unwrap();

    assert_eq!(
        effects.as_slice(),
        [SweepEffect::Schedule(Deferred::new(
            1000,
            SweepTick::Finish {
                epoch: 0,
                result: StageResult::Complete,
            }
        ))]
    );
    let doubled: Effects<SweepEffect> = effects.iter().chain(effects.iter()).cloned().collect();
    assert_eq!(drain(&mut game, doubled, &mut rng), [StageResult::Complete]);
}

#[test]
fn memory_failure_feeds_back_into_the_next_attempt() {
    let mut rng = SmallRng::seed_from_u64(24);
    let mut controller = StageController::default();
    controller.apply(StageEvent::Start);
    controller.apply(StageEvent::Begin);

    let mut memory = MemoryEngine::new(
        &catalog(),
        controller.memory_max_fails(),
        MemoryRules::default(),
        &mut rng,
    )
    .unwrap();
    let mut finished = None;
    while finished.is_none() {
        let cards = memory.cards();
        let a = cards.iter().find(|card| card.face == 0).unwrap().id;
        let b = cards.iter().find(|card| card.face == 1).unwrap().id;
        memory.flip(a).unwrap();
        let (_, effects) = memory.flip(b).unwrap();
        for effect in effects {
            if let MemoryEffect::Schedule(Deferred { tick, .. }) = effect {
                for done in memory.tick(tick, env(&mut rng)) {
                    if let MemoryEffect::Finished(result) = done {
                        finished = Some(result);
                    }
                }
            }
        }
    }

    assert_eq!(finished, Some(StageResult::Fail));
    assert_eq!(memory.fail_count(), 3);
    controller.apply(StageEvent::Failed(Stage::Memory));
    controller.apply(StageEvent::Retry);
    assert_eq!(controller.memory_max_fails(), 4);

    let retry = MemoryEngine::new(
        &catalog(),
        controller.memory_max_fails(),
        MemoryRules::default(),
        &mut rng,
    )
    .unwrap();
    assert_eq!(retry.chances_left(), 4);
}
