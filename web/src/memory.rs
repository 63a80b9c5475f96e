use std::rc::Rc;

use gauntlet_core::{
    AssetCatalog, Effects, MemoryCard, MemoryEffect, MemoryEngine, MemoryRules, MemoryState,
    MemoryTick, StageResult, TickEnv,
};
use rand::prelude::*;
use web_time::Instant;
use yew::prelude::*;

use crate::popup::PopupLayer;
use crate::timers::{TimerBank, TimerId};
use crate::utils::{play_sound, viewport};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Flip(usize),
    Timer(TimerId, MemoryTick),
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct MemoryProps {
    pub catalog: Rc<AssetCatalog>,
    pub seed: u64,
    pub max_fails: u8,
    pub on_complete: Callback<()>,
    pub on_fail: Callback<()>,
}

#[derive(Properties, Clone, PartialEq)]
struct CardProps {
    card: MemoryCard,
    image: AttrValue,
    #[prop_or_default]
    locked: bool,
    on_flip: Callback<usize>,
}

#[function_component]
fn Card(props: &CardProps) -> Html {
    let CardProps {
        card,
        image,
        locked,
        on_flip,
    } = props.clone();
    let class = classes!(
        "card",
        card.face_up.then_some("flipped"),
        card.matched.then_some("matched"),
        locked.then_some("locked"),
    );
    let onclick = Callback::from(move |_: MouseEvent| on_flip.emit(card.id));

    html! {
        <button {class} {onclick}>
            if card.face_up || card.matched {
                <img src={image} alt="card"/>
            } else {
                <span class="back">{"?"}</span>
            }
        </button>
    }
}

/// The memory stage: a shuffled board of pairs and a punishment video per miss.
pub(crate) struct MemoryView {
    engine: Option<MemoryEngine>,
    rng: SmallRng,
    timers: TimerBank,
}

impl MemoryView {
    fn apply(&mut self, ctx: &Context<Self>, effects: Effects<MemoryEffect>) {
        for effect in effects {
            match effect {
                MemoryEffect::PlayCue(sound) => play_sound(&sound),
                MemoryEffect::Schedule(deferred) => {
                    self.timers.schedule(ctx.link(), deferred, Msg::Timer)
                }
                MemoryEffect::Finished(StageResult::Complete) => ctx.props().on_complete.emit(()),
                MemoryEffect::Finished(StageResult::Fail) => ctx.props().on_fail.emit(()),
            }
        }
    }

    fn view_hud(engine: &MemoryEngine) -> Html {
        html! {
            <nav>
                <aside title="Chances left">{format!("♥ {}", engine.chances_left())}</aside>
                <aside title="Pairs found">
                    {format!("{} / {}", engine.matched_pairs(), engine.pair_count())}
                </aside>
            </nav>
        }
    }
}

impl Component for MemoryView {
    type Message = Msg;
    type Properties = MemoryProps;

    fn create(ctx: &Context<Self>) -> Self {
        let MemoryProps {
            catalog,
            seed,
            max_fails,
            ..
        } = ctx.props();
        let mut rng = SmallRng::seed_from_u64(*seed);
        let engine = match MemoryEngine::new(catalog, *max_fails, MemoryRules::default(), &mut rng)
        {
            Ok(engine) => Some(engine),
            Err(err) => {
                log::error!("could not deal the memory board: {}", err);
                None
            }
        };
        Self {
            engine,
            rng,
            timers: TimerBank::default(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        let effects = match msg {
            Msg::Flip(card_id) => match engine.flip(card_id) {
                Ok((outcome, effects)) => {
                    log::debug!("flip {}: {:?}", card_id, outcome);
                    effects
                }
                Err(err) => {
                    log::warn!("flip rejected: {}", err);
                    return false;
                }
            },
            Msg::Timer(id, tick) => {
                self.timers.fired(id);
                engine.tick(
                    tick,
                    TickEnv {
                        rng: &mut self.rng,
                        viewport: viewport(),
                        now: Instant::now(),
                    },
                )
            }
        };
        self.apply(ctx, effects);
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let Some(engine) = self.engine.as_ref() else {
            return html! {
                <div class="gauntlet memory error">{"The card deck is missing."}</div>
            };
        };
        let locked = engine.state() != MemoryState::Playing;
        let on_flip = ctx.link().callback(Msg::Flip);
        let popups: Vec<_> = engine.popups().visible().cloned().collect();

        html! {
            <div class="gauntlet memory">
                { Self::view_hud(engine) }
                <div class="cards">
                    {
                        for engine.cards().iter().map(|card| {
                            let image: AttrValue = engine.face(card).image.to_string().into();
                            html! {
                                <Card key={card.id} card={*card} {image} {locked} on_flip={on_flip.clone()}/>
                            }
                        })
                    }
                </div>
                <PopupLayer {popups} viewport={viewport()}/>
            </div>
        }
    }
}
