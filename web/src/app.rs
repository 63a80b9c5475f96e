use std::rc::Rc;

use gauntlet_core::{AssetCatalog, Screen, Stage, StageController, StageEvent, Transition};
use yew::prelude::*;

use crate::memory::MemoryView;
use crate::screens::{CollaboratorView, CompleteView, DialogView, GameOverView, MenuView};
use crate::sweeper::SweeperView;
use crate::utils::{HasUpdate, js_random_seed};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Stage(StageEvent),
    SelectLevel(String),
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct AppProps {
    pub catalog: Rc<AssetCatalog>,
    /// Fixed seed from the command line, otherwise every attempt is random.
    #[prop_or_default]
    pub seed: Option<u64>,
}

pub(crate) struct App {
    controller: StageController,
    /// Bumped whenever a game is mounted, so a retry never reuses a board.
    attempt: u64,
    seed: u64,
}

impl App {
    fn next_seed(&self, ctx: &Context<Self>) -> u64 {
        match ctx.props().seed {
            Some(seed) => seed.wrapping_add(self.attempt),
            None => js_random_seed(),
        }
    }

    fn view_stage(&self, ctx: &Context<Self>, stage: Stage) -> Html {
        let link = ctx.link();
        let on_complete = link.callback(move |_| Msg::Stage(StageEvent::Completed(stage)));
        let on_fail = link.callback(move |_| Msg::Stage(StageEvent::Failed(stage)));
        let catalog = ctx.props().catalog.clone();
        let key = self.attempt;
        let seed = self.seed;

        match stage {
            Stage::Memory => html! {
                <MemoryView
                    key={key}
                    {catalog}
                    {seed}
                    max_fails={self.controller.memory_max_fails()}
                    {on_complete}
                    {on_fail}
                />
            },
            Stage::Minesweeper => html! {
                <SweeperView key={key} {catalog} {seed} {on_complete} {on_fail}/>
            },
            Stage::Qte | Stage::Drag | Stage::Whack => html! {
                <CollaboratorView key={key} {stage} {on_complete}/>
            },
        }
    }
}

impl Component for App {
    type Message = Msg;
    type Properties = AppProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut app = Self {
            controller: StageController::default(),
            attempt: 0,
            seed: 0,
        };
        app.seed = app.next_seed(ctx);
        app
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let transition = match msg {
            Msg::Stage(event) => self.controller.apply(event),
            Msg::SelectLevel(key) => {
                let selected = self.controller.select_level(&key);
                if !selected.has_update() {
                    return false;
                }
                selected.unwrap_or(Transition::Ignored)
            }
        };

        if let Transition::Moved {
            to: Screen::Playing { intro: false, .. },
            ..
        } = transition
        {
            self.attempt += 1;
            self.seed = self.next_seed(ctx);
            log::debug!("attempt {} with seed {}", self.attempt, self.seed);
        }
        transition.has_update()
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let event = |event: StageEvent| link.callback(move |_| Msg::Stage(event));

        html! {
            <main class="gauntlet-app">
                {
                    match self.controller.screen() {
                        Screen::Menu => html! {
                            <MenuView
                                on_start={event(StageEvent::Start)}
                                on_select_level={link.callback(Msg::SelectLevel)}
                            />
                        },
                        Screen::Playing { stage, intro: true } => match self.controller.intro() {
                            Some(content) => html! {
                                <DialogView key={stage.key()} {content} on_start={event(StageEvent::Begin)}/>
                            },
                            None => html! {},
                        },
                        Screen::Playing { stage, intro: false } => self.view_stage(ctx, stage),
                        Screen::Complete => html! {
                            <CompleteView on_restart={event(StageEvent::Restart)}/>
                        },
                        Screen::GameOver => html! {
                            <GameOverView
                                next_chances={self.controller.memory_max_fails()}
                                on_retry={event(StageEvent::Retry)}
                                on_restart={event(StageEvent::Restart)}
                            />
                        },
                    }
                }
            </main>
        }
    }
}
