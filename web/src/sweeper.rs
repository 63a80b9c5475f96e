use std::rc::Rc;

use bitflags::bitflags;
use gauntlet_core::{
    AssetCatalog, AssetKey, CloseReason, Coord, Coord2, EngineCell, EngineState, Effects,
    FieldConfig, LayoutGenerator, PopupId, RandomLayoutGenerator, StageResult, SweepEffect,
    SweepGame, SweepRules, SweepTick, TickEnv,
};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use web_time::Instant;
use yew::prelude::*;

use crate::popup::PopupLayer;
use crate::timers::{TimerBank, TimerId};
use crate::utils::{HasUpdate, Modal, format_for_counter, viewport};

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct MouseButtons: u16 {
        const LEFT    = 1;
        const RIGHT   = 1 << 1;
        const MIDDLE  = 1 << 2;
        const BACK    = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TileState {
    pos: Coord2,
    buttons: MouseButtons,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) enum TileMsg {
    Update(TileState),
    Leave,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    TileEvent(TileMsg),
    Timer(TimerId, SweepTick),
    ClosePopup(PopupId, CloseReason),
}

#[derive(Properties, Clone, PartialEq)]
struct TileProps {
    x: Coord,
    y: Coord,
    cell: EngineCell,
    /// Set once the field is lost so untouched mines show up.
    #[prop_or_default]
    exposed_mine: bool,
    #[prop_or_default]
    art: Option<AssetKey>,
    #[prop_or_default]
    pressed: bool,
    callback: Callback<TileMsg>,
}

fn mouse_handler(callback: &Callback<TileMsg>, pos: Coord2, leave: bool) -> Callback<MouseEvent> {
    let callback = callback.clone();
    Callback::from(move |e: MouseEvent| {
        let buttons = MouseButtons::from_bits_truncate(e.buttons());
        log::trace!("{:?} mouse {} ({:?})", pos, e.type_(), buttons);
        if leave {
            callback.emit(TileMsg::Leave);
        } else {
            callback.emit(TileMsg::Update(TileState { pos, buttons }));
        }
    })
}

#[function_component(Tile)]
fn tile_component(props: &TileProps) -> Html {
    let TileProps {
        x,
        y,
        cell,
        exposed_mine,
        art,
        pressed,
        callback,
    } = props.clone();

    let mut class = classes!(
        "cell",
        match cell {
            EngineCell::Hidden if exposed_mine => classes!("mine"),
            EngineCell::Hidden => classes!(),
            EngineCell::Flagged => classes!("flag"),
            EngineCell::Revealed(count) => classes!("open", format!("num-{}", count)),
            EngineCell::Detonated => classes!("mine", "oops"),
        }
    );
    if pressed {
        class.push("open");
    }

    let show_art = exposed_mine || cell == EngineCell::Detonated;
    let content = match (show_art, art) {
        (true, Some(art)) => html! { <img src={art.to_string()} alt="mine"/> },
        _ => html! {},
    };

    let pos = (x, y);
    let onmousedown = mouse_handler(&callback, pos, false);
    let onmouseup = mouse_handler(&callback, pos, false);
    let onmouseenter = mouse_handler(&callback, pos, false);
    let onmouseleave = mouse_handler(&callback, pos, true);

    html! {
        <td {class} {onmousedown} {onmouseup} {onmouseenter} {onmouseleave}>{content}</td>
    }
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct SweeperProps {
    pub catalog: Rc<AssetCatalog>,
    pub seed: u64,
    pub on_complete: Callback<()>,
    pub on_fail: Callback<()>,
}

/// The minesweeper stage: the field, its HUD and the distraction popups.
pub(crate) struct SweeperView {
    game: SweepGame,
    rng: SmallRng,
    timers: TimerBank,
    cur_tile_state: Option<TileState>,
}

impl SweeperView {
    fn apply(&mut self, ctx: &Context<Self>, effects: Effects<SweepEffect>) {
        for effect in effects {
            match effect {
                SweepEffect::Schedule(deferred) => {
                    self.timers.schedule(ctx.link(), deferred, Msg::Timer)
                }
                SweepEffect::Explode => log::info!("mine hit, playing explosion"),
                SweepEffect::Finished(StageResult::Complete) => ctx.props().on_complete.emit(()),
                SweepEffect::Finished(StageResult::Fail) => ctx.props().on_fail.emit(()),
            }
        }
    }

    fn open_tile(&mut self, ctx: &Context<Self>, coords: Coord2) -> bool {
        match self.game.reveal(coords) {
            Ok(effects) => {
                self.apply(ctx, effects);
                true
            }
            Err(err) => {
                log::trace!("reveal at {:?} ignored: {}", coords, err);
                false
            }
        }
    }

    fn flag(&mut self, coords: Coord2) -> bool {
        self.game.toggle_flag(coords).has_update()
    }

    fn is_mid_open(&self) -> bool {
        matches!(
            self.cur_tile_state,
            Some(TileState {
                buttons: MouseButtons::LEFT,
                ..
            })
        )
    }

    fn get_game_state_class(&self) -> Classes {
        let mid_open = self.is_mid_open();
        classes!(match self.game.engine().state() {
            EngineState::Ready | EngineState::Active if mid_open => "mid-open",
            EngineState::Ready => "not-started",
            EngineState::Active => "in-progress",
            EngineState::Won => "win",
            EngineState::Lost => "lose",
        })
    }

    fn is_pressed(&self, coords: Coord2, cell: EngineCell) -> bool {
        let engine = self.game.engine();
        if engine.is_finished() || cell != EngineCell::Hidden {
            return false;
        }
        const fn is_neighbor(a: Coord2, b: Coord2) -> bool {
            (a.0.abs_diff(b.0) <= 1) && (a.1.abs_diff(b.1) <= 1)
        }
        match self.cur_tile_state {
            Some(TileState {
                pos,
                buttons: MouseButtons::LEFT,
            }) => pos == coords || (is_neighbor(pos, coords) && engine.can_chord_reveal_at(pos)),
            _ => false,
        }
    }

    fn view_tile(&self, ctx: &Context<Self>, x: Coord, y: Coord) -> Html {
        let engine = self.game.engine();
        let coords = (x, y);
        let cell = engine.cell_at(coords);
        let exposed_mine = engine.state() == EngineState::Lost
            && cell == EngineCell::Hidden
            && engine.has_mine_at(coords);
        let art = engine
            .layout()
            .mine_art(coords)
            .and_then(|index| ctx.props().catalog.mine_art_at(index).cloned());
        let pressed = self.is_pressed(coords, cell);
        let callback = ctx.link().callback(Msg::TileEvent);
        html! {
            <Tile {x} {y} {cell} {exposed_mine} {art} {pressed} {callback}/>
        }
    }

    fn view_explosion(&self, ctx: &Context<Self>) -> Html {
        match (&ctx.props().catalog.explosion_video, self.game.is_exploding()) {
            (Some(video), true) => html! {
                <Modal>
                    <div class="explosion">
                        <video src={video.to_string()} autoplay=true/>
                    </div>
                </Modal>
            },
            _ => html! {},
        }
    }
}

impl Component for SweeperView {
    type Message = Msg;
    type Properties = SweeperProps;

    fn create(ctx: &Context<Self>) -> Self {
        let SweeperProps { catalog, seed, .. } = ctx.props();
        let layout = RandomLayoutGenerator::new(*seed)
            .with_art_variants(catalog.mine_art_count())
            .generate(FieldConfig::CHALLENGE);
        let mut view = Self {
            game: SweepGame::new(layout, catalog, SweepRules::default()),
            rng: SmallRng::seed_from_u64(seed.wrapping_add(1)),
            timers: TimerBank::default(),
            cur_tile_state: None,
        };
        let effects = view.game.start(&mut view.rng);
        view.apply(ctx, effects);
        view
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;
        use TileMsg::*;

        match msg {
            TileEvent(Leave) => {
                log::trace!("tile leave");
                self.cur_tile_state.take().is_some()
            }
            TileEvent(Update(tile_state)) => {
                log::trace!("tile update: {:?}", tile_state);
                if tile_state.buttons.is_empty() {
                    // every button is up now, act on what was held before
                    match self.cur_tile_state.take() {
                        None => false,
                        Some(TileState { pos, buttons }) => match buttons {
                            MouseButtons::LEFT => {
                                log::debug!("open tile: {:?}", pos);
                                self.open_tile(ctx, pos);
                                true
                            }
                            MouseButtons::RIGHT => {
                                log::debug!("flag tile: {:?}", pos);
                                self.flag(pos);
                                true
                            }
                            // several buttons released together cancel, but pressed tiles need a redraw
                            _ => true,
                        },
                    }
                } else {
                    match self.cur_tile_state.replace(tile_state) {
                        None => true,
                        Some(TileState { pos, buttons }) => {
                            (pos != tile_state.pos)
                                || ((buttons & MouseButtons::LEFT)
                                    != (tile_state.buttons & MouseButtons::LEFT))
                        }
                    }
                }
            }
            Timer(id, tick) => {
                self.timers.fired(id);
                let effects = self.game.tick(
                    tick,
                    TickEnv {
                        rng: &mut self.rng,
                        viewport: viewport(),
                        now: Instant::now(),
                    },
                );
                self.apply(ctx, effects);
                !matches!(tick, SweepTick::Finish { .. })
            }
            ClosePopup(id, reason) => {
                let effects = self.game.close_popup(id, reason);
                let updated = !effects.is_empty();
                self.apply(ctx, effects);
                updated
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let (cols, rows) = self.game.engine().size();
        let game_state_class = self.get_game_state_class();
        let mines_left = format_for_counter(self.game.engine().mines_left());
        let missed = format!("{} / {}", self.game.missed(), self.game.rules().miss_limit);
        let popups: Vec<_> = self.game.popups().visible().cloned().collect();
        let on_close = ctx
            .link()
            .callback(|(id, reason): (PopupId, CloseReason)| Msg::ClosePopup(id, reason));

        html! {
            <div class="gauntlet sweeper" oncontextmenu={Callback::from(move |e: MouseEvent| e.prevent_default())}>
                <nav>
                    <aside title="Mines left">{mines_left}</aside>
                    <span><button class={game_state_class} disabled=true/></span>
                    <aside title="Missed distractions">{missed}</aside>
                </nav>
                <table>
                    {
                        for (0..rows).map(|y| html! {
                            <tr>
                                { for (0..cols).map(|x| self.view_tile(ctx, x, y)) }
                            </tr>
                        })
                    }
                </table>
                <PopupLayer {popups} viewport={viewport()} {on_close}/>
                { self.view_explosion(ctx) }
            </div>
        }
    }
}
