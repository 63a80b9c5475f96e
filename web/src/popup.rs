use gauntlet_core::{CloseReason, Popup, PopupId, PopupPhase, Viewport, clamp_popup_position};
use web_sys::HtmlVideoElement;
use yew::prelude::*;

use crate::utils::Modal;

const POPUP_VOLUME: f64 = 0.3;

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct PopupVideoProps {
    pub popup: Popup,
    pub viewport: Viewport,
    pub on_close: Callback<(PopupId, CloseReason)>,
}

#[function_component]
pub(crate) fn PopupVideo(props: &PopupVideoProps) -> Html {
    let PopupVideoProps {
        popup,
        viewport,
        on_close,
    } = props.clone();
    let id = popup.id;
    let video_ref = use_node_ref();

    {
        let video_ref = video_ref.clone();
        use_effect_with(id, move |_| {
            if let Some(video) = video_ref.cast::<HtmlVideoElement>() {
                video.set_volume(POPUP_VOLUME);
                // A rejected autoplay just leaves the frame paused.
                if let Err(err) = video.play() {
                    log::debug!("{} could not start: {:?}", id, err);
                }
            }
        });
    }

    let onended = {
        let on_close = on_close.clone();
        let auto_close = popup.spec.auto_close_on_end;
        Callback::from(move |_: Event| {
            if auto_close {
                on_close.emit((id, CloseReason::Auto));
            }
        })
    };

    // A broken video must not stay up forever.
    let onerror = {
        let on_close = on_close.clone();
        let video = popup.spec.video.clone();
        Callback::from(move |_: Event| {
            log::warn!("{} failed to load {}", id, video);
            on_close.emit((id, CloseReason::Auto));
        })
    };

    let close_button = popup.spec.show_close_button.then(|| {
        let onclick = Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_close.emit((id, CloseReason::Manual));
        });
        html! { <button class="close" {onclick}>{"✕"}</button> }
    });

    let pos = clamp_popup_position(popup.spec.position, viewport);
    let class = classes!(
        "popup-video",
        viewport.is_compact().then_some("compact"),
        matches!(popup.phase, PopupPhase::Closing(_)).then_some("closing"),
    );
    let style = format!("left: {:.0}px; top: {:.0}px;", pos.x, pos.y);

    html! {
        <div {class} {style}>
            {close_button}
            <video
                ref={video_ref}
                src={popup.spec.video.to_string()}
                loop={popup.spec.looping}
                {onended}
                {onerror}
            />
        </div>
    }
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct PopupLayerProps {
    pub popups: Vec<Popup>,
    pub viewport: Viewport,
    #[prop_or_default]
    pub on_close: Callback<(PopupId, CloseReason)>,
}

/// Every visible popup of a game, rendered over the whole page.
#[function_component]
pub(crate) fn PopupLayer(props: &PopupLayerProps) -> Html {
    let PopupLayerProps {
        popups,
        viewport,
        on_close,
    } = props.clone();

    html! {
        <Modal>
            <div class="popup-layer">
                {
                    for popups.into_iter().map(|popup| {
                        let key = popup.id.get();
                        html! {
                            <PopupVideo key={key} {popup} {viewport} on_close={on_close.clone()}/>
                        }
                    })
                }
            </div>
        </Modal>
    }
}
