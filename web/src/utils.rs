use gauntlet_core::{AssetKey, MarkOutcome, RevealOutcome, Result, Transition, Viewport};
use gloo::utils::window;
use yew::prelude::*;

/// Whether an engine call changed anything worth a re-render. Errors never do.
pub(crate) trait HasUpdate {
    fn has_update(&self) -> bool;
}

impl HasUpdate for MarkOutcome {
    fn has_update(&self) -> bool {
        MarkOutcome::has_update(*self)
    }
}

impl HasUpdate for RevealOutcome {
    fn has_update(&self) -> bool {
        RevealOutcome::has_update(*self)
    }
}

impl HasUpdate for Transition {
    fn has_update(&self) -> bool {
        Transition::has_update(*self)
    }
}

impl<T: HasUpdate> HasUpdate for Result<T> {
    fn has_update(&self) -> bool {
        match self {
            Ok(outcome) => outcome.has_update(),
            Err(err) => {
                log::trace!("no update: {}", err);
                false
            }
        }
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct ModalProps {
    #[prop_or_default]
    pub children: Html,
}

/// Renders its children into `document.body`, so fixed overlays escape the board layout.
#[function_component]
pub(crate) fn Modal(props: &ModalProps) -> Html {
    let modal_host = gloo::utils::body();
    create_portal(props.children.clone(), modal_host.into())
}

/// Helper function to use JavaScript's Math.random
pub(crate) fn js_random_seed() -> u64 {
    use js_sys::Math::random;
    u64::from_be_bytes([
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
    ])
}

/// Current window size in CSS pixels, falling back to a desktop-sized default.
pub(crate) fn viewport() -> Viewport {
    let window = window();
    let width = window.inner_width().ok().and_then(|value| value.as_f64());
    let height = window.inner_height().ok().and_then(|value| value.as_f64());
    match (width, height) {
        (Some(width), Some(height)) => Viewport::new(width, height),
        _ => Viewport::default(),
    }
}

/// Fire-and-forget sound cue. A failed load or a blocked autoplay is only logged.
pub(crate) fn play_sound(key: &AssetKey) {
    match web_sys::HtmlAudioElement::new_with_src(key.as_str()) {
        Ok(audio) => {
            if let Err(err) = audio.play() {
                log::debug!("could not play {}: {:?}", key, err);
            }
        }
        Err(err) => log::warn!("could not create audio for {}: {:?}", key, err),
    }
}

pub(crate) fn format_for_counter(num: i32) -> String {
    match num {
        ..-99 => "-99".to_string(),
        -99..0 => format!("-{:02}", -num),
        0..1000 => format!("{:03}", num),
        1000.. => "999".to_string(),
    }
}
