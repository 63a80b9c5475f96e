use gauntlet_core::{DialogContent, Stage};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct MenuProps {
    pub on_start: Callback<()>,
    pub on_select_level: Callback<String>,
}

#[function_component]
pub(crate) fn MenuView(props: &MenuProps) -> Html {
    let on_start = props.on_start.reform(|_: MouseEvent| ());
    let levels = Stage::ALL.into_iter().map(|stage| {
        let onclick = props
            .on_select_level
            .reform(move |_: MouseEvent| stage.key().to_string());
        html! {
            <li key={stage.key()}>
                <button class="secondary" {onclick}>
                    {format!("{}. {}", stage.number(), stage.name())}
                </button>
            </li>
        }
    });

    html! {
        <article class="menu">
            <h1>{"The Gauntlet"}</h1>
            <button onclick={on_start}>{"Start"}</button>
            <details>
                <summary>{"Pick a level"}</summary>
                <ul>{ for levels }</ul>
            </details>
        </article>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct DialogProps {
    pub content: DialogContent,
    pub on_start: Callback<()>,
}

#[function_component]
pub(crate) fn DialogView(props: &DialogProps) -> Html {
    let DialogContent { title, lines } = &props.content;
    let onclick = props.on_start.reform(|_: MouseEvent| ());

    html! {
        <dialog open=true class="intro">
            <article>
                <h2>{title.as_str()}</h2>
                <ul>
                    { for lines.iter().map(|line| html! { <li>{line.as_str()}</li> }) }
                </ul>
                <footer>
                    <button {onclick}>{"Go!"}</button>
                </footer>
            </article>
        </dialog>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct CollaboratorProps {
    pub stage: Stage,
    pub on_complete: Callback<()>,
}

/// Placeholder for the stages that are played outside this crate.
#[function_component]
pub(crate) fn CollaboratorView(props: &CollaboratorProps) -> Html {
    let onclick = props.on_complete.reform(|_: MouseEvent| ());

    html! {
        <article class="collaborator">
            <h2>{props.stage.name()}</h2>
            <button {onclick}>{"Done"}</button>
        </article>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct CompleteProps {
    pub on_restart: Callback<()>,
}

#[function_component]
pub(crate) fn CompleteView(props: &CompleteProps) -> Html {
    let onclick = props.on_restart.reform(|_: MouseEvent| ());

    html! {
        <article class="complete">
            <h1>{"You made it through!"}</h1>
            <button {onclick}>{"Back to menu"}</button>
        </article>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct GameOverProps {
    pub next_chances: u8,
    pub on_retry: Callback<()>,
    pub on_restart: Callback<()>,
}

#[function_component]
pub(crate) fn GameOverView(props: &GameOverProps) -> Html {
    let on_retry = props.on_retry.reform(|_: MouseEvent| ());
    let on_restart = props.on_restart.reform(|_: MouseEvent| ());

    html! {
        <article class="game-over">
            <h1>{"Game over"}</h1>
            <p>{format!("Next time you get {} chances!", props.next_chances)}</p>
            <footer>
                <button onclick={on_retry}>{"Try again"}</button>
                <button class="secondary" onclick={on_restart}>{"Menu"}</button>
            </footer>
        </article>
    }
}
