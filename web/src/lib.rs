use std::rc::Rc;

use clap::Parser;
use wasm_bindgen::prelude::*;

mod app;
mod assets;
mod memory;
mod popup;
mod screens;
mod sweeper;
mod timers;
mod utils;

#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,
}

impl Args {
    /// Parses flags from a location hash such as `#-vv&--seed=42`.
    fn from_hash(hash: &str) -> Result<Self, clap::Error> {
        Self::try_parse_from(hash.split(['#', '&']))
    }
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::{document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window()
        .location()
        .hash()
        .unwrap_or_else(|_| "".to_string());

    let args = Args::from_hash(&location_hash).unwrap_or_else(|err| {
        gloo::console::warn!(format!("ignoring location hash: {err}"));
        Args::default()
    });
    if let Some(log_level) = args.verbose.log_level() {
        console_log::init_with_level(log_level).expect("Error initializing logger");
    }
    log::debug!("seed: {:?}", args.seed);

    // An empty catalog leaves the memory stage unfinishable.
    let catalog = assets::default_catalog().expect("Bundled asset catalog is invalid");

    let root = document()
        .get_element_by_id("gauntlet")
        .expect("Could not find id=\"gauntlet\" element");

    log::debug!("App started");
    let props = app::AppProps {
        catalog: Rc::new(catalog),
        seed: args.seed,
    };
    yew::Renderer::<app::App>::with_root_and_props(root, props).render();
}
