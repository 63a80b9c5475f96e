//! Randomized content pickers.
//!
//! Everything here is a pure function of the injected generator, so a seeded
//! `SmallRng` makes every "random" prank reproducible in tests.

use core::ops::Range;
use rand::prelude::*;

use crate::*;

/// Picks one item uniformly, `None` for an empty slice.
pub fn pick<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    items.choose(rng)
}

/// Picks an index uniformly from `0..len`, `None` when `len` is zero.
pub fn pick_index<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Option<usize> {
    (len > 0).then(|| rng.random_range(0..len))
}

/// Draws the delay before the next distraction, uniform over `window`.
pub fn pick_delay<R: Rng + ?Sized>(window: &Range<Millis>, rng: &mut R) -> Millis {
    if window.is_empty() {
        return window.start;
    }
    rng.random_range(window.clone())
}

/// Random popup position that keeps a video of the usual size inside the viewport.
pub fn pick_popup_position<R: Rng + ?Sized>(viewport: Viewport, rng: &mut R) -> ScreenPos {
    let (padding, video_width) = if viewport.is_compact() {
        (20.0, 200.0)
    } else {
        (50.0, 300.0)
    };
    let x_span = (viewport.width - video_width - padding * 2.0).max(0.0);
    let y_span = (viewport.height - 250.0).max(0.0);
    ScreenPos {
        x: padding + rng.random_range(0.0..=1.0) * x_span,
        y: padding + rng.random_range(0.0..=1.0) * y_span,
    }
}

/// Clamps a popup position so the rendered frame stays on screen.
pub fn clamp_popup_position(pos: ScreenPos, viewport: Viewport) -> ScreenPos {
    let frame_width = if viewport.is_compact() { 180.0 } else { 290.0 };
    let max_x = (viewport.width - frame_width).max(10.0);
    let max_y = (viewport.height - 200.0).max(10.0);
    ScreenPos {
        x: pos.x.clamp(10.0, max_x),
        y: pos.y.clamp(10.0, max_y),
    }
}
