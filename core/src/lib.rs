#![no_std]

//! Game rules for the challenge gauntlet: the stage flow, the memory match,
//! the minesweeper field and the popups they throw at the player.
//!
//! Nothing in here touches a clock or a timer. Reducers return [`Effects`]
//! and the host turns every [`Deferred`] into a real timeout.

extern crate alloc;

pub use catalog::*;
pub use effect::*;
pub use error::*;
pub use memory::*;
pub use pick::*;
pub use popup::*;
pub use stage::*;
pub use sweep::*;
pub use types::*;

mod catalog;
mod effect;
mod error;
mod memory;
mod pick;
mod popup;
mod stage;
mod sweep;
mod types;
