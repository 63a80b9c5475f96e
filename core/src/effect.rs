use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::Millis;

/// Terminal outcome a mini-game reports to the stage controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageResult {
    Complete,
    Fail,
}

/// A tick the host must feed back to the engine after `after_ms`.
///
/// Engines never own timers themselves: the host keeps the real timer handle and
/// drops it when the owning stage goes away.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Deferred<T> {
    pub after_ms: Millis,
    pub tick: T,
}

impl<T> Deferred<T> {
    pub const fn new(after_ms: Millis, tick: T) -> Self {
        Self { after_ms, tick }
    }
}

/// Effects produced by a single reducer step. Almost always fits inline.
pub type Effects<E> = SmallVec<[E; 4]>;

/// Guard that lets a terminal result through exactly once.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportOnce {
    reported: Option<StageResult>,
}

impl ReportOnce {
    pub fn report(&mut self, result: StageResult) -> Option<StageResult> {
        if self.reported.is_some() {
            log::debug!("dropping duplicate result {:?}", result);
            return None;
        }
        self.reported = Some(result);
        Some(result)
    }

    pub fn reported(&self) -> Option<StageResult> {
        self.reported
    }
}
