use alloc::collections::BTreeMap;
use core::fmt;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Monotonically increasing popup identifier, never reused by a manager.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PopupId(u32);

impl PopupId {
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PopupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "popup#{}", self.0)
    }
}

/// Why a popup went away.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    /// The video played to the end with nobody closing it.
    Auto,
    /// The player (or the owning game) closed it.
    Manual,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopupSpec {
    pub video: AssetKey,
    pub position: ScreenPos,
    pub show_close_button: bool,
    pub auto_close_on_end: bool,
    pub looping: bool,
}

impl PopupSpec {
    /// Closable distraction that closes itself once the video ends.
    pub fn distraction(video: AssetKey, position: ScreenPos) -> Self {
        Self {
            video,
            position,
            show_close_button: true,
            auto_close_on_end: true,
            looping: false,
        }
    }

    /// Looping punishment overlay that only its owner can take down.
    pub fn punishment(video: AssetKey, position: ScreenPos) -> Self {
        Self {
            video,
            position,
            show_close_button: false,
            auto_close_on_end: false,
            looping: true,
        }
    }
}

/// Per-id lifecycle. Transitions only ever move forward.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopupPhase {
    Spawned,
    /// Close was processed; the exit animation may still be running.
    Closing(CloseReason),
    Closed(CloseReason),
}

impl PopupPhase {
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Spawned | Self::Closing(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Popup {
    pub id: PopupId,
    pub spec: PopupSpec,
    pub created_at: Instant,
    pub phase: PopupPhase,
}

/// Emitted once per popup id, when its close is processed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CloseReport {
    pub id: PopupId,
    pub reason: CloseReason,
}

/// Owns every popup spawned during a game and deduplicates their closing.
///
/// Closed popups keep their lifecycle entry (without the heavy parts being
/// rendered) for as long as the manager lives, so a late `ended` event for an
/// id that was already closed by hand is recognized and dropped.
#[derive(Clone, Debug, Default)]
pub struct PopupManager {
    next_id: u32,
    popups: BTreeMap<PopupId, Popup>,
}

impl PopupManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, spec: PopupSpec, now: Instant) -> PopupId {
        let id = PopupId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        log::debug!("{} spawned with {}", id, spec.video);
        self.popups.insert(
            id,
            Popup {
                id,
                spec,
                created_at: now,
                phase: PopupPhase::Spawned,
            },
        );
        id
    }

    /// Processes a close request. Only a `Spawned` popup can be closed; every
    /// other call (repeat, unknown id, race loser) is a silent no-op.
    pub fn close(&mut self, id: PopupId, reason: CloseReason) -> Option<CloseReport> {
        let popup = self.popups.get_mut(&id)?;
        if popup.phase != PopupPhase::Spawned {
            log::trace!("{} already {:?}, ignoring {:?} close", id, popup.phase, reason);
            return None;
        }
        popup.phase = PopupPhase::Closing(reason);
        log::debug!("{} closing ({:?})", id, reason);
        Some(CloseReport { id, reason })
    }

    /// Finishes a close once the exit animation is over.
    pub fn retire(&mut self, id: PopupId) -> bool {
        match self.popups.get_mut(&id) {
            Some(popup) => match popup.phase {
                PopupPhase::Closing(reason) => {
                    popup.phase = PopupPhase::Closed(reason);
                    true
                }
                _ => false,
            },
            None => false,
        }
    }

    /// Closes every still-open popup with `reason`, e.g. when the game ends.
    pub fn close_all(&mut self, reason: CloseReason) -> Effects<CloseReport> {
        let open: Effects<PopupId> = self
            .popups
            .values()
            .filter(|popup| popup.phase == PopupPhase::Spawned)
            .map(|popup| popup.id)
            .collect();
        open.into_iter()
            .filter_map(|id| self.close(id, reason))
            .collect()
    }

    pub fn phase(&self, id: PopupId) -> Option<PopupPhase> {
        self.popups.get(&id).map(|popup| popup.phase)
    }

    pub fn get(&self, id: PopupId) -> Option<&Popup> {
        self.popups.get(&id)
    }

    /// Popups that are on screen, oldest first.
    pub fn visible(&self) -> impl Iterator<Item = &Popup> + '_ {
        self.popups
            .values()
            .filter(|popup| popup.phase.is_visible())
    }

    pub fn open_count(&self) -> usize {
        self.popups
            .values()
            .filter(|popup| popup.phase == PopupPhase::Spawned)
            .count()
    }
}
