use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::*;

/// The five challenges, in play order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Memory,
    Qte,
    Drag,
    Whack,
    Minesweeper,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Memory,
        Stage::Qte,
        Stage::Drag,
        Stage::Whack,
        Stage::Minesweeper,
    ];

    /// Level key used by the menu's level picker.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Qte => "qte",
            Self::Drag => "drag",
            Self::Whack => "whack",
            Self::Minesweeper => "minesweeper",
        }
    }

    pub const fn number(self) -> u8 {
        match self {
            Self::Memory => 1,
            Self::Qte => 2,
            Self::Drag => 3,
            Self::Whack => 4,
            Self::Minesweeper => 5,
        }
    }

    pub const fn next(self) -> Option<Stage> {
        match self {
            Self::Memory => Some(Self::Qte),
            Self::Qte => Some(Self::Drag),
            Self::Drag => Some(Self::Whack),
            Self::Whack => Some(Self::Minesweeper),
            Self::Minesweeper => None,
        }
    }

    /// Only these stages ever report a failure; the rest can only be completed.
    pub const fn can_fail(self) -> bool {
        matches!(self, Self::Memory | Self::Minesweeper)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Memory => "Memory Match",
            Self::Qte => "QTE Challenge",
            Self::Drag => "Drag the Videos",
            Self::Whack => "Whack the Curator",
            Self::Minesweeper => "Minesweeper",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Stage {
    type Err = GameError;

    fn from_str(key: &str) -> Result<Self> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.key() == key)
            .ok_or_else(|| GameError::UnknownLevel(key.to_string()))
    }
}

/// Title and instructions shown before a stage starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogContent {
    pub title: String,
    pub lines: Vec<String>,
}

impl DialogContent {
    pub fn for_stage(stage: Stage, memory_max_fails: u8) -> Self {
        let lines: Vec<String> = match stage {
            Stage::Memory => vec![
                "Flip the cards and find every matching pair.".into(),
                format!("You have {memory_max_fails} chances; run out and the curator yells at you."),
                "A wrong pair plays a random video, don't get distracted!".into(),
            ],
            Stage::Qte => vec![
                "Press the letter shown on screen, right away.".into(),
                "Each hit scores a point, so does closing a distraction.".into(),
                "Reach 20 points to pass.".into(),
            ],
            Stage::Drag => vec![
                "Drag the wandering videos off the edge of the screen.".into(),
                "Every video dragged out scores a point.".into(),
                "The button on the right clears them all for 10 points.".into(),
                "Reach 35 points to pass.".into(),
            ],
            Stage::Whack => vec![
                "Hit the curator when he pops out of a hole.".into(),
                "Only the right faces score; a wrong hit costs a point.".into(),
                "Reach 20 points to pass.".into(),
            ],
            Stage::Minesweeper => vec![
                "Click a cell to reveal it, right-click to flag a mine.".into(),
                "Distraction videos pop up; close them before they finish.".into(),
                "Let three of them play out and you fail!".into(),
            ],
        };
        Self {
            title: format!("Stage {}: {}", stage.number(), stage.name()),
            lines,
        }
    }
}

/// What the player is looking at.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Menu,
    /// `intro` is set while the stage's dialog is still up.
    Playing { stage: Stage, intro: bool },
    Complete,
    GameOver,
}

impl Screen {
    pub const fn stage(self) -> Option<Stage> {
        match self {
            Self::Playing { stage, .. } => Some(stage),
            _ => None,
        }
    }

    const fn intro(stage: Stage) -> Self {
        Self::Playing { stage, intro: true }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRules {
    pub base_max_fails: u8,
    /// Retries never grant more chances than this.
    pub max_fails_cap: u8,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            base_max_fails: 3,
            max_fails_cap: 5,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StageEvent {
    Start,
    SelectLevel(Stage),
    /// The intro dialog was dismissed.
    Begin,
    Completed(Stage),
    Failed(Stage),
    Retry,
    Restart,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Ignored,
    Moved { from: Screen, to: Screen },
}

impl Transition {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Sequences the stages and carries the session across retries.
#[derive(Clone, Debug)]
pub struct StageController {
    screen: Screen,
    memory_max_fails: u8,
    failed_stage: Option<Stage>,
    rules: SessionRules,
}

impl Default for StageController {
    fn default() -> Self {
        Self::new(SessionRules::default())
    }
}

impl StageController {
    pub fn new(rules: SessionRules) -> Self {
        Self {
            screen: Screen::Menu,
            memory_max_fails: rules.base_max_fails,
            failed_stage: None,
            rules,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Chances the next memory attempt gets.
    pub fn memory_max_fails(&self) -> u8 {
        self.memory_max_fails
    }

    pub fn failed_stage(&self) -> Option<Stage> {
        self.failed_stage
    }

    /// Dialog for the current stage, while its intro is up.
    pub fn intro(&self) -> Option<DialogContent> {
        match self.screen {
            Screen::Playing { stage, intro: true } => {
                Some(DialogContent::for_stage(stage, self.memory_max_fails))
            }
            _ => None,
        }
    }

    /// Menu level picker entry point, taking the raw level key.
    pub fn select_level(&mut self, key: &str) -> Result<Transition> {
        let stage = key.parse()?;
        Ok(self.apply(StageEvent::SelectLevel(stage)))
    }

    pub fn apply(&mut self, event: StageEvent) -> Transition {
        let from = self.screen;
        let to = match (from, event) {
            (Screen::Menu, StageEvent::Start) => {
                self.failed_stage = None;
                Screen::intro(Stage::Memory)
            }
            (Screen::Menu, StageEvent::SelectLevel(stage)) => Screen::intro(stage),
            (Screen::Playing { stage, intro: true }, StageEvent::Begin) => Screen::Playing {
                stage,
                intro: false,
            },
            (Screen::Playing { stage, intro: false }, StageEvent::Completed(done))
                if stage == done =>
            {
                match stage.next() {
                    Some(next) => Screen::intro(next),
                    None => Screen::Complete,
                }
            }
            (Screen::Playing { stage, intro: false }, StageEvent::Failed(failed))
                if stage == failed && stage.can_fail() =>
            {
                if stage == Stage::Memory {
                    self.memory_max_fails = self
                        .memory_max_fails
                        .saturating_add(1)
                        .min(self.rules.max_fails_cap);
                }
                self.failed_stage = Some(stage);
                Screen::GameOver
            }
            (Screen::GameOver, StageEvent::Retry) => {
                Screen::intro(self.failed_stage.unwrap_or(Stage::Memory))
            }
            (Screen::Complete | Screen::GameOver, StageEvent::Restart) => {
                self.failed_stage = None;
                self.memory_max_fails = self.rules.base_max_fails;
                Screen::Menu
            }
            (screen, event) => {
                log::debug!("ignoring {:?} on {:?}", event, screen);
                return Transition::Ignored;
            }
        };

        log::info!("{:?} -> {:?}", from, to);
        self.screen = to;
        Transition::Moved { from, to }
    }
}
