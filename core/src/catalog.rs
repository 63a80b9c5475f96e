use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Opaque resource identifier resolved by the host (usually a URL path).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetKey(String);

impl AssetKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// One memory card motif: the pair identity plus its picture and cue sound.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardFace {
    pub id: String,
    pub image: AssetKey,
    pub sound: AssetKey,
}

/// Every asset reference the games need, injected at construction time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetCatalog {
    #[serde(default)]
    pub card_faces: Vec<CardFace>,
    /// Videos thrown at the player on memory mismatches.
    #[serde(default)]
    pub mismatch_videos: Vec<AssetKey>,
    /// Videos used for the minesweeper distraction popups.
    #[serde(default)]
    pub distraction_videos: Vec<AssetKey>,
    #[serde(default)]
    pub mine_art: Vec<AssetKey>,
    pub explosion_video: Option<AssetKey>,
}

impl AssetCatalog {
    /// Checks the lists every game depends on are populated.
    pub fn validate(&self) -> Result<()> {
        if self.card_faces.is_empty() {
            return Err(GameError::EmptyCatalog("card faces"));
        }
        if self.mismatch_videos.is_empty() {
            return Err(GameError::EmptyCatalog("mismatch videos"));
        }
        if self.distraction_videos.is_empty() {
            return Err(GameError::EmptyCatalog("distraction videos"));
        }
        Ok(())
    }

    pub fn mine_art_at(&self, index: u8) -> Option<&AssetKey> {
        self.mine_art.get(usize::from(index))
    }

    /// Number of mine art variants the generator may pick from.
    pub fn mine_art_count(&self) -> u8 {
        self.mine_art.len().try_into().unwrap_or(u8::MAX)
    }
}
