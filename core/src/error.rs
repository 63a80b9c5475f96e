use alloc::string::String;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("No card with id {0}")]
    InvalidCard(usize),
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Asset catalog has no {0}")]
    EmptyCatalog(&'static str),
    #[error("Unknown level {0:?}")]
    UnknownLevel(String),
}

pub type Result<T> = core::result::Result<T, GameError>;
