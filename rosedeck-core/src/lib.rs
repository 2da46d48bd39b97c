use std::path::PathBuf;

use thiserror::Error;

pub mod cards;
pub mod deck;
pub mod image;
pub mod resolve;
pub mod session;
pub mod settings;

pub use cards::{levenshtein, CardIndex, CardName, CardNames, NameMatch};
pub use deck::{DeckCollection, DeckError, DeckKind, DeckRecord, DeckSummary};
pub use resolve::{resolve_card_reference, Resolution};
pub use session::{DeckView, EditorSession, SlotView};
pub use settings::DefaultPathStore;

#[derive(Debug, Error)]
pub enum DeckEditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Deck(#[from] DeckError),

    #[error("disc image is too small: the {region} decks end at {end:#X}")]
    ImageTooSmall { region: &'static str, end: u64 },

    #[error("destination image does not exist: {}", .0.display())]
    MissingDestination(PathBuf),

    #[error("no decks loaded")]
    NoDecksLoaded,

    #[error("no deck selected")]
    NoDeckSelected,

    #[error("card slot {0} does not exist (valid slots are 0-39)")]
    SlotOutOfRange(usize),

    #[error("Rank is not numeric")]
    RankNotNumeric,

    #[error("No matching card found: '{0}'")]
    NoMatchingCard(String),

    #[error("Too many matches found ({0} matches)")]
    TooManyMatches(usize),

    #[error("More than 1 match found: {}", list_candidates(.0))]
    AmbiguousCard(Vec<CardName>),

    #[error("configuration error: {0}")]
    Config(String),
}

fn list_candidates(candidates: &[CardName]) -> String {
    candidates
        .iter()
        .map(|card| format!("{} ({})", card.name, card.id))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, DeckEditError>;
