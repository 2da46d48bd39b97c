//! Turning user-typed card references into card IDs.

use tracing::debug;

use crate::cards::{CardIndex, CardName, NameMatch};
use crate::deck::{CARD_ID_MASK, RANK_MASK};
use crate::{DeckEditError, Result};

/// Above this many candidates an ambiguous match only reports the count.
pub const MAX_LISTED_CANDIDATES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved { id: u16 },
    NoMatch,
    Ambiguous(Vec<CardName>),
}

impl Resolution {
    /// Collapse into a card ID, or the message shown to the user when the
    /// reference cannot be used.
    pub fn into_card_id(self, text: &str) -> Result<u16> {
        match self {
            Resolution::Resolved { id } => Ok(id),
            Resolution::NoMatch => Err(DeckEditError::NoMatchingCard(text.to_string())),
            Resolution::Ambiguous(candidates) if candidates.len() > MAX_LISTED_CANDIDATES => {
                Err(DeckEditError::TooManyMatches(candidates.len()))
            }
            Resolution::Ambiguous(candidates) => Err(DeckEditError::AmbiguousCard(candidates)),
        }
    }
}

/// Parse a plain decimal literal, keeping only the bits under `mask`.
/// Works for literals of any length; `mask` must be one less than a power
/// of two.
fn parse_masked(text: &str, mask: u16) -> Option<u16> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(
        text.bytes()
            .fold(0u16, |acc, b| (acc.wrapping_mul(10) + u16::from(b - b'0')) & mask),
    )
}

pub fn parse_card_id(text: &str) -> Option<u16> {
    parse_masked(text, CARD_ID_MASK)
}

pub fn parse_rank(text: &str) -> Result<u8> {
    parse_masked(text, RANK_MASK)
        .map(|rank| rank as u8)
        .ok_or(DeckEditError::RankNotNumeric)
}

/// A decimal literal is taken as the card ID as-is; anything else is looked
/// up as a name fragment.
pub fn resolve_card_reference(cards: &CardIndex, text: &str) -> Resolution {
    if let Some(id) = parse_card_id(text) {
        return Resolution::Resolved { id };
    }

    match cards.match_substring(text) {
        NameMatch::Unique(card) => Resolution::Resolved {
            id: (card.id & u32::from(CARD_ID_MASK)) as u16,
        },
        NameMatch::Ambiguous(candidates) => Resolution::Ambiguous(candidates),
        NameMatch::NoMatch => Resolution::NoMatch,
        NameMatch::Unavailable => {
            debug!("No card list loaded, cannot resolve '{}'", text);
            Resolution::NoMatch
        }
    }
}

pub fn resolve_card_id(cards: &CardIndex, text: &str) -> Result<u16> {
    resolve_card_reference(cards, text).into_card_id(text)
}
