//! Editing state for one run of the tool: the loaded decks, the deck being
//! edited and the remembered image path.
//!
//! Every command either succeeds or returns a message for the user, and a
//! failed command never leaves a partial edit behind.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::cards::CardIndex;
use crate::deck::{DeckCollection, DeckError, DeckKind, DeckSummary, SLOT_COUNT};
use crate::image;
use crate::resolve::{parse_rank, resolve_card_id};
use crate::settings::DefaultPathStore;
use crate::{DeckEditError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotView {
    pub slot: usize,
    pub card: u16,
    pub name: String,
}

/// Everything shown for a single deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckView {
    pub index: usize,
    pub kind: DeckKind,
    pub label: String,
    pub leader: u16,
    pub leader_name: String,
    pub rank: u8,
    pub slots: Vec<SlotView>,
}

pub struct EditorSession {
    cards: CardIndex,
    decks: Option<DeckCollection>,
    selected: Option<usize>,
    default_path: Option<PathBuf>,
    path_store: Option<DefaultPathStore>,
}

impl EditorSession {
    pub fn new(cards: CardIndex) -> Self {
        Self {
            cards,
            decks: None,
            selected: None,
            default_path: None,
            path_store: None,
        }
    }

    /// Seed the default path from `store` and write it back there after
    /// every successful save.
    pub fn with_default_path_store(mut self, store: DefaultPathStore) -> Self {
        self.default_path = store.load();
        self.path_store = Some(store);
        self
    }

    pub fn cards(&self) -> &CardIndex {
        &self.cards
    }

    pub fn decks(&self) -> Option<&DeckCollection> {
        self.decks.as_ref()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn default_path(&self) -> Option<&Path> {
        self.default_path.as_deref()
    }

    pub fn open_image(&mut self, path: &Path) -> Result<()> {
        let decks = image::load_image(path).map_err(|err| {
            warn!("Could not load decks from {}: {}", path.display(), err);
            err
        })?;
        self.decks = Some(decks);
        self.selected = None;
        self.default_path = Some(path.to_path_buf());
        Ok(())
    }

    pub fn save_image(&mut self, path: &Path) -> Result<()> {
        let decks = self.decks.as_ref().ok_or(DeckEditError::NoDecksLoaded)?;
        image::save_image(path, decks).map_err(|err| {
            warn!("Could not save decks to {}: {}", path.display(), err);
            err
        })?;

        self.default_path = Some(path.to_path_buf());
        if let Some(store) = &self.path_store {
            if let Err(err) = store.save(path) {
                warn!("Couldn't write default path to {}: {}", store.file().display(), err);
            }
        }
        Ok(())
    }

    pub fn deck_list(&self) -> Vec<DeckSummary> {
        self.decks
            .as_ref()
            .map(|decks| decks.summaries(&self.cards))
            .unwrap_or_default()
    }

    pub fn select_record(&mut self, index: usize) -> Result<DeckView> {
        let view = self.view(index)?;
        self.selected = Some(index);
        Ok(view)
    }

    pub fn view(&self, index: usize) -> Result<DeckView> {
        let decks = self.decks.as_ref().ok_or(DeckEditError::NoDecksLoaded)?;
        let record = decks.record(index)?;
        let summary = decks.summary(index, &self.cards)?;

        let slots = record
            .slots
            .iter()
            .enumerate()
            .map(|(slot, &card)| SlotView {
                slot,
                card,
                name: self.cards.get_name(card.into()).to_string(),
            })
            .collect();

        Ok(DeckView {
            index,
            kind: summary.kind,
            label: summary.to_string(),
            leader: summary.leader,
            leader_name: summary.leader_name,
            rank: summary.rank,
            slots,
        })
    }

    fn selected_index(&self) -> Result<usize> {
        if self.decks.is_none() {
            return Err(DeckEditError::NoDecksLoaded);
        }
        self.selected.ok_or(DeckEditError::NoDeckSelected)
    }

    fn decks_mut(&mut self) -> Result<&mut DeckCollection> {
        self.decks.as_mut().ok_or(DeckEditError::NoDecksLoaded)
    }

    /// Replace the leader card and rank of the selected deck.
    pub fn set_leader(&mut self, leader_text: &str, rank_text: &str) -> Result<DeckView> {
        let index = self.selected_index()?;
        let rank = parse_rank(rank_text)?;
        let leader = resolve_card_id(&self.cards, leader_text)?;

        let decks = self.decks_mut()?;
        let record = decks.record(index)?;
        decks.store(index, leader.into(), rank.into(), &record.slot_ids())?;
        info!("Deck {}: leader set to {} (rank {})", index, leader, rank);
        self.view(index)
    }

    pub fn set_slot(&mut self, slot: usize, text: &str) -> Result<DeckView> {
        let index = self.selected_index()?;
        if slot >= SLOT_COUNT {
            return Err(DeckEditError::SlotOutOfRange(slot));
        }
        let card = resolve_card_id(&self.cards, text)?;

        let decks = self.decks_mut()?;
        let record = decks.record(index)?;
        let mut slots = record.slot_ids();
        slots[slot] = card.into();
        decks.store(index, record.leader.into(), record.rank.into(), &slots)?;
        info!("Deck {}: slot {} set to {}", index, slot, card);
        self.view(index)
    }

    /// Rewrite the whole selected deck. The rank is checked first, then the
    /// leader, then each slot in order; the first rejection wins and nothing
    /// is written.
    pub fn set_deck<S: AsRef<str>>(
        &mut self,
        leader_text: &str,
        rank_text: &str,
        slot_texts: &[S],
    ) -> Result<DeckView> {
        let index = self.selected_index()?;
        if slot_texts.len() != SLOT_COUNT {
            return Err(DeckError::SlotCount {
                expected: SLOT_COUNT,
                got: slot_texts.len(),
            }
            .into());
        }

        let rank = parse_rank(rank_text)?;
        let leader = resolve_card_id(&self.cards, leader_text)?;
        let slots = slot_texts
            .iter()
            .map(|text| resolve_card_id(&self.cards, text.as_ref()).map(u32::from))
            .collect::<Result<Vec<u32>>>()?;

        self.decks_mut()?
            .store(index, leader.into(), rank.into(), &slots)?;
        info!("Deck {} rewritten, leader {} (rank {})", index, leader, rank);
        self.view(index)
    }
}
