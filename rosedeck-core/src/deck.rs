//! Deck record layout.
//!
//! A deck is 41 little-endian words: the leader word (card ID in the low 12
//! bits, rank in the high 4) followed by 40 card slots. Slots only use the
//! low 12 bits; the top nibble is ignored on read and cleared on write.

use std::fmt;
use std::ops::Range;

use serde::Serialize;
use thiserror::Error;

use crate::cards::CardIndex;

pub const SLOT_COUNT: usize = 40;
pub const WORDS_PER_RECORD: usize = SLOT_COUNT + 1;
pub const RECORD_SIZE: usize = WORDS_PER_RECORD * 2;

pub const STARTER_DECK_COUNT: usize = 17;
pub const CPU_DECK_COUNT: usize = 24;
pub const DECK_COUNT: usize = STARTER_DECK_COUNT + CPU_DECK_COUNT;

/// Size of the in-memory buffer holding every deck, starters first.
pub const COLLECTION_SIZE: usize = DECK_COUNT * RECORD_SIZE;

pub const CARD_ID_MASK: u16 = 0x0FFF;
pub const RANK_MASK: u16 = 0x000F;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("deck record {index} does not fit in a {len}-byte buffer")]
    RecordOutOfBounds { index: usize, len: usize },

    #[error("a deck needs {expected} card slots, got {got}")]
    SlotCount { expected: usize, got: usize },

    #[error("deck data must be {expected} bytes, got {got}")]
    CollectionSize { expected: usize, got: usize },

    #[error("deck {0} does not exist (valid decks are 0-40)")]
    DeckOutOfRange(usize),
}

pub fn decode_leader(word: u16) -> (u16, u8) {
    (word & CARD_ID_MASK, (word >> 12) as u8)
}

pub fn encode_leader(card_id: u32, rank: u32) -> u16 {
    (card_id as u16 & CARD_ID_MASK) | ((rank as u16 & RANK_MASK) << 12)
}

pub fn decode_slot(word: u16) -> u16 {
    word & CARD_ID_MASK
}

pub fn encode_slot(card_id: u32) -> u16 {
    card_id as u16 & CARD_ID_MASK
}

/// One decoded deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckRecord {
    pub leader: u16,
    pub rank: u8,
    pub slots: [u16; SLOT_COUNT],
}

impl DeckRecord {
    pub fn slot_ids(&self) -> [u32; SLOT_COUNT] {
        self.slots.map(u32::from)
    }
}

fn record_range(buf_len: usize, index: usize) -> Result<Range<usize>, DeckError> {
    index
        .checked_mul(RECORD_SIZE)
        .and_then(|start| Some(start..start.checked_add(RECORD_SIZE)?))
        .filter(|range| range.end <= buf_len)
        .ok_or(DeckError::RecordOutOfBounds {
            index,
            len: buf_len,
        })
}

/// Decode record `index` from a buffer of back-to-back records.
pub fn load(buf: &[u8], index: usize) -> Result<DeckRecord, DeckError> {
    let bytes = &buf[record_range(buf.len(), index)?];
    let word = |i: usize| u16::from_le_bytes([bytes[i * 2], bytes[i * 2 + 1]]);

    let (leader, rank) = decode_leader(word(0));
    let mut slots = [0u16; SLOT_COUNT];
    for (i, slot) in slots.iter_mut().enumerate() {
        *slot = decode_slot(word(i + 1));
    }

    Ok(DeckRecord {
        leader,
        rank,
        slots,
    })
}

/// Encode a deck over record `index` in place. The buffer is never grown
/// and nothing is written when validation fails.
pub fn store(
    buf: &mut [u8],
    index: usize,
    leader: u32,
    rank: u32,
    slots: &[u32],
) -> Result<(), DeckError> {
    if slots.len() != SLOT_COUNT {
        return Err(DeckError::SlotCount {
            expected: SLOT_COUNT,
            got: slots.len(),
        });
    }
    let range = record_range(buf.len(), index)?;

    let words = std::iter::once(encode_leader(leader, rank))
        .chain(slots.iter().map(|&card| encode_slot(card)));
    for (dst, word) in buf[range].chunks_exact_mut(2).zip(words) {
        dst.copy_from_slice(&word.to_le_bytes());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckKind {
    Starter,
    Cpu,
}

impl DeckKind {
    pub fn of(index: usize) -> Option<DeckKind> {
        match index {
            i if i < STARTER_DECK_COUNT => Some(DeckKind::Starter),
            i if i < DECK_COUNT => Some(DeckKind::Cpu),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            DeckKind::Starter => "[Starter]",
            DeckKind::Cpu => "[CPU]",
        }
    }
}

/// A deck as shown in the deck list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckSummary {
    pub index: usize,
    pub kind: DeckKind,
    pub leader: u16,
    pub rank: u8,
    pub leader_name: String,
}

impl fmt::Display for DeckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:>7} [rank:{:>2}] {}",
            self.kind.tag(),
            self.leader,
            self.rank,
            self.leader_name
        )
    }
}

/// All 41 decks in one buffer: 17 starter decks, then 24 CPU decks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckCollection {
    data: Vec<u8>,
}

impl DeckCollection {
    pub fn zeroed() -> Self {
        Self {
            data: vec![0; COLLECTION_SIZE],
        }
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, DeckError> {
        if data.len() != COLLECTION_SIZE {
            return Err(DeckError::CollectionSize {
                expected: COLLECTION_SIZE,
                got: data.len(),
            });
        }
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        DECK_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn starter_bytes(&self) -> &[u8] {
        &self.data[..STARTER_DECK_COUNT * RECORD_SIZE]
    }

    pub fn cpu_bytes(&self) -> &[u8] {
        &self.data[STARTER_DECK_COUNT * RECORD_SIZE..]
    }

    fn check_index(index: usize) -> Result<(), DeckError> {
        if index >= DECK_COUNT {
            return Err(DeckError::DeckOutOfRange(index));
        }
        Ok(())
    }

    pub fn record(&self, index: usize) -> Result<DeckRecord, DeckError> {
        Self::check_index(index)?;
        load(&self.data, index)
    }

    pub fn store(
        &mut self,
        index: usize,
        leader: u32,
        rank: u32,
        slots: &[u32],
    ) -> Result<(), DeckError> {
        Self::check_index(index)?;
        store(&mut self.data, index, leader, rank, slots)
    }

    pub fn summary(&self, index: usize, cards: &CardIndex) -> Result<DeckSummary, DeckError> {
        let record = self.record(index)?;
        let kind = DeckKind::of(index).ok_or(DeckError::DeckOutOfRange(index))?;
        Ok(DeckSummary {
            index,
            kind,
            leader: record.leader,
            rank: record.rank,
            leader_name: cards.get_name(record.leader.into()).to_string(),
        })
    }

    pub fn summaries(&self, cards: &CardIndex) -> Vec<DeckSummary> {
        (0..DECK_COUNT)
            .filter_map(|index| self.summary(index, cards).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardNames;

    #[test]
    fn leader_round_trip() {
        for card_id in [0u32, 1, 0x123, 0x7FF, 0xFFF] {
            for rank in 0u32..=0xF {
                let word = encode_leader(card_id, rank);
                assert_eq!(decode_leader(word), (card_id as u16, rank as u8));
            }
        }
    }

    #[test]
    fn encoding_truncates_out_of_range_input() {
        assert_eq!(encode_leader(0x1ABC, 0x13), 0x3ABC);
        assert_eq!(encode_slot(0xFFFF_FFFF) & 0xF000, 0);
        assert_eq!(encode_slot(0x1234), 0x0234);
        assert_eq!(decode_slot(0xF2A1), 0x02A1);
    }

    #[test]
    fn load_reads_little_endian_words() {
        let mut buf = vec![0u8; RECORD_SIZE];
        buf[0..2].copy_from_slice(&0x5123u16.to_le_bytes());
        buf[2..4].copy_from_slice(&0xF001u16.to_le_bytes());
        buf[80..82].copy_from_slice(&0x0FFFu16.to_le_bytes());

        let record = load(&buf, 0).unwrap();
        assert_eq!(record.leader, 0x123);
        assert_eq!(record.rank, 5);
        assert_eq!(record.slots[0], 1);
        assert_eq!(record.slots[39], 0xFFF);
    }

    #[test]
    fn store_then_load_every_record() {
        let mut buf = vec![0u8; COLLECTION_SIZE];
        for index in 0..DECK_COUNT {
            let slots: Vec<u32> = (0..SLOT_COUNT as u32).map(|s| index as u32 * 50 + s).collect();
            store(&mut buf, index, index as u32 + 700, index as u32 % 16, &slots).unwrap();
        }
        for index in 0..DECK_COUNT {
            let record = load(&buf, index).unwrap();
            assert_eq!(record.leader as usize, index + 700);
            assert_eq!(record.rank as usize, index % 16);
            for (s, &card) in record.slots.iter().enumerate() {
                assert_eq!(card as usize, index * 50 + s);
            }
        }
    }

    #[test]
    fn store_leaves_other_records_untouched() {
        let mut buf = vec![0u8; COLLECTION_SIZE];
        store(&mut buf, 5, 100, 3, &[0; SLOT_COUNT]).unwrap();

        let record = load(&buf, 5).unwrap();
        assert_eq!(record.leader, 100);
        assert_eq!(record.rank, 3);
        assert_eq!(record.slots, [0; SLOT_COUNT]);

        for (i, byte) in buf.iter().enumerate() {
            if !(5 * RECORD_SIZE..6 * RECORD_SIZE).contains(&i) {
                assert_eq!(*byte, 0, "byte {i} changed");
            }
        }
    }

    #[test]
    fn record_offsets_cross_starter_boundary() {
        let buf: Vec<u8> = (0..COLLECTION_SIZE).map(|i| (i / RECORD_SIZE) as u8).collect();

        let first = load(&buf, 0).unwrap();
        assert_eq!(first.leader, 0);

        // Record 17 is the first CPU deck; each of its bytes is 17.
        let cpu = load(&buf, 17).unwrap();
        assert_eq!(cpu.leader, 0x1111 & CARD_ID_MASK);
        assert_eq!(cpu.rank, 1);
        assert!(cpu.slots.iter().all(|&s| s == 0x111));
    }

    #[test]
    fn store_rejects_wrong_slot_count_without_writing() {
        let mut buf = vec![0u8; COLLECTION_SIZE];
        let err = store(&mut buf, 0, 1, 1, &[7; 39]).unwrap_err();
        assert!(matches!(err, DeckError::SlotCount { expected: 40, got: 39 }));
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn out_of_bounds_records() {
        let mut buf = vec![0u8; RECORD_SIZE * 2 - 1];
        assert!(load(&buf, 0).is_ok());
        assert!(matches!(
            load(&buf, 1),
            Err(DeckError::RecordOutOfBounds { index: 1, .. })
        ));
        assert!(store(&mut buf, 1, 0, 0, &[0; SLOT_COUNT]).is_err());
        assert!(load(&buf, usize::MAX).is_err());
    }

    #[test]
    fn collection_size_is_checked() {
        assert!(DeckCollection::from_bytes(vec![0; COLLECTION_SIZE]).is_ok());
        assert!(matches!(
            DeckCollection::from_bytes(vec![0; COLLECTION_SIZE - 1]),
            Err(DeckError::CollectionSize { .. })
        ));
        assert!(matches!(
            DeckCollection::zeroed().record(DECK_COUNT),
            Err(DeckError::DeckOutOfRange(41))
        ));
    }

    #[test]
    fn starter_and_cpu_halves() {
        let decks = DeckCollection::zeroed();
        assert_eq!(decks.starter_bytes().len(), 17 * 82);
        assert_eq!(decks.cpu_bytes().len(), 24 * 82);
        assert_eq!(DeckKind::of(16), Some(DeckKind::Starter));
        assert_eq!(DeckKind::of(17), Some(DeckKind::Cpu));
        assert_eq!(DeckKind::of(41), None);
    }

    #[test]
    fn summary_labels() {
        let cards = CardIndex::Present(CardNames::from_names(["Kuriboh", "Dark Magician"]));
        let mut decks = DeckCollection::zeroed();
        decks.store(0, 1, 4, &[0; SLOT_COUNT]).unwrap();
        decks.store(20, 9, 12, &[0; SLOT_COUNT]).unwrap();

        let summaries = decks.summaries(&cards);
        assert_eq!(summaries.len(), DECK_COUNT);
        assert_eq!(
            summaries[0].to_string(),
            "[Starter]       1 [rank: 4] Dark Magician"
        );
        assert_eq!(
            summaries[20].to_string(),
            "[CPU]       9 [rank:12] id_out_of_bounds"
        );
        assert_eq!(
            decks.summary(3, &CardIndex::Absent).unwrap().to_string(),
            "[Starter]       0 [rank: 0] ---"
        );
    }

    #[test]
    fn summary_serializes_kind_lowercase() {
        let decks = DeckCollection::zeroed();
        let summary = decks.summary(17, &CardIndex::Absent).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["kind"], "cpu");
        assert_eq!(json["index"], 17);
    }
}
