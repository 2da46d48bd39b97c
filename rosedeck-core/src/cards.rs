//! Card name list lookups.
//!
//! The game refers to cards purely by a 12-bit ID. Names come from a plain
//! text list shipped next to the tool where line N holds the name of card N.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// Placeholder returned for every ID when no card list could be loaded.
pub const UNKNOWN_NAME: &str = "---";

/// Placeholder returned for an ID past the end of the card list.
pub const OUT_OF_BOUNDS_NAME: &str = "id_out_of_bounds";

#[derive(Debug, Error)]
pub enum CardListError {
    #[error("failed to read card list: {0}")]
    Io(#[from] std::io::Error),

    #[error("blank card name on line {line}")]
    BlankLine { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardName {
    pub id: u32,
    pub name: String,
}

/// Names in ID order, with a lowercased copy kept for case-insensitive
/// matching.
#[derive(Debug, Clone, Default)]
pub struct CardNames {
    names: Vec<String>,
    lowered: Vec<String>,
}

impl CardNames {
    /// Parse a card list held in memory.
    pub fn parse(src: &str) -> Result<Self, CardListError> {
        Self::from_reader(src.as_bytes())
    }

    /// Read one trimmed name per line. A blank line aborts the whole list.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, CardListError> {
        let mut names = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let name = line.trim();
            if name.is_empty() {
                return Err(CardListError::BlankLine { line: idx + 1 });
            }
            names.push(name.to_string());
        }
        Ok(Self::from_names(names))
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let lowered = names.iter().map(|n| n.to_lowercase()).collect();
        Self { names, lowered }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| (i as u32, name.as_str()))
    }

    fn card(&self, idx: usize) -> CardName {
        CardName {
            id: idx as u32,
            name: self.names[idx].clone(),
        }
    }

    fn exact(&self, name: &str) -> Option<CardName> {
        let needle = name.to_lowercase();
        self.lowered
            .iter()
            .position(|candidate| *candidate == needle)
            .map(|idx| self.card(idx))
    }

    fn containing(&self, name: &str) -> Vec<CardName> {
        let needle = name.to_lowercase();
        self.lowered
            .iter()
            .enumerate()
            .filter(|(_, candidate)| candidate.contains(needle.as_str()))
            .map(|(idx, _)| self.card(idx))
            .collect()
    }
}

/// Outcome of a name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatch {
    /// No card list is loaded, so nothing was searched.
    Unavailable,
    NoMatch,
    Unique(CardName),
    /// Two or more hits, in ID order.
    Ambiguous(Vec<CardName>),
}

impl NameMatch {
    fn from_hits(mut hits: Vec<CardName>) -> Self {
        match hits.len() {
            0 => NameMatch::NoMatch,
            1 => NameMatch::Unique(hits.remove(0)),
            _ => NameMatch::Ambiguous(hits),
        }
    }
}

/// The card list as seen by the rest of the tool: either loaded, or
/// absent because it could not be read.
#[derive(Debug, Clone)]
pub enum CardIndex {
    Present(CardNames),
    Absent,
}

impl CardIndex {
    /// Load the list from disk. Any failure leaves the index absent and is
    /// only logged.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let result = File::open(path)
            .map_err(CardListError::from)
            .and_then(|file| CardNames::from_reader(BufReader::new(file)));

        match result {
            Ok(names) => {
                info!("Loaded {} card names from {}", names.len(), path.display());
                CardIndex::Present(names)
            }
            Err(err) => {
                warn!(
                    "Card names unavailable, using placeholders ({}): {}",
                    path.display(),
                    err
                );
                CardIndex::Absent
            }
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, CardIndex::Present(_))
    }

    pub fn names(&self) -> Option<&CardNames> {
        match self {
            CardIndex::Present(names) => Some(names),
            CardIndex::Absent => None,
        }
    }

    pub fn get_name(&self, id: u32) -> &str {
        match self {
            CardIndex::Present(names) => names.get(id).unwrap_or(OUT_OF_BOUNDS_NAME),
            CardIndex::Absent => UNKNOWN_NAME,
        }
    }

    /// Case-insensitive whole-name match. Only the first hit in ID order
    /// is returned, so this never yields `Ambiguous`.
    pub fn match_exact(&self, name: &str) -> NameMatch {
        match self {
            CardIndex::Present(names) => match names.exact(name) {
                Some(card) => NameMatch::Unique(card),
                None => NameMatch::NoMatch,
            },
            CardIndex::Absent => NameMatch::Unavailable,
        }
    }

    /// Case-insensitive "contains" match over every name.
    pub fn match_substring(&self, name: &str) -> NameMatch {
        match self {
            CardIndex::Present(names) => NameMatch::from_hits(names.containing(name)),
            CardIndex::Absent => NameMatch::Unavailable,
        }
    }

    /// The `limit` names nearest to `name` by edit distance, ties broken by
    /// ID. Empty when the index is absent.
    pub fn closest(&self, name: &str, limit: usize) -> Vec<CardName> {
        let Some(names) = self.names() else {
            return Vec::new();
        };
        let needle = name.to_lowercase();
        let mut scored: Vec<(usize, usize)> = names
            .lowered
            .iter()
            .enumerate()
            .map(|(idx, candidate)| (levenshtein(&needle, candidate), idx))
            .collect();
        scored.sort_unstable();
        scored
            .into_iter()
            .take(limit)
            .map(|(_, idx)| names.card(idx))
            .collect()
    }
}

/// Edit distance between two strings, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return long.len();
    }

    // Single rolling row, one longer than the shorter string.
    let mut row: Vec<usize> = (0..=short.len()).collect();
    for (i, lc) in long.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let above = row[j + 1];
            let substitution = diagonal + usize::from(lc != sc);
            row[j + 1] = (above + 1).min(row[j] + 1).min(substitution);
            diagonal = above;
        }
    }
    row[short.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn dragons() -> CardIndex {
        CardIndex::Present(CardNames::from_names([
            "Blue-Eyes White Dragon",
            "Red-Eyes Black Dragon",
            "Dark Magician",
        ]))
    }

    #[test]
    fn parses_one_name_per_line() {
        let names = CardNames::parse("Mystical Elf\n  Feral Imp \r\nDark Magician\n").unwrap();
        assert_eq!(names.len(), 3);
        assert_eq!(names.get(1), Some("Feral Imp"));
        assert_eq!(names.get(2), Some("Dark Magician"));
    }

    #[test]
    fn blank_line_rejects_list() {
        let err = CardNames::parse("Mystical Elf\n\nDark Magician").unwrap_err();
        assert!(matches!(err, CardListError::BlankLine { line: 2 }));

        let err = CardNames::parse("Mystical Elf\n   \n").unwrap_err();
        assert!(matches!(err, CardListError::BlankLine { line: 2 }));
    }

    #[test]
    fn get_name_placeholders() {
        let index = dragons();
        assert_eq!(index.get_name(0), "Blue-Eyes White Dragon");
        assert_eq!(index.get_name(3), OUT_OF_BOUNDS_NAME);
        assert_eq!(CardIndex::Absent.get_name(0), UNKNOWN_NAME);
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        let index = dragons();
        assert_eq!(
            index.match_exact("dark MAGICIAN"),
            NameMatch::Unique(CardName {
                id: 2,
                name: "Dark Magician".to_string()
            })
        );
        assert_eq!(index.match_exact("Dark"), NameMatch::NoMatch);
        assert_eq!(CardIndex::Absent.match_exact("Dark Magician"), NameMatch::Unavailable);
    }

    #[test]
    fn exact_match_returns_first_duplicate() {
        let index = CardIndex::Present(CardNames::from_names(["Kuriboh", "kuriboh"]));
        match index.match_exact("KURIBOH") {
            NameMatch::Unique(card) => assert_eq!(card.id, 0),
            other => panic!("unexpected match: {other:?}"),
        }
    }

    #[test]
    fn substring_match_none_one_many() {
        let index = dragons();
        assert_eq!(index.match_substring("zzz"), NameMatch::NoMatch);

        match index.match_substring("magic") {
            NameMatch::Unique(card) => assert_eq!(card.id, 2),
            other => panic!("unexpected match: {other:?}"),
        }

        match index.match_substring("DRAGON") {
            NameMatch::Ambiguous(hits) => {
                let ids: Vec<u32> = hits.iter().map(|c| c.id).collect();
                assert_eq!(ids, vec![0, 1]);
            }
            other => panic!("unexpected match: {other:?}"),
        }

        assert_eq!(CardIndex::Absent.match_substring("dragon"), NameMatch::Unavailable);
    }

    #[test]
    fn substring_needle_is_literal() {
        let index = CardIndex::Present(CardNames::from_names(["Mr. Volcano", "Mrs. Volcano"]));
        assert!(matches!(index.match_substring("r."), NameMatch::Unique(_)));
        assert_eq!(index.match_substring(".*"), NameMatch::NoMatch);
    }

    #[test]
    fn levenshtein_distances() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("sitting", "kitten"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("dragon", "dragon"), 0);
    }

    #[test]
    fn closest_orders_by_distance_then_id() {
        let index = dragons();
        let hits = index.closest("dark magican", 2);
        assert_eq!(hits[0].id, 2);
        assert_eq!(hits.len(), 2);
        assert!(CardIndex::Absent.closest("dark", 5).is_empty());
    }

    #[test]
    fn load_from_file_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Blue-Eyes White Dragon").unwrap();
        writeln!(file, "Red-Eyes Black Dragon").unwrap();
        file.flush().unwrap();

        let index = CardIndex::load(file.path());
        assert!(index.is_present());
        assert_eq!(index.get_name(1), "Red-Eyes Black Dragon");

        let dir = tempfile::tempdir().unwrap();
        let missing = CardIndex::load(dir.path().join("cardlist.txt"));
        assert!(!missing.is_present());
    }

    #[test]
    fn load_with_blank_line_is_absent() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Blue-Eyes White Dragon\n\nDark Magician\n").unwrap();
        file.flush().unwrap();

        let index = CardIndex::load(file.path());
        assert!(!index.is_present());
        assert_eq!(index.get_name(0), UNKNOWN_NAME);
    }
}
