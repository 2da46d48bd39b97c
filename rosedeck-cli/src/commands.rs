use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use rosedeck_core::deck::SLOT_COUNT;
use rosedeck_core::resolve::MAX_LISTED_CANDIDATES;
use rosedeck_core::{
    resolve_card_reference, CardIndex, DeckEditError, DeckView, DefaultPathStore, EditorSession,
    NameMatch, Resolution,
};
use tracing::info;

use crate::{Args, Command};

type CliResult = std::result::Result<(), Box<dyn Error>>;

pub(crate) fn run(args: Args) -> CliResult {
    let store = match &args.config {
        Some(file) => DefaultPathStore::new(file),
        None => DefaultPathStore::in_config_dir(),
    };
    let mut session =
        EditorSession::new(CardIndex::load(&args.cards)).with_default_path_store(store);

    match args.command {
        Command::List { image, json } => {
            open(&mut session, image)?;
            let decks = session.deck_list();
            if json {
                println!("{}", serde_json::to_string_pretty(&decks)?);
            } else {
                for deck in &decks {
                    println!("{:>2} {}", deck.index, deck);
                }
            }
        }
        Command::Show { deck, image, json } => {
            open(&mut session, image)?;
            let view = session.select_record(deck)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_deck(&view);
            }
        }
        Command::SetLeader {
            deck,
            card,
            rank,
            image,
            output,
        } => {
            let source = open(&mut session, image)?;
            session.select_record(deck)?;
            let view = session.set_leader(&card, &rank)?;
            write_back(&mut session, &source, output)?;
            println!("{}", view.label);
        }
        Command::SetSlot {
            deck,
            slot,
            card,
            image,
            output,
        } => {
            let source = open(&mut session, image)?;
            session.select_record(deck)?;
            let view = session.set_slot(slot, &card)?;
            write_back(&mut session, &source, output)?;
            let slot = &view.slots[slot];
            println!("{} | slot {:>2}: {} {}", view.label, slot.slot, slot.card, slot.name);
        }
        Command::SetDeck {
            deck,
            leader,
            rank,
            slots,
            image,
            output,
        } => {
            let slot_texts = read_slots_file(&slots)?;
            let source = open(&mut session, image)?;
            session.select_record(deck)?;
            let view = session.set_deck(&leader, &rank, &slot_texts)?;
            write_back(&mut session, &source, output)?;
            print_deck(&view);
        }
        Command::Lookup { text } => lookup(session.cards(), &text),
    }

    Ok(())
}

/// Open `image`, or the remembered image when none is given.
fn open(session: &mut EditorSession, image: Option<PathBuf>) -> rosedeck_core::Result<PathBuf> {
    let path = image
        .or_else(|| session.default_path().map(Path::to_path_buf))
        .ok_or_else(|| {
            DeckEditError::Config(
                "no disc image given and none remembered; pass --image".to_string(),
            )
        })?;
    session.open_image(&path)?;
    Ok(path)
}

/// Save into `output` (seeded with a copy of the source image when it does
/// not exist yet) or back into the source image.
fn write_back(
    session: &mut EditorSession,
    source: &Path,
    output: Option<PathBuf>,
) -> rosedeck_core::Result<()> {
    let dest = output.unwrap_or_else(|| source.to_path_buf());
    if dest != source && !dest.exists() {
        fs::copy(source, &dest)?;
        info!("Copied {} to {}", source.display(), dest.display());
    }
    session.save_image(&dest)
}

fn read_slots_file(path: &Path) -> rosedeck_core::Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    let slots: Vec<String> = text.lines().map(|line| line.trim().to_string()).collect();
    if slots.len() != SLOT_COUNT {
        return Err(DeckEditError::Config(format!(
            "{} holds {} card references, expected {}",
            path.display(),
            slots.len(),
            SLOT_COUNT
        )));
    }
    Ok(slots)
}

fn print_deck(view: &DeckView) {
    println!("{}", view.label);
    println!("Leader: {} {} (rank {})", view.leader, view.leader_name, view.rank);
    for slot in &view.slots {
        println!("{:>2} {:>5} {}", slot.slot, slot.card, slot.name);
    }
}

fn lookup(cards: &CardIndex, text: &str) {
    match resolve_card_reference(cards, text) {
        Resolution::Resolved { id } => println!("{} {}", id, cards.get_name(id.into())),
        Resolution::NoMatch => {
            println!("No matching card found: '{}'", text);
            let suggestions = cards.closest(text, MAX_LISTED_CANDIDATES);
            if !suggestions.is_empty() {
                println!("Closest names:");
                for card in suggestions {
                    println!("{:>5} {}", card.id, card.name);
                }
            }
        }
        Resolution::Ambiguous(candidates) => {
            println!("{} matches for '{}':", candidates.len(), text);
            for card in &candidates {
                println!("{:>5} {}", card.id, card.name);
            }
            if let NameMatch::Unique(exact) = cards.match_exact(text) {
                println!("Exact name: {} {} (use the ID to pick it)", exact.id, exact.name);
            }
        }
    }
}
