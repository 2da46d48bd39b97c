use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(
    name = "rosedeck",
    version,
    about = "Deck editor for Yu-Gi-Oh! The Duelist of the Roses disc images"
)]
struct Args {
    /// Card name list, one name per line (line N is card N)
    #[arg(long, global = true, default_value = "cardlist.txt")]
    cards: PathBuf,

    /// File remembering the last image path
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every deck with its leader card
    List {
        /// Disc image (defaults to the last image used)
        #[arg(long)]
        image: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },
    /// Show the leader and all 40 cards of one deck
    Show {
        /// Deck number: 0-16 starter, 17-40 CPU
        #[arg(long)]
        deck: usize,

        #[arg(long)]
        image: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },
    /// Change a deck's leader card and rank
    SetLeader {
        #[arg(long)]
        deck: usize,

        /// Card ID or part of a card name
        #[arg(long)]
        card: String,

        #[arg(long)]
        rank: String,

        #[arg(long)]
        image: Option<PathBuf>,

        /// Write to this image instead of the source image
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Change one card slot (0-39) of a deck
    SetSlot {
        #[arg(long)]
        deck: usize,

        #[arg(long)]
        slot: usize,

        /// Card ID or part of a card name
        #[arg(long)]
        card: String,

        #[arg(long)]
        image: Option<PathBuf>,

        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace a whole deck; the slots file holds 40 card references, one per line
    SetDeck {
        #[arg(long)]
        deck: usize,

        #[arg(long)]
        leader: String,

        #[arg(long)]
        rank: String,

        #[arg(long, value_name = "FILE")]
        slots: PathBuf,

        #[arg(long)]
        image: Option<PathBuf>,

        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Look a card up by ID or name fragment
    Lookup { text: String },
}

fn init_logging(debug: bool) {
    let default_filter = if debug {
        "rosedeck_cli=debug,rosedeck_core=debug"
    } else {
        "rosedeck_cli=warn,rosedeck_core=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(err) = commands::run(args) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
