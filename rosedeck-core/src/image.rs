//! Reading and writing the deck regions of the disc image.
//!
//! The starter and CPU decks live in two separate blocks of the ISO. In
//! memory they are kept back to back, starters first.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::deck::{DeckCollection, CPU_DECK_COUNT, RECORD_SIZE, STARTER_DECK_COUNT};
use crate::{DeckEditError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckRegion {
    pub name: &'static str,
    pub offset: u64,
    pub len: usize,
}

impl DeckRegion {
    pub fn end(&self) -> u64 {
        self.offset + self.len as u64
    }
}

pub const STARTER_REGION: DeckRegion = DeckRegion {
    name: "starter",
    offset: 0x2A_0A70,
    len: STARTER_DECK_COUNT * RECORD_SIZE,
};

pub const CPU_REGION: DeckRegion = DeckRegion {
    name: "CPU",
    offset: 0x2A_1316,
    len: CPU_DECK_COUNT * RECORD_SIZE,
};

fn read_region<R: Read + Seek>(reader: &mut R, region: &DeckRegion, dst: &mut [u8]) -> Result<()> {
    reader.seek(SeekFrom::Start(region.offset))?;
    reader.read_exact(dst).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            DeckEditError::ImageTooSmall {
                region: region.name,
                end: region.end(),
            }
        } else {
            DeckEditError::Io(err)
        }
    })
}

/// Read both deck regions into one collection.
pub fn read_decks<R: Read + Seek>(reader: &mut R) -> Result<DeckCollection> {
    let mut data = vec![0u8; STARTER_REGION.len + CPU_REGION.len];
    let (starter, cpu) = data.split_at_mut(STARTER_REGION.len);
    read_region(reader, &STARTER_REGION, starter)?;
    read_region(reader, &CPU_REGION, cpu)?;
    Ok(DeckCollection::from_bytes(data)?)
}

/// Write the collection back over both deck regions. Bytes outside the
/// regions are left alone.
pub fn write_decks<W: Write + Seek>(writer: &mut W, decks: &DeckCollection) -> Result<()> {
    writer.seek(SeekFrom::Start(STARTER_REGION.offset))?;
    writer.write_all(decks.starter_bytes())?;
    writer.seek(SeekFrom::Start(CPU_REGION.offset))?;
    writer.write_all(decks.cpu_bytes())?;
    writer.flush()?;
    Ok(())
}

pub fn load_image(path: &Path) -> Result<DeckCollection> {
    let mut reader = BufReader::new(File::open(path)?);
    let decks = read_decks(&mut reader)?;
    info!("Loaded {} decks from {}", decks.len(), path.display());
    Ok(decks)
}

/// Patch the decks into an existing image in place.
pub fn save_image(path: &Path, decks: &DeckCollection) -> Result<()> {
    if !path.is_file() {
        return Err(DeckEditError::MissingDestination(path.to_path_buf()));
    }

    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    let image_len = file.metadata()?.len();
    debug!("Destination image is {:#X} bytes", image_len);
    if image_len < CPU_REGION.end() {
        return Err(DeckEditError::ImageTooSmall {
            region: CPU_REGION.name,
            end: CPU_REGION.end(),
        });
    }

    write_decks(&mut file, decks)?;
    info!("Saved {} decks to {}", decks.len(), path.display());
    Ok(())
}
