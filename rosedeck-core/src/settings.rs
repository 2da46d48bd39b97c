use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::Result;

const APP_DIR: &str = "RoseDeck";
const DEFAULT_PATH_FILE: &str = "default_path.cfg";

/// Remembers the last image path between runs. The file holds nothing but
/// the UTF-8 path.
#[derive(Debug, Clone)]
pub struct DefaultPathStore {
    file: PathBuf,
}

impl DefaultPathStore {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    /// Store under the platform config directory, falling back to the data
    /// directory, then the working directory.
    pub fn in_config_dir() -> Self {
        let file = dirs::config_dir()
            .or_else(dirs::data_dir)
            .map(|base| base.join(APP_DIR).join(DEFAULT_PATH_FILE))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PATH_FILE));
        Self { file }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// A missing, unreadable or empty file means there is no default.
    pub fn load(&self) -> Option<PathBuf> {
        match fs::read_to_string(&self.file) {
            Ok(text) if !text.is_empty() => Some(PathBuf::from(text)),
            Ok(_) => None,
            Err(err) => {
                debug!("No default path in {}: {}", self.file.display(), err);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = self.file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.file, path.to_string_lossy().as_bytes())?;
        debug!("Wrote default path {} to {}", path.display(), self.file.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = DefaultPathStore::new(dir.path().join("nested").join("default_path.cfg"));
        assert_eq!(store.load(), None);

        store.save(Path::new("/games/Duelist of the Roses.iso")).unwrap();
        assert_eq!(
            store.load(),
            Some(PathBuf::from("/games/Duelist of the Roses.iso"))
        );
        assert_eq!(
            fs::read(store.file()).unwrap(),
            b"/games/Duelist of the Roses.iso".to_vec()
        );
    }

    #[test]
    fn unreadable_file_is_no_default() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("default_path.cfg");
        fs::write(&file, [0xFF, 0xFE, 0x00]).unwrap();
        assert_eq!(DefaultPathStore::new(&file).load(), None);

        fs::write(&file, "").unwrap();
        assert_eq!(DefaultPathStore::new(&file).load(), None);
    }

    #[test]
    fn config_dir_store_uses_app_file_name() {
        let store = DefaultPathStore::in_config_dir();
        assert!(store.file().ends_with(DEFAULT_PATH_FILE));
    }
}
