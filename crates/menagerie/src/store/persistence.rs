//! Store persistence - save/load the whole store as a JSON file.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::debug;

use crate::error::{MenagerieError, Result};

use super::Store;

impl Store {
    /// Save the store to a pretty-printed JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| MenagerieError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        debug!(path = %path.display(), "store saved");
        Ok(())
    }

    /// Load a store from a JSON file written by [`Store::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| MenagerieError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        let store = serde_json::from_reader(reader)?;
        debug!(path = %path.display(), "store loaded");
        Ok(store)
    }
}
