// Ordered record collections backing the three stores
use std::fs;
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{HotelManagementError, Result};

// Every store operation is a full cycle over the collection: load the whole
// sequence, check it, then replace it with the extended sequence.
pub trait RecordCollection<T>: Send + Sync {
    fn load(&self) -> Result<Vec<T>>;

    fn replace(&self, records: Vec<T>) -> Result<()>;

    fn append(&self, record: T) -> Result<()> {
        let mut records = self.load()?;
        records.push(record);
        self.replace(records)
    }
}

// A pretty-printed JSON array in a single file. A missing file reads as empty.
pub struct JsonFileCollection<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileCollection<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }
}

impl<T> RecordCollection<T> for JsonFileCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Vec<T>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file not found, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(HotelManagementError::StorageError(e)),
        };

        serde_json::from_str(&content).map_err(|e| {
            HotelManagementError::FormatError(format!("{}: {}", self.path.display(), e))
        })
    }

    // Writes a sibling temp file and renames it over the target, so readers
    // see either the old array or the new one.
    fn replace(&self, records: Vec<T>) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;
        let json = serde_json::to_string_pretty(&records)
            .map_err(|e| HotelManagementError::FormatError(e.to_string()))?;

        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(json.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), records = records.len(), "store file written");
        Ok(())
    }
}

pub struct MemoryCollection<T> {
    records: Mutex<Vec<T>>,
}

impl<T> MemoryCollection<T> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl<T> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordCollection<T> for MemoryCollection<T>
where
    T: Clone + Send,
{
    fn load(&self) -> Result<Vec<T>> {
        Ok(self.records.lock().clone())
    }

    fn replace(&self, records: Vec<T>) -> Result<()> {
        *self.records.lock() = records;
        Ok(())
    }

    fn append(&self, record: T) -> Result<()> {
        self.records.lock().push(record);
        Ok(())
    }
}
