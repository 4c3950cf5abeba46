//! Offline expense store.
//!
//! DESIGN
//! ======
//! One JSON file holds every locally recorded expense as an array, keyed in
//! memory by id. Each mutation rewrites the whole file through a temp file and
//! a rename so a crash never leaves a half-written store behind.
//!
//! Records written by older builds carried the category as a nested
//! `category: { id }` object. Those are rewritten to `categoryId` on load, and
//! a record with neither falls back to the default category. A record that
//! still fails to decode is left out of every query, but its raw JSON is kept
//! and written back on each save, so no command ever erases it.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};
use ledger::summary::sort_newest_first;
use ledger::{Category, Expense, Period};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid period: {0}")]
    Period(#[from] ledger::PeriodError),
}

#[derive(Debug)]
pub struct OfflineStore {
    path: PathBuf,
    records: HashMap<Uuid, Expense>,
    unreadable: Vec<Value>,
}

impl OfflineStore {
    /// Load the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be read or is not
    /// a JSON array.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self { path, records: HashMap::new(), unreadable: Vec::new() });
        }

        let file = File::open(&path).map_err(|source| StoreError::Io { path: path.clone(), source })?;
        let raw: Vec<Value> = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| StoreError::Parse { path: path.clone(), source })?;

        let mut records = HashMap::with_capacity(raw.len());
        let mut unreadable = Vec::new();
        for value in raw {
            match serde_json::from_value::<Expense>(normalize_legacy(value.clone())) {
                Ok(expense) => {
                    records.insert(expense.id, expense);
                }
                Err(_) => unreadable.push(value),
            }
        }

        Ok(Self { path, records, unreadable })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored entries that could not be decoded. They are hidden
    /// from queries and preserved on write.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.unreadable.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Insert or replace by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store file cannot be written.
    pub fn put(&mut self, expense: Expense) -> Result<(), StoreError> {
        self.records.insert(expense.id, expense);
        self.persist()
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Expense> {
        self.records.get(&id)
    }

    /// Every record, newest first.
    #[must_use]
    pub fn all(&self) -> Vec<Expense> {
        let mut list: Vec<Expense> = self.records.values().cloned().collect();
        sort_newest_first(&mut list);
        list
    }

    /// Records created during the local day containing `now`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Period`] if `now` sits at the edge of the
    /// representable calendar.
    pub fn today(&self, now: DateTime<Utc>, offset: FixedOffset) -> Result<Vec<Expense>, StoreError> {
        let period = Period::today(now, offset)?;
        Ok(self.all().into_iter().filter(|e| period.contains(e.created_at)).collect())
    }

    /// Remove a record. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store file cannot be written.
    pub fn delete(&mut self, id: Uuid) -> Result<bool, StoreError> {
        if self.records.remove(&id).is_none() {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Remove every readable record. Undecodable entries stay in the file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store file cannot be written.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.records.clear();
        self.persist()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut entries: Vec<Value> =
            self.all().into_iter().map(serde_json::to_value).collect::<Result<_, _>>()?;
        entries.extend(self.unreadable.iter().cloned());

        let temp_path = self.path.with_extension("json.tmp");
        let file = File::create(&temp_path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &entries)?;
        writer.flush().map_err(io_err)?;
        writer.get_ref().sync_all().map_err(io_err)?;

        if let Err(source) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(io_err(source));
        }
        Ok(())
    }
}

/// Rewrite a stored record into the current shape.
fn normalize_legacy(mut value: Value) -> Value {
    let Some(map) = value.as_object_mut() else {
        return value;
    };

    let has_category_id = map.get("categoryId").and_then(Value::as_str).is_some_and(|id| !id.is_empty());
    let legacy = map.remove("category");
    if !has_category_id {
        let id = legacy
            .as_ref()
            .and_then(|c| c.get("id"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .unwrap_or(Category::DEFAULT.id())
            .to_owned();
        map.insert("categoryId".to_owned(), Value::String(id));
    }
    value
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
