//! File-backed journal storage
//!
//! One file per journal under a directory. The file name is the hex
//! encoded journal name, so any journal name is a valid file name.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Frame 1: bincode(Vec<record bytes>)  │  <- one commit
//! ├──────────────────────────────────────┤
//! │ Frame 2: bincode(Vec<record bytes>)  │
//! └──────────────────────────────────────┘
//! ```
//! Append-only commits add one frame in place. Commits that delete or copy
//! rebuild the affected files and swap them in with a rename, split into
//! frames of bounded size.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::SyncStrategy;
use crate::error::{FeedStoreError, Result};
use crate::frame::{encode_frame, scan_frames, HEADER_SIZE};

use super::{apply_mutation, JournalMutation, JournalOperation, JournalStorage};

const JOURNAL_EXTENSION: &str = "journal";

/// Longest file name most filesystems accept
const MAX_FILE_NAME_LEN: usize = 255;

/// Longest journal name in bytes whose hex file name still fits
pub const MAX_JOURNAL_NAME_LEN: usize = (MAX_FILE_NAME_LEN - 1 - JOURNAL_EXTENSION.len()) / 2;

/// Target payload size of one frame when a journal is rewritten (16 MB)
const REWRITE_BATCH_BYTES: usize = 16 * 1024 * 1024;

/// Stats from the recovery pass run on open
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JournalRecovery {
    /// Journals found on disk
    pub journals_found: usize,

    /// Journals whose torn tail was truncated
    pub journals_truncated: usize,
}

/// Journal storage persisted as one file per journal
pub struct FileJournalStorage {
    /// Directory holding the journal files
    dir: PathBuf,

    sync_strategy: SyncStrategy,

    /// Serializes commits. A copy and an append to the same source can
    /// never interleave.
    commit_lock: Mutex<()>,

    recovery: JournalRecovery,
}

impl FileJournalStorage {
    /// Open or create journal storage in `dir`
    ///
    /// Every journal is scanned and any torn tail is cut off, so later
    /// in-place appends always follow a valid frame.
    pub fn open(dir: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        fs::create_dir_all(dir)?;

        let mut recovery = JournalRecovery::default();
        for path in Self::journal_files(dir)? {
            recovery.journals_found += 1;
            if Self::recover_file(&path)? {
                recovery.journals_truncated += 1;
            }
        }

        if recovery.journals_truncated > 0 {
            info!(
                dir = %dir.display(),
                found = recovery.journals_found,
                truncated = recovery.journals_truncated,
                "journal recovery finished"
            );
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            sync_strategy,
            commit_lock: Mutex::new(()),
            recovery,
        })
    }

    /// Stats from the recovery performed on open
    pub fn recovery(&self) -> JournalRecovery {
        self.recovery
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path of a journal
    ///
    /// Names longer than [`MAX_JOURNAL_NAME_LEN`] bytes are rejected.
    pub fn journal_path(&self, name: &str) -> Result<PathBuf> {
        if name.len() > MAX_JOURNAL_NAME_LEN {
            return Err(FeedStoreError::Storage(format!(
                "journal name is {} bytes, longer than the {} byte limit",
                name.len(),
                MAX_JOURNAL_NAME_LEN
            )));
        }
        Ok(self
            .dir
            .join(format!("{}.{}", hex::encode(name.as_bytes()), JOURNAL_EXTENSION)))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn journal_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && Self::parse_journal_name(&path).is_some() {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// "2448454144.journal" -> Some("$HEAD")
    fn parse_journal_name(path: &Path) -> Option<String> {
        if path.extension()? != JOURNAL_EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        String::from_utf8(hex::decode(stem).ok()?).ok()
    }

    /// Truncate a torn tail. Returns true if the file was cut.
    fn recover_file(path: &Path) -> Result<bool> {
        let data = fs::read(path)?;
        let scan = scan_frames(&data);

        let mut valid_len = 0usize;
        for frame in &scan.frames {
            if bincode::deserialize::<Vec<Vec<u8>>>(frame).is_err() {
                break;
            }
            valid_len += HEADER_SIZE + frame.len();
        }

        if valid_len == data.len() {
            return Ok(false);
        }

        warn!(
            path = %path.display(),
            valid_len,
            file_len = data.len(),
            "truncating torn journal tail"
        );
        OpenOptions::new()
            .write(true)
            .open(path)?
            .set_len(valid_len as u64)?;
        Ok(true)
    }

    /// Read every record of a journal file; `None` if it does not exist
    fn load(&self, name: &str) -> Result<Option<Vec<Vec<u8>>>> {
        let path = self.journal_path(name)?;
        let mut data = Vec::new();
        match File::open(&path) {
            Ok(mut file) => {
                file.read_to_end(&mut data)?;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let scan = scan_frames(&data);
        if scan.was_truncated {
            // Either a commit in flight or damage after open; both are
            // invisible until the next recovery.
            debug!(journal = name, valid_len = scan.valid_len, "ignoring incomplete journal tail");
        }

        let mut records = Vec::new();
        for frame in scan.frames {
            let batch: Vec<Vec<u8>> = bincode::deserialize(&frame).map_err(|e| {
                FeedStoreError::JournalCorruption(format!("journal {}: {}", name, e))
            })?;
            records.extend(batch);
        }
        Ok(Some(records))
    }

    fn append_in_place(&self, name: &str, records: Vec<Vec<u8>>) -> Result<()> {
        let frame = encode_frame(&bincode::serialize(&records)?)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.journal_path(name)?)?;
        let start = file.metadata()?.len();

        if let Err(e) = self.write_synced(&mut file, &frame) {
            if let Err(truncate_err) = file.set_len(start) {
                warn!(journal = name, error = %truncate_err, "failed to roll back partial journal commit");
            }
            return Err(FeedStoreError::Storage(format!(
                "journal {} append failed: {}",
                name, e
            )));
        }
        Ok(())
    }

    /// Replace a journal file with exactly `records`
    fn rewrite(&self, name: &str, records: &[Vec<u8>]) -> Result<()> {
        let path = self.journal_path(name)?;
        let tmp_path = path.with_extension("tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            for batch in rewrite_batches(records) {
                let frame = encode_frame(&bincode::serialize(batch)?)?;
                tmp.write_all(&frame)?;
            }
            if self.sync_strategy == SyncStrategy::EveryCommit {
                tmp.sync_all()?;
            }
        }
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.journal_path(name)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_synced(&self, file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
        file.write_all(bytes)?;
        file.flush()?;
        if self.sync_strategy == SyncStrategy::EveryCommit {
            file.sync_data()?;
        }
        Ok(())
    }
}

impl JournalStorage for FileJournalStorage {
    fn read(&self, name: &str) -> Result<Vec<Vec<u8>>> {
        Ok(self.load(name)?.unwrap_or_default())
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.journal_path(name)?.exists())
    }

    fn get_all_journals(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = Self::journal_files(&self.dir)?
            .iter()
            .filter_map(|path| Self::parse_journal_name(path))
            .collect();
        names.sort();
        Ok(names)
    }

    fn commit(&self, mutation: JournalMutation) -> Result<()> {
        if mutation.is_empty() {
            return Ok(());
        }

        let _guard = self.commit_lock.lock();
        let name = mutation.journal_name().to_string();

        if mutation.is_append_only() {
            let records = mutation
                .operations()
                .iter()
                .filter_map(|op| match op {
                    JournalOperation::Append(record) => Some(record.clone()),
                    _ => None,
                })
                .collect();
            return self.append_in_place(&name, records);
        }

        // Materialize every journal the mutation touches, apply, write back
        let mut touched: Vec<String> = vec![name.clone()];
        for operation in mutation.operations() {
            if let JournalOperation::Copy { to } = operation {
                if !touched.contains(to) {
                    touched.push(to.clone());
                }
            }
        }

        let mut view = BTreeMap::new();
        for journal in &touched {
            if let Some(records) = self.load(journal)? {
                view.insert(journal.clone(), records);
            }
        }
        apply_mutation(&mut view, &mutation);

        for journal in &touched {
            match view.get(journal) {
                Some(records) => self.rewrite(journal, records)?,
                None => self.remove(journal)?,
            }
        }

        debug!(journal = %name, touched = touched.len(), "journal rewritten");
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        let _guard = self.commit_lock.lock();
        for path in Self::journal_files(&self.dir)? {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// Split records into consecutive batches of about `REWRITE_BATCH_BYTES`
fn rewrite_batches(records: &[Vec<u8>]) -> Vec<&[Vec<u8>]> {
    let mut batches = Vec::new();
    let mut start = 0;
    let mut bytes = 0usize;

    for (index, record) in records.iter().enumerate() {
        // 8 bytes of length prefix per record
        let size = record.len() + 8;
        if index > start && bytes + size > REWRITE_BATCH_BYTES {
            batches.push(&records[start..index]);
            start = index;
            bytes = 0;
        }
        bytes += size;
    }

    if start < records.len() {
        batches.push(&records[start..]);
    }
    batches
}

impl std::fmt::Debug for FileJournalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileJournalStorage")
            .field("dir", &self.dir)
            .finish()
    }
}
