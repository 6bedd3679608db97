//! File-backed content storage
//!
//! Keeps the live key/value map in memory and makes it durable with an
//! append-only commit log.
//!
//! ## Log Format
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ SnapshotBegin { chunks: 2 }                  │  <- written by compaction
//! │ Commit(snapshot chunk 1)                     │
//! │ Commit(snapshot chunk 2)                     │
//! ├──────────────────────────────────────────────┤
//! │ Commit(Vec<ContentOperation>)                │  <- one per commit
//! │ Commit(Vec<ContentOperation>)                │
//! └──────────────────────────────────────────────┘
//! ```
//! Every record is one frame (see [`crate::frame`]). On open the log is
//! replayed front to back; a torn or corrupt tail is truncated away. A
//! snapshot is applied only when all of its chunks are present.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SyncStrategy;
use crate::error::{FeedStoreError, Result};
use crate::frame::{encode_frame, scan_frames, HEADER_SIZE};

use super::{
    apply_operations, lookup, scan_prefix, ContentOperation, ContentStorage,
    ContentStorageMutation,
};

/// Target payload size of one snapshot chunk (16 MB)
pub const SNAPSHOT_CHUNK_BYTES: usize = 16 * 1024 * 1024;

/// Per-entry encoding overhead counted against a snapshot chunk
const SNAPSHOT_ENTRY_OVERHEAD: usize = 24;

/// One frame of the commit log
#[derive(Debug, Serialize, Deserialize)]
enum LogRecord<'a> {
    /// Operations applied together
    Commit(Cow<'a, [ContentOperation]>),

    /// Replaces all entries with the next `chunks` commit frames
    SnapshotBegin { chunks: u64 },
}

/// Append handle plus the current log length
struct LogWriter {
    file: File,
    len: u64,
}

/// Stats from replaying the commit log
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayResult {
    /// Number of commits replayed
    pub commits_replayed: u64,

    /// Whether a torn or corrupt tail was truncated
    pub was_truncated: bool,
}

/// Content storage persisted in a single commit log
pub struct FileContentStorage {
    /// Path of the commit log
    path: PathBuf,

    sync_strategy: SyncStrategy,

    /// Live entries, rebuilt from the log on open
    entries: RwLock<BTreeMap<String, Vec<u8>>>,

    /// Serializes commits
    writer: Mutex<LogWriter>,

    replay: ReplayResult,
}

impl FileContentStorage {
    /// Open or create the commit log at `path`
    ///
    /// On startup:
    /// 1. Read and replay every valid commit
    /// 2. Truncate a torn tail
    /// 3. Optionally compact the log into one snapshot commit
    pub fn open(path: &Path, sync_strategy: SyncStrategy, compact: bool) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut entries = BTreeMap::new();
        let replay = Self::replay(path, &mut entries)?;

        if replay.commits_replayed > 0 || replay.was_truncated {
            info!(
                path = %path.display(),
                commits = replay.commits_replayed,
                truncated = replay.was_truncated,
                keys = entries.len(),
                "content log replayed"
            );
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let len = file.metadata()?.len();

        let storage = Self {
            path: path.to_path_buf(),
            sync_strategy,
            entries: RwLock::new(entries),
            writer: Mutex::new(LogWriter { file, len }),
            replay,
        };

        if compact && replay.commits_replayed > 1 {
            storage.compact()?;
        }

        Ok(storage)
    }

    /// Rewrite the log as a single snapshot.
    ///
    /// Written to a temp file and renamed over the log, so a crash leaves
    /// either the old log or the new one.
    pub fn compact(&self) -> Result<()> {
        self.compact_with_chunk_size(SNAPSHOT_CHUNK_BYTES)
    }

    /// [`compact`](Self::compact) with an explicit chunk size
    ///
    /// The snapshot is split into commit frames of roughly `chunk_bytes`
    /// each, behind a `SnapshotBegin` frame holding the chunk count.
    pub fn compact_with_chunk_size(&self, chunk_bytes: usize) -> Result<()> {
        let mut writer = self.writer.lock();
        let entries = self.entries.read();

        let chunks = snapshot_chunks(&entries, chunk_bytes);

        let tmp_path = self.path.with_extension("log.tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            if !chunks.is_empty() {
                let begin = LogRecord::SnapshotBegin {
                    chunks: chunks.len() as u64,
                };
                tmp.write_all(&encode_frame(&bincode::serialize(&begin)?)?)?;
                for chunk in &chunks {
                    let record = LogRecord::Commit(Cow::Borrowed(chunk.as_slice()));
                    tmp.write_all(&encode_frame(&bincode::serialize(&record)?)?)?;
                }
            }
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let len = file.metadata()?.len();
        *writer = LogWriter { file, len };

        debug!(
            path = %self.path.display(),
            keys = entries.len(),
            chunks = chunks.len(),
            "content log compacted"
        );
        Ok(())
    }

    /// Stats from the replay performed on open
    pub fn replay_result(&self) -> ReplayResult {
        self.replay
    }

    /// Current size of the commit log in bytes
    pub fn log_len(&self) -> u64 {
        self.writer.lock().len
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn replay(path: &Path, entries: &mut BTreeMap<String, Vec<u8>>) -> Result<ReplayResult> {
        let mut result = ReplayResult::default();
        if !path.exists() {
            return Ok(result);
        }

        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;

        let scan = scan_frames(&data);
        let mut valid_len = 0usize;
        let mut decode_failed = false;
        let mut index = 0;

        while index < scan.frames.len() {
            let frame = &scan.frames[index];
            match bincode::deserialize::<LogRecord>(frame) {
                Ok(LogRecord::Commit(operations)) => {
                    apply_operations(entries, &operations);
                    result.commits_replayed += 1;
                    valid_len += HEADER_SIZE + frame.len();
                    index += 1;
                }
                Ok(LogRecord::SnapshotBegin { chunks }) => {
                    let rest = &scan.frames[index + 1..];
                    let Some(snapshot) = read_snapshot(rest, chunks) else {
                        warn!(offset = valid_len, chunks, "incomplete content snapshot; stopping replay");
                        decode_failed = true;
                        break;
                    };

                    entries.clear();
                    for chunk in &snapshot {
                        apply_operations(entries, chunk);
                    }
                    result.commits_replayed += 1;
                    valid_len += HEADER_SIZE + frame.len();
                    valid_len += rest[..snapshot.len()]
                        .iter()
                        .map(|chunk| HEADER_SIZE + chunk.len())
                        .sum::<usize>();
                    index += 1 + snapshot.len();
                }
                Err(e) => {
                    warn!(offset = valid_len, error = %e, "undecodable content commit; stopping replay");
                    decode_failed = true;
                    break;
                }
            }
        }

        if scan.was_truncated || decode_failed {
            warn!(
                path = %path.display(),
                valid_len,
                file_len = data.len(),
                "truncating content log tail"
            );
            OpenOptions::new()
                .write(true)
                .open(path)?
                .set_len(valid_len as u64)?;
            result.was_truncated = true;
        }

        Ok(result)
    }
}

impl ContentStorage for FileContentStorage {
    fn get(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>> {
        Ok(lookup(&self.entries.read(), keys))
    }

    fn get_all(&self, prefix: &str) -> Result<HashMap<String, Vec<u8>>> {
        Ok(scan_prefix(&self.entries.read(), prefix))
    }

    fn get_all_keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }

    fn commit(&self, mutation: ContentStorageMutation) -> Result<()> {
        if mutation.is_empty() {
            return Ok(());
        }

        let operations = mutation.into_operations();
        let record = LogRecord::Commit(Cow::Borrowed(operations.as_slice()));
        let frame = encode_frame(&bincode::serialize(&record)?)?;

        let mut writer = self.writer.lock();
        let start = writer.len;

        if let Err(e) = write_frame(&mut writer.file, &frame, self.sync_strategy) {
            // Drop any partial frame so later commits stay readable
            if let Err(truncate_err) = writer.file.set_len(start) {
                warn!(error = %truncate_err, "failed to roll back partial content commit");
            }
            return Err(FeedStoreError::Storage(format!(
                "content commit failed: {}",
                e
            )));
        }
        writer.len = start + frame.len() as u64;

        // Apply while still holding the writer so log order == memory order
        let mut entries = self.entries.write();
        apply_operations(&mut entries, &operations);
        Ok(())
    }
}

/// Split the live entries into upsert batches of about `chunk_bytes`.
/// A chunk always holds at least one entry.
fn snapshot_chunks(entries: &BTreeMap<String, Vec<u8>>, chunk_bytes: usize) -> Vec<Vec<ContentOperation>> {
    let mut chunks = Vec::new();
    let mut current = Vec::new();
    let mut current_bytes = 0usize;

    for (key, value) in entries {
        let size = key.len() + value.len() + SNAPSHOT_ENTRY_OVERHEAD;
        if !current.is_empty() && current_bytes + size > chunk_bytes {
            chunks.push(std::mem::take(&mut current));
            current_bytes = 0;
        }
        current.push(ContentOperation::Upsert {
            key: key.clone(),
            value: value.clone(),
        });
        current_bytes += size;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Decode the `chunks` frames following a `SnapshotBegin`.
/// `None` if any chunk is missing or is not a commit.
fn read_snapshot(frames: &[Vec<u8>], chunks: u64) -> Option<Vec<Vec<ContentOperation>>> {
    let chunks = usize::try_from(chunks).ok()?;
    if frames.len() < chunks {
        return None;
    }

    frames[..chunks]
        .iter()
        .map(|frame| match bincode::deserialize::<LogRecord>(frame) {
            Ok(LogRecord::Commit(operations)) => Some(operations.into_owned()),
            _ => None,
        })
        .collect()
}

fn write_frame(file: &mut File, frame: &[u8], sync_strategy: SyncStrategy) -> std::io::Result<()> {
    file.write_all(frame)?;
    file.flush()?;
    if sync_strategy == SyncStrategy::EveryCommit {
        file.sync_data()?;
    }
    Ok(())
}

impl std::fmt::Debug for FileContentStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileContentStorage")
            .field("path", &self.path)
            .field("keys", &self.entries.read().len())
            .finish()
    }
}
