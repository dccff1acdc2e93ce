//! File-backed snapshot store implementation.
//!
//! Batches are appended to a single snapshot log as length-prefixed,
//! checksummed bincode frames and replayed into an in-memory index on open.
//! `clear` truncates the log, giving the same full-replace semantics as the
//! memory backend with durability across sessions.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::{Result, VoterRollError};
use crate::record::VoterRecord;
use crate::store::memory::SnapshotIndex;
use crate::store::traits::{SnapshotStore, StoreConfig};

/// Frame header: payload length and CRC32, both little-endian u32.
const FRAME_HEADER_LEN: usize = 8;

/// A durable snapshot store backed by an append-only log file.
#[derive(Debug)]
pub struct FileSnapshotStore {
    /// Path of the snapshot log.
    path: PathBuf,
    /// Store configuration.
    config: StoreConfig,
    /// Append handle for batch frames.
    file: Mutex<File>,
    /// In-memory index replayed from the log.
    index: RwLock<SnapshotIndex>,
}

impl FileSnapshotStore {
    /// Open or create the snapshot log at `path`, replaying any existing
    /// frames. Open failure is fatal to the caller's bootstrap; a corrupt
    /// tail frame is dropped with a warning.
    pub fn open<P: AsRef<Path>>(path: P, config: StoreConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    VoterRollError::storage(format!("failed to create store directory: {e}"))
                })?;
            }
        }

        let mut index = SnapshotIndex::new();
        match File::open(&path) {
            Ok(file) => replay(&mut BufReader::new(file), &mut index),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(VoterRollError::storage(format!(
                    "failed to open snapshot log {}: {e}",
                    path.display()
                )));
            }
        }

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|e| {
                VoterRollError::storage(format!(
                    "failed to open snapshot log {} for append: {e}",
                    path.display()
                ))
            })?;

        debug!(records = index.len(), path = %path.display(), "opened snapshot log");

        Ok(FileSnapshotStore {
            path,
            config,
            file: Mutex::new(file),
            index: RwLock::new(index),
        })
    }

    /// Path of the underlying snapshot log.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn clear(&self) -> Result<()> {
        let file = self.file.lock();
        file.set_len(0)
            .map_err(|e| VoterRollError::storage(format!("failed to truncate snapshot log: {e}")))?;
        drop(file);

        self.index.write().clear();
        Ok(())
    }

    fn add_batch(&self, records: &[VoterRecord]) -> Result<()> {
        // Identity-less records are not persisted; the index upsert warns
        // about them so replayed state matches live state.
        let persistable: Vec<&VoterRecord> = records
            .iter()
            .filter(|r| r.identity_key().is_some())
            .collect();

        let payload = bincode::serialize(&persistable)
            .map_err(|e| VoterRollError::storage(format!("failed to encode batch: {e}")))?;

        let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
        frame.write_u32::<LittleEndian>(payload.len() as u32)?;
        frame.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
        frame.extend_from_slice(&payload);

        let mut file = self.file.lock();
        file.write_all(&frame)
            .map_err(|e| VoterRollError::storage(format!("failed to append batch frame: {e}")))?;
        if self.config.sync_writes {
            file.sync_all()
                .map_err(|e| VoterRollError::storage(format!("failed to sync snapshot log: {e}")))?;
        }
        drop(file);

        let mut index = self.index.write();
        for record in records {
            index.upsert(record);
        }
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.index.read().len())
    }

    fn get_page(&self, page_number: usize, page_size: usize) -> Result<Vec<VoterRecord>> {
        Ok(self.index.read().page(page_number, page_size))
    }
}

/// Replay log frames into the index. Malformed or truncated frames end the
/// replay with a warning; everything before them is kept.
fn replay<R: Read>(reader: &mut R, index: &mut SnapshotIndex) {
    loop {
        let len = match reader.read_u32::<LittleEndian>() {
            Ok(len) => len as usize,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => {
                warn!(error = %e, "snapshot log read failed; dropping remainder");
                break;
            }
        };

        let crc = match reader.read_u32::<LittleEndian>() {
            Ok(crc) => crc,
            Err(_) => {
                warn!("truncated frame header in snapshot log; dropping tail");
                break;
            }
        };

        let mut payload = vec![0u8; len];
        if reader.read_exact(&mut payload).is_err() {
            warn!("truncated frame payload in snapshot log; dropping tail");
            break;
        }

        if crc32fast::hash(&payload) != crc {
            warn!("checksum mismatch in snapshot log; dropping tail");
            break;
        }

        let batch: Vec<VoterRecord> = match bincode::deserialize(&payload) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "undecodable frame in snapshot log; dropping tail");
                break;
            }
        };

        for record in &batch {
            index.upsert(record);
        }
    }
}
