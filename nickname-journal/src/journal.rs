use chrono::Utc;
use log::debug;
use nickname_core::{RegistryConfig, RegistryError, RegistryEvent};
use nickname_registry::NicknameRegistry;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A committed registry event together with its log position
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitEntry {
    /// The event that was committed
    pub event: RegistryEvent,

    /// Position of this entry in the log, starting at zero
    pub sequence: u64,

    /// Milliseconds since the Unix epoch at commit time
    pub timestamp: i64,
}

/// Append-only log of committed registry events
///
/// The hosting environment durably records every successful operation here
/// before acknowledging it. Entries are totally ordered by sequence
/// number; replaying them in order rebuilds the registry state.
pub trait RegistryCommitLog {
    /// Initialize the commit log
    ///
    /// # Parameters
    /// * `path` - The file path for the commit log
    ///
    /// # Returns
    /// Ok(()) if successful, Err otherwise
    fn init(&self, path: &Path) -> Result<(), RegistryError>;

    /// Append a committed event to the log
    ///
    /// # Parameters
    /// * `event` - The event produced by a successful registry operation
    ///
    /// # Returns
    /// The entry as written, including its assigned sequence number
    fn record(&self, event: &RegistryEvent) -> Result<CommitEntry, RegistryError>;

    /// Get an iterator over all entries, in commit order
    fn iterate_entries(&self)
        -> Box<dyn Iterator<Item = Result<CommitEntry, RegistryError>> + '_>;
}

/// A basic file-based commit log implementation
///
/// Entries are length-prefixed bincode records appended to a single file.
pub struct FileCommitLog {
    /// Path to the log file
    path: Arc<Mutex<PathBuf>>,

    /// File handle for writing
    file: Arc<Mutex<Option<BufWriter<File>>>>,

    /// Sequence number for the next entry
    next_sequence: Arc<Mutex<u64>>,
}

impl FileCommitLog {
    /// Create a new file-based commit log
    pub fn new() -> Self {
        Self {
            path: Arc::new(Mutex::new(PathBuf::new())),
            file: Arc::new(Mutex::new(None)),
            next_sequence: Arc::new(Mutex::new(0)),
        }
    }
}

impl Default for FileCommitLog {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryCommitLog for FileCommitLog {
    fn init(&self, path: &Path) -> Result<(), RegistryError> {
        // Count any entries already present so sequence numbers continue
        // across reopens
        let existing = match File::open(path) {
            Ok(file) => CommitEntryIterator {
                reader: BufReader::new(file),
            }
            .map_while(|entry| entry.ok())
            .count() as u64,
            Err(_) => 0,
        };

        let mut file_guard = self
            .file
            .lock()
            .map_err(|e| RegistryError::Journal(format!("Failed to acquire lock: {}", e)))?;

        // Create or open the log file
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)
            .map_err(|e| RegistryError::Journal(format!("Failed to open log file: {}", e)))?;

        *file_guard = Some(BufWriter::new(file));

        let mut path_guard = self
            .path
            .lock()
            .map_err(|e| RegistryError::Journal(format!("Failed to acquire path lock: {}", e)))?;
        *path_guard = path.to_path_buf();

        let mut seq_guard = self
            .next_sequence
            .lock()
            .map_err(|e| RegistryError::Journal(format!("Failed to acquire sequence lock: {}", e)))?;
        *seq_guard = existing;

        debug!("commit log opened at {:?}, {} entries", path, existing);

        Ok(())
    }

    fn record(&self, event: &RegistryEvent) -> Result<CommitEntry, RegistryError> {
        let mut file_guard = self
            .file
            .lock()
            .map_err(|e| RegistryError::Journal(format!("Failed to acquire lock: {}", e)))?;

        let file = file_guard
            .as_mut()
            .ok_or_else(|| RegistryError::Journal("log has not been initialized".to_string()))?;

        let mut seq_guard = self
            .next_sequence
            .lock()
            .map_err(|e| RegistryError::Journal(format!("Failed to acquire sequence lock: {}", e)))?;

        let entry = CommitEntry {
            event: event.clone(),
            sequence: *seq_guard,
            timestamp: Utc::now().timestamp_millis(),
        };

        // Serialize the entry
        let serialized = bincode::serialize(&entry)?;

        // Write the entry length and data
        let entry_len = serialized.len() as u64;
        file.write_all(&entry_len.to_le_bytes())?;
        file.write_all(&serialized)?;
        file.flush()?;

        *seq_guard += 1;

        Ok(entry)
    }

    fn iterate_entries(
        &self,
    ) -> Box<dyn Iterator<Item = Result<CommitEntry, RegistryError>> + '_> {
        // Get the path
        let path_guard = match self.path.lock() {
            Ok(guard) => guard,
            Err(_) => return Box::new(std::iter::empty()),
        };
        let path = path_guard.clone();
        drop(path_guard);

        // Create a new file reader
        match File::open(&path) {
            Ok(file) => Box::new(CommitEntryIterator {
                reader: BufReader::new(file),
            }),
            Err(_) => {
                // Return an empty iterator if we can't open the file
                Box::new(std::iter::empty::<Result<CommitEntry, RegistryError>>())
            }
        }
    }
}

/// Iterator over commit log entries
struct CommitEntryIterator {
    reader: BufReader<File>,
}

impl Iterator for CommitEntryIterator {
    type Item = Result<CommitEntry, RegistryError>;

    fn next(&mut self) -> Option<Self::Item> {
        // Read the entry length
        let mut len_buf = [0u8; 8];
        match self.reader.read_exact(&mut len_buf) {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                // End of file
                return None;
            }
            Err(e) => {
                return Some(Err(RegistryError::from(e)));
            }
        }

        let entry_len = u64::from_le_bytes(len_buf);

        // Read the entry data
        let mut entry_data = vec![0u8; entry_len as usize];
        if let Err(e) = self.reader.read_exact(&mut entry_data) {
            return Some(Err(RegistryError::from(e)));
        }

        // Deserialize the entry
        match bincode::deserialize(&entry_data) {
            Ok(entry) => Some(Ok(entry)),
            Err(e) => Some(Err(RegistryError::from(e))),
        }
    }
}

/// Rebuild a registry by replaying a commit log from the start
///
/// The configuration must match the one the logged registry was created
/// with; events are re-applied without authorization or payment checks
/// since they were validated when first committed.
pub fn restore(
    log: &dyn RegistryCommitLog,
    config: RegistryConfig,
) -> Result<NicknameRegistry, RegistryError> {
    let mut registry = NicknameRegistry::new(config);
    for entry in log.iterate_entries() {
        let entry = entry?;
        registry.apply(&entry.event);
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nickname_core::AccountId;
    use nickname_registry::MockLedger;
    use tempfile::tempdir;

    fn admin() -> AccountId {
        AccountId::derive(b"admin")
    }

    fn config() -> RegistryConfig {
        RegistryConfig::new(admin())
    }

    #[test]
    fn test_record_and_iterate() {
        let temp_dir = tempdir().unwrap();
        let log_path = temp_dir.path().join("registry.log");

        let log = FileCommitLog::new();
        log.init(&log_path).unwrap();

        let mut registry = NicknameRegistry::new(config());
        let (_, minted) = registry.mint("non_fungible_user", &admin(), 0).unwrap();
        let (id, second) = registry.mint("alice", &admin(), 0).unwrap();
        let burned = registry.burn(&id, &admin()).unwrap();

        log.record(&minted).unwrap();
        log.record(&second).unwrap();
        log.record(&burned).unwrap();

        let entries: Vec<_> = log
            .iterate_entries()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].sequence, 0);
        assert_eq!(entries[1].sequence, 1);
        assert_eq!(entries[2].sequence, 2);
        assert_eq!(entries[0].event, minted);
        assert_eq!(entries[2].event, burned);
    }

    #[test]
    fn test_record_without_init_fails() {
        let log = FileCommitLog::new();
        let event = RegistryEvent::BaseUriChanged {
            uri: "http://x/".to_string(),
        };

        let err = log.record(&event).unwrap_err();
        assert!(matches!(err, RegistryError::Journal(_)));
    }

    #[test]
    fn test_iterate_before_init_is_empty() {
        let log = FileCommitLog::new();
        assert_eq!(log.iterate_entries().count(), 0);
    }

    #[test]
    fn test_sequence_continues_after_reopen() {
        let temp_dir = tempdir().unwrap();
        let log_path = temp_dir.path().join("registry.log");

        let log = FileCommitLog::new();
        log.init(&log_path).unwrap();

        let event = RegistryEvent::BaseUriChanged {
            uri: "http://x/".to_string(),
        };
        log.record(&event).unwrap();
        log.record(&event).unwrap();
        drop(log);

        let reopened = FileCommitLog::new();
        reopened.init(&log_path).unwrap();
        let entry = reopened.record(&event).unwrap();
        assert_eq!(entry.sequence, 2);

        let entries: Vec<_> = reopened
            .iterate_entries()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_restore_rebuilds_registry() {
        let temp_dir = tempdir().unwrap();
        let log_path = temp_dir.path().join("registry.log");

        let log = FileCommitLog::new();
        log.init(&log_path).unwrap();

        let mut live = NicknameRegistry::new(config());
        let minter = AccountId::derive(b"addr1");
        let receiver = AccountId::derive(b"addr2");
        let cost = live.config().mint_price;
        let mut ledger = MockLedger::new();

        let (_, event) = live.mint("alice", &admin(), 0).unwrap();
        log.record(&event).unwrap();

        let (id, event) = live.mint("non_fungible_user", &minter, cost).unwrap();
        log.record(&event).unwrap();

        let event = live.transfer(&id, &receiver, &minter).unwrap();
        log.record(&event).unwrap();

        let event = live.protect_from_fire(&id, &admin()).unwrap();
        log.record(&event).unwrap();

        let event = live.set_base_uri("http://localhost:3000/tokens/", &admin()).unwrap();
        log.record(&event).unwrap();

        let (_, event) = live.withdraw(&admin(), &mut ledger).unwrap();
        log.record(&event).unwrap();

        let restored = restore(&log, config()).unwrap();
        assert_eq!(restored, live);

        // The rebuilt registry keeps enforcing the same invariants
        let mut restored = restored;
        let err = restored.burn_by_voted(&id, &admin()).unwrap_err();
        assert!(matches!(err, RegistryError::Protected(_)));
    }
}
