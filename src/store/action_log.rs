use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use super::documents::{ActionEntry, ActionPayload};

/// Background writer that appends log entries to a JSON-lines file.
///
/// Entries go over a channel to a dedicated thread so appends never block on
/// disk. `close()` drops the sender and joins the thread, flushing everything.
#[derive(Clone, Debug)]
pub struct FileWriter {
    // Optional so close() can take the sender and drop it.
    sender: Arc<Mutex<Option<Sender<ActionEntry>>>>,
    handle: Arc<Mutex<Option<thread::JoinHandle<()>>>>,
}

impl FileWriter {
    pub fn new(path: PathBuf) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel::<ActionEntry>();
        let handle = thread::spawn(move || {
            let file = match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(f) => f,
                Err(e) => {
                    tracing::error!("action log writer: failed to open {:?}: {}", path, e);
                    return;
                }
            };
            let mut writer = BufWriter::new(file);
            for entry in rx {
                match serde_json::to_vec(&entry) {
                    Ok(mut bytes) => {
                        bytes.push(b'\n');
                        if let Err(e) = writer.write_all(&bytes) {
                            tracing::error!("action log writer: write failed: {}", e);
                        }
                        if let Err(e) = writer.flush() {
                            tracing::error!("action log writer: flush failed: {}", e);
                        }
                    }
                    Err(e) => tracing::error!("action log writer: serialize failed: {}", e),
                }
            }
            let _ = writer.flush();
        });

        Ok(FileWriter {
            sender: Arc::new(Mutex::new(Some(tx))),
            handle: Arc::new(Mutex::new(Some(handle))),
        })
    }

    pub fn send(&self, entry: ActionEntry) {
        // Best-effort; a closed receiver just drops the entry.
        let guard = match self.sender.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        if let Some(tx) = &*guard {
            let _ = tx.send(entry);
        }
    }

    /// Drop the sender and join the writer thread so pending writes land.
    /// Idempotent.
    pub fn close(&self) {
        {
            let mut guard = match self.sender.lock() {
                Ok(g) => g,
                Err(e) => e.into_inner(),
            };
            *guard = None;
        }
        let handle_opt = {
            let mut h = match self.handle.lock() {
                Ok(g) => g,
                Err(e) => e.into_inner(),
            };
            h.take()
        };
        if let Some(h) = handle_opt {
            let _ = h.join();
        }
    }
}

/// Append-only log of player-initiated actions with monotonic sequence numbers.
#[derive(Debug, Default)]
pub struct ActionLog {
    entries: Mutex<Vec<ActionEntry>>,
    seq: AtomicU64,
    writer: Mutex<Option<FileWriter>>,
}

impl ActionLog {
    pub fn new() -> Self {
        ActionLog {
            entries: Mutex::new(Vec::new()),
            seq: AtomicU64::new(0),
            writer: Mutex::new(None),
        }
    }

    pub fn set_writer(&self, writer: Option<FileWriter>) {
        let mut guard = match self.writer.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        *guard = writer;
    }

    /// Load an existing JSON-lines log. Blank lines are skipped; the sequence
    /// counter resumes after the highest seq seen.
    pub fn load_from_file(path: &str) -> Result<ActionLog, String> {
        let file = File::open(path).map_err(|e| e.to_string())?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        let mut max_seq = 0u64;
        for line in reader.lines() {
            let line = line.map_err(|e| e.to_string())?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: ActionEntry = serde_json::from_str(&line).map_err(|e| e.to_string())?;
            if entry.seq > max_seq {
                max_seq = entry.seq;
            }
            entries.push(entry);
        }
        let log = ActionLog::new();
        {
            let mut guard = match log.entries.lock() {
                Ok(g) => g,
                Err(e) => e.into_inner(),
            };
            *guard = entries;
        }
        log.seq.store(max_seq, Ordering::SeqCst);
        Ok(log)
    }

    /// Append an action, assigning the next sequence number. The entry lands
    /// in memory synchronously and is forwarded to the file writer if one is
    /// attached.
    pub fn append(
        &self,
        action_type: &str,
        payload: ActionPayload,
        actor: Option<u64>,
    ) -> ActionEntry {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let timestamp = match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
            Ok(dur) => format!("{}", dur.as_millis()),
            Err(_) => "0".to_string(),
        };
        let entry = ActionEntry {
            seq,
            action_type: action_type.to_string(),
            payload,
            timestamp,
            actor: actor.map(|id| id.to_string()),
        };
        {
            let mut guard = match self.entries.lock() {
                Ok(g) => g,
                Err(e) => e.into_inner(),
            };
            guard.push(entry.clone());
        }
        let writer = match self.writer.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        if let Some(w) = &*writer {
            w.send(entry.clone());
        }
        entry
    }

    /// Cloned snapshot of all entries, for replay and inspection.
    pub fn entries(&self) -> Vec<ActionEntry> {
        match self.entries.lock() {
            Ok(g) => g.clone(),
            Err(e) => e.into_inner().clone(),
        }
    }

    pub fn current_seq(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }

    /// Flush and close the attached writer, if any.
    pub fn shutdown(&self) {
        let writer = match self.writer.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        if let Some(w) = &*writer {
            w.close();
        }
    }
}
