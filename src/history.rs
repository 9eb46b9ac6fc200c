use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Key the history is stored under
pub const HISTORY_KEY: &str = "typingHistory";

/// A completed typing challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingSession {
    pub id: u64,
    pub language: String,
    pub wpm: f64,
    pub accuracy: f64,
    /// seconds
    pub time: f64,
    /// unix milliseconds
    pub timestamp: i64,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to persist history: {0}")]
    Io(#[from] io::Error),
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Minimal string key-value persistence
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// Stores each key as `<key>.json` in a directory
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Append-only log of completed sessions, saved on every mutation
pub struct HistoryStore {
    kv: Box<dyn KeyValueStore>,
    sessions: Vec<TypingSession>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("sessions", &self.sessions.len())
            .finish()
    }
}

impl HistoryStore {
    /// Read the persisted history. Missing or unreadable data starts empty.
    pub fn load(kv: Box<dyn KeyValueStore>) -> Self {
        let sessions = match kv.get(HISTORY_KEY) {
            Some(raw) => match serde_json::from_str::<Vec<TypingSession>>(&raw) {
                Ok(sessions) => sessions,
                Err(e) => {
                    warn!(error = %e, "stored history is malformed, starting empty");
                    vec![]
                }
            },
            None => vec![],
        };
        debug!(count = sessions.len(), "history loaded");

        Self { kv, sessions }
    }

    pub fn append(&mut self, mut session: TypingSession) -> Result<(), HistoryError> {
        if let Some(last) = self.sessions.last() {
            if session.id <= last.id {
                session.id = last.id + 1;
            }
        }
        self.sessions.push(session);
        self.save()
    }

    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.sessions.clear();
        self.save()
    }

    pub fn all(&self) -> &[TypingSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn save(&mut self) -> Result<(), HistoryError> {
        let data = serde_json::to_string(&self.sessions)?;
        self.kv.set(HISTORY_KEY, &data)?;
        Ok(())
    }
}

/// Write sessions as CSV with a header row
pub fn export_csv<P: AsRef<Path>>(sessions: &[TypingSession], path: P) -> Result<(), HistoryError> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for session in sessions {
        writer.serialize(session)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn session(id: u64, language: &str, timestamp: i64) -> TypingSession {
        TypingSession {
            id,
            language: language.to_string(),
            wpm: 42.0,
            accuracy: 97.5,
            time: 30.0,
            timestamp,
        }
    }

    #[test]
    fn test_load_empty_store() {
        let history = HistoryStore::load(Box::new(MemoryKeyValueStore::default()));
        assert!(history.is_empty());
    }

    #[test]
    fn test_append_keeps_order() {
        let mut history = HistoryStore::load(Box::new(MemoryKeyValueStore::default()));

        history.append(session(1, "Rust", 1)).unwrap();
        history.append(session(2, "Go", 2)).unwrap();
        history.append(session(3, "Python", 3)).unwrap();

        let languages: Vec<_> = history.all().iter().map(|s| s.language.as_str()).collect();
        assert_eq!(languages, ["Rust", "Go", "Python"]);
    }

    #[test]
    fn test_append_bumps_colliding_ids() {
        let mut history = HistoryStore::load(Box::new(MemoryKeyValueStore::default()));

        history.append(session(100, "Rust", 100)).unwrap();
        history.append(session(100, "Rust", 100)).unwrap();
        history.append(session(50, "Rust", 100)).unwrap();

        let ids: Vec<_> = history.all().iter().map(|s| s.id).collect();
        assert_eq!(ids, [100, 101, 102]);
    }

    #[test]
    fn test_history_survives_reload() {
        let dir = tempdir().unwrap();

        let mut history = HistoryStore::load(Box::new(FileKeyValueStore::new(dir.path())));
        history.append(session(1, "Rust", 10)).unwrap();
        history.append(session(2, "Java", 20)).unwrap();
        drop(history);

        let reloaded = HistoryStore::load(Box::new(FileKeyValueStore::new(dir.path())));
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.all()[1], session(2, "Java", 20));
    }

    #[test]
    fn test_clear_survives_reload() {
        let dir = tempdir().unwrap();

        let mut history = HistoryStore::load(Box::new(FileKeyValueStore::new(dir.path())));
        history.append(session(1, "Rust", 10)).unwrap();
        history.clear().unwrap();
        assert!(history.all().is_empty());
        drop(history);

        let reloaded = HistoryStore::load(Box::new(FileKeyValueStore::new(dir.path())));
        assert!(reloaded.all().is_empty());
    }

    #[test]
    fn test_malformed_history_starts_empty() {
        let mut kv = MemoryKeyValueStore::default();
        kv.set(HISTORY_KEY, "{not json").unwrap();

        let history = HistoryStore::load(Box::new(kv));
        assert!(history.is_empty());
    }

    #[test]
    fn test_reads_browser_shaped_records() {
        let mut kv = MemoryKeyValueStore::default();
        kv.set(
            HISTORY_KEY,
            r#"[{"id":1718000000000,"language":"Python","wpm":55.2,"accuracy":98.1,"time":41.7,"timestamp":1718000000000}]"#,
        )
        .unwrap();

        let history = HistoryStore::load(Box::new(kv));
        assert_eq!(history.len(), 1);
        assert_eq!(history.all()[0].language, "Python");
        assert_eq!(history.all()[0].timestamp, 1_718_000_000_000);
    }

    #[test]
    fn test_export_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("history.csv");

        export_csv(&[session(1, "Rust", 10), session(2, "Go", 20)], &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("id,language,wpm,accuracy,time,timestamp")
        );
        assert_eq!(lines.next(), Some("1,Rust,42.0,97.5,30.0,10"));
        assert_eq!(lines.next(), Some("2,Go,42.0,97.5,30.0,20"));
        assert_eq!(lines.next(), None);
    }
}
