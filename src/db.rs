use crate::types::HistoryEntry;
use log::{debug, error, warn};
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::path::Path;

/// Most entries the history keeps; older ones are evicted.
pub const HISTORY_CAPACITY: usize = 10;

const HISTORY_KEY: &str = "numberPriceHistory";

fn create_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (key TEXT NOT NULL PRIMARY KEY, value TEXT NOT NULL) \
         WITHOUT ROWID",
        [],
    )?;
    Ok(())
}

/// Opens the history database at `path`, falling back to an in-memory
/// database if the file can't be used.
pub fn open(path: &Path) -> Result<Connection> {
    match Connection::open(path).and_then(|conn| create_table(&conn).map(|_| conn)) {
        Ok(conn) => Ok(conn),
        Err(e) => {
            error!(
                "Unable to open history db at {:?}, history will not be kept: {:?}",
                path, e
            );
            let conn = Connection::open_in_memory()?;
            create_table(&conn)?;
            Ok(conn)
        }
    }
}

/// Reads the persisted log. Missing or corrupt state reads as empty.
fn load(conn: &Connection) -> Vec<HistoryEntry> {
    let json = match load_impl(conn) {
        Ok(Some(json)) => json,
        Ok(None) => return Vec::new(),
        Err(e) => {
            error!("Error reading history: {:?}", e);
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<HistoryEntry>>(&json) {
        Ok(mut log) => {
            log.truncate(HISTORY_CAPACITY);
            debug!("Loaded {} history entries", log.len());
            log
        }
        Err(e) => {
            warn!("Discarding unreadable history: {}", e);
            Vec::new()
        }
    }
}

fn load_impl(conn: &Connection) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM kv WHERE key = ?1",
        params![HISTORY_KEY],
        |row| row.get(0),
    )
    .optional()
}

fn persist(conn: &Connection, log: &[HistoryEntry]) {
    let json = match serde_json::to_string(log) {
        Ok(json) => json,
        Err(e) => {
            error!("Unable to serialize history: {:?}", e);
            return;
        }
    };
    if let Err(e) = conn.execute(
        "INSERT OR REPLACE INTO kv(key, value) VALUES (?1, ?2)",
        params![HISTORY_KEY, json],
    ) {
        error!("Unable to save history: {:?}", e);
    }
}

/// Bounded, most-recent-first log of successful predictions.
///
/// The log is read from the database on first access and written back after
/// every change. Storage errors are logged and never returned.
pub struct HistoryStore {
    conn: Connection,
    log: Option<Vec<HistoryEntry>>,
}

impl HistoryStore {
    pub fn new(conn: Connection) -> Self {
        if let Err(e) = create_table(&conn) {
            error!("Unable to create history table: {:?}", e);
        }
        HistoryStore { conn, log: None }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(HistoryStore::new(open(path)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(HistoryStore::new(Connection::open_in_memory()?))
    }

    pub fn all(&mut self) -> &[HistoryEntry] {
        let conn = &self.conn;
        self.log.get_or_insert_with(|| load(conn))
    }

    pub fn get(&mut self, index: usize) -> Option<&HistoryEntry> {
        self.all().get(index)
    }

    pub fn len(&mut self) -> usize {
        self.all().len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.all().is_empty()
    }

    /// Prepends `entry`, evicting the oldest entry beyond capacity.
    pub fn record(&mut self, entry: HistoryEntry) {
        let conn = &self.conn;
        let log = self.log.get_or_insert_with(|| load(conn));
        log.insert(0, entry);
        log.truncate(HISTORY_CAPACITY);
        persist(conn, log);
    }

    pub fn clear(&mut self) {
        self.log = Some(Vec::new());
        if let Err(e) = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", params![HISTORY_KEY])
        {
            error!("Unable to clear history: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(i: u64) -> HistoryEntry {
        HistoryEntry {
            number: format!("А{:03}ВС77", i),
            price: 100_000 + i,
            min: 80_000,
            max: 120_000,
            confidence: 0.7,
            timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap(),
        }
    }

    #[test]
    fn starts_empty() {
        let mut store = HistoryStore::in_memory().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn records_most_recent_first() {
        let mut store = HistoryStore::in_memory().unwrap();
        store.record(entry(1));
        store.record(entry(2));
        let numbers: Vec<_> = store.all().iter().map(|e| e.price).collect();
        assert_eq!(numbers, vec![100_002, 100_001]);
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut store = HistoryStore::in_memory().unwrap();
        for i in 1..=11 {
            store.record(entry(i));
        }
        let log = store.all();
        assert_eq!(log.len(), HISTORY_CAPACITY);
        let expected: Vec<_> = (2..=11).rev().map(entry).collect();
        assert_eq!(log, &expected[..]);
        assert!(!log.contains(&entry(1)));
    }

    #[test]
    fn clear_empties_log_and_storage() {
        let mut store = HistoryStore::in_memory().unwrap();
        store.record(entry(1));
        store.clear();
        assert!(store.all().is_empty());
        assert_eq!(load_impl(&store.conn).unwrap(), None);
    }

    #[test]
    fn corrupt_state_reads_as_empty() {
        let conn = Connection::open_in_memory().unwrap();
        create_table(&conn).unwrap();
        conn.execute(
            "INSERT INTO kv(key, value) VALUES (?1, ?2)",
            params![HISTORY_KEY, "[{\"number\": 5"],
        )
        .unwrap();
        let mut store = HistoryStore::new(conn);
        assert!(store.all().is_empty());

        store.record(entry(3));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn oversized_state_is_trimmed_on_load() {
        let conn = Connection::open_in_memory().unwrap();
        create_table(&conn).unwrap();
        let log: Vec<_> = (0..15).map(entry).collect();
        persist(&conn, &log);
        let mut store = HistoryStore::new(conn);
        assert_eq!(store.len(), HISTORY_CAPACITY);
        assert_eq!(store.get(0), Some(&entry(0)));
    }

    #[test]
    fn history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");
        {
            let mut store = HistoryStore::open(&path).unwrap();
            store.record(entry(1));
            store.record(entry(2));
        }
        let mut store = HistoryStore::open(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0), Some(&entry(2)));
        assert_eq!(store.get(2), None);
    }

    #[test]
    fn unusable_path_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("history.db");
        let mut store = HistoryStore::open(&path).unwrap();
        store.record(entry(1));
        assert_eq!(store.len(), 1);
    }
}
