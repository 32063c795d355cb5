use crate::models::{CacheRecord, ReadingSet};
use chrono::NaiveDateTime;
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::{debug, error};

const READING_SET_KEY: &str = "user_data.json";
const LAST_FETCHED_KEY: &str = "last_fetched_at";

/// Two keyed entries on disk: the reading set and the time it was fetched.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads the persisted record. Anything unreadable counts as a miss.
    pub async fn load(&self) -> Option<CacheRecord> {
        let set_bytes = read_key(&self.dir.join(READING_SET_KEY)).await?;
        let stamp_bytes = read_key(&self.dir.join(LAST_FETCHED_KEY)).await?;

        let reading_set: ReadingSet = match serde_json::from_slice(&set_bytes) {
            Ok(set) => set,
            Err(err) => {
                error!("failed to parse cached readings: {err}");
                return None;
            }
        };
        let stamp = String::from_utf8_lossy(&stamp_bytes);
        let last_fetched_at = match stamp.trim().parse::<NaiveDateTime>() {
            Ok(stamp) => stamp,
            Err(err) => {
                error!("failed to parse cache timestamp: {err}");
                return None;
            }
        };

        Some(CacheRecord {
            reading_set,
            last_fetched_at,
        })
    }

    pub async fn persist(&self, record: &CacheRecord) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let payload = serde_json::to_vec_pretty(&record.reading_set)?;
        fs::write(self.dir.join(READING_SET_KEY), payload).await?;
        let stamp = record.last_fetched_at.format("%Y-%m-%dT%H:%M:%S%.f").to_string();
        fs::write(self.dir.join(LAST_FETCHED_KEY), stamp).await?;
        Ok(())
    }

    pub async fn clear(&self) -> io::Result<()> {
        for key in [READING_SET_KEY, LAST_FETCHED_KEY] {
            match fs::remove_file(self.dir.join(key)).await {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

async fn read_key(path: &Path) -> Option<Vec<u8>> {
    match fs::read(path).await {
        Ok(bytes) => Some(bytes),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no cached entry");
            None
        }
        Err(err) => {
            error!("failed to read cache entry {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Emotion, Reading};
    use chrono::NaiveDate;

    fn unique_dir(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("mood_client_{tag}_{}_{}", std::process::id(), nanos));
        path
    }

    fn sample_record() -> CacheRecord {
        let mut reading_set = ReadingSet::default();
        reading_set.insert_newest(Reading {
            id: 4,
            emotion: Emotion::Neutral,
            location: None,
            datetime: "2024-08-18T17:06".into(),
            note: Some("lunch".into()),
        });
        CacheRecord {
            reading_set,
            last_fetched_at: NaiveDate::from_ymd_opt(2024, 8, 18)
                .unwrap()
                .and_hms_opt(17, 10, 0)
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn persisted_record_loads_back() {
        let store = CacheStore::new(unique_dir("roundtrip"));
        let record = sample_record();
        store.persist(&record).await.unwrap();
        assert_eq!(store.load().await, Some(record));
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn missing_entries_are_a_miss() {
        let store = CacheStore::new(unique_dir("missing"));
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn corrupt_json_is_a_miss() {
        let store = CacheStore::new(unique_dir("corrupt"));
        store.persist(&sample_record()).await.unwrap();
        fs::write(store.dir().join(READING_SET_KEY), b"{not json")
            .await
            .unwrap();
        assert_eq!(store.load().await, None);
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn clear_removes_both_keys() {
        let store = CacheStore::new(unique_dir("clear"));
        store.persist(&sample_record()).await.unwrap();
        store.clear().await.unwrap();
        assert!(!store.dir().join(READING_SET_KEY).exists());
        assert!(!store.dir().join(LAST_FETCHED_KEY).exists());
        store.clear().await.unwrap();
    }
}
