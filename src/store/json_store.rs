use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;

use crate::store::schema::ProgressData;

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sweepr");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Load and deserialize progress. Returns None if the file exists but
    /// cannot be parsed (schema mismatch / corruption); the caller decides
    /// whether to reset.
    pub fn load_progress(&self) -> Option<ProgressData> {
        let path = self.file_path("progress.json");
        if path.exists() {
            let content = fs::read_to_string(&path).ok()?;
            serde_json::from_str(&content).ok()
        } else {
            // No file yet — fresh default, not a schema mismatch.
            Some(ProgressData::default())
        }
    }

    /// Atomic write: serialize to a temp file, fsync, rename over the target.
    pub fn save_progress(&self, data: &ProgressData) -> Result<()> {
        let path = self.file_path("progress.json");
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::MistakeKind;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_file_yields_fresh_default() {
        let (_dir, store) = make_test_store();
        let data = store.load_progress().unwrap();
        assert_eq!(data.progress.exp, 0);
        assert!(!data.needs_reset());
    }

    #[test]
    fn progress_round_trips() {
        let (_dir, store) = make_test_store();
        let mut data = ProgressData::default();
        data.progress.record_attempt("s1", false, MistakeKind::Trap, None);
        data.progress.enqueue_landfill("s1", Some(7));
        data.progress.award_success();
        store.save_progress(&data).unwrap();

        let loaded = store.load_progress().unwrap();
        assert_eq!(loaded.progress.exp, 10);
        assert_eq!(loaded.progress.combo, 1);
        assert_eq!(loaded.progress.history.len(), 1);
        assert_eq!(loaded.progress.history[0].mistake, Some(MistakeKind::Trap));
        assert_eq!(loaded.progress.landfill["s1"].wrong_code, Some(7));
    }

    #[test]
    fn corrupt_file_returns_none() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path("progress.json"), "not json").unwrap();
        assert!(store.load_progress().is_none());
    }

    #[test]
    fn stale_schema_version_flags_reset() {
        let (_dir, store) = make_test_store();
        let mut data = ProgressData::default();
        data.schema_version = 99;
        store.save_progress(&data).unwrap();
        let loaded = store.load_progress().unwrap();
        assert!(loaded.needs_reset());
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let (dir, store) = make_test_store();
        store.save_progress(&ProgressData::default()).unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
