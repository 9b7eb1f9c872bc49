use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::engine::navigation::NavigationState;
use crate::engine::progress::Progress;
use crate::store::schema::SessionData;

const PROGRESS_FILE: &str = "progress.json";
const SESSION_FILE: &str = "session.json";

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(Self::default_dir())
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tablas")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Missing files give defaults silently; unreadable or unparseable
    /// files give defaults with a warning.
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if !path.exists() {
            return T::default();
        }
        let parsed = fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|content| serde_json::from_str::<T>(&content).map_err(anyhow::Error::from));
        match parsed {
            Ok(data) => data,
            Err(e) => {
                warn!(file = name, "unreadable saved state, using defaults: {e}");
                T::default()
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn load_progress(&self) -> Progress {
        let progress: Progress = self.load(PROGRESS_FILE);
        if progress.is_consistent() {
            progress
        } else {
            warn!(?progress, "saved progress breaks unlock order, repairing");
            progress.normalized()
        }
    }

    pub fn save_progress(&self, progress: &Progress) -> Result<()> {
        self.save(PROGRESS_FILE, progress)
    }

    pub fn load_session(&self) -> SessionData {
        self.load(SESSION_FILE)
    }

    pub fn save_session(&self, nav: &NavigationState) -> Result<()> {
        self.save(SESSION_FILE, &SessionData::from_nav(nav))
    }

    /// Navigation state to start with, given what was saved last time.
    pub fn restore_navigation(&self, progress: &Progress) -> NavigationState {
        let session = self.load_session();
        NavigationState::restore(
            session.last_view.as_deref(),
            session.last_table.as_deref(),
            progress,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::navigation::View;
    use crate::engine::progress::apply_quiz_result;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_fresh_store_gives_defaults() {
        let (_dir, store) = make_test_store();
        assert_eq!(store.load_progress(), Progress::default());
        assert_eq!(store.load_session(), SessionData::default());
        assert_eq!(
            store.restore_navigation(&Progress::default()),
            NavigationState::default()
        );
    }

    #[test]
    fn test_progress_survives_restart() {
        let (dir, store) = make_test_store();
        let progress = apply_quiz_result(&Progress::default(), 1, true);
        store.save_progress(&progress).unwrap();

        let reopened = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.load_progress(), progress);
    }

    #[test]
    fn test_progress_file_format() {
        let (_dir, store) = make_test_store();
        store
            .save_progress(&apply_quiz_result(&Progress::default(), 1, true))
            .unwrap();
        let raw = fs::read_to_string(store.file_path(PROGRESS_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["unlockedTables"], serde_json::json!([1, 2]));
        assert_eq!(value["masteredTables"], serde_json::json!([1]));
        assert_eq!(value["stars"], 20);
    }

    #[test]
    fn test_corrupt_files_fall_back_to_defaults() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(PROGRESS_FILE), "{not json").unwrap();
        fs::write(store.file_path(SESSION_FILE), "[]").unwrap();
        assert_eq!(store.load_progress(), Progress::default());
        assert_eq!(store.load_session(), SessionData::default());
    }

    #[test]
    fn test_inconsistent_progress_is_repaired() {
        let (_dir, store) = make_test_store();
        fs::write(
            store.file_path(PROGRESS_FILE),
            r#"{"unlockedTables":[1,2,3,9],"masteredTables":[1,2,5],"stars":70}"#,
        )
        .unwrap();
        let progress = store.load_progress();
        assert!(progress.is_consistent());
        assert_eq!(progress.frontier(), 3);
        assert_eq!(progress.stars, 70);
    }

    #[test]
    fn test_session_round_trip_and_restore_policy() {
        let (_dir, store) = make_test_store();
        let progress = apply_quiz_result(&Progress::default(), 1, true);

        let learn = NavigationState {
            view: View::Learn,
            selected_table: 2,
        };
        store.save_session(&learn).unwrap();
        assert_eq!(store.restore_navigation(&progress), learn);

        let quiz = NavigationState {
            view: View::Quiz,
            selected_table: 2,
        };
        store.save_session(&quiz).unwrap();
        let restored = store.restore_navigation(&progress);
        assert_eq!(restored.view, View::Map);
        assert_eq!(restored.selected_table, 2);
    }

    #[test]
    fn test_last_table_stored_as_string() {
        let (_dir, store) = make_test_store();
        store.save_session(&NavigationState::default()).unwrap();
        let raw = fs::read_to_string(store.file_path(SESSION_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["lastView"], "map");
        assert_eq!(value["lastTable"], "1");
    }

    #[test]
    fn test_save_leaves_no_tmp_files() {
        let (dir, store) = make_test_store();
        store.save_progress(&Progress::default()).unwrap();
        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
    }
}
