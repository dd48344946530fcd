//! JSON file store for rostr collections
//!
//! Four flat JSON files, loaded once and mirrored in memory. Every mutation
//! rewrites the whole backing file for its collection - no partial writes, no
//! locking. Backups are timestamped directory snapshots of the three data
//! files (settings are deliberately left out).

use crate::member::{self, FieldDef, Member, Settings, UNCATEGORIZED};
use crate::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const MEMBERS_FILE: &str = "members.json";
const SCHEMA_FILE: &str = "schema.json";
const CATEGORIES_FILE: &str = "categories.json";
const SETTINGS_FILE: &str = "settings.json";
const BACKUPS_DIR: &str = "backups";

/// Files included in a backup snapshot
const BACKUP_FILES: [&str; 3] = [MEMBERS_FILE, SCHEMA_FILE, CATEGORIES_FILE];

/// JSON-file-backed record store
///
/// Owns the four in-memory collections and is the only writer of their
/// backing files. Callers read through the accessors and mutate through the
/// methods, which persist synchronously.
pub struct Store {
    data_dir: PathBuf,
    members: Vec<Member>,
    schema: Vec<FieldDef>,
    categories: Vec<String>,
    settings: Settings,
}

impl Store {
    /// Open the store, creating the data directory and default files on
    /// first run. Idempotent - existing files are never overwritten.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        Self::init_files(&data_dir)?;

        let mut store = Self {
            data_dir,
            members: Vec::new(),
            schema: Vec::new(),
            categories: Vec::new(),
            settings: Settings::default(),
        };
        store.load_all();
        Ok(store)
    }

    fn init_files(dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        Self::ensure_file(&dir.join(MEMBERS_FILE), &Vec::<Member>::new())?;
        Self::ensure_file(&dir.join(SCHEMA_FILE), &member::starter_schema())?;
        Self::ensure_file(&dir.join(CATEGORIES_FILE), &vec!["General".to_string()])?;
        Self::ensure_file(&dir.join(SETTINGS_FILE), &Settings::default())?;
        Ok(())
    }

    fn ensure_file<T: Serialize>(path: &Path, default: &T) -> Result<()> {
        if !path.exists() {
            fs::write(path, serde_json::to_string_pretty(default)?)?;
        }
        Ok(())
    }

    /// Reload every collection from disk.
    ///
    /// A file that fails to read or parse is logged and replaced by that
    /// collection's default; the store keeps operating in a degraded state
    /// rather than failing startup.
    fn load_all(&mut self) {
        self.members = load_collection(&self.members_path());
        self.schema = load_collection(&self.schema_path());
        self.categories = load_collection(&self.categories_path());
        self.settings = load_collection(&self.settings_path());
    }

    fn persist<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn members_path(&self) -> PathBuf {
        self.data_dir.join(MEMBERS_FILE)
    }

    pub fn schema_path(&self) -> PathBuf {
        self.data_dir.join(SCHEMA_FILE)
    }

    pub fn categories_path(&self) -> PathBuf {
        self.data_dir.join(CATEGORIES_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    fn backups_dir(&self) -> PathBuf {
        self.data_dir.join(BACKUPS_DIR)
    }

    /// Current member collection, insertion order
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Upsert a member by id: replace in place when a member with the same
    /// id exists (position preserved), append otherwise. Persists the whole
    /// collection.
    pub fn save_member(&mut self, member: Member) -> Result<()> {
        match self.members.iter().position(|m| m.id == member.id) {
            Some(i) => self.members[i] = member,
            None => self.members.push(member),
        }
        self.persist(&self.members_path(), &self.members)
    }

    /// Upsert many members with a single persist at the end.
    ///
    /// Existing members keep their position; genuinely new ones are appended
    /// in input order. Members without an id are always appended.
    pub fn save_members_bulk(&mut self, new_members: Vec<Member>) -> Result<()> {
        for member in new_members {
            let existing = member
                .has_id()
                .then(|| self.members.iter().position(|m| m.id == member.id))
                .flatten();
            match existing {
                Some(i) => self.members[i] = member,
                None => self.members.push(member),
            }
        }
        self.persist(&self.members_path(), &self.members)
    }

    /// Remove every member with the given id and persist.
    ///
    /// Persists even when nothing matched; "not found" and "removed" are
    /// indistinguishable here by design of the original contract.
    pub fn delete_member(&mut self, id: &str) -> Result<()> {
        self.members.retain(|m| m.id != id);
        self.persist(&self.members_path(), &self.members)
    }

    /// Delete several members, one persist per id. Returns how many deletes
    /// succeeded; individual failures are tolerated.
    pub fn delete_members(&mut self, ids: &[String]) -> usize {
        ids.iter()
            .filter(|id| self.delete_member(id).is_ok())
            .count()
    }

    pub fn schema(&self) -> &[FieldDef] {
        &self.schema
    }

    pub fn set_schema(&mut self, schema: Vec<FieldDef>) -> Result<()> {
        self.schema = schema;
        self.persist(&self.schema_path(), &self.schema)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn set_categories(&mut self, categories: Vec<String>) -> Result<()> {
        self.categories = categories;
        self.persist(&self.categories_path(), &self.categories)
    }

    /// Remove a category and rewrite members that referenced it to
    /// "Uncategorized". Members are only persisted when at least one changed.
    pub fn delete_category(&mut self, name: &str) -> Result<()> {
        let Some(i) = self.categories.iter().position(|c| c == name) else {
            return Err(Error::CategoryNotFound(name.to_string()));
        };
        self.categories.remove(i);
        self.persist(&self.categories_path(), &self.categories)?;

        let mut changed = false;
        for member in &mut self.members {
            if member.category.as_deref() == Some(name) {
                member.category = Some(UNCATEGORIZED.to_string());
                changed = true;
            }
        }
        if changed {
            self.persist(&self.members_path(), &self.members)?;
        }
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) -> Result<()> {
        self.settings = settings;
        self.persist(&self.settings_path(), &self.settings)
    }

    /// Snapshot the three data files into backups/<timestamp>/ and return
    /// the timestamp id.
    ///
    /// Two backups within the same second share a directory and overwrite
    /// one another; acceptable at manual trigger cadence.
    pub fn create_backup(&self) -> Result<String> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let backup_dir = self.backups_dir().join(&timestamp);
        fs::create_dir_all(&backup_dir)?;

        for file in BACKUP_FILES {
            fs::copy(self.data_dir.join(file), backup_dir.join(file))?;
        }
        Ok(timestamp)
    }

    /// Existing backup ids, newest first. Fixed-width timestamps make the
    /// lexicographic sort chronological.
    pub fn list_backups(&self) -> Result<Vec<String>> {
        let backups_dir = self.backups_dir();
        if !backups_dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&backups_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                ids.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        ids.sort();
        ids.reverse();
        Ok(ids)
    }

    /// Copy a backup's files over the live ones and reload members, schema
    /// and categories from disk. Settings are untouched.
    pub fn restore_backup(&mut self, backup_id: &str) -> Result<()> {
        let backup_dir = self.backups_dir().join(backup_id);
        if !backup_dir.exists() {
            return Err(Error::BackupNotFound(backup_id.to_string()));
        }

        for file in BACKUP_FILES {
            fs::copy(backup_dir.join(file), self.data_dir.join(file))?;
        }

        self.members = load_collection(&self.members_path());
        self.schema = load_collection(&self.schema_path());
        self.categories = load_collection(&self.categories_path());
        Ok(())
    }

    /// Remove a backup directory tree
    pub fn delete_backup(&self, backup_id: &str) -> Result<()> {
        let backup_dir = self.backups_dir().join(backup_id);
        if !backup_dir.exists() {
            return Err(Error::BackupNotFound(backup_id.to_string()));
        }
        fs::remove_dir_all(&backup_dir)?;
        Ok(())
    }
}

fn load_collection<T: DeserializeOwned + Default>(path: &Path) -> T {
    let parsed = fs::read_to_string(path)
        .map_err(Error::from)
        .and_then(|content| Ok(serde_json::from_str(&content)?));
    match parsed {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load collection, using default");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn open_store(dir: &Path) -> Store {
        Store::open(dir).unwrap()
    }

    fn member(id: &str, name: &str) -> Member {
        let mut m = Member::new(id);
        m.set_field("name", json!(name));
        m
    }

    #[test]
    fn open_creates_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());

        assert!(store.members().is_empty());
        assert_eq!(store.schema().len(), 2);
        assert_eq!(store.schema()[0].id, "name");
        assert_eq!(store.categories(), ["General"]);
        assert_eq!(store.settings().theme, "dark");

        for file in [MEMBERS_FILE, SCHEMA_FILE, CATEGORIES_FILE, SETTINGS_FILE] {
            assert!(dir.path().join(file).exists());
        }
    }

    #[test]
    fn open_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = open_store(dir.path());
            store.save_member(member("a", "Ada")).unwrap();
        }
        let store = open_store(dir.path());
        assert_eq!(store.members().len(), 1);
        assert_eq!(store.members()[0].id, "a");
    }

    #[test]
    fn corrupt_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        open_store(dir.path());
        fs::write(dir.path().join(MEMBERS_FILE), "{not json").unwrap();

        let store = open_store(dir.path());
        assert!(store.members().is_empty());
        assert_eq!(store.settings().theme, "dark");
    }

    #[test]
    fn upsert_appends_new_and_replaces_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());

        store.save_member(member("a", "Ada")).unwrap();
        store.save_member(member("b", "Bob")).unwrap();
        assert_eq!(store.members().len(), 2);

        store.save_member(member("a", "Ada L.")).unwrap();
        assert_eq!(store.members().len(), 2);
        assert_eq!(store.members()[0].id, "a");
        assert_eq!(store.members()[0].field("name"), Some(&json!("Ada L.")));
    }

    #[test]
    fn bulk_upsert_preserves_positions_and_persists_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());
        store.save_member(member("a", "Ada")).unwrap();
        store.save_member(member("b", "Bob")).unwrap();

        store
            .save_members_bulk(vec![member("b", "Bobby"), member("c", "Cee")])
            .unwrap();

        let ids: Vec<_> = store.members().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(store.members()[1].field("name"), Some(&json!("Bobby")));

        // survives reload
        let store = open_store(dir.path());
        assert_eq!(store.members().len(), 3);
    }

    #[test]
    fn delete_nonexistent_member_is_ok_and_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());
        store.save_member(member("a", "Ada")).unwrap();

        store.delete_member("ghost").unwrap();
        assert_eq!(store.members().len(), 1);
    }

    #[test]
    fn delete_members_reports_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());
        store.save_member(member("a", "Ada")).unwrap();
        store.save_member(member("b", "Bob")).unwrap();

        let count = store.delete_members(&["a".to_string(), "ghost".to_string()]);
        // deleting an absent id still reports success
        assert_eq!(count, 2);
        assert_eq!(store.members().len(), 1);
    }

    #[test]
    fn delete_category_cascades_to_members() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());
        let mut m = member("a", "Ada");
        m.category = Some("General".to_string());
        store.save_member(m).unwrap();

        store.delete_category("General").unwrap();
        assert!(!store.categories().contains(&"General".to_string()));
        assert_eq!(
            store.members()[0].category.as_deref(),
            Some(UNCATEGORIZED)
        );

        // cascade was persisted
        let store = open_store(dir.path());
        assert_eq!(
            store.members()[0].category.as_deref(),
            Some(UNCATEGORIZED)
        );
    }

    #[test]
    fn delete_missing_category_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());
        assert!(matches!(
            store.delete_category("Nope"),
            Err(Error::CategoryNotFound(_))
        ));
    }

    #[test]
    fn backup_restore_round_trip_leaves_settings_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());
        store.save_member(member("a", "Ada")).unwrap();

        let backup_id = store.create_backup().unwrap();
        assert!(store.list_backups().unwrap().contains(&backup_id));

        let mut settings = store.settings().clone();
        settings.theme = "light".to_string();
        store.set_settings(settings).unwrap();
        store.delete_member("a").unwrap();
        store.save_member(member("z", "Zed")).unwrap();

        store.restore_backup(&backup_id).unwrap();
        let ids: Vec<_> = store.members().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["a"]);
        assert_eq!(store.settings().theme, "light");
    }

    #[test]
    fn restore_unknown_backup_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());
        assert!(matches!(
            store.restore_backup("19700101_000000"),
            Err(Error::BackupNotFound(_))
        ));
    }

    #[test]
    fn delete_backup_removes_it_from_listing() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());

        assert!(matches!(
            store.delete_backup("19700101_000000"),
            Err(Error::BackupNotFound(_))
        ));

        let backup_id = store.create_backup().unwrap();
        store.delete_backup(&backup_id).unwrap();
        assert!(!store.list_backups().unwrap().contains(&backup_id));
    }

    #[test]
    fn list_backups_sorted_descending() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        for id in ["20240101_000000", "20250101_000000", "20230101_000000"] {
            fs::create_dir_all(store.backups_dir().join(id)).unwrap();
        }
        assert_eq!(
            store.list_backups().unwrap(),
            ["20250101_000000", "20240101_000000", "20230101_000000"]
        );
    }

    #[test]
    fn settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(dir.path());
        let mut settings = Settings::default();
        settings.theme = "light".to_string();
        settings.extra.insert("sidebar".to_string(), json!(true));
        store.set_settings(settings.clone()).unwrap();

        let store = open_store(dir.path());
        assert_eq!(store.settings(), &settings);
    }
}
