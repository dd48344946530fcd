//! Application facade for rostr
//!
//! The single boundary the UI shell calls. Every mutating operation returns
//! an [`Envelope`]; read operations hand back the raw collection. Faults
//! never escape past this layer - store failures are logged and collapsed
//! into the operation's fixed failure message, dialog and file-system errors
//! surface their text verbatim.

use crate::id::generate_id;
use crate::member::{FieldDef, Member, Settings};
use crate::store::Store;
use crate::{Result, export};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

const IMAGES_DIR: &str = "images";

/// Save-dialog file type filter
pub struct FileFilter {
    pub description: &'static str,
    pub extension: &'static str,
}

pub const JSON_FILTER: FileFilter = FileFilter {
    description: "JSON",
    extension: "json",
};
pub const CSV_FILTER: FileFilter = FileFilter {
    description: "CSV",
    extension: "csv",
};
pub const PDF_FILTER: FileFilter = FileFilter {
    description: "PDF",
    extension: "pdf",
};

/// Save-path collaborator owned by the UI shell.
///
/// `Ok(None)` means the user cancelled the dialog.
pub trait DialogService {
    fn pick_save_path(&self, filter: &FileFilter, default_name: &str)
    -> Result<Option<PathBuf>>;
}

/// Uniform response shape returned by mutating facade operations
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub status: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl Envelope {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: Some(message.into()),
            member: None,
            path: None,
            filename: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: Some(message.into()),
            member: None,
            path: None,
            filename: None,
        }
    }

    /// Success envelope for a completed file export
    pub fn exported(path: PathBuf) -> Self {
        Self {
            status: "success",
            message: None,
            member: None,
            path: Some(path),
            filename: None,
        }
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.member = Some(member);
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Application facade: validates input, assigns identifiers, and translates
/// store outcomes into envelopes for the UI shell.
pub struct Api<D: DialogService> {
    store: Store,
    dialogs: D,
}

impl<D: DialogService> Api<D> {
    /// Wrap a store, triggering the automatic startup backup.
    ///
    /// A failed backup is logged and swallowed; startup must not fail
    /// because backup failed.
    pub fn new(store: Store, dialogs: D) -> Self {
        if let Err(e) = store.create_backup() {
            warn!(error = %e, "automatic startup backup failed");
        }
        Self { store, dialogs }
    }

    pub fn get_members(&self) -> &[Member] {
        self.store.members()
    }

    /// Upsert a member, assigning a fresh id when it lacks one. The saved
    /// member (possibly id-assigned) rides along in the success envelope.
    pub fn save_member(&mut self, mut member: Member) -> Envelope {
        member.ensure_id();
        match self.store.save_member(member.clone()) {
            Ok(()) => Envelope::success("Member saved successfully").with_member(member),
            Err(e) => {
                warn!(error = %e, "failed to save member");
                Envelope::error("Failed to save member")
            }
        }
    }

    pub fn delete_member(&mut self, member_id: &str) -> Envelope {
        match self.store.delete_member(member_id) {
            Ok(()) => Envelope::success("Member deleted successfully"),
            Err(e) => {
                warn!(error = %e, "failed to delete member");
                Envelope::error("Failed to delete member")
            }
        }
    }

    /// Delete several members; reports how many deletes succeeded
    pub fn delete_members(&mut self, member_ids: &[String]) -> Envelope {
        let count = self.store.delete_members(member_ids);
        Envelope::success(format!("Deleted {count} members"))
    }

    /// Bulk import from an already-parsed JSON payload.
    ///
    /// Rejects anything that is not an array of records, assigns missing
    /// ids, and reports the count of processed elements.
    pub fn import_members(&mut self, payload: Value) -> Envelope {
        let Value::Array(items) = payload else {
            return Envelope::error("Invalid data format");
        };

        let mut members = Vec::with_capacity(items.len());
        for item in items {
            let Ok(mut member) = serde_json::from_value::<Member>(item) else {
                return Envelope::error("Invalid data format");
            };
            member.ensure_id();
            members.push(member);
        }

        let count = members.len();
        match self.store.save_members_bulk(members) {
            Ok(()) => Envelope::success(format!("Imported {count} members")),
            Err(e) => {
                warn!(error = %e, "bulk import failed");
                Envelope::error("Import failed")
            }
        }
    }

    pub fn get_schema(&self) -> &[FieldDef] {
        self.store.schema()
    }

    pub fn save_schema(&mut self, schema: Vec<FieldDef>) -> Envelope {
        match self.store.set_schema(schema) {
            Ok(()) => Envelope::success("Schema updated successfully"),
            Err(e) => {
                warn!(error = %e, "failed to save schema");
                Envelope::error("Failed to update schema")
            }
        }
    }

    pub fn get_categories(&self) -> &[String] {
        self.store.categories()
    }

    pub fn save_categories(&mut self, categories: Vec<String>) -> Envelope {
        match self.store.set_categories(categories) {
            Ok(()) => Envelope::success("Categories updated successfully"),
            Err(e) => {
                warn!(error = %e, "failed to save categories");
                Envelope::error("Failed to update categories")
            }
        }
    }

    pub fn delete_category(&mut self, category: &str) -> Envelope {
        match self.store.delete_category(category) {
            Ok(()) => Envelope::success(format!("Category '{category}' deleted")),
            Err(e) => {
                warn!(error = %e, "failed to delete category");
                Envelope::error("Failed to delete category")
            }
        }
    }

    pub fn backup_data(&self) -> Envelope {
        match self.store.create_backup() {
            Ok(backup_id) => Envelope::success(format!("Backup created: {backup_id}")),
            Err(e) => {
                warn!(error = %e, "backup failed");
                Envelope::error("Backup failed")
            }
        }
    }

    pub fn get_backups(&self) -> Result<Vec<String>> {
        self.store.list_backups()
    }

    pub fn restore_backup(&mut self, backup_id: &str) -> Envelope {
        match self.store.restore_backup(backup_id) {
            Ok(()) => Envelope::success(format!("Restored backup {backup_id}")),
            Err(e) => {
                warn!(error = %e, "restore failed");
                Envelope::error("Restore failed")
            }
        }
    }

    pub fn delete_backup(&self, backup_id: &str) -> Envelope {
        match self.store.delete_backup(backup_id) {
            Ok(()) => Envelope::success(format!("Backup {backup_id} deleted")),
            Err(e) => {
                warn!(error = %e, "delete backup failed");
                Envelope::error("Delete failed")
            }
        }
    }

    pub fn get_settings(&self) -> &Settings {
        self.store.settings()
    }

    pub fn save_settings(&mut self, settings: Settings) -> Envelope {
        match self.store.set_settings(settings) {
            Ok(()) => Envelope::success("Settings saved"),
            Err(e) => {
                warn!(error = %e, "failed to save settings");
                Envelope::error("Failed to save settings")
            }
        }
    }

    /// Members as CSV text, columns per the fixed export policy
    pub fn export_csv(&self) -> Result<String> {
        export::to_csv(self.store.members(), self.store.schema())
    }

    /// Export all members to a JSON file picked via the dialog service
    pub fn export_json_file(&self) -> Envelope {
        if self.store.members().is_empty() {
            return Envelope::error("No members to export");
        }

        let path = match self.dialogs.pick_save_path(&JSON_FILTER, "members_export.json") {
            Ok(Some(path)) => path,
            Ok(None) => return Envelope::error("Cancelled"),
            Err(e) => return Envelope::error(e.to_string()),
        };

        let written = export::to_json(self.store.members())
            .and_then(|text| fs::write(&path, text).map_err(Into::into));
        match written {
            Ok(()) => Envelope::exported(path),
            Err(e) => Envelope::error(e.to_string()),
        }
    }

    /// Export all members to a CSV file picked via the dialog service
    pub fn export_csv_file(&self) -> Envelope {
        if self.store.members().is_empty() {
            return Envelope::error("No members to export");
        }

        let path = match self.dialogs.pick_save_path(&CSV_FILTER, "members_export.csv") {
            Ok(Some(path)) => path,
            Ok(None) => return Envelope::error("Cancelled"),
            Err(e) => return Envelope::error(e.to_string()),
        };

        let written = export::to_csv(self.store.members(), self.store.schema())
            .and_then(|text| fs::write(&path, text).map_err(Into::into));
        match written {
            Ok(()) => Envelope::exported(path),
            Err(e) => Envelope::error(e.to_string()),
        }
    }

    /// Export one record (already-parsed JSON object) to a file picked via
    /// the dialog service
    pub fn export_member_file(&self, member: &Value) -> Envelope {
        if !member.is_object() {
            return Envelope::error("Invalid member data");
        }

        let default_name = format!(
            "member_{}.json",
            member.get("id").and_then(Value::as_str).unwrap_or("member")
        );
        let path = match self.dialogs.pick_save_path(&JSON_FILTER, &default_name) {
            Ok(Some(path)) => path,
            Ok(None) => return Envelope::error("Cancelled"),
            Err(e) => return Envelope::error(e.to_string()),
        };

        let written = export::to_json_one(member)
            .and_then(|text| fs::write(&path, text).map_err(Into::into));
        match written {
            Ok(()) => Envelope::exported(path),
            Err(e) => Envelope::error(e.to_string()),
        }
    }

    /// Decode a base64 PDF payload and write it to a file picked via the
    /// dialog service
    pub fn save_pdf(&self, base64_data: &str) -> Envelope {
        if base64_data.is_empty() {
            return Envelope::error("No PDF data");
        }

        let path = match self.dialogs.pick_save_path(&PDF_FILTER, "members_report.pdf") {
            Ok(Some(path)) => path,
            Ok(None) => return Envelope::error("Cancelled"),
            Err(e) => return Envelope::error(e.to_string()),
        };

        let written = BASE64
            .decode(strip_data_uri(base64_data))
            .map_err(crate::Error::from)
            .and_then(|bytes| fs::write(&path, bytes).map_err(Into::into));
        match written {
            Ok(()) => Envelope::exported(path),
            Err(e) => Envelope::error(e.to_string()),
        }
    }

    /// Decode a base64 image payload into images/<uuid>.png under the data
    /// directory. Returns both the bare filename and the absolute path.
    pub fn save_image(&self, base64_data: &str) -> Envelope {
        match self.write_image(base64_data) {
            Ok((filename, path)) => Envelope::exported(path).with_filename(filename),
            Err(e) => Envelope::error(e.to_string()),
        }
    }

    fn write_image(&self, base64_data: &str) -> Result<(String, PathBuf)> {
        let images_dir = self.store.data_dir().join(IMAGES_DIR);
        fs::create_dir_all(&images_dir)?;

        let filename = format!("{}.png", generate_id());
        let path = images_dir.join(&filename);
        let bytes = BASE64.decode(strip_data_uri(base64_data))?;
        fs::write(&path, bytes)?;

        Ok((filename, std::path::absolute(&path)?))
    }
}

/// Drop an optional data-URI prefix ("data:image/png;base64,...") up to and
/// including the first comma
fn strip_data_uri(data: &str) -> &str {
    match data.split_once(',') {
        Some((_, rest)) => rest,
        None => data,
    }
}
