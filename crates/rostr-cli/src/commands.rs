//! CLI command implementations
//!
//! The CLI plays the UI-shell role: it calls facade operations and renders
//! envelopes. The GUI save dialog is stood in for by [`PathArgDialog`].

use anyhow::{Context, Result, bail};
use colored::Colorize;
use rostr_core::api::{Api, DialogService, FileFilter};
use rostr_core::{Envelope, Member, Store, id};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// CLI stand-in for the GUI save dialog: use `--out` when given, otherwise
/// the facade's suggested filename in the current directory. Never cancels.
pub struct PathArgDialog {
    out: Option<PathBuf>,
}

impl DialogService for PathArgDialog {
    fn pick_save_path(
        &self,
        _filter: &FileFilter,
        default_name: &str,
    ) -> rostr_core::Result<Option<PathBuf>> {
        Ok(Some(
            self.out
                .clone()
                .unwrap_or_else(|| PathBuf::from(default_name)),
        ))
    }
}

fn open_api(data_dir: &Path, out: Option<PathBuf>) -> Result<Api<PathArgDialog>> {
    let store = Store::open(data_dir)?;
    Ok(Api::new(store, PathArgDialog { out }))
}

/// Render a facade envelope. Error envelopes become process failures.
fn render(envelope: Envelope, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&envelope)?);
        return Ok(());
    }

    if !envelope.is_success() {
        bail!(
            "{}",
            envelope.message.unwrap_or_else(|| "operation failed".into())
        );
    }

    match (envelope.message, envelope.path) {
        (Some(message), _) => println!("{} {}", "✓".green(), message),
        (None, Some(path)) => println!("{} Wrote {}", "✓".green(), path.display()),
        (None, None) => println!("{} Done", "✓".green()),
    }
    Ok(())
}

fn find_member<'a>(api: &'a Api<PathArgDialog>, id: &str) -> Result<&'a Member> {
    api.get_members()
        .iter()
        .find(|m| m.id == id || m.short_id.as_deref() == Some(id))
        .with_context(|| format!("Member not found: {id}"))
}

pub fn list(data_dir: &Path, json: bool) -> Result<()> {
    let api = open_api(data_dir, None)?;
    let members = api.get_members();

    if json {
        println!("{}", serde_json::to_string(members)?);
        return Ok(());
    }

    if members.is_empty() {
        println!("No members");
        return Ok(());
    }

    // First schema field doubles as the display column
    let display_field = api.get_schema().first().map(|f| f.id.clone());
    for member in members {
        let short = member
            .short_id
            .clone()
            .unwrap_or_else(|| member.id.chars().take(8).collect());
        let label = display_field
            .as_deref()
            .map(|f| member.export_cell(f))
            .unwrap_or_default();
        let category = member.category.clone().unwrap_or_default();
        println!("{} {} {}", short.cyan(), label, category.dimmed());
    }
    Ok(())
}

pub fn show(data_dir: &Path, id: &str, json: bool) -> Result<()> {
    let api = open_api(data_dir, None)?;
    let member = find_member(&api, id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(member)?);
        return Ok(());
    }

    let short = member.short_id.as_deref().unwrap_or(&member.id);
    println!("{}", short.cyan().bold());
    println!("{:<16} {}", "Id:", member.id);
    println!(
        "{:<16} {}",
        "Category:",
        member.category.as_deref().unwrap_or("-")
    );
    for field in api.get_schema() {
        let label = format!("{}:", field.label);
        println!("{:<16} {}", label, member.export_cell(&field.id));
    }
    Ok(())
}

pub fn add(
    data_dir: &Path,
    fields: &[String],
    category: Option<String>,
    id: Option<String>,
    json: bool,
) -> Result<()> {
    let mut api = open_api(data_dir, None)?;

    let mut member = match &id {
        Some(id) => find_member(&api, id)?.clone(),
        None => Member::default(),
    };

    for spec in fields {
        let (key, value) = spec
            .split_once('=')
            .with_context(|| format!("Invalid field '{spec}', expected KEY=VALUE"))?;
        member.set_field(key, Value::String(value.to_string()));
    }

    if let Some(category) = category {
        member.category = Some(category);
    } else if member.category.is_none() {
        member.category = Some(api.get_settings().default_category.clone());
    }
    if member.short_id.is_none() {
        member.short_id = Some(id::next_short_id(api.get_members()));
    }

    render(api.save_member(member), json)
}

pub fn rm(data_dir: &Path, ids: &[String], json: bool) -> Result<()> {
    let mut api = open_api(data_dir, None)?;
    render(api.delete_members(ids), json)
}

pub fn import(data_dir: &Path, path: &Path, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let payload: Value =
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))?;

    let mut api = open_api(data_dir, None)?;
    render(api.import_members(payload), json)
}

pub fn export_csv(data_dir: &Path, out: Option<PathBuf>, stdout: bool, json: bool) -> Result<()> {
    let api = open_api(data_dir, out)?;
    if stdout {
        print!("{}", api.export_csv()?);
        return Ok(());
    }
    render(api.export_csv_file(), json)
}

pub fn export_json(data_dir: &Path, out: Option<PathBuf>, json: bool) -> Result<()> {
    let api = open_api(data_dir, out)?;
    render(api.export_json_file(), json)
}

pub fn export_member(data_dir: &Path, id: &str, out: Option<PathBuf>, json: bool) -> Result<()> {
    let api = open_api(data_dir, out)?;
    let payload = serde_json::to_value(find_member(&api, id)?)?;
    render(api.export_member_file(&payload), json)
}

pub fn schema_show(data_dir: &Path, json: bool) -> Result<()> {
    let api = open_api(data_dir, None)?;
    let schema = api.get_schema();

    if json {
        println!("{}", serde_json::to_string_pretty(schema)?);
        return Ok(());
    }

    for field in schema {
        let required = if field.required == Some(true) { "*" } else { "" };
        println!(
            "{:<16} {:<24} {}{}",
            field.id.cyan(),
            field.label,
            field.field_type,
            required
        );
    }
    Ok(())
}

pub fn schema_set(data_dir: &Path, path: &Path, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let schema = serde_json::from_str(&content)
        .with_context(|| format!("Invalid schema in {}", path.display()))?;

    let mut api = open_api(data_dir, None)?;
    render(api.save_schema(schema), json)
}

pub fn category_list(data_dir: &Path, json: bool) -> Result<()> {
    let api = open_api(data_dir, None)?;
    let categories = api.get_categories();

    if json {
        println!("{}", serde_json::to_string(categories)?);
        return Ok(());
    }
    for category in categories {
        println!("{category}");
    }
    Ok(())
}

pub fn category_add(data_dir: &Path, name: &str, json: bool) -> Result<()> {
    let mut api = open_api(data_dir, None)?;
    let mut categories = api.get_categories().to_vec();
    if categories.iter().any(|c| c == name) {
        bail!("Category already exists: {name}");
    }
    categories.push(name.to_string());
    render(api.save_categories(categories), json)
}

pub fn category_rm(data_dir: &Path, name: &str, json: bool) -> Result<()> {
    let mut api = open_api(data_dir, None)?;
    render(api.delete_category(name), json)
}

pub fn backup_create(data_dir: &Path, json: bool) -> Result<()> {
    let api = open_api(data_dir, None)?;
    render(api.backup_data(), json)
}

pub fn backup_list(data_dir: &Path, json: bool) -> Result<()> {
    let api = open_api(data_dir, None)?;
    let backups = api.get_backups()?;

    if json {
        println!("{}", serde_json::to_string(&backups)?);
        return Ok(());
    }
    if backups.is_empty() {
        println!("No backups");
        return Ok(());
    }
    for backup in backups {
        println!("{backup}");
    }
    Ok(())
}

pub fn backup_restore(data_dir: &Path, id: &str, json: bool) -> Result<()> {
    let mut api = open_api(data_dir, None)?;
    render(api.restore_backup(id), json)
}

pub fn backup_delete(data_dir: &Path, id: &str, json: bool) -> Result<()> {
    let api = open_api(data_dir, None)?;
    render(api.delete_backup(id), json)
}

pub fn settings_show(data_dir: &Path, json: bool) -> Result<()> {
    let api = open_api(data_dir, None)?;
    let settings = api.get_settings();

    if json {
        println!("{}", serde_json::to_string_pretty(settings)?);
        return Ok(());
    }

    println!("theme = {}", settings.theme);
    println!("default_category = {}", settings.default_category);
    println!("date_format = {}", settings.date_format);
    for (key, value) in &settings.extra {
        println!("{key} = {value}");
    }
    Ok(())
}

pub fn settings_set(data_dir: &Path, key: &str, value: &str, json: bool) -> Result<()> {
    let mut api = open_api(data_dir, None)?;
    let mut settings = api.get_settings().clone();

    match key {
        "theme" => settings.theme = value.to_string(),
        "default_category" => settings.default_category = value.to_string(),
        "date_format" => settings.date_format = value.to_string(),
        _ => {
            settings
                .extra
                .insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    render(api.save_settings(settings), json)
}
