//! rostr - local member-records manager
//!
//! No database server, no daemon - flat JSON files in a data directory,
//! timestamped backups, CSV/JSON export.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "rostr")]
#[command(about = "Local member-records manager")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Data directory (overrides config)
    #[arg(long, global = true, env = "ROSTR_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List members
    List,

    /// Show member details
    Show {
        /// Member id or short id (MEM-NNN)
        id: String,
    },

    /// Add a member, or update one with --id
    Add {
        /// Field values, key=value (keys per the schema)
        #[arg(short = 'f', long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,

        /// Category name
        #[arg(short, long)]
        category: Option<String>,

        /// Existing member id to update
        #[arg(long)]
        id: Option<String>,
    },

    /// Delete members by id
    Rm {
        /// Member ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Import members from a JSON file
    Import {
        /// Path to a JSON array of member records
        path: PathBuf,
    },

    /// Export members
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },

    /// Show or replace the field schema
    Schema {
        #[command(subcommand)]
        command: Option<SchemaCommands>,
    },

    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Manage backups
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },

    /// Show or update settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
}

#[derive(Subcommand)]
enum ExportCommands {
    /// Export all members as CSV
    Csv {
        /// Output file (defaults to members_export.csv)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Export all members as JSON
    Json {
        /// Output file (defaults to members_export.json)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Export a single member as JSON
    Member {
        /// Member id or short id
        id: String,

        /// Output file (defaults to member_<id>.json)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Show the current schema
    Show,
    /// Replace the schema from a JSON file
    Set {
        /// Path to a JSON array of field definitions
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// List categories
    List,
    /// Add a category
    Add {
        /// Category name
        name: String,
    },
    /// Delete a category (members fall back to "Uncategorized")
    Rm {
        /// Category name
        name: String,
    },
}

#[derive(Subcommand)]
enum BackupCommands {
    /// Create a backup snapshot
    Create,
    /// List backups, newest first
    List,
    /// Restore a backup over the live data
    Restore {
        /// Backup id (YYYYMMDD_HHMMSS)
        id: String,
    },
    /// Delete a backup
    Delete {
        /// Backup id (YYYYMMDD_HHMMSS)
        id: String,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show current settings
    Show,
    /// Set a settings value
    Set {
        /// Settings key (theme, default_category, date_format, or custom)
        key: String,
        /// New value
        value: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match rostr_core::Config::default_path() {
        Some(path) => rostr_core::Config::load(&path)?,
        None => rostr_core::Config::default(),
    };
    if !config.display.colors {
        colored::control::set_override(false);
    }
    let data_dir = config.resolve_data_dir(cli.data_dir)?;

    match cli.command {
        Commands::List => commands::list(&data_dir, cli.json),
        Commands::Show { id } => commands::show(&data_dir, &id, cli.json),
        Commands::Add {
            fields,
            category,
            id,
        } => commands::add(&data_dir, &fields, category, id, cli.json),
        Commands::Rm { ids } => commands::rm(&data_dir, &ids, cli.json),
        Commands::Import { path } => commands::import(&data_dir, &path, cli.json),
        Commands::Export { command } => match command {
            ExportCommands::Csv { out, stdout } => {
                commands::export_csv(&data_dir, out, stdout, cli.json)
            }
            ExportCommands::Json { out } => commands::export_json(&data_dir, out, cli.json),
            ExportCommands::Member { id, out } => {
                commands::export_member(&data_dir, &id, out, cli.json)
            }
        },
        Commands::Schema { command } => match command {
            Some(SchemaCommands::Set { path }) => commands::schema_set(&data_dir, &path, cli.json),
            Some(SchemaCommands::Show) | None => commands::schema_show(&data_dir, cli.json),
        },
        Commands::Category { command } => match command {
            CategoryCommands::List => commands::category_list(&data_dir, cli.json),
            CategoryCommands::Add { name } => commands::category_add(&data_dir, &name, cli.json),
            CategoryCommands::Rm { name } => commands::category_rm(&data_dir, &name, cli.json),
        },
        Commands::Backup { command } => match command {
            BackupCommands::Create => commands::backup_create(&data_dir, cli.json),
            BackupCommands::List => commands::backup_list(&data_dir, cli.json),
            BackupCommands::Restore { id } => commands::backup_restore(&data_dir, &id, cli.json),
            BackupCommands::Delete { id } => commands::backup_delete(&data_dir, &id, cli.json),
        },
        Commands::Settings { command } => match command {
            Some(SettingsCommands::Set { key, value }) => {
                commands::settings_set(&data_dir, &key, &value, cli.json)
            }
            Some(SettingsCommands::Show) | None => commands::settings_show(&data_dir, cli.json),
        },
    }
}
