//! `tidy`: command-line front end for the signal registry.
//!
//! # Usage
//!
//! ```text
//! tidy init
//! tidy import signals.csv --software-version 1.0.0
//! tidy add-signal vehicle_speed
//! tidy add-version <UUID> --software-version 1.1.0 speed_v2 kph 0 "[1]"
//! tidy export signals.yaml --software-version 1.0.0
//! tidy export-all everything.csv
//! ```
//!
//! Settings come from `tidy.toml` (or `--config`), then `TIDY_*` environment
//! variables, then `--database`.

mod settings;

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use settings::Settings;
use tidy_core::signal::{Provenance, VersionRecord};
use tidy_io::Format;
use tidy_store_sqlite::{SignalStore as _, SqliteRegistry};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about = "Track interface signals across software versions")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "tidy.toml")]
  config: PathBuf,

  /// SQLite database file; overrides the config file.
  #[arg(long, env = "TIDY_DATABASE")]
  database: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create the signal tables if they do not exist.
  Init,

  /// Drop the version table and recreate it with the configured columns.
  Rebuild,

  /// Import a CSV, YAML or JSON file, allocating one identity per row.
  Import {
    file: PathBuf,
    #[arg(short, long)]
    software_version: String,
  },

  /// Allocate a new signal identity and print its UUID.
  AddSignal { name: String },

  /// Append a version record for an existing identity.
  AddVersion {
    uuid: Uuid,
    #[arg(short, long)]
    software_version: String,
    /// Attribute values in configured column order.
    values: Vec<String>,
  },

  /// Print the UUID of the most recent identity with this display name.
  Lookup { name: String },

  /// Show an identity's stored metadata.
  Show { uuid: Uuid },

  /// List the software versions present in the registry.
  Versions,

  /// Export one software version.
  Export {
    destination: PathBuf,
    #[arg(short, long)]
    software_version: String,
    /// csv, yaml or json; inferred from the destination when omitted.
    #[arg(short, long)]
    format: Option<Format>,
  },

  /// Export every version record.
  ExportAll {
    destination: PathBuf,
    #[arg(short, long)]
    format: Option<Format>,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut settings = Settings::load(&cli.config)?;
  if let Some(database) = cli.database {
    settings.database = database;
  }
  let registry = settings.registry()?;

  run(&registry, cli.command)
}

fn run(registry: &SqliteRegistry, command: Command) -> anyhow::Result<ExitCode> {
  match command {
    Command::Init => {
      registry.initialize().context("failed to initialise registry")?;
    }
    Command::Rebuild => {
      registry.rebuild_version_table().context("failed to rebuild version table")?;
    }
    Command::Import { file, software_version } => {
      let summary = match Format::from_path(&file) {
        Some(f) if f.is_document() => registry.import_from_document(&file, &software_version),
        _ => registry.import_from_delimited_file(&file, &software_version),
      }
      .with_context(|| format!("failed to import {}", file.display()))?;
      println!("imported {} signals", summary.rows());
    }
    Command::AddSignal { name } => {
      let identity = registry.allocate_identity(&name, Provenance::Manual)?;
      println!("{}", identity.uuid);
    }
    Command::AddVersion { uuid, software_version, values } => {
      registry
        .append_version(&VersionRecord::new(uuid, values, software_version))
        .context("failed to append version record")?;
    }
    Command::Lookup { name } => match registry.find_identity_by_display_name(&name)? {
      Some(uuid) => println!("{uuid}"),
      None => {
        eprintln!("no signal named {name:?}");
        return Ok(ExitCode::FAILURE);
      }
    },
    Command::Show { uuid } => match registry.get_identity(uuid)? {
      Some(identity) => {
        println!("uuid:          {}", identity.uuid);
        println!("name:          {}", identity.latest_display_name);
        println!("created:       {}", identity.creation_date.to_rfc3339());
        println!("creation info: {}", identity.creation_info);
      }
      None => {
        eprintln!("no signal with uuid {uuid}");
        return Ok(ExitCode::FAILURE);
      }
    },
    Command::Versions => {
      for version in registry.list_software_versions()? {
        println!("{version}");
      }
    }
    Command::Export { destination, software_version, format } => {
      let format = resolve_format(format, &destination)?;
      let rows = registry
        .export_version(&software_version, &destination, format)
        .with_context(|| format!("failed to export to {}", destination.display()))?;
      println!("exported {rows} records");
    }
    Command::ExportAll { destination, format } => {
      let format = resolve_format(format, &destination)?;
      let rows = registry
        .export_all(&destination, format)
        .with_context(|| format!("failed to export to {}", destination.display()))?;
      println!("exported {rows} records");
    }
  }
  Ok(ExitCode::SUCCESS)
}

fn resolve_format(explicit: Option<Format>, destination: &Path) -> anyhow::Result<Format> {
  match explicit.or_else(|| Format::from_path(destination)) {
    Some(format) => Ok(format),
    None => bail!(
      "cannot infer format from {}; pass --format csv|yaml|json",
      destination.display()
    ),
  }
}
