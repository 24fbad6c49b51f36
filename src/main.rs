use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::warn;

use vergino::{
    backup_database, classify, export_csv, is_backup_due, logging, read_csv, AppConfig,
    SqliteTaxPayerStore, TaxPayer, TaxPayerRepository,
};

#[derive(Parser)]
#[command(name = "vergino", version, about = "Turkish tax number (VKN/TCKN) validation and taxpayer roster")]
struct Cli {
    /// Settings file (default: {config_dir}/VergiNoDogrula/appsettings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overrides the settings file
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether a number is a valid VKN or TCKN (no database access)
    Check { number: String },
    /// List every stored taxpayer
    List,
    /// Show one taxpayer
    Get { number: String },
    /// Add a taxpayer, or rename the one with the same number
    Save { title: String, number: String },
    /// Remove a taxpayer
    Delete { number: String },
    /// Write a backup copy of the database now
    Backup {
        /// Target folder (default: backup folder from the settings)
        #[arg(long)]
        folder: Option<PathBuf>,
    },
    /// Export the roster as CSV
    Export { file: PathBuf },
    /// Import taxpayers from CSV (all or nothing)
    Import { file: PathBuf },
    /// Show database location and last change time
    Info,
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        // Pure validation; works without settings or a database
        Command::Check { number } => {
            run_check(&number);
            Ok(())
        }
        command => run_with_store(command, cli.config, cli.database),
    }
}

fn run_with_store(
    command: Command,
    config_path: Option<PathBuf>,
    database: Option<PathBuf>,
) -> Result<()> {
    let config_path = config_path.unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load(&config_path)?;
    if let Some(database) = database {
        config.database_path = database;
    }

    let mut store = SqliteTaxPayerStore::open(&config.database_path)
        .with_context(|| format!("failed to open database {:?}", config.database_path))?;

    match command {
        Command::Check { .. } => unreachable!("check is dispatched in main without a store"),
        Command::List => run_list(&store)?,
        Command::Get { number } => run_get(&store, &number)?,
        Command::Save { title, number } => {
            let taxpayer = TaxPayer::new(title, &number)?;
            store.upsert(&taxpayer)?;
            println!("✓ Saved {}", taxpayer);
            run_auto_backup(&store, &mut config, &config_path);
        }
        Command::Delete { number } => {
            if store.delete(number.trim())? {
                println!("✓ Deleted {}", number.trim());
                run_auto_backup(&store, &mut config, &config_path);
            } else {
                println!("No taxpayer with number {}", number.trim());
            }
        }
        Command::Backup { folder } => {
            let folder = folder.unwrap_or_else(|| config.backup_folder.clone());
            let now = Utc::now();
            let path = backup_database(&store, &folder, now)?;
            config.last_backup_time = Some(now);
            config.save(&config_path)?;
            println!("✓ Backup written to {}", path.display());
        }
        Command::Export { file } => {
            let taxpayers = store.list_all()?;
            let out = File::create(&file).with_context(|| format!("failed to create {:?}", file))?;
            let written = export_csv(&taxpayers, out)?;
            println!("✓ Exported {} taxpayers to {}", written, file.display());
        }
        Command::Import { file } => {
            let input = File::open(&file).with_context(|| format!("failed to open {:?}", file))?;
            let taxpayers = read_csv(input)?;
            let imported = store.upsert_many(&taxpayers)?;
            println!("✓ Imported {} taxpayers from {}", imported, file.display());
            if imported > 0 {
                run_auto_backup(&store, &mut config, &config_path);
            }
        }
        Command::Info => run_info(&store, &config)?,
    }

    Ok(())
}

fn run_check(number: &str) {
    // Same trimming the entity applies to typed-in numbers
    let trimmed = number.trim();
    match classify(trimmed) {
        Some(kind) => println!("✓ {} is a valid {}", trimmed, kind),
        None => {
            println!("✗ {} is not a valid VKN or TCKN", trimmed);
            std::process::exit(1);
        }
    }
}

fn run_list(store: &SqliteTaxPayerStore) -> Result<()> {
    let taxpayers = store.list_all()?;

    if taxpayers.is_empty() {
        println!("No taxpayers stored.");
        return Ok(());
    }

    for taxpayer in &taxpayers {
        let kind = taxpayer.kind().map(|k| k.as_str()).unwrap_or("?");
        println!("{:<11}  {:<4}  {}", taxpayer.tax_number(), kind, taxpayer.title());
    }
    println!("\n{} taxpayers", taxpayers.len());

    Ok(())
}

fn run_get(store: &SqliteTaxPayerStore, number: &str) -> Result<()> {
    match store.get_by_tax_number(number.trim())? {
        Some(taxpayer) => println!("{}", taxpayer),
        None => println!("No taxpayer with number {}", number.trim()),
    }
    Ok(())
}

fn run_info(store: &SqliteTaxPayerStore, config: &AppConfig) -> Result<()> {
    println!("Database:     {}", store.path().display());
    println!("Taxpayers:    {}", store.count()?);
    match store.last_update_time() {
        Some(time) => println!("Last change:  {}", time.format("%Y-%m-%d %H:%M:%S")),
        None => println!("Last change:  never"),
    }
    println!("Backups:      {}", config.backup_folder.display());
    if config.auto_backup_enabled {
        println!(
            "Auto backup:  every {} minutes",
            config.auto_backup_interval().num_minutes()
        );
    }
    Ok(())
}

/// Take a backup after a write when one is due.
///
/// The write already succeeded, so a failing backup is reported but does not
/// fail the command.
fn run_auto_backup(store: &SqliteTaxPayerStore, config: &mut AppConfig, config_path: &Path) {
    let now = Utc::now();
    if !is_backup_due(config, now) {
        return;
    }

    match backup_database(store, &config.backup_folder, now) {
        Ok(path) => {
            config.last_backup_time = Some(now);
            if let Err(err) = config.save(config_path) {
                warn!(error = %err, "backup taken but settings could not be saved");
            }
            println!("✓ Automatic backup written to {}", path.display());
        }
        Err(err) => warn!(error = %err, "automatic backup failed"),
    }
}
