//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::MoexError;
use crate::domain::settings::{build_settings, Settings};
use crate::logging::{setup_logging, DEFAULT_FILTER};

#[derive(Parser, Debug)]
#[command(name = "moexhist", about = "Moscow Exchange historical candle fetcher")]
pub struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = DEFAULT_FILTER)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch daily candles for one security
    Fetch {
        #[arg(long)]
        sec_id: String,
        /// First trading day, YYYY-MM-DD
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last trading day, YYYY-MM-DD
        #[arg(long)]
        till: Option<NaiveDate>,
        /// Read the cached table instead of contacting ISS
        #[arg(long)]
        local: bool,
        /// Save the fetched table to the cache directory
        #[arg(long)]
        save: bool,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Write CSV here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List securities present in the cache directory
    ListCached {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    setup_logging(&cli.log);

    match cli.command {
        Command::Fetch {
            sec_id,
            from,
            till,
            local,
            save,
            config,
            data_dir,
            output,
        } => {
            let settings = match resolve_settings(config.as_deref(), data_dir) {
                Ok(s) => s,
                Err(e) => return report(&e),
            };
            let save = save || settings.persist;
            run_fetch(&settings, &sec_id, from, till, local, save, output.as_deref())
        }
        Command::ListCached { config, data_dir } => {
            match resolve_settings(config.as_deref(), data_dir) {
                Ok(settings) => run_list_cached(&settings),
                Err(e) => report(&e),
            }
        }
    }
}

fn report(err: &MoexError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, MoexError> {
    FileConfigAdapter::from_file(path).map_err(|e| MoexError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Settings from the optional config file, with `--data-dir` taking precedence.
pub fn resolve_settings(
    config_path: Option<&Path>,
    data_dir: Option<PathBuf>,
) -> Result<Settings, MoexError> {
    let mut settings = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            build_settings(&load_config(path)?)?
        }
        None => Settings::default(),
    };
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    Ok(settings)
}

pub fn run_fetch(
    settings: &Settings,
    sec_id: &str,
    from: Option<NaiveDate>,
    till: Option<NaiveDate>,
    local: bool,
    save: bool,
    output: Option<&Path>,
) -> ExitCode {
    let candles = match crate::get_candles(settings, sec_id, from, till, local, save) {
        Ok(c) => c,
        Err(e) => return report(&e),
    };

    let written = match output {
        Some(path) => fs::File::create(path)
            .map_err(MoexError::from)
            .and_then(|file| CsvAdapter::write_table(file, &candles)),
        None => CsvAdapter::write_table(io::stdout().lock(), &candles),
    };
    if let Err(e) = written {
        return report(&e);
    }

    eprintln!("{} candles for {}", candles.len(), sec_id.trim().to_uppercase());
    ExitCode::SUCCESS
}

fn run_list_cached(settings: &Settings) -> ExitCode {
    let adapter = CsvAdapter::new(settings.data_dir.clone());
    let sec_ids = match adapter.list_cached() {
        Ok(ids) => ids,
        Err(e) => return report(&e),
    };

    if sec_ids.is_empty() {
        eprintln!("No cached securities in {}", settings.data_dir.display());
    } else {
        for sec_id in &sec_ids {
            println!("{}", sec_id);
        }
        eprintln!("{} cached securities", sec_ids.len());
    }
    ExitCode::SUCCESS
}
