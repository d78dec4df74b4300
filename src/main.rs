//! mdlens - A terminal markdown viewer.
//!
//! # Usage
//!
//! ```bash
//! mdlens README.md
//! mdlens --raw --no-watch README.md
//! mdlens --files docs/
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mdlens::app::App;
use mdlens::config::{
    ConfigFlags, ThemeMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use mdlens::export::DEFAULT_EXPORT_DIR;
use mdlens::pipeline::ViewMode;

/// A terminal markdown viewer with search, outline and live reload
#[derive(Parser, Debug)]
#[command(name = "mdlens", version, about, long_about = None)]
struct Cli {
    /// Markdown file to view, or a directory to browse
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Start in raw mode
    #[arg(long)]
    raw: bool,

    /// Start with the table of contents visible
    #[arg(long)]
    toc: bool,

    /// Start with the file browser visible
    #[arg(long)]
    files: bool,

    /// Do not reload the file when it changes on disk
    #[arg(long)]
    no_watch: bool,

    /// Directory for exported HTML and text files
    #[arg(long, value_name = "PATH")]
    export_dir: Option<PathBuf>,

    /// Write log output to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Colour palette
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter =
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_deref())?;
    tracing::debug!(?effective, "effective flags");

    if let Some(path) = &cli.file
        && !path.exists()
    {
        anyhow::bail!("File not found: {}", path.display());
    }

    let mode = if effective.raw {
        ViewMode::Raw
    } else {
        ViewMode::Rendered
    };

    // Run the application
    let mut app = App::new(cli.file)
        .with_mode(mode)
        .with_watch(!effective.no_watch)
        .with_toc_visible(effective.toc)
        .with_browse_mode(effective.files)
        .with_theme(effective.theme.unwrap_or_default())
        .with_export_dir(
            effective
                .export_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR)),
        )
        .with_config_paths(
            Some(global_path),
            if local_path.exists() {
                Some(local_path)
            } else {
                None
            },
        );

    app.run().context("Application error")
}
