//! maturity-toc: build the feature-maturity grid from annotated Python sources.
//!
//! - `maturity-toc parse src/ toc.json` prints the TOC with annotations merged in
//! - `maturity-toc scan src/` prints the annotations found, keyed by id

mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use maturity_toc::{ParseErrorPolicy, ScanOptions, DEFAULT_ICON_BASE_URL};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "maturity-toc",
    version,
    about = "Merge feature-maturity annotations from Python docstrings into a status-grid TOC"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL for icons of annotations that leave `icon:` empty
    #[arg(
        long,
        global = true,
        env = "MATURITY_TOC_ICON_BASE_URL",
        default_value = DEFAULT_ICON_BASE_URL
    )]
    icon_base_url: String,

    /// What to do with Python files that fail to parse
    #[arg(long, global = true, value_enum, default_value_t = ParseErrorPolicy::Abort)]
    on_parse_error: ParseErrorPolicy,

    /// More log output on stderr (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Merge annotations found under PATH into the TOC document
    Parse {
        /// Root directory of the Python project to scan
        path: PathBuf,

        /// TOC JSON document to merge into
        toc: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print the annotations found under PATH, keyed by id
    Scan {
        /// Root directory of the Python project to scan
        path: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let options = ScanOptions {
        icon_base_url: cli.icon_base_url,
        on_parse_error: cli.on_parse_error,
    };

    match cli.command {
        Command::Parse { path, toc, out } => {
            let merged = maturity_toc::build_annotations(&path, &toc, &options)
                .with_context(|| format!("failed to build annotations for {}", path.display()))?;
            let rendered = maturity_toc::toc::render_json(&merged)?;
            write_output(&rendered, out.as_deref())
        }
        Command::Scan { path, out } => {
            let registry = maturity_toc::scan_annotations(&path, &options)
                .with_context(|| format!("failed to scan {}", path.display()))?;
            let rendered = maturity_toc::toc::render_json(&registry)?;
            write_output(&rendered, out.as_deref())
        }
    }
}

/// Write rendered JSON to `out`, or stdout when no path is given.
fn write_output(rendered: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            print!("{}", rendered);
            Ok(())
        }
    }
}
