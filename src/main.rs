//! pkbindgen: generate language bindings and documentation from the
//! libpagekite C header.
//!
//! ```text
//! pkbindgen include/pagekite.h PageKiteAPI.java pagekite-jni.c \
//!     libpagekite/__init__.py doc/API.md doc/JNI_API.md
//! ```
//!
//! Each output's extension picks its emitter: `.java`, `.c` (JNI glue),
//! `.py`, `.md` (a file name containing `jni` documents the Java API) and
//! `.json` (the parsed model).

mod emit;
mod error;
mod model;
mod parser;
mod profile;
mod types;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::emit::{Context as EmitContext, Emitter};
use crate::profile::Profile;

#[derive(Parser)]
#[command(
    name = "pkbindgen",
    version,
    about = "Generate Java, JNI, Python and Markdown bindings from a C header"
)]
struct Cli {
    /// The C header to read.
    header: PathBuf,

    /// Files to generate; the extension selects the output format.
    #[arg(required = true)]
    outputs: Vec<PathBuf>,

    /// TOML profile overriding the built-in libpagekite settings.
    #[arg(short = 'c', long)]
    profile: Option<PathBuf>,

    /// Copyright year for generated banners
    /// (default: SOURCE_DATE_EPOCH, else the current year).
    #[arg(long)]
    year: Option<u32>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Print the single output to stdout instead of writing it.
    #[arg(long)]
    stdout: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default = if cli.verbose {
        "pkbindgen=debug"
    } else {
        "pkbindgen=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    if cli.stdout && cli.outputs.len() != 1 {
        bail!("--stdout needs exactly one output, got {}", cli.outputs.len());
    }

    let profile = match &cli.profile {
        Some(path) => Profile::load(path)?,
        None => Profile::default(),
    };

    // Every target must be known before anything is written.
    let emitters = cli
        .outputs
        .iter()
        .map(|path| -> Result<(&PathBuf, Box<dyn Emitter>)> {
            Ok((path, emit::create_emitter(path, &profile)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let header = fs::read_to_string(&cli.header)
        .with_context(|| format!("failed to read header: {}", cli.header.display()))?;
    let api = parser::parse_header(&header, &profile);

    let ctx = EmitContext {
        profile: &profile,
        year: resolve_year(cli.year),
    };

    for (path, emitter) in &emitters {
        let output = emitter.emit(&api, &ctx);
        if cli.stdout {
            print!("{}", output);
            continue;
        }
        write_output(path, &output)?;
        info!("wrote {} ({})", path.display(), emitter.target());
    }

    Ok(())
}

fn write_output(path: &Path, output: &str) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    }
    fs::write(path, output).with_context(|| format!("failed to write {}", path.display()))
}

/// `--year`, then `SOURCE_DATE_EPOCH`, then the clock.
fn resolve_year(explicit: Option<u32>) -> u32 {
    if let Some(year) = explicit {
        return year;
    }
    let epoch = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok());
    let secs = epoch.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    });
    emit::text::year_from_unix(secs)
}
