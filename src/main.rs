#![forbid(unsafe_code)]

mod ui;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use thiserror::Error;

use horsepak::cook::{self, CookError, CookOptions};
use horsepak::pak::{self, PackOptions, PakError, DEFAULT_ZSTD_LEVEL};

#[derive(Debug, Parser)]
#[command(name = "horsepak", version, about = "Horse asset cooker and packager (HPAK v1)")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive wizard for cooking or packaging (terminal).
    Ui,

    /// Cook a source asset tree into versioned binary artifacts.
    Cook {
        /// Source asset directory; the project file sits in its parent.
        source: PathBuf,
        /// Cooked output directory.
        output: PathBuf,
        /// Target platform recorded in the cooked project.
        #[arg(default_value = "desktop")]
        platform: String,
        /// Worker threads (0 = all cores).
        #[arg(long, default_value_t = 0)]
        jobs: usize,
    },

    /// Pack a cooked tree into an archive and stage the runtime beside it.
    Package {
        /// Cooked asset directory.
        cooked: PathBuf,
        /// Output directory.
        output: PathBuf,
        /// Runtime executable to copy into the output.
        runtime: PathBuf,
        /// Game module library to copy into the output.
        game_module: PathBuf,
        /// Zstd level (1..=22).
        #[arg(long, default_value_t = DEFAULT_ZSTD_LEVEL)]
        zstd_level: i32,
        /// Optional mount prefix inside the archive (e.g. "assets/").
        #[arg(long, default_value = "")]
        prefix: String,
        /// Exclude paths containing this substring (repeatable).
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// List entries in an archive.
    List {
        #[arg(long)]
        pak: PathBuf,
        /// Print offsets, sizes and hashes too.
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },

    /// Extract an archive to an output directory.
    Extract {
        #[arg(long)]
        pak: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Only extract entries that contain this substring (repeatable).
        #[arg(long)]
        filter: Vec<String>,
    },

    /// Verify archive integrity (layout, sizes, hashes).
    Verify {
        #[arg(long)]
        pak: PathBuf,
    },
}

#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Cook(#[from] CookError),

    #[error(transparent)]
    Pak(#[from] PakError),

    #[error("{0}")]
    Usage(String),
}

pub(crate) type CliResult<T> = Result<T, CliError>;

pub(crate) fn run_cook(source: &Path, output: &Path, options: CookOptions) -> CliResult<()> {
    if !source.is_dir() {
        return Err(CliError::Usage(format!(
            "source asset directory not found: {}",
            source.display()
        )));
    }
    let report = cook::cook_directory(source, output, options)?;

    for a in &report.assets {
        match &a.result {
            Ok(cooked) => println!("cooked   {} -> {cooked}", a.source),
            Err(e) => println!("FAILED   {}: {e}", a.source),
        }
    }
    for s in &report.skipped {
        println!("skipped  {s} (no cooker)");
    }
    match &report.project {
        Some(Ok(cooked)) => println!("project  -> {cooked}"),
        Some(Err(e)) => println!("FAILED   project: {e}"),
        None => println!("project  none found"),
    }
    println!(
        "\n{} cooked, {} failed, {} skipped -> {}",
        report.cooked(),
        report.failed(),
        report.skipped.len(),
        output.display()
    );
    Ok(())
}

pub(crate) fn run_package(
    cooked: &Path,
    output: &Path,
    runtime: &Path,
    game_module: &Path,
    options: &PackOptions,
) -> CliResult<()> {
    if !cooked.is_dir() {
        return Err(CliError::Usage(format!(
            "cooked asset directory not found: {}",
            cooked.display()
        )));
    }
    let report = pak::package(cooked, output, runtime, game_module, options)?;

    for e in pak::entries(&report.archive)? {
        println!(
            "packed   {} ({} -> {} bytes, {})",
            e.path, e.original_size, e.stored_size, e.storage
        );
    }
    for (path, reason) in &report.pack.failed {
        println!("FAILED   {path}: {reason}");
    }
    for c in &report.copied {
        println!("copied   {}", c.display());
    }
    let s = &report.pack.summary;
    println!(
        "\n{} entries, {} failed, {} -> {} bytes -> {}",
        s.file_count,
        report.pack.failed.len(),
        s.original_bytes,
        s.stored_bytes,
        report.archive.display()
    );
    Ok(())
}

fn run(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Ui => ui::run(),
        Command::Cook {
            source,
            output,
            platform,
            jobs,
        } => run_cook(&source, &output, CookOptions { platform, jobs }),
        Command::Package {
            cooked,
            output,
            runtime,
            game_module,
            zstd_level,
            prefix,
            exclude,
        } => run_package(
            &cooked,
            &output,
            &runtime,
            &game_module,
            &PackOptions {
                zstd_level,
                prefix,
                excludes: exclude,
            },
        ),
        Command::List { pak, verbose } => Ok(pak::list(&pak, verbose)?),
        Command::Extract {
            pak,
            output,
            filter,
        } => {
            let n = pak::extract(&pak, &output, &filter)?;
            println!("extracted {n} entries to {}", output.display());
            Ok(())
        }
        Command::Verify { pak } => {
            let n = pak::verify(&pak)?;
            println!("ok: {n} entries");
            Ok(())
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let Err(e) = run(cli.cmd) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
