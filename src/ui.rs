#![forbid(unsafe_code)]

use inquire::{Confirm, Select, Text};
use std::path::PathBuf;

use horsepak::cook::CookOptions;
use horsepak::pak::{PackOptions, DEFAULT_ZSTD_LEVEL};

use crate::{run_cook, run_package, CliError, CliResult};

const COOK: &str = "Cook source assets";
const PACKAGE: &str = "Package a cooked build";

fn prompt_err(e: inquire::InquireError) -> CliError {
    CliError::Usage(format!("prompt: {e}"))
}

fn ask(label: &str, default: &str) -> CliResult<String> {
    Text::new(label)
        .with_default(default)
        .prompt()
        .map(|s| s.trim().to_string())
        .map_err(prompt_err)
}

fn split_excludes(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(str::to_string)
        .collect()
}

fn confirm() -> CliResult<bool> {
    Confirm::new("Proceed?")
        .with_default(true)
        .prompt()
        .map_err(prompt_err)
}

pub fn run() -> CliResult<()> {
    println!("HORSEPAK Wizard\n");

    let action = Select::new("What do you want to do?", vec![COOK, PACKAGE])
        .prompt()
        .map_err(prompt_err)?;

    if action == COOK {
        let source = PathBuf::from(ask("Source asset directory", "./assets")?);
        let output = PathBuf::from(ask("Cooked output directory", "./cooked")?);
        let platform = ask("Target platform", "desktop")?;

        println!("\nCook summary:");
        println!("  source  : {}", source.display());
        println!("  output  : {}", output.display());
        println!("  platform: {platform}");
        if !confirm()? {
            return Ok(());
        }
        return run_cook(&source, &output, CookOptions { platform, jobs: 0 });
    }

    let cooked = PathBuf::from(ask("Cooked asset directory", "./cooked")?);
    let output = PathBuf::from(ask("Output directory", "./dist")?);
    let runtime = PathBuf::from(ask("Runtime executable", "./HorseRuntime")?);
    let game_module = PathBuf::from(ask("Game module library", "./libGame.so")?);
    let excludes = split_excludes(&ask("Excludes (comma-separated substrings, optional)", "")?);
    let zstd_level = ask("Zstd level (1..=22)", &DEFAULT_ZSTD_LEVEL.to_string())?
        .parse::<i32>()
        .unwrap_or(DEFAULT_ZSTD_LEVEL)
        .clamp(1, 22);

    println!("\nPackage summary:");
    println!("  cooked  : {}", cooked.display());
    println!("  output  : {}", output.display());
    println!("  runtime : {}", runtime.display());
    println!("  module  : {}", game_module.display());
    println!("  excludes: {}", if excludes.is_empty() { "<none>" } else { "(set)" });
    println!("  zstd    : level {zstd_level}");
    if !confirm()? {
        return Ok(());
    }

    run_package(
        &cooked,
        &output,
        &runtime,
        &game_module,
        &PackOptions {
            zstd_level,
            prefix: String::new(),
            excludes,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excludes_are_trimmed_and_filtered() {
        assert_eq!(split_excludes(" .git , ,target"), vec![".git", "target"]);
        assert!(split_excludes("").is_empty());
    }
}
