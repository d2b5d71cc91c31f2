use anyhow::{Context, Result};
use clap::Subcommand;
use gameini::{parse_file, write_blocks};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum IniCommands {
    /// Decode an INI file to JSON (merged blocks)
    Decode {
        /// Input INI file
        input: PathBuf,
        /// Output JSON file (optional, defaults to input + .json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Re-emit an INI file in normalized form
    Fmt {
        /// Input INI file
        input: PathBuf,
        /// Output INI file (optional, defaults to printing to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn handle(cmd: &IniCommands) -> Result<()> {
    match cmd {
        IniCommands::Decode { input, output } => ini_decode(input, output),
        IniCommands::Fmt { input, output } => ini_fmt(input, output),
    }
}

pub fn ini_decode(input: &Path, output: &Option<PathBuf>) -> Result<()> {
    let parsed = parse_file(input)?;

    let out_path = match output {
        Some(p) => p.clone(),
        None => input.with_extension("json"),
    };

    let blocks: Vec<_> = parsed.blocks.iter().collect();
    let json = serde_json::to_string_pretty(&blocks)?;
    fs::write(&out_path, json)
        .with_context(|| format!("Failed to write output JSON to {:?}", out_path))?;
    println!(
        "Decoded {} blocks to {:?} ({} warnings)",
        blocks.len(),
        out_path,
        parsed.diagnostics.len()
    );
    Ok(())
}

pub fn ini_fmt(input: &Path, output: &Option<PathBuf>) -> Result<()> {
    let parsed = parse_file(input)?;
    let text = write_blocks(parsed.blocks.iter());

    match output {
        Some(out_path) => {
            fs::write(out_path, text)
                .with_context(|| format!("Failed to write {:?}", out_path))?;
            println!("Formatted {} blocks to {:?}", parsed.blocks.len(), out_path);
        }
        None => print!("{}", text),
    }
    Ok(())
}
