use clap::{Parser, Subcommand};

mod commands;

use commands::ini::IniCommands;
use commands::templates::TemplatesCommands;

#[derive(Parser)]
#[command(name = "gameini")]
#[command(about = "CLI for block-structured game INI data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// INI Operations (Decode/Format)
    #[command(subcommand)]
    Ini(IniCommands),
    /// Template Operations (Dump/Show/List)
    #[command(subcommand)]
    Templates(TemplatesCommands),
}

fn main() -> anyhow::Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .try_init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Ini(cmd) => commands::ini::handle(cmd)?,
        Commands::Templates(cmd) => commands::templates::handle(cmd)?,
    }

    Ok(())
}
