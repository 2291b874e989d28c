use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ratatui::style::Color;
use tracing_subscriber::EnvFilter;

use serpent::game::GameConfig;
use serpent::modes::{PlayMode, PlayOptions};

#[derive(Parser)]
#[command(name = "serpent")]
#[command(version, about = "Terminal arcade snake with power-ups and persistent high scores")]
struct Cli {
    /// Board width in cells
    #[arg(long, default_value = "25")]
    width: u16,

    /// Board height in cells
    #[arg(long, default_value = "25")]
    height: u16,

    /// Path to the asset manifest; the game runs with fallbacks if absent
    #[arg(long, default_value = "assets/manifest.json")]
    assets: PathBuf,

    /// Save file for score persistence
    #[arg(long, default_value = "serpent-save.json")]
    save: PathBuf,

    /// Snake skin
    #[arg(long, default_value = "classic")]
    skin: Skin,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Skin {
    /// Classic green
    Classic,
    /// Neon cyan
    Neon,
    /// Fire red
    Fire,
    /// Neon purple
    Purple,
}

impl Skin {
    fn color(self) -> Color {
        match self {
            Skin::Classic => Color::Green,
            Skin::Neon => Color::Cyan,
            Skin::Fire => Color::Red,
            Skin::Purple => Color::Magenta,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let config = GameConfig::new(cli.width, cli.height);
    let options = PlayOptions {
        manifest_path: cli.assets,
        save_path: cli.save,
        skin: cli.skin.color(),
    };

    let mut mode = PlayMode::new(config, options);
    mode.run().await
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env();

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file {:?}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Arc::new(file))
                .with_ansi(false)
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
