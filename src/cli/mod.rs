use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "startupintel")]
#[command(
    about = "Scrape startup news, score it with an LLM and deliver the best to Telegram",
    long_about = None
)]
pub struct Cli {
    /// Config file (default: ~/.config/startupintel/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// History file, overriding `history_path` from the config
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Number of sources scraped at once, overriding `browser.max_concurrency`
    #[arg(short, long)]
    pub workers: Option<usize>,
}
