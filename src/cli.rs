use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Srt,
}

#[derive(Parser)]
#[command(name = "ytcaps", about = "YouTube caption transcript fetcher", version)]
pub struct Cli {
    /// YouTube video URL or video ID (reads from stdin if omitted)
    pub url: Option<String>,

    /// Output format: text (default), json, srt
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Preferred caption language (defaults to the video's default track)
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// User-Agent header for outbound requests
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Skip the on-disk transcript cache
    #[arg(long)]
    pub no_cache: bool,

    /// Cache TTL in milliseconds
    #[arg(long)]
    pub cache_ttl: Option<i64>,

    /// Use plain HTTP for outbound requests (e.g. through an intercepting proxy)
    #[arg(long)]
    pub disable_https: bool,

    /// Show extraction metadata on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
