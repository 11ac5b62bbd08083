use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use eyre::{Result, bail};
use log::{debug, info};

mod cli;

use cli::{Cli, OutputFormat};
use ytcaps::{CacheStrategy, FsCache, TranscriptClient, TranscriptConfig, DEFAULT_CACHE_TTL_MS};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytcaps.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytcaps")
        .join("logs")
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("ytcaps")
        .join("transcripts")
}

/// Retry an async operation with exponential backoff
async fn retry<F, Fut, T>(max_attempts: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_err = None;
    for attempt in 0..max_attempts {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                if attempt + 1 < max_attempts {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    debug!("Attempt {} failed: {e}, retrying in {delay:?}", attempt + 1);
                    tokio::time::sleep(delay).await;
                }
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let cli = <Cli as clap::Parser>::parse();

    // Load config file (non-fatal if missing/invalid)
    let config = ytcaps::config::Config::load().unwrap_or_default();

    // CLI flags take priority over the config file
    let lang = cli.lang.clone().or_else(|| config.default_lang.clone());
    let user_agent = cli.user_agent.clone().or_else(|| config.user_agent.clone());
    let cache_ttl = cli.cache_ttl.or(config.cache_ttl_ms);
    let disable_https = cli.disable_https || config.disable_https.unwrap_or(false);

    let cache: Option<Arc<dyn CacheStrategy>> = if cli.no_cache {
        None
    } else {
        let dir = config.cache_dir.clone().unwrap_or_else(default_cache_dir);
        Some(Arc::new(FsCache::new(
            dir,
            cache_ttl.unwrap_or(DEFAULT_CACHE_TTL_MS),
        )?))
    };

    let client = TranscriptClient::new(TranscriptConfig {
        lang: lang.clone(),
        user_agent,
        cache,
        cache_ttl,
        disable_https,
        ..Default::default()
    });

    // Collect URLs: from arg or stdin
    let urls = if let Some(ref url) = cli.url {
        vec![url.clone()]
    } else {
        let stdin = io::stdin();
        stdin.lock().lines().collect::<Result<Vec<_>, _>>()?
    };

    if urls.is_empty() {
        bail!("no URL or video ID provided\n\nUsage: ytcaps <URL>\n       echo <URL> | ytcaps");
    }

    for url_input in &urls {
        let url_input = url_input.trim().to_string();
        if url_input.is_empty() {
            continue;
        }

        let segments = retry(3, || {
            let client = &client;
            let url_input = &url_input;
            async move { Ok(client.fetch_transcript(url_input).await?) }
        })
        .await?;

        if cli.verbose {
            eprintln!(
                "Input: {url_input}\nLanguage: {}\nSegments: {}",
                lang.as_deref().unwrap_or("default"),
                segments.len(),
            );
        }

        let rendered = match cli.format {
            OutputFormat::Text => ytcaps::output::render_text(&segments),
            OutputFormat::Json => ytcaps::output::render_json(&segments),
            OutputFormat::Srt => ytcaps::output::render_srt(&segments),
        };

        if let Some(ref path) = cli.output {
            std::fs::write(path, &rendered)?;
            if cli.verbose {
                eprintln!("Output written to: {}", path.display());
            }
        } else {
            println!("{rendered}");
        }
    }

    Ok(())
}
