use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use tome::catalog::{MangaDex, Source};
use tome::core::config;
use tome::tui;

#[derive(Parser)]
#[command(name = "tome", about = "Terminal series downloader")]
struct Args {
    /// Prefill the search box with this query
    query: Option<String>,

    /// Library directory downloads are written to (overrides config)
    #[arg(short, long)]
    library: Option<PathBuf>,

    /// Enable only the named source; repeatable (overrides config)
    #[arg(short, long)]
    source: Vec<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    // Initialize file logger - writes to tome.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("tome.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("Falling back to default config: {}", e);
        config::TomeConfig::default()
    });
    let resolved = config::resolve(&file_config, args.library.as_deref(), &args.source);

    log::info!(
        "Tome starting up: sources={:?}, library={}",
        resolved.sources,
        resolved.library_dir.display()
    );

    let sources: Vec<Arc<dyn Source>> = resolved
        .sources
        .iter()
        .filter_map(|name| match name.as_str() {
            "mangadex" => Some(Arc::new(MangaDex::new(
                resolved.mangadex_base_url.clone(),
                resolved.language.clone(),
            )) as Arc<dyn Source>),
            other => {
                log::warn!("Unknown source '{}' in config, skipping", other);
                None
            }
        })
        .collect();

    tui::run(resolved, sources, args.query)
}
