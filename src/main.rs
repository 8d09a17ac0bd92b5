use anyhow::{Context, Result};
use blockview::{
    apis::HttpUpstream,
    arguments::Arguments,
    config::{self, resolve_database_path},
    logger::{self, LogTag, LoggerConfig},
    Explorer,
};
use clap::Parser;
use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Arguments::parse();

    let mut config = config::load_config(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    args.apply(&mut config);
    config::validate(&config)?;

    logger::init(LoggerConfig::from_flags(
        &config.logging.level,
        &config.logging.debug_tags,
        config.logging.verbose,
    ));
    logger::info(
        LogTag::System,
        &format!(
            "Blockview starting (upstream {}, stats {})",
            config.upstream.base_url,
            resolve_database_path(&config).display()
        ),
    );

    let upstream = Arc::new(HttpUpstream::new(&config.upstream)?);
    let explorer = Arc::new(Explorer::open(&config, upstream)?);
    explorer.start();

    let shutdown = Arc::new(Notify::new());
    let signal = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        signal.notify_one();
    })
    .context("installing Ctrl-C handler")?;

    let mut status = tokio::time::interval(explorer.updater().interval());
    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                logger::info(LogTag::System, "Ctrl-C received, shutting down");
                break;
            }
            _ = status.tick() => log_status(&explorer),
        }
    }

    explorer.close();
    Ok(())
}

fn log_status(explorer: &Explorer) {
    let metrics = explorer.update_metrics();
    let line = match explorer.dashboard() {
        Some(snapshot) => format!(
            "tip {} | hashrate {:.2} EH/s | avg block {:.0}s | mempool {} | fresh {} | cycles {}/{} ok",
            snapshot.tip_height,
            snapshot.hashrate / 1e18,
            snapshot.avg_block_time.value(),
            snapshot.mempool_count.value(),
            explorer.is_fresh(),
            metrics.cycles_succeeded,
            metrics.cycles_started
        ),
        None => format!(
            "no data yet | cycles {}/{} ok",
            metrics.cycles_succeeded, metrics.cycles_started
        ),
    };
    logger::debug(LogTag::System, &line);
}
