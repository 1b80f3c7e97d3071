//! hostwatch: Telegram bot serving live host reports and host alerts.

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hostwatch::probe::Procfs;
use hostwatch::watch::{DirWatch, RebootWatch, UnitWatch};
use hostwatch::{Config, Engine, LogWriter, Reporters, TelegramApi, poll_loop};

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let token = cli.token()?;
    let users = Arc::new(cli.users()?);
    let watch = cli.watch_config();
    let cfg = Config::default();

    let api = Arc::new(TelegramApi::new(&token, &cfg)?);
    let procfs = Procfs::new(watch.proc_root.clone());

    let engine = Engine::builder(cfg.clone(), api.clone(), users.clone())
        .with_subscribers(vec![Arc::new(LogWriter::new())])
        .with_reporters(Reporters::from_procfs(procfs.clone()))
        .build();

    engine.spawn_watcher(RebootWatch::new(procfs.clone()), cfg.reboot_period);

    if !watch.dirs.is_empty() {
        info!(dirs = ?watch.dirs, "watching directories");
        engine.spawn_watcher(DirWatch::new(procfs, watch.dirs.clone()), cfg.dir_period);
    }

    let units = watch.resolve_units().unwrap_or_else(|err| {
        warn!(dir = %watch.unit_dir.display(), error = %err, "unit discovery failed");
        Vec::new()
    });
    if !units.is_empty() {
        info!(units = ?units, "watching units");
        engine.spawn_watcher(UnitWatch::new(units), cfg.unit_period);
    }

    info!(users = users.len(), "hostwatch started");
    let poller = tokio::spawn(poll_loop(api, Arc::clone(&engine), users));

    let res = engine.run().await;
    let _ = poller.await;
    res?;

    info!("hostwatch stopped");
    Ok(())
}
