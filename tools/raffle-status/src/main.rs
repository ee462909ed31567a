//! Raffle-Status: live status of the Epok raffle.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use tokio::sync::watch;

use raffle_status::{cli::Args, demo, render, RenderOptions};
use raffle_sync::{
    CycleOutcome, EpochSnapshot, HttpRaffleSource, HttpSourceConfig, LiveSyncController,
    RaffleDataSource, RemoteView, SyncConfig, SystemTimeSource,
};
use raffle_telemetry::{init_telemetry, log_cycle_event, log_event, TelemetryConfig};

type Controller = LiveSyncController<dyn RaffleDataSource, SystemTimeSource>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let telemetry = args.telemetry_config(TelemetryConfig::for_service("raffle-status"));
    let _telemetry = init_telemetry(telemetry).context("initializing logging")?;

    let config = args
        .sync_config(SyncConfig::from_env())
        .context("building sync configuration")?;

    let (source, source_label): (Arc<dyn RaffleDataSource>, String) = if args.demo {
        let window = config.resolve_window(Utc::now())?;
        let source = demo::demo_source(&window, Utc::now());
        (Arc::new(source) as Arc<dyn RaffleDataSource>, "demo".to_string())
    } else {
        let http = args.http_config(HttpSourceConfig::from_env());
        let source = HttpRaffleSource::new(&http).context("creating HTTP data source")?;
        (Arc::new(source) as Arc<dyn RaffleDataSource>, http.base_url)
    };

    let controller: Controller = LiveSyncController::new(config, source, Arc::new(SystemTimeSource))
        .context("creating live sync controller")?;

    let wallet = args
        .wallet
        .clone()
        .or_else(|| std::env::var("RAFFLE_WALLET_ADDRESS").ok());
    let options = RenderOptions {
        top: args.top,
        leaderboard: args.leaderboard,
    };

    if !args.json {
        let epoch_id = controller.clock().epoch_id();
        for line in render::header(epoch_id, wallet.as_deref(), &source_label) {
            println!("{line}");
        }
    }

    if args.once {
        return run_once(&controller, &args, options).await;
    }

    controller.start().context("starting live sync")?;
    let result = run_live(&controller, &args, options).await;
    controller.shutdown();

    let stats = controller.stats();
    log_event!(
        info,
        "display",
        "Exiting",
        cycles_committed = stats.cycles_committed,
        cycles_failed = stats.cycles_failed,
        cycles_stale = stats.cycles_stale
    );
    result
}

async fn run_once(controller: &Controller, args: &Args, options: RenderOptions) -> Result<()> {
    let outcome = controller.refresh_now().await;
    print_snapshot(&controller.snapshot(), args.json, false)?;
    print_view(&controller.remote_view(), args.json, options)?;

    match outcome {
        CycleOutcome::Committed { sequence } => {
            log_cycle_event!(info, "Fetched once", sequence);
            Ok(())
        }
        CycleOutcome::Failed { error, .. } => bail!("fetch failed: {error}"),
        _ => Ok(()),
    }
}

async fn run_live(controller: &Controller, args: &Args, options: RenderOptions) -> Result<()> {
    let mut snapshots: watch::Receiver<EpochSnapshot> = controller.subscribe_snapshots();
    let mut views: watch::Receiver<RemoteView> = controller.subscribe_remote();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                signal.context("listening for ctrl-c")?;
                log_event!(info, "display", "Interrupted");
                break;
            }
            Ok(()) = snapshots.changed() => {
                let snapshot = *snapshots.borrow_and_update();
                print_snapshot(&snapshot, args.json, true)?;
            }
            Ok(()) = views.changed() => {
                let view = views.borrow_and_update().clone();
                log_cycle_event!(
                    debug,
                    "View received",
                    view.sequence,
                    failed = view.last_fetch_failed
                );
                if view.last_fetch_failed {
                    log_event!(warn, "display", "Showing stale data", error = ?view.last_error);
                }
                print_view(&view, args.json, options)?;
            }
        }
    }

    if !args.json {
        println!();
    }
    Ok(())
}

fn print_snapshot(snapshot: &EpochSnapshot, json: bool, overwrite: bool) -> Result<()> {
    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string(snapshot)?)?;
    } else if overwrite {
        write!(out, "\r{}", render::clock_line(snapshot))?;
        out.flush()?;
    } else {
        writeln!(out, "{}", render::clock_line(snapshot))?;
    }
    Ok(())
}

fn print_view(view: &RemoteView, json: bool, options: RenderOptions) -> Result<()> {
    let mut out = io::stdout().lock();
    if json {
        writeln!(out, "{}", serde_json::to_string(view)?)?;
    } else {
        writeln!(out)?;
        for line in render::remote_block(view, options) {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}
