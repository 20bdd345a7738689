use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tokio::time::{Instant, sleep};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use knightpath_core::app::{AppBuilder, ResultView, SubmitRequest};
use knightpath_core::config::PipelineConfig;

#[derive(Parser, Debug)]
#[command(name = "knightpath")]
#[command(version)]
#[command(about = "Submit a knight path job and poll for the shortest path")]
struct Args {
    /// Start square (e.g. A1)
    source: String,

    /// End square (e.g. H8)
    target: String,

    /// Number of deliveries processed concurrently (overrides KNIGHTPATH_WORKER_CONCURRENCY)
    #[arg(long)]
    workers: Option<usize>,

    /// How often the result is polled, in milliseconds
    #[arg(long, default_value = "50")]
    poll_ms: u64,

    /// Give up waiting for the result after this many milliseconds
    #[arg(long, default_value = "10000")]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    if let Some(workers) = args.workers {
        config.worker_concurrency = workers;
    }

    let app = match AppBuilder::in_memory(config).build() {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "failed to build pipeline");
            return ExitCode::FAILURE;
        }
    };

    // (A) worker を起動
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_loop = app.worker_loop();
    let worker = tokio::spawn(async move { worker_loop.run(shutdown_rx).await });

    // (B) 投入
    let request = SubmitRequest {
        source: args.source,
        target: args.target,
    };
    let code = match app.admission.handle(&request).await {
        Ok(response) => {
            print_json(&response);
            match response.job_id {
                // (C) 完了をポーリングで待つ
                Some(job_id) => {
                    let poll = Duration::from_millis(args.poll_ms);
                    let deadline = Instant::now() + Duration::from_millis(args.timeout_ms);
                    loop {
                        match app.results.get_result(job_id).await {
                            Ok(ResultView::Processing { .. }) if Instant::now() < deadline => {
                                sleep(poll).await;
                            }
                            Ok(view @ ResultView::Completed(_)) => {
                                print_json(&view);
                                break ExitCode::SUCCESS;
                            }
                            Ok(view) => {
                                print_json(&view);
                                break ExitCode::FAILURE;
                            }
                            Err(e) => {
                                error!(%job_id, error = %e, status = e.status_code(), "result query failed");
                                break ExitCode::FAILURE;
                            }
                        }
                    }
                }
                None => ExitCode::from(2),
            }
        }
        Err(e) => {
            error!(error = %e, status = e.status_code(), "submission failed");
            ExitCode::FAILURE
        }
    };

    // (D) worker を止める
    let _ = shutdown_tx.send(true);
    if let Err(e) = worker.await {
        error!(error = %e, "worker loop did not shut down cleanly");
    }
    info!("done");
    code
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => error!(error = %e, "failed to serialize output"),
    }
}
