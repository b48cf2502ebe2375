//! Main entry point for nsigdec CLI

use clap::Parser;
use nsigdec::cli::{report_error, Args};
use nsigdec::utils::quiet::suppression_filter;
use nsigdec::{Invoker, NsigError};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Missing or extra positionals exit with status 2 here
    let args = Args::parse();

    init_logging(args.log_level());
    debug!("Starting nsigdec with args: {:?}", args);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("Invocation failed: {:?}", e);
            report_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(args: &Args) -> Result<(), NsigError> {
    let engine = args.build_engine()?;
    let request = args.request();

    let mut invoker = Invoker::new(engine);
    debug!("Using {} engine", invoker.engine_name());

    // Not locked up front: an in-process engine may write to stdout from
    // another thread while the call is pending.
    invoker.run(&request, &mut std::io::stdout()).await?;

    Ok(())
}

/// Initialize logging system
fn init_logging(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // stdout carries only the decoded value
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .compact()
                .with_filter(suppression_filter()),
        )
        .init();
}
