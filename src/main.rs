mod cli;

use std::process::ExitCode;

use clap::Parser;
use csv_to_sheets::config::AppConfig;
use csv_to_sheets::prettyprint::PrettyFormatter;
use error_stack::ResultExt;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

use cli::args::Args;
use cli::runner::{self, CommandError};

fn setup_tracing(level: tracing::Level) {
    let indicatif_layer = IndicatifLayer::new();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(indicatif_layer.get_stderr_writer());

    Registry::default()
        .with(tracing_subscriber::filter::Targets::new().with_target("csv_to_sheets", level))
        .with(indicatif_layer)
        .with(stderr_layer)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    setup_tracing(args.log_level());

    let result = match AppConfig::load().change_context(CommandError::Config) {
        Ok(config) => runner::run(args.resolve(config)).await,
        Err(report) => Err(report),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            tracing::error!("❌ {:?}", report);
            ExitCode::FAILURE
        }
    }
}
