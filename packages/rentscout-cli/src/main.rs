use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rentscout::{
    ai::openai::OpenAiRater,
    routing::{OrsRouter, RateLimitedRouter},
    traits::pages::HttpPageSource,
    types::rating::ReportOutcome,
    FileStore, Pipeline, PipelinePreset, RunMode, ScoutConfig,
};

#[derive(Parser)]
#[command(name = "rentscout", about = "Rental listing discovery and ranking")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline for a city and print the ranked report.
    Run {
        /// City path segment of the search site, e.g. "dublin-city".
        #[arg(default_value = "dublin-city")]
        city: String,

        /// Reuse the cached fetch artifacts instead of hitting the site.
        #[arg(long, conflicts_with = "skip_all")]
        skip_fetch: bool,

        /// Reuse the enriched output and only re-rank.
        #[arg(long)]
        skip_all: bool,

        /// Which tuning preset to score with.
        #[arg(long, value_enum, default_value_t = Preset::WideNet)]
        preset: Preset,
    },
    /// Produce a one-off AI report for a single listing URL.
    Inspect {
        /// Full listing URL.
        url: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    WideNet,
    NearOffice,
}

impl From<Preset> for PipelinePreset {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::WideNet => PipelinePreset::wide_net(),
            Preset::NearOffice => PipelinePreset::near_office(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rentscout=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    // Load environment variables
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = ScoutConfig::from_env().context("incomplete environment configuration")?;

    match cli.command {
        Command::Run {
            city,
            skip_fetch,
            skip_all,
            preset,
        } => {
            let mode = if skip_all {
                RunMode::SkipAll
            } else if skip_fetch {
                RunMode::SkipFetch
            } else {
                RunMode::Full
            };
            let preset: PipelinePreset = preset.into();

            let pages = HttpPageSource::new();
            let router = RateLimitedRouter::new(
                OrsRouter::new(config.openrouteservice_api_key),
                preset.route_calls_per_minute,
            );
            let rater = OpenAiRater::new(config.openai_api_key);
            let store = FileStore::new(config.cache_dir, config.output_dir);

            let pipeline = Pipeline::new(&pages, &router, &rater, &store, preset, config.work);
            let ranked = pipeline.run(&city, mode).await?;

            tracing::info!(city = %city, listings = ranked.len(), "run finished");
            for listing in &ranked {
                println!("{} - {}", listing.name, listing.score);
            }
        }
        Command::Inspect { url } => {
            let rater = OpenAiRater::new(config.openai_api_key);
            match rater.report(&url, config.work).await? {
                ReportOutcome::Reported(report) => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                ReportOutcome::Refused => {
                    println!("the model declined to report on {url}");
                }
            }
        }
    }

    Ok(())
}
