use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

mod config;
mod error;
mod intake;
mod models;
mod planner;
mod report;
mod server;

use config::ServerConfig;
use planner::{Clock, FixedClock, SystemClock};

#[derive(Parser)]
#[command(name = "study-planner")]
#[command(about = "Spread chapters across the days left before each exam", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a study plan from a JSON or CSV request file
    Plan {
        #[arg(long)]
        input: PathBuf,
        /// Daily study hours; required for CSV input, overrides JSON
        #[arg(long)]
        daily_hours: Option<u32>,
        /// Plan as if today were this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Serve the plan generator over HTTP
    Serve {
        #[arg(long, env = "STUDY_PLANNER_BIND", default_value = ServerConfig::DEFAULT_BIND)]
        bind: String,
        #[arg(long, env = "STUDY_PLANNER_PORT", default_value_t = ServerConfig::DEFAULT_PORT)]
        port: u16,
        #[arg(
            long,
            env = "ALLOWED_ORIGINS",
            value_delimiter = ',',
            default_value = ServerConfig::DEFAULT_ORIGINS
        )]
        allowed_origins: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            input,
            daily_hours,
            today,
            format,
            out,
        } => {
            let mut request = load_request(&input, daily_hours)?;
            if let Some(hours) = daily_hours {
                request.daily_hours = hours;
            }
            intake::validate_request(&request)?;

            let clock: Box<dyn Clock> = match today {
                Some(date) => Box::new(FixedClock(date)),
                None => Box::new(SystemClock),
            };
            let plan = planner::distribute(&request, clock.today())?;
            let unscheduled = planner::unscheduled_chapters(&request, &plan);

            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&plan)?,
                OutputFormat::Markdown => report::build_report(&plan, &unscheduled),
            };

            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!(
                        "Plan with {} days written to {}.",
                        plan.total_days,
                        path.display()
                    );
                }
                None => println!("{rendered}"),
            }

            if !unscheduled.is_empty() {
                eprintln!(
                    "{} chapters did not fit before their exam dates.",
                    unscheduled.len()
                );
            }
        }
        Commands::Serve {
            bind,
            port,
            allowed_origins,
        } => {
            let config = ServerConfig::new(bind, port, allowed_origins);
            let state = server::AppState::new(Arc::new(SystemClock));
            server::run_serve(state, config).await?;
        }
    }

    Ok(())
}

fn load_request(input: &Path, daily_hours: Option<u32>) -> anyhow::Result<models::StudyPlanRequest> {
    let is_csv = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        let Some(hours) = daily_hours else {
            bail!("--daily-hours is required for CSV input");
        };
        intake::load_csv(input, hours)
    } else {
        intake::load_json(input)
    }
}
