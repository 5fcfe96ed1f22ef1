mod config;
mod graphql;
mod http;
mod session;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use platform_obs::{ObsConfig, init_tracing};
use products_hr::{HrModule, attendance::AttendanceWindow};
use serde_json::json;
use tracing::info;

use crate::{
    config::AppConfig,
    graphql::GraphqlData,
    http::{AppState, ServeConfig},
    session::SessionStore,
};

#[derive(Parser, Debug)]
#[command(name = "dayflow-hr", version, about = "Dayflow HR dashboard backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP + GraphQL server.
    Serve(ServeCommand),
    /// Print a summary of the generated demo dataset as JSON.
    Seed,
    /// Print the GraphQL schema snapshot.
    #[command(name = "schema:print")]
    SchemaPrint {
        #[arg(long, value_name = "FILE", help = "Destination file path")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl From<ServeCommand> for ServeConfig {
    fn from(value: ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(ObsConfig::from_env())?;
    let cli = Cli::parse();
    let app_config = Arc::new(AppConfig::load()?);
    let hr = Arc::new(HrModule::seeded(app_config.dataset));
    match cli.command {
        Command::Serve(cmd) => run_server(cmd, app_config, hr).await,
        Command::Seed => run_seed(&hr),
        Command::SchemaPrint { output } => schema_print(output, &app_config, hr),
    }
}

fn graphql_data(config: &AppConfig, hr: Arc<HrModule>) -> GraphqlData {
    GraphqlData {
        hr,
        leave_allowance: config.leave_allowance,
    }
}

fn run_seed(hr: &HrModule) -> Result<()> {
    let window = AttendanceWindow::month_to_date(hr.today());
    let present = hr.attendance().iter().filter(|r| r.is_present()).count();
    let book = hr.time_off_book();
    let summary = json!({
        "referenceDate": hr.today(),
        "window": { "start": window.start, "end": window.end },
        "employees": hr.employees().len(),
        "attendance": {
            "records": hr.attendance().len(),
            "present": present,
            "absent": hr.attendance().len() - present,
        },
        "timeOff": book.requests().len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn schema_print(path: Option<PathBuf>, config: &AppConfig, hr: Arc<HrModule>) -> Result<()> {
    let sdl = graphql::build_schema(graphql_data(config, hr)).sdl();
    match path {
        Some(target) => {
            std::fs::write(&target, sdl)
                .with_context(|| format!("failed to write {}", target.display()))?;
            info!(path = %target.display(), "schema snapshot written");
        }
        None => print!("{sdl}"),
    }
    Ok(())
}

async fn run_server(cmd: ServeCommand, config: Arc<AppConfig>, hr: Arc<HrModule>) -> Result<()> {
    let schema = graphql::build_schema(graphql_data(&config, hr.clone()));
    let cookie_key = config.cookie_key.clone();
    let state = AppState {
        schema,
        sessions: SessionStore::new(config.session_ttl),
        config,
        hr,
        cookie_key,
    };
    http::serve(cmd.into(), state).await
}
