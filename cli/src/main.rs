mod config;
mod logging;
mod output;
mod shell;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use shared::navigation::DevicePlatform;
use shared::{Event, LaunchId, UserLocation};

use crate::config::CliConfig;
use crate::shell::Shell;

#[derive(Parser, Debug)]
#[command(name = "launches")]
#[command(about = "Browse SpaceX launches from the terminal")]
struct Args {
    /// TOML config file; built-in defaults when omitted.
    #[arg(long, env = "LAUNCHES_CONFIG")]
    config: Option<PathBuf>,
    /// Overrides the API base URL from the config.
    #[arg(long, env = "LAUNCHES_API_URL")]
    api_url: Option<String>,
    /// Device flavour used for directions links: ios, android or web.
    #[arg(long, value_parser = parse_platform)]
    platform: Option<DevicePlatform>,
    #[arg(long)]
    log_level: Option<String>,
    /// Print the view model as JSON instead of text.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Most recent launches first.
    List {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Launches whose name matches QUERY.
    Search { query: String },
    /// Details of the first launch matching QUERY.
    Show {
        query: String,
        /// Your position as LAT,LON, for the distance to the launchpad.
        #[arg(long, value_parser = parse_position)]
        from: Option<UserLocation>,
        /// Print a directions link to the launchpad.
        #[arg(long)]
        directions: bool,
        /// Print the webcast link.
        #[arg(long)]
        webcast: bool,
    },
}

fn parse_platform(s: &str) -> Result<DevicePlatform, String> {
    match s.to_ascii_lowercase().as_str() {
        "ios" => Ok(DevicePlatform::Ios),
        "android" => Ok(DevicePlatform::Android),
        "web" => Ok(DevicePlatform::Web),
        other => Err(format!("unknown platform '{other}'")),
    }
}

fn parse_position(s: &str) -> Result<UserLocation, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| "expected LAT,LON".to_string())?;
    let latitude: f64 = lat.trim().parse().map_err(|e| format!("latitude: {e}"))?;
    let longitude: f64 = lon.trim().parse().map_err(|e| format!("longitude: {e}"))?;
    let location = UserLocation {
        latitude,
        longitude,
        accuracy: None,
    };
    location.coordinate().map_err(|e| e.to_string())?;
    Ok(location)
}

fn load_config(args: &Args) -> Result<CliConfig> {
    let mut config = match &args.config {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    };
    if let Some(url) = &args.api_url {
        config.app.api_base_url.clone_from(url);
    }
    if let Some(platform) = args.platform {
        config.app.platform = platform;
    }
    if let Some(level) = &args.log_level {
        config.log_level.clone_from(level);
    }
    config.app.validate().context("invalid configuration")?;
    Ok(config)
}

fn print_view(shell: &Shell, json: bool) -> Result<()> {
    let view = shell.view();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }
    match &view.detail {
        Some(detail) => print!("{}", output::detail_text(detail)),
        None => print!("{}", output::list_text(&view.list)),
    }
    for url in shell.opened_urls() {
        println!("{url}");
    }
    if let Some(alert) = &view.alert {
        eprintln!("{}", output::alert_text(alert));
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    logging::init_logging(&config.log_level);
    tracing::debug!(?config, "starting");

    let position = match &args.command {
        Command::Show { from, .. } => *from,
        _ => None,
    };
    let mut shell = Shell::new(position)?;
    shell
        .dispatch(Event::Configure {
            config: Box::new(config.app),
        })
        .await?;
    shell
        .dispatch(Event::Tick {
            now_ms: chrono::Utc::now().timestamp_millis(),
        })
        .await?;
    shell.dispatch(Event::ListOpened).await?;

    match args.command {
        Command::List { pages } => {
            for _ in 1..pages {
                let shown = output::cards(&shell.view().list).len();
                shell.dispatch(Event::LoadMoreRequested).await?;
                if output::cards(&shell.view().list).len() == shown {
                    break;
                }
            }
        }
        Command::Search { query } => {
            shell.dispatch(Event::SearchQueryChanged { query }).await?;
        }
        Command::Show {
            query,
            directions,
            webcast,
            ..
        } => {
            shell
                .dispatch(Event::SearchQueryChanged {
                    query: query.clone(),
                })
                .await?;
            let view = shell.view();
            let Some(launch_id) = output::cards(&view.list)
                .first()
                .map(|card| LaunchId::new(card.id.as_str()))
            else {
                print_view(&shell, args.json)?;
                bail!("no launch matches '{query}'");
            };
            shell.dispatch(Event::LaunchSelected { launch_id }).await?;
            if directions {
                shell.dispatch(Event::OpenMapsRequested).await?;
            }
            if webcast {
                shell.dispatch(Event::OpenWebcastRequested).await?;
            }
        }
    }

    print_view(&shell, args.json)?;
    if let Some(error) = output::list_error(&shell.view().list) {
        bail!("{error}");
    }
    Ok(())
}
