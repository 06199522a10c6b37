use anyhow::{bail, Context, Result};
use citypulse_core::{App, AppError, Config, PlaceCategory};
use citypulse_dashboard::{suggest, Dashboard, DashboardReport};
use citypulse_providers::{Providers, DEFAULT_PHOTO_WIDTH};

const USAGE: &str = "\
Usage:
  citypulse [--category <id>] [<city>]   show the dashboard (defaults to the last city)
  citypulse history                      list recently searched cities
  citypulse suggest <term>               suggest popular city names
  citypulse photo <reference> <file>     download a place photo
  citypulse config                       check the configuration";

#[derive(Debug, PartialEq)]
enum Command {
    Show {
        city: Option<String>,
        category: Option<PlaceCategory>,
    },
    History,
    Suggest(String),
    Photo {
        reference: String,
        file: String,
    },
    Config,
    Help,
}

fn parse_args(args: &[String]) -> Result<Command> {
    match args.first().map(String::as_str) {
        Some("history") => Ok(Command::History),
        Some("config") => Ok(Command::Config),
        Some("help" | "--help" | "-h") => Ok(Command::Help),
        Some("suggest") => {
            let term = args[1..].join(" ");
            if term.trim().is_empty() {
                bail!("suggest needs a search term");
            }
            Ok(Command::Suggest(term))
        }
        Some("photo") => match &args[1..] {
            [reference, file] => Ok(Command::Photo {
                reference: reference.clone(),
                file: file.clone(),
            }),
            _ => bail!("photo needs a photo reference and an output file"),
        },
        _ => {
            let mut category = None;
            let mut words = Vec::new();
            let mut rest = args.iter();
            while let Some(arg) = rest.next() {
                if arg == "--category" || arg == "-c" {
                    let id = rest.next().context("--category needs a value")?;
                    category = Some(id.parse::<PlaceCategory>()?);
                } else {
                    words.push(arg.as_str());
                }
            }
            let city = words.join(" ");
            Ok(Command::Show {
                city: (!city.trim().is_empty()).then_some(city),
                category,
            })
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    citypulse_core::init()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_args(&args)? {
        Command::Help => println!("{USAGE}"),
        Command::Suggest(term) => {
            for city in suggest(&term) {
                println!("{city}");
            }
        }
        Command::Config => check_config()?,
        Command::History => {
            let app = App::new()?;
            let recent = app.recency().recent()?;
            if recent.is_empty() {
                println!("No recent searches.");
            }
            for (i, city) in recent.iter().enumerate() {
                println!("{}. {}", i + 1, city);
            }
        }
        Command::Photo { reference, file } => {
            let app = App::new()?;
            let providers = Providers::from_config(app.config())?;
            let photo = providers
                .places
                .photo(&reference, DEFAULT_PHOTO_WIDTH)
                .await
                .map_err(user_facing)?;
            std::fs::write(&file, &photo.bytes)
                .with_context(|| format!("Failed to write {file}"))?;
            println!("Saved {} ({}, {} bytes)", file, photo.content_type, photo.bytes.len());
        }
        Command::Show { city, category } => show(city, category).await?,
    }

    Ok(())
}

/// Turn a domain error into the message shown on the terminal.
fn user_facing(err: impl Into<AppError>) -> anyhow::Error {
    anyhow::anyhow!("{}", err.into().user_message())
}

async fn show(city: Option<String>, category: Option<PlaceCategory>) -> Result<()> {
    let app = App::new()?;
    let mut dashboard = Dashboard::from_config(app.config())?.with_recency(app.recency());
    if let Some(category) = category {
        dashboard.select_category(category);
    }

    match city {
        Some(city) => {
            dashboard
                .select_city(&city)
                .map_err(user_facing)?;
        }
        None => {
            if dashboard.restore_last_city().map_err(user_facing)?.is_none() {
                println!("No city given and no recent searches.\n\n{USAGE}");
                return Ok(());
            }
        }
    }

    dashboard.settle().await;
    print!("{}", DashboardReport::new(dashboard.view()));
    Ok(())
}

fn check_config() -> Result<()> {
    let config = Config::load()?;
    let validation = config.validate();

    println!("Configuration directory: {}", config.config_dir.display());
    for error in &validation.errors {
        println!("error: {error}");
    }
    for warning in &validation.warnings {
        println!("warning: {warning}");
    }
    if validation.is_valid() {
        println!("Configuration OK.");
        Ok(())
    } else {
        bail!("configuration has {} error(s)", validation.errors.len())
    }
}
