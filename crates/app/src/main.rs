mod telemetry;
mod terminal;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use geoquiz_core::model::{MapId, RegionCatalogEntry};
use geoquiz_core::score::{format_accuracy, format_duration};
use services::{AppConfig, AppServices, Clock, QuizError, QuizLoopService};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use terminal::{QuestionInput, TerminalPresentation, parse_choice};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidMapId { raw: String },
    InvalidSeed { raw: String },
    InvalidDbUrl { raw: String },
    MapRequired { command: &'static str },
    UnknownMap(MapId),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidMapId { raw } => write!(f, "invalid --map value: {raw:?}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::MapRequired { command } => write!(f, "{command} requires --map <id>"),
            ArgsError::UnknownMap(id) => write!(f, "no map with id {id} in the catalog"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play    [--map <id>] [--seed <n>] [options]");
    eprintln!("  cargo run -p app -- list    [options]");
    eprintln!("  cargo run -p app -- summary [--map <id>] [options]");
    eprintln!("  cargo run -p app -- reset   --map <id> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>     default sqlite://geoquiz.sqlite3");
    eprintln!("  --assets <dir>        directory map assets are resolved against (default .)");
    eprintln!("  --catalog <file>      TOML map catalog (default: built-in maps)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  GEOQUIZ_DB_URL, GEOQUIZ_ASSETS_DIR, GEOQUIZ_CATALOG, LOG_LEVEL, LOG_FORMAT");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    List,
    Play,
    Summary,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "list" => Some(Self::List),
            "play" => Some(Self::Play),
            "summary" => Some(Self::Summary),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    config: AppConfig,
    map: Option<MapId>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("GEOQUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://geoquiz.sqlite3".into(), normalize_sqlite_url);
        let mut assets_root = std::env::var("GEOQUIZ_ASSETS_DIR")
            .ok()
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        let mut catalog_path = std::env::var("GEOQUIZ_CATALOG").ok().map(PathBuf::from);
        let mut map = None;
        let mut rng_seed = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--assets" => assets_root = PathBuf::from(require_value(args, "--assets")?),
                "--catalog" => catalog_path = Some(PathBuf::from(require_value(args, "--catalog")?)),
                "--map" => {
                    let value = require_value(args, "--map")?;
                    let parsed = value
                        .parse::<MapId>()
                        .map_err(|_| ArgsError::InvalidMapId { raw: value.clone() })?;
                    map = Some(parsed);
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    rng_seed = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            config: AppConfig {
                db_url,
                assets_root,
                catalog_path,
                rng_seed,
            },
            map,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

type InputLines = Lines<BufReader<Stdin>>;

async fn prompt_line(
    input: &mut InputLines,
    prompt: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    println!("{prompt}");
    Ok(input.next_line().await?)
}

fn find_map<'a>(services: &'a AppServices, id: &MapId) -> Result<&'a RegionCatalogEntry, ArgsError> {
    services
        .map(id)
        .ok_or_else(|| ArgsError::UnknownMap(id.clone()))
}

async fn choose_map(
    services: &AppServices,
    input: &mut InputLines,
) -> Result<Option<RegionCatalogEntry>, Box<dyn std::error::Error>> {
    let catalog = services.catalog();
    let entries: Vec<&RegionCatalogEntry> = catalog.iter().collect();
    println!("Choose a map:");
    for (i, entry) in entries.iter().enumerate() {
        println!("  {}) {}", i + 1, entry.display_name());
    }
    loop {
        let Some(line) = prompt_line(input, "Map number (q to quit):").await? else {
            return Ok(None);
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        let picked = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| entries.get(i));
        match picked {
            Some(entry) => return Ok(Some((*entry).clone())),
            None => println!("Please enter a number between 1 and {}.", entries.len()),
        }
    }
}

async fn play(
    quiz: &QuizLoopService,
    entry: &RegionCatalogEntry,
    input: &mut InputLines,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}: {}", entry.display_name(), entry.title());
    let mut session = match quiz.start(entry).await {
        Ok(session) => session,
        Err(err) if err.is_start_failure() => {
            eprintln!("could not start {}: {err}", entry.display_name());
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    loop {
        if session.is_complete() {
            let Some(line) = prompt_line(input, "Play again from scratch? [y/N]").await? else {
                return Ok(());
            };
            if line.trim().eq_ignore_ascii_case("y") {
                quiz.reset(&mut session).await?;
                continue;
            }
            return Ok(());
        }

        let Some(question) = session.current_question().cloned() else {
            quiz.resume(&mut session).await?;
            continue;
        };
        let Some(line) = prompt_line(input, "Your answer (number, q to quit):").await? else {
            return Ok(());
        };
        match parse_choice(&line, &question) {
            QuestionInput::Quit => return Ok(()),
            QuestionInput::Invalid => {
                println!("Please pick one of the numbered choices.");
            }
            QuestionInput::Choice(choice) => {
                match quiz.submit_answer(&mut session, &choice).await {
                    Ok(_) => {}
                    Err(QuizError::Storage(err)) => {
                        eprintln!("progress could not be saved: {err}");
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        }
    }
}

async fn print_summaries(
    services: &AppServices,
    only: Option<&MapId>,
) -> Result<(), Box<dyn std::error::Error>> {
    let quiz = services.quiz();
    let catalog = services.catalog();
    for entry in catalog.iter().filter(|e| only.is_none_or(|id| e.id() == id)) {
        if let Some(summary) = quiz.stored_summary(entry).await? {
            println!(
                "{}: {} accuracy {}, {} mistakes, {}",
                entry.display_name(),
                summary.headline(),
                format_accuracy(summary.total_questions(), summary.mistakes()),
                summary.mistakes(),
                format_duration(summary.duration_ms()),
            );
        } else if let Some(progress) = quiz.stored_progress(entry).await? {
            println!(
                "{}: in progress, {} found, {} mistakes",
                entry.display_name(),
                progress.correct.len(),
                progress.mistakes,
            );
        } else {
            println!("{}: not started", entry.display_name());
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.config.db_url)?;
    let services = AppServices::new_sqlite(
        &parsed.config,
        Clock::default_clock(),
        Arc::new(TerminalPresentation),
    )
    .await?;

    match cmd {
        Command::List => {
            for entry in services.catalog().iter() {
                println!(
                    "{:<12} {:<24} {}",
                    entry.id().as_str(),
                    entry.display_name(),
                    entry.asset_path()
                );
            }
            Ok(())
        }
        Command::Summary => print_summaries(&services, parsed.map.as_ref()).await,
        Command::Reset => {
            let id = parsed.map.ok_or(ArgsError::MapRequired { command: "reset" })?;
            let entry = find_map(&services, &id)?;
            services.quiz().reset_stored(entry).await?;
            println!("Progress for {} cleared.", entry.display_name());
            Ok(())
        }
        Command::Play => {
            let mut input = BufReader::new(tokio::io::stdin()).lines();
            let entry = match &parsed.map {
                Some(id) => find_map(&services, id)?.clone(),
                None => match choose_map(&services, &mut input).await? {
                    Some(entry) => entry,
                    None => return Ok(()),
                },
            };
            play(&services.quiz(), &entry, &mut input).await
        }
    }
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
