mod config;
mod contacts;
mod directory;
mod map;
mod notify;
mod page;
mod render;
mod search;
mod translit;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::Config;
use directory::ContactDirectory;
use map::blink::{self, BlinkFrame, Visibility};
use map::controller::{ClickOutcome, FindOutcome, MapController, PlacementMode, CONFIRM_REMOVE};
use map::remote::HttpMapClient;
use map::roster::{self, RosterEntry};
use map::session::SessionEvent;
use map::{PersonId, Point, Viewport};
use notify::TerminalNotifier;
use page::Page;
use render::RenderedView;
use search::FilterCriteria;

const NO_RESULTS: &str = "Контакты не найдены";

#[derive(Parser, Debug)]
#[command(name = "phonebook", about = "Phonebook contact filter and floor-plan placement")]
struct Cli {
    /// Configuration file (defaults to <config dir>/phonebook/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert text typed in the Latin layout to the Cyrillic keys it was meant for
    Translit { text: String },
    /// Filter the contact cards of a saved phonebook page
    Filter(FilterArgs),
    /// List the organizations a phonebook page can be filtered by
    Orgs(PageArgs),
    /// Live filter: every stdin line is a new search text
    Browse(PageArgs),
    /// Floor-plan placements
    #[command(subcommand)]
    Map(MapCommand),
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long, value_name = "FILE")]
    page: PathBuf,
}

#[derive(Args, Debug)]
struct FilterArgs {
    #[arg(long, value_name = "FILE")]
    page: PathBuf,

    #[arg(long, default_value = "")]
    search: String,

    /// Exact organization name
    #[arg(long, default_value = "")]
    org: String,

    /// Print only the counter line
    #[arg(long, default_value_t = false)]
    count_only: bool,
}

#[derive(Subcommand, Debug)]
enum MapCommand {
    /// List the people of an admin map page
    Roster {
        #[arg(long, value_name = "FILE")]
        page: PathBuf,

        #[arg(long, default_value = "")]
        search: String,
    },
    /// Place a person at X,Y on the plan
    Place {
        id: String,
        #[arg(value_parser = finite_coordinate, allow_negative_numbers = true)]
        x: f64,
        #[arg(value_parser = finite_coordinate, allow_negative_numbers = true)]
        y: f64,

        /// Admin map page providing the roster and CSRF token
        #[arg(long, value_name = "FILE")]
        page: Option<PathBuf>,

        /// Name shown while placing (defaults to the roster name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Take a person off the plan
    Remove {
        id: String,

        #[arg(long, value_name = "FILE")]
        page: Option<PathBuf>,

        /// Do not ask for confirmation
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
    /// Show where a person's marker is and how it blinks
    Find {
        id: String,

        #[arg(long, value_name = "FILE")]
        page: PathBuf,

        #[arg(long, default_value_t = 1200.0)]
        width: f64,

        #[arg(long, default_value_t = 800.0)]
        height: f64,
    },
    /// Drive the plan with events read from stdin, one per line
    Session {
        #[arg(long, value_name = "FILE")]
        page: Option<PathBuf>,

        #[arg(long, default_value_t = 1200.0)]
        width: f64,

        #[arg(long, default_value_t = 800.0)]
        height: f64,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    if let Some(path) = &config.config_path {
        tracing::debug!("loaded configuration from {}", path.display());
    }

    match cli.command {
        Command::Translit { text } => {
            println!("{}", translit::transliterate(&text));
            Ok(ExitCode::SUCCESS)
        }
        Command::Filter(args) => handle_filter(args, &config),
        Command::Orgs(args) => handle_orgs(args, &config),
        Command::Browse(args) => handle_browse(args, &config),
        Command::Map(command) => handle_map(command, &config).await,
    }
}

fn handle_filter(args: FilterArgs, config: &Config) -> Result<ExitCode> {
    let page = Page::read(&args.page)?;
    let directory = ContactDirectory::load(&page, config.directory.clone())?;
    if directory.snapshot().is_empty() {
        tracing::warn!("no contact cards found in {}", args.page.display());
    }
    let view = directory.filter(&FilterCriteria::new(args.search, args.org));

    if !args.count_only {
        println!("{}", view.html);
    }
    println!("{}", view.counter_text);
    if view.show_no_results {
        println!("{}", NO_RESULTS);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_orgs(args: PageArgs, config: &Config) -> Result<ExitCode> {
    let page = Page::read(&args.page)?;
    let directory = ContactDirectory::load(&page, config.directory.clone())?;
    for org in contacts::organizations(&page, directory.snapshot())? {
        println!("{}", org);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_browse(args: PageArgs, config: &Config) -> Result<ExitCode> {
    let page = Page::read(&args.page)?;
    let mut directory = ContactDirectory::load(&page, config.directory.clone())?;

    let mut out = io::stdout().lock();
    print_view(&mut out, &directory, &directory.view())?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read from stdin")?;
        let view = match line.trim_end_matches('\r') {
            ":quit" | ":q" => break,
            ":clear" => directory.clear(),
            ":org" => directory.set_organization(""),
            command if command.starts_with(":org ") => {
                directory.set_organization(command[":org ".len()..].trim())
            }
            text => directory.set_search(text),
        };
        print_view(&mut out, &directory, &view)?;
    }
    Ok(ExitCode::SUCCESS)
}

fn print_view(out: &mut impl Write, directory: &ContactDirectory, view: &RenderedView) -> Result<()> {
    writeln!(out, "{}", view.counter_text)?;
    if view.show_no_results {
        writeln!(out, "{}", NO_RESULTS)?;
    }
    for name in directory.visible_names() {
        writeln!(out, "  {}", name)?;
    }
    out.flush()?;
    Ok(())
}

async fn handle_map(command: MapCommand, config: &Config) -> Result<ExitCode> {
    match command {
        MapCommand::Roster { page, search } => {
            let roster = roster::parse_roster(&Page::read(&page)?)?;
            for entry in roster::search(&roster, &search) {
                print_roster_entry(entry);
            }
            Ok(ExitCode::SUCCESS)
        }
        MapCommand::Place { id, x, y, page, name } => {
            let person = PersonId::new(id)?;
            let mut controller = map_controller(page.as_deref(), config)?;
            let name = name
                .or_else(|| controller.roster_entry(&person).map(|entry| entry.name.clone()))
                .unwrap_or_else(|| person.to_string());

            let point = Point::try_new(x, y)?;
            controller.begin_placement(person.clone(), name);
            match controller.click_map(point).await {
                ClickOutcome::Saved => {
                    if let Some(marker) = controller.marker(&person) {
                        println!("{}\t{}", marker.person, marker.position);
                    }
                    Ok(ExitCode::SUCCESS)
                }
                ClickOutcome::Failed | ClickOutcome::Ignored => Ok(ExitCode::FAILURE),
            }
        }
        MapCommand::Remove { id, page, yes } => {
            let person = PersonId::new(id)?;
            if !yes && !confirm(CONFIRM_REMOVE)? {
                return Ok(ExitCode::SUCCESS);
            }
            let mut controller = map_controller(page.as_deref(), config)?;
            if controller.remove(&person).await {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        MapCommand::Find {
            id,
            page,
            width,
            height,
        } => {
            let person = PersonId::new(id)?;
            let mut controller = map_controller(Some(&page), config)?;
            let Some(found) = controller.find(&person, Viewport { width, height }) else {
                println!("{} is not on the map", person);
                return Ok(ExitCode::FAILURE);
            };
            print_found(&found);
            Ok(ExitCode::SUCCESS)
        }
        MapCommand::Session {
            page,
            width,
            height,
        } => {
            let controller = map_controller(page.as_deref(), config)?;
            run_session(controller, Viewport { width, height }).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_session(
    mut controller: MapController<HttpMapClient, TerminalNotifier>,
    viewport: Viewport,
) -> Result<()> {
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read from stdin")?;
        let event = match SessionEvent::parse(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("error: {:#}", err);
                continue;
            }
        };

        match event {
            SessionEvent::Quit => break,
            SessionEvent::Place { person, name } => {
                let name = name
                    .or_else(|| controller.roster_entry(&person).map(|entry| entry.name.clone()))
                    .unwrap_or_else(|| person.to_string());
                controller.begin_placement(person, name);
            }
            SessionEvent::Cancel => controller.cancel_placement(),
            SessionEvent::Click(point) => {
                controller.click_map(point).await;
            }
            SessionEvent::MouseDown(button, pointer) => {
                controller.mouse_down(button, pointer);
            }
            SessionEvent::MouseMove { held, pointer } => {
                if let Some(scroll) = controller.mouse_move(held, pointer) {
                    println!("scroll {},{}", scroll.left, scroll.top);
                }
            }
            SessionEvent::MouseUp => controller.mouse_up(),
            SessionEvent::Find(person) => match controller.find(&person, viewport) {
                Some(found) => {
                    println!("scroll {},{}", found.scroll.left, found.scroll.top);
                    blink::play(|frame| print_frame(&frame)).await;
                }
                None => println!("{} is not on the map", person),
            },
            SessionEvent::Remove(person) => {
                controller.remove(&person).await;
            }
            SessionEvent::Search(text) => {
                for entry in controller.search_roster(&text) {
                    print_roster_entry(entry);
                }
            }
            SessionEvent::Markers => {
                for marker in controller.markers() {
                    println!("{}\t{}", marker.person, marker.position);
                }
            }
            SessionEvent::State => {
                let mode = match controller.mode() {
                    PlacementMode::Idle => "idle".to_string(),
                    PlacementMode::Placing { person, name } => format!("placing {} ({})", person, name),
                };
                let scroll = controller.scroll();
                println!(
                    "{}; cursor {:?}; scroll {},{}",
                    mode,
                    controller.cursor(),
                    scroll.left,
                    scroll.top
                );
            }
        }
    }
    Ok(())
}

fn print_found(found: &FindOutcome) {
    println!("scroll {},{}", found.scroll.left, found.scroll.top);
    for frame in &found.blink {
        print_frame(frame);
    }
}

fn print_frame(frame: &BlinkFrame) {
    let state = match frame.visibility {
        Visibility::Hidden => "hide",
        Visibility::Shown => "show",
    };
    println!("{}ms {}", frame.at.as_millis(), state);
}

fn map_controller(
    page: Option<&Path>,
    config: &Config,
) -> Result<MapController<HttpMapClient, TerminalNotifier>> {
    let (roster, page_token) = match page {
        Some(path) => {
            let page = Page::read(path)?;
            (roster::parse_roster(&page)?, page.csrf_token())
        }
        None => (Vec::new(), String::new()),
    };
    let csrf_token = config.csrf_token.clone().unwrap_or(page_token);
    let remote = HttpMapClient::new(&config.base_url, csrf_token, config.timeout)
        .context("failed to build HTTP client")?;
    Ok(MapController::new(remote, TerminalNotifier, roster))
}

fn print_roster_entry(entry: &RosterEntry) {
    let coordinates = entry
        .coordinates
        .map(|point| point.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{}\t{}\t{}\t{}\t{}",
        entry.id, entry.name, entry.title, entry.department, coordinates
    );
}

/// Coordinates are sent as `x,y` text, which has no spelling for NaN or infinity.
fn finite_coordinate(raw: &str) -> Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(format!("`{}` is not a finite number", raw)),
        Err(err) => Err(err.to_string()),
    }
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "д" | "да"))
}
