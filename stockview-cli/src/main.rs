//! stockview command line
//!
//! `stockview serve` runs the stock API; `stockview board` runs the rotating
//! terminal display board against it (or against an in-process demo store).

mod render;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stockview::client::{EnginePageSource, HttpPageSource, PageSource};
use stockview::display::{BoardController, BoardEvent, BoardHandle, DisplaySession};
use stockview::http::{serve, StockService};
use stockview::query::StockQueryPlanner;
use stockview::{seed, MemoryStore, PgStockStore, ServiceConfig, StockEngine, StockStore};

#[derive(Parser)]
#[command(name = "stockview")]
#[command(about = "Warehouse stock API and display board")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve /api/getData
    Serve {
        /// Serve from memory instead of PostgreSQL
        #[arg(long)]
        memory: bool,

        /// CSV export of the stock view to serve from memory
        #[arg(long)]
        seed: Option<PathBuf>,

        /// Serve this many generated demo rows from memory
        #[arg(long)]
        demo: Option<usize>,

        /// Listen address (default: server.host:server.port)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Show the rotating display board
    Board {
        /// Service root URL (default: display.api_url)
        #[arg(long)]
        api_url: Option<String>,

        /// Initial search term
        #[arg(long, default_value = "")]
        search: String,

        /// Seconds between automatic page changes
        #[arg(long)]
        interval: Option<u64>,

        /// Cards per page
        #[arg(long)]
        page_size: Option<u32>,

        /// Start with auto-slide off
        #[arg(long)]
        no_auto_slide: bool,

        /// Show generated demo rows without a running service
        #[arg(long)]
        demo: Option<usize>,
    },
}

const DEMO_SEED: u64 = 42;

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = ServiceConfig::load().context("loading configuration")?;

    match cli.command {
        Commands::Serve {
            memory,
            seed,
            demo,
            bind,
        } => {
            let bind = bind.unwrap_or_else(|| config.server.bind_addr());
            if memory || seed.is_some() || demo.is_some() {
                let store = memory_store(&config, seed.as_deref(), demo)?;
                run_server(store, &config, &bind)
            } else {
                let planner = StockQueryPlanner::new(config.stock.table.clone(), config.stock.grouping);
                let store = PgStockStore::connect(
                    &config.database.url,
                    config.database.max_connections,
                    config.database.pool_timeout(),
                    planner,
                )?;
                run_server(store, &config, &bind)
            }
        }
        Commands::Board {
            api_url,
            search,
            interval,
            page_size,
            no_auto_slide,
            demo,
        } => {
            let display = &config.display;
            let source: Arc<dyn PageSource> = match demo {
                Some(n) => {
                    let store = MemoryStore::new(seed::demo_rows(n, DEMO_SEED), config.stock.grouping);
                    Arc::new(EnginePageSource::new(
                        Arc::new(StockEngine::new(store)),
                        config.stock.max_page_size,
                    ))
                }
                None => {
                    let url = api_url.unwrap_or_else(|| display.api_url.clone());
                    log::info!("reading stock from {url}");
                    Arc::new(HttpPageSource::new(&url, display.request_timeout()))
                }
            };
            let session = DisplaySession::new(
                page_size.unwrap_or(display.page_size),
                interval.map_or_else(|| display.slide_interval(), |s| Duration::from_secs(s.max(1))),
                display.auto_slide && !no_auto_slide,
            );
            run_board(session, source, &search);
            Ok(())
        }
    }
}

fn memory_store(
    config: &ServiceConfig,
    seed_file: Option<&std::path::Path>,
    demo: Option<usize>,
) -> anyhow::Result<MemoryStore> {
    let mut rows = Vec::new();
    if let Some(path) = seed_file {
        rows.extend(seed::load_csv(path).with_context(|| format!("reading {}", path.display()))?);
    }
    if let Some(n) = demo {
        rows.extend(seed::demo_rows(n, DEMO_SEED));
    }
    log::info!("serving {} rows from memory", rows.len());
    Ok(MemoryStore::new(rows, config.stock.grouping))
}

fn run_server<S: StockStore + 'static>(store: S, config: &ServiceConfig, bind: &str) -> anyhow::Result<()> {
    let engine = Arc::new(StockEngine::new(store));
    let service = StockService::new(engine, &config.stock);
    let server = serve(bind, service).map_err(|e| anyhow!("Error while trying to run server: {e}"))?;
    server
        .join()
        .map_err(|e| anyhow!("Server encountered an error: {e:?}"))
}

fn run_board(session: DisplaySession, source: Arc<dyn PageSource>, search: &str) {
    let renderer = render::TerminalRenderer::new(true);
    let (controller, handle) = BoardController::new(session, source, renderer, search);
    std::thread::spawn(move || read_commands(handle));
    controller.run();
}

/// Stdin commands: `n`, `p`, a page number, `/term`, `r`, `a`, `q`.
fn read_commands(handle: BoardHandle) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let Some(event) = parse_command(&line) else {
            continue;
        };
        let quit = matches!(event, BoardEvent::Shutdown);
        if !handle.send(event) || quit {
            return;
        }
    }
    handle.shutdown();
}

fn parse_command(line: &str) -> Option<BoardEvent> {
    let line = line.trim();
    if let Some(term) = line.strip_prefix('/') {
        return Some(BoardEvent::Search(term.to_string()));
    }
    if let Ok(page) = line.parse::<u32>() {
        return Some(BoardEvent::GoToPage(page));
    }
    match line {
        "n" => Some(BoardEvent::NextPage),
        "p" => Some(BoardEvent::PreviousPage),
        "r" => Some(BoardEvent::Refresh),
        "a" => Some(BoardEvent::ToggleAutoSlide),
        "q" => Some(BoardEvent::Shutdown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert!(matches!(parse_command("n"), Some(BoardEvent::NextPage)));
        assert!(matches!(parse_command(" 3 "), Some(BoardEvent::GoToPage(3))));
        assert!(matches!(parse_command("/abc mill"), Some(BoardEvent::Search(t)) if t == "abc mill"));
        assert!(matches!(parse_command("/"), Some(BoardEvent::Search(t)) if t.is_empty()));
        assert!(matches!(parse_command("q"), Some(BoardEvent::Shutdown)));
        assert!(parse_command("zzz").is_none());
    }

    #[test]
    fn test_cli_parses_board_flags() {
        let cli = Cli::try_parse_from(["stockview", "board", "--search", "F100", "--no-auto-slide", "--interval", "5"])
            .unwrap();
        match cli.command {
            Commands::Board {
                search,
                no_auto_slide,
                interval,
                ..
            } => {
                assert_eq!(search, "F100");
                assert!(no_auto_slide);
                assert_eq!(interval, Some(5));
            }
            Commands::Serve { .. } => panic!("expected board"),
        }
    }
}
