use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;

use vitrine::app::{App, Store};
use vitrine::config::Config;
use vitrine::gallery::Gallery;
use vitrine::logging;
use vitrine::photo;
use vitrine::storage::FileStore;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    catalog: Option<PathBuf>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("vitrine {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            flag @ ("--config" | "-c" | "--catalog") => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("Error: {} requires a path argument", flag);
                    std::process::exit(1);
                };
                if flag == "--catalog" {
                    parsed.catalog = Some(PathBuf::from(value));
                } else {
                    parsed.config = Some(PathBuf::from(value));
                }
                i += 1;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    parsed
}

fn print_help() {
    println!(
        r#"vitrine - terminal photo gallery

USAGE:
    vitrine [OPTIONS]

OPTIONS:
    --config, -c PATH   Path to config file
    --catalog PATH      TOML catalog of photos to show instead of the built-in set
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    VITRINE_CONFIG      Path to config file (overrides default location)
    VITRINE_LOG         Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/vitrine/config.toml"#
    );
}

fn main() -> Result<()> {
    let args = parse_args();

    let _ = logging::init(Some(Config::config_dir().join("logs")));

    let config = match args.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let catalog_path = args.catalog.or_else(|| config.catalog.path.clone());
    let seed = match catalog_path {
        Some(ref path) => photo::load_catalog(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => photo::seed_photos(),
    };

    let store: Store = Box::new(FileStore::new(config.storage.path.clone()));
    let gallery = Gallery::new(seed, store, config.add_image.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, gallery);
    let result = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!("Exited with error: {:#}", e);
    }
    result
}
