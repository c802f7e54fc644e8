//! Trackwise CLI - hierarchy navigation for the Trackwise QA tracker.

use std::future::Future;
use std::path::Path;
use std::process;
#[cfg(feature = "serve")]
use std::sync::Arc;

use clap::Parser;
use trackwise::cli::{Cli, Commands, ConfigCommands};
use trackwise::commands::{self, Output};
use trackwise::config::{self, ConfigOverrides, ResolvedConfig};
use trackwise::logging::{self, LogTarget};

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    if let Err(e) = run(cli) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            let err = serde_json::json!({
                "error": e.to_string(),
                "kind": e.kind(),
            });
            eprintln!("{}", err);
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), trackwise::Error> {
    let human = cli.human_readable;
    let dir = config::config_dir()?;
    let overrides = ConfigOverrides {
        api_url: cli.api_url.clone(),
        log_level: cli.log_level.clone(),
    };
    let settings = config::resolve_config(&dir, &overrides)?;

    // Held until exit so buffered file logs are flushed.
    let _log_guard = init_logging(&cli, &settings, &dir)?;

    match cli.command {
        Commands::Types => output(&commands::types(), human),
        Commands::Classify { width } => output(&commands::classify(width), human),
        Commands::Resolve {
            entity_type,
            id,
            path,
        } => {
            let route =
                commands::parse_route(entity_type.as_deref(), id.as_deref(), path.as_deref())?;
            let resolver = commands::http_resolver(&settings)?;
            let result = block_on(commands::resolve(
                &resolver,
                &route,
                settings.display_mode(),
            ))??;
            output(&result, human);
        }
        #[cfg(feature = "tui")]
        Commands::Browse { path } => {
            let route = match path {
                Some(path) => path.parse()?,
                None => trackwise::navigation::Route::TopLevel,
            };
            let resolver = commands::http_resolver(&settings)?;
            let options = trackwise::tui::BrowseOptions {
                cell_width_px: settings.cell_width_px(),
                resize_debounce: settings.resize_debounce(),
                display_mode: settings.display_mode(),
            };
            block_on(trackwise::tui::run_tui(resolver, route, options))??;
        }
        #[cfg(feature = "serve")]
        Commands::Serve {
            fixture,
            port,
            host,
            token,
        } => {
            let service = trackwise::service::InMemoryEntityService::load(&fixture)?;
            block_on(trackwise::server::start_server(
                Arc::new(service),
                &host,
                port,
                token,
            ))??;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => output(&commands::config_show(&dir, settings), human),
            ConfigCommands::Set { key, value } => {
                output(&commands::config_set(&dir, &key, &value)?, human)
            }
            ConfigCommands::SetToken { token } => {
                output(&commands::config_set_token(&dir, &token)?, human)
            }
            ConfigCommands::ClearToken => output(&commands::config_clear_token(&dir)?, human),
        },
    }

    Ok(())
}

fn init_logging(
    cli: &Cli,
    settings: &ResolvedConfig,
    dir: &Path,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, trackwise::Error> {
    let guard = match &cli.command {
        #[cfg(feature = "tui")]
        Commands::Browse { .. } => {
            std::fs::create_dir_all(dir)?;
            logging::init(settings.log_level(), LogTarget::File(dir))
        }
        #[cfg(feature = "serve")]
        Commands::Serve { .. } => logging::init(settings.log_level(), LogTarget::Stderr),
        _ => logging::init(logging::command_level(settings), LogTarget::Stderr),
    };
    Ok(guard)
}

/// Run an async command on a fresh multi-threaded runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output, trackwise::Error> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| trackwise::Error::Other(format!("Failed to create runtime: {}", e)))?;
    Ok(runtime.block_on(future))
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
