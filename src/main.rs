use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};
use uitree_automation::cli::commands::{build_executor, cmd_find, cmd_follow, cmd_page, cmd_tap};
use uitree_automation::cli::config::{
    Cli, Commands, build_engine_config, load_config, resolve_trace_path,
};
use uitree_automation::screen::screen_model::Point;

/// Console logging to stderr. `RUST_LOG` wins over the -v count.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = load_config(cli.config.as_deref());
    let config = build_engine_config(&cli, &file_config);
    let trace_path = resolve_trace_path(&cli, &file_config);
    let executor = build_executor(&config, trace_path.as_deref())?;

    match cli.command {
        Commands::Page { elements } => {
            cmd_page(&executor, elements)?;
        }
        Commands::Find { texts, clickable } => {
            cmd_find(&executor, &texts, clickable)?;
        }
        Commands::Tap {
            x,
            y,
            expect,
            query,
            wait,
        } => {
            let verified = cmd_tap(&executor, &config, Point::new(x, y), &expect, &query, wait)?;
            if !verified {
                std::process::exit(1);
            }
        }
        Commands::Follow { max, threshold } => {
            let passed = cmd_follow(&executor, &config, max, threshold, cli.verbose)?;
            if !passed {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
