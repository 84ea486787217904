//! Headless game launcher.
//!
//! Resolves how to launch the game on this host, applies launch overrides
//! and starts one game process per agent.
//!
//! # Usage
//!
//! ```bash
//! # List run configs and their priority on this host
//! cargo run -p sc2env_headless -- configs
//!
//! # Launch two games with global overrides, using settings from a file
//! cargo run -p sc2env_headless -- launch --settings env.ron --agents 2 \
//!     --extra-arg -norender --window-size 1024 768
//!
//! # Show the display names agents would get
//! cargo run -p sc2env_headless -- names scout scout very_long_agent_name_experimental_1
//! ```
//!
//! Results go to stdout, logs to stderr.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sc2env_core::names::crop_and_deduplicate_names;
use sc2env_core::process::LaunchCommand;
use sc2env_core::run_config::{LaunchOverrides, RunConfig, RunConfigRegistry, StartOptions};
use sc2env_headless::{
    launcher::{launch_game, plan_launch, resolve_run_config},
    settings::EnvSettings,
};

#[derive(Parser)]
#[command(name = "sc2env")]
#[command(about = "Launch and inspect game simulations for agent environments")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered run configs
    Configs {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Resolve a run config and start one game per agent
    Launch {
        /// RON settings file
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Run config to use (highest priority if unset)
        #[arg(long, env = "SC2_RUN_CONFIG")]
        run_config: Option<String>,

        /// Game build to launch (newest if unset)
        #[arg(long = "game-version")]
        game_version: Option<String>,

        /// Extra binary argument applied to every launch (repeatable)
        #[arg(long = "extra-arg", allow_hyphen_values = true)]
        extra_args: Vec<String>,

        /// Window position: X Y
        #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
        window_loc: Option<Vec<i32>>,

        /// Window size: WIDTH HEIGHT
        #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
        window_size: Option<Vec<i32>>,

        /// Number of game processes to start [default: one per settings
        /// agent name, else 1]
        #[arg(short, long)]
        agents: Option<usize>,

        /// Address the games listen on
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Launch full screen
        #[arg(long)]
        full_screen: bool,

        /// Print the command lines instead of starting anything
        #[arg(long)]
        dry_run: bool,

        /// Print JSON output
        #[arg(long)]
        json: bool,
    },

    /// Crop and de-duplicate agent names
    Names {
        /// Raw agent names, in agent order [default: the settings' agent_names]
        names: Vec<String>,

        /// RON settings file to take agent names from
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Print JSON instead of one name per line
        #[arg(long)]
        json: bool,
    },
}

/// Options for the launch subcommand.
struct LaunchArgs {
    settings: Option<PathBuf>,
    run_config: Option<String>,
    game_version: Option<String>,
    extra_args: Vec<String>,
    window_loc: Option<Vec<i32>>,
    window_size: Option<Vec<i32>>,
    agents: Option<usize>,
    host: String,
    full_screen: bool,
    dry_run: bool,
    json: bool,
}

#[derive(Serialize)]
struct LaunchReport<'a> {
    run_config: &'a str,
    version: Option<&'a str>,
    overrides: &'a LaunchOverrides,
    agents: Vec<AgentRow>,
}

#[derive(Serialize)]
struct AgentRow {
    name: String,
    port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<LaunchCommand>,
}

#[derive(Serialize)]
struct ConfigRow<'a> {
    name: &'a str,
    priority: i32,
    eligible: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for results)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Configs { json } => cmd_configs(json),
        Commands::Launch {
            settings,
            run_config,
            game_version,
            extra_args,
            window_loc,
            window_size,
            agents,
            host,
            full_screen,
            dry_run,
            json,
        } => cmd_launch(LaunchArgs {
            settings,
            run_config,
            game_version,
            extra_args,
            window_loc,
            window_size,
            agents,
            host,
            full_screen,
            dry_run,
            json,
        }),
        Commands::Names {
            names,
            settings,
            json,
        } => cmd_names(names, settings.as_deref(), json),
    }
}

/// Log, report and exit.
fn fatal(context: &str, error: impl Display) -> ! {
    tracing::error!(error = %error, "{}", context);
    eprintln!("FATAL: {context}: {error}");
    std::process::exit(1);
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => fatal("Failed to serialize output", e),
    }
}

/// List registered run configs
fn cmd_configs(json: bool) {
    let registry = RunConfigRegistry::with_platform_defaults();
    let rows: Vec<ConfigRow<'_>> = registry
        .variants()
        .into_iter()
        .map(|(name, priority)| ConfigRow {
            name,
            priority,
            eligible: priority > 0,
        })
        .collect();

    if json {
        print_json(&rows);
        return;
    }

    println!("{:<12} {:>8}  ELIGIBLE", "RUN_CONFIG", "PRIORITY");
    for row in &rows {
        println!(
            "{:<12} {:>8}  {}",
            row.name,
            row.priority,
            if row.eligible { "yes" } else { "no" }
        );
    }
}

fn load_settings(path: Option<&Path>) -> EnvSettings {
    match path {
        Some(path) => EnvSettings::load(path)
            .unwrap_or_else(|e| fatal(&format!("Cannot load settings '{}'", path.display()), e)),
        None => EnvSettings::default(),
    }
}

/// Resolve and launch
fn cmd_launch(args: LaunchArgs) {
    let mut settings = load_settings(args.settings.as_deref());

    // Command line wins over the settings file.
    if args.run_config.is_some() {
        settings.run_config = args.run_config;
    }
    if args.game_version.is_some() {
        settings.version = args.game_version;
    }
    if !args.extra_args.is_empty() {
        settings.extra_args = args.extra_args;
    }
    if args.window_loc.is_some() {
        settings.window_location = args.window_loc;
    }
    if args.window_size.is_some() {
        settings.window_size = args.window_size;
    }

    let agents = settings
        .agent_count(args.agents)
        .unwrap_or_else(|e| fatal("Invalid agent count", e));
    let names = settings.display_names(agents);

    if let Err(e) = settings.apply_launch_overrides() {
        fatal("Invalid launch overrides", e);
    }

    let registry = RunConfigRegistry::with_platform_defaults();
    let config = resolve_run_config(&registry, &settings)
        .unwrap_or_else(|e| fatal("Cannot resolve run config", e));

    tracing::info!(
        run_config = config.name(),
        version = ?config.version(),
        data_dir = %config.data_dir().display(),
        overrides = ?config.overrides(),
        agents,
        "Resolved run config"
    );

    let options = StartOptions {
        host: args.host,
        full_screen: args.full_screen,
        ..StartOptions::default()
    };

    if args.dry_run {
        let commands = plan_launch(&config, agents, &options)
            .unwrap_or_else(|e| fatal("Cannot build launch command", e));
        if args.json {
            let rows = names
                .into_iter()
                .zip(commands)
                .map(|(name, command)| AgentRow {
                    name,
                    port: command.port,
                    command: Some(command),
                })
                .collect();
            print_json(&LaunchReport {
                run_config: config.name(),
                version: config.version(),
                overrides: config.overrides(),
                agents: rows,
            });
        } else {
            for (name, command) in names.iter().zip(&commands) {
                println!("{name}: {}", command.display());
            }
        }
        return;
    }

    let mut game =
        launch_game(config, agents, &options).unwrap_or_else(|e| fatal("Launch failed", e));

    if args.json {
        let rows = names
            .into_iter()
            .zip(game.ports())
            .map(|(name, port)| AgentRow {
                name,
                port,
                command: None,
            })
            .collect();
        let config = game.run_config();
        print_json(&LaunchReport {
            run_config: config.name(),
            version: config.version(),
            overrides: config.overrides(),
            agents: rows,
        });
    } else {
        for (name, port) in names.iter().zip(game.ports()) {
            println!("{name}: port {port}");
        }
    }

    match game.wait_all() {
        Ok(codes) => tracing::info!(exit_codes = ?codes, "All simulations exited"),
        Err(e) => fatal("Lost track of simulation processes", e),
    }
}

/// Print normalized agent names
fn cmd_names(names: Vec<String>, settings: Option<&Path>, json: bool) {
    let names = if names.is_empty() {
        load_settings(settings).agent_names
    } else {
        names
    };
    let labels = crop_and_deduplicate_names(&names);
    if json {
        print_json(&labels);
    } else {
        for label in &labels {
            println!("{label}");
        }
    }
}
