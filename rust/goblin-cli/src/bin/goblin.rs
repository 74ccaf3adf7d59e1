//! Goblin: an enhanced interactive REPL for Go.

use clap::{Parser, Subcommand};
use goblin_cli::colors::{self, error, info, output, success};
use goblin_cli::commands::{export_file, init_config, run_file, tidy_file, TidyOutcome};
use goblin_cli::config::{goblin_home, GoblinConfig, GoblinPaths};
use goblin_cli::go::{GoToolchain, Gofmt};
use goblin_cli::repl::{run_repl, Repl};
use std::path::{Path, PathBuf};
use std::process;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `GOBLIN_LOG=debug`.
const LOG_ENV: &str = "GOBLIN_LOG";

#[derive(Parser)]
#[command(name = "goblin", version, about = "An enhanced interactive REPL for Go")]
struct Cli {
    /// Configuration file (default: $GOBLIN_HOME/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive REPL (the default)
    Repl,
    /// Write a commented config.toml into the Goblin home
    Init,
    /// Assemble a snippet file and run it
    Run {
        /// Snippet file, as written by :save
        #[arg()]
        file: PathBuf,

        /// Arguments passed to the program
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Reformat a snippet file in place
    Tidy {
        #[arg()]
        file: PathBuf,

        /// Exit with status 1 instead of rewriting when the file would change
        #[arg(long)]
        check: bool,
    },
    /// Print or write the complete program for a snippet file
    Export {
        #[arg()]
        file: PathBuf,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let Some(home) = goblin_home() else {
        eprintln!("{} cannot determine the home directory", error("error:"));
        process::exit(1);
    };
    let config = match cli.config.as_deref() {
        Some(path) => GoblinConfig::load_from(path).unwrap_or_else(|err| {
            eprintln!("{} {}", error("error:"), err);
            process::exit(1);
        }),
        None => GoblinConfig::load(&home),
    };
    colors::set_enabled(config.color_enabled());

    let paths = GoblinPaths::resolve(home, &config);
    if let Err(err) = paths.ensure_dirs() {
        warn!(home = %paths.home.display(), %err, "cannot create goblin directories");
    }

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => {
            if let Err(err) = run_repl(Repl::new(&config, &paths)) {
                eprintln!("{} {}", error("error:"), err);
                process::exit(1);
            }
        }
        Commands::Init => cmd_init(&paths.home),
        Commands::Run { file, args } => cmd_run(&file, &config, &args),
        Commands::Tidy { file, check } => cmd_tidy(&file, &config, check),
        Commands::Export { file, output } => cmd_export(&file, output.as_deref()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_init(home: &Path) {
    match init_config(home) {
        Ok(path) => println!("{}", success(&format!("Created {}", path.display()))),
        Err(err) => {
            eprintln!("{} {}", error("error:"), err);
            process::exit(1);
        }
    }
}

fn cmd_run(file: &Path, config: &GoblinConfig, args: &[String]) {
    let toolchain = GoToolchain::from_config(&config.toolchain);
    match run_file(file, &toolchain, args) {
        Ok(execution) => {
            print!("{}", output(&execution.output));
            if !execution.succeeded() {
                process::exit(execution.exit_code.unwrap_or(1));
            }
        }
        Err(err) => {
            eprintln!("{} {}", error("error:"), err);
            process::exit(1);
        }
    }
}

fn cmd_tidy(file: &Path, config: &GoblinConfig, check: bool) {
    let formatter = Gofmt::new(config.toolchain.gofmt.clone());
    match tidy_file(file, &formatter, check) {
        Ok(TidyOutcome::Unchanged) => {
            println!("{}", info(&format!("{} already tidy", file.display())))
        }
        Ok(TidyOutcome::Rewritten) => {
            println!("{}", success(&format!("Tidied {}", file.display())))
        }
        Ok(TidyOutcome::WouldChange) => {
            eprintln!("{} {}", error("would reformat:"), file.display());
            process::exit(1);
        }
        Err(err) => {
            eprintln!("{} {}", error("error:"), err);
            process::exit(1);
        }
    }
}

fn cmd_export(file: &Path, out: Option<&Path>) {
    match export_file(file, out) {
        Ok(source) => match out {
            Some(path) => println!(
                "{}",
                success(&format!("Exported {} to {}", file.display(), path.display()))
            ),
            None => print!("{source}"),
        },
        Err(err) => {
            eprintln!("{} {}", error("error:"), err);
            process::exit(1);
        }
    }
}
