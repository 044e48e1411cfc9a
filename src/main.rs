//! ReplPad - CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use replpad::terminal::{eval_line, LineRepl, LineReplConfig};
use replpad::util::config::{load_user_config, ReplConfig};
use replpad::util::logger::{self, LogLevel};
use replpad::{ReplPad, NAME, VERSION};

/// A multi-language REPL hosted in a rich-text document
#[derive(Parser, Debug)]
#[command(name = "replpad")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (defaults to the user config)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the interactive REPL (default)
    Repl,

    /// Run one line in the first configured language
    Eval {
        /// Code to run; `%name` switches language
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// List configured languages
    Langs,

    /// Print version information
    Version,
}

fn load_config(path: Option<&PathBuf>) -> Result<ReplConfig> {
    match path {
        Some(path) => ReplConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => load_user_config().context("Failed to load user config"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    if args.verbose {
        logger::init_debug();
    } else {
        let level = config.log.level.parse().unwrap_or(LogLevel::Warn);
        logger::init_with_level(level);
    }
    tracing::debug!("{} {} on {}", NAME, VERSION, std::env::consts::OS);

    match args.command.unwrap_or(Commands::Repl) {
        Commands::Repl => {
            let pad = ReplPad::from_config(&config).context("Failed to start engines")?;
            let line_config = LineReplConfig {
                colors: !args.no_color,
                ..LineReplConfig::default()
            };
            let mut repl = LineRepl::with_config(pad, line_config).context("Failed to start line editor")?;
            repl.run().context("REPL failed")?;
        }
        Commands::Eval { code } => {
            let mut pad = ReplPad::from_config(&config).context("Failed to start engines")?;
            let output = eval_line(&mut pad, &code, !args.no_color);
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Commands::Langs => {
            config.validate().context("Invalid configuration")?;
            for (i, engine) in config.engines.iter().enumerate() {
                let marker = if i == 0 { "*" } else { " " };
                println!("{} {} ({})", marker, engine.name, engine.program);
            }
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
        }
    }

    Ok(())
}
