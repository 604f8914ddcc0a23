use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fe_core::{FeConfig, PoolStats};
use fe_syntax::Driver;

mod calc;

#[cfg(all(feature = "jemalloc", not(target_env = "msvc")))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser)]
#[command(name = "fe")]
#[command(about = "Front-end toolkit demo: lex sources and inspect symbol interning", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// TOML configuration file
    #[arg(long, global = true, env = "FE_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenise a source file and print one token per line
    Lex {
        /// Source file
        file: PathBuf,
    },

    /// Intern every whitespace-separated word of a file and report pool usage
    Intern {
        /// Input file
        file: PathBuf,
    },
}

#[derive(Serialize)]
struct InternReport {
    words: usize,
    inline: usize,
    boxed: usize,
    distinct_boxed: usize,
    pool: PoolStats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => FeConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => FeConfig::default(),
    };
    init_tracing(&config, cli.verbose);

    match execute_command(&cli, &config) {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(config: &FeConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.logging.level.as_str() };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("fe={level},fe_core={level},fe_syntax={level}").into());

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init(),
        "compact" => registry.with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr)).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)).init(),
    }
}

fn execute_command(cli: &Cli, config: &FeConfig) -> Result<()> {
    match &cli.command {
        Commands::Lex { file } => execute_lex(file, cli.format, config),
        Commands::Intern { file } => execute_intern(file, cli.format, config),
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn execute_lex(path: &Path, format: OutputFormat, config: &FeConfig) -> Result<()> {
    let mut driver = Driver::with_pool_config(&config.pool, io::stderr());
    driver.set_color(io::stderr().is_terminal());
    let reader = open(path)?;
    debug!(pool_page_size = config.pool.page_size, "lexing {}", path.display());

    let toks = calc::tokenize(&driver, reader, Some(path));
    info!(tokens = toks.len(), symbols = driver.pool().len(), "lexed {}", path.display());

    match format {
        OutputFormat::Json => {
            let records: Vec<calc::TokenRecord> = toks.iter().map(calc::TokenRecord::from).collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Pretty => {
            for tok in &toks {
                println!("{}  {}", tok.loc.to_string().cyan(), tok.to_string().green());
            }
        }
    }

    if driver.num_errors() > 0 {
        bail!("{} error(s) while lexing {}", driver.num_errors(), path.display());
    }
    Ok(())
}

fn execute_intern(path: &Path, format: OutputFormat, config: &FeConfig) -> Result<()> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let pool = fe_core::SymPool::with_config(&config.pool);

    let mut report = InternReport {
        words: 0,
        inline: 0,
        boxed: 0,
        distinct_boxed: 0,
        pool: pool.stats(),
    };
    for word in text.split_whitespace() {
        let sym = pool.sym(word);
        report.words += 1;
        if sym.is_inline() {
            report.inline += 1;
        } else {
            report.boxed += 1;
        }
    }
    report.distinct_boxed = pool.len();
    report.pool = pool.stats();
    info!(words = report.words, records = report.pool.records, "interned {}", path.display());

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Pretty => print_pretty(&serde_json::to_value(&report)?, 0),
    }
    Ok(())
}

fn print_pretty(value: &serde_json::Value, depth: usize) {
    let indent = fe_syntax::Tab::new("  ", depth);
    if let serde_json::Value::Object(map) = value {
        for (key, val) in map {
            let key_colored = key.cyan().bold();
            match val {
                serde_json::Value::Object(_) => {
                    println!("{indent}{key_colored}:");
                    print_pretty(val, depth + 1);
                }
                serde_json::Value::Number(n) => println!("{indent}{}: {}", key_colored, n.to_string().yellow()),
                _ => println!("{indent}{}: {}", key_colored, val),
            }
        }
    }
}
