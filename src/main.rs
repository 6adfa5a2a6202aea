// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use tplmin::app_config::{Config, LogLevel};
use tplmin::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for tplmin
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// tplmin - template-aware script and style minifier
///
/// Minifies the <script> and <style> regions of template files while keeping
/// {% ... %} directives intact, mirroring the input tree into an output directory.
#[derive(Parser, Debug)]
#[command(name = "tplmin")]
#[command(version)]
#[command(about = "Minify script and style regions of template files")]
#[command(long_about = "tplmin minifies the <script> and <style> regions of template files that mix
{% ... %} directives with HTML, and writes the result under an output directory
that mirrors the input tree. Files that cannot be minified are copied unchanged.

EXAMPLES:
    tplmin                                  # Minify the current directory into ./output/
    tplmin templates/ -o dist/              # Minify templates/ into dist/templates/
    tplmin page.tpl                         # Minify a single file
    tplmin -e .git -e node_modules src/     # Skip entries named .git or node_modules
    tplmin --log-level debug templates/     # Verbose diagnostics
    tplmin completions bash > tplmin.bash   # Generate bash completions

CONFIGURATION:
    Settings are read from tplmin.json when it exists (or the file given with
    --config). Command line options override the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file or directory to process
    #[arg(value_name = "PATH", default_value = "./")]
    input_path: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Exact file or directory name to skip (repeatable, replaces the configured list)
    #[arg(short, long = "exclude", value_name = "NAME")]
    exclude: Vec<String>,

    /// Number of files processed concurrently
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "tplmin.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }

    // @returns: Emoji for log level
    fn emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌",
            Level::Warn => "🚧",
            Level::Info => "",
            Level::Debug => "🔍",
            Level::Trace => "📋",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());
            let emoji = Self::emoji_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                color,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the facade's max level does the filtering
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "tplmin", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)
        .context("Configuration validation failed")?;

    let report = controller.run(&cli.input_path).await?;
    if report.failed_count() > 0 {
        error!("{} file(s) could not be written", report.failed_count());
        return Err(anyhow!("{} file(s) failed", report.failed_count()));
    }

    Ok(())
}

// Load the config file if present, then apply command line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = if Path::new(&cli.config_path).exists() {
        Config::from_file(&cli.config_path)?
    } else {
        if cli.config_path != Path::new("tplmin.json") {
            warn!("Config file not found at {:?}, using defaults.", cli.config_path);
        }
        Config::default()
    };

    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }

    if !cli.exclude.is_empty() {
        config.exclude = cli.exclude.clone();
    }

    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency;
    }

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}
