#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use bilyric::app_config::{self, Config, ServiceKind};
use bilyric::app_controller::{Controller, OutputFormat, ResultSource, RunOptions};
use bilyric::captions::{self, TimelineBuilder};
use bilyric::database::ResultStore;
use bilyric::file_utils::FileManager;
use bilyric::pipeline::HttpOrchestrator;

/// `--log-level` values
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(level: CliLogLevel) -> Self {
        use app_config::LogLevel;
        match level {
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
    /// Transcribe and translate a song or a folder of songs (default command)
    Process {
        /// Input audio file or directory to process
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Split raw model output into clean text and reasoning
    Extract {
        /// File holding the raw output; reads stdin when omitted
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Segment and time a transcript
    Timeline {
        /// Media duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// File holding the transcript; reads stdin when omitted
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Browse the song library
    Library {
        #[command(subcommand)]
        action: LibraryCommand,
    },

    /// Check that the processing services are reachable
    Health,

    /// Generate shell completions for bilyric
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum LibraryCommand {
    /// List stored songs, favorites first
    List,
    /// Print a stored song
    Show {
        id: String,
        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
    /// Remove a stored song
    Delete { id: String },
    /// Mark a song as favorite
    Favorite {
        id: String,
        /// Remove the mark instead
        #[arg(long)]
        off: bool,
    },
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Re-process even when the library already has the song
    #[arg(short, long)]
    force: bool,

    /// Directory for exported files (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Export format, repeatable
    #[arg(long = "format", value_enum)]
    formats: Vec<OutputFormat>,

    /// Media duration in seconds (otherwise probed with ffprobe)
    #[arg(long)]
    duration: Option<f64>,

    /// Do not read or write the song library
    #[arg(long)]
    no_library: bool,
}

/// bilyric - bilingual lyrics for songs
///
/// Sends a song to the processing services, times the transcript into caption
/// lines and lays the translation over the same timing.
#[derive(Parser, Debug)]
#[command(name = "bilyric")]
#[command(version)]
#[command(about = "Bilingual time-coded lyrics from audio")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "bilyric uploads songs to the audio processing services and produces time-coded lyrics with a translation on the same timing.

EXAMPLES:
    bilyric song.mp3                             # Process using default config
    bilyric -s en -t fr song.mp3                 # English to French
    bilyric --format srt --format lrc song.mp3   # Export captions
    bilyric -f song.mp3                          # Ignore the song library
    bilyric --disable-service process song.mp3   # Go straight to transcription
    bilyric /music/                              # Process an entire directory
    bilyric library list                         # Show stored songs
    bilyric health                               # Check the services
    bilyric completions bash > bilyric.bash      # Generate bash completions

CONFIGURATION:
    Settings live in conf.json unless --config-path points elsewhere. A missing
    file is created with defaults on first run; command-line languages and log
    level override it.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input audio file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    run: RunArgs,

    /// Source language (name or ISO code, e.g. 'en', 'English')
    #[arg(short, long, global = true)]
    source_language: Option<String>,

    /// Target language (name or ISO code, e.g. 'es', 'Spanish')
    #[arg(short, long, global = true)]
    target_language: Option<String>,

    /// Skip a service for this run (process, transcribe or translate), repeatable
    #[arg(long = "disable-service", value_name = "SERVICE", value_parser = parse_service_kind, global = true)]
    disabled_services: Vec<ServiceKind>,

    /// Settings file, created with defaults when missing
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Colored stderr logger; the global max level does the filtering
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl StderrLogger {
    // @installs: Global logger at `level`
    fn install(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_logger(&LOGGER)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and marker for a level
    fn style(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌"),
            Level::Warn => ("\x1B[1;33m", "🚧"),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍"),
            Level::Trace => ("\x1B[1;35m", "📋"),
        }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let (color, marker) = Self::style(record.level());
        let stamp = chrono::Local::now().format("%H:%M:%S.%3f");
        let _ = writeln!(std::io::stderr().lock(), "{}{} {} {}\x1B[0m", color, stamp, marker, record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config says otherwise
    StderrLogger::install(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "bilyric", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;

    match cli.command {
        Some(Commands::Process { input_path, run }) => run_process(config, &input_path, &run).await,
        Some(Commands::Extract { file }) => run_extract(file.as_deref()),
        Some(Commands::Timeline { duration, file }) => run_timeline(&config, duration, file.as_deref()),
        Some(Commands::Library { action }) => run_library(&config, action).await,
        Some(Commands::Health) => run_health(&config).await,
        Some(Commands::Completions { .. }) => Ok(()),
        None => match cli.input_path {
            Some(input_path) => run_process(config, &input_path, &cli.run).await,
            None => Err(anyhow!("Give a song or folder to process, or a subcommand (see --help)")),
        },
    }
}

fn parse_service_kind(value: &str) -> Result<ServiceKind, String> {
    value.parse().map_err(|e: anyhow::Error| e.to_string())
}

/// Config file plus command-line overrides, validated
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let cli_level = cli.log_level.clone().map(app_config::LogLevel::from);
    if let Some(level) = &cli_level {
        // so problems while loading the file are already reported at this level
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(source) = &cli.source_language {
        config.source_language = source.clone();
    }
    if let Some(target) = &cli.target_language {
        config.target_language = target.clone();
    }
    if let Some(level) = cli_level {
        config.log_level = level;
    }
    for kind in &cli.disabled_services {
        config.services.get_mut(*kind).enabled = false;
    }

    config.validate().context("Invalid configuration")?;
    log::set_max_level(config.log_level.to_level_filter());
    Ok(config)
}

async fn run_process(mut config: Config, input_path: &Path, args: &RunArgs) -> Result<()> {
    if args.no_library {
        config.library.enabled = false;
    }

    let store = Controller::open_library(&config)?;
    let mut controller = Controller::with_config(config)?;
    if let Some(store) = store {
        controller = controller.with_store(store);
    }

    let mut options = RunOptions {
        output_dir: args.output_dir.clone(),
        force: args.force,
        media_duration: args.duration,
        ..RunOptions::default()
    };
    if !args.formats.is_empty() {
        options.formats = args.formats.clone();
    }

    if input_path.is_file() {
        let summary = controller.run(input_path, &options).await?;
        match summary.source {
            ResultSource::Failed => {
                for line in &summary.result.original_lyrics {
                    error!("{}", line.text);
                }
                if let Some(report) = &summary.report {
                    error!("{}", report.summary());
                }
                return Err(anyhow!("No lyrics produced for {:?}", input_path));
            }
            ResultSource::Library | ResultSource::Processed => {
                for output in &summary.outputs {
                    info!("Success: {:?}", output);
                }
            }
        }
    } else if input_path.is_dir() {
        let summary = controller.run_folder(input_path, &options).await?;
        if summary.failed + summary.errors > 0 {
            warn!(
                "{} of {} songs produced no lyrics",
                summary.failed + summary.errors,
                summary.processed + summary.replayed + summary.failed + summary.errors
            );
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    Ok(())
}

/// Read a file, or stdin when no file is given
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => FileManager::read_to_string(path),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn run_extract(file: Option<&Path>) -> Result<()> {
    let raw = read_input(file)?;
    let extraction = captions::extract(&raw);
    println!("{}", serde_json::to_string_pretty(&extraction)?);
    Ok(())
}

fn run_timeline(config: &Config, duration: f64, file: Option<&Path>) -> Result<()> {
    let transcript = read_input(file)?;
    let lines = TimelineBuilder::from_config(&config.timeline).build(&transcript, duration);
    if lines.is_empty() {
        warn!("Nothing to time: empty transcript or non-positive duration");
    }
    println!("{}", serde_json::to_string_pretty(&lines)?);
    Ok(())
}

async fn run_library(config: &Config, action: LibraryCommand) -> Result<()> {
    let store = Controller::open_library(config)?
        .ok_or_else(|| anyhow!("The song library is disabled in the configuration"))?;

    match action {
        LibraryCommand::List => {
            let songs = store.list().await?;
            if songs.is_empty() {
                info!("The song library is empty");
            }
            for song in songs {
                println!("{}", song);
            }
        }
        LibraryCommand::Show { id, format } => {
            let song = store.load(&id).await?;
            println!("{}", format.render(&song.result)?);
        }
        LibraryCommand::Delete { id } => {
            store.delete(&id).await?;
            info!("Deleted {}", id);
        }
        LibraryCommand::Favorite { id, off } => {
            store.set_favorite(&id, !off).await?;
            info!("{} {}", if off { "Unmarked" } else { "Marked" }, id);
        }
    }

    Ok(())
}

async fn run_health(config: &Config) -> Result<()> {
    let orchestrator = HttpOrchestrator::from_config(config)?;
    let mut unhealthy = 0;

    for (stage, outcome) in orchestrator.health().await {
        match outcome {
            Ok(()) => info!("{} service is up", stage),
            Err(e) => {
                unhealthy += 1;
                error!("{} service is unavailable: {}", stage, e);
            }
        }
    }

    if unhealthy > 0 {
        return Err(anyhow!("{} service(s) unavailable", unhealthy));
    }
    Ok(())
}
