// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use std::time::{Duration, Instant};
use clap::{Parser, ValueEnum, CommandFactory, Subcommand, Args};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

use dualsub::app_config::{self, ChannelBackend, Config};
use dualsub::app_controller::DualSubtitleController;
use dualsub::display::{Region, SubtitleSurface};
use dualsub::playback::SimulatedPlayer;
use dualsub::providers::build_channel;
use dualsub::subtitle_processor::{parse_subtitle_track, write_dual_vtt};
use dualsub::time_source::{FixedTime, MediaClock, PlaybackTimeSource, ScrubberControl, TimeSource};
use dualsub::timeline::CueTimeline;
use dualsub::translation::cache::TranslationCache;
use dualsub::translation::queue::{QueueSettings, TickOutcome, TranslationQueue};

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "conf.json";

/// Playhead update period of the simulated player
const PLAYER_STEP: Duration = Duration::from_millis(50);

/// CLI Wrapper for ChannelBackend to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliBackend {
    Ollama,
    Anthropic,
    Http,
}

impl From<CliBackend> for ChannelBackend {
    fn from(cli_backend: CliBackend) -> Self {
        match cli_backend {
            CliBackend::Ollama => ChannelBackend::Ollama,
            CliBackend::Anthropic => ChannelBackend::Anthropic,
            CliBackend::Http => ChannelBackend::Http,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Options shared by the commands that need a configuration
#[derive(Args, Debug, Clone)]
struct CommonOptions {
    /// Target language code (e.g., 'es', 'fr', 'de')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Translation backend to use
    #[arg(short, long, value_enum)]
    backend: Option<CliBackend>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "DUALSUB_CONFIG")]
    config_path: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a subtitle track with dual subtitles in the terminal
    Play {
        /// Subtitle track (WebVTT or SRT)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Official translation track to prefer over API translations
        #[arg(long, value_name = "FILE")]
        official: Option<PathBuf>,

        /// Session identifier, random when omitted
        #[arg(long)]
        session_id: Option<String>,

        /// Playback speed multiplier
        #[arg(long, default_value_t = 1.0)]
        speed: f64,

        /// Seconds added to the playback time
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<f64>,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Parse a subtitle track and print its cues as JSON
    Parse {
        /// Subtitle track (WebVTT or SRT)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Translate a whole track and write a dual-language WebVTT file
    Translate {
        /// Subtitle track (WebVTT or SRT)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,

        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completions for dualsub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// dualsub - Dual-language subtitles
///
/// Shows every subtitle line together with its translation, translating
/// lines just ahead of the playhead through an LLM or a translation service.
#[derive(Parser, Debug)]
#[command(name = "dualsub")]
#[command(version)]
#[command(about = "Dual-language subtitles with on-the-fly translation")]
#[command(long_about = "dualsub shows each subtitle line together with its translation.

EXAMPLES:
    dualsub play episode.vtt -t es               # Play with Spanish translations
    dualsub play episode.vtt --official es.vtt   # Prefer an official Spanish track
    dualsub parse episode.srt                    # Dump cues as JSON
    dualsub translate episode.vtt -o dual.vtt    # Write a dual-language track
    dualsub completions bash > dualsub.bash      # Generate bash completions

CONFIGURATION:
    Configuration is read from conf.json in the current directory, or from the
    user configuration directory. If no config file exists, a default one is
    created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
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

    // @initializes: Global logger; the max level filters records from here on
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

/// Terminal rendering of the two subtitle regions
#[derive(Default)]
struct TerminalSurface {
    regions: Option<[(String, bool); 2]>,
    dirty: bool,
}

impl TerminalSurface {
    fn slot(region: Region) -> usize {
        match region {
            Region::Original => 0,
            Region::Translated => 1,
        }
    }

    /// Print the regions if they changed since the last call
    fn flush_to(&mut self, out: &mut impl Write, time: f64) -> std::io::Result<()> {
        if !std::mem::take(&mut self.dirty) {
            return Ok(());
        }
        let Some(regions) = &self.regions else {
            return Ok(());
        };

        let visible: Vec<&str> = regions.iter()
            .filter(|(_, visible)| *visible)
            .map(|(text, _)| text.as_str())
            .collect();
        if visible.is_empty() {
            return Ok(());
        }

        writeln!(out, "\x1B[2m[{}]\x1B[0m", dualsub::subtitle_processor::format_timestamp(time))?;
        if regions[0].1 {
            writeln!(out, "  {}", regions[0].0)?;
        }
        if regions[1].1 {
            writeln!(out, "  \x1B[33m{}\x1B[0m", regions[1].0)?;
        }
        out.flush()
    }
}

impl SubtitleSurface for TerminalSurface {
    fn has_regions(&self) -> bool {
        self.regions.is_some()
    }

    fn create_regions(&mut self) -> bool {
        self.regions = Some(Default::default());
        true
    }

    fn remove_regions(&mut self) {
        self.regions = None;
    }

    fn text(&self, region: Region) -> String {
        self.regions.as_ref()
            .map(|regions| regions[Self::slot(region)].0.clone())
            .unwrap_or_default()
    }

    fn set_text(&mut self, region: Region, text: &str) {
        if let Some(regions) = self.regions.as_mut() {
            regions[Self::slot(region)].0 = text.to_string();
            self.dirty = true;
        }
    }

    fn is_visible(&self, region: Region) -> bool {
        self.regions.as_ref().is_some_and(|regions| regions[Self::slot(region)].1)
    }

    fn set_visible(&mut self, region: Region, visible: bool) {
        if let Some(regions) = self.regions.as_mut() {
            regions[Self::slot(region)].1 = visible;
            self.dirty = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "dualsub", &mut std::io::stdout());
            Ok(())
        }
        Commands::Parse { input } => run_parse(&input),
        Commands::Play { input, official, session_id, speed, offset, common } => {
            let mut config = load_config(&common)?;
            if let Some(offset) = offset {
                config.time_offset_secs = offset;
            }
            config.validate().context("Configuration validation failed")?;
            run_play(config, &input, official.as_deref(), session_id, speed).await
        }
        Commands::Translate { input, output, common } => {
            let config = load_config(&common)?;
            config.validate().context("Configuration validation failed")?;
            run_translate(config, &input, &output).await
        }
    }
}

/// Location of the configuration file when none is given
fn default_config_path() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    dirs::config_dir()
        .map(|dir| dir.join("dualsub").join(CONFIG_FILE_NAME))
        .unwrap_or(local)
}

/// Load or create the configuration and apply CLI overrides
fn load_config(options: &CommonOptions) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let config_path = options.config_path.clone().unwrap_or_else(default_config_path);
    let mut config = if config_path.exists() {
        let file = File::open(&config_path)
            .context(format!("Failed to open config file: {}", config_path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path.display()))?
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path.display());

        let config = Config::default();
        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create config directory: {}", parent.display()))?;
        }

        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(&config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path.display()))?;

        config
    };

    // Override config with CLI options if provided
    if let Some(backend) = &options.backend {
        config.channel.backend = backend.clone().into();
    }
    if let Some(model) = &options.model {
        config.channel.model = model.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    match &options.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        // Just update the max level without reinitializing the logger
        None => log::set_max_level(level_filter(&config.log_level)),
    }

    Ok(config)
}

fn read_track(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .context(format!("Failed to read subtitle file: {}", path.display()))
}

fn run_parse(input: &Path) -> Result<()> {
    let cues = parse_subtitle_track(&read_track(input)?);
    if cues.is_empty() {
        return Err(anyhow!("No cues found in {}", input.display()));
    }

    let json = serde_json::to_string_pretty(&cues).context("Failed to serialize cues")?;
    println!("{}", json);
    info!("Parsed {} cues", cues.len());
    Ok(())
}

async fn run_play(config: Config, input: &Path, official: Option<&Path>, session_id: Option<String>, speed: f64) -> Result<()> {
    let original = read_track(input)?;
    let official = official.map(read_track).transpose()?;

    let cues = parse_subtitle_track(&original);
    let duration = cues.iter().map(|cue| cue.end).fold(0.0_f64, f64::max);
    if duration <= 0.0 {
        return Err(anyhow!("No cues found in {}", input.display()));
    }

    let player = Arc::new(SimulatedPlayer::new(Some(duration)).with_scrubber(100.0).with_speed(speed));
    let time_source = Arc::new(PlaybackTimeSource::new(
        Arc::clone(&player) as Arc<dyn MediaClock>,
        Some(Arc::clone(&player) as Arc<dyn ScrubberControl>),
        config.time_offset_secs,
    ));
    let channel = build_channel(&config.channel).context("Failed to set up translation channel")?;

    info!("Playing {} ({:.1}s) with {} translations through {}",
          input.display(), duration, config.target_language, config.channel.backend.display_name());

    let session_id = session_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let mut controller = DualSubtitleController::new(config, channel, time_source, TerminalSurface::default());
    controller.load_tracks(&session_id, &original, official.as_deref());

    let mut stdout = std::io::stdout();
    let mut last = Instant::now();
    let mut interval = tokio::time::interval(PLAYER_STEP);

    while !player.is_finished() {
        interval.tick().await;
        let now = Instant::now();
        let position = player.advance(now.duration_since(last).as_secs_f64());
        last = now;

        controller.on_time_update();
        controller.display_mut().surface_mut().flush_to(&mut stdout, position)?;
    }

    controller.shutdown().await
}

async fn run_translate(config: Config, input: &Path, output: &Path) -> Result<()> {
    let original = read_track(input)?;
    let session_id = Uuid::new_v4().to_string();

    let timeline = CueTimeline::shared();
    let total = {
        let mut timeline = timeline.lock();
        timeline.activate_session(&session_id);
        timeline.replace_cues_for_session(&session_id, parse_subtitle_track(&original))
    };
    if total == 0 {
        return Err(anyhow!("No cues found in {}", input.display()));
    }

    let channel = build_channel(&config.channel).context("Failed to set up translation channel")?;
    let mut settings = QueueSettings::from_config(&config);
    settings.enabled = true;

    // Every cue is still ahead of a playhead parked at zero
    let queue = TranslationQueue::new(
        Arc::clone(&timeline),
        channel,
        Arc::new(FixedTime(0.0)) as Arc<dyn TimeSource>,
        settings,
        TranslationCache::new(config.channel.cache_enabled),
    );

    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} cues ({eta})")
            .map_err(|e| anyhow!("Invalid progress template: {}", e))?
            .progress_chars("#>-"),
    );

    loop {
        let outcome = queue.process_tick().await;
        let pending = timeline.lock().pending_count(&session_id);
        progress.set_position((total - pending) as u64);

        match outcome {
            TickOutcome::Reschedule { .. } => tokio::time::sleep(queue.settings().reschedule_delay).await,
            _ => break,
        }
    }
    progress.finish_and_clear();

    let cues: Vec<_> = timeline.lock().cues_for_session(&session_id).cloned().collect();
    std::fs::write(output, write_dual_vtt(&cues, &config.ui_language))
        .context(format!("Failed to write output file: {}", output.display()))?;

    let stats = queue.stats();
    info!("Wrote {} cues to {} ({} translated, {} failed, {} from cache)",
          cues.len(), output.display(), stats.translated, stats.failed, stats.cache_hits);
    Ok(())
}
