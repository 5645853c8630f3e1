use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, Metadata, Record};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};

static STORY_LOGGER: Lazy<StoryLogger> = Lazy::new(StoryLogger::new);

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::default())
}

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let max_level = config.min_level.to_level_filter();
    STORY_LOGGER.update_config(config);

    log::set_logger(&*STORY_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;
    log::set_max_level(max_level);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Cyan,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn to_level(&self) -> Level {
        match self {
            LogLevel::Trace => Level::Trace,
            LogLevel::Debug => Level::Debug,
            LogLevel::Info => Level::Info,
            LogLevel::Warn => Level::Warn,
            LogLevel::Error => Level::Error,
        }
    }

    pub fn to_level_filter(&self) -> log::LevelFilter {
        self.to_level().to_level_filter()
    }

    pub fn from_level(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }

    /// Accepts `LOG_LEVEL`-style names, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// One log line. Messages tagged `[req:<id>] ...` have the tag lifted into
/// `request_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub module: String,
    pub line: u32,
    pub request_id: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: String, module: String, line: u32) -> Self {
        let (request_id, message) = split_request_tag(message);
        Self {
            timestamp: Utc::now(),
            level,
            message,
            module,
            line,
            request_id,
        }
    }
}

fn split_request_tag(message: String) -> (Option<String>, String) {
    if let Some(rest) = message.strip_prefix("[req:") {
        if let Some(end) = rest.find(']') {
            let id = rest[..end].to_string();
            let body = rest[end + 1..].trim_start().to_string();
            return (Some(id), body);
        }
    }
    (None, message)
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub show_colors: bool,
    pub show_module: bool,
    pub include_timestamp: bool,
    pub timestamp_format: String,
    pub output_json: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: true,
            show_module: true,
            include_timestamp: true,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            output_json: false,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        self
    }

    pub fn production() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: false,
            output_json: true,
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LogLevel::Debug,
            show_colors: true,
            output_json: false,
            ..Default::default()
        }
    }

    /// `LOG_FORMAT=json` selects production output; `LOG_LEVEL` overrides
    /// the level either way.
    pub fn from_env() -> Self {
        let json = std::env::var("LOG_FORMAT").map_or(false, |v| v == "json");
        let config = if json {
            Self::production()
        } else {
            Self::development()
        };
        match std::env::var("LOG_LEVEL").ok().as_deref().and_then(LogLevel::parse) {
            Some(level) => config.with_level(level),
            None => config,
        }
    }
}

pub struct StoryLogger {
    config: Mutex<LoggerConfig>,
}

impl StoryLogger {
    pub fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
        }
    }

    pub fn update_config(&self, new_config: LoggerConfig) {
        if let Ok(mut config) = self.config.lock() {
            *config = new_config;
        }
    }

    fn format_console_output(&self, entry: &LogEntry, config: &LoggerConfig) -> String {
        let mut output = String::new();

        if config.include_timestamp {
            let timestamp = entry.timestamp.format(&config.timestamp_format).to_string();
            if config.show_colors {
                output.push_str(&format!("{} ", timestamp.bright_black()));
            } else {
                output.push_str(&format!("{} ", timestamp));
            }
        }

        let level = format!("{:5}", entry.level.as_str());
        if config.show_colors {
            output.push_str(&format!("[{}] ", level.color(entry.level.color()).bold()));
        } else {
            output.push_str(&format!("[{}] ", level));
        }

        if config.show_module && !entry.module.is_empty() {
            if config.show_colors {
                output.push_str(&format!("{}: ", entry.module.bright_blue()));
            } else {
                output.push_str(&format!("{}: ", entry.module));
            }
        }

        output.push_str(&entry.message);

        if let Some(request_id) = &entry.request_id {
            if config.show_colors {
                output.push_str(&format!(" [req:{}]", request_id.bright_yellow()));
            } else {
                output.push_str(&format!(" [req:{}]", request_id));
            }
        }

        output
    }

    fn create_log_entry(&self, record: &Record) -> LogEntry {
        LogEntry::new(
            LogLevel::from_level(record.level()),
            record.args().to_string(),
            record.module_path().unwrap_or("unknown").to_string(),
            record.line().unwrap_or(0),
        )
    }
}

impl Default for StoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for StoryLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.lock() {
            Ok(config) => metadata.level() <= config.min_level.to_level(),
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = self.create_log_entry(record);
        if let Ok(config) = self.config.lock() {
            let line = if config.output_json {
                serde_json::to_string(&entry).unwrap_or_default()
            } else {
                self.format_console_output(&entry, &config)
            };
            let stderr = io::stderr();
            let _ = writeln!(stderr.lock(), "{}", line);
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Logs how long a pipeline stage took when dropped.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("{} started", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!("{}", self.finished_message());
    }
}

impl Timer {
    fn finished_message(&self) -> String {
        format!("{} took {}ms", self.name, self.elapsed().as_millis())
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

pub fn log_startup_info(app_name: &str, version: &str, port: u16) {
    log::info!("Starting {} v{}", app_name, version);
    log::info!("Server will run on http://0.0.0.0:{}", port);
}

pub fn log_config_info(config: &crate::config::Config) {
    log::info!("Configuration loaded:");
    log::info!("   Port: {}", config.port);
    log::info!("   Provider: {:?}", config.provider);
    log::info!(
        "   PostgreSQL: {}",
        if config.use_psql { "enabled" } else { "disabled" }
    );
    log::info!(
        "   Timeouts: text {:?}, image {:?}, request {:?}",
        config.generation.text_timeout,
        config.generation.image_timeout,
        config.generation.request_timeout
    );
}
