//! blasmod logging system
//!
//! Writes a session log file with a short system information header. The
//! console is left to `console` so that log lines and user-facing messages
//! don't mix.

use chrono::Local;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

static LOGGER: OnceLock<Mutex<ModLogger>> = OnceLock::new();

// ============================================================================
// System Information Detection
// ============================================================================

#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub app_version: String,
    pub distro: String,
    pub kernel: String,
}

impl SystemInfo {
    pub fn detect() -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            distro: detect_distro(),
            kernel: detect_kernel(),
        }
    }

    pub fn to_log_header(&self, tool_name: &str, game: &str) -> String {
        format!(
r#"================================================================================
{} Log - {}
================================================================================
Application:   {} v{}
Game:          {}
System Info:
  Distro:      {}
  Kernel:      {}
================================================================================"#,
            tool_name,
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            tool_name,
            self.app_version,
            game,
            self.distro,
            self.kernel,
        )
    }
}

fn detect_distro() -> String {
    if let Ok(file) = File::open("/etc/os-release") {
        let reader = BufReader::new(file);
        for line in reader.lines().map_while(Result::ok) {
            if line.starts_with("PRETTY_NAME=") {
                return line
                    .trim_start_matches("PRETTY_NAME=")
                    .trim_matches('"')
                    .to_string();
            }
        }
    }
    "Unknown".to_string()
}

fn detect_kernel() -> String {
    if let Ok(output) = Command::new("uname").arg("-r").output() {
        if output.status.success() {
            return String::from_utf8_lossy(&output.stdout).trim().to_string();
        }
    }
    "Unknown".to_string()
}

// ============================================================================
// Log Levels
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Info,
    Action, // Commands run by the user
    Download,
    Install,
    Warning,
    Error,
}

impl LogLevel {
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Info => "[INFO]",
            LogLevel::Action => "[ACTION]",
            LogLevel::Download => "[DOWNLOAD]",
            LogLevel::Install => "[INSTALL]",
            LogLevel::Warning => "[WARNING]",
            LogLevel::Error => "[ERROR]",
        }
    }
}

// ============================================================================
// Logger
// ============================================================================

pub struct ModLogger {
    log_file: Option<File>,
    path: PathBuf,
}

impl ModLogger {
    pub fn new(log_dir: &Path, tool_name: &str, game: &str) -> Self {
        let _ = fs::create_dir_all(log_dir);

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = log_dir.join(format!("{}_{}.log", tool_name, timestamp));

        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok();

        let mut logger = Self { log_file, path };
        let header = SystemInfo::detect().to_log_header(tool_name, game);
        logger.write_raw(&header);
        logger
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_raw(&mut self, msg: &str) {
        if let Some(ref mut file) = self.log_file {
            let _ = writeln!(file, "{}", msg);
            let _ = file.flush();
        }
    }

    pub fn log(&mut self, level: LogLevel, message: &str) {
        let timestamp = Local::now().format("%H:%M:%S");
        let formatted = format!("[{}] {} {}", timestamp, level.prefix(), message);
        self.write_raw(&formatted);
    }
}

// ============================================================================
// Global Logger Access
// ============================================================================

/// Initialize the global logger (call once at startup).
///
/// Returns the path of the session log file. Until this is called every
/// `log_*` function is a no-op.
pub fn init_logger(log_dir: &Path, tool_name: &str, game: &str) -> PathBuf {
    LOGGER
        .get_or_init(|| Mutex::new(ModLogger::new(log_dir, tool_name, game)))
        .lock()
        .path()
        .to_path_buf()
}

fn log(level: LogLevel, message: &str) {
    if let Some(logger) = LOGGER.get() {
        logger.lock().log(level, message);
    }
}

// ============================================================================
// Convenience Logging Functions
// ============================================================================

pub fn log_info(message: &str) {
    log(LogLevel::Info, message);
}

pub fn log_action(message: &str) {
    log(LogLevel::Action, message);
}

pub fn log_download(message: &str) {
    log(LogLevel::Download, message);
}

pub fn log_install(message: &str) {
    log(LogLevel::Install, message);
}

pub fn log_warning(message: &str) {
    log(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log(LogLevel::Error, message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logger_writes_header_and_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let mut logger = ModLogger::new(tmp.path(), "blasmodcli", "Blasphemous");
        logger.log(LogLevel::Install, "Extracting 'Randomizer'");

        let content = fs::read_to_string(logger.path()).unwrap();
        assert!(content.contains("blasmodcli Log"));
        assert!(content.contains("Game:          Blasphemous"));
        assert!(content.contains("[INSTALL] Extracting 'Randomizer'"));
    }

    #[test]
    fn logging_before_init_is_silent() {
        // Must not panic or create files
        log_warning("nobody is listening");
    }
}
