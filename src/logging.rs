//! Catalog Logging System
//!
//! Diagnostic lines go to stderr (stdout is reserved for the run summary),
//! optionally mirrored to a log file that starts with a run header.

use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

static LOGGER: OnceLock<Arc<Mutex<CatalogLogger>>> = OnceLock::new();

// ============================================================================
// Run Information
// ============================================================================

#[derive(Debug, Clone)]
pub struct RunInfo {
    pub app_version: String,
    pub output_path: String,
    pub primary_repo: String,
    pub merge_strategy: String,
    pub authenticated: bool,
}

impl RunInfo {
    pub fn to_log_header(&self) -> String {
        format!(
r#"================================================================================
Canary Catalog Log - {}
================================================================================
Application:   canary-catalog v{}
Run Info:
  Catalog:     {}
  Primary:     {}
  Merge:       {}
  Auth:        {}
================================================================================"#,
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.app_version,
            self.output_path,
            self.primary_repo,
            self.merge_strategy,
            if self.authenticated { "token" } else { "anonymous" },
        )
    }
}

// ============================================================================
// Log Levels
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLevel {
    Debug,
    Info,
    Fetch, // Outgoing GitHub API requests
    Warning,
    Error,
}

impl LogLevel {
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Debug => "[DEBUG]",
            LogLevel::Info => "[INFO]",
            LogLevel::Fetch => "[FETCH]",
            LogLevel::Warning => "[WARNING]",
            LogLevel::Error => "[ERROR]",
        }
    }
}

// ============================================================================
// Catalog Logger
// ============================================================================

pub struct CatalogLogger {
    log_file: Option<File>,
    quiet: bool,
}

impl CatalogLogger {
    fn stderr_only() -> Self {
        Self {
            log_file: None,
            quiet: false,
        }
    }

    pub fn new(log_path: Option<&Path>, quiet: bool, run_info: Option<&RunInfo>) -> Self {
        let log_file = log_path.and_then(|path| {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            OpenOptions::new().create(true).append(true).open(path).ok()
        });

        let mut logger = Self { log_file, quiet };

        // The header only goes to the file; stderr stays line-oriented
        if let Some(info) = run_info {
            logger.write_file(&info.to_log_header());
        }

        logger
    }

    fn write_file(&mut self, msg: &str) {
        if let Some(ref mut file) = self.log_file {
            let _ = writeln!(file, "{}", msg);
            let _ = file.flush();
        }
    }

    pub fn log(&mut self, level: LogLevel, message: &str) {
        let timestamp = Local::now().format("%H:%M:%S");
        let formatted = format!("[{}] {} {}", timestamp, level.prefix(), message);
        self.write_file(&formatted);

        if !(self.quiet && level == LogLevel::Debug) {
            eprintln!("{}", formatted);
        }
    }
}

// ============================================================================
// Global Logger Access
// ============================================================================

/// Initialize the global logger (call once at startup, before any logging)
pub fn init_logger(log_path: Option<&Path>, quiet: bool, run_info: &RunInfo) {
    LOGGER.get_or_init(|| Arc::new(Mutex::new(CatalogLogger::new(log_path, quiet, Some(run_info)))));
}

/// Get the global logger instance, falling back to stderr-only output
fn logger() -> Arc<Mutex<CatalogLogger>> {
    LOGGER
        .get_or_init(|| Arc::new(Mutex::new(CatalogLogger::stderr_only())))
        .clone()
}

// ============================================================================
// Convenience Logging Functions
// ============================================================================

pub fn log_debug(message: &str) {
    if let Ok(mut log) = logger().lock() {
        log.log(LogLevel::Debug, message);
    }
}

pub fn log_info(message: &str) {
    if let Ok(mut log) = logger().lock() {
        log.log(LogLevel::Info, message);
    }
}

pub fn log_fetch(message: &str) {
    if let Ok(mut log) = logger().lock() {
        log.log(LogLevel::Fetch, message);
    }
}

pub fn log_warning(message: &str) {
    if let Ok(mut log) = logger().lock() {
        log.log(LogLevel::Warning, message);
    }
}

pub fn log_error(message: &str) {
    if let Ok(mut log) = logger().lock() {
        log.log(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_run_info() -> RunInfo {
        RunInfo {
            app_version: "1.2.0".to_string(),
            output_path: "data/canary_releases.json".to_string(),
            primary_repo: "xenia-canary/xenia-canary-releases".to_string(),
            merge_strategy: "full-rescan".to_string(),
            authenticated: false,
        }
    }

    #[test]
    fn test_header_contains_run_info() {
        let header = sample_run_info().to_log_header();
        assert!(header.contains("canary-catalog v1.2.0"));
        assert!(header.contains("data/canary_releases.json"));
        assert!(header.contains("full-rescan"));
        assert!(header.contains("anonymous"));
    }

    #[test]
    fn test_log_file_receives_header_and_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("run.log");

        let mut logger = CatalogLogger::new(Some(path.as_path()), true, Some(&sample_run_info()));
        logger.log(LogLevel::Debug, "Requesting repos/a/b/releases");
        logger.log(LogLevel::Warning, "something odd");
        drop(logger);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("====="));
        // Quiet only silences stderr, the file keeps debug lines
        assert!(content.contains("[DEBUG] Requesting repos/a/b/releases"));
        assert!(content.contains("[WARNING] something odd"));
    }
}
