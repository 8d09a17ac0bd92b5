//! Console formatting with ANSI colors
use super::config::LoggerConfig;
use super::levels::LogLevel;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stdout, ErrorKind, Write};

/// Column widths for alignment
const TAG_WIDTH: usize = 10;
const LEVEL_WIDTH: usize = 8;

pub fn format_and_log(config: &LoggerConfig, tag: &LogTag, level: LogLevel, message: &str) {
    let time = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let line = if config.plain {
        format!(
            "{} [{:<tag_w$}] [{:<lvl_w$}] {}",
            time,
            tag.label(),
            level.as_str(),
            message,
            tag_w = TAG_WIDTH,
            lvl_w = LEVEL_WIDTH
        )
    } else {
        format!(
            "{} [{}] [{}] {}",
            time.dimmed(),
            format_tag(tag),
            format_level(level),
            message
        )
    };

    print_stdout_safe(&line);
}

fn format_tag(tag: &LogTag) -> ColoredString {
    let label = format!("{:<width$}", tag.label(), width = TAG_WIDTH);
    match tag {
        LogTag::System => label.bright_yellow().bold(),
        LogTag::Config => label.bright_white().bold(),
        LogTag::Upstream => label.bright_purple().bold(),
        LogTag::Cache => label.bright_cyan().bold(),
        LogTag::Updater => label.bright_green().bold(),
        LogTag::Stats => label.bright_blue().bold(),
        LogTag::Other(_) => label.white().bold(),
    }
}

fn format_level(level: LogLevel) -> ColoredString {
    let label = format!("{:<width$}", level.as_str(), width = LEVEL_WIDTH);
    match level {
        LogLevel::Error => label.bright_red().bold(),
        LogLevel::Warning => label.bright_yellow().bold(),
        LogLevel::Info => label.white().bold(),
        LogLevel::Debug | LogLevel::Verbose => label.dimmed(),
    }
}

/// Print to stdout but ignore broken pipe errors
fn print_stdout_safe(message: &str) {
    let mut out = stdout().lock();
    if let Err(e) = writeln!(out, "{}", message) {
        if e.kind() == ErrorKind::BrokenPipe {
            return;
        }
        let _ = writeln!(std::io::stderr(), "Logger stdout error: {}", e);
    }
    let _ = out.flush();
}
