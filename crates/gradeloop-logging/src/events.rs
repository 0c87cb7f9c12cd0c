use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Structured log events for the generation loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    LoopStarted {
        topic: String,
        grade_level: u8,
        subject: String,
        max_retries: usize,
    },
    DraftStarted {
        attempt: usize,
        has_feedback: bool,
    },
    DraftCompleted {
        attempt: usize,
        content_len: usize,
    },
    GradeCompleted {
        attempt: usize,
        overall_score: f64,
        passed: bool,
        critical_issues: usize,
    },
    ImprovementExtracted {
        attempt: usize,
        failing_criteria: usize,
        critical_issues: usize,
    },
    LoopCompleted {
        attempts: usize,
        overall_score: f64,
        passed: bool,
    },
    RetriesExhausted {
        attempts: usize,
        best_score: f64,
    },
    ErrorEncountered {
        attempt: usize,
        error: String,
    },
    CurveReloaded {
        criteria: usize,
        computed_from: usize,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for loop events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with JSONL file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON lines, regardless of console format
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::LoopStarted {
                topic,
                grade_level,
                subject,
                max_retries,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} {} (Grade {} {}, up to {} retries)",
                    "▶".bright_blue(),
                    topic.bold().bright_white(),
                    grade_level,
                    subject,
                    max_retries
                );
            }
            LogEvent::DraftStarted {
                attempt,
                has_feedback,
            } => {
                let label = if *has_feedback { "REDRAFT" } else { "DRAFT" };
                let _ = writeln!(
                    stderr,
                    "  {} {} (attempt {})",
                    "▶".bright_cyan(),
                    label.bright_cyan().bold(),
                    attempt + 1
                );
            }
            LogEvent::DraftCompleted {
                attempt,
                content_len,
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} attempt {} drafted ({} chars)",
                    "✓".bright_green(),
                    attempt + 1,
                    content_len
                );
            }
            LogEvent::GradeCompleted {
                attempt,
                overall_score,
                passed,
                critical_issues,
            } => {
                let verdict = if *passed {
                    format!("PASS {:.2}", overall_score).bright_green().to_string()
                } else {
                    format!("FAIL {:.2} ({} critical)", overall_score, critical_issues)
                        .bright_yellow()
                        .to_string()
                };
                let _ = writeln!(stderr, "    {} attempt {}: {}", "◆".bright_magenta(), attempt + 1, verdict);
            }
            LogEvent::ImprovementExtracted {
                failing_criteria,
                critical_issues,
                ..
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} {} failing criteria, {} critical issues",
                    "→".bright_yellow(),
                    failing_criteria,
                    critical_issues
                );
            }
            LogEvent::LoopCompleted {
                attempts,
                overall_score,
                passed,
            } => {
                let _ = writeln!(stderr);
                if *passed {
                    let _ = writeln!(
                        stderr,
                        "{} Accepted after {} attempt(s), score {:.2}",
                        "✓".bright_green(),
                        attempts,
                        overall_score
                    );
                } else {
                    let _ = writeln!(
                        stderr,
                        "{} Best effort after {} attempt(s), score {:.2}",
                        "⚠".bright_yellow(),
                        attempts,
                        overall_score
                    );
                }
            }
            LogEvent::RetriesExhausted {
                attempts,
                best_score,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} Retry budget exhausted ({} attempts, best {:.2})",
                    "⚠".bright_yellow(),
                    attempts,
                    best_score
                );
            }
            LogEvent::ErrorEncountered { attempt, error } => {
                let _ = writeln!(
                    stderr,
                    "{} Error in attempt {}: {}",
                    "✗".bright_red(),
                    attempt + 1,
                    error.bright_red()
                );
            }
            LogEvent::CurveReloaded {
                criteria,
                computed_from,
            } => {
                let _ = writeln!(
                    stderr,
                    "{} Calibration curve reloaded ({} criteria, {} exemplars)",
                    "↻".bright_blue(),
                    criteria,
                    computed_from
                );
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::LoopStarted { topic, .. } => format!("[{}] loop:start {}", timestamp, topic),
            LogEvent::DraftStarted { attempt, .. } => {
                format!("[{}] draft:start:{}", timestamp, attempt + 1)
            }
            LogEvent::DraftCompleted {
                attempt,
                content_len,
            } => format!("[{}] draft:done:{} {}ch", timestamp, attempt + 1, content_len),
            LogEvent::GradeCompleted {
                attempt,
                overall_score,
                passed,
                ..
            } => format!(
                "[{}] grade:{} {:.2} {}",
                timestamp,
                attempt + 1,
                overall_score,
                if *passed { "pass" } else { "fail" }
            ),
            LogEvent::ImprovementExtracted {
                attempt,
                failing_criteria,
                ..
            } => format!("[{}] brief:{} {}crit", timestamp, attempt + 1, failing_criteria),
            LogEvent::LoopCompleted {
                attempts,
                overall_score,
                ..
            } => format!("[{}] loop:done:{} {:.2}", timestamp, attempts, overall_score),
            LogEvent::RetriesExhausted { attempts, .. } => {
                format!("[{}] loop:limit:{}", timestamp, attempts)
            }
            LogEvent::ErrorEncountered { attempt, error } => {
                format!("[{}] error:{}:{}", timestamp, attempt + 1, error)
            }
            LogEvent::CurveReloaded { criteria, .. } => {
                format!("[{}] curve:reload:{}", timestamp, criteria)
            }
        };
        let _ = writeln!(stderr, "{}", msg);
    }
}
