//! User-visible notifications.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NoticeLevel::Info => "INFO",
            NoticeLevel::Success => "SUCCESS",
            NoticeLevel::Error => "ERROR",
        })
    }
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

pub trait Notifier {
    fn notify(&mut self, level: NoticeLevel, message: &str);
}

/// Prints notices as `LEVEL: message` lines on stdout.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&mut self, level: NoticeLevel, message: &str) {
        println!("{}: {}", level, message);
    }
}

/// Keeps every notice for later inspection.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub notices: Vec<Notice>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn last(&self) -> Option<&Notice> {
        self.notices.last()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&mut self, level: NoticeLevel, message: &str) {
        self.notices.push(Notice {
            level,
            message: message.to_string(),
        });
    }
}
