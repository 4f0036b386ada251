use std::time::{Duration, Instant};

/// How long a confirmation stays visible.
pub const INFO_TTL: Duration = Duration::from_secs(3);
/// How long an error stays visible.
pub const ERROR_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug)]
struct Entry {
    severity: Severity,
    text: String,
    posted_at: Instant,
    ttl: Duration,
}

/// Holds at most one transient status message. A new message replaces
/// the previous one; expired messages are dropped on read.
#[derive(Debug, Default)]
pub struct StatusLine {
    current: Option<Entry>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.set_with_ttl(Severity::Info, text, INFO_TTL);
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.set_with_ttl(Severity::Error, text, ERROR_TTL);
    }

    pub fn set_with_ttl(&mut self, severity: Severity, text: impl Into<String>, ttl: Duration) {
        self.current = Some(Entry {
            severity,
            text: text.into(),
            posted_at: Instant::now(),
            ttl,
        });
    }

    /// The live message, if any.
    pub fn current(&mut self) -> Option<(Severity, &str)> {
        let expired = matches!(&self.current, Some(entry) if entry.posted_at.elapsed() >= entry.ttl);
        if expired {
            self.current = None;
        }
        self.current
            .as_ref()
            .map(|entry| (entry.severity, entry.text.as_str()))
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_visible_before_ttl() {
        let mut status = StatusLine::new();
        status.set_info("Complaint registered successfully!");
        assert_eq!(
            status.current(),
            Some((Severity::Info, "Complaint registered successfully!"))
        );
    }

    #[test]
    fn test_message_expires_after_ttl() {
        let mut status = StatusLine::new();
        status.set_with_ttl(Severity::Error, "Something went wrong!", Duration::from_millis(10));
        assert_eq!(
            status.current(),
            Some((Severity::Error, "Something went wrong!"))
        );
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(status.current(), None);
        // Stays gone on repeated reads.
        assert_eq!(status.current(), None);
    }

    #[test]
    fn test_new_message_replaces_old() {
        let mut status = StatusLine::new();
        status.set_info("first");
        status.set_error("second");
        assert_eq!(status.current(), Some((Severity::Error, "second")));
    }

    #[test]
    fn test_clear_drops_message() {
        let mut status = StatusLine::new();
        status.set_info("noted");
        status.clear();
        assert_eq!(status.current(), None);
    }

    #[test]
    fn test_error_outlives_info_ttl() {
        assert!(ERROR_TTL > INFO_TTL);
        assert_eq!(INFO_TTL, Duration::from_secs(3));
        assert_eq!(ERROR_TTL, Duration::from_secs(5));
    }
}
