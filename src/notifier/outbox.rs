use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crate::app::{BlogwatchError, Result};
use crate::notifier::{Message, Notifier};

/// Drops each message as a text file into a spool directory for a mail
/// relay to pick up.
pub struct OutboxNotifier {
    dir: PathBuf,
    from: String,
    sequence: AtomicU64,
}

impl OutboxNotifier {
    pub fn new<P: AsRef<Path>>(dir: P, from: impl Into<String>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            from: from.into(),
            sequence: AtomicU64::new(0),
        })
    }

    fn render(&self, message: &Message) -> String {
        format!(
            "From: {}\r\nTo: {}\r\nSubject: {}\r\nDate: {}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}",
            self.from,
            message.to,
            message.subject,
            Utc::now().to_rfc2822(),
            message.body
        )
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn send(&self, message: &Message) -> Result<()> {
        if message.to.trim().is_empty() {
            return Err(BlogwatchError::Notify("Message has no recipient".into()));
        }

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let name = format!("{}-{:04}.eml", Utc::now().format("%Y%m%dT%H%M%S%.3f"), seq);
        let path = self.dir.join(name);

        tokio::fs::write(&path, self.render(message))
            .await
            .map_err(|e| BlogwatchError::Notify(format!("{}: {}", path.display(), e)))?;

        tracing::info!(to = %message.to, path = %path.display(), "Notification queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str) -> Message {
        Message {
            to: to.into(),
            subject: "New Blog Posts: https://x.com (1 new)".into(),
            body: "body text".into(),
        }
    }

    #[tokio::test]
    async fn test_writes_one_file_per_message() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = OutboxNotifier::new(dir.path(), "monitor@example.com").unwrap();

        notifier.send(&message("a@example.com")).await.unwrap();
        notifier.send(&message("b@example.com")).await.unwrap();

        let mut files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        files.sort();
        assert_eq!(files.len(), 2);

        let first = fs::read_to_string(&files[0]).unwrap();
        assert!(first.starts_with("From: monitor@example.com\r\nTo: a@example.com\r\n"));
        assert!(first.contains("Subject: New Blog Posts: https://x.com (1 new)"));
        assert!(first.ends_with("\r\n\r\nbody text"));
    }

    #[tokio::test]
    async fn test_rejects_missing_recipient() {
        let dir = tempfile::tempdir().unwrap();
        let notifier = OutboxNotifier::new(dir.path(), "monitor@example.com").unwrap();

        let err = notifier.send(&message("  ")).await.unwrap_err();
        assert!(matches!(err, BlogwatchError::Notify(_)));
    }
}
