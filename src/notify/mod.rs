use std::fmt::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use enum_dispatch::enum_dispatch;
use thiserror::Error;

pub mod channels;

use channels::{Channel, ConsoleNotifier, LogNotifier};

use crate::config::ChannelKind;

const REPORT_BODY: &str = "Hello Team,\n\n\
Attached is this week's sales report with key insights and charts. \
Please review and let me know if you have any questions.\n\n\
Best regards,\nAutomation Bot";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("no recipients to notify")]
    NoRecipients,
    #[error("failed to emit notification: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<PathBuf>,
}

impl Message {
    pub fn weekly_report(recipients: &[String], date: NaiveDate, attachments: Vec<PathBuf>) -> Message {
        Message {
            recipients: recipients.to_vec(),
            subject: format!("Weekly Sales Report - {}", date.format("%Y-%m-%d")),
            body: REPORT_BODY.to_string(),
            attachments,
        }
    }

    /// Plain text rendering of the message as it would be delivered.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "--- Simulated Email Delivery ---");
        let _ = writeln!(out, "To: {}", self.recipients.join(", "));
        let _ = writeln!(out, "Subject: {}\n", self.subject);
        let _ = writeln!(out, "{}", self.body);
        if !self.attachments.is_empty() {
            let _ = writeln!(out, "\nAttachments:");
            for attachment in &self.attachments {
                let _ = writeln!(out, " - {}", attachment.display());
            }
        }
        let _ = writeln!(out, "--- End of Email ---");
        out
    }
}

/// What a channel did with a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub channel: &'static str,
    pub recipients: Vec<String>,
    pub subject: String,
    pub attachments: Vec<PathBuf>,
    pub transcript: String,
}

impl Delivery {
    fn of(channel: &'static str, message: &Message) -> Delivery {
        Delivery {
            channel,
            recipients: message.recipients.clone(),
            subject: message.subject.clone(),
            attachments: message.attachments.clone(),
            transcript: message.transcript(),
        }
    }
}

#[enum_dispatch]
pub trait Notifier {
    fn name(&self) -> &'static str;

    fn deliver(&self, delivery: &Delivery) -> Result<(), NotifyError>;

    fn send(&self, message: &Message) -> Result<Delivery, NotifyError> {
        if message.recipients.is_empty() {
            return Err(NotifyError::NoRecipients);
        }

        let delivery = Delivery::of(self.name(), message);
        self.deliver(&delivery)?;

        Ok(delivery)
    }
}

impl From<ChannelKind> for Channel {
    fn from(kind: ChannelKind) -> Self {
        match kind {
            ChannelKind::Console => Channel::ConsoleNotifier(ConsoleNotifier),
            ChannelKind::Log => Channel::LogNotifier(LogNotifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{bail, Result};
    use pretty_assertions::assert_eq;

    use super::*;

    fn message(recipients: &[&str], attachments: &[&str]) -> Message {
        let recipients: Vec<String> = recipients.iter().map(|r| r.to_string()).collect();
        Message::weekly_report(
            &recipients,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            attachments.iter().map(|a| PathBuf::from(*a)).collect(),
        )
    }

    #[test]
    fn test_transcript() {
        let message = message(&["alice@example.com", "bob@example.com"], &["output/report.xlsx", "output/charts/a.png"]);

        let transcript = message.transcript();

        assert_eq!(message.subject, "Weekly Sales Report - 2024-01-15");
        assert!(transcript.starts_with("--- Simulated Email Delivery ---\nTo: alice@example.com, bob@example.com\n"));
        assert!(transcript.contains("Subject: Weekly Sales Report - 2024-01-15\n\nHello Team,"));
        assert!(transcript.contains("\nAttachments:\n - output/report.xlsx\n - output/charts/a.png\n"));
        assert!(transcript.ends_with("--- End of Email ---\n"));
    }

    #[test]
    fn test_transcript_without_attachments() {
        let transcript = message(&["alice@example.com"], &[]).transcript();

        assert!(!transcript.contains("Attachments:"));
    }

    #[test]
    fn test_send_through_log_channel() -> Result<()> {
        let channel = Channel::from(ChannelKind::Log);
        let message = message(&["ops@example.com"], &["report.xlsx"]);

        let delivery = channel.send(&message)?;

        assert_eq!(delivery.channel, "log");
        assert_eq!(delivery.recipients, vec!["ops@example.com".to_string()]);
        assert_eq!(delivery.attachments, vec![PathBuf::from("report.xlsx")]);
        assert_eq!(delivery.transcript, message.transcript());

        Ok(())
    }

    #[test]
    fn test_send_through_console_channel() -> Result<()> {
        let delivery = Channel::from(ChannelKind::Console).send(&message(&["ops@example.com"], &[]))?;

        assert_eq!(delivery.channel, "console");

        Ok(())
    }

    #[test]
    fn test_send_without_recipients() -> Result<()> {
        if let Err(err) = Channel::from(ChannelKind::Console).send(&message(&[], &[])) {
            assert!(matches!(err, NotifyError::NoRecipients));
        } else {
            bail!("a message without recipients should not be delivered");
        }

        Ok(())
    }
}
