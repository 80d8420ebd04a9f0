//! Conversation records as produced by the messaging scraper.
//!
//! These are read-only inputs. Every field except `sender` is optional on the
//! wire because the scraper omits keys it could not fill.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationRecord {
    #[serde(default = "unknown_sender")]
    pub sender: String,
    /// Name recovered from a message signature when the conversation is
    /// relayed through someone else's thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_name: Option<String>,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub preview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default)]
    pub messages: Vec<MessageItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageItem {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    #[serde(default)]
    pub google_drive_links: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttachmentRef {
    #[serde(default)]
    pub filename: String,
    #[serde(default, alias = "url", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_path: Option<PathBuf>,
    #[serde(default)]
    pub is_resume: bool,
}

fn unknown_sender() -> String {
    "Unknown".to_string()
}

impl ConversationRecord {
    /// The name the conversation should be attributed to: the signature name
    /// when one was recovered, otherwise the display sender.
    pub fn display_identity(&self) -> &str {
        self.actual_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.sender.trim())
    }

    /// Subject (if any) followed by every message body, newline separated.
    pub fn full_text(&self) -> String {
        let mut text = String::new();
        if let Some(subject) = self.subject.as_deref().filter(|s| !s.trim().is_empty()) {
            text.push_str(subject);
            text.push_str("\n\n");
        }
        for message in &self.messages {
            if message.content.is_empty() {
                continue;
            }
            text.push_str(&message.content);
            text.push('\n');
        }
        text
    }

    pub fn attachments(&self) -> impl Iterator<Item = &AttachmentRef> {
        self.messages.iter().flat_map(|m| m.attachments.iter())
    }

    pub fn drive_links(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .flat_map(|m| m.google_drive_links.iter().map(String::as_str))
    }

    pub fn emails(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .flat_map(|m| m.emails.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserializes_with_missing_optional_keys() {
        let json = r#"[{"sender": "Jane Doe", "messages": [{"content": "hi"}]}]"#;
        let records: Vec<ConversationRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].sender, "Jane Doe");
        assert!(records[0].actual_name.is_none());
        assert!(records[0].messages[0].attachments.is_empty());
    }

    #[test]
    fn test_missing_sender_defaults_to_unknown() {
        let record: ConversationRecord = serde_json::from_str(r#"{"messages": []}"#).unwrap();
        assert_eq!(record.sender, "Unknown");
    }

    #[test]
    fn test_display_identity_prefers_actual_name() {
        let record = ConversationRecord {
            sender: "Recruiter Bob".to_string(),
            actual_name: Some("Alice Wong".to_string()),
            ..Default::default()
        };
        assert_eq!(record.display_identity(), "Alice Wong");
    }

    #[test]
    fn test_display_identity_ignores_blank_actual_name() {
        let record = ConversationRecord {
            sender: "Bob".to_string(),
            actual_name: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(record.display_identity(), "Bob");
    }

    #[test]
    fn test_full_text_prepends_subject() {
        let record = ConversationRecord {
            subject: Some("Referral".to_string()),
            messages: vec![
                MessageItem {
                    content: "first".to_string(),
                    ..Default::default()
                },
                MessageItem {
                    content: "second".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(record.full_text(), "Referral\n\nfirst\nsecond\n");
    }
}
