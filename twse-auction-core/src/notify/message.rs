use serde::{Deserialize, Serialize};

/// Webhook limit on fields per message.
pub const MAX_FIELDS_PER_MESSAGE: usize = 25;
/// Webhook limit on characters per field value.
pub const MAX_FIELD_VALUE_CHARS: usize = 1024;

pub const COLOR_ADDED: u32 = 0x22C55E;
pub const COLOR_CHANGED: u32 = 0xF59E0B;
pub const COLOR_REMOVED: u32 = 0xEF4444;

/// One structured message unit, serialized in webhook embed shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyMessage {
    pub title: String,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub fields: Vec<MessageField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<MessageFooter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFooter {
    pub text: String,
}

impl NotifyMessage {
    pub fn new(title: impl Into<String>, color: u32) -> Self {
        NotifyMessage {
            title: title.into(),
            color,
            description: None,
            fields: vec![],
            footer: None,
        }
    }

    /// Append a field, truncating the value and dropping fields past the limit.
    pub fn field(mut self, name: impl Into<String>, value: impl AsRef<str>, inline: bool) -> Self {
        if self.fields.len() < MAX_FIELDS_PER_MESSAGE {
            self.fields.push(MessageField {
                name: name.into(),
                value: truncate_chars(value.as_ref(), MAX_FIELD_VALUE_CHARS),
                inline,
            });
        }
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn footer(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.footer = Some(MessageFooter { text });
        }
        self
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Every message produced for one diff, plus the summary line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationBatch {
    pub summary: String,
    pub messages: Vec<NotifyMessage>,
}

/// One transport call: at most `limit` messages, summary only on the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch<'a> {
    pub content: Option<&'a str>,
    pub messages: &'a [NotifyMessage],
}

impl NotificationBatch {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Split into transport calls of at most `limit` messages each.
    pub fn dispatches(&self, limit: usize) -> Vec<Dispatch<'_>> {
        let limit = limit.max(1);
        self.messages
            .chunks(limit)
            .enumerate()
            .map(|(i, chunk)| Dispatch {
                content: (i == 0).then_some(self.summary.as_str()),
                messages: chunk,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(n: usize) -> NotificationBatch {
        NotificationBatch {
            summary: "summary".to_string(),
            messages: (0..n).map(|i| NotifyMessage::new(format!("m{i}"), 0)).collect(),
        }
    }

    #[test]
    fn test_dispatches_chunk_by_limit() {
        let batch = batch(23);
        let dispatches = batch.dispatches(10);
        let sizes: Vec<usize> = dispatches.iter().map(|d| d.messages.len()).collect();

        assert_eq!(sizes, vec![10, 10, 3]);
        assert_eq!(dispatches[0].content, Some("summary"));
        assert!(dispatches[1..].iter().all(|d| d.content.is_none()));
        assert_eq!(dispatches[2].messages[0].title, "m20");
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        assert_eq!(batch(20).dispatches(10).len(), 2);
    }

    #[test]
    fn test_long_field_value_truncated() {
        let message = NotifyMessage::new("t", 0).field("f", "x".repeat(2000), false);
        assert_eq!(message.fields[0].value.chars().count(), MAX_FIELD_VALUE_CHARS);
        assert!(message.fields[0].value.ends_with('…'));
    }

    #[test]
    fn test_field_count_capped() {
        let message = (0..40).fold(NotifyMessage::new("t", 0), |m, i| {
            m.field(format!("f{i}"), "v", true)
        });
        assert_eq!(message.fields.len(), MAX_FIELDS_PER_MESSAGE);
    }

    #[test]
    fn test_serializes_in_embed_shape() {
        let message = NotifyMessage::new("title", COLOR_ADDED)
            .field("name", "value", true)
            .footer("footer");
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["title"], "title");
        assert_eq!(json["color"], 0x22C55E);
        assert_eq!(json["fields"][0]["inline"], true);
        assert_eq!(json["footer"]["text"], "footer");
        assert!(json.get("description").is_none());
    }
}
