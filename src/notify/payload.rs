// Push Payload Wire Format
//
// Payloads arrive as JSON from the dispatcher. Decoding is lenient: parsed
// fields are merged over the configured defaults, and anything unparseable
// degrades to a plain-text body so a malformed payload still renders.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::NotifyConfig;

/// An action button attached to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadAction {
    pub action: String,
    pub title: String,
}

/// The decoded push payload. `tag` and `actions` are optional on the wire;
/// title, body, and url are filled from defaults when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<PayloadAction>,
}

/// Wire shape with every field optional, used to merge partial payloads
#[derive(Debug, Deserialize)]
struct PartialPayload {
    title: Option<String>,
    body: Option<String>,
    url: Option<String>,
    tag: Option<String>,
    #[serde(default)]
    actions: Vec<PayloadAction>,
}

impl NotificationPayload {
    /// Decode raw push bytes, merging parsed fields over the defaults.
    /// Never fails: non-JSON input becomes the body of a default payload.
    pub fn decode(raw: &[u8], defaults: &NotifyConfig) -> Self {
        match serde_json::from_slice::<PartialPayload>(raw) {
            Ok(partial) => Self {
                title: partial
                    .title
                    .unwrap_or_else(|| defaults.default_title.clone()),
                body: partial.body.unwrap_or_else(|| defaults.default_body.clone()),
                url: partial.url.unwrap_or_else(|| defaults.default_url.clone()),
                tag: partial.tag,
                actions: partial.actions,
            },
            Err(err) => {
                debug!("push payload is not JSON ({err}), rendering raw text body");
                let text = String::from_utf8_lossy(raw).trim().to_string();
                Self {
                    title: defaults.default_title.clone(),
                    body: if text.is_empty() {
                        defaults.default_body.clone()
                    } else {
                        text
                    },
                    url: defaults.default_url.clone(),
                    tag: None,
                    actions: Vec::new(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_payload_round_trip() {
        let defaults = NotifyConfig::default();
        let raw = br#"{
            "title": "Daily Devotional",
            "body": "Today's reading is ready",
            "url": "/devotional/today",
            "tag": "devotional",
            "actions": [
                { "action": "read", "title": "Read now" },
                { "action": "dismiss", "title": "Later" }
            ]
        }"#;

        let payload = NotificationPayload::decode(raw, &defaults);
        assert_eq!(payload.title, "Daily Devotional");
        assert_eq!(payload.body, "Today's reading is ready");
        assert_eq!(payload.url, "/devotional/today");
        assert_eq!(payload.tag.as_deref(), Some("devotional"));
        assert_eq!(payload.actions.len(), 2);
        assert_eq!(payload.actions[0].action, "read");
    }

    #[test]
    fn test_partial_payload_merges_defaults() {
        let defaults = NotifyConfig::default();
        let payload = NotificationPayload::decode(br#"{ "body": "X" }"#, &defaults);

        assert_eq!(payload.title, "Cleave");
        assert_eq!(payload.body, "X");
        assert_eq!(payload.url, "/dashboard");
        assert!(payload.tag.is_none());
        assert!(payload.actions.is_empty());
    }

    #[test]
    fn test_non_json_payload_becomes_text_body() {
        let defaults = NotifyConfig::default();
        let payload = NotificationPayload::decode(b"your spouse sent a nudge", &defaults);

        assert_eq!(payload.title, "Cleave");
        assert_eq!(payload.body, "your spouse sent a nudge");
        assert_eq!(payload.url, "/dashboard");
    }

    #[test]
    fn test_empty_payload_uses_default_body() {
        let defaults = NotifyConfig::default();
        let payload = NotificationPayload::decode(b"", &defaults);
        assert_eq!(payload.body, defaults.default_body);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let defaults = NotifyConfig::default();
        let payload = NotificationPayload::decode(
            br#"{ "body": "X", "badge": "/icons/badge.png" }"#,
            &defaults,
        );
        assert_eq!(payload.body, "X");
    }
}
