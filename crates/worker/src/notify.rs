//! Push notifications and notification clicks.

use birdie_core::NotificationConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Key attached to every notification so the shell can group them.
const PRIMARY_KEY: &str = "2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Milliseconds since the Unix epoch.
    pub date_of_arrival: i64,
    pub primary_key: String,
}

/// A notification the host should display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u64>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl NotificationRequest {
    /// Build the notification for a push whose payload text is `payload`.
    pub fn from_push(config: &NotificationConfig, payload: Option<&str>, now: DateTime<Utc>) -> Self {
        let body = match payload {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => config.default_body.clone(),
        };

        Self {
            title: config.title.clone(),
            body,
            icon: config.icon.clone(),
            badge: config.icon.clone(),
            vibrate: config.vibrate.clone(),
            data: NotificationData { date_of_arrival: now.timestamp_millis(), primary_key: PRIMARY_KEY.to_string() },
            actions: vec![
                NotificationAction {
                    action: config.open_action.clone(),
                    title: config.open_action_title.clone(),
                    icon: config.icon.clone(),
                },
                NotificationAction {
                    action: config.close_action.clone(),
                    title: config.close_action_title.clone(),
                    icon: config.icon.clone(),
                },
            ],
        }
    }
}

/// What the host does after a notification click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationClick {
    /// Always true: the clicked notification is dismissed.
    pub close: bool,
    /// Window to open, if any.
    pub open_url: Option<String>,
}

impl NotificationClick {
    pub fn from_action(config: &NotificationConfig, action: Option<&str>) -> Self {
        let open_url = (action == Some(config.open_action.as_str())).then(|| config.open_url.clone());
        Self { close: true, open_url }
    }
}
