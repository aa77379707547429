use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::detail::LaunchDetail;
use crate::list::LaunchList;
use crate::navigation::{maps_failure_message, DevicePlatform, NAVIGATION_ERROR_TITLE};

pub const LOCATION_PROMPT_TITLE: &str = "Location Permission";
pub const LOCATION_PROMPT_MESSAGE: &str = "To show your location on the map and calculate distance to the launchpad, we need access to your location.";
pub const LOCATION_ERROR_TITLE: &str = "Location Unavailable";
pub const WEBCAST_FAILURE: &str = "Unable to open the webcast link.";

#[derive(Default, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Single "OK" button.
    #[default]
    Info,
    /// "Not Now" / "Allow"; confirming starts the location flow.
    LocationPrompt,
}

/// One-shot modal message. Cleared on dismiss or confirm.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub kind: AlertKind,
}

impl Alert {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind: AlertKind::Info,
        }
    }

    pub fn location_prompt() -> Self {
        Self {
            title: LOCATION_PROMPT_TITLE.to_string(),
            message: LOCATION_PROMPT_MESSAGE.to_string(),
            kind: AlertKind::LocationPrompt,
        }
    }

    pub fn location_error(message: impl Into<String>) -> Self {
        Self::info(LOCATION_ERROR_TITLE, message)
    }

    pub fn navigation_error(platform: DevicePlatform) -> Self {
        Self::info(NAVIGATION_ERROR_TITLE, maps_failure_message(platform))
    }

    pub fn webcast_error() -> Self {
        Self::info(NAVIGATION_ERROR_TITLE, WEBCAST_FAILURE)
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: AppConfig,
    pub list: LaunchList,
    pub detail: Option<LaunchDetail>,
    pub alert: Option<Alert>,
    /// Last wall-clock time reported by the shell.
    pub now: Option<DateTime<Utc>>,
    session_counter: u64,
}

impl Model {
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            list: LaunchList::new(&config),
            config,
            ..Self::default()
        }
    }

    pub fn next_session(&mut self) -> u64 {
        self.session_counter += 1;
        self.session_counter
    }

    /// Answers addressed to a closed or replaced detail screen are dropped.
    pub fn detail_for(&mut self, session: u64) -> Option<&mut LaunchDetail> {
        match self.detail.as_mut() {
            Some(detail) if detail.session() == session => Some(detail),
            _ => {
                tracing::debug!(session, "dropping answer for closed detail screen");
                None
            }
        }
    }
}
