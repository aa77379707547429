//! Serializable snapshot the shell renders. Built fresh from the model on every `view`.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::{format_launch_date, relative_time};
use crate::detail::{LaunchDetail, LaunchpadState, MapData};
use crate::launch::{Launch, LaunchStatus};
use crate::list::{LaunchList, ListMode, ListPhase};
use crate::model::{Alert, Model};

pub const LOADING_LAUNCHES: &str = "Loading SpaceX launches...";
pub const LOADING_MORE: &str = "Loading more launches...";
pub const LOADING_LAUNCHPAD: &str = "Loading launchpad...";
pub const ERROR_TITLE: &str = "Something went wrong";
pub const RETRY_LABEL: &str = "Try again";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LaunchCardView {
    pub id: String,
    pub name: String,
    pub flight: String,
    pub status: LaunchStatus,
    pub status_label: String,
    pub image_url: Option<String>,
    pub date: String,
    /// Absent until the shell has reported the current time.
    pub relative_date: Option<String>,
}

impl LaunchCardView {
    fn new(launch: &Launch, offset: FixedOffset, now: Option<DateTime<Utc>>) -> Self {
        let status = launch.status();
        Self {
            id: launch.id.to_string(),
            name: launch.name.clone(),
            flight: format!("Flight #{}", launch.flight_number),
            status,
            status_label: status.label().to_string(),
            image_url: launch.mission_image().map(str::to_string),
            date: format_launch_date(&launch.date_utc, offset),
            relative_date: now.map(|now| relative_time(&launch.date_utc, now)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmptyAction {
    ClearSearch,
    Retry,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ListContent {
    Loading {
        message: String,
    },
    Error {
        title: String,
        message: String,
        retry_label: String,
    },
    Empty {
        title: String,
        message: String,
        action_label: String,
        action: EmptyAction,
    },
    Launches {
        cards: Vec<LaunchCardView>,
        refreshing: bool,
        footer: Option<String>,
        /// Failure while something is already on screen.
        error: Option<String>,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ListView {
    pub query: String,
    pub show_clear: bool,
    pub searching: bool,
    pub content: ListContent,
}

fn list_view(list: &LaunchList, offset: FixedOffset, now: Option<DateTime<Utc>>) -> ListView {
    let displayed = list.displayed();
    let mode = list.mode();
    let phase = list.phase();

    let content = if displayed.is_empty() {
        let loading = matches!(
            phase,
            ListPhase::LoadingFirstPage | ListPhase::Searching | ListPhase::Refreshing
        );
        if loading {
            ListContent::Loading {
                message: LOADING_LAUNCHES.to_string(),
            }
        } else if let Some(error) = list.error() {
            ListContent::Error {
                title: ERROR_TITLE.to_string(),
                message: error.message.clone(),
                retry_label: RETRY_LABEL.to_string(),
            }
        } else if mode == ListMode::Search {
            ListContent::Empty {
                title: "No launches found".to_string(),
                message: format!(
                    "No launches found for \"{}\". Try a different search term.",
                    list.query()
                ),
                action_label: "Clear search".to_string(),
                action: EmptyAction::ClearSearch,
            }
        } else {
            ListContent::Empty {
                title: "No launches available".to_string(),
                message: "There are no SpaceX launches to display.".to_string(),
                action_label: "Retry".to_string(),
                action: EmptyAction::Retry,
            }
        }
    } else {
        ListContent::Launches {
            cards: displayed
                .iter()
                .map(|launch| LaunchCardView::new(launch, offset, now))
                .collect(),
            refreshing: phase == ListPhase::Refreshing,
            footer: (phase == ListPhase::LoadingMore).then(|| LOADING_MORE.to_string()),
            error: list.error().map(|e| e.message.clone()),
        }
    };

    ListView {
        query: list.query().to_string(),
        show_clear: mode == ListMode::Search,
        searching: mode == ListMode::Search,
        content,
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LaunchpadInfoView {
    pub full_name: String,
    pub place: String,
    pub details: Option<String>,
    pub launch_attempts: u32,
    pub launch_successes: u32,
    pub success_rate: String,
    pub distance: Option<String>,
    pub map: Option<MapData>,
    pub show_location_button: bool,
    pub location_button_label: String,
    pub location_button_enabled: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum LaunchpadSection {
    Loading { message: String },
    Failed { message: String, retry_label: String },
    Loaded(Box<LaunchpadInfoView>),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DetailView {
    pub name: String,
    pub status: LaunchStatus,
    pub status_label: String,
    pub image_url: Option<String>,
    pub flight_number: String,
    pub date: String,
    pub description: String,
    pub webcast_url: Option<String>,
    pub launchpad: LaunchpadSection,
}

fn detail_view(detail: &LaunchDetail, offset: FixedOffset) -> DetailView {
    let launch = detail.launch();
    let status = launch.status();

    let launchpad = match detail.launchpad_state() {
        LaunchpadState::Loading => LaunchpadSection::Loading {
            message: LOADING_LAUNCHPAD.to_string(),
        },
        LaunchpadState::Failed(error) => LaunchpadSection::Failed {
            message: error.message.clone(),
            retry_label: RETRY_LABEL.to_string(),
        },
        LaunchpadState::Loaded(pad) => {
            let locating = detail.is_locating();
            LaunchpadSection::Loaded(Box::new(LaunchpadInfoView {
                full_name: pad.full_name.clone(),
                place: pad.place(),
                details: pad.details.clone(),
                launch_attempts: pad.launch_attempts,
                launch_successes: pad.launch_successes,
                success_rate: format!("{}%", pad.success_rate_percent()),
                distance: detail.distance_label(),
                map: detail.map(),
                show_location_button: !detail.permission().is_granted(),
                location_button_label: if locating {
                    "Getting Location...".to_string()
                } else {
                    "Show My Location".to_string()
                },
                location_button_enabled: !locating,
            }))
        }
    };

    DetailView {
        name: launch.name.clone(),
        status,
        status_label: status.label().to_string(),
        image_url: launch.mission_image().map(str::to_string),
        flight_number: format!("#{}", launch.flight_number),
        date: format_launch_date(&launch.date_utc, offset),
        description: launch.mission_description().to_string(),
        webcast_url: launch.webcast_url().map(str::to_string),
        launchpad,
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ViewModel {
    pub list: ListView,
    pub detail: Option<DetailView>,
    pub alert: Option<Alert>,
}

impl ViewModel {
    pub fn from_model(model: &Model) -> Self {
        let offset = model.config.utc_offset();
        Self {
            list: list_view(&model.list, offset, model.now),
            detail: model.detail.as_ref().map(|d| detail_view(d, offset)),
            alert: model.alert.clone(),
        }
    }
}
