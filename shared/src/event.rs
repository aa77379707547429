use crux_http::Response;
use serde::{Deserialize, Serialize};

use crate::api::SearchPage;
use crate::capabilities::{LocationOutput, PlatformOutput};
use crate::config::AppConfig;
use crate::launch::{Launch, LaunchId, Launchpad};

type HttpAnswer<T> = Box<crux_http::Result<Response<T>>>;

// --- Event enum: capability answers boxed to keep it small ---

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub enum Event {
    #[default]
    Noop,

    // Shell lifecycle
    Configure {
        config: Box<AppConfig>,
    },
    /// Wall clock from the shell, used for relative launch dates.
    Tick {
        now_ms: i64,
    },

    // List & Search
    ListOpened,
    LoadMoreRequested,
    RefreshRequested,
    SearchQueryChanged {
        query: String,
    },
    SearchCleared,
    RetryRequested,

    // Detail
    LaunchSelected {
        launch_id: LaunchId,
    },
    DetailClosed,
    LaunchpadRetryRequested,
    LocationRequested,
    OpenMapsRequested,
    OpenWebcastRequested,

    // Alerts
    AlertConfirmed,
    AlertDismissed,

    // Capability responses, internal to the core and never sent by a shell
    #[serde(skip)]
    SearchDebounceElapsed {
        token: u64,
    },
    #[serde(skip)]
    PageResponse {
        token: u64,
        result: HttpAnswer<Vec<Launch>>,
    },
    #[serde(skip)]
    SearchResponse {
        token: u64,
        result: HttpAnswer<SearchPage>,
    },
    #[serde(skip)]
    LaunchpadResponse {
        session: u64,
        attempt: u32,
        result: HttpAnswer<Launchpad>,
    },
    #[serde(skip)]
    LocationPermissionChecked {
        session: u64,
        output: Box<LocationOutput>,
    },
    #[serde(skip)]
    LocationPermissionRequested {
        session: u64,
        output: Box<LocationOutput>,
    },
    #[serde(skip)]
    LocationResponse {
        session: u64,
        output: Box<LocationOutput>,
    },
    #[serde(skip)]
    MapsOpened {
        output: PlatformOutput,
    },
    #[serde(skip)]
    WebcastOpened {
        output: PlatformOutput,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Configure { .. } => "configure",
            Self::Tick { .. } => "tick",
            Self::ListOpened => "list_opened",
            Self::LoadMoreRequested => "load_more_requested",
            Self::RefreshRequested => "refresh_requested",
            Self::SearchQueryChanged { .. } => "search_query_changed",
            Self::SearchCleared => "search_cleared",
            Self::RetryRequested => "retry_requested",
            Self::LaunchSelected { .. } => "launch_selected",
            Self::DetailClosed => "detail_closed",
            Self::LaunchpadRetryRequested => "launchpad_retry_requested",
            Self::LocationRequested => "location_requested",
            Self::OpenMapsRequested => "open_maps_requested",
            Self::OpenWebcastRequested => "open_webcast_requested",
            Self::AlertConfirmed => "alert_confirmed",
            Self::AlertDismissed => "alert_dismissed",
            Self::SearchDebounceElapsed { .. } => "search_debounce_elapsed",
            Self::PageResponse { .. } => "page_response",
            Self::SearchResponse { .. } => "search_response",
            Self::LaunchpadResponse { .. } => "launchpad_response",
            Self::LocationPermissionChecked { .. } => "location_permission_checked",
            Self::LocationPermissionRequested { .. } => "location_permission_requested",
            Self::LocationResponse { .. } => "location_response",
            Self::MapsOpened { .. } => "maps_opened",
            Self::WebcastOpened { .. } => "webcast_opened",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::LoadMoreRequested
                | Self::RefreshRequested
                | Self::SearchQueryChanged { .. }
                | Self::SearchCleared
                | Self::RetryRequested
                | Self::LaunchSelected { .. }
                | Self::DetailClosed
                | Self::LaunchpadRetryRequested
                | Self::LocationRequested
                | Self::OpenMapsRequested
                | Self::OpenWebcastRequested
                | Self::AlertConfirmed
                | Self::AlertDismissed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_size_is_reasonable() {
        let size = std::mem::size_of::<Event>();
        assert!(size <= 64, "Event enum is {size} bytes, box more variants");
    }

    #[test]
    fn user_events_are_flagged() {
        assert!(Event::SearchQueryChanged { query: "x".into() }.is_user_initiated());
        assert!(!Event::SearchDebounceElapsed { token: 1 }.is_user_initiated());
        assert!(!Event::Tick { now_ms: 0 }.is_user_initiated());
    }

    #[test]
    fn events_round_trip_through_json() {
        let event = Event::LaunchSelected {
            launch_id: LaunchId::new("5eb87cd9ffd86e000604b32a"),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(serde_json::from_str::<Event>(&json).unwrap(), event);
        assert_eq!(event.name(), "launch_selected");
    }
}
