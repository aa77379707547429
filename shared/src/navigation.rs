use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::geo::ValidatedCoordinate;

const APPLE_MAPS: &str = "http://maps.apple.com/?";
const GOOGLE_MAPS_DIRECTIONS: &str = "https://www.google.com/maps/dir/?api=1&";

pub const NAVIGATION_ERROR_TITLE: &str = "Navigation Error";
pub const NATIVE_MAPS_FAILURE: &str =
    "Unable to open maps application. Please ensure you have a maps app installed.";
pub const WEB_MAPS_FAILURE: &str = "Unable to open maps in browser.";

/// The OS the shell runs on. Decides which maps provider directions go to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevicePlatform {
    Ios,
    Android,
    #[default]
    Web,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapsDestination {
    pub coordinate: ValidatedCoordinate,
    pub label: Option<String>,
}

fn directions_query(destination: &MapsDestination, origin: Option<ValidatedCoordinate>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("daddr", &destination.coordinate.to_query_value());
    if let Some(label) = destination.label.as_deref().filter(|l| !l.is_empty()) {
        query.append_pair("q", label);
    }
    if let Some(origin) = origin {
        query.append_pair("saddr", &origin.to_query_value());
    }
    query.finish()
}

/// Apple Maps on iOS, Google Maps directions everywhere else.
#[must_use]
pub fn directions_url(
    platform: DevicePlatform,
    destination: &MapsDestination,
    origin: Option<ValidatedCoordinate>,
) -> String {
    let query = directions_query(destination, origin);
    match platform {
        DevicePlatform::Ios => format!("{APPLE_MAPS}{query}"),
        DevicePlatform::Android | DevicePlatform::Web => {
            format!("{GOOGLE_MAPS_DIRECTIONS}{query}")
        }
    }
}

#[must_use]
pub fn web_directions_url(
    destination: &MapsDestination,
    origin: Option<ValidatedCoordinate>,
) -> String {
    directions_url(DevicePlatform::Web, destination, origin)
}

/// Message for the alert shown when the OS refuses a directions URL.
#[must_use]
pub const fn maps_failure_message(platform: DevicePlatform) -> &'static str {
    match platform {
        DevicePlatform::Ios | DevicePlatform::Android => NATIVE_MAPS_FAILURE,
        DevicePlatform::Web => WEB_MAPS_FAILURE,
    }
}
