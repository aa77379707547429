use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geo::{CoordinateError, ValidatedCoordinate};

pub const NO_DESCRIPTION: &str = "No mission description available.";

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(LaunchId);
typed_id!(LaunchpadId);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchLinks {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlickrLinks {
    #[serde(default)]
    pub original: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchLinks {
    #[serde(default)]
    pub patch: PatchLinks,
    #[serde(default)]
    pub flickr: FlickrLinks,
    #[serde(default)]
    pub webcast: Option<String>,
}

/// One mission record as served by `/v5/launches`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Launch {
    pub id: LaunchId,
    pub name: String,
    pub date_utc: String,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub upcoming: bool,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub links: LaunchLinks,
    #[serde(default)]
    pub launchpad: LaunchpadId,
    #[serde(default)]
    pub rocket: String,
    #[serde(default)]
    pub flight_number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchStatus {
    Upcoming,
    Success,
    Failed,
    Unknown,
}

impl LaunchStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Success => "Success",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for LaunchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Launch {
    /// Upcoming launches have no outcome yet, whatever `success` says.
    #[must_use]
    pub fn status(&self) -> LaunchStatus {
        if self.upcoming {
            return LaunchStatus::Upcoming;
        }
        match self.success {
            Some(true) => LaunchStatus::Success,
            Some(false) => LaunchStatus::Failed,
            None => LaunchStatus::Unknown,
        }
    }

    #[must_use]
    pub fn mission_image(&self) -> Option<&str> {
        let patch = &self.links.patch;
        patch
            .small
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| patch.large.as_deref().filter(|s| !s.is_empty()))
            .or_else(|| self.links.flickr.original.first().map(String::as_str))
    }

    #[must_use]
    pub fn mission_description(&self) -> &str {
        match self.details.as_deref() {
            Some(details) if !details.trim().is_empty() => details,
            _ => NO_DESCRIPTION,
        }
    }

    #[must_use]
    pub fn webcast_url(&self) -> Option<&str> {
        self.links.webcast.as_deref().filter(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchpadStatus {
    Active,
    Inactive,
    Retired,
    #[serde(rename = "under construction")]
    UnderConstruction,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A physical launch site from `/v4/launchpads/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Launchpad {
    pub id: LaunchpadId,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub launch_attempts: u32,
    #[serde(default)]
    pub launch_successes: u32,
    #[serde(default)]
    pub rockets: Vec<String>,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub status: LaunchpadStatus,
}

impl Launchpad {
    #[must_use]
    pub fn success_rate_percent(&self) -> u32 {
        if self.launch_attempts == 0 {
            return 0;
        }
        let rate =
            f64::from(self.launch_successes) / f64::from(self.launch_attempts) * 100.0;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            rate.round() as u32
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.name
        } else {
            &self.full_name
        }
    }

    #[must_use]
    pub fn place(&self) -> String {
        format!("{}, {}", self.locality, self.region)
    }

    pub fn coordinate(&self) -> Result<ValidatedCoordinate, CoordinateError> {
        ValidatedCoordinate::new(self.latitude, self.longitude)
    }
}

/// Transient single-shot position read; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub accuracy: Option<f64>,
}

impl UserLocation {
    pub fn coordinate(&self) -> Result<ValidatedCoordinate, CoordinateError> {
        ValidatedCoordinate::new(self.latitude, self.longitude)
    }
}
