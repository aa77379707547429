use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::capabilities::{LocationOutput, PermissionStatus};
use crate::geo::{format_distance, MapRegion, ValidatedCoordinate};
use crate::launch::{Launch, Launchpad, LaunchpadId, UserLocation};
use crate::model::Alert;
use crate::navigation::MapsDestination;

pub const LOCATION_NOT_GRANTED: &str = "Location permission not granted";

#[derive(Debug, Clone, PartialEq)]
pub enum LaunchpadState {
    Loading,
    Loaded(Launchpad),
    Failed(ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailCommand {
    FetchLaunchpad { attempt: u32, id: LaunchpadId },
    CheckPermission,
    RequestPermission,
    ReadPosition,
}

/// Where the single-shot location flow currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Locate {
    #[default]
    Idle,
    /// Silent check when the screen opens; never prompts.
    CheckingOnOpen,
    Checking,
    Requesting,
    Reading,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailUpdate {
    pub commands: Vec<DetailCommand>,
    pub alert: Option<Alert>,
}

impl DetailUpdate {
    fn command(command: DetailCommand) -> Self {
        Self {
            commands: vec![command],
            alert: None,
        }
    }

    fn alert(alert: Alert) -> Self {
        Self {
            commands: Vec::new(),
            alert: Some(alert),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchpadMarker {
    pub coordinate: ValidatedCoordinate,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    pub region: MapRegion,
    pub marker: LaunchpadMarker,
    pub shows_user_location: bool,
}

/// State of one open detail screen. `session` ties shell answers to this instance.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchDetail {
    launch: Launch,
    session: u64,
    launchpad: LaunchpadState,
    attempt: u32,
    permission: PermissionStatus,
    user_location: Option<UserLocation>,
    locate: Locate,
}

impl LaunchDetail {
    /// Starts the launchpad fetch and the silent permission check.
    pub fn open(launch: Launch, session: u64) -> (Self, Vec<DetailCommand>) {
        let id = launch.launchpad.clone();
        let detail = Self {
            launch,
            session,
            launchpad: LaunchpadState::Loading,
            attempt: 1,
            permission: PermissionStatus::NotDetermined,
            user_location: None,
            locate: Locate::CheckingOnOpen,
        };
        let commands = vec![
            DetailCommand::FetchLaunchpad { attempt: 1, id },
            DetailCommand::CheckPermission,
        ];
        (detail, commands)
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn launch(&self) -> &Launch {
        &self.launch
    }

    pub fn launchpad_state(&self) -> &LaunchpadState {
        &self.launchpad
    }

    pub fn launchpad(&self) -> Option<&Launchpad> {
        match &self.launchpad {
            LaunchpadState::Loaded(pad) => Some(pad),
            _ => None,
        }
    }

    pub fn permission(&self) -> PermissionStatus {
        self.permission
    }

    pub fn user_location(&self) -> Option<&UserLocation> {
        self.user_location.as_ref()
    }

    pub fn is_locating(&self) -> bool {
        !matches!(self.locate, Locate::Idle | Locate::CheckingOnOpen)
    }

    pub fn retry_launchpad(&mut self) -> Vec<DetailCommand> {
        if !matches!(self.launchpad, LaunchpadState::Failed(_)) {
            return Vec::new();
        }
        self.attempt += 1;
        self.launchpad = LaunchpadState::Loading;
        vec![DetailCommand::FetchLaunchpad {
            attempt: self.attempt,
            id: self.launch.launchpad.clone(),
        }]
    }

    /// Returns `false` for an answer to an older attempt.
    pub fn launchpad_loaded(&mut self, attempt: u32, result: Result<Launchpad, ApiError>) -> bool {
        if attempt != self.attempt || !matches!(self.launchpad, LaunchpadState::Loading) {
            tracing::debug!(attempt, current = self.attempt, "discarding stale launchpad response");
            return false;
        }
        self.launchpad = match result {
            Ok(pad) => LaunchpadState::Loaded(pad),
            Err(error) => {
                tracing::warn!(error = %error, launchpad = %self.launch.launchpad, "launchpad fetch failed");
                LaunchpadState::Failed(error)
            }
        };
        true
    }

    /// User asked for their position: check, prompt if needed, then read once.
    pub fn request_location(&mut self) -> DetailUpdate {
        match self.locate {
            Locate::Idle => {
                self.locate = Locate::Checking;
                DetailUpdate::command(DetailCommand::CheckPermission)
            }
            Locate::CheckingOnOpen => {
                self.locate = Locate::Checking;
                DetailUpdate::default()
            }
            Locate::Checking | Locate::Requesting | Locate::Reading => DetailUpdate::default(),
        }
    }

    pub fn permission_checked(&mut self, output: LocationOutput) -> DetailUpdate {
        let interactive = match self.locate {
            Locate::CheckingOnOpen => false,
            Locate::Checking => true,
            _ => return DetailUpdate::default(),
        };

        match output {
            LocationOutput::Permission(status) if status.is_granted() => {
                self.permission = status;
                self.read_position()
            }
            LocationOutput::Permission(status) => {
                self.permission = status;
                if interactive {
                    self.locate = Locate::Requesting;
                    DetailUpdate::command(DetailCommand::RequestPermission)
                } else {
                    self.locate = Locate::Idle;
                    DetailUpdate::default()
                }
            }
            LocationOutput::Failed { message } => {
                self.permission = PermissionStatus::Denied;
                self.locate = Locate::Idle;
                if interactive {
                    DetailUpdate::alert(Alert::location_error(message))
                } else {
                    DetailUpdate::default()
                }
            }
            LocationOutput::Position(_) => {
                self.locate = Locate::Idle;
                DetailUpdate::default()
            }
        }
    }

    pub fn permission_requested(&mut self, output: LocationOutput) -> DetailUpdate {
        if self.locate != Locate::Requesting {
            return DetailUpdate::default();
        }
        match output {
            LocationOutput::Permission(status) if status.is_granted() => {
                self.permission = status;
                self.read_position()
            }
            LocationOutput::Permission(status) => {
                self.permission = status;
                self.locate = Locate::Idle;
                DetailUpdate::alert(Alert::location_error(LOCATION_NOT_GRANTED))
            }
            LocationOutput::Failed { message } => {
                self.permission = PermissionStatus::Denied;
                self.locate = Locate::Idle;
                DetailUpdate::alert(Alert::location_error(message))
            }
            LocationOutput::Position(_) => {
                self.locate = Locate::Idle;
                DetailUpdate::default()
            }
        }
    }

    fn read_position(&mut self) -> DetailUpdate {
        self.locate = Locate::Reading;
        DetailUpdate::command(DetailCommand::ReadPosition)
    }

    pub fn position_received(&mut self, output: LocationOutput) -> DetailUpdate {
        if self.locate != Locate::Reading {
            return DetailUpdate::default();
        }
        self.locate = Locate::Idle;
        match output {
            LocationOutput::Position(location) => match location.coordinate() {
                Ok(_) => {
                    self.user_location = Some(location);
                    DetailUpdate::default()
                }
                Err(e) => DetailUpdate::alert(Alert::location_error(e.to_string())),
            },
            LocationOutput::Failed { message } => {
                DetailUpdate::alert(Alert::location_error(message))
            }
            LocationOutput::Permission(_) => DetailUpdate::default(),
        }
    }

    fn user_coordinate(&self) -> Option<ValidatedCoordinate> {
        self.user_location.as_ref().and_then(|l| l.coordinate().ok())
    }

    /// Kilometres to the launchpad; known only once both ends are.
    pub fn distance_km(&self) -> Option<f64> {
        let pad = self.launchpad()?.coordinate().ok()?;
        let user = self.user_coordinate()?;
        Some(user.distance_km(pad))
    }

    pub fn distance_label(&self) -> Option<String> {
        self.distance_km()
            .map(|km| format!("{} from your location", format_distance(km)))
    }

    pub fn map(&self) -> Option<MapData> {
        let pad = self.launchpad()?;
        let coordinate = pad.coordinate().ok()?;
        let user_known = self.user_coordinate().is_some();
        Some(MapData {
            region: MapRegion::around(coordinate, user_known),
            marker: LaunchpadMarker {
                coordinate,
                title: pad.full_name.clone(),
                description: pad.place(),
            },
            shows_user_location: user_known,
        })
    }

    pub fn maps_destination(&self) -> Option<(MapsDestination, Option<ValidatedCoordinate>)> {
        let pad = self.launchpad()?;
        let destination = MapsDestination {
            coordinate: pad.coordinate().ok()?,
            label: Some(pad.full_name.clone()),
        };
        Some((destination, self.user_coordinate()))
    }
}
