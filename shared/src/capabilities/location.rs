use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::launch::UserLocation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    #[default]
    NotDetermined,
}

impl PermissionStatus {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationAccuracy {
    Low,
    #[default]
    Balanced,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationOperation {
    /// Read the current foreground permission without prompting.
    CheckPermission,
    /// Show the platform prompt if the user has not decided yet.
    RequestPermission,
    /// Single-shot position read; the shell must not start continuous updates.
    CurrentPosition { accuracy: LocationAccuracy },
}

impl Operation for LocationOperation {
    type Output = LocationOutput;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LocationOutput {
    Permission(PermissionStatus),
    Position(UserLocation),
    Failed { message: String },
}

pub struct Location<Ev> {
    context: CapabilityContext<LocationOperation, Ev>,
}

impl<Ev> Clone for Location<Ev> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Location<Ev> {
    type Operation = LocationOperation;
    type MappedSelf<MappedEv> = Location<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Location::new(self.context.map_event(f))
    }
}

impl<Ev> Location<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<LocationOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn check_permission<F>(&self, make_event: F)
    where
        F: FnOnce(LocationOutput) -> Ev + Send + 'static,
    {
        self.request(LocationOperation::CheckPermission, make_event);
    }

    pub fn request_permission<F>(&self, make_event: F)
    where
        F: FnOnce(LocationOutput) -> Ev + Send + 'static,
    {
        self.request(LocationOperation::RequestPermission, make_event);
    }

    pub fn current_position<F>(&self, accuracy: LocationAccuracy, make_event: F)
    where
        F: FnOnce(LocationOutput) -> Ev + Send + 'static,
    {
        self.request(LocationOperation::CurrentPosition { accuracy }, make_event);
    }

    fn request<F>(&self, operation: LocationOperation, make_event: F)
    where
        F: FnOnce(LocationOutput) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let output = ctx.request_from_shell(operation).await;
            ctx.update_app(make_event(output));
        });
    }
}
