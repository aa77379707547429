//! Effects the core asks the platform shell to perform.
//!
//! Rendering and HTTP come straight from Crux. Timers, location and URL
//! opening are small custom capabilities built on
//! [`CapabilityContext`](crux_core::capability::CapabilityContext).

mod location;
mod platform;
mod timer;

use crux_core::bridge::ResolveSerialized;
use crux_core::capability::{Capability, ProtoContext};
use crux_core::render::RenderOperation;
use crux_core::{Request, WithContext};
use crux_http::protocol::HttpRequest;
use serde::{Deserialize, Serialize};

pub use crux_core::render::Render;
pub use crux_http::Http;

pub use self::location::{
    Location, LocationAccuracy, LocationOperation, LocationOutput, PermissionStatus,
};
pub use self::platform::{Platform, PlatformOperation, PlatformOutput};
pub use self::timer::{Timer, TimerOperation, TimerOutput};

use crate::app::App;
use crate::event::Event;

pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
    pub timer: Timer<Event>,
    pub location: Location<Event>,
    pub platform: Platform<Event>,
}

#[derive(Debug)]
pub enum Effect {
    Http(Request<<Http<Event> as Capability<Event>>::Operation>),
    Render(Request<RenderOperation>),
    Timer(Request<TimerOperation>),
    Location(Request<LocationOperation>),
    Platform(Request<PlatformOperation>),
}

/// What crosses the FFI boundary: the operation without its resolver.
#[derive(Serialize, Deserialize)]
#[serde(rename = "Effect")]
pub enum EffectFfi {
    Http(HttpRequest),
    Render(RenderOperation),
    Timer(TimerOperation),
    Location(LocationOperation),
    Platform(PlatformOperation),
}

impl crux_core::Effect for Effect {
    type Ffi = EffectFfi;

    fn serialize(self) -> (Self::Ffi, ResolveSerialized) {
        match self {
            Effect::Http(request) => request.serialize(EffectFfi::Http),
            Effect::Render(request) => request.serialize(EffectFfi::Render),
            Effect::Timer(request) => request.serialize(EffectFfi::Timer),
            Effect::Location(request) => request.serialize(EffectFfi::Location),
            Effect::Platform(request) => request.serialize(EffectFfi::Platform),
        }
    }
}

// Written out rather than derived: the `Effect` derive in crux_macros 0.3.10
// targets the newer `WithContext<Event, Effect>` shape.
impl WithContext<App, Effect> for Capabilities {
    fn new_with_context(context: ProtoContext<Effect, Event>) -> Capabilities {
        Capabilities {
            http: Http::new(context.specialize(Effect::Http)),
            render: Render::new(context.specialize(Effect::Render)),
            timer: Timer::new(context.specialize(Effect::Timer)),
            location: Location::new(context.specialize(Effect::Location)),
            platform: Platform::new(context.specialize(Effect::Platform)),
        }
    }
}

impl Effect {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Render(_) => "render",
            Self::Timer(_) => "timer",
            Self::Location(_) => "location",
            Self::Platform(_) => "platform",
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render(_))
    }

    pub fn is_timer(&self) -> bool {
        matches!(self, Self::Timer(_))
    }

    pub fn is_location(&self) -> bool {
        matches!(self, Self::Location(_))
    }

    pub fn is_platform(&self) -> bool {
        matches!(self, Self::Platform(_))
    }

    pub fn into_http(self) -> Option<Request<HttpRequest>> {
        match self {
            Self::Http(request) => Some(request),
            _ => None,
        }
    }

    pub fn into_timer(self) -> Option<Request<TimerOperation>> {
        match self {
            Self::Timer(request) => Some(request),
            _ => None,
        }
    }

    pub fn into_location(self) -> Option<Request<LocationOperation>> {
        match self {
            Self::Location(request) => Some(request),
            _ => None,
        }
    }

    pub fn into_platform(self) -> Option<Request<PlatformOperation>> {
        match self {
            Self::Platform(request) => Some(request),
            _ => None,
        }
    }
}
