#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod api;
pub mod app;
pub mod capabilities;
pub mod config;
pub mod dates;
pub mod detail;
pub mod event;
pub mod geo;
pub mod launch;
pub mod list;
pub mod model;
pub mod navigation;
pub mod view;

pub use api::{ApiError, SpaceXApi};
pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use crux_core::{render::Render, App as CruxApp, Core};
pub use config::{AppConfig, ConfigError};
pub use event::Event;
pub use launch::{Launch, LaunchId, LaunchStatus, Launchpad, LaunchpadId, UserLocation};
pub use model::Model;
pub use view::ViewModel;
