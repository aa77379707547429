use chrono::{TimeZone, Utc};

use crate::api::{decode_launches, decode_launchpad, decode_search, SortOrder};
use crate::capabilities::{Capabilities, LocationAccuracy, PlatformOutput, TimerOutput};
use crate::detail::{DetailCommand, DetailUpdate, LaunchDetail};
use crate::event::Event;
use crate::list::ListCommand;
use crate::model::{Alert, AlertKind, Model};
use crate::navigation::directions_url;
use crate::view::ViewModel;

#[derive(Default)]
pub struct App;

impl App {
    fn run_list(commands: Vec<ListCommand>, model: &mut Model, caps: &Capabilities) {
        let api = model.config.api();
        for command in commands {
            match command {
                ListCommand::FetchPage {
                    token,
                    offset,
                    limit,
                } => match api.launches(limit, offset, SortOrder::Desc) {
                    Ok(request) => request.send(&caps.http, move |result| Event::PageResponse {
                        token,
                        result: Box::new(result),
                    }),
                    Err(e) => {
                        model.list.page_loaded(token, Err(e));
                    }
                },
                ListCommand::Search {
                    token,
                    query,
                    limit,
                } => match api.search(&query, limit, 0) {
                    Ok(request) => request.send(&caps.http, move |result| Event::SearchResponse {
                        token,
                        result: Box::new(result),
                    }),
                    Err(e) => {
                        model.list.search_completed(token, Err(e));
                    }
                },
                ListCommand::StartDebounce { token, millis } => {
                    caps.timer.start(token, millis, |output| match output {
                        TimerOutput::Elapsed { id } => Event::SearchDebounceElapsed { token: id },
                        TimerOutput::Cancelled { .. } => Event::Noop,
                    });
                }
                ListCommand::CancelDebounce { token } => caps.timer.cancel(token),
            }
        }
    }

    fn run_detail(session: u64, update: DetailUpdate, model: &mut Model, caps: &Capabilities) {
        if let Some(alert) = update.alert {
            model.alert = Some(alert);
        }
        let api = model.config.api();
        for command in update.commands {
            match command {
                DetailCommand::FetchLaunchpad { attempt, id } => match api.launchpad(&id) {
                    Ok(request) => request.send(&caps.http, move |result| {
                        Event::LaunchpadResponse {
                            session,
                            attempt,
                            result: Box::new(result),
                        }
                    }),
                    Err(e) => {
                        if let Some(detail) = model.detail_for(session) {
                            detail.launchpad_loaded(attempt, Err(e));
                        }
                    }
                },
                DetailCommand::CheckPermission => {
                    caps.location.check_permission(move |output| {
                        Event::LocationPermissionChecked {
                            session,
                            output: Box::new(output),
                        }
                    });
                }
                DetailCommand::RequestPermission => {
                    caps.location.request_permission(move |output| {
                        Event::LocationPermissionRequested {
                            session,
                            output: Box::new(output),
                        }
                    });
                }
                DetailCommand::ReadPosition => {
                    caps.location
                        .current_position(LocationAccuracy::Balanced, move |output| {
                            Event::LocationResponse {
                                session,
                                output: Box::new(output),
                            }
                        });
                }
            }
        }
    }

    fn with_detail<F>(session: u64, model: &mut Model, caps: &Capabilities, f: F)
    where
        F: FnOnce(&mut LaunchDetail) -> DetailUpdate,
    {
        if let Some(update) = model.detail_for(session).map(f) {
            Self::run_detail(session, update, model, caps);
        }
    }

    fn request_location(model: &mut Model, caps: &Capabilities) {
        let Some(detail) = model.detail.as_mut() else {
            return;
        };
        let session = detail.session();
        let update = detail.request_location();
        Self::run_detail(session, update, model, caps);
    }

}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        tracing::debug!(
            event = event.name(),
            user_initiated = event.is_user_initiated(),
            "update"
        );

        match event {
            Event::Noop => return,

            Event::Configure { config } => match config.validate() {
                Ok(()) => {
                    model.list.configure(&config);
                    model.config = *config;
                }
                Err(e) => tracing::warn!(error = %e, "rejected configuration"),
            },

            Event::Tick { now_ms } => {
                model.now = Utc.timestamp_millis_opt(now_ms).single();
            }

            Event::ListOpened => {
                let commands = model.list.start();
                Self::run_list(commands, model, caps);
            }
            Event::LoadMoreRequested => {
                let commands = model.list.load_more();
                Self::run_list(commands, model, caps);
            }
            Event::RefreshRequested => {
                let commands = model.list.refresh();
                Self::run_list(commands, model, caps);
            }
            Event::SearchQueryChanged { query } => {
                let commands = model.list.set_query(query);
                Self::run_list(commands, model, caps);
            }
            Event::SearchCleared => {
                let commands = model.list.clear_query();
                Self::run_list(commands, model, caps);
            }
            Event::RetryRequested => {
                let commands = model.list.retry();
                Self::run_list(commands, model, caps);
            }
            Event::SearchDebounceElapsed { token } => {
                let commands = model.list.debounce_elapsed(token);
                Self::run_list(commands, model, caps);
            }
            Event::PageResponse { token, result } => {
                if !model.list.page_loaded(token, decode_launches(*result)) {
                    return;
                }
            }
            Event::SearchResponse { token, result } => {
                if !model.list.search_completed(token, decode_search(*result)) {
                    return;
                }
            }

            Event::LaunchSelected { launch_id } => {
                let Some(launch) = model.list.find(launch_id.as_str()).cloned() else {
                    tracing::warn!(launch_id = %launch_id, "selected launch is not listed");
                    return;
                };
                let session = model.next_session();
                let (detail, commands) = LaunchDetail::open(launch, session);
                model.detail = Some(detail);
                let update = DetailUpdate {
                    commands,
                    alert: None,
                };
                Self::run_detail(session, update, model, caps);
            }
            Event::DetailClosed => {
                model.detail = None;
                if model
                    .alert
                    .as_ref()
                    .is_some_and(|a| a.kind == AlertKind::LocationPrompt)
                {
                    model.alert = None;
                }
            }
            Event::LaunchpadRetryRequested => {
                if let Some(detail) = model.detail.as_mut() {
                    let session = detail.session();
                    let commands = detail.retry_launchpad();
                    let update = DetailUpdate {
                        commands,
                        alert: None,
                    };
                    Self::run_detail(session, update, model, caps);
                }
            }
            Event::LaunchpadResponse {
                session,
                attempt,
                result,
            } => {
                let Some(detail) = model.detail_for(session) else {
                    return;
                };
                if !detail.launchpad_loaded(attempt, decode_launchpad(*result)) {
                    return;
                }
            }

            Event::LocationRequested => match model.detail.as_ref() {
                Some(detail) if detail.permission().is_granted() => {
                    Self::request_location(model, caps);
                }
                Some(_) => model.alert = Some(Alert::location_prompt()),
                None => return,
            },
            Event::LocationPermissionChecked { session, output } => {
                Self::with_detail(session, model, caps, |d| d.permission_checked(*output));
            }
            Event::LocationPermissionRequested { session, output } => {
                Self::with_detail(session, model, caps, |d| d.permission_requested(*output));
            }
            Event::LocationResponse { session, output } => {
                Self::with_detail(session, model, caps, |d| d.position_received(*output));
            }

            Event::AlertConfirmed => {
                if let Some(alert) = model.alert.take() {
                    if alert.kind == AlertKind::LocationPrompt {
                        Self::request_location(model, caps);
                    }
                }
            }
            Event::AlertDismissed => model.alert = None,

            Event::OpenMapsRequested => {
                let Some((destination, origin)) =
                    model.detail.as_ref().and_then(LaunchDetail::maps_destination)
                else {
                    return;
                };
                let url = directions_url(model.config.platform, &destination, origin);
                caps.platform
                    .open_url(url, |output| Event::MapsOpened { output });
            }
            Event::OpenWebcastRequested => {
                let Some(url) = model
                    .detail
                    .as_ref()
                    .and_then(|d| d.launch().webcast_url().map(str::to_string))
                else {
                    return;
                };
                caps.platform
                    .open_url(url, |output| Event::WebcastOpened { output });
            }
            Event::MapsOpened { output } => match output {
                PlatformOutput::Opened => return,
                PlatformOutput::Failed { reason } => {
                    tracing::warn!(%reason, "could not open maps");
                    model.alert = Some(Alert::navigation_error(model.config.platform));
                }
            },
            Event::WebcastOpened { output } => match output {
                PlatformOutput::Opened => return,
                PlatformOutput::Failed { reason } => {
                    tracing::warn!(%reason, "could not open webcast");
                    model.alert = Some(Alert::webcast_error());
                }
            },
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from_model(model)
    }
}

#[cfg(test)]
mod tests {
    use crux_core::testing::AppTester;

    use super::*;
    use crate::capabilities::{
        Effect, LocationOperation, LocationOutput, PermissionStatus, TimerOperation,
    };
    use crate::config::AppConfig;

    type Tester = AppTester<App, Effect>;

    #[test]
    fn test_list_opened_requests_first_page() {
        let app = Tester::default();
        let mut model = Model::default();
        let update = app.update(Event::ListOpened, &mut model);

        assert!(update.effects().any(Effect::is_render));
        let request = update
            .into_effects()
            .find_map(Effect::into_http)
            .expect("first page request");
        assert_eq!(request.operation.method, "GET");
        assert!(request
            .operation
            .url
            .contains("/v5/launches?limit=20&offset=0"));
    }

    #[test]
    fn test_invalid_config_is_ignored() {
        let app = Tester::default();
        let mut model = Model::default();
        let config = AppConfig {
            page_size: 0,
            ..AppConfig::default()
        };
        app.update(
            Event::Configure {
                config: Box::new(config),
            },
            &mut model,
        );
        assert_eq!(model.config.page_size, 20);
    }

    #[test]
    fn test_tick_sets_clock() {
        let app = Tester::default();
        let mut model = Model::default();
        app.update(Event::Tick { now_ms: 1_670_630_400_000 }, &mut model);
        assert_eq!(
            model.now.map(|now| now.timestamp_millis()),
            Some(1_670_630_400_000)
        );
    }

    #[test]
    fn test_cancelled_debounce_is_silent() {
        let app = Tester::default();
        let mut model = Model::default();
        let update = app.update(
            Event::SearchQueryChanged {
                query: "crew".into(),
            },
            &mut model,
        );
        let mut timer = update.into_effects().find_map(Effect::into_timer).unwrap();
        let TimerOperation::Start { id, .. } = timer.operation else {
            panic!("expected a debounce timer");
        };

        let update = app.resolve(&mut timer, TimerOutput::Cancelled { id }).unwrap();
        assert_eq!(update.events, vec![Event::Noop]);
        let update = app.update(Event::Noop, &mut model);
        assert_eq!(update.effects().count(), 0);
    }

    #[test]
    fn test_location_request_without_permission_prompts_first() {
        let app = Tester::default();
        let mut model = Model::default();
        let (detail, _) =
            LaunchDetail::open(crate::launch::fixtures::launch("a", "Crew-5"), model.next_session());
        model.detail = Some(detail);

        let update = app.update(Event::LocationRequested, &mut model);
        assert!(update.effects().all(Effect::is_render));
        assert_eq!(model.alert, Some(Alert::location_prompt()));

        let update = app.update(Event::AlertConfirmed, &mut model);
        assert!(model.alert.is_none());
        // the silent check from opening is still pending and gets upgraded
        assert!(update.effects().all(Effect::is_render));

        let session = model.detail.as_ref().map(LaunchDetail::session).unwrap();
        let update = app.update(
            Event::LocationPermissionChecked {
                session,
                output: Box::new(LocationOutput::Permission(PermissionStatus::NotDetermined)),
            },
            &mut model,
        );
        let location = update
            .into_effects()
            .find_map(Effect::into_location)
            .unwrap();
        assert_eq!(location.operation, LocationOperation::RequestPermission);
    }
}
