//! Executes the core's effects in-process: HTTP through reqwest, timers on tokio,
//! location from a fixed position, URL opening as a printout.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use crux_core::{Core, Request};
use crux_http::protocol::{HttpHeader, HttpRequest, HttpResponse, HttpResult};
use shared::capabilities::{
    LocationOperation, LocationOutput, PermissionStatus, PlatformOperation, PlatformOutput,
    TimerOperation, TimerOutput,
};
use shared::{App, Effect, Event, UserLocation, ViewModel};
use tokio::sync::{mpsc, oneshot};

const REQUEST_TIMEOUT_SECONDS: u64 = 30;
pub const NO_POSITION: &str = "No position configured; pass --from LAT,LON";

/// A spawned task handing its request back together with the answer.
enum Completion {
    Http {
        request: Request<HttpRequest>,
        result: HttpResult,
    },
    Timer {
        id: u64,
        request: Request<TimerOperation>,
        output: TimerOutput,
    },
}

pub struct Shell {
    core: Core<Effect, App>,
    client: reqwest::Client,
    position: Option<UserLocation>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    timers: HashMap<u64, oneshot::Sender<()>>,
    in_flight: usize,
    opened: Vec<String>,
}

impl Shell {
    pub fn new(position: Option<UserLocation>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()?;
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Ok(Self {
            core: Core::new::<shared::Capabilities>(),
            client,
            position,
            completions_tx,
            completions_rx,
            timers: HashMap::new(),
            in_flight: 0,
            opened: Vec::new(),
        })
    }

    pub fn view(&self) -> ViewModel {
        self.core.view()
    }

    /// URLs the core asked to open, in order.
    pub fn opened_urls(&self) -> &[String] {
        &self.opened
    }

    /// Feeds `event` in and keeps going until no effect is left outstanding.
    pub async fn dispatch(&mut self, event: Event) -> anyhow::Result<()> {
        let mut effects = VecDeque::from(self.core.process_event(event));
        loop {
            while let Some(effect) = effects.pop_front() {
                effects.extend(self.handle(effect));
            }

            if self.in_flight == 0 {
                return Ok(());
            }
            let completion = self
                .completions_rx
                .recv()
                .await
                .ok_or_else(|| anyhow::anyhow!("effect channel closed"))?;
            self.in_flight -= 1;
            effects.extend(self.complete(completion));
        }
    }

    /// Runs one effect. Synchronous answers come back as the core's next effects.
    fn handle(&mut self, effect: Effect) -> Vec<Effect> {
        match effect {
            Effect::Render(_) => {
                tracing::trace!("render");
                Vec::new()
            }
            Effect::Http(request) => {
                self.spawn_http(request);
                Vec::new()
            }
            Effect::Timer(request) => {
                self.timer(request);
                Vec::new()
            }
            Effect::Location(mut request) => {
                let output = self.locate(&request.operation);
                self.core.resolve(&mut request, output)
            }
            Effect::Platform(mut request) => {
                let PlatformOperation::OpenUrl { url } = &request.operation;
                tracing::info!(%url, "open url");
                self.opened.push(url.clone());
                self.core.resolve(&mut request, PlatformOutput::Opened)
            }
        }
    }

    fn complete(&mut self, completion: Completion) -> Vec<Effect> {
        match completion {
            Completion::Http {
                mut request,
                result,
            } => self.core.resolve(&mut request, result),
            Completion::Timer {
                id,
                mut request,
                output,
            } => {
                // A restart under the same id holds a live sender; leave that one alone.
                if self.timers.get(&id).is_some_and(oneshot::Sender::is_closed) {
                    self.timers.remove(&id);
                }
                self.core.resolve(&mut request, output)
            }
        }
    }

    fn spawn_http(&mut self, request: Request<HttpRequest>) {
        let client = self.client.clone();
        let tx = self.completions_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = execute(&client, &request.operation).await;
            // The receiver lives as long as the shell.
            let _ = tx.send(Completion::Http { request, result });
        });
    }

    fn timer(&mut self, request: Request<TimerOperation>) {
        match request.operation {
            TimerOperation::Start { id, millis } => {
                let (cancel_tx, cancel_rx) = oneshot::channel();
                if let Some(previous) = self.timers.insert(id, cancel_tx) {
                    let _ = previous.send(());
                }
                let tx = self.completions_tx.clone();
                self.in_flight += 1;
                tokio::spawn(async move {
                    let output = tokio::select! {
                        () = tokio::time::sleep(Duration::from_millis(millis)) => {
                            TimerOutput::Elapsed { id }
                        }
                        _ = cancel_rx => TimerOutput::Cancelled { id },
                    };
                    let _ = tx.send(Completion::Timer {
                        id,
                        request,
                        output,
                    });
                });
            }
            // Notification only; the matching start answers with `Cancelled`.
            TimerOperation::Cancel { id } => {
                if let Some(cancel) = self.timers.remove(&id) {
                    tracing::debug!(id, "cancelling timer");
                    let _ = cancel.send(());
                }
            }
        }
    }

    fn locate(&self, operation: &LocationOperation) -> LocationOutput {
        match (operation, self.position) {
            (LocationOperation::CheckPermission, Some(_)) => {
                LocationOutput::Permission(PermissionStatus::Granted)
            }
            (LocationOperation::CheckPermission, None) => {
                LocationOutput::Permission(PermissionStatus::NotDetermined)
            }
            (LocationOperation::RequestPermission, Some(_)) => {
                LocationOutput::Permission(PermissionStatus::Granted)
            }
            (LocationOperation::RequestPermission, None) => {
                LocationOutput::Permission(PermissionStatus::Denied)
            }
            (LocationOperation::CurrentPosition { .. }, Some(position)) => {
                LocationOutput::Position(position)
            }
            (LocationOperation::CurrentPosition { .. }, None) => LocationOutput::Failed {
                message: NO_POSITION.to_string(),
            },
        }
    }
}

async fn execute(client: &reqwest::Client, request: &HttpRequest) -> HttpResult {
    tracing::debug!(method = %request.method, url = %request.url, "sending request");
    match send(client, request).await {
        Ok(response) => {
            tracing::debug!(
                status = response.status,
                bytes = response.body.len(),
                "response received"
            );
            HttpResult::Ok(response)
        }
        Err(e) => {
            tracing::debug!(error = %e, url = %request.url, "request failed");
            HttpResult::Err(e)
        }
    }
}

async fn send(
    client: &reqwest::Client,
    request: &HttpRequest,
) -> Result<HttpResponse, crux_http::Error> {
    let method = reqwest::Method::from_bytes(request.method.as_bytes())
        .map_err(|e| crux_http::Error::Url(e.to_string()))?;

    let mut builder = client.request(method, request.url.as_str());
    for header in &request.headers {
        builder = builder.header(header.name.as_str(), header.value.as_str());
    }
    if !request.body.is_empty() {
        builder = builder.body(request.body.clone());
    }

    let response = builder.send().await.map_err(transport_error)?;
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            Some(HttpHeader {
                name: name.to_string(),
                value: value.to_str().ok()?.to_string(),
            })
        })
        .collect();
    let body = response.bytes().await.map_err(transport_error)?;

    Ok(HttpResponse {
        status,
        headers,
        body: body.to_vec(),
    })
}

fn transport_error(e: reqwest::Error) -> crux_http::Error {
    if e.is_timeout() {
        crux_http::Error::Timeout
    } else {
        crux_http::Error::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::view::ListContent;
    use shared::AppConfig;

    fn cape() -> UserLocation {
        UserLocation {
            latitude: 28.5618571,
            longitude: -80.577366,
            accuracy: None,
        }
    }

    async fn offline_shell(search_debounce_ms: u64) -> Shell {
        let mut shell = Shell::new(None).unwrap();
        let config = AppConfig {
            api_base_url: "http://127.0.0.1:9".into(),
            search_debounce_ms,
            ..AppConfig::default()
        };
        shell
            .dispatch(Event::Configure {
                config: Box::new(config),
            })
            .await
            .unwrap();
        shell
    }

    #[test]
    fn test_location_answers_follow_configured_position() {
        let with = Shell::new(Some(cape())).unwrap();
        assert_eq!(
            with.locate(&LocationOperation::CheckPermission),
            LocationOutput::Permission(PermissionStatus::Granted)
        );
        assert!(matches!(
            with.locate(&LocationOperation::CurrentPosition {
                accuracy: shared::capabilities::LocationAccuracy::Balanced
            }),
            LocationOutput::Position(_)
        ));

        let without = Shell::new(None).unwrap();
        assert_eq!(
            without.locate(&LocationOperation::RequestPermission),
            LocationOutput::Permission(PermissionStatus::Denied)
        );
    }

    #[tokio::test]
    async fn test_unreachable_api_surfaces_network_error() {
        let mut shell = offline_shell(500).await;
        shell.dispatch(Event::ListOpened).await.unwrap();

        match shell.view().list.content {
            ListContent::Error { message, .. } => {
                assert!(message.starts_with("Network error: "), "{message}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fired_timers_are_forgotten() {
        let mut shell = offline_shell(5).await;
        for query in ["crew", "crew-5"] {
            shell
                .dispatch(Event::SearchQueryChanged {
                    query: query.into(),
                })
                .await
                .unwrap();
            assert!(shell.timers.is_empty());
            assert_eq!(shell.in_flight, 0);
        }
    }

    #[tokio::test]
    async fn test_cancelled_timer_is_answered_and_forgotten() {
        let mut shell = offline_shell(60_000).await;
        let effects = shell.core.process_event(Event::SearchQueryChanged {
            query: "crew".into(),
        });
        for effect in effects {
            shell.handle(effect);
        }
        assert_eq!(shell.timers.len(), 1);

        // Clearing the query cancels the pending debounce without another search.
        shell.dispatch(Event::SearchCleared).await.unwrap();
        assert!(shell.timers.is_empty());
        assert_eq!(shell.in_flight, 0);
    }

    #[tokio::test]
    #[ignore] // Requires network connection
    async fn test_first_page_from_live_api() {
        let mut shell = Shell::new(None).unwrap();
        shell.dispatch(Event::ListOpened).await.unwrap();
        let ListContent::Launches { cards, .. } = shell.view().list.content else {
            panic!("expected launches");
        };
        assert_eq!(cards.len(), 20);
    }

    #[tokio::test]
    #[ignore] // Requires network connection
    async fn test_debounced_search_against_live_api() {
        let mut shell = Shell::new(None).unwrap();
        shell.dispatch(Event::ListOpened).await.unwrap();
        shell
            .dispatch(Event::SearchQueryChanged {
                query: "starlink".into(),
            })
            .await
            .unwrap();
        let ListContent::Launches { cards, .. } = shell.view().list.content else {
            panic!("expected search results");
        };
        assert!(cards
            .iter()
            .all(|card| card.name.to_lowercase().contains("starlink")));
    }
}
