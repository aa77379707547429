//! Browse/search state for the launches list.
//!
//! [`LaunchList`] is a plain state machine: every transition returns the
//! [`ListCommand`]s the app must turn into effects. Responses are matched
//! against the token of the request currently in flight so that anything
//! superseded by a newer request or a mode switch is dropped untouched.

use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::config::AppConfig;
use crate::launch::Launch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMode {
    Browse,
    Search,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListPhase {
    #[default]
    Idle,
    LoadingFirstPage,
    LoadingMore,
    Refreshing,
    Searching,
    Error,
}

impl ListPhase {
    #[must_use]
    pub const fn is_loading(self) -> bool {
        matches!(
            self,
            Self::LoadingFirstPage | Self::LoadingMore | Self::Refreshing | Self::Searching
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    FetchPage { token: u64, offset: u32, limit: u32 },
    Search { token: u64, query: String, limit: u32 },
    StartDebounce { token: u64, millis: u64 },
    CancelDebounce { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Page { offset: u32 },
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    token: u64,
    kind: RequestKind,
}

#[derive(Debug, Clone)]
pub struct LaunchList {
    launches: Vec<Launch>,
    search_results: Vec<Launch>,
    query: String,
    next_offset: u32,
    has_more: bool,
    phase: ListPhase,
    error: Option<ApiError>,
    failed: Option<RequestKind>,
    in_flight: Option<InFlight>,
    pending_debounce: Option<u64>,
    next_token: u64,
    page_size: u32,
    search_limit: u32,
    debounce_ms: u64,
}

impl Default for LaunchList {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl LaunchList {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            launches: Vec::new(),
            search_results: Vec::new(),
            query: String::new(),
            next_offset: 0,
            has_more: true,
            phase: ListPhase::Idle,
            error: None,
            failed: None,
            in_flight: None,
            pending_debounce: None,
            next_token: 0,
            page_size: config.page_size,
            search_limit: config.search_limit,
            debounce_ms: config.search_debounce_ms,
        }
    }

    pub fn configure(&mut self, config: &AppConfig) {
        self.page_size = config.page_size;
        self.search_limit = config.search_limit;
        self.debounce_ms = config.search_debounce_ms;
    }

    pub fn launches(&self) -> &[Launch] {
        &self.launches
    }

    pub fn search_results(&self) -> &[Launch] {
        &self.search_results
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn phase(&self) -> ListPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn next_offset(&self) -> u32 {
        self.next_offset
    }

    pub fn is_debouncing(&self) -> bool {
        self.pending_debounce.is_some()
    }

    #[must_use]
    pub fn mode(&self) -> ListMode {
        if self.query.trim().is_empty() {
            ListMode::Browse
        } else {
            ListMode::Search
        }
    }

    /// What the list shows right now: search hits in search mode, the browse cache otherwise.
    pub fn displayed(&self) -> &[Launch] {
        match self.mode() {
            ListMode::Browse => &self.launches,
            ListMode::Search => &self.search_results,
        }
    }

    pub fn find(&self, id: &str) -> Option<&Launch> {
        self.displayed()
            .iter()
            .chain(self.launches.iter())
            .find(|launch| launch.id.as_str() == id)
    }

    fn issue(&mut self, kind: RequestKind, phase: ListPhase) -> ListCommand {
        self.next_token += 1;
        let token = self.next_token;
        self.in_flight = Some(InFlight { token, kind });
        self.phase = phase;
        self.error = None;
        self.failed = None;
        match kind {
            RequestKind::Page { offset } => ListCommand::FetchPage {
                token,
                offset,
                limit: self.page_size,
            },
            RequestKind::Search => ListCommand::Search {
                token,
                query: self.query.clone(),
                limit: self.search_limit,
            },
        }
    }

    fn fetch_page(&mut self, offset: u32, phase: ListPhase) -> ListCommand {
        self.issue(RequestKind::Page { offset }, phase)
    }

    fn invalidate(&mut self) {
        if let Some(stale) = self.in_flight.take() {
            tracing::debug!(token = stale.token, "invalidating in-flight list request");
        }
        if self.phase.is_loading() {
            self.phase = ListPhase::Idle;
        }
    }

    fn cancel_debounce(&mut self) -> Option<ListCommand> {
        self.pending_debounce
            .take()
            .map(|token| ListCommand::CancelDebounce { token })
    }

    /// Loads the first page when the list becomes visible with nothing cached.
    pub fn start(&mut self) -> Vec<ListCommand> {
        if self.mode() != ListMode::Browse || !self.launches.is_empty() || self.in_flight.is_some()
        {
            return Vec::new();
        }
        vec![self.fetch_page(0, ListPhase::LoadingFirstPage)]
    }

    pub fn can_load_more(&self) -> bool {
        self.mode() == ListMode::Browse
            && matches!(self.phase, ListPhase::Idle | ListPhase::Error)
            && self.in_flight.is_none()
            && self.has_more
            && !self.launches.is_empty()
    }

    pub fn load_more(&mut self) -> Vec<ListCommand> {
        if !self.can_load_more() {
            return Vec::new();
        }
        vec![self.fetch_page(self.next_offset, ListPhase::LoadingMore)]
    }

    /// Pull-to-refresh: reruns the search in search mode, reloads page 0 otherwise.
    pub fn refresh(&mut self) -> Vec<ListCommand> {
        match self.mode() {
            ListMode::Search => {
                let mut commands: Vec<_> = self.cancel_debounce().into_iter().collect();
                commands.push(self.issue(RequestKind::Search, ListPhase::Searching));
                commands
            }
            ListMode::Browse => vec![self.fetch_page(0, ListPhase::Refreshing)],
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) -> Vec<ListCommand> {
        let was = self.mode();
        self.query = query.into();
        let mut commands: Vec<_> = self.cancel_debounce().into_iter().collect();

        match self.mode() {
            ListMode::Browse => {
                commands.extend(self.leave_search(was));
            }
            ListMode::Search => {
                if was == ListMode::Browse {
                    self.invalidate();
                    self.error = None;
                    self.failed = None;
                    if self.phase == ListPhase::Error {
                        self.phase = ListPhase::Idle;
                    }
                }
                self.next_token += 1;
                let token = self.next_token;
                self.pending_debounce = Some(token);
                commands.push(ListCommand::StartDebounce {
                    token,
                    millis: self.debounce_ms,
                });
            }
        }
        commands
    }

    pub fn clear_query(&mut self) -> Vec<ListCommand> {
        self.set_query(String::new())
    }

    fn leave_search(&mut self, was: ListMode) -> Vec<ListCommand> {
        self.search_results.clear();
        if was == ListMode::Search {
            self.invalidate();
            self.error = None;
            self.failed = None;
            if self.phase == ListPhase::Error {
                self.phase = ListPhase::Idle;
            }
        }
        if self.launches.is_empty() && self.in_flight.is_none() {
            vec![self.fetch_page(0, ListPhase::LoadingFirstPage)]
        } else {
            Vec::new()
        }
    }

    /// Only the timer carrying the latest debounce token may start a search.
    pub fn debounce_elapsed(&mut self, token: u64) -> Vec<ListCommand> {
        if self.pending_debounce != Some(token) || self.mode() != ListMode::Search {
            tracing::debug!(token, "ignoring superseded debounce timer");
            return Vec::new();
        }
        self.pending_debounce = None;
        vec![self.issue(RequestKind::Search, ListPhase::Searching)]
    }

    fn accept(&mut self, token: u64) -> Option<RequestKind> {
        match self.in_flight {
            Some(current) if current.token == token => {
                self.in_flight = None;
                Some(current.kind)
            }
            _ => {
                tracing::debug!(token, "discarding stale list response");
                None
            }
        }
    }

    fn fail(&mut self, kind: RequestKind, error: ApiError) {
        tracing::warn!(error = %error, "list request failed");
        self.phase = ListPhase::Error;
        self.error = Some(error);
        self.failed = Some(kind);
    }

    /// Applies a browse page. Returns `false` when the response was stale and ignored.
    pub fn page_loaded(&mut self, token: u64, result: Result<Vec<Launch>, ApiError>) -> bool {
        let Some(kind) = self.accept(token) else {
            return false;
        };
        let RequestKind::Page { offset } = kind else {
            return false;
        };

        match result {
            Ok(page) => {
                let count = u32::try_from(page.len()).unwrap_or(u32::MAX);
                self.has_more = count == self.page_size;
                if offset == 0 {
                    self.launches = page;
                    self.next_offset = count;
                } else {
                    self.launches.extend(page);
                    self.next_offset = self.next_offset.saturating_add(count);
                }
                self.phase = ListPhase::Idle;
                self.error = None;
            }
            Err(error) => self.fail(kind, error),
        }
        true
    }

    pub fn search_completed(&mut self, token: u64, result: Result<Vec<Launch>, ApiError>) -> bool {
        let Some(kind) = self.accept(token) else {
            return false;
        };
        if kind != RequestKind::Search {
            return false;
        }

        match result {
            Ok(hits) => {
                self.search_results = hits;
                self.phase = ListPhase::Idle;
                self.error = None;
            }
            Err(error) => self.fail(kind, error),
        }
        true
    }

    /// Reruns whatever failed last.
    pub fn retry(&mut self) -> Vec<ListCommand> {
        match (self.mode(), self.failed) {
            (ListMode::Search, _) => self.refresh(),
            (ListMode::Browse, Some(RequestKind::Page { offset })) if offset > 0 => {
                if self.launches.is_empty() {
                    vec![self.fetch_page(0, ListPhase::LoadingFirstPage)]
                } else {
                    vec![self.fetch_page(self.next_offset, ListPhase::LoadingMore)]
                }
            }
            (ListMode::Browse, _) => vec![self.fetch_page(0, ListPhase::LoadingFirstPage)],
        }
    }
}
