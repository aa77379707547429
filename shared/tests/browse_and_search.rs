mod common;

use common::{
    network_failure, ok_json, renders, resolve, send, status, take_http, take_timers, Tester,
};
use crux_core::Request;
use crux_http::protocol::HttpRequest;
use serde_json::{json, Value};
use shared::capabilities::{TimerOperation, TimerOutput};
use shared::list::ListPhase;
use shared::view::ListContent;
use shared::{Event, Model};

fn launch(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "date_utc": "2021-01-24T15:00:00.000Z",
        "success": true,
        "upcoming": false,
        "details": null,
        "links": {
            "patch": {"small": "https://images2.imgbox.com/a.png", "large": null},
            "flickr": {"small": [], "original": []},
            "webcast": "https://youtu.be/ScYUA51-POQ"
        },
        "launchpad": "5e9e4501f509094ba4566f84",
        "rocket": "5e9d0d95eda69973a809d1ec",
        "flight_number": 110
    })
}

fn page(prefix: &str, n: usize) -> Value {
    Value::Array(
        (0..n)
            .map(|i| launch(&format!("{prefix}{i}"), &format!("{prefix} {i}")))
            .collect(),
    )
}

fn url(request: &Request<HttpRequest>) -> &str {
    &request.operation.url
}

fn open_list(tester: &Tester, model: &mut Model, items: usize) {
    let mut effects = send(tester, Event::ListOpened, model);
    let mut requests = take_http(&mut effects);
    assert_eq!(requests.len(), 1);
    resolve(tester, &mut requests[0], ok_json(&page("L", items)), model);
}

/// Types a query and fires its debounce timer, returning the search request.
fn search_for(tester: &Tester, model: &mut Model, query: &str) -> Request<HttpRequest> {
    let mut effects = send(
        tester,
        Event::SearchQueryChanged {
            query: query.to_string(),
        },
        model,
    );
    let mut start = take_timers(&mut effects)
        .into_iter()
        .find(|t| matches!(t.operation, TimerOperation::Start { .. }))
        .expect("debounce timer started");
    let TimerOperation::Start { id, .. } = start.operation else {
        unreachable!()
    };
    let mut effects = resolve(tester, &mut start, TimerOutput::Elapsed { id }, model);
    take_http(&mut effects).remove(0)
}

#[test]
fn first_page_then_load_more_until_exhausted() {
    let tester = Tester::default();
    let mut model = Model::default();

    open_list(&tester, &mut model, 20);
    assert!(model.list.has_more());
    assert_eq!(model.list.next_offset(), 20);

    let mut effects = send(&tester, Event::LoadMoreRequested, &mut model);
    let mut requests = take_http(&mut effects);
    assert_eq!(requests[0].operation.method, "GET");
    assert!(url(&requests[0]).contains("limit=20&offset=20"));

    resolve(&tester, &mut requests[0], ok_json(&page("M", 5)), &mut model);
    assert_eq!(model.list.launches().len(), 25);
    assert!(!model.list.has_more());

    let mut effects = send(&tester, Event::LoadMoreRequested, &mut model);
    assert!(take_http(&mut effects).is_empty());
}

#[test]
fn burst_of_keystrokes_issues_one_search() {
    let tester = Tester::default();
    let mut model = Model::default();
    open_list(&tester, &mut model, 20);

    let mut timers = Vec::new();
    for query in ["f", "fa", "fal"] {
        let mut effects = send(
            &tester,
            Event::SearchQueryChanged {
                query: query.to_string(),
            },
            &mut model,
        );
        assert!(take_http(&mut effects).is_empty());
        timers.extend(take_timers(&mut effects));
    }

    let starts = timers
        .iter()
        .filter(|t| matches!(t.operation, TimerOperation::Start { millis: 500, .. }))
        .count();
    assert_eq!(starts, 3);
    let cancels = timers
        .iter()
        .filter(|t| matches!(t.operation, TimerOperation::Cancel { .. }))
        .count();
    assert_eq!(cancels, 2);

    // A shell that ignores cancellation still fires every started timer.
    let mut searches = Vec::new();
    for timer in &mut timers {
        let TimerOperation::Start { id, .. } = timer.operation else {
            continue;
        };
        let mut effects = resolve(&tester, timer, TimerOutput::Elapsed { id }, &mut model);
        searches.extend(take_http(&mut effects));
    }
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].operation.method, "POST");
    assert!(url(&searches[0]).ends_with("/v5/launches/query"));

    let body: Value = serde_json::from_slice(&searches[0].operation.body).unwrap();
    assert_eq!(body["query"]["name"]["$regex"], "fal");
    assert_eq!(body["options"]["limit"], 100);
}

#[test]
fn cancelled_debounce_answers_are_silent() {
    let tester = Tester::default();
    let mut model = Model::default();
    open_list(&tester, &mut model, 20);

    let mut effects = send(
        &tester,
        Event::SearchQueryChanged { query: "s".into() },
        &mut model,
    );
    let mut first = take_timers(&mut effects);
    send(
        &tester,
        Event::SearchQueryChanged { query: "sn".into() },
        &mut model,
    );

    let TimerOperation::Start { id, .. } = first[0].operation else {
        panic!("expected timer start");
    };
    let effects = resolve(&tester, &mut first[0], TimerOutput::Cancelled { id }, &mut model);
    assert!(effects.is_empty());
    assert!(model.list.search_results().is_empty());
}

#[test]
fn late_browse_page_does_not_touch_search_results() {
    let tester = Tester::default();
    let mut model = Model::default();
    open_list(&tester, &mut model, 20);

    let mut effects = send(&tester, Event::LoadMoreRequested, &mut model);
    let mut more = take_http(&mut effects);

    let mut search = search_for(&tester, &mut model, "starlink");
    let hits = json!({"docs": page("S", 3), "totalDocs": 3});
    resolve(&tester, &mut search, ok_json(&hits), &mut model);
    assert_eq!(model.list.displayed().len(), 3);

    let effects = resolve(&tester, &mut more[0], ok_json(&page("late", 20)), &mut model);
    assert_eq!(renders(&effects), 0);
    assert_eq!(model.list.displayed().len(), 3);
    assert_eq!(model.list.launches().len(), 20);
}

#[test]
fn late_search_after_clearing_is_ignored() {
    let tester = Tester::default();
    let mut model = Model::default();
    open_list(&tester, &mut model, 20);

    let mut search = search_for(&tester, &mut model, "crew");

    let mut cleared = send(&tester, Event::SearchCleared, &mut model);
    assert!(take_http(&mut cleared).is_empty());

    let hits = json!({"docs": page("C", 2)});
    resolve(&tester, &mut search, ok_json(&hits), &mut model);

    assert!(model.list.search_results().is_empty());
    assert_eq!(model.list.displayed().len(), 20);
    assert_eq!(model.list.phase(), ListPhase::Idle);
}

#[test]
fn failed_first_page_shows_error_and_retry_recovers() {
    let tester = Tester::default();
    let mut model = Model::default();

    let mut effects = send(&tester, Event::ListOpened, &mut model);
    let mut requests = take_http(&mut effects);
    let failure = network_failure("The network connection was lost.");
    resolve(&tester, &mut requests[0], failure, &mut model);

    match tester.view(&model).list.content {
        ListContent::Error { message, .. } => {
            assert_eq!(message, "Network error: The network connection was lost.");
        }
        other => panic!("unexpected {other:?}"),
    }

    let mut effects = send(&tester, Event::RetryRequested, &mut model);
    let mut retry = take_http(&mut effects);
    assert!(url(&retry[0]).contains("offset=0"));
    resolve(&tester, &mut retry[0], ok_json(&page("R", 20)), &mut model);

    assert!(matches!(
        tester.view(&model).list.content,
        ListContent::Launches { .. }
    ));
}

#[test]
fn http_status_error_is_reported_with_code() {
    let tester = Tester::default();
    let mut model = Model::default();

    let mut effects = send(&tester, Event::ListOpened, &mut model);
    let mut requests = take_http(&mut effects);
    let response = status(503, &json!({"error": "unavailable"}));
    resolve(&tester, &mut requests[0], response, &mut model);

    let error = model.list.error().unwrap();
    assert_eq!(error.message, "HTTP error! status: 503");
    assert_eq!(error.status, Some(503));
}

#[test]
fn refresh_in_search_mode_reruns_search() {
    let tester = Tester::default();
    let mut model = Model::default();
    open_list(&tester, &mut model, 20);

    send(
        &tester,
        Event::SearchQueryChanged {
            query: "sentinel".into(),
        },
        &mut model,
    );
    let mut effects = send(&tester, Event::RefreshRequested, &mut model);
    let timers = take_timers(&mut effects);
    assert!(timers
        .iter()
        .all(|t| matches!(t.operation, TimerOperation::Cancel { .. })));
    let requests = take_http(&mut effects);
    assert_eq!(requests.len(), 1);
    assert!(url(&requests[0]).ends_with("/v5/launches/query"));
}
