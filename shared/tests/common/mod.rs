//! Drives the core through `AppTester` the way a shell would: events emitted
//! by capabilities are fed back into `update` until the core settles.
#![allow(dead_code)]

use crux_core::capability::Operation;
use crux_core::testing::{AppTester, Update};
use crux_core::Request;
use crux_http::protocol::{HttpRequest, HttpResponse, HttpResult};
use serde::Serialize;
use shared::capabilities::{LocationOperation, PlatformOperation, TimerOperation};
use shared::{App, Effect, Event, Model};

pub type Tester = AppTester<App, Effect>;

pub fn settle(tester: &Tester, update: Update<Effect, Event>, model: &mut Model) -> Vec<Effect> {
    let mut effects = update.effects;
    let mut events = update.events;
    while !events.is_empty() {
        for event in std::mem::take(&mut events) {
            let next = tester.update(event, model);
            effects.extend(next.effects);
            events.extend(next.events);
        }
    }
    effects
}

pub fn send(tester: &Tester, event: Event, model: &mut Model) -> Vec<Effect> {
    let update = tester.update(event, model);
    settle(tester, update, model)
}

pub fn resolve<Op: Operation>(
    tester: &Tester,
    request: &mut Request<Op>,
    output: Op::Output,
    model: &mut Model,
) -> Vec<Effect> {
    let update = tester.resolve(request, output).expect("request awaits output");
    settle(tester, update, model)
}

fn take<T>(
    effects: &mut Vec<Effect>,
    is: fn(&Effect) -> bool,
    into: fn(Effect) -> Option<T>,
) -> Vec<T> {
    let (hits, rest): (Vec<_>, Vec<_>) = std::mem::take(effects).into_iter().partition(is);
    *effects = rest;
    hits.into_iter().filter_map(into).collect()
}

pub fn take_http(effects: &mut Vec<Effect>) -> Vec<Request<HttpRequest>> {
    take(effects, Effect::is_http, Effect::into_http)
}

pub fn take_timers(effects: &mut Vec<Effect>) -> Vec<Request<TimerOperation>> {
    take(effects, Effect::is_timer, Effect::into_timer)
}

pub fn take_location(effects: &mut Vec<Effect>) -> Vec<Request<LocationOperation>> {
    take(effects, Effect::is_location, Effect::into_location)
}

pub fn take_platform(effects: &mut Vec<Effect>) -> Vec<Request<PlatformOperation>> {
    take(effects, Effect::is_platform, Effect::into_platform)
}

pub fn renders(effects: &[Effect]) -> usize {
    effects.iter().filter(|e| e.is_render()).count()
}

pub fn ok_json(body: &impl Serialize) -> HttpResult {
    status(200, body)
}

pub fn status(code: u16, body: &impl Serialize) -> HttpResult {
    HttpResult::Ok(HttpResponse::status(code).json(body).build())
}

pub fn network_failure(message: &str) -> HttpResult {
    HttpResult::Err(crux_http::Error::Io(message.to_string()))
}
