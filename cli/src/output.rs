use std::fmt::Write as _;

use shared::model::Alert;
use shared::view::{DetailView, LaunchCardView, LaunchpadSection, ListContent, ListView};

/// Cards on screen, empty while loading or failed.
pub fn cards(view: &ListView) -> &[LaunchCardView] {
    match &view.content {
        ListContent::Launches { cards, .. } => cards,
        _ => &[],
    }
}

/// The list's failure, whether it replaced the cards or sits below them.
pub fn list_error(view: &ListView) -> Option<&str> {
    match &view.content {
        ListContent::Error { message, .. } => Some(message),
        ListContent::Launches { error, .. } => error.as_deref(),
        _ => None,
    }
}

fn card_line(card: &LaunchCardView) -> String {
    let mut line = format!(
        "{:<10} {:<32} {:<9} {}",
        card.flight, card.name, card.status_label, card.date
    );
    if let Some(relative) = &card.relative_date {
        let _ = write!(line, " ({relative})");
    }
    line
}

pub fn list_text(view: &ListView) -> String {
    let mut out = String::new();
    if view.searching {
        let _ = writeln!(out, "Search: {}", view.query);
    }
    match &view.content {
        ListContent::Loading { message } => {
            let _ = writeln!(out, "{message}");
        }
        ListContent::Error {
            title,
            message,
            retry_label,
        } => {
            let _ = writeln!(out, "{title}\n{message}\n[{retry_label}]");
        }
        ListContent::Empty {
            title,
            message,
            action_label,
            ..
        } => {
            let _ = writeln!(out, "{title}\n{message}\n[{action_label}]");
        }
        ListContent::Launches {
            cards,
            footer,
            error,
            ..
        } => {
            for card in cards {
                let _ = writeln!(out, "{}", card_line(card));
            }
            if let Some(footer) = footer {
                let _ = writeln!(out, "{footer}");
            }
            if let Some(error) = error {
                let _ = writeln!(out, "! {error}");
            }
        }
    }
    out
}

pub fn detail_text(view: &DetailView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}  [{}]", view.flight_number, view.name, view.status_label);
    let _ = writeln!(out, "{}", view.date);
    let _ = writeln!(out, "\n{}\n", view.description);
    if let Some(webcast) = &view.webcast_url {
        let _ = writeln!(out, "Webcast: {webcast}");
    }

    match &view.launchpad {
        LaunchpadSection::Loading { message } => {
            let _ = writeln!(out, "{message}");
        }
        LaunchpadSection::Failed {
            message,
            retry_label,
        } => {
            let _ = writeln!(out, "Launchpad unavailable: {message} [{retry_label}]");
        }
        LaunchpadSection::Loaded(pad) => {
            let _ = writeln!(out, "Launchpad: {}", pad.full_name);
            let _ = writeln!(out, "  {}", pad.place);
            let _ = writeln!(
                out,
                "  {} of {} launches succeeded ({})",
                pad.launch_successes, pad.launch_attempts, pad.success_rate
            );
            if let Some(distance) = &pad.distance {
                let _ = writeln!(out, "  {distance}");
            }
            if let Some(details) = &pad.details {
                let _ = writeln!(out, "  {details}");
            }
        }
    }
    out
}

pub fn alert_text(alert: &Alert) -> String {
    format!("{}: {}", alert.title, alert.message)
}
