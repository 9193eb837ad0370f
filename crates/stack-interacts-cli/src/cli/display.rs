use serde_json::{json, Value as JsonValue};

use stack_interacts_core::codec;
use stack_interacts_core::query::{CardState, Dashboard, NameStats};
use stack_interacts_core::stats::{Stat, StatKind};

fn count(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

pub fn render_stat_card(kind: StatKind, card: &CardState<Stat>, now: i64) -> String {
    let mut lines = vec![green!("{}", kind.label())];
    match card {
        CardState::Failed(message) => lines.push(red!("{}", message)),
        CardState::Loaded(stat) if !stat.found => {
            lines.push(yellow!("No {} stats found for this address.", kind.label()));
            lines.push(black!("{}", stat.raw.to_json()));
        }
        CardState::Loaded(stat) => {
            match kind {
                StatKind::Voting => {
                    lines.push(format!("Polls voted: {}", count(stat.secondary_count)));
                    lines.push(format!("Total votes cast: {}", count(stat.total_count)));
                }
                _ => lines.push(format!("Total: {}", count(stat.total_count))),
            }
            lines.push(format!("Last: {}", stat.last_activity(now)));
        }
    }
    lines.join("\n")
}

pub fn render_name_card(card: &CardState<NameStats>) -> String {
    let mut lines = vec![green!("Names")];
    match card {
        CardState::Failed(message) => lines.push(red!("{}", message)),
        CardState::Loaded(stats) => {
            lines.push(format!("Total usernames: {}", count(stats.total_usernames)));
            let has_username = match stats.has_username {
                Some(true) => "yes",
                Some(false) => "no",
                None => "-",
            };
            lines.push(format!("Has username: {}", has_username));
        }
    }
    lines.join("\n")
}

pub fn render_dashboard(address: &str, dashboard: &Dashboard, now: i64) -> String {
    [
        format!("Interactions for {}", address),
        render_stat_card(StatKind::Greeting, &dashboard.greeting, now),
        render_stat_card(StatKind::Message, &dashboard.message, now),
        render_stat_card(StatKind::Voting, &dashboard.voting, now),
        render_name_card(&dashboard.naming),
    ]
    .join("\n\n")
}

fn card_json<T>(card: &CardState<T>, to_json: impl Fn(&T) -> JsonValue) -> JsonValue {
    match card {
        CardState::Loaded(value) => json!({ "status": "loaded", "value": to_json(value) }),
        CardState::Failed(message) => json!({ "status": "failed", "error": message }),
    }
}

pub fn dashboard_json(address: &str, dashboard: &Dashboard) -> JsonValue {
    json!({
        "address": address,
        "greeting": card_json(&dashboard.greeting, Stat::to_json),
        "message": card_json(&dashboard.message, Stat::to_json),
        "voting": card_json(&dashboard.voting, Stat::to_json),
        "naming": card_json(&dashboard.naming, |stats| json!({
            "total_usernames": stats.total_usernames,
            "has_username": stats.has_username,
        })),
    })
}
