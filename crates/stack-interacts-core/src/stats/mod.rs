mod humanize;

use serde_json::{json, Value as JsonValue};

use crate::codec::{self, ClarityValue};
use clarity_repl::clarity::vm::types::{OptionalData, ResponseData};

pub use humanize::{humanize_last_activity, humanize_since_now, NO_ACTIVITY};

/// What a node returned for a read-only call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResponse {
    /// The call was evaluated.
    Okay(ClarityValue),
    /// The node refused or failed to evaluate the call.
    Failed { cause: String },
}

impl QueryResponse {
    pub fn to_json(&self) -> JsonValue {
        match self {
            QueryResponse::Okay(value) => json!({ "okay": true, "result": codec::to_json(value) }),
            QueryResponse::Failed { cause } => json!({ "okay": false, "cause": cause }),
        }
    }
}

/// Tuple field names a contract uses for its per-address stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    pub total: &'static str,
    pub secondary: Option<&'static str>,
    pub last_activity: &'static str,
}

pub const GREETING_FIELDS: FieldMap =
    FieldMap { total: "total-gms", secondary: None, last_activity: "last-gm-timestamp" };

pub const MESSAGE_FIELDS: FieldMap = FieldMap {
    total: "total-messages",
    secondary: None,
    last_activity: "last-message-timestamp",
};

pub const VOTING_FIELDS: FieldMap = FieldMap {
    total: "total-votes-cast",
    secondary: Some("polls-voted"),
    last_activity: "last-activity-timestamp",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    Greeting,
    Message,
    Voting,
}

impl StatKind {
    pub fn field_map(&self) -> FieldMap {
        match self {
            StatKind::Greeting => GREETING_FIELDS,
            StatKind::Message => MESSAGE_FIELDS,
            StatKind::Voting => VOTING_FIELDS,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatKind::Greeting => "GM",
            StatKind::Message => "Post Message",
            StatKind::Voting => "Vote",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub total_count: Option<u64>,
    pub secondary_count: Option<u64>,
    pub last_activity_timestamp: Option<i64>,
    pub found: bool,
    pub raw: QueryResponse,
}

impl Stat {
    fn not_found(raw: QueryResponse) -> Stat {
        Stat {
            total_count: None,
            secondary_count: None,
            last_activity_timestamp: None,
            found: false,
            raw,
        }
    }

    pub fn last_activity(&self, now: i64) -> String {
        humanize_last_activity(self.last_activity_timestamp, now)
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "found": self.found,
            "total_count": self.total_count,
            "secondary_count": self.secondary_count,
            "last_activity_timestamp": self.last_activity_timestamp,
            "raw": self.raw.to_json(),
        })
    }
}

/// Strips one `some` or `ok` layer. `none` and `err` have nothing inside.
fn unwrap_once(value: &ClarityValue) -> Option<&ClarityValue> {
    match value {
        ClarityValue::Optional(OptionalData { data: Some(inner) }) => Some(&**inner),
        ClarityValue::Optional(OptionalData { data: None }) => None,
        ClarityValue::Response(ResponseData { committed: true, data }) => Some(&**data),
        ClarityValue::Response(ResponseData { committed: false, .. }) => None,
        other => Some(other),
    }
}

fn as_count(value: &ClarityValue) -> Option<u64> {
    match value {
        ClarityValue::UInt(n) => u64::try_from(*n).ok(),
        ClarityValue::Int(n) => u64::try_from(*n).ok(),
        _ => None,
    }
}

fn as_timestamp(value: &ClarityValue) -> Option<i64> {
    match value {
        ClarityValue::UInt(n) => i64::try_from(*n).ok(),
        ClarityValue::Int(n) => i64::try_from(*n).ok(),
        _ => None,
    }
}

/// Normalizes a `get-user-stats` response. Total: whatever shape comes back,
/// the result is a [`Stat`], with `found == false` when nothing usable was
/// returned.
pub fn decode(response: QueryResponse, fields: &FieldMap) -> Stat {
    let value = match &response {
        QueryResponse::Okay(value) => value,
        QueryResponse::Failed { .. } => return Stat::not_found(response),
    };
    let tuple = match unwrap_once(value) {
        Some(ClarityValue::Tuple(tuple)) => tuple,
        _ => return Stat::not_found(response),
    };

    let field = |name: &str| tuple.get(name).ok().and_then(unwrap_once);
    let total_count = field(fields.total).and_then(as_count);
    let secondary_count = fields.secondary.and_then(|name| field(name)).and_then(as_count);
    let last_activity_timestamp = field(fields.last_activity).and_then(as_timestamp);

    Stat { total_count, secondary_count, last_activity_timestamp, found: true, raw: response }
}

/// Reads a counter such as `get-total-usernames`.
pub fn decode_count(response: &QueryResponse) -> Option<u64> {
    match response {
        QueryResponse::Okay(value) => unwrap_once(value).and_then(as_count),
        QueryResponse::Failed { .. } => None,
    }
}

/// Reads a boolean such as `has-username` or `is-username-available`.
pub fn decode_flag(response: &QueryResponse) -> Option<bool> {
    match response {
        QueryResponse::Okay(value) => match unwrap_once(value) {
            Some(ClarityValue::Bool(flag)) => Some(*flag),
            _ => None,
        },
        QueryResponse::Failed { .. } => None,
    }
}
