use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;
use serde_json::{json, Value as JsonValue};

use crate::codec::{self, txid_display_str, ClarityValue};
use crate::context::Context;
use crate::contracts::ContractRef;
use crate::errors::InteractsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostConditionMode {
    #[default]
    Allow,
}

impl fmt::Display for PostConditionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostConditionMode::Allow => write!(f, "allow"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCallRequest {
    pub contract: ContractRef,
    pub function_name: String,
    pub function_args: Vec<ClarityValue>,
    pub post_condition_mode: PostConditionMode,
}

impl ContractCallRequest {
    /// Arguments as `0x` hex, the form wallets and nodes expect.
    pub fn encoded_args(&self) -> Result<Vec<String>, InteractsError> {
        let mut encoded = vec![];
        for arg in self.function_args.iter() {
            encoded.push(codec::serialize_to_hex(arg)?);
        }
        Ok(encoded)
    }

    pub fn to_json(&self) -> Result<JsonValue, InteractsError> {
        Ok(json!({
            "contract_address": self.contract.address,
            "contract_name": self.contract.name,
            "function_name": self.function_name,
            "function_args": self.encoded_args()?,
            "function_args_repr": self.function_args.iter().map(|a| a.to_string()).collect::<Vec<_>>(),
            "post_condition_mode": self.post_condition_mode.to_string(),
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Finished { tx_id: String },
    Cancelled,
}

/// Hands a contract call to the wallet for signing and broadcast.
pub trait ContractCallDispatcher: Send + Sync {
    fn dispatch<'a>(
        &'a self,
        request: &'a ContractCallRequest,
    ) -> BoxFuture<'a, Result<DispatchOutcome, InteractsError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    Success { tx_id: String },
    Cancelled,
    Error(String),
    /// A previous submission from the same form has not settled yet.
    Busy,
}

impl SubmissionStatus {
    pub fn short(&self) -> String {
        match self {
            SubmissionStatus::Success { tx_id } => {
                format!("Success! TX: {}", txid_display_str(tx_id))
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::Success { tx_id } => write!(f, "Success! TX: {}", tx_id),
            SubmissionStatus::Cancelled => write!(f, "Cancelled"),
            SubmissionStatus::Error(message) => write!(f, "Error: {}", message),
            SubmissionStatus::Busy => write!(f, "Busy"),
        }
    }
}

impl From<Result<DispatchOutcome, InteractsError>> for SubmissionStatus {
    fn from(result: Result<DispatchOutcome, InteractsError>) -> Self {
        match result {
            Ok(DispatchOutcome::Finished { tx_id }) => SubmissionStatus::Success { tx_id },
            Ok(DispatchOutcome::Cancelled) | Err(InteractsError::DispatchCancelled) => {
                SubmissionStatus::Cancelled
            }
            Err(e) => SubmissionStatus::Error(e.to_string()),
        }
    }
}

/// Allows at most one outstanding submission per form.
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    in_flight: AtomicBool,
}

/// Releases the guard when dropped, including when the submit future is dropped early.
pub struct InFlight<'a> {
    guard: &'a SubmissionGuard,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.guard.in_flight.store(false, Ordering::Release);
    }
}

impl SubmissionGuard {
    pub fn new() -> Self {
        SubmissionGuard { in_flight: AtomicBool::new(false) }
    }

    pub fn try_acquire(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| InFlight { guard: self })
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

pub async fn submit(
    guard: &SubmissionGuard,
    dispatcher: &dyn ContractCallDispatcher,
    request: &ContractCallRequest,
    ctx: &Context,
) -> SubmissionStatus {
    let Some(_in_flight) = guard.try_acquire() else {
        ctx.try_log(|logger| {
            info!(logger, "submission already in flight, ignoring {}", request.function_name)
        });
        return SubmissionStatus::Busy;
    };
    ctx.try_log(|logger| {
        info!(logger, "dispatching {}::{}", request.contract, request.function_name)
    });
    let status = SubmissionStatus::from(dispatcher.dispatch(request).await);
    match &status {
        SubmissionStatus::Error(message) => {
            ctx.try_log(|logger| error!(logger, "{} failed: {}", request.function_name, message))
        }
        other => ctx.try_log(|logger| info!(logger, "{}: {}", request.function_name, other)),
    }
    status
}
