use clarity_repl::clarity::vm::types::OptionalData;
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::codec::{self, ClarityValue};
use crate::context::Context;
use crate::contracts::{ContractRef, ContractRegistry};
use crate::dispatch::ContractCallRequest;
use crate::constants::{
    FN_GET_ADDRESS_USERNAME, FN_GET_TOTAL_USERNAMES, FN_GET_USER_STATS, FN_HAS_USERNAME,
    FN_IS_USERNAME_AVAILABLE,
};
use crate::errors::InteractsError;
use crate::rpc::{QueryError, StacksRpc};
use crate::session::SessionContext;
use crate::validation::Username;
use crate::stats::{decode, decode_count, decode_flag, FieldMap, QueryResponse, Stat, StatKind};

/// Evaluates read-only contract functions against a node.
pub trait ReadOnlyQueryExecutor: Send + Sync {
    fn call_read_only<'a>(
        &'a self,
        contract: &'a ContractRef,
        function_name: &'a str,
        args: &'a [ClarityValue],
        sender: &'a str,
    ) -> BoxFuture<'a, Result<QueryResponse, QueryError>>;

    fn block_height(&self) -> BoxFuture<'_, Result<u64, QueryError>>;
}

impl ReadOnlyQueryExecutor for StacksRpc {
    fn call_read_only<'a>(
        &'a self,
        contract: &'a ContractRef,
        function_name: &'a str,
        args: &'a [ClarityValue],
        sender: &'a str,
    ) -> BoxFuture<'a, Result<QueryResponse, QueryError>> {
        self.call_read_only_fn(&contract.address, &contract.name, function_name, args, sender)
            .boxed()
    }

    fn block_height(&self) -> BoxFuture<'_, Result<u64, QueryError>> {
        self.get_block_height().boxed()
    }
}

/// Calls `get-user-stats(address)` and normalizes whatever comes back.
pub async fn fetch_and_normalize(
    executor: &dyn ReadOnlyQueryExecutor,
    contract: &ContractRef,
    fields: &FieldMap,
    address: &str,
    ctx: &Context,
) -> Result<Stat, InteractsError> {
    let args = vec![codec::principal(address)?];
    let response = executor
        .call_read_only(contract, FN_GET_USER_STATS, &args, address)
        .await
        .map_err(|e| {
            ctx.try_log(|logger| {
                error!(logger, "{}::{} failed: {}", contract, FN_GET_USER_STATS, e)
            });
            InteractsError::from(e)
        })?;
    let stat = decode(response, fields);
    ctx.try_log(|logger| {
        info!(
            logger,
            "{} stats for {}: found={} total={:?}",
            contract,
            address,
            stat.found,
            stat.total_count
        )
    });
    Ok(stat)
}

/// A dashboard card either shows its data or its own error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardState<T> {
    Loaded(T),
    Failed(String),
}

impl<T> CardState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            CardState::Loaded(value) => Some(value),
            CardState::Failed(_) => None,
        }
    }
}

impl<T> From<Result<T, InteractsError>> for CardState<T> {
    fn from(result: Result<T, InteractsError>) -> Self {
        match result {
            Ok(value) => CardState::Loaded(value),
            Err(e) => CardState::Failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameStats {
    pub total_usernames: Option<u64>,
    pub has_username: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub greeting: CardState<Stat>,
    pub message: CardState<Stat>,
    pub voting: CardState<Stat>,
    pub naming: CardState<NameStats>,
}

/// Runs every stats fetch for the signed-in address concurrently. A failing
/// fetch only affects its own card.
pub async fn fetch_dashboard(
    executor: &dyn ReadOnlyQueryExecutor,
    registry: &ContractRegistry,
    session: &SessionContext,
    ctx: &Context,
) -> Result<Dashboard, InteractsError> {
    let address = session.address()?;
    let greeting_contract = registry.greeting();
    let message_contract = registry.message_stats();
    let voting_contract = registry.voting();
    let greeting_fields = StatKind::Greeting.field_map();
    let message_fields = StatKind::Message.field_map();
    let voting_fields = StatKind::Voting.field_map();

    let (greeting, message, voting, naming) = futures::join!(
        fetch_and_normalize(executor, &greeting_contract, &greeting_fields, address, ctx),
        fetch_and_normalize(executor, &message_contract, &message_fields, address, ctx),
        fetch_and_normalize(executor, &voting_contract, &voting_fields, address, ctx),
        fetch_name_stats(executor, registry, address, ctx),
    );

    Ok(Dashboard {
        greeting: greeting.into(),
        message: message.into(),
        voting: voting.into(),
        naming: naming.into(),
    })
}

fn expect_okay(response: QueryResponse) -> Result<ClarityValue, InteractsError> {
    match response {
        QueryResponse::Okay(value) => Ok(value),
        QueryResponse::Failed { cause } => Err(InteractsError::QueryFailed { message: cause }),
    }
}

/// Whether `name` (compared lowercased) can still be registered.
pub async fn check_name_available(
    executor: &dyn ReadOnlyQueryExecutor,
    registry: &ContractRegistry,
    name: &str,
    sender: &str,
) -> Result<bool, InteractsError> {
    let args = vec![codec::string_ascii(&name.to_lowercase())?];
    let contract = registry.naming();
    let response =
        executor.call_read_only(&contract, FN_IS_USERNAME_AVAILABLE, &args, sender).await?;
    let value = expect_okay(response)?;
    decode_flag(&QueryResponse::Okay(value.clone())).ok_or_else(|| {
        InteractsError::UnexpectedResponse(format!("expected a bool, got {}", value))
    })
}

/// The name registered by `owner`, if any.
pub async fn fetch_owned_name(
    executor: &dyn ReadOnlyQueryExecutor,
    registry: &ContractRegistry,
    owner: &str,
) -> Result<Option<String>, InteractsError> {
    let args = vec![codec::principal(owner)?];
    let contract = registry.naming();
    let response =
        executor.call_read_only(&contract, FN_GET_ADDRESS_USERNAME, &args, owner).await?;
    match expect_okay(response)? {
        ClarityValue::Optional(OptionalData { data: None }) => Ok(None),
        ClarityValue::Optional(OptionalData { data: Some(inner) }) => match codec::as_string(&inner) {
            Some(name) => Ok(Some(name)),
            None => Err(InteractsError::UnexpectedResponse(format!(
                "expected a string, got {}",
                inner
            ))),
        },
        other => Err(InteractsError::UnexpectedResponse(format!(
            "expected an optional name, got {}",
            other
        ))),
    }
}

/// Builds `register-username` for `name` once the lookups allow it: `owner`
/// must not hold a name yet and `name` must be reported available.
pub async fn prepare_name_reservation(
    executor: &dyn ReadOnlyQueryExecutor,
    registry: &ContractRegistry,
    owner: &str,
    name: &Username,
) -> Result<ContractCallRequest, InteractsError> {
    if let Some(owned) = fetch_owned_name(executor, registry, owner).await? {
        return Err(InteractsError::NameAlreadyOwned { name: owned });
    }
    if !check_name_available(executor, registry, name.as_str(), owner).await? {
        return Err(InteractsError::NameTaken { name: name.as_str().to_string() });
    }
    registry.register_username(name)
}

/// Builds `release-username` for the name `owner` currently holds.
pub async fn prepare_name_release(
    executor: &dyn ReadOnlyQueryExecutor,
    registry: &ContractRegistry,
    owner: &str,
) -> Result<ContractCallRequest, InteractsError> {
    let owned =
        fetch_owned_name(executor, registry, owner).await?.ok_or(InteractsError::NoNameOwned)?;
    registry.release_username(&owned)
}

pub async fn fetch_name_stats(
    executor: &dyn ReadOnlyQueryExecutor,
    registry: &ContractRegistry,
    owner: &str,
    ctx: &Context,
) -> Result<NameStats, InteractsError> {
    let contract = registry.naming();
    let no_args: Vec<ClarityValue> = vec![];
    let owner_args = vec![codec::principal(owner)?];
    let (total, has_username) = futures::join!(
        executor.call_read_only(&contract, FN_GET_TOTAL_USERNAMES, &no_args, owner),
        executor.call_read_only(&contract, FN_HAS_USERNAME, &owner_args, owner),
    );
    let stats = NameStats {
        total_usernames: decode_count(&total?),
        has_username: decode_flag(&has_username?),
    };
    ctx.try_log(|logger| info!(logger, "name stats for {}: {:?}", owner, stats));
    Ok(stats)
}

/// Best effort: any failure yields `None`.
pub async fn fetch_block_height(
    executor: &dyn ReadOnlyQueryExecutor,
    ctx: &Context,
) -> Option<u64> {
    match executor.block_height().await {
        Ok(height) => Some(height),
        Err(e) => {
            ctx.try_log(|logger| info!(logger, "unable to fetch block height: {}", e));
            None
        }
    }
}
