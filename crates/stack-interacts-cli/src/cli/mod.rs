use clap::{Parser, Subcommand, ValueEnum};
use error_stack::{Report, ResultExt};
use std::path::Path;
use std::process;

use stack_interacts_core::config::InteractsConfig;
use stack_interacts_core::constants::{DEFAULT_CONFIG_FILE, DEFAULT_READ_ONLY_SENDER};
use stack_interacts_core::dispatch::ContractCallRequest;
use stack_interacts_core::query::{
    check_name_available, fetch_block_height, fetch_dashboard, fetch_owned_name,
    prepare_name_release, prepare_name_reservation, ReadOnlyQueryExecutor,
};
use stack_interacts_core::rpc::StacksRpc;
use stack_interacts_core::session::{SessionContext, StaticSession};
use stack_interacts_core::validation::{
    parse_amount, validate_message, validate_name, validate_poll_draft, validate_vote,
    FormInput, PollDraft,
};
use stack_interacts_core::Context;

use self::env::InteractsEnv;
use self::errors::{CliError, CliErrorExt, IntoCliError};

mod display;
mod env;
mod errors;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opts {
    /// Path to the config file (default to ./Interacts.toml)
    #[arg(long = "config", short = 'c', global = true)]
    pub config_path: Option<String>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// Validate a single form input
    #[clap(name = "validate", bin_name = "validate")]
    Validate(ValidateInput),
    /// Build the contract call a form would submit
    #[clap(subcommand, name = "encode", bin_name = "encode")]
    Encode(EncodeCommand),
    /// Show interaction stats for an address
    #[clap(name = "stats", bin_name = "stats")]
    Stats(ShowStats),
    /// Name registry lookups
    #[clap(subcommand, name = "name", bin_name = "name")]
    Name(NameCommand),
    /// Print the current Stacks block height
    #[clap(name = "block-height", bin_name = "block-height")]
    BlockHeight,
}

#[derive(ValueEnum, PartialEq, Clone, Copy, Debug)]
pub enum InputKind {
    Name,
    Message,
    Address,
    Amount,
    Addresses,
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct ValidateInput {
    /// Kind of input to validate
    #[arg(value_enum)]
    pub kind: InputKind,
    /// Raw value, as typed in the form
    pub value: String,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
pub enum EncodeCommand {
    /// Say GM
    #[clap(name = "gm", bin_name = "gm")]
    Gm,
    /// Post a message
    #[clap(name = "post", bin_name = "post")]
    Post { message: String },
    /// Send STX to a friend
    #[clap(name = "send", bin_name = "send")]
    Send { recipient: String, amount: String },
    /// Send the same amount of STX to many recipients
    #[clap(name = "send-many", bin_name = "send-many")]
    SendMany {
        /// Recipients, separated by spaces, commas or semicolons
        addresses: String,
        amount: String,
    },
    /// Create a poll
    #[clap(name = "create-poll", bin_name = "create-poll")]
    CreatePoll(CreatePoll),
    /// Vote in a poll
    #[clap(name = "vote", bin_name = "vote")]
    Vote { poll_id: String, option_index: String },
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct CreatePoll {
    pub title: String,
    #[arg(long = "description", default_value = "")]
    pub description: String,
    /// Poll option, repeat for each option
    #[arg(long = "option", short = 'o')]
    pub options: Vec<String>,
    /// Duration in blocks
    #[arg(long = "duration", default_value = "144")]
    pub duration_blocks: String,
    #[arg(long = "votes-per-user", default_value = "1")]
    pub votes_per_user: String,
    /// Require voters to stake at least this many STX
    #[arg(long = "min-stake")]
    pub min_stake: Option<String>,
}

#[derive(Parser, PartialEq, Clone, Debug)]
pub struct ShowStats {
    /// Address to inspect (default to STACKS_ADDRESS or the configured sender)
    #[arg(long = "address", short = 'a')]
    pub address: Option<String>,
    /// Print the stats as JSON
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
pub enum NameCommand {
    /// Check whether a username is still available
    #[clap(name = "check", bin_name = "check")]
    Check { name: String },
    /// Show the username owned by an address
    #[clap(name = "owned", bin_name = "owned")]
    Owned {
        #[arg(long = "address", short = 'a')]
        address: Option<String>,
    },
    /// Build the call reserving a username, if the address holds none and the name is free
    #[clap(name = "reserve", bin_name = "reserve")]
    Reserve {
        name: String,
        #[arg(long = "address", short = 'a')]
        address: Option<String>,
    },
    /// Build the call releasing the username held by an address
    #[clap(name = "release", bin_name = "release")]
    Release {
        #[arg(long = "address", short = 'a')]
        address: Option<String>,
    },
}

pub fn main() {
    let logger = hiro_system_kit::log::setup_logger();
    let _guard = hiro_system_kit::log::setup_global_logger(logger.clone());
    let ctx = Context::new(logger);

    let opts: Opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(e) => {
            println!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = hiro_system_kit::nestable_block_on(handle_command(opts, &ctx)) {
        ctx.try_log(|logger| error!(logger, "{:?}", e));
        eprintln!("{}", format_err!(e.current_context()));
        std::thread::sleep(std::time::Duration::from_millis(500));
        process::exit(1);
    }
}

fn load_config(config_path: Option<&str>) -> Result<InteractsConfig, Report<CliError>> {
    let path = config_path.unwrap_or(DEFAULT_CONFIG_FILE);
    let config = InteractsConfig::from_file(Path::new(path))
        .into_cli_error(CliError::ConfigError)
        .with_config_file(path)?;
    if config.is_none() && config_path.is_some() {
        let missing = Report::new(CliError::ConfigError).attach_printable("config file not found");
        return Err::<InteractsConfig, _>(missing).with_config_file(path);
    }
    InteractsEnv::load()
        .apply(config.unwrap_or_default())
        .into_cli_error(CliError::EnvironmentError)
}

async fn handle_command(opts: Opts, ctx: &Context) -> Result<(), Report<CliError>> {
    let config = load_config(opts.config_path.as_deref())?;
    match opts.command {
        Command::Validate(cmd) => handle_validate_command(&cmd, &config)?,
        Command::Encode(cmd) => handle_encode_command(&cmd, &config)?,
        Command::Stats(cmd) => handle_stats_command(&cmd, &config, ctx).await?,
        Command::Name(cmd) => handle_name_command(&cmd, &config).await?,
        Command::BlockHeight => {
            let rpc = StacksRpc::new(&config.api_url());
            match fetch_block_height(&rpc, ctx).await {
                Some(height) => println!("{}", height),
                None => println!("{}", yellow!("block height unavailable")),
            }
        }
    }
    Ok(())
}

fn form_input(kind: InputKind, value: &str) -> FormInput {
    let value = value.to_string();
    match kind {
        InputKind::Name => FormInput::Name(value),
        InputKind::Message => FormInput::Message(value),
        InputKind::Address => FormInput::Address(value),
        InputKind::Amount => FormInput::Amount(value),
        InputKind::Addresses => FormInput::AddressList(value),
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), Report<CliError>> {
    let rendered = serde_json::to_string_pretty(value)
        .change_context(CliError::OutputError)
        .attach_printable("unable to render JSON")?;
    println!("{}", rendered);
    Ok(())
}

fn handle_validate_command(
    cmd: &ValidateInput,
    config: &InteractsConfig,
) -> Result<(), Report<CliError>> {
    let payload = config
        .validator()
        .validate(&form_input(cmd.kind, &cmd.value))
        .into_cli_error(CliError::ValidationError)?;
    let json = serde_json::to_value(&payload)
        .change_context(CliError::OutputError)
        .attach_printable("unable to serialize payload")?;
    println!("{}", green!("valid"));
    print_json(&json)
}

fn build_request(
    cmd: &EncodeCommand,
    config: &InteractsConfig,
) -> Result<ContractCallRequest, Report<CliError>> {
    let registry = &config.contracts;
    let validator = config.validator();
    let request = match cmd {
        EncodeCommand::Gm => registry.say_gm(),
        EncodeCommand::Post { message } => {
            let message = validate_message(message).into_cli_error(CliError::ValidationError)?;
            registry.post_message(&message).into_cli_error(CliError::EncodingError)?
        }
        EncodeCommand::Send { recipient, amount } => {
            let recipient = validator.address(recipient).into_cli_error(CliError::ValidationError)?;
            let amount = parse_amount(amount).into_cli_error(CliError::ValidationError)?;
            registry.send_stx(&recipient, amount)
        }
        EncodeCommand::SendMany { addresses, amount } => {
            let recipients =
                validator.address_list(addresses).into_cli_error(CliError::ValidationError)?;
            let amount = parse_amount(amount).into_cli_error(CliError::ValidationError)?;
            registry.send_many_stx(&recipients, amount).into_cli_error(CliError::EncodingError)?
        }
        EncodeCommand::CreatePoll(poll) => {
            let draft = PollDraft {
                title: poll.title.clone(),
                description: poll.description.clone(),
                options: poll.options.clone(),
                duration_blocks: poll.duration_blocks.clone(),
                votes_per_user: poll.votes_per_user.clone(),
                requires_stake: poll.min_stake.is_some(),
                min_stake_amount: poll.min_stake.clone().unwrap_or_default(),
            };
            let args = validate_poll_draft(&draft).into_cli_error(CliError::ValidationError)?;
            registry.create_poll(&args)
        }
        EncodeCommand::Vote { poll_id, option_index } => {
            let vote =
                validate_vote(poll_id, option_index).into_cli_error(CliError::ValidationError)?;
            registry.vote(&vote)
        }
    };
    Ok(request)
}

fn handle_encode_command(
    cmd: &EncodeCommand,
    config: &InteractsConfig,
) -> Result<(), Report<CliError>> {
    let request = build_request(cmd, config)?;
    let json = request.to_json().into_cli_error(CliError::EncodingError)?;
    print_json(&json)
}

fn session_for(address: Option<&String>, config: &InteractsConfig) -> SessionContext {
    let address = address.cloned().or_else(|| config.sender.clone());
    SessionContext::from_provider(&StaticSession::new(address))
}

async fn handle_stats_command(
    cmd: &ShowStats,
    config: &InteractsConfig,
    ctx: &Context,
) -> Result<(), Report<CliError>> {
    let session = session_for(cmd.address.as_ref(), config);
    let address = session.address().into_cli_error(CliError::SessionError)?.to_string();
    let api_url = config.api_url();
    let rpc = StacksRpc::new(&api_url);
    let dashboard = fetch_dashboard(&rpc, &config.contracts, &session, ctx)
        .await
        .into_cli_error(CliError::ServiceError)
        .with_node(&api_url)?;
    if cmd.json {
        return print_json(&display::dashboard_json(&address, &dashboard));
    }
    let now = chrono::Utc::now().timestamp();
    println!("{}", display::render_dashboard(&address, &dashboard, now));
    Ok(())
}

/// Reserve with `Some(name)`, release otherwise. Both look up the owner's
/// current name first.
async fn build_name_request(
    executor: &dyn ReadOnlyQueryExecutor,
    config: &InteractsConfig,
    owner: &str,
    name: Option<&str>,
) -> Result<ContractCallRequest, Report<CliError>> {
    let request = match name {
        Some(name) => {
            let name = validate_name(name).into_cli_error(CliError::ValidationError)?;
            prepare_name_reservation(executor, &config.contracts, owner, &name).await
        }
        None => prepare_name_release(executor, &config.contracts, owner).await,
    };
    request.into_cli_error(CliError::ServiceError)
}

async fn handle_name_command(
    cmd: &NameCommand,
    config: &InteractsConfig,
) -> Result<(), Report<CliError>> {
    let api_url = config.api_url();
    let rpc = StacksRpc::new(&api_url);
    match cmd {
        NameCommand::Check { name } => {
            let name = validate_name(name).into_cli_error(CliError::ValidationError)?;
            let sender = config.sender.as_deref().unwrap_or(DEFAULT_READ_ONLY_SENDER);
            let available = check_name_available(&rpc, &config.contracts, name.as_str(), sender)
                .await
                .into_cli_error(CliError::ServiceError)
                .with_node(&api_url)?;
            if available {
                println!("{}", green!("{} is available", name.as_str()));
            } else {
                println!("{}", yellow!("{} is already taken", name.as_str()));
            }
        }
        NameCommand::Owned { address } => {
            let session = session_for(address.as_ref(), config);
            let owner = session.address().into_cli_error(CliError::SessionError)?;
            let owned = fetch_owned_name(&rpc, &config.contracts, owner)
                .await
                .into_cli_error(CliError::ServiceError)
                .with_node(&api_url)?;
            match owned {
                Some(name) => println!("{}", name),
                None => println!("{}", yellow!("no username registered")),
            }
        }
        NameCommand::Reserve { address, .. } | NameCommand::Release { address } => {
            let session = session_for(address.as_ref(), config);
            let owner = session.address().into_cli_error(CliError::SessionError)?;
            let name = match cmd {
                NameCommand::Reserve { name, .. } => Some(name.as_str()),
                _ => None,
            };
            let request = build_name_request(&rpc, config, owner, name)
                .await
                .with_node(&api_url)?;
            let json = request.to_json().into_cli_error(CliError::EncodingError)?;
            print_json(&json)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use stack_interacts_core::codec::{self, ClarityValue};
    use stack_interacts_core::constants::{
        FN_GET_ADDRESS_USERNAME, FN_IS_USERNAME_AVAILABLE, FN_REGISTER_USERNAME,
        FN_RELEASE_USERNAME,
    };
    use stack_interacts_core::contracts::ContractRef;
    use stack_interacts_core::rpc::QueryError;
    use stack_interacts_core::stats::QueryResponse;
    use stack_interacts_core::validation::AddressPolicy;
    use test_case::test_case;

    fn parse_args(args: Vec<&str>) -> Opts {
        Opts::parse_from(args)
    }

    #[test]
    fn test_validate_arguments() {
        let opts = parse_args(vec!["stack-interacts", "validate", "amount", "1.5"]);
        assert_eq!(opts.config_path, None);
        assert_eq!(
            opts.command,
            Command::Validate(ValidateInput { kind: InputKind::Amount, value: "1.5".into() })
        );
    }

    #[test]
    fn test_global_config_flag() {
        let opts = parse_args(vec!["stack-interacts", "block-height", "--config", "./devnet.toml"]);
        assert_eq!(opts.config_path.as_deref(), Some("./devnet.toml"));
        assert_eq!(opts.command, Command::BlockHeight);
    }

    #[test]
    fn test_stats_arguments() {
        let opts = parse_args(vec!["stack-interacts", "stats", "-a", "SP000000000000000000002Q6VF78", "--json"]);
        let Command::Stats(cmd) = opts.command else {
            panic!("expected stats command");
        };
        assert_eq!(cmd.address.as_deref(), Some("SP000000000000000000002Q6VF78"));
        assert!(cmd.json);
    }

    #[test]
    fn test_create_poll_arguments() {
        let opts = parse_args(vec![
            "stack-interacts", "encode", "create-poll", "Lunch", "-o", "pizza", "-o", "tacos",
            "--min-stake", "1",
        ]);
        let Command::Encode(EncodeCommand::CreatePoll(poll)) = opts.command else {
            panic!("expected create-poll command");
        };
        assert_eq!(poll.options, vec!["pizza", "tacos"]);
        assert_eq!(poll.duration_blocks, "144");
        assert_eq!(poll.votes_per_user, "1");
        assert_eq!(poll.min_stake.as_deref(), Some("1"));
    }

    #[test_case(vec!["stack-interacts", "validate", "phone", "1"] ; "unknown input kind")]
    #[test_case(vec!["stack-interacts", "encode", "send", "SP000000000000000000002Q6VF78"] ; "missing amount")]
    #[test_case(vec!["stack-interacts", "name"] ; "missing name subcommand")]
    fn test_invalid_arguments(args: Vec<&str>) {
        assert!(Opts::try_parse_from(args).is_err());
    }

    const RECIPIENT: &str = "SP2Z3M34KEKC79TMRMZB24YG30FE25JPN83TPZSZ2";

    fn checked_config() -> InteractsConfig {
        let mut config = InteractsConfig::default();
        config.address_policy = AddressPolicy::C32Check;
        config
    }

    #[test]
    fn test_encode_send_many() {
        let config = checked_config();
        let cmd = EncodeCommand::SendMany {
            addresses: format!("{}, {}", RECIPIENT, RECIPIENT),
            amount: "1".into(),
        };
        let request = build_request(&cmd, &config).unwrap();
        assert_eq!(request.function_name, "send-many-stx");
        let entry = codec::tuple([
            ("to", codec::principal(RECIPIENT).unwrap()),
            ("ustx", codec::uint(1_000_000u32)),
        ])
        .unwrap();
        let expected = codec::list(vec![entry.clone(), entry]).unwrap();
        assert_eq!(request.function_args, vec![expected]);
    }

    #[test]
    fn test_default_config_builds_send_many() {
        let cmd = EncodeCommand::SendMany { addresses: RECIPIENT.into(), amount: "2.5".into() };
        let request = build_request(&cmd, &InteractsConfig::default()).unwrap();
        assert_eq!(request.function_name, "send-many-stx");
        assert_eq!(request.function_args.len(), 1);
    }

    /// Answers the two naming lookups with fixed values.
    struct NameRegistryStub {
        owned: Option<&'static str>,
        available: bool,
    }

    impl ReadOnlyQueryExecutor for NameRegistryStub {
        fn call_read_only<'a>(
            &'a self,
            _contract: &'a ContractRef,
            function_name: &'a str,
            _args: &'a [ClarityValue],
            _sender: &'a str,
        ) -> BoxFuture<'a, Result<QueryResponse, QueryError>> {
            let response = match function_name {
                FN_GET_ADDRESS_USERNAME => Ok(QueryResponse::Okay(match self.owned {
                    Some(name) => codec::some(codec::string_ascii(name).unwrap()),
                    None => codec::none(),
                })),
                FN_IS_USERNAME_AVAILABLE => Ok(QueryResponse::Okay(ClarityValue::Bool(self.available))),
                _ => Err(QueryError::StatusCode(404)),
            };
            async move { response }.boxed()
        }

        fn block_height(&self) -> BoxFuture<'_, Result<u64, QueryError>> {
            async move { Ok(1) }.boxed()
        }
    }

    #[test]
    fn test_name_commands_arguments() {
        let opts = parse_args(vec!["stack-interacts", "name", "reserve", "Alice", "-a", RECIPIENT]);
        assert_eq!(
            opts.command,
            Command::Name(NameCommand::Reserve { name: "Alice".into(), address: Some(RECIPIENT.into()) })
        );
        let opts = parse_args(vec!["stack-interacts", "name", "release"]);
        assert_eq!(opts.command, Command::Name(NameCommand::Release { address: None }));
        assert!(Opts::try_parse_from(vec!["stack-interacts", "encode", "reserve-name", "alice"]).is_err());
    }

    #[test]
    fn test_reserve_free_name() {
        let stub = NameRegistryStub { owned: None, available: true };
        let config = InteractsConfig::default();
        let request =
            block_on(build_name_request(&stub, &config, RECIPIENT, Some(" Alice "))).unwrap();
        assert_eq!(request.function_name, FN_REGISTER_USERNAME);
        assert_eq!(request.function_args, vec![codec::string_ascii("alice").unwrap()]);
    }

    #[test_case(Some("bob"), true ; "owner already has a name")]
    #[test_case(None, false ; "name taken")]
    fn test_reserve_refusals_are_name_errors(owned: Option<&'static str>, available: bool) {
        let stub = NameRegistryStub { owned, available };
        let config = InteractsConfig::default();
        let error =
            block_on(build_name_request(&stub, &config, RECIPIENT, Some("alice"))).unwrap_err();
        assert_eq!(*error.current_context(), CliError::NameError);
    }

    #[test]
    fn test_reserve_rejects_bad_name_before_lookups() {
        let stub = NameRegistryStub { owned: None, available: true };
        let config = InteractsConfig::default();
        let error = block_on(build_name_request(&stub, &config, RECIPIENT, Some("a b"))).unwrap_err();
        assert_eq!(*error.current_context(), CliError::ValidationError);
    }

    #[test]
    fn test_release_owned_name() {
        let stub = NameRegistryStub { owned: Some("bob"), available: false };
        let config = InteractsConfig::default();
        let request = block_on(build_name_request(&stub, &config, RECIPIENT, None)).unwrap();
        assert_eq!(request.function_name, FN_RELEASE_USERNAME);
        assert_eq!(request.function_args, vec![codec::string_ascii("bob").unwrap()]);

        let stub = NameRegistryStub { owned: None, available: true };
        let error = block_on(build_name_request(&stub, &config, RECIPIENT, None)).unwrap_err();
        assert_eq!(*error.current_context(), CliError::NameError);
    }

    #[test]
    fn test_pattern_policy_refuses_long_addresses() {
        let cmd = EncodeCommand::Send { recipient: RECIPIENT.into(), amount: "1".into() };
        let error = build_request(&cmd, &InteractsConfig::default()).unwrap_err();
        assert_eq!(*error.current_context(), CliError::ValidationError);
        assert!(build_request(&cmd, &checked_config()).is_ok());
    }

    #[test]
    fn test_encode_rejections_are_validation_errors() {
        let config = checked_config();
        let cmd = EncodeCommand::Send {
            recipient: RECIPIENT.into(),
            amount: "0".into(),
        };
        let error = build_request(&cmd, &config).unwrap_err();
        assert_eq!(*error.current_context(), CliError::ValidationError);

        let cmd = EncodeCommand::Vote { poll_id: "1".into(), option_index: "12".into() };
        let error = build_request(&cmd, &config).unwrap_err();
        assert_eq!(*error.current_context(), CliError::ValidationError);
    }

    #[test]
    fn test_session_prefers_explicit_address() {
        let mut config = InteractsConfig::default();
        config.sender = Some("ST000000000000000000002AMW42H".into());
        let explicit = "SP000000000000000000002Q6VF78".to_string();
        assert_eq!(session_for(Some(&explicit), &config).address().unwrap(), explicit);
        assert_eq!(session_for(None, &config).address().unwrap(), "ST000000000000000000002AMW42H");
        assert!(session_for(None, &InteractsConfig::default()).address().is_err());
    }
}
