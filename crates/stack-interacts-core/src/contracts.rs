use std::fmt;

use crate::codec::{self, ClarityValue};
use crate::constants::*;
use crate::dispatch::{ContractCallRequest, PostConditionMode};
use crate::errors::InteractsError;
use crate::validation::{
    FormField, Message, MicroStx, PollArgs, Recipients, Rejection, RejectionKind, StacksAddress,
    Username, ValidatedPayload, VoteArgs,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractRef {
    pub address: String,
    pub name: String,
}

impl ContractRef {
    pub fn new(address: &str, name: &str) -> Self {
        ContractRef { address: address.to_string(), name: name.to_string() }
    }
}

impl fmt::Display for ContractRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.address, self.name)
    }
}

/// Where the interaction contracts live. Every name can be overridden from
/// configuration, e.g. to target a devnet deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ContractRegistry {
    pub deployer: String,
    pub greeting: String,
    pub message: String,
    pub message_stats: String,
    pub voting: String,
    pub naming: String,
    pub sending: String,
    pub multisending: String,
}

impl Default for ContractRegistry {
    fn default() -> Self {
        ContractRegistry {
            deployer: DEFAULT_DEPLOYER.into(),
            greeting: GREETING_CONTRACT.into(),
            message: MESSAGE_CONTRACT.into(),
            message_stats: MESSAGE_STATS_CONTRACT.into(),
            voting: VOTING_CONTRACT.into(),
            naming: NAMING_CONTRACT.into(),
            sending: SENDING_CONTRACT.into(),
            multisending: MULTISENDING_CONTRACT.into(),
        }
    }
}

impl ContractRegistry {
    fn contract(&self, name: &str) -> ContractRef {
        ContractRef::new(&self.deployer, name)
    }

    pub fn greeting(&self) -> ContractRef {
        self.contract(&self.greeting)
    }

    pub fn message(&self) -> ContractRef {
        self.contract(&self.message)
    }

    pub fn message_stats(&self) -> ContractRef {
        self.contract(&self.message_stats)
    }

    pub fn voting(&self) -> ContractRef {
        self.contract(&self.voting)
    }

    pub fn naming(&self) -> ContractRef {
        self.contract(&self.naming)
    }

    pub fn sending(&self) -> ContractRef {
        self.contract(&self.sending)
    }

    pub fn multisending(&self) -> ContractRef {
        self.contract(&self.multisending)
    }

    fn call(&self, contract: ContractRef, function_name: &str, args: Vec<ClarityValue>) -> ContractCallRequest {
        ContractCallRequest {
            contract,
            function_name: function_name.to_string(),
            function_args: args,
            post_condition_mode: PostConditionMode::Allow,
        }
    }

    pub fn say_gm(&self) -> ContractCallRequest {
        self.call(self.greeting(), FN_SAY_GM, vec![])
    }

    pub fn post_message(&self, message: &Message) -> Result<ContractCallRequest, InteractsError> {
        let arg = codec::string_ascii(message.as_str())?;
        Ok(self.call(self.message(), FN_POST_MESSAGE, vec![arg]))
    }

    pub fn register_username(&self, name: &Username) -> Result<ContractCallRequest, InteractsError> {
        let arg = codec::string_ascii(name.as_str())?;
        Ok(self.call(self.naming(), FN_REGISTER_USERNAME, vec![arg]))
    }

    /// `name` is the one the owner currently holds, as returned by the registry.
    pub fn release_username(&self, name: &str) -> Result<ContractCallRequest, InteractsError> {
        let arg = codec::string_ascii(name)?;
        Ok(self.call(self.naming(), FN_RELEASE_USERNAME, vec![arg]))
    }

    /// The sending contract takes the recipient as `string-utf8`, not as a principal.
    pub fn send_stx(&self, recipient: &StacksAddress, amount: MicroStx) -> ContractCallRequest {
        let args = vec![
            codec::string_utf8(recipient.as_str()),
            codec::uint(amount.value()),
        ];
        self.call(self.sending(), FN_SEND_STX, args)
    }

    /// Sends the same amount to every recipient in a single `send-many-stx` call.
    pub fn send_many_stx(
        &self,
        recipients: &Recipients,
        amount: MicroStx,
    ) -> Result<ContractCallRequest, InteractsError> {
        if recipients.is_empty() {
            return Err(Rejection::new(FormField::AddressList, RejectionKind::Empty).into());
        }
        if recipients.len() > MAX_RECIPIENTS {
            return Err(Rejection::new(FormField::AddressList, RejectionKind::OutOfRange).into());
        }
        let mut entries = vec![];
        for recipient in recipients.addresses() {
            entries.push(codec::tuple([
                ("to", codec::principal(recipient.as_str())?),
                ("ustx", codec::uint(amount.value())),
            ])?);
        }
        Ok(self.call(self.multisending(), FN_SEND_MANY_STX, vec![codec::list(entries)?]))
    }

    pub fn create_poll(&self, poll: &PollArgs) -> ContractCallRequest {
        let mut args = vec![
            codec::string_utf8(poll.title()),
            codec::string_utf8(poll.description()),
        ];
        for (index, option) in poll.options().iter().enumerate() {
            let value = option.as_deref().map(codec::string_utf8);
            if index < MIN_POLL_OPTIONS {
                // the first two slots are always filled once validated
                args.push(value.unwrap_or_else(|| codec::string_utf8("")));
            } else {
                args.push(value.map(codec::some).unwrap_or_else(codec::none));
            }
        }
        args.push(codec::uint(poll.duration_blocks()));
        args.push(codec::uint(poll.votes_per_user()));
        args.push(ClarityValue::Bool(poll.requires_stake()));
        args.push(codec::uint(poll.min_stake().value()));
        self.call(self.voting(), FN_CREATE_POLL, args)
    }

    pub fn vote(&self, vote: &VoteArgs) -> ContractCallRequest {
        let args = vec![codec::uint(vote.poll_id()), codec::uint(vote.option_index())];
        self.call(self.voting(), FN_VOTE, args)
    }

    /// Builds the call a single validated payload stands for. Payloads that
    /// only make sense together (recipients and amount) go through
    /// [`ContractRegistry::send_many_stx`] instead, and names go through
    /// [`crate::query::prepare_name_reservation`] so the registry is consulted first.
    pub fn request_for(
        &self,
        payload: &ValidatedPayload,
    ) -> Result<ContractCallRequest, InteractsError> {
        match payload {
            ValidatedPayload::Message(message) => self.post_message(message),
            ValidatedPayload::Poll(poll) => Ok(self.create_poll(poll)),
            ValidatedPayload::Vote(vote) => Ok(self.vote(vote)),
            ValidatedPayload::Name(_) => Err(InteractsError::UnexpectedResponse(
                "name reservations need an ownership and availability lookup".into(),
            )),
            ValidatedPayload::Address(_)
            | ValidatedPayload::Amount(_)
            | ValidatedPayload::AddressList(_) => Err(InteractsError::UnexpectedResponse(
                "payload needs to be combined with an amount or recipients".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clarity_repl::clarity::vm::types::{ListData, SequenceData};
    use crate::validation::{
        parse_amount, validate_address_checked, validate_message, validate_name,
        validate_poll_draft, validate_vote, AddressPolicy, DedupPolicy, PollDraft, Validator,
    };

    const RECIPIENT: &str = "SP2Z3M34KEKC79TMRMZB24YG30FE25JPN83TPZSZ2";

    fn list_items(value: &ClarityValue) -> &[ClarityValue] {
        let ClarityValue::Sequence(SequenceData::List(ListData { data, .. })) = value else {
            panic!("expected a list argument");
        };
        data
    }

    #[test]
    fn test_say_gm_has_no_args() {
        let request = ContractRegistry::default().say_gm();
        assert_eq!(request.contract.to_string(), format!("{DEFAULT_DEPLOYER}.{GREETING_CONTRACT}"));
        assert_eq!(request.function_name, "say-gm");
        assert!(request.function_args.is_empty());
        assert_eq!(request.post_condition_mode, PostConditionMode::Allow);
    }

    #[test]
    fn test_post_message_is_ascii() {
        let registry = ContractRegistry::default();
        let request = registry.post_message(&validate_message("gm stacks").unwrap()).unwrap();
        assert_eq!(request.function_args, vec![codec::string_ascii("gm stacks").unwrap()]);
        assert_eq!(request.contract.name, MESSAGE_CONTRACT);

        let err = registry.post_message(&validate_message("gm ☀").unwrap()).unwrap_err();
        assert!(matches!(err, InteractsError::Codec(_)));
    }

    #[test]
    fn test_register_username_uses_lowercased_name() {
        let request =
            ContractRegistry::default().register_username(&validate_name("My-Name").unwrap()).unwrap();
        assert_eq!(request.function_name, FN_REGISTER_USERNAME);
        assert_eq!(request.function_args, vec![codec::string_ascii("my-name").unwrap()]);
    }

    #[test]
    fn test_release_username_targets_given_name() {
        let request = ContractRegistry::default().release_username("bob").unwrap();
        assert_eq!(request.function_name, FN_RELEASE_USERNAME);
        assert_eq!(request.function_args, vec![codec::string_ascii("bob").unwrap()]);
    }

    #[test]
    fn test_send_stx_encodes_recipient_as_utf8() {
        let recipient = validate_address_checked(RECIPIENT).unwrap();
        let request = ContractRegistry::default().send_stx(&recipient, parse_amount("1.5").unwrap());
        assert_eq!(
            request.function_args,
            vec![codec::string_utf8(RECIPIENT), ClarityValue::UInt(1_500_000)]
        );
    }

    #[test]
    fn test_send_many_builds_list_of_tuples() {
        let validator = Validator::new(AddressPolicy::C32Check, DedupPolicy::KeepAll);
        let recipients = validator
            .address_list(&format!("{RECIPIENT}, ST000000000000000000002AMW42H"))
            .unwrap();
        let request = ContractRegistry::default()
            .send_many_stx(&recipients, parse_amount("2").unwrap())
            .unwrap();
        let entries = list_items(&request.function_args[0]);
        assert_eq!(entries.len(), 2);
        let expected = codec::tuple([
            ("to", codec::principal(RECIPIENT).unwrap()),
            ("ustx", codec::uint(2_000_000u32)),
        ])
        .unwrap();
        assert_eq!(entries[0], expected);
    }

    #[test]
    fn test_send_many_with_default_validator() {
        let recipients = Validator::default().address_list(RECIPIENT).unwrap();
        let request = ContractRegistry::default()
            .send_many_stx(&recipients, parse_amount("1").unwrap())
            .unwrap();
        assert_eq!(request.function_name, FN_SEND_MANY_STX);
        assert_eq!(list_items(&request.function_args[0]).len(), 1);
    }

    #[test]
    fn test_send_many_requires_real_principals() {
        let recipients =
            Validator::default().address_list("SPAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA").unwrap();
        let err = ContractRegistry::default()
            .send_many_stx(&recipients, parse_amount("1").unwrap())
            .unwrap_err();
        assert!(matches!(err, InteractsError::Codec(_)));
    }

    #[test]
    fn test_create_poll_has_fixed_arity() {
        let draft = PollDraft {
            title: "Lunch".into(),
            description: "".into(),
            options: vec!["pizza".into(), "tacos".into(), "ramen".into()],
            duration_blocks: "20".into(),
            votes_per_user: "2".into(),
            requires_stake: true,
            min_stake_amount: "0.5".into(),
        };
        let request = ContractRegistry::default().create_poll(&validate_poll_draft(&draft).unwrap());
        assert_eq!(request.function_args.len(), 2 + MAX_POLL_OPTIONS + 4);
        assert_eq!(request.function_args[2], codec::string_utf8("pizza"));
        assert_eq!(request.function_args[4], codec::some(codec::string_utf8("ramen")));
        assert_eq!(request.function_args[5], codec::none());
        assert_eq!(request.function_args[12], ClarityValue::UInt(20));
        assert_eq!(request.function_args[14], ClarityValue::Bool(true));
        assert_eq!(request.function_args[15], ClarityValue::UInt(500_000));
    }

    #[test]
    fn test_request_for_payloads() {
        let registry = ContractRegistry::default();
        let vote = ValidatedPayload::Vote(validate_vote("4", "1").unwrap());
        let request = registry.request_for(&vote).unwrap();
        assert_eq!(request.function_name, FN_VOTE);
        assert_eq!(request.function_args, vec![ClarityValue::UInt(4), ClarityValue::UInt(1)]);

        let amount = ValidatedPayload::Amount(parse_amount("1").unwrap());
        assert!(registry.request_for(&amount).is_err());

        let name = ValidatedPayload::Name(validate_name("alice").unwrap());
        assert!(registry.request_for(&name).is_err());
    }
}
