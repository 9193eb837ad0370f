mod types;

use crate::codec::is_canonical_c32_address;
use crate::constants::{
    MAX_MESSAGE_LENGTH, MAX_POLL_OPTIONS, MAX_RECIPIENTS, MICRO_STX_DECIMALS, MIN_NAME_LENGTH,
    MIN_POLL_DURATION_BLOCKS, MIN_POLL_OPTIONS, MIN_VOTES_PER_USER,
};

pub use types::{
    FormField, FormInput, Message, MicroStx, PollArgs, PollDraft, Recipients, Rejection,
    RejectionKind, StacksAddress, Username, ValidatedPayload, VoteArgs,
};

const ADDRESS_PATTERN_SUFFIX_LENGTH: usize = 38;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressPolicy {
    /// `S` followed by exactly 38 characters in `[0-9A-Z]`.
    #[default]
    Pattern,
    /// The pattern, or any standard principal spelled in canonical c32check form.
    C32Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupPolicy {
    #[default]
    KeepAll,
    FirstOccurrence,
}

/// Turns raw form strings into chain-ready payloads. Never performs I/O and
/// never panics: every refusal comes back as a [`Rejection`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    pub address_policy: AddressPolicy,
    pub dedup_policy: DedupPolicy,
}

impl Validator {
    pub fn new(address_policy: AddressPolicy, dedup_policy: DedupPolicy) -> Self {
        Validator { address_policy, dedup_policy }
    }

    pub fn validate(&self, input: &FormInput) -> Result<ValidatedPayload, Rejection> {
        let payload = match input {
            FormInput::Name(value) => ValidatedPayload::Name(validate_name(value)?),
            FormInput::Message(value) => ValidatedPayload::Message(validate_message(value)?),
            FormInput::Address(value) => ValidatedPayload::Address(self.address(value)?),
            FormInput::Amount(value) => ValidatedPayload::Amount(parse_amount(value)?),
            FormInput::AddressList(value) => {
                ValidatedPayload::AddressList(self.address_list(value)?)
            }
            FormInput::PollDraft(draft) => ValidatedPayload::Poll(validate_poll_draft(draft)?),
            FormInput::Vote { poll_id, option_index } => {
                ValidatedPayload::Vote(validate_vote(poll_id, option_index)?)
            }
        };
        Ok(payload)
    }

    pub fn address(&self, input: &str) -> Result<StacksAddress, Rejection> {
        match self.address_policy {
            AddressPolicy::Pattern => validate_address(input),
            AddressPolicy::C32Check => validate_address_checked(input),
        }
    }

    pub fn address_list(&self, input: &str) -> Result<Recipients, Rejection> {
        let tokens = split_address_list(input);
        if tokens.is_empty() {
            return Err(Rejection::new(FormField::AddressList, RejectionKind::Empty));
        }

        let mut addresses: Vec<StacksAddress> = vec![];
        for token in tokens {
            // Pattern policy leaves recipients to the principal encoder.
            let address = match self.address_policy {
                AddressPolicy::Pattern => StacksAddress(token.to_string()),
                AddressPolicy::C32Check => validate_address_checked(token)
                    .map_err(|e| Rejection::new(FormField::AddressList, e.kind))?,
            };
            if self.dedup_policy == DedupPolicy::FirstOccurrence && addresses.contains(&address) {
                continue;
            }
            addresses.push(address);
        }

        if addresses.len() > MAX_RECIPIENTS {
            return Err(Rejection::new(FormField::AddressList, RejectionKind::OutOfRange));
        }
        Ok(Recipients(addresses))
    }
}

pub fn validate_name(input: &str) -> Result<Username, Rejection> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Rejection::new(FormField::Name, RejectionKind::Empty));
    }
    if trimmed.chars().count() < MIN_NAME_LENGTH {
        return Err(Rejection::new(FormField::Name, RejectionKind::TooShort));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(Rejection::new(FormField::Name, RejectionKind::BadFormat));
    }
    Ok(Username(trimmed.to_lowercase()))
}

pub fn validate_message(input: &str) -> Result<Message, Rejection> {
    if input.trim().is_empty() {
        return Err(Rejection::new(FormField::Message, RejectionKind::Empty));
    }
    if input.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(Rejection::new(FormField::Message, RejectionKind::OutOfRange));
    }
    Ok(Message(input.to_string()))
}

fn matches_address_pattern(input: &str) -> bool {
    let mut chars = input.chars();
    chars.next() == Some('S')
        && input.len() == ADDRESS_PATTERN_SUFFIX_LENGTH + 1
        && chars.all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
}

pub fn validate_address(input: &str) -> Result<StacksAddress, Rejection> {
    if input.trim().is_empty() {
        return Err(Rejection::new(FormField::Address, RejectionKind::Empty));
    }
    if !matches_address_pattern(input) {
        return Err(Rejection::new(FormField::Address, RejectionKind::BadFormat));
    }
    Ok(StacksAddress(input.to_string()))
}

/// Like [`validate_address`], but also accepts any standard principal in
/// canonical c32check form, which covers the 40 and 41 character addresses
/// wallets hand out. Lowercase or `O`/`I`/`L` spellings are rejected.
pub fn validate_address_checked(input: &str) -> Result<StacksAddress, Rejection> {
    if input.trim().is_empty() {
        return Err(Rejection::new(FormField::Address, RejectionKind::Empty));
    }
    if matches_address_pattern(input) || is_canonical_c32_address(input) {
        return Ok(StacksAddress(input.to_string()));
    }
    Err(Rejection::new(FormField::Address, RejectionKind::BadFormat))
}

pub fn split_address_list(input: &str) -> Vec<&str> {
    input
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .map(|token| token.trim())
        .filter(|token| !token.is_empty())
        .collect()
}

struct Decimal<'a> {
    negative: bool,
    integer: &'a str,
    fraction: &'a str,
}

impl<'a> Decimal<'a> {
    fn parse(input: &'a str) -> Option<Decimal<'a>> {
        let (negative, unsigned) = match input.as_bytes().first() {
            Some(b'-') => (true, &input[1..]),
            Some(b'+') => (false, &input[1..]),
            _ => (false, input),
        };
        let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if integer.is_empty() && fraction.is_empty() {
            return None;
        }
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(integer) || !all_digits(fraction) {
            return None;
        }
        Some(Decimal { negative, integer, fraction })
    }

    fn is_zero(&self) -> bool {
        self.integer.bytes().chain(self.fraction.bytes()).all(|b| b == b'0')
    }

    /// Scales by 10^6 and rounds half up on the seventh fractional digit.
    fn to_base_units(&self) -> Option<u128> {
        let scale = MICRO_STX_DECIMALS as usize;
        let mut units: u128 = 0;
        for digit in self.integer.bytes() {
            units = units.checked_mul(10)?.checked_add((digit - b'0') as u128)?;
        }
        let fraction = self.fraction.as_bytes();
        for index in 0..scale {
            let digit = fraction.get(index).map(|b| b - b'0').unwrap_or(0);
            units = units.checked_mul(10)?.checked_add(digit as u128)?;
        }
        if fraction.get(scale).map(|b| *b >= b'5').unwrap_or(false) {
            units = units.checked_add(1)?;
        }
        Some(units)
    }
}

fn parse_base_units(
    input: &str,
    field: FormField,
    allow_zero: bool,
) -> Result<MicroStx, Rejection> {
    let value = input.trim();
    if value.is_empty() {
        return Err(Rejection::new(field, RejectionKind::Empty));
    }
    let decimal =
        Decimal::parse(value).ok_or(Rejection::new(field, RejectionKind::BadFormat))?;
    if decimal.is_zero() {
        return if allow_zero {
            Ok(MicroStx(0))
        } else {
            Err(Rejection::new(field, RejectionKind::OutOfRange))
        };
    }
    if decimal.negative {
        return Err(Rejection::new(field, RejectionKind::OutOfRange));
    }
    let units =
        decimal.to_base_units().ok_or(Rejection::new(field, RejectionKind::OutOfRange))?;
    if units == 0 && !allow_zero {
        return Err(Rejection::new(field, RejectionKind::OutOfRange));
    }
    Ok(MicroStx(units))
}

/// Parses a decimal STX amount into micro-STX, `round(d * 1_000_000)` with
/// halves rounded up.
pub fn parse_amount(input: &str) -> Result<MicroStx, Rejection> {
    parse_base_units(input, FormField::Amount, false)
}

fn parse_bounded_integer(
    input: &str,
    field: FormField,
    min: u64,
    max: u64,
) -> Result<u64, Rejection> {
    let value = input.trim();
    if value.is_empty() {
        return Err(Rejection::new(field, RejectionKind::Empty));
    }
    let parsed = value.parse::<i128>().map_err(|_| Rejection::new(field, RejectionKind::BadFormat))?;
    if parsed < min as i128 || parsed > max as i128 {
        return Err(Rejection::new(field, RejectionKind::OutOfRange));
    }
    Ok(parsed as u64)
}

pub fn validate_poll_draft(draft: &PollDraft) -> Result<PollArgs, Rejection> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(Rejection::new(FormField::PollTitle, RejectionKind::Empty));
    }

    if draft.options.len() > MAX_POLL_OPTIONS {
        return Err(Rejection::new(FormField::PollOptions, RejectionKind::OutOfRange));
    }
    let filled = draft
        .options
        .iter()
        .map(|option| option.trim())
        .filter(|option| !option.is_empty())
        .collect::<Vec<_>>();
    if filled.len() < MIN_POLL_OPTIONS {
        return Err(Rejection::new(FormField::PollOptions, RejectionKind::TooFewOptions));
    }
    let mut options: [Option<String>; MAX_POLL_OPTIONS] = Default::default();
    for (slot, option) in options.iter_mut().zip(filled) {
        *slot = Some(option.to_string());
    }

    let duration_blocks = parse_bounded_integer(
        &draft.duration_blocks,
        FormField::PollDuration,
        MIN_POLL_DURATION_BLOCKS,
        u64::MAX,
    )?;
    let votes_per_user = parse_bounded_integer(
        &draft.votes_per_user,
        FormField::PollVotesPerUser,
        MIN_VOTES_PER_USER,
        u64::MAX,
    )?;

    let min_stake = if draft.requires_stake {
        parse_base_units(&draft.min_stake_amount, FormField::PollMinStake, true)?
    } else {
        MicroStx(0)
    };

    Ok(PollArgs {
        title: title.to_string(),
        description: draft.description.trim().to_string(),
        options,
        duration_blocks,
        votes_per_user,
        requires_stake: draft.requires_stake,
        min_stake,
    })
}

pub fn validate_vote(poll_id: &str, option_index: &str) -> Result<VoteArgs, Rejection> {
    let poll_id = parse_bounded_integer(poll_id, FormField::PollId, 0, u64::MAX)?;
    let option_index = parse_bounded_integer(
        option_index,
        FormField::VoteOption,
        0,
        (MAX_POLL_OPTIONS - 1) as u64,
    )?;
    Ok(VoteArgs { poll_id, option_index: option_index as u8 })
}
