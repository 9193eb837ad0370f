use std::fmt;

use crate::constants::{MAX_MESSAGE_LENGTH, MAX_POLL_OPTIONS, MAX_RECIPIENTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionKind {
    Empty,
    TooShort,
    BadFormat,
    OutOfRange,
    TooFewOptions,
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionKind::Empty => write!(f, "empty"),
            RejectionKind::TooShort => write!(f, "too-short"),
            RejectionKind::BadFormat => write!(f, "bad-format"),
            RejectionKind::OutOfRange => write!(f, "out-of-range"),
            RejectionKind::TooFewOptions => write!(f, "too-few-options"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormField {
    Name,
    Message,
    Address,
    Amount,
    AddressList,
    PollTitle,
    PollOptions,
    PollDuration,
    PollVotesPerUser,
    PollMinStake,
    PollId,
    VoteOption,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FormField::Name => "name",
            FormField::Message => "message",
            FormField::Address => "address",
            FormField::Amount => "amount",
            FormField::AddressList => "addresses",
            FormField::PollTitle => "title",
            FormField::PollOptions => "options",
            FormField::PollDuration => "duration",
            FormField::PollVotesPerUser => "votes-per-user",
            FormField::PollMinStake => "min-stake",
            FormField::PollId => "poll-id",
            FormField::VoteOption => "option",
        };
        write!(f, "{}", label)
    }
}

/// A structured refusal of user input. Callers branch on `kind` and `field`;
/// `reason()` is only meant for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub field: FormField,
    pub kind: RejectionKind,
}

impl Rejection {
    pub fn new(field: FormField, kind: RejectionKind) -> Self {
        Rejection { field, kind }
    }

    pub fn reason(&self) -> String {
        use FormField as F;
        use RejectionKind as K;
        match (self.field, self.kind) {
            (F::Name, K::Empty) => "Enter a name!".into(),
            (F::Name, _) => {
                "Name must be at least 3 characters and only use letters, numbers, or hyphens."
                    .into()
            }
            (F::Message, K::Empty) => "Enter a message!".into(),
            (F::Message, _) => format!("Message must be at most {MAX_MESSAGE_LENGTH} characters."),
            (F::Address, K::Empty) => "Enter a Stacks address!".into(),
            (F::Address, _) => "Invalid Stacks address!".into(),
            (F::Amount, _) => "Enter a valid amount!".into(),
            (F::AddressList, K::Empty) => "Enter a valid Stacks address!".into(),
            (F::AddressList, K::OutOfRange) => {
                format!("Too many recipients (at most {MAX_RECIPIENTS} per transaction).")
            }
            (F::AddressList, _) => "Invalid Stacks address in recipient list!".into(),
            (F::PollTitle, _) => "Enter a poll title!".into(),
            (F::PollOptions, K::OutOfRange) => format!("A poll accepts at most {MAX_POLL_OPTIONS} options."),
            (F::PollOptions, _) => "Enter at least 2 options!".into(),
            (F::PollDuration, K::BadFormat) => "Duration must be a number of blocks.".into(),
            (F::PollDuration, _) => "Duration must be at least 10 blocks.".into(),
            (F::PollVotesPerUser, K::BadFormat) => "Votes per user must be a number.".into(),
            (F::PollVotesPerUser, _) => "Votes per user must be at least 1.".into(),
            (F::PollMinStake, K::Empty) => "Enter a minimum stake amount!".into(),
            (F::PollMinStake, _) => "Minimum stake must be a non-negative amount.".into(),
            (F::PollId, _) => "Enter a valid poll id!".into(),
            (F::VoteOption, _) => format!("Option must be between 0 and {}.", MAX_POLL_OPTIONS - 1),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason())
    }
}

impl std::error::Error for Rejection {}

/// Raw poll form, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollDraft {
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    pub duration_blocks: String,
    pub votes_per_user: String,
    pub requires_stake: bool,
    pub min_stake_amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormInput {
    Name(String),
    Message(String),
    Address(String),
    Amount(String),
    AddressList(String),
    PollDraft(PollDraft),
    Vote { poll_id: String, option_index: String },
}

/// Lowercased, format-checked username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Username(pub(super) String);

impl Username {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message(pub(super) String);

impl Message {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StacksAddress(pub(super) String);

impl StacksAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StacksAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An amount in base units (1 STX = 1_000_000 micro-STX).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MicroStx(pub(super) u128);

impl MicroStx {
    pub fn value(&self) -> u128 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipients(pub(super) Vec<StacksAddress>);

impl Recipients {
    pub fn addresses(&self) -> &[StacksAddress] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Fixed-arity `create-poll` arguments. Options are compacted to the front,
/// unset slots are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollArgs {
    pub(super) title: String,
    pub(super) description: String,
    pub(super) options: [Option<String>; MAX_POLL_OPTIONS],
    pub(super) duration_blocks: u64,
    pub(super) votes_per_user: u64,
    pub(super) requires_stake: bool,
    pub(super) min_stake: MicroStx,
}

impl PollArgs {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn options(&self) -> &[Option<String>; MAX_POLL_OPTIONS] {
        &self.options
    }

    pub fn duration_blocks(&self) -> u64 {
        self.duration_blocks
    }

    pub fn votes_per_user(&self) -> u64 {
        self.votes_per_user
    }

    pub fn requires_stake(&self) -> bool {
        self.requires_stake
    }

    pub fn min_stake(&self) -> MicroStx {
        self.min_stake
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteArgs {
    pub(super) poll_id: u64,
    pub(super) option_index: u8,
}

impl VoteArgs {
    pub fn poll_id(&self) -> u64 {
        self.poll_id
    }

    pub fn option_index(&self) -> u8 {
        self.option_index
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum ValidatedPayload {
    Name(Username),
    Message(Message),
    Address(StacksAddress),
    Amount(MicroStx),
    AddressList(Recipients),
    Poll(PollArgs),
    Vote(VoteArgs),
}
