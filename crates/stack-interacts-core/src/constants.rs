// Deployed contracts
pub const DEFAULT_DEPLOYER: &str = "SP2Z3M34KEKC79TMRMZB24YG30FE25JPN83TPZSZ2";
pub const GREETING_CONTRACT: &str = "gm-unlimited-003";
pub const MESSAGE_CONTRACT: &str = "postMessage-cl4";
pub const MESSAGE_STATS_CONTRACT: &str = "postMessage-003";
pub const VOTING_CONTRACT: &str = "voting-003";
pub const NAMING_CONTRACT: &str = "get-name-003";
pub const SENDING_CONTRACT: &str = "sending-003";
pub const MULTISENDING_CONTRACT: &str = "multisending-003";

// Public functions
pub const FN_SAY_GM: &str = "say-gm";
pub const FN_POST_MESSAGE: &str = "post-message";
pub const FN_CREATE_POLL: &str = "create-poll";
pub const FN_VOTE: &str = "vote";
pub const FN_REGISTER_USERNAME: &str = "register-username";
pub const FN_RELEASE_USERNAME: &str = "release-username";
pub const FN_SEND_STX: &str = "send-stx";
pub const FN_SEND_MANY_STX: &str = "send-many-stx";

// Read only functions
pub const FN_GET_USER_STATS: &str = "get-user-stats";
pub const FN_IS_USERNAME_AVAILABLE: &str = "is-username-available";
pub const FN_GET_ADDRESS_USERNAME: &str = "get-address-username";
pub const FN_GET_TOTAL_USERNAMES: &str = "get-total-usernames";
pub const FN_HAS_USERNAME: &str = "has-username";

/// Sender used for read-only calls that don't depend on the caller.
pub const DEFAULT_READ_ONLY_SENDER: &str = "ST000000000000000000002AMW42H";

// Input bounds
pub const MICRO_STX_DECIMALS: u32 = 6;
pub const MIN_NAME_LENGTH: usize = 3;
pub const MAX_MESSAGE_LENGTH: usize = 280;
pub const MAX_POLL_OPTIONS: usize = 10;
pub const MIN_POLL_OPTIONS: usize = 2;
pub const MIN_POLL_DURATION_BLOCKS: u64 = 10;
pub const MIN_VOTES_PER_USER: u64 = 1;
pub const MAX_RECIPIENTS: usize = 50;

pub const DEFAULT_CONFIG_FILE: &str = "Interacts.toml";

// Network defaults
pub const DEFAULT_MAINNET_API_URL: &str = "https://api.hiro.so";
pub const DEFAULT_TESTNET_API_URL: &str = "https://api.testnet.hiro.so";
pub const DEFAULT_DEVNET_API_URL: &str = "http://localhost:3999";
