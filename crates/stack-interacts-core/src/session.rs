use crate::errors::InteractsError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub address: String,
}

/// The wallet connection, as seen by the application.
pub trait WalletSessionProvider {
    fn is_signed_in(&self) -> bool;
    fn load_user_data(&self) -> Option<UserData>;
    fn sign_out(&mut self);
}

/// Who is signed in. Starts signed out, is replaced on sign-in and cleared on
/// sign-out; everything else only reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user: Option<UserData>,
}

impl SessionContext {
    pub fn signed_out() -> Self {
        SessionContext { user: None }
    }

    pub fn from_provider(provider: &dyn WalletSessionProvider) -> Self {
        if !provider.is_signed_in() {
            return SessionContext::signed_out();
        }
        SessionContext { user: provider.load_user_data() }
    }

    pub fn sign_in(&mut self, user: UserData) {
        self.user = Some(user);
    }

    pub fn sign_out(&mut self, provider: &mut dyn WalletSessionProvider) {
        provider.sign_out();
        self.user = None;
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&UserData> {
        self.user.as_ref()
    }

    pub fn address(&self) -> Result<&str, InteractsError> {
        self.user.as_ref().map(|user| user.address.as_str()).ok_or(InteractsError::NotSignedIn)
    }
}

/// A session backed by a fixed address, e.g. one given on the command line.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user: Option<UserData>,
}

impl StaticSession {
    pub fn new(address: Option<String>) -> Self {
        StaticSession { user: address.map(|address| UserData { address }) }
    }
}

impl WalletSessionProvider for StaticSession {
    fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    fn load_user_data(&self) -> Option<UserData> {
        self.user.clone()
    }

    fn sign_out(&mut self) {
        self.user = None;
    }
}
