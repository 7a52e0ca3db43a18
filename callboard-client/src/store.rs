/// Current-user session store
///
/// The application-side counterpart of the server's sessions: one value
/// owning the API client, the persisted token and the signed-in state,
/// with an explicit lifecycle instead of globals.
///
/// State machine:
///
/// ```text
/// Anonymous --init(token present)--> Loading --fetch ok--> Authenticated
///     ^                                 |
///     |                                 +--fetch fails (stale token
///     +--logout / failed restore--------+   cleared)
/// ```
///
/// UIs gate rendering on [`SessionStore::is_loading`]: while a persisted
/// token is being resolved to a user, show a loading view; afterwards the
/// route tree can branch on [`SessionStore::is_authenticated`].

use crate::api::{ApiClient, ClientError, UserProfile};

/// Where the session token is persisted between runs
///
/// Injectable so a desktop shell can keep it in the keychain, a test in
/// memory, a web shell in browser storage.
pub trait TokenStore {
    /// Loads the persisted token, if any
    fn load(&self) -> Option<String>;

    /// Persists a token
    fn save(&mut self, token: &str);

    /// Forgets the persisted token
    fn clear(&mut self);
}

/// In-memory token store
///
/// The default for tests and short-lived tools; nothing survives the
/// process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Option<String>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.clone()
    }

    fn save(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    fn clear(&mut self) {
        self.token = None;
    }
}

/// Signed-in state of the application
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No session; show login/registration
    Anonymous,

    /// A persisted token is being resolved to a user; show a loading view
    Loading,

    /// Signed in
    Authenticated(UserProfile),
}

/// The session store owning client, token persistence and state
pub struct SessionStore<S: TokenStore> {
    api: ApiClient,
    tokens: S,
    state: SessionState,
}

impl<S: TokenStore> SessionStore<S> {
    /// Creates a store in the `Anonymous` state
    pub fn new(api: ApiClient, tokens: S) -> Self {
        Self {
            api,
            tokens,
            state: SessionState::Anonymous,
        }
    }

    /// Restores a persisted login, if any
    ///
    /// With a stored token and no loaded user, enters `Loading` and fetches
    /// the current user; on success the store is `Authenticated`, on
    /// failure the stale token is cleared and the store returns to
    /// `Anonymous`. Without a stored token this is a no-op.
    pub async fn init(&mut self) {
        let token = match self.tokens.load() {
            Some(token) => token,
            None => return,
        };

        if matches!(self.state, SessionState::Authenticated(_)) {
            return;
        }

        self.state = SessionState::Loading;
        self.api.set_token(&token);

        match self.api.current_user().await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "Restored persisted session");
                self.state = SessionState::Authenticated(user);
            }
            Err(e) => {
                tracing::debug!("Persisted session invalid, clearing: {}", e);
                self.tokens.clear();
                self.api.clear_token();
                self.state = SessionState::Anonymous;
            }
        }
    }

    /// Logs in, persists the token and enters `Authenticated`
    ///
    /// # Errors
    ///
    /// Propagates the API rejection; the store stays `Anonymous`
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ClientError> {
        let data = self.api.login(email, password).await?;

        self.tokens.save(&data.token);
        self.api.set_token(&data.token);
        self.state = SessionState::Authenticated(data.user);

        Ok(())
    }

    /// Logs out: revokes the session server-side, clears the persisted
    /// token and returns to `Anonymous`
    ///
    /// Local state is cleared even when the server call fails - the user
    /// asked to be signed out, and the token is gone either way.
    pub async fn logout(&mut self) {
        if self.api.token().is_some() {
            if let Err(e) = self.api.logout().await {
                tracing::warn!("Server-side logout failed: {}", e);
            }
        }

        self.tokens.clear();
        self.api.clear_token();
        self.state = SessionState::Anonymous;
    }

    /// The current state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Whether a persisted token is still being resolved
    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Loading)
    }

    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    /// The signed-in user, if any
    pub fn current_user(&self) -> Option<&UserProfile> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// The API client, for calls beyond the session lifecycle
    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}
