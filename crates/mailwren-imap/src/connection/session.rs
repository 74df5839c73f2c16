//! High-level IMAP session with lazy connection establishment.
//!
//! `Session` wraps the type-state [`Client`] behind an explicit state
//! machine so callers never juggle the state transitions themselves:
//! every operation runs an ensure-ready guard that connects and
//! authenticates on first use.
//!
//! ```text
//! Disconnected ── dial ──→ Connected ── authenticate ──→ Authenticated
//!       ↑                                  │                   │
//!       └───────── auth failure ───────────┘               select()
//!                                                              ↓
//!                                                          Selected
//! ```
//!
//! Authentication failures drop the connection and return the session to
//! `Disconnected`; the session never retries on its own; retry and
//! backoff policy belong to the caller. [`Session::close`] logs out
//! best-effort and swallows logout errors.

use mailwren_oauth::sasl::encode_initial_response;
use mailwren_oauth::{Introspector, Preflight, TokenBundle};
use tokio::io::{AsyncRead, AsyncWrite};

use super::client::{Authenticated, Client, NotAuthenticated, Selected};
use super::stream::{IMAP_TLS_PORT, ImapStream, connect_tls};
use crate::command::{FetchAttribute, SearchCriteria, StoreAction};
use crate::parser::FetchItem;
use crate::types::{ListResponse, Mailbox, MailboxStatus, SeqNum, Uid, UidSet};
use crate::{Error, Result};

/// Authentication material for a session.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// OAuth bearer token for an XOAUTH2 exchange.
    XOAuth2(TokenBundle),
    /// Plain password for LOGIN.
    Password(String),
}

/// Configuration for an IMAP session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server hostname.
    pub host: String,
    /// Server port (default: 993, implicit TLS).
    pub port: u16,
    /// Account email address; used as the LOGIN username and the XOAUTH2
    /// identity. Surrounding whitespace is stripped before use.
    pub email: String,
    /// Authentication material. `None` makes every operation fail with
    /// "no authentication method provided".
    pub credentials: Option<Credentials>,
    /// Optional token-introspection preflight for the OAuth path.
    pub introspector: Option<Introspector>,
}

impl SessionConfig {
    /// Creates a configuration for the given host and account email.
    #[must_use]
    pub fn new(host: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: IMAP_TLS_PORT,
            email: email.into(),
            credentials: None,
            introspector: None,
        }
    }

    /// Overrides the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Authenticates with an OAuth token bundle (XOAUTH2).
    #[must_use]
    pub fn token(mut self, bundle: TokenBundle) -> Self {
        self.credentials = Some(Credentials::XOAuth2(bundle));
        self
    }

    /// Authenticates with a password (LOGIN).
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::Password(password.into()));
        self
    }

    /// Enables the introspection preflight for the OAuth path.
    #[must_use]
    pub fn introspector(mut self, introspector: Introspector) -> Self {
        self.introspector = Some(introspector);
        self
    }
}

/// Transport that knows how to establish itself from a session config.
///
/// Production sessions use [`ImapStream`] (implicit TLS). Tests substitute
/// scripted streams.
#[allow(async_fn_in_trait)]
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Sized {
    /// Dials the server described by the config.
    async fn connect(config: &SessionConfig) -> Result<Self>;
}

impl Transport for ImapStream {
    async fn connect(config: &SessionConfig) -> Result<Self> {
        connect_tls(&config.host, config.port).await
    }
}

/// Current state of the session.
enum SessionState<S> {
    /// No connection.
    Disconnected,
    /// Greeting read, not yet authenticated.
    Connected(Client<S, NotAuthenticated>),
    /// Authenticated, no mailbox selected.
    Authenticated(Client<S, Authenticated>),
    /// Mailbox selected.
    Selected(Client<S, Selected>),
}

/// High-level IMAP session.
///
/// Owns exactly one connection and is not safe for concurrent use without
/// external serialization; all operations take `&mut self` and run
/// sequentially over the single link.
pub struct Session<S = ImapStream> {
    config: SessionConfig,
    state: SessionState<S>,
}

impl<S: Transport> Session<S> {
    /// Creates a disconnected session. No I/O happens until the first
    /// operation (or an explicit [`Session::connect`]).
    #[must_use]
    pub const fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Disconnected,
        }
    }

    /// Creates a session over an already-established stream.
    ///
    /// Reads the greeting; authentication still happens lazily.
    ///
    /// # Errors
    ///
    /// Returns an error if the greeting cannot be read or is a BYE.
    pub async fn from_stream(config: SessionConfig, stream: S) -> Result<Self> {
        let client = Client::from_stream(stream).await?;
        Ok(Self {
            config,
            state: SessionState::Connected(client),
        })
    }

    /// Returns true if the session holds an authenticated connection.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(
            self.state,
            SessionState::Authenticated(_) | SessionState::Selected(_)
        )
    }

    /// Returns the currently selected mailbox, if any.
    #[must_use]
    pub fn selected_mailbox(&self) -> Option<&str> {
        match &self.state {
            SessionState::Selected(client) => Some(client.mailbox()),
            _ => None,
        }
    }

    /// Connects and authenticates. No-op when already authenticated.
    ///
    /// # Errors
    ///
    /// Credential problems (missing, empty, expired token) fail with an
    /// authentication error before any network traffic; dial failures are
    /// connection-level errors; a rejected exchange carries the server's
    /// challenge diagnostics.
    pub async fn connect(&mut self) -> Result<()> {
        match &self.state {
            SessionState::Authenticated(_) | SessionState::Selected(_) => Ok(()),
            SessionState::Connected(_) => self.do_authenticate().await,
            SessionState::Disconnected => {
                // Refuse unusable credentials before dialing.
                self.validate_credentials()?;

                let stream = S::connect(&self.config).await?;
                let client = Client::from_stream(stream).await?;
                self.state = SessionState::Connected(client);

                self.do_authenticate().await
            }
        }
    }

    /// Lists all folders on the server.
    ///
    /// Unparseable entries are skipped; the command's own failure is an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns connection or authentication errors from the implicit
    /// connect, or the LIST command's failure.
    pub async fn list_folders(&mut self) -> Result<Vec<ListResponse>> {
        self.connect().await?;

        match &mut self.state {
            SessionState::Authenticated(client) => client.list("", "*").await,
            SessionState::Selected(client) => client.list("", "*").await,
            _ => Err(Error::InvalidState("not authenticated".into())),
        }
    }

    /// Selects a mailbox, connecting first if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the mailbox cannot be selected; the connection
    /// is considered lost in that case.
    pub async fn select(&mut self, mailbox: &Mailbox) -> Result<MailboxStatus> {
        self.connect().await?;

        // SELECT consumes the typed client; on failure the connection is
        // gone and the session drops back to Disconnected.
        match std::mem::replace(&mut self.state, SessionState::Disconnected) {
            SessionState::Authenticated(client) => {
                let (selected, status) = client.select(mailbox).await?;
                self.state = SessionState::Selected(selected);
                Ok(status)
            }
            SessionState::Selected(client) => {
                let (selected, status) = client.select(mailbox).await?;
                self.state = SessionState::Selected(selected);
                Ok(status)
            }
            other => {
                self.state = other;
                Err(Error::InvalidState("not authenticated".into()))
            }
        }
    }

    /// Runs UID SEARCH in the selected mailbox.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when no mailbox is selected.
    pub async fn uid_search(&mut self, criteria: SearchCriteria) -> Result<Vec<Uid>> {
        match &mut self.state {
            SessionState::Selected(client) => client.uid_search(criteria).await,
            _ => Err(Error::InvalidState("no mailbox selected".into())),
        }
    }

    /// Runs UID FETCH in the selected mailbox.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when no mailbox is selected.
    pub async fn uid_fetch(
        &mut self,
        uid_set: &UidSet,
        items: Vec<FetchAttribute>,
    ) -> Result<Vec<(SeqNum, Vec<FetchItem>)>> {
        match &mut self.state {
            SessionState::Selected(client) => client.uid_fetch(uid_set, items).await,
            _ => Err(Error::InvalidState("no mailbox selected".into())),
        }
    }

    /// Runs UID STORE in the selected mailbox.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when no mailbox is selected.
    pub async fn uid_store(&mut self, uid_set: &UidSet, action: StoreAction) -> Result<()> {
        match &mut self.state {
            SessionState::Selected(client) => client.uid_store(uid_set, action).await,
            _ => Err(Error::InvalidState("no mailbox selected".into())),
        }
    }

    /// Runs UID COPY from the selected mailbox.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when no mailbox is selected.
    pub async fn uid_copy(&mut self, uid_set: &UidSet, mailbox: &Mailbox) -> Result<()> {
        match &mut self.state {
            SessionState::Selected(client) => client.uid_copy(uid_set, mailbox).await,
            _ => Err(Error::InvalidState("no mailbox selected".into())),
        }
    }

    /// Expunges messages marked `\Deleted` in the selected mailbox.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when no mailbox is selected.
    pub async fn expunge(&mut self) -> Result<Vec<SeqNum>> {
        match &mut self.state {
            SessionState::Selected(client) => client.expunge().await,
            _ => Err(Error::InvalidState("no mailbox selected".into())),
        }
    }

    /// Closes the session: best-effort LOGOUT, then Disconnected.
    ///
    /// Logout failures are swallowed; the connection is being torn down
    /// either way.
    pub async fn close(&mut self) {
        let result = match std::mem::replace(&mut self.state, SessionState::Disconnected) {
            SessionState::Disconnected => Ok(()),
            SessionState::Connected(client) => client.logout().await,
            SessionState::Authenticated(client) => client.logout().await,
            SessionState::Selected(client) => client.logout().await,
        };

        if let Err(e) = result {
            tracing::debug!(error = %e, "logout failed during close");
        }
    }

    // === Private helpers ===

    /// Rejects credentials that cannot possibly authenticate, before any
    /// network traffic.
    fn validate_credentials(&self) -> Result<()> {
        match &self.config.credentials {
            None => Err(Error::Auth(
                "no authentication method provided: supply a token bundle (OAuth) \
                 or a password"
                    .into(),
            )),
            Some(Credentials::XOAuth2(bundle)) => {
                bundle.ensure_usable()?;
                Ok(())
            }
            Some(Credentials::Password(_)) => Ok(()),
        }
    }

    /// Runs the authentication branch for the configured credentials.
    ///
    /// On failure the connection is dropped and the session returns to
    /// `Disconnected`.
    async fn do_authenticate(&mut self) -> Result<()> {
        let SessionState::Connected(client) =
            std::mem::replace(&mut self.state, SessionState::Disconnected)
        else {
            return Err(Error::InvalidState("not connected".into()));
        };

        let email = self.config.email.trim().to_string();

        let authenticated = match &self.config.credentials {
            None => {
                return Err(Error::Auth(
                    "no authentication method provided: supply a token bundle (OAuth) \
                     or a password"
                        .into(),
                ));
            }
            Some(Credentials::XOAuth2(bundle)) => {
                let sasl_email = match self.preflight(bundle).await? {
                    Some(token_email) if !token_email.eq_ignore_ascii_case(&email) => {
                        // Servers validate the SASL identity against the
                        // token, so the token's own email claim wins.
                        tracing::warn!(
                            account_email = %email,
                            token_email = %token_email,
                            "token issued to a different email; using the token's identity"
                        );
                        token_email
                    }
                    _ => email,
                };

                if !client.capabilities().is_empty() && !client.supports_auth("XOAUTH2") {
                    tracing::debug!("server does not advertise AUTH=XOAUTH2; attempting anyway");
                }

                let payload = bundle.xoauth2_payload(&sasl_email)?;
                let initial = encode_initial_response(&payload);
                client.authenticate_xoauth2(&initial).await?
            }
            Some(Credentials::Password(password)) => {
                if client.login_disabled() {
                    return Err(Error::Auth(
                        "server disables LOGIN on this connection".into(),
                    ));
                }
                client.login(&email, password).await?
            }
        };

        self.state = SessionState::Authenticated(authenticated);
        Ok(())
    }

    /// Runs the optional introspection preflight.
    ///
    /// Returns the token-owner email when the endpoint reported one. An
    /// explicit negative answer aborts authentication; an unreachable
    /// endpoint is logged and ignored.
    async fn preflight(&self, bundle: &TokenBundle) -> Result<Option<String>> {
        let Some(introspector) = &self.config.introspector else {
            return Ok(None);
        };

        match introspector.check(&bundle.access_token).await {
            Preflight::Valid(info) => {
                tracing::debug!(
                    scopes = ?info.scopes,
                    expires_in = info.expires_in,
                    "token introspection passed"
                );
                Ok(info.email)
            }
            Preflight::Invalid(reason) => Err(Error::Auth(format!(
                "token rejected by introspection: {reason}"
            ))),
            Preflight::Unreachable => {
                tracing::warn!("token introspection unreachable; proceeding with authentication");
                Ok(None)
            }
        }
    }
}

impl<S> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            SessionState::Disconnected => "disconnected",
            SessionState::Connected(_) => "connected",
            SessionState::Authenticated(_) => "authenticated",
            SessionState::Selected(_) => "selected",
        };
        f.debug_struct("Session")
            .field("host", &self.config.host)
            .field("email", &self.config.email)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}
