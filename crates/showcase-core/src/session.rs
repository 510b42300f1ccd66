//! Credential and identity lifecycle
//!
//! The session is two entries in the key-value store: the opaque token and
//! the identity fetched with it. Both are present or the user is logged out.

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use crate::error::{Result, ShowcaseError};
use crate::models::{Credential, Identity};
use crate::store::{get_json, set_json, KeyValueStore, CALLBACK_ID_KEY, TOKEN_KEY, USER_KEY};
use crate::traits::{IdentityProvider, TokenExchange};

pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";

/// Scopes requested on every login
pub const BASE_SCOPES: [&str; 2] = ["user", "repo"];

/// Registration of the OAuth application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthApp {
    pub client_id: String,
    pub redirect_uri: String,
    pub authorize_url: String,
}

/// Where to send the user to grant access
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizeRequest {
    pub url: String,
    /// Anti-forgery state, also the callback id of the exchange
    pub state: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No credential stored
    LoggedOut,
    /// The provider accepted the credential
    Valid,
    /// The provider rejected the credential; the session was cleared
    Rejected,
    /// The provider could not be reached; the session was kept
    Unreachable,
}

pub struct SessionManager<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> SessionManager<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &'a dyn KeyValueStore {
        self.store
    }

    /// Start the redirect flow.
    ///
    /// Generates a callback id from the current time, remembers it for the
    /// callback, and returns the provider's authorize URL.
    pub fn login(
        &self,
        app: &OAuthApp,
        extra_scopes: &[String],
        now: DateTime<Utc>,
    ) -> Result<AuthorizeRequest> {
        let state = now.timestamp_millis().to_string();
        let url = authorize_url(app, extra_scopes, Some(&state))?;
        self.store.set(CALLBACK_ID_KEY, state.clone())?;

        tracing::info!(state = %state, "starting OAuth redirect flow");
        Ok(AuthorizeRequest { url, state })
    }

    /// Store a token obtained outside the redirect flow
    pub fn login_with_token(
        &self,
        provider: &dyn IdentityProvider,
        token: &str,
    ) -> Result<Identity> {
        let credential = Credential::new(token.trim());
        if credential.is_empty() {
            return Err(ShowcaseError::Authentication("empty token".to_string()));
        }

        match provider.fetch_identity(&credential) {
            Ok(identity) => {
                self.persist(&credential, &identity)?;
                Ok(identity)
            }
            Err(e) => {
                self.logout()?;
                Err(ShowcaseError::Authentication(format!(
                    "failed to fetch user data: {}",
                    e
                )))
            }
        }
    }

    /// Complete the redirect flow.
    ///
    /// The callback id is `state` when the provider echoed it, otherwise the
    /// one remembered by [`login`](Self::login). Any failure leaves the
    /// session logged out.
    pub fn handle_callback(
        &self,
        exchange: &dyn TokenExchange,
        provider: &dyn IdentityProvider,
        code: Option<&str>,
        state: Option<&str>,
    ) -> Result<Identity> {
        let result = self.exchange_and_store(exchange, provider, code, state);
        if let Err(e) = &result {
            tracing::error!(error = %e, "authentication failed");
            self.logout()?;
        }
        result
    }

    fn exchange_and_store(
        &self,
        exchange: &dyn TokenExchange,
        provider: &dyn IdentityProvider,
        code: Option<&str>,
        state: Option<&str>,
    ) -> Result<Identity> {
        let code = code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                ShowcaseError::Authentication("no code received from GitHub".to_string())
            })?;

        let callback_id = match state.filter(|s| !s.is_empty()) {
            Some(state) => state.to_string(),
            None => self.store.get(CALLBACK_ID_KEY)?.ok_or_else(|| {
                ShowcaseError::Authentication("no pending login to complete".to_string())
            })?,
        };

        let credential = exchange.exchange(code, &callback_id)?;
        let identity = provider.fetch_identity(&credential).map_err(|e| {
            ShowcaseError::Authentication(format!("failed to fetch user data: {}", e))
        })?;

        self.persist(&credential, &identity)?;
        self.store.remove(CALLBACK_ID_KEY)?;
        tracing::info!(login = %identity.login, "logged in");
        Ok(identity)
    }

    fn persist(&self, credential: &Credential, identity: &Identity) -> Result<()> {
        self.store.set(TOKEN_KEY, credential.expose().to_string())?;
        set_json(self.store, USER_KEY, identity)
    }

    /// Forget the credential and identity
    pub fn logout(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)
    }

    pub fn credential(&self) -> Result<Option<Credential>> {
        Ok(self
            .store
            .get(TOKEN_KEY)?
            .map(Credential::new)
            .filter(|c| !c.is_empty()))
    }

    pub fn identity(&self) -> Result<Option<Identity>> {
        get_json(self.store, USER_KEY)
    }

    /// The current session, or `NotAuthenticated`
    pub fn require(&self) -> Result<(Credential, Identity)> {
        match (self.credential()?, self.identity()?) {
            (Some(credential), Some(identity)) => Ok((credential, identity)),
            _ => Err(ShowcaseError::NotAuthenticated),
        }
    }

    /// Re-check the stored credential with the provider.
    ///
    /// A rejection logs the user out. A transport failure keeps the session.
    pub fn validate(&self, provider: &dyn IdentityProvider) -> Result<SessionStatus> {
        let Some(credential) = self.credential()? else {
            return Ok(SessionStatus::LoggedOut);
        };

        match provider.fetch_identity(&credential) {
            Ok(_) => Ok(SessionStatus::Valid),
            Err(e) if e.is_rejection() => {
                tracing::warn!(error = %e, "stored credential rejected, logging out");
                self.logout()?;
                Ok(SessionStatus::Rejected)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not validate stored credential");
                Ok(SessionStatus::Unreachable)
            }
        }
    }
}

/// Build the authorize URL with every component encoded
pub fn authorize_url(
    app: &OAuthApp,
    extra_scopes: &[String],
    state: Option<&str>,
) -> Result<String> {
    let mut scopes: Vec<&str> = BASE_SCOPES.to_vec();
    for scope in extra_scopes {
        let scope = scope.trim();
        if !scope.is_empty() && !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }
    let scope = scopes.join(",");

    let mut params = vec![
        ("client_id", app.client_id.as_str()),
        ("redirect_uri", app.redirect_uri.as_str()),
        ("scope", scope.as_str()),
    ];
    if let Some(state) = state {
        params.push(("state", state));
    }

    let url = Url::parse_with_params(&app.authorize_url, &params).map_err(|e| {
        ShowcaseError::InvalidInput(format!(
            "authorize URL '{}' is not valid: {}",
            app.authorize_url, e
        ))
    })?;
    Ok(url.into())
}

/// Extract `code` and `state` from the query of the URL the provider
/// redirected to. The first occurrence of each parameter wins.
pub fn parse_redirect(url: &str) -> Result<(Option<String>, Option<String>)> {
    let url = Url::parse(url).map_err(|e| {
        ShowcaseError::Authentication(format!("redirect URL is not valid: {}", e))
    })?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" if code.is_none() => code = Some(value.into_owned()),
            "state" if state.is_none() => state = Some(value.into_owned()),
            _ => {}
        }
    }
    Ok((code, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HostError, HostResult};
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use std::cell::RefCell;

    struct FixedExchange {
        token: Option<&'static str>,
        seen: RefCell<Vec<(String, String)>>,
    }

    impl FixedExchange {
        fn new(token: Option<&'static str>) -> Self {
            Self {
                token,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl TokenExchange for FixedExchange {
        fn exchange(&self, code: &str, callback_id: &str) -> Result<Credential> {
            self.seen
                .borrow_mut()
                .push((code.to_string(), callback_id.to_string()));
            self.token
                .map(Credential::new)
                .ok_or(ShowcaseError::TokenPollExhausted { attempts: 10 })
        }
    }

    enum Provider {
        Accepts,
        Rejects,
        Offline,
    }

    impl IdentityProvider for Provider {
        fn fetch_identity(&self, _credential: &Credential) -> HostResult<Identity> {
            match self {
                Provider::Accepts => Ok(octocat()),
                Provider::Rejects => Err(HostError::Unauthorized),
                Provider::Offline => Err(HostError::Http("connection refused".into())),
            }
        }
    }

    fn octocat() -> Identity {
        Identity {
            id: 1,
            login: "octocat".into(),
            name: None,
            avatar_url: "https://avatars.example/1".into(),
        }
    }

    fn app() -> OAuthApp {
        OAuthApp {
            client_id: "client123".into(),
            redirect_uri: "http://localhost:8080/callback".into(),
            authorize_url: GITHUB_AUTHORIZE_URL.into(),
        }
    }

    #[test]
    fn login_stores_callback_id_and_builds_url() {
        let store = MemoryStore::new();
        let session = SessionManager::new(&store);
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();

        let request = session.login(&app(), &["gist".to_string()], now).unwrap();

        assert_eq!(request.state, "1700000000123");
        assert_eq!(
            store.get(CALLBACK_ID_KEY).unwrap().as_deref(),
            Some("1700000000123")
        );
        assert_eq!(
            request.url,
            "https://github.com/login/oauth/authorize?client_id=client123\
             &redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fcallback\
             &scope=user%2Crepo%2Cgist&state=1700000000123"
        );
    }

    #[test]
    fn authorize_url_without_state_or_duplicate_scopes() {
        let url = authorize_url(&app(), &["repo".to_string(), " ".to_string()], None).unwrap();
        assert!(url.ends_with("&scope=user%2Crepo"));
        assert!(!url.contains("state="));
    }

    #[test]
    fn callback_uses_stored_id_when_state_missing() {
        let store = MemoryStore::new();
        store.set(CALLBACK_ID_KEY, "cb-1".into()).unwrap();
        let session = SessionManager::new(&store);
        let exchange = FixedExchange::new(Some("gho_token"));

        let identity = session
            .handle_callback(&exchange, &Provider::Accepts, Some("code-1"), None)
            .unwrap();

        assert_eq!(identity.login, "octocat");
        assert_eq!(
            exchange.seen.borrow().as_slice(),
            &[("code-1".to_string(), "cb-1".to_string())]
        );
        let (credential, cached) = session.require().unwrap();
        assert_eq!(credential.expose(), "gho_token");
        assert_eq!(cached, identity);
        assert!(store.get(CALLBACK_ID_KEY).unwrap().is_none());
    }

    #[test]
    fn callback_prefers_state() {
        let store = MemoryStore::new();
        store.set(CALLBACK_ID_KEY, "stale".into()).unwrap();
        let session = SessionManager::new(&store);
        let exchange = FixedExchange::new(Some("gho_token"));

        session
            .handle_callback(&exchange, &Provider::Accepts, Some("code"), Some("fresh"))
            .unwrap();

        assert_eq!(exchange.seen.borrow()[0].1, "fresh");
    }

    #[test]
    fn callback_without_code_fails_without_exchange() {
        let store = MemoryStore::new();
        let session = SessionManager::new(&store);
        let exchange = FixedExchange::new(Some("gho_token"));

        let err = session
            .handle_callback(&exchange, &Provider::Accepts, None, Some("s"))
            .unwrap_err();

        assert!(matches!(err, ShowcaseError::Authentication(_)));
        assert!(exchange.seen.borrow().is_empty());
    }

    #[test]
    fn failed_exchange_leaves_session_logged_out() {
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "old".into()).unwrap();
        let session = SessionManager::new(&store);

        let err = session
            .handle_callback(
                &FixedExchange::new(None),
                &Provider::Accepts,
                Some("code"),
                Some("s"),
            )
            .unwrap_err();

        assert!(matches!(err, ShowcaseError::TokenPollExhausted { attempts: 10 }));
        assert!(session.credential().unwrap().is_none());
        assert!(matches!(
            session.require(),
            Err(ShowcaseError::NotAuthenticated)
        ));
    }

    #[test]
    fn rejected_identity_fetch_is_an_authentication_failure() {
        let store = MemoryStore::new();
        let session = SessionManager::new(&store);

        let err = session
            .handle_callback(
                &FixedExchange::new(Some("t")),
                &Provider::Rejects,
                Some("code"),
                Some("s"),
            )
            .unwrap_err();

        assert!(matches!(err, ShowcaseError::Authentication(_)));
        assert!(session.credential().unwrap().is_none());
    }

    #[test]
    fn require_needs_both_entries() {
        let store = MemoryStore::new();
        let session = SessionManager::new(&store);
        store.set(TOKEN_KEY, "t".into()).unwrap();
        assert!(session.require().is_err());

        set_json(&store, USER_KEY, &octocat()).unwrap();
        assert!(session.require().is_ok());
    }

    #[test]
    fn logout_clears_credential_and_identity() {
        let store = MemoryStore::new();
        let session = SessionManager::new(&store);
        session
            .login_with_token(&Provider::Accepts, "ghp_abc")
            .unwrap();

        session.logout().unwrap();

        assert!(store.keys().is_empty());
    }

    #[test]
    fn validate_logs_out_on_rejection() {
        let store = MemoryStore::new();
        let session = SessionManager::new(&store);
        session.login_with_token(&Provider::Accepts, "ghp").unwrap();

        let status = session.validate(&Provider::Rejects).unwrap();

        assert_eq!(status, SessionStatus::Rejected);
        assert!(session.require().is_err());
    }

    #[test]
    fn validate_keeps_session_when_unreachable() {
        let store = MemoryStore::new();
        let session = SessionManager::new(&store);
        session.login_with_token(&Provider::Accepts, "ghp").unwrap();

        assert_eq!(
            session.validate(&Provider::Offline).unwrap(),
            SessionStatus::Unreachable
        );
        assert!(session.require().is_ok());
        assert_eq!(
            session.validate(&Provider::Accepts).unwrap(),
            SessionStatus::Valid
        );
    }

    #[test]
    fn validate_without_credential_is_logged_out() {
        let store = MemoryStore::new();
        let session = SessionManager::new(&store);
        assert_eq!(
            session.validate(&Provider::Accepts).unwrap(),
            SessionStatus::LoggedOut
        );
    }

    #[test]
    fn empty_token_is_refused() {
        let store = MemoryStore::new();
        let session = SessionManager::new(&store);
        assert!(session.login_with_token(&Provider::Accepts, "  ").is_err());
        assert!(store.keys().is_empty());
    }

    #[test]
    fn parse_redirect_extracts_code_and_state() {
        let (code, state) =
            parse_redirect("http://localhost:8080/callback?code=abc%2F1&state=123#frag").unwrap();
        assert_eq!(code.as_deref(), Some("abc/1"));
        assert_eq!(state.as_deref(), Some("123"));

        assert_eq!(parse_redirect("http://localhost/").unwrap(), (None, None));
    }

    #[test]
    fn parse_redirect_ignores_fragment() {
        let (code, state) = parse_redirect("http://localhost/callback#x?code=zz").unwrap();
        assert_eq!(code, None);
        assert_eq!(state, None);
    }

    #[test]
    fn parse_redirect_form_decodes_and_keeps_first() {
        let (code, _) = parse_redirect("http://localhost/callback?code=a+b").unwrap();
        assert_eq!(code.as_deref(), Some("a b"));

        let (code, _) =
            parse_redirect("http://localhost/callback?code=first&code=second").unwrap();
        assert_eq!(code.as_deref(), Some("first"));
    }

    #[test]
    fn parse_redirect_rejects_malformed_url() {
        let err = parse_redirect("not a url").unwrap_err();
        assert!(matches!(err, ShowcaseError::Authentication(_)));
    }

    #[test]
    fn invalid_authorize_url_fails_before_storing_state() {
        let store = MemoryStore::new();
        let session = SessionManager::new(&store);
        let app = OAuthApp {
            authorize_url: "not a url".into(),
            ..app()
        };

        let err = session.login(&app, &[], Utc::now()).unwrap_err();
        assert!(matches!(err, ShowcaseError::InvalidInput(_)));
        assert!(store.get(CALLBACK_ID_KEY).unwrap().is_none());
    }
}
