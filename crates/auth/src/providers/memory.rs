//! In-memory identity provider for development and testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use shadow_core::auth::{
    calculate_expiry, generate_token, normalize_email, AuthError, AuthUser, ExchangeCode,
    IdentityProvider, RefreshOutcome, Result, Session, SessionTokens,
};
use uuid::Uuid;

/// A recovery email the provider was asked to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryEmail {
    pub email: String,
    pub redirect_to: String,
}

#[derive(Debug, Clone)]
struct IssuedAccess {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// A refresh token that was rotated away, and what replaced it.
#[derive(Debug, Clone)]
struct Retired {
    successor: SessionTokens,
    retired_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, AuthUser>,
    /// One-time codes. Removed on first redemption.
    codes: HashMap<String, Uuid>,
    access: HashMap<String, IssuedAccess>,
    refresh: HashMap<String, Uuid>,
    retired: HashMap<String, Retired>,
    recovery_emails: Vec<RecoveryEmail>,
}

/// Identity provider that keeps users, codes and tokens in process memory.
///
/// All state changes happen under one short mutex section, so redeeming a
/// code is atomic: of two concurrent exchanges for the same code exactly
/// one succeeds.
///
/// Refresh tokens rotate on use. Within `reuse_interval` of a rotation the
/// retired refresh token keeps resolving to the session that replaced it, so
/// concurrent requests carrying the same stale cookie all stay signed in.
#[derive(Debug)]
pub struct MemoryProvider {
    inner: Mutex<Inner>,
    session_ttl: Duration,
    reuse_interval: Duration,
    calls: AtomicUsize,
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProvider {
    pub const DEFAULT_REUSE_SECONDS: i64 = 10;

    /// Creates an empty provider issuing one-hour access tokens.
    pub fn new() -> Self {
        Self::with_session_ttl(Duration::hours(1))
    }

    pub fn with_session_ttl(session_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            session_ttl,
            reuse_interval: Duration::seconds(Self::DEFAULT_REUSE_SECONDS),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_reuse_interval(mut self, reuse_interval: Duration) -> Self {
        self.reuse_interval = reuse_interval;
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| AuthError::Provider("provider state poisoned".to_string()))
    }

    /// Number of `IdentityProvider` calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn register_user(&self, user: AuthUser) -> Result<()> {
        self.lock()?.users.insert(user.id, user);
        Ok(())
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>> {
        let email = normalize_email(email);
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email.as_deref().map(normalize_email).as_deref() == Some(email.as_str()))
            .cloned())
    }

    /// Issue a one-time code for a registered user.
    pub fn issue_code(&self, user_id: Uuid) -> Result<String> {
        let mut inner = self.lock()?;
        if !inner.users.contains_key(&user_id) {
            return Err(AuthError::Provider(format!("unknown user {}", user_id)));
        }
        let code = generate_token();
        inner.codes.insert(code.clone(), user_id);
        Ok(code)
    }

    /// Start a session directly, bypassing the code flow.
    pub fn start_session(&self, user_id: Uuid) -> Result<Session> {
        self.start_session_with_ttl(user_id, self.session_ttl)
    }

    /// Start a session whose access token lives for `ttl` (may be negative).
    pub fn start_session_with_ttl(&self, user_id: Uuid, ttl: Duration) -> Result<Session> {
        let mut inner = self.lock()?;
        issue_session(&mut inner, user_id, ttl)
    }

    pub fn recovery_emails(&self) -> Result<Vec<RecoveryEmail>> {
        Ok(self.lock()?.recovery_emails.clone())
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn issue_session(inner: &mut Inner, user_id: Uuid, ttl: Duration) -> Result<Session> {
    let user = inner
        .users
        .get(&user_id)
        .cloned()
        .ok_or_else(|| AuthError::Provider(format!("unknown user {}", user_id)))?;

    let tokens = SessionTokens {
        access_token: generate_token(),
        refresh_token: generate_token(),
    };
    let expires_at = calculate_expiry(Utc::now(), ttl);

    inner.access.insert(
        tokens.access_token.clone(),
        IssuedAccess {
            user_id,
            expires_at,
        },
    );
    inner.refresh.insert(tokens.refresh_token.clone(), user_id);

    Ok(Session {
        user,
        tokens,
        expires_at,
    })
}

fn valid_access_user(inner: &Inner, access_token: &str) -> Option<AuthUser> {
    let issued = inner.access.get(access_token)?;
    if issued.expires_at <= Utc::now() {
        return None;
    }
    inner.users.get(&issued.user_id).cloned()
}

/// The session a recently retired refresh token was rotated into.
fn successor_session(inner: &Inner, refresh_token: &str, reuse_interval: Duration) -> Option<Session> {
    let retired = inner.retired.get(refresh_token)?;
    if Utc::now() - retired.retired_at >= reuse_interval {
        return None;
    }
    let issued = inner.access.get(&retired.successor.access_token)?;
    let user = inner.users.get(&issued.user_id).cloned()?;
    Some(Session {
        user,
        tokens: retired.successor.clone(),
        expires_at: issued.expires_at,
    })
}

#[async_trait]
impl IdentityProvider for MemoryProvider {
    async fn exchange_code(&self, code: &ExchangeCode) -> Result<Session> {
        self.record_call();
        let mut inner = self.lock()?;
        let user_id = inner.codes.remove(&code.code).ok_or_else(|| {
            AuthError::CodeExchange("Invalid or already used authorization code".to_string())
        })?;
        issue_session(&mut inner, user_id, self.session_ttl)
    }

    async fn refresh_session(&self, tokens: &SessionTokens) -> Result<RefreshOutcome> {
        self.record_call();
        let mut inner = self.lock()?;

        if let Some(user) = valid_access_user(&inner, &tokens.access_token) {
            return Ok(RefreshOutcome::Valid(user));
        }

        if let Some(user_id) = inner.refresh.remove(&tokens.refresh_token) {
            inner.access.remove(&tokens.access_token);
            let session = issue_session(&mut inner, user_id, self.session_ttl)?;
            inner.retired.insert(
                tokens.refresh_token.clone(),
                Retired {
                    successor: session.tokens.clone(),
                    retired_at: Utc::now(),
                },
            );
            return Ok(RefreshOutcome::Refreshed(session));
        }

        successor_session(&inner, &tokens.refresh_token, self.reuse_interval)
            .map(RefreshOutcome::Refreshed)
            .ok_or(AuthError::Unauthorized)
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser> {
        self.record_call();
        let inner = self.lock()?;
        valid_access_user(&inner, access_token).ok_or(AuthError::Unauthorized)
    }

    async fn send_recovery_email(&self, email: &str, redirect_to: &str) -> Result<()> {
        self.record_call();
        self.lock()?.recovery_emails.push(RecoveryEmail {
            email: normalize_email(email),
            redirect_to: redirect_to.to_string(),
        });
        Ok(())
    }
}
