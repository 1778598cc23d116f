use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{
    config::{SessionConfig, MAX_SESSION_TTL_MINUTES},
    error::AppError,
    state::AppState,
};

/// Signed contents of the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: Option<i64>,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
}

/// Signing keys and cookie settings for sessions.
#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub cookie_name: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.session)
    }
}

impl SessionKeys {
    pub fn new(cfg: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            cookie_name: cfg.cookie_name.clone(),
            ttl: Duration::from_secs(ttl_secs(cfg.ttl_minutes)),
        }
    }

    fn sign(&self, user_id: Option<i64>) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = SessionClaims {
            user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(?user_id, "session signed");
        Ok(token)
    }

    fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.validate_aud = false;
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// Read the session out of a cookie jar. Missing, tampered or expired
    /// cookies all yield an empty session.
    pub fn load(&self, jar: &CookieJar) -> Session {
        let user_id = jar.get(&self.cookie_name).and_then(|c| match self.verify(c.value()) {
            Ok(claims) => claims.user_id,
            Err(e) => {
                warn!(error = %e, "discarding invalid session cookie");
                None
            }
        });
        Session {
            keys: self.clone(),
            user_id,
        }
    }
}

fn ttl_secs(ttl_minutes: i64) -> u64 {
    let minutes = ttl_minutes.clamp(1, MAX_SESSION_TTL_MINUTES) as u64;
    minutes * 60
}

/// Per-client session state. Only the `user_id` key is tracked.
#[derive(Clone)]
pub struct Session {
    keys: SessionKeys,
    user_id: Option<i64>,
}

impl Session {
    pub fn get_user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn set_user_id(&mut self, user_id: i64) {
        self.user_id = Some(user_id);
    }

    /// Null out the stored identity; the session itself stays.
    pub fn clear_user_id(&mut self) {
        self.user_id = None;
    }

    /// Sign the current state into a cookie to send back to the client.
    pub fn save(&self) -> Result<CookieJar, AppError> {
        let token = self.keys.sign(self.user_id)?;
        let cookie = Cookie::build((self.keys.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
        Ok(CookieJar::new().add(cookie))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(keys.load(&jar))
    }
}

/// Id of the signed-in user. Rejects with 401 when the session carries none.
pub struct CurrentUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        match session.get_user_id() {
            Some(id) => Ok(CurrentUser(id)),
            None => {
                warn!(uri = %parts.uri, "request without a signed-in session");
                Err(AppError::Unauthorized)
            }
        }
    }
}
