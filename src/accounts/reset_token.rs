use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{config::ResetConfig, state::AccountsState};

/// Payload of a password-reset token. `sub` is the lowercased identifier the
/// reset was requested for.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

#[derive(Clone)]
pub struct ResetKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl FromRef<AccountsState> for ResetKeys {
    fn from_ref(state: &AccountsState) -> Self {
        ResetKeys::new(&state.config.reset)
    }
}

impl ResetKeys {
    pub fn new(cfg: &ResetConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs(cfg.ttl_seconds.max(0) as u64),
        }
    }

    pub fn issue(&self, identifier: &str) -> anyhow::Result<String> {
        self.issue_at(identifier, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, identifier: &str, issued_at: OffsetDateTime) -> anyhow::Result<String> {
        let exp = issued_at + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = ResetClaims {
            sub: identifier.to_string(),
            iat: issued_at.unix_timestamp().max(0) as usize,
            exp: exp.unix_timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(identifier = %identifier, "reset token signed");
        Ok(token)
    }

    /// Returns the identifier the token was issued for. Fails on a bad
    /// signature, a foreign issuer or audience, or once the window has passed.
    pub fn verify(&self, token: &str) -> anyhow::Result<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<ResetClaims>(token, &self.decoding, &validation)?;
        debug!(identifier = %data.claims.sub, "reset token verified");
        Ok(data.claims.sub)
    }
}
