//! Signed session tokens.
//!
//! A token is `base64url(payload) "." base64url(signature)` where the
//! payload is colon-delimited:
//!
//! ```text
//! admin:<expiresAtMs>
//! user:<expiresAtMs>
//! user:<accountId>:<expiresAtMs>
//! ```
//!
//! and the signature is HMAC-SHA256 over the exact payload bytes. Both
//! segments use the URL-safe alphabet without padding.
//!
//! Tokens are stateless: there is no revocation list, so expiry is the only
//! invalidation mechanism.

use crate::error::{AuthError, Result};
use crate::state::{AccountId, Identity, Role};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use carto_core::environment::Clock;
use chrono::Duration;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// Decoder that tolerates padded segments produced by other encoders.
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// An issued token and its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    /// Opaque token string handed to the client.
    pub value: String,

    /// Expiry in milliseconds since the Unix epoch.
    pub expires_at: i64,
}

/// Issues and verifies session tokens.
///
/// Verification is CPU-only and needs nothing but the secret, so a single
/// authority can be shared across request handlers.
#[derive(Clone)]
pub struct TokenAuthority {
    secret: Option<Arc<[u8]>>,
    session_duration: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("configured", &self.secret.is_some())
            .field("session_duration", &self.session_duration)
            .finish_non_exhaustive()
    }
}

impl TokenAuthority {
    /// Create an authority. An empty or absent secret leaves it unconfigured.
    #[must_use]
    pub fn new(secret: Option<&str>, session_duration: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret
                .filter(|s| !s.is_empty())
                .map(|s| Arc::from(s.as_bytes())),
            session_duration,
            clock,
        }
    }

    /// Returns `true` when a signing secret is available.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Token lifetime (also the cookie `Max-Age`).
    #[must_use]
    pub const fn session_duration(&self) -> Duration {
        self.session_duration
    }

    /// Issue a token for `role`.
    ///
    /// The account id is only encoded for the `user` role; it is ignored for
    /// admins.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unconfigured`] when no secret is configured.
    pub fn issue(&self, role: Role, account_id: Option<AccountId>) -> Result<SessionToken> {
        let secret = self.secret.as_deref().ok_or(AuthError::Unconfigured)?;
        let expires_at = self.clock.now_millis() + self.session_duration.num_milliseconds();

        let payload = match (role, account_id) {
            (Role::User, Some(account_id)) => format!("user:{account_id}:{expires_at}"),
            (role, _) => format!("{role}:{expires_at}"),
        };

        let signature = sign(secret, payload.as_bytes())?;
        let value = format!("{}.{signature}", URL_SAFE_NO_PAD.encode(payload.as_bytes()));

        tracing::debug!(role = %role, expires_at, "Issued session token");

        Ok(SessionToken { value, expires_at })
    }

    /// Verify a token and recover the identity it carries.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Unconfigured`] when no secret is configured
    /// - [`AuthError::InvalidToken`] when the token is malformed, carries a
    ///   bad signature or is expired (`now >= expiresAt`)
    pub fn verify(&self, token: &str) -> Result<Identity> {
        let secret = self.secret.as_deref().ok_or(AuthError::Unconfigured)?;

        let result = self.verify_with(secret, token);
        match &result {
            Ok(identity) => {
                metrics::counter!("auth.token.verified").increment(1);
                tracing::trace!(role = %identity.role, "Session token verified");
            },
            Err(AuthError::InvalidToken { reason }) => {
                metrics::counter!("auth.token.rejected", "reason" => *reason).increment(1);
                tracing::debug!(reason, "Session token rejected");
            },
            Err(_) => {},
        }
        result
    }

    fn verify_with(&self, secret: &[u8], token: &str) -> Result<Identity> {
        let mut parts = token.split('.');
        let (Some(encoded_payload), Some(signature), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("malformed"));
        };

        let payload = LENIENT_URL_SAFE
            .decode(encoded_payload)
            .map_err(|_| invalid("undecodable payload"))?;

        let expected = sign(secret, &payload)?;
        let supplied = signature.trim_end_matches('=');
        if !constant_time_eq::constant_time_eq(expected.as_bytes(), supplied.as_bytes()) {
            return Err(invalid("bad signature"));
        }

        let payload = std::str::from_utf8(&payload).map_err(|_| invalid("undecodable payload"))?;
        let (identity, expires_at) = parse_payload(payload)?;

        if self.clock.now_millis() >= expires_at {
            return Err(invalid("expired"));
        }

        Ok(identity)
    }
}

fn invalid(reason: &'static str) -> AuthError {
    AuthError::InvalidToken { reason }
}

/// Base64url (no padding) HMAC-SHA256 of `payload`.
fn sign(secret: &[u8], payload: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AuthError::InternalError(format!("HMAC key rejected: {e}")))?;
    mac.update(payload);
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}

fn parse_payload(payload: &str) -> Result<(Identity, i64)> {
    let fields: Vec<&str> = payload.split(':').collect();

    let (identity, expiry) = match fields.as_slice() {
        [role, expiry] => {
            let role = Role::parse(role).ok_or_else(|| invalid("unknown role"))?;
            let identity = Identity {
                role,
                account_id: None,
            };
            (identity, *expiry)
        },
        ["user", account_id, expiry] => {
            let account_id = account_id
                .parse::<AccountId>()
                .map_err(|_| invalid("bad account id"))?;
            (Identity::account(account_id), *expiry)
        },
        _ => return Err(invalid("wrong field count")),
    };

    let expires_at = expiry.parse::<i64>().map_err(|_| invalid("bad expiry"))?;
    Ok((identity, expires_at))
}
