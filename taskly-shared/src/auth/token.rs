/// Identity token issuance and verification
///
/// Tokens are JWTs signed with HS256 (HMAC-SHA256) using a server-held
/// secret. They are stateless: the server keeps no session table, so a token
/// stays valid until it expires. Revocation before expiry is not supported;
/// logging out means the client discards its token.
///
/// # Claims
///
/// - `sub`: User ID
/// - `iss`: Always "taskly"
/// - `iat`: Issued at (Unix timestamp)
/// - `nbf`: Not before (Unix timestamp)
/// - `exp`: Expiration (Unix timestamp)
///
/// # Verification order
///
/// The signature is checked before any claim is trusted. Only a correctly
/// signed token has its issuer and expiry inspected, and expiry is enforced
/// with zero leeway.
///
/// # Example
///
/// ```
/// use taskly_shared::auth::token::{TokenConfig, TokenService};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new(TokenConfig {
///     secret: "your-secret-key-at-least-32-bytes-long".to_string(),
///     expires_in: Duration::hours(24),
/// })?;
///
/// let user_id = Uuid::new_v4();
/// let issued = tokens.issue(user_id)?;
/// assert_eq!(tokens.verify(&issued.token)?, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim carried by every token
pub const ISSUER: &str = "taskly";

/// Default validity window for issued tokens
pub const DEFAULT_EXPIRATION_HOURS: i64 = 24;

/// Minimum accepted secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted validity window (one year)
pub const MAX_EXPIRATION_HOURS: i64 = 8760;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Rejected configuration
    #[error("Invalid token configuration: {0}")]
    Config(String),

    /// Failed to create token
    #[error("Failed to create token: {0}")]
    Create(String),

    /// Signature, format or issuer check failed
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Correctly signed, but past its expiry
    #[error("Token has expired")]
    Expired,
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - Always "taskly"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Builds claims for `user_id` issued at `now`
    ///
    /// Fails with `TokenError::Create` if the expiry is not representable.
    pub fn new(user_id: Uuid, now: DateTime<Utc>, expires_in: Duration) -> Result<Self, TokenError> {
        let expires_at = now
            .checked_add_signed(expires_in)
            .ok_or_else(|| TokenError::Create("expiry out of range".to_string()))?;

        Ok(Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// Expired once the current second reaches `exp`
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Token service configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC secret; at least 32 bytes
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Validity window of issued tokens
    pub expires_in: Duration,
}

/// A freshly issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies signed identity tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expires_in: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Config` if the secret is shorter than 32 bytes or
    /// the validity window is not within `(0, MAX_EXPIRATION_HOURS]`.
    pub fn new(config: TokenConfig) -> Result<Self, TokenError> {
        if config.secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::Config(format!(
                "secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if config.expires_in <= Duration::zero() {
            return Err(TokenError::Config(
                "expiration window must be positive".to_string(),
            ));
        }
        if config.expires_in > Duration::hours(MAX_EXPIRATION_HOURS) {
            return Err(TokenError::Config(format!(
                "expiration window must be at most {} hours",
                MAX_EXPIRATION_HOURS
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            expires_in: config.expires_in,
        })
    }

    /// Configured validity window
    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    /// Issues a token for `user_id`, valid from now
    pub fn issue(&self, user_id: Uuid) -> Result<IssuedToken, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issues a token as if it had been created at `issued_at`
    pub fn issue_at(&self, user_id: Uuid, issued_at: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let claims = Claims::new(user_id, issued_at, self.expires_in)?;

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Create(format!("Token encoding failed: {}", e)))?;

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| TokenError::Create("expiry out of range".to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies a token and returns its subject
    ///
    /// # Errors
    ///
    /// - `TokenError::Invalid` for bad signature, malformed token, wrong
    ///   algorithm, wrong issuer or a token that is not yet valid
    /// - `TokenError::Expired` for a correctly signed token whose `exp` has
    ///   been reached
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid(e.to_string()),
                }
            })?;

        // jsonwebtoken still accepts exp == now
        if token_data.claims.is_expired() {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";
    const BASE64URL: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

    fn service() -> TokenService {
        TokenService::new(TokenConfig {
            secret: SECRET.to_string(),
            expires_in: Duration::hours(DEFAULT_EXPIRATION_HOURS),
        })
        .unwrap()
    }

    /// Flips the lowest bit of the sextet encoded by the character at `index`
    /// of the signature segment
    fn flip_signature_bit(token: &str, index: usize) -> String {
        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = signature.chars().collect();
        let pos = BASE64URL.find(chars[index]).unwrap();
        chars[index] = BASE64URL.as_bytes()[pos ^ 1] as char;
        format!("{}.{}", head, chars.into_iter().collect::<String>())
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = TokenService::new(TokenConfig {
            secret: "short".to_string(),
            expires_in: Duration::hours(1),
        });
        assert!(matches!(result, Err(TokenError::Config(_))));
    }

    #[test]
    fn test_non_positive_expiry_rejected() {
        let result = TokenService::new(TokenConfig {
            secret: SECRET.to_string(),
            expires_in: Duration::zero(),
        });
        assert!(matches!(result, Err(TokenError::Config(_))));
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service();
        let user_id = Uuid::new_v4();

        let issued = tokens.issue(user_id).unwrap();
        assert_eq!(tokens.verify(&issued.token).unwrap(), user_id);

        let remaining = issued.expires_at - Utc::now();
        assert!(remaining <= Duration::hours(24));
        assert!(remaining > Duration::hours(23));
    }

    #[test]
    fn test_expired_after_window() {
        let tokens = service();
        let issued_at = Utc::now() - tokens.expires_in() - Duration::seconds(1);

        let issued = tokens.issue_at(Uuid::new_v4(), issued_at).unwrap();
        assert!(matches!(tokens.verify(&issued.token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_valid_just_before_window_ends() {
        let tokens = service();
        let issued_at = Utc::now() - tokens.expires_in() + Duration::minutes(1);

        let user_id = Uuid::new_v4();
        let issued = tokens.issue_at(user_id, issued_at).unwrap();
        assert_eq!(tokens.verify(&issued.token).unwrap(), user_id);
    }

    #[test]
    fn test_single_bit_signature_change_rejected() {
        let tokens = service();
        let issued = tokens.issue(Uuid::new_v4()).unwrap();

        for index in [0, 10, 20, 30] {
            let tampered = flip_signature_bit(&issued.token, index);
            assert_ne!(tampered, issued.token);
            assert!(
                matches!(tokens.verify(&tampered), Err(TokenError::Invalid(_))),
                "bit flip at {} accepted",
                index
            );
        }
    }

    #[test]
    fn test_forged_expired_token_reports_invalid_not_expired() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::days(3);
        let issued = tokens.issue_at(Uuid::new_v4(), issued_at).unwrap();

        let tampered = flip_signature_bit(&issued.token, 5);
        assert!(matches!(tokens.verify(&tampered), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let other = TokenService::new(TokenConfig {
            secret: "another-secret-key-at-least-32-bytes".to_string(),
            expires_in: Duration::hours(1),
        })
        .unwrap();
        let issued = other.issue(Uuid::new_v4()).unwrap();

        assert!(matches!(service().verify(&issued.token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let now = Utc::now();
        let mut claims = Claims::new(Uuid::new_v4(), now, Duration::hours(1)).unwrap();
        claims.iss = "someone-else".to_string();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(service().verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = service();
        assert!(matches!(tokens.verify(""), Err(TokenError::Invalid(_))));
        assert!(matches!(tokens.verify("not.a.token"), Err(TokenError::Invalid(_))));
        assert!(matches!(tokens.verify("abc"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_claims_expiry() {
        let fresh = Claims::new(Uuid::new_v4(), Utc::now(), Duration::hours(1)).unwrap();
        assert!(!fresh.is_expired());

        let stale =
            Claims::new(Uuid::new_v4(), Utc::now() - Duration::hours(2), Duration::hours(1)).unwrap();
        assert!(stale.is_expired());
    }

    #[test]
    fn test_rejected_when_exp_equals_now() {
        let tokens = service();
        let issued = tokens
            .issue_at(Uuid::new_v4(), Utc::now() - tokens.expires_in())
            .unwrap();

        assert!(matches!(tokens.verify(&issued.token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_oversized_window_rejected() {
        let result = TokenService::new(TokenConfig {
            secret: SECRET.to_string(),
            expires_in: Duration::hours(MAX_EXPIRATION_HOURS + 1),
        });
        assert!(matches!(result, Err(TokenError::Config(_))));

        let at_limit = TokenService::new(TokenConfig {
            secret: SECRET.to_string(),
            expires_in: Duration::hours(MAX_EXPIRATION_HOURS),
        });
        assert!(at_limit.is_ok());
    }

    #[test]
    fn test_unrepresentable_expiry_is_create_error() {
        let tokens = service();
        let result = tokens.issue_at(Uuid::new_v4(), DateTime::<Utc>::MAX_UTC);
        assert!(matches!(result, Err(TokenError::Create(_))));
    }
}
