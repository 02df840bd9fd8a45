//! Authentication Module
//!
//! Turns an `Authorization: Bearer <jwt>` header into an [`Actor`].
//!
//! Token verification sits behind [`CredentialVerifier`] so the resolver does
//! not care how tokens are checked. The shipped [`JwtVerifier`] validates the
//! signature with `jsonwebtoken` and does its own time validation against the
//! injected [`Clock`](syllabus_core::Clock), so expiry is deterministic in
//! tests and a broken system clock fails loud instead of panicking.

use std::collections::HashSet;
use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use syllabus_core::{
    Actor, ActorId, Clock, ConfigError, LmsError, Role, SharedClock, SystemClock, Timestamp,
};
use thiserror::Error;

use crate::config::Environment;
use crate::error::{ApiError, ApiResult};

const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

/// Minimum secret length accepted in production.
const MIN_SECRET_LEN: usize = 32;

// ============================================================================
// JWT SECRET (TYPE-SAFE)
// ============================================================================

/// JWT signing secret that never shows up in logs.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

impl JwtSecret {
    /// # Errors
    /// Returns error if the secret is empty.
    pub fn new(secret: String) -> Result<Self, LmsError> {
        if secret.is_empty() {
            return Err(LmsError::Config(ConfigError::MissingRequired {
                field: "jwt_secret".to_string(),
            }));
        }
        Ok(Self(SecretString::new(secret.into())))
    }

    /// Expose the secret value (only for cryptographic operations).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == INSECURE_DEFAULT_SECRET
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.len())
    }
}

fn build_jwt_secret(secret_str: String) -> JwtSecret {
    let normalized = if secret_str.trim().is_empty() {
        INSECURE_DEFAULT_SECRET.to_string()
    } else {
        secret_str
    };

    match JwtSecret::new(normalized) {
        Ok(secret) => secret,
        Err(_) => JwtSecret(SecretString::new(INSECURE_DEFAULT_SECRET.to_string().into())),
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: JwtSecret,

    /// JWT algorithm (default: HS256)
    pub jwt_algorithm: Algorithm,

    /// Lifetime of issued tokens in seconds (default: 1 hour)
    pub jwt_expiration_secs: i64,

    /// Tolerated clock drift when checking `exp` (default: 60)
    pub jwt_clock_skew_secs: i64,

    /// Clock for issuing and validating tokens
    pub clock: SharedClock,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("jwt_clock_skew_secs", &self.jwt_clock_skew_secs)
            .field("clock", &"<Clock>")
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: build_jwt_secret(INSECURE_DEFAULT_SECRET.to_string()),
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: 3600,
            jwt_clock_skew_secs: 60,
            clock: Arc::new(SystemClock),
        }
    }
}

impl AuthConfig {
    /// Create authentication configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `SYLLABUS_JWT_SECRET`: JWT signing secret
    /// - `SYLLABUS_JWT_EXPIRATION_SECS`: token lifetime (default: 3600)
    /// - `SYLLABUS_JWT_CLOCK_SKEW_SECS`: clock skew tolerance (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secret_str = std::env::var("SYLLABUS_JWT_SECRET")
            .unwrap_or_else(|_| INSECURE_DEFAULT_SECRET.to_string());

        Self {
            jwt_secret: build_jwt_secret(secret_str),
            jwt_expiration_secs: std::env::var("SYLLABUS_JWT_EXPIRATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.jwt_expiration_secs),
            jwt_clock_skew_secs: std::env::var("SYLLABUS_JWT_CLOCK_SKEW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.jwt_clock_skew_secs),
            ..defaults
        }
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Refuse weak secrets in production; warn about them elsewhere.
    pub fn validate_for_production(&self, environment: Environment) -> ApiResult<()> {
        let is_production = environment == Environment::Production;

        if self.jwt_secret.is_insecure_default() {
            if is_production {
                return Err(ApiError::invalid_input(format!(
                    "Cannot start server in production with insecure JWT secret. \
                     Set SYLLABUS_JWT_SECRET to a secure value. \
                     SYLLABUS_ENVIRONMENT={}",
                    environment.as_str()
                )));
            }
            tracing::warn!(
                "Using insecure default JWT secret. Acceptable for local development \
                 only; set SYLLABUS_JWT_SECRET (minimum 32 characters) before deploying."
            );
        }

        if self.jwt_secret.len() < MIN_SECRET_LEN {
            if is_production {
                return Err(ApiError::invalid_input(format!(
                    "JWT secret is too short for production use ({} chars). \
                     It must be at least {} characters long.",
                    self.jwt_secret.len(),
                    MIN_SECRET_LEN
                )));
            } else if !self.jwt_secret.is_insecure_default() {
                tracing::warn!(
                    length = self.jwt_secret.len(),
                    "JWT secret is short; use at least 32 characters in production"
                );
            }
        }

        Ok(())
    }
}

// ============================================================================
// JWT CLAIMS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Actor id as a decimal string
    pub sub: String,

    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not valid before (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Claims {
    /// Claims for `actor`, valid for `expiration_secs` from `now`.
    pub fn new(actor: &Actor, now: i64, expiration_secs: i64) -> Self {
        Self {
            sub: actor.id.to_string(),
            role: actor.role,
            iat: now,
            exp: now + expiration_secs,
            nbf: None,
            email: None,
            username: None,
        }
    }

    pub fn with_profile(mut self, email: Option<String>, username: Option<String>) -> Self {
        self.email = email;
        self.username = username;
        self
    }
}

/// What a verifier vouches for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub actor_id: ActorId,
    pub role: Role,
    pub expires_at: Timestamp,
}

impl VerifiedClaims {
    pub fn actor(&self) -> Actor {
        Actor::new(self.actor_id, self.role)
    }
}

// ============================================================================
// CREDENTIAL ERRORS
// ============================================================================

/// Why a credential was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Authentication required: provide an Authorization header")]
    Missing,

    #[error("Malformed credential: {0}")]
    Malformed(String),

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token has expired")]
    Expired,

    #[error("Server clock returned a pre-epoch time")]
    BrokenClock,
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Missing => ApiError::unauthorized(err.to_string()),
            CredentialError::Malformed(_) | CredentialError::Invalid(_) => {
                ApiError::invalid_token(err.to_string())
            }
            CredentialError::Expired => ApiError::token_expired(),
            CredentialError::BrokenClock => {
                tracing::error!("System clock returned pre-epoch time - server time is broken");
                ApiError::internal_error("Server time configuration error - please contact support")
            }
        }
    }
}

// ============================================================================
// VERIFIER
// ============================================================================

/// Verifies an opaque bearer token.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<VerifiedClaims, CredentialError>;
}

/// HMAC JWT verifier.
#[derive(Debug, Clone)]
pub struct JwtVerifier {
    config: AuthConfig,
}

impl JwtVerifier {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

/// Check `exp`/`nbf` against `now` with `leeway_secs` of tolerance.
fn validate_claim_times(
    now: i64,
    exp: i64,
    nbf: Option<i64>,
    leeway_secs: i64,
) -> Result<(), CredentialError> {
    if let Some(nbf) = nbf {
        if now + leeway_secs < nbf {
            return Err(CredentialError::Invalid("token not yet valid (nbf)".to_string()));
        }
    }

    if exp < now - leeway_secs {
        return Err(CredentialError::Expired);
    }

    Ok(())
}

impl CredentialVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<VerifiedClaims, CredentialError> {
        let decoding_key = DecodingKey::from_secret(self.config.jwt_secret.expose().as_bytes());

        // Signature only; times are checked below against the injected clock.
        let mut validation = Validation::new(self.config.jwt_algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    CredentialError::Invalid("signature is invalid".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    CredentialError::Malformed("token is not a JWT".to_string())
                }
                _ => CredentialError::Invalid(e.to_string()),
            })?
            .claims;

        let now = self.config.clock.now_epoch_secs();
        if now < 0 {
            return Err(CredentialError::BrokenClock);
        }
        validate_claim_times(now, claims.exp, claims.nbf, self.config.jwt_clock_skew_secs)?;

        let actor_id = claims
            .sub
            .parse::<ActorId>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| CredentialError::Malformed(format!("invalid subject: {}", claims.sub)))?;

        let expires_at = chrono::DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| CredentialError::Malformed("exp out of range".to_string()))?;

        Ok(VerifiedClaims {
            actor_id,
            role: claims.role,
            expires_at,
        })
    }
}

/// Sign a token for `actor` with the configured lifetime.
pub fn issue_token(config: &AuthConfig, actor: &Actor) -> ApiResult<String> {
    let claims = Claims::new(actor, config.clock.now_epoch_secs(), config.jwt_expiration_secs);
    encode_claims(config, &claims)
}

/// Sign arbitrary claims.
pub fn encode_claims(config: &AuthConfig, claims: &Claims) -> ApiResult<String> {
    let encoding_key = EncodingKey::from_secret(config.jwt_secret.expose().as_bytes());
    let header = Header::new(config.jwt_algorithm);

    encode(&header, claims, &encoding_key)
        .map_err(|e| ApiError::internal_error(format!("Failed to generate token: {}", e)))
}

// ============================================================================
// PRINCIPAL RESOLVER
// ============================================================================

/// Maps the `Authorization` header onto an [`Actor`].
#[derive(Clone)]
pub struct PrincipalResolver {
    verifier: Arc<dyn CredentialVerifier>,
}

impl std::fmt::Debug for PrincipalResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrincipalResolver").finish_non_exhaustive()
    }
}

impl PrincipalResolver {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    /// Resolve a required credential.
    pub fn resolve(&self, authorization: Option<&str>) -> Result<Actor, CredentialError> {
        let header = authorization.ok_or(CredentialError::Missing)?;
        let token = bearer_token(header)?;
        let claims = self.verifier.verify(token)?;
        Ok(claims.actor())
    }

    /// Resolve an optional credential. A present but bad credential is still
    /// an error.
    pub fn resolve_optional(
        &self,
        authorization: Option<&str>,
    ) -> Result<Option<Actor>, CredentialError> {
        match authorization {
            None => Ok(None),
            Some(header) => self.resolve(Some(header)).map(Some),
        }
    }
}

fn bearer_token(header: &str) -> Result<&str, CredentialError> {
    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        CredentialError::Malformed("Authorization header must use Bearer scheme".to_string())
    })?;
    let token = token.trim();
    if token.is_empty() {
        return Err(CredentialError::Malformed("empty bearer token".to_string()));
    }
    Ok(token)
}

// ============================================================================
// TESTS
// ============================================================================
