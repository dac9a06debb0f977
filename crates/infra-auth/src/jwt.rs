// JWT Token Service
//
// Access and refresh tokens are signed with separate secrets and carry a
// `typ` claim, so neither kind can stand in for the other.

use folio_core::error::{AppError, Result};
use folio_core::port::{
    IssuedToken, TimeProvider, TokenClaims, TokenKind, TokenService, TokenSubject,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

/// Shortest accepted signing secret (bytes)
pub const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl JwtConfig {
    pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;
    pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

    /// Reject short or shared secrets
    pub fn validate(&self) -> Result<()> {
        if self.access_secret.len() < MIN_SECRET_LENGTH
            || self.refresh_secret.len() < MIN_SECRET_LENGTH
        {
            return Err(AppError::Config(format!(
                "JWT secrets must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }
        if self.access_secret == self.refresh_secret {
            return Err(AppError::Config(
                "Access and refresh secrets must differ".to_string(),
            ));
        }
        if self.access_ttl_secs <= 0 || self.refresh_ttl_secs <= 0 {
            return Err(AppError::Config("Token TTLs must be positive".to_string()));
        }
        Ok(())
    }
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl KeyPair {
    fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }
}

pub struct JwtTokenService {
    access: KeyPair,
    refresh: KeyPair,
    validation: Validation,
    time_provider: Arc<dyn TimeProvider>,
}

impl JwtTokenService {
    pub fn new(config: &JwtConfig, time_provider: Arc<dyn TimeProvider>) -> Result<Self> {
        config.validate()?;

        // Expiry is checked against the injected clock below
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            access: KeyPair::new(&config.access_secret, config.access_ttl_secs),
            refresh: KeyPair::new(&config.refresh_secret, config.refresh_ttl_secs),
            validation,
            time_provider,
        })
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

fn invalid_token() -> AppError {
    AppError::Unauthorized("Invalid or expired token".to_string())
}

impl TokenService for JwtTokenService {
    fn issue(&self, subject: &TokenSubject, kind: TokenKind) -> Result<IssuedToken> {
        let keys = self.keys(kind);
        let now_ms = self.time_provider.now_millis();
        let iat = now_ms / 1000;
        let exp = iat + keys.ttl_secs;

        let claims = TokenClaims {
            sub: subject.user_id.clone(),
            email: subject.email.clone(),
            role: subject.role,
            jti: uuid::Uuid::new_v4().to_string(),
            iat,
            exp,
            typ: kind,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))?;

        Ok(IssuedToken {
            token,
            jti: claims.jti,
            expires_at: exp * 1000,
        })
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims> {
        let data = decode::<TokenClaims>(token, &self.keys(kind).decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, kind = ?kind, "Token rejected");
                invalid_token()
            })?;
        let claims = data.claims;

        if claims.typ != kind {
            tracing::debug!(expected = ?kind, actual = ?claims.typ, "Token kind mismatch");
            return Err(invalid_token());
        }
        if self.time_provider.now_millis() / 1000 >= claims.exp {
            return Err(invalid_token());
        }

        Ok(claims)
    }
}
