// Token Service Port (signed session tokens)

use crate::domain::{AuthenticatedUser, Role, User, UserId};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Which of the two token families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, sent on every request
    Access,
    /// Long-lived, exchanged for a new pair and rotated on use
    Refresh,
}

/// Identity baked into a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

impl From<&User> for TokenSubject {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Verified token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: UserId,
    pub email: String,
    pub role: Role,
    /// Unique token id
    pub jti: String,
    /// Issued at (epoch seconds)
    pub iat: i64,
    /// Expiry (epoch seconds)
    pub exp: i64,
    pub typ: TokenKind,
}

impl TokenClaims {
    pub fn user(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: self.sub.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// A signed token and its bookkeeping data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    /// Expiry (epoch ms)
    pub expires_at: i64,
}

/// Issues and verifies signed tokens
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, subject: &TokenSubject, kind: TokenKind) -> Result<IssuedToken>;

    /// Verify signature, expiry and kind
    ///
    /// # Errors
    /// `AppError::Unauthorized` for any invalid token
    fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims>;
}
