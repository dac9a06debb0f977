// Auth Service - login, refresh-token rotation, logout, registration

use crate::domain::{AuthenticatedUser, RefreshSession, Role, User, UserProfile};
use crate::error::{AppError, Result};
use crate::port::{
    IdProvider, PasswordHasher, SessionRepository, TimeProvider, TokenKind, TokenService,
    TokenSubject, UserRepository,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

#[cfg(test)]
mod auth_test;

/// Minimum accepted password length (characters)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hashed once per process; logins for unknown emails verify against it
const TIMING_DUMMY_PASSWORD: &str = "folio-timing-dummy-password";

/// Registration request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Why a login attempt was refused (never shown to the client)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginRejection {
    UserNotFound,
    InvalidPassword,
}

impl LoginRejection {
    pub fn reason(&self) -> &'static str {
        match self {
            LoginRejection::UserNotFound => "User not found",
            LoginRejection::InvalidPassword => "Invalid password",
        }
    }
}

/// Freshly issued token pair
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Success(Session),
    Rejected(LoginRejection),
}

/// Auth behaviour switches
#[derive(Debug, Clone, Default)]
pub struct AuthSettings {
    /// Anyone may register (otherwise super-admins only, after bootstrap)
    pub open_registration: bool,
}

/// Auth Service
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    tokens: Arc<dyn TokenService>,
    hasher: Arc<dyn PasswordHasher>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    settings: AuthSettings,
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        tokens: Arc<dyn TokenService>,
        hasher: Arc<dyn PasswordHasher>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            sessions,
            tokens,
            hasher,
            id_provider,
            time_provider,
            settings,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Create an admin account
    ///
    /// # Arguments
    /// * `req` - Email, password and optional role
    /// * `caller` - Authenticated caller, if any
    pub async fn register(
        &self,
        req: RegisterRequest,
        caller: Option<&AuthenticatedUser>,
    ) -> Result<UserProfile> {
        let email = User::normalize_email(&req.email);
        if email.is_empty() || req.password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        if req.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }

        let caller_is_super = caller.is_some_and(AuthenticatedUser::is_super_admin);
        let bootstrap = self.users.count().await? == 0;
        if !bootstrap && !caller_is_super && !self.settings.open_registration {
            return Err(AppError::Forbidden(
                "Only a super-admin can register new users".to_string(),
            ));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(user_exists());
        }

        // First account owns the installation; only super-admins hand out super-admin
        let role = if bootstrap {
            Role::SuperAdmin
        } else if caller_is_super {
            req.role.unwrap_or_default()
        } else {
            Role::Admin
        };

        self.create_user(email, &req.password, role).await
    }

    /// Create the first super-admin when the user table is empty
    ///
    /// # Returns
    /// The new profile, or `None` if accounts already exist
    pub async fn ensure_bootstrap_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserProfile>> {
        if self.users.count().await? > 0 {
            return Ok(None);
        }
        let email = User::normalize_email(email);
        if email.is_empty() || password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Config(
                "Bootstrap admin needs an email and a password of at least 8 characters"
                    .to_string(),
            ));
        }
        let profile = self.create_user(email, password, Role::SuperAdmin).await?;
        info!(email = %profile.email, "Bootstrap super-admin created");
        Ok(Some(profile))
    }

    async fn create_user(&self, email: String, password: &str, role: Role) -> Result<UserProfile> {
        let now = self.time_provider.now_millis();
        let user = User {
            id: self.id_provider.generate_id(),
            email,
            password_hash: self.hasher.hash(password).await?,
            role,
            last_login: None,
            created_at: now,
            updated_at: now,
        };

        match self.users.insert(&user).await {
            Ok(()) => Ok(user.profile()),
            // Lost a race against a concurrent registration
            Err(AppError::Conflict(_)) => Err(user_exists()),
            Err(e) => Err(e),
        }
    }

    /// Check credentials and open a session
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let email = User::normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let Some(mut user) = self.users.find_by_email(&email).await? else {
            // Same hashing work as a wrong password, so response time does not reveal the email
            self.verify_dummy(password).await?;
            return Ok(LoginOutcome::Rejected(LoginRejection::UserNotFound));
        };

        if !self.hasher.verify(password, &user.password_hash).await? {
            return Ok(LoginOutcome::Rejected(LoginRejection::InvalidPassword));
        }

        let session = self.open_session(&user).await?;

        let now = self.time_provider.now_millis();
        self.users.update_last_login(&user.id, now).await?;
        user.last_login = Some(now);

        info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome::Success(Session {
            user: user.profile(),
            ..session
        }))
    }

    /// Exchange a refresh token for a new pair, rotating the stored token
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<Session> {
        let token = refresh_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Refresh token is required".to_string()))?;

        let claims = self
            .tokens
            .verify(token, TokenKind::Refresh)
            .map_err(|_| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

        let user = self
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(invalid_refresh)?;

        if !self.sessions.exists(&user.id, &claims.jti).await? {
            warn!(user_id = %user.id, "Refresh token not recognised (revoked or already rotated)");
            return Err(invalid_refresh());
        }

        let subject = TokenSubject::from(&user);
        let access = self.tokens.issue(&subject, TokenKind::Access)?;
        let refresh = self.tokens.issue(&subject, TokenKind::Refresh)?;

        let next = RefreshSession {
            jti: refresh.jti,
            user_id: user.id.clone(),
            expires_at: refresh.expires_at,
            created_at: self.time_provider.now_millis(),
        };

        // Another request may have rotated the same token since the check above
        if !self.sessions.rotate(&user.id, &claims.jti, &next).await? {
            warn!(user_id = %user.id, "Refresh token lost a concurrent rotation");
            return Err(invalid_refresh());
        }

        Ok(Session {
            user: user.profile(),
            access_token: access.token,
            refresh_token: refresh.token,
        })
    }

    /// Revoke the refresh session belonging to `user`
    ///
    /// # Returns
    /// `true` if a stored session was removed
    pub async fn logout(
        &self,
        refresh_token: Option<&str>,
        user: Option<&AuthenticatedUser>,
    ) -> Result<bool> {
        let (Some(token), Some(user)) = (refresh_token, user) else {
            return Ok(false);
        };

        match self.tokens.verify(token, TokenKind::Refresh) {
            Ok(claims) if claims.sub == user.user_id => {
                self.sessions.revoke(&user.user_id, &claims.jti).await
            }
            _ => Ok(false),
        }
    }

    /// Revoke every refresh session of `user` (sign out on all devices)
    ///
    /// # Returns
    /// Number of sessions removed
    pub async fn logout_everywhere(&self, user: &AuthenticatedUser) -> Result<u64> {
        let revoked = self.sessions.revoke_all(&user.user_id).await?;
        info!(user_id = %user.user_id, revoked, "All sessions revoked");
        Ok(revoked)
    }

    /// Resolve an access token to the caller's identity
    pub fn authenticate(&self, access_token: &str) -> Result<AuthenticatedUser> {
        self.tokens
            .verify(access_token, TokenKind::Access)
            .map(|claims| claims.user())
            .map_err(|_| AppError::Unauthorized("Unauthorized".to_string()))
    }

    /// Profile of the authenticated user
    pub async fn me(&self, user_id: &str) -> Result<UserProfile> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|u| u.profile())
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn verify_dummy(&self, password: &str) -> Result<()> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| self.hasher.hash(TIMING_DUMMY_PASSWORD))
            .await?;
        self.hasher.verify(password, hash).await?;
        Ok(())
    }

    async fn open_session(&self, user: &User) -> Result<Session> {
        let subject = TokenSubject::from(user);
        let access = self.tokens.issue(&subject, TokenKind::Access)?;
        let refresh = self.tokens.issue(&subject, TokenKind::Refresh)?;

        self.sessions
            .store(&RefreshSession {
                jti: refresh.jti,
                user_id: user.id.clone(),
                expires_at: refresh.expires_at,
                created_at: self.time_provider.now_millis(),
            })
            .await?;

        Ok(Session {
            user: user.profile(),
            access_token: access.token,
            refresh_token: refresh.token,
        })
    }
}

fn user_exists() -> AppError {
    AppError::Conflict("User already exists with this email".to_string())
}

fn invalid_refresh() -> AppError {
    AppError::Unauthorized("Invalid refresh token".to_string())
}
