//! Unit tests for the auth flows (ports mocked)

use super::*;
use crate::port::id_provider::testing::SequentialIds;
use crate::port::password_hasher::MockPasswordHasher;
use crate::port::session_repository::MockSessionRepository;
use crate::port::time_provider::testing::ManualClock;
use crate::port::token_service::MockTokenService;
use crate::port::user_repository::MockUserRepository;
use crate::port::{IssuedToken, TokenClaims};

const NOW: i64 = 1_700_000_000_000;

fn user(role: Role) -> User {
    User {
        id: "u1".to_string(),
        email: "admin@example.com".to_string(),
        password_hash: "hashed:correct-horse".to_string(),
        role,
        last_login: None,
        created_at: 1,
        updated_at: 1,
    }
}

fn token_mock() -> MockTokenService {
    let mut tokens = MockTokenService::new();
    tokens.expect_issue().returning(|subject, kind| {
        let name = match kind {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        };
        Ok(IssuedToken {
            token: format!("{}-token-{}", name, subject.user_id),
            jti: format!("{}-jti", name),
            expires_at: NOW + 1000,
        })
    });
    tokens
}

fn claims(sub: &str, jti: &str) -> TokenClaims {
    TokenClaims {
        sub: sub.to_string(),
        email: "admin@example.com".to_string(),
        role: Role::Admin,
        jti: jti.to_string(),
        iat: 0,
        exp: 0,
        typ: TokenKind::Refresh,
    }
}

fn hasher_mock() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|pw| Ok(format!("hashed:{}", pw)));
    hasher
        .expect_verify()
        .returning(|pw, hash| Ok(hash == format!("hashed:{}", pw)));
    hasher
}

fn service(
    users: MockUserRepository,
    sessions: MockSessionRepository,
    tokens: MockTokenService,
    settings: AuthSettings,
) -> AuthService {
    service_with_hasher(users, sessions, tokens, hasher_mock(), settings)
}

fn service_with_hasher(
    users: MockUserRepository,
    sessions: MockSessionRepository,
    tokens: MockTokenService,
    hasher: MockPasswordHasher,
    settings: AuthSettings,
) -> AuthService {
    AuthService::new(
        Arc::new(users),
        Arc::new(sessions),
        Arc::new(tokens),
        Arc::new(hasher),
        Arc::new(SequentialIds::default()),
        Arc::new(ManualClock::new(NOW)),
        settings,
    )
}

fn caller() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: "u1".into(),
        email: "admin@example.com".into(),
        role: Role::Admin,
    }
}

#[tokio::test]
async fn test_login_unknown_user_is_rejected() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));

    let svc = service(
        users,
        MockSessionRepository::new(),
        MockTokenService::new(),
        AuthSettings::default(),
    );

    let outcome = svc.login("nobody@example.com", "whatever1").await.unwrap();
    assert!(matches!(
        outcome,
        LoginOutcome::Rejected(LoginRejection::UserNotFound)
    ));
}

#[tokio::test]
async fn test_login_unknown_user_still_runs_password_check() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));

    let mut hasher = MockPasswordHasher::new();
    // The reference hash is computed once and reused
    hasher
        .expect_hash()
        .times(1)
        .returning(|pw| Ok(format!("hashed:{}", pw)));
    hasher
        .expect_verify()
        .withf(|pw, hash| pw == "whatever1" && hash.starts_with("hashed:"))
        .times(2)
        .returning(|_, _| Ok(false));

    let svc = service_with_hasher(
        users,
        MockSessionRepository::new(),
        MockTokenService::new(),
        hasher,
        AuthSettings::default(),
    );

    for _ in 0..2 {
        let outcome = svc.login("nobody@example.com", "whatever1").await.unwrap();
        assert!(matches!(
            outcome,
            LoginOutcome::Rejected(LoginRejection::UserNotFound)
        ));
    }
}

#[tokio::test]
async fn test_login_wrong_password_is_rejected() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .returning(|_| Ok(Some(user(Role::Admin))));

    let svc = service(
        users,
        MockSessionRepository::new(),
        MockTokenService::new(),
        AuthSettings::default(),
    );

    let outcome = svc.login("admin@example.com", "wrong-pass").await.unwrap();
    match outcome {
        LoginOutcome::Rejected(reason) => assert_eq!(reason.reason(), "Invalid password"),
        LoginOutcome::Success(_) => panic!("login should fail"),
    }
}

#[tokio::test]
async fn test_login_success_stores_refresh_session() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .withf(|email| email == "admin@example.com")
        .returning(|_| Ok(Some(user(Role::Admin))));
    users
        .expect_update_last_login()
        .withf(|id, at| id == "u1" && *at == NOW)
        .times(1)
        .returning(|_, _| Ok(()));

    let mut sessions = MockSessionRepository::new();
    sessions
        .expect_store()
        .withf(|s| s.jti == "refresh-jti" && s.user_id == "u1")
        .times(1)
        .returning(|_| Ok(()));

    let svc = service(users, sessions, token_mock(), AuthSettings::default());

    // Email is normalized before lookup
    let outcome = svc
        .login("  Admin@Example.com ", "correct-horse")
        .await
        .unwrap();
    let LoginOutcome::Success(session) = outcome else {
        panic!("expected success");
    };
    assert_eq!(session.access_token, "access-token-u1");
    assert_eq!(session.refresh_token, "refresh-token-u1");
    assert_eq!(session.user.last_login, Some(NOW));
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let svc = service(
        MockUserRepository::new(),
        MockSessionRepository::new(),
        MockTokenService::new(),
        AuthSettings::default(),
    );
    let err = svc.login("", "secret").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_refresh_requires_token() {
    let svc = service(
        MockUserRepository::new(),
        MockSessionRepository::new(),
        MockTokenService::new(),
        AuthSettings::default(),
    );
    let err = svc.refresh(None).await.unwrap_err();
    assert_eq!(err.public_message(), "Refresh token is required");
}

#[tokio::test]
async fn test_refresh_rejects_bad_signature() {
    let mut tokens = MockTokenService::new();
    tokens
        .expect_verify()
        .returning(|_, _| Err(AppError::Unauthorized("bad signature".into())));

    let svc = service(
        MockUserRepository::new(),
        MockSessionRepository::new(),
        tokens,
        AuthSettings::default(),
    );
    let err = svc.refresh(Some("garbage")).await.unwrap_err();
    assert_eq!(err.public_message(), "Invalid or expired refresh token");
}

#[tokio::test]
async fn test_refresh_rotates_session() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|_| Ok(Some(user(Role::Admin))));

    let mut tokens = token_mock();
    tokens
        .expect_verify()
        .withf(|_, kind| *kind == TokenKind::Refresh)
        .returning(|_, _| Ok(claims("u1", "old-jti")));

    let mut sessions = MockSessionRepository::new();
    sessions
        .expect_exists()
        .withf(|user_id, jti| user_id == "u1" && jti == "old-jti")
        .times(1)
        .returning(|_, _| Ok(true));
    sessions
        .expect_rotate()
        .withf(|user_id, old, next| user_id == "u1" && old == "old-jti" && next.jti == "refresh-jti")
        .times(1)
        .returning(|_, _, _| Ok(true));

    let svc = service(users, sessions, tokens, AuthSettings::default());
    let session = svc.refresh(Some("refresh-token")).await.unwrap();
    assert_eq!(session.refresh_token, "refresh-token-u1");
}

#[tokio::test]
async fn test_refresh_with_rotated_token_fails() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|_| Ok(Some(user(Role::Admin))));

    // No issue expectation: a token that is not stored never gets a new pair
    let mut tokens = MockTokenService::new();
    tokens
        .expect_verify()
        .returning(|_, _| Ok(claims("u1", "stale-jti")));

    let mut sessions = MockSessionRepository::new();
    sessions.expect_exists().returning(|_, _| Ok(false));

    let svc = service(users, sessions, tokens, AuthSettings::default());
    let err = svc.refresh(Some("refresh-token")).await.unwrap_err();
    assert_eq!(err.public_message(), "Invalid refresh token");
}

#[tokio::test]
async fn test_refresh_losing_concurrent_rotation_fails() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|_| Ok(Some(user(Role::Admin))));

    let mut tokens = token_mock();
    tokens
        .expect_verify()
        .returning(|_, _| Ok(claims("u1", "raced-jti")));

    let mut sessions = MockSessionRepository::new();
    sessions.expect_exists().returning(|_, _| Ok(true));
    sessions.expect_rotate().times(1).returning(|_, _, _| Ok(false));

    let svc = service(users, sessions, tokens, AuthSettings::default());
    let err = svc.refresh(Some("refresh-token")).await.unwrap_err();
    assert_eq!(err.public_message(), "Invalid refresh token");
}

#[tokio::test]
async fn test_refresh_for_deleted_user_fails() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));

    let mut tokens = MockTokenService::new();
    tokens
        .expect_verify()
        .returning(|_, _| Ok(claims("gone", "jti")));

    let svc = service(
        users,
        MockSessionRepository::new(),
        tokens,
        AuthSettings::default(),
    );
    let err = svc.refresh(Some("refresh-token")).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn test_register_short_password() {
    let svc = service(
        MockUserRepository::new(),
        MockSessionRepository::new(),
        MockTokenService::new(),
        AuthSettings::default(),
    );
    let err = svc
        .register(
            RegisterRequest {
                email: "new@example.com".into(),
                password: "short".into(),
                role: None,
            },
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.public_message(),
        "Password must be at least 8 characters long"
    );
}

#[tokio::test]
async fn test_first_registration_becomes_super_admin() {
    let mut users = MockUserRepository::new();
    users.expect_count().returning(|| Ok(0));
    users.expect_find_by_email().returning(|_| Ok(None));
    users
        .expect_insert()
        .withf(|u| u.role == Role::SuperAdmin && u.password_hash == "hashed:long-enough")
        .times(1)
        .returning(|_| Ok(()));

    let svc = service(
        users,
        MockSessionRepository::new(),
        MockTokenService::new(),
        AuthSettings::default(),
    );
    let profile = svc
        .register(
            RegisterRequest {
                email: "Owner@Example.com".into(),
                password: "long-enough".into(),
                role: None,
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(profile.email, "owner@example.com");
    assert_eq!(profile.role, Role::SuperAdmin);
}

#[tokio::test]
async fn test_registration_closed_for_admins() {
    let mut users = MockUserRepository::new();
    users.expect_count().returning(|| Ok(1));

    let svc = service(
        users,
        MockSessionRepository::new(),
        MockTokenService::new(),
        AuthSettings::default(),
    );
    let err = svc
        .register(
            RegisterRequest {
                email: "second@example.com".into(),
                password: "long-enough".into(),
                role: Some(Role::SuperAdmin),
            },
            Some(&caller()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let mut users = MockUserRepository::new();
    users.expect_count().returning(|| Ok(1));
    users
        .expect_find_by_email()
        .returning(|_| Ok(Some(user(Role::Admin))));

    let svc = service(
        users,
        MockSessionRepository::new(),
        MockTokenService::new(),
        AuthSettings {
            open_registration: true,
        },
    );
    let err = svc
        .register(
            RegisterRequest {
                email: "admin@example.com".into(),
                password: "long-enough".into(),
                role: None,
            },
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.public_message(), "User already exists with this email");
}

#[tokio::test]
async fn test_logout_ignores_foreign_token() {
    let mut tokens = MockTokenService::new();
    tokens
        .expect_verify()
        .returning(|_, _| Ok(claims("someone-else", "jti")));

    // No revoke expectation: calling it would panic
    let svc = service(
        MockUserRepository::new(),
        MockSessionRepository::new(),
        tokens,
        AuthSettings::default(),
    );
    assert!(!svc.logout(Some("tok"), Some(&caller())).await.unwrap());
    assert!(!svc.logout(None, Some(&caller())).await.unwrap());
}

#[tokio::test]
async fn test_logout_everywhere_revokes_all_user_sessions() {
    let mut sessions = MockSessionRepository::new();
    sessions
        .expect_revoke_all()
        .withf(|user_id| user_id == "u1")
        .times(1)
        .returning(|_| Ok(3));

    let svc = service(
        MockUserRepository::new(),
        sessions,
        MockTokenService::new(),
        AuthSettings::default(),
    );
    assert_eq!(svc.logout_everywhere(&caller()).await.unwrap(), 3);
}
