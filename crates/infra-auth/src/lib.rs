// Folio Infrastructure - Authentication Adapters
// Implements: TokenService (HS256 JWT), PasswordHasher (Argon2id)

mod jwt;
mod password;

pub use jwt::{JwtConfig, JwtTokenService, MIN_SECRET_LENGTH};
pub use password::Argon2PasswordHasher;
