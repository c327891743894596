//! JWT token issuance and Argon2 password hashing.

pub mod jwt;
pub mod password;

pub use jwt::{JwtConfig, JwtTokenService};
pub use password::{Argon2Config, Argon2PasswordService};
