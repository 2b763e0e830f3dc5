/// Authentication module
///
/// Session token issuance/validation, password hashing, and the
/// register/login/refresh flows built on them.

mod claims;
mod jwt;
mod password;
mod service;

pub use claims::{Claims, TokenKind};
pub use jwt::TokenService;
pub use password::{validate_password_strength, PasswordHasher};
pub use service::AuthService;
