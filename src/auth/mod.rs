//! Authentication and authorization for Huddle
//!
//! Provides:
//! - JWT token generation and validation
//! - Password hashing with Argon2
//! - The authenticated principal handed to the core components

pub mod jwt;
pub mod password;
pub mod principal;

pub use jwt::{extract_token_from_header, Claims, JwtValidator};
pub use password::{hash_password, verify_password};
pub use principal::{Principal, Role};
