//! Authentication for the roomfinder server.
//!
//! Passwords are stored as argon2id hashes. A signed-in user carries an
//! HttpOnly `session` cookie holding a JWT whose subject is the username.

pub mod claims;
pub mod cookies;
pub mod extract;
pub mod password;
pub mod session;

pub use claims::Claims;
pub use extract::{AdminUser, AuthUser};
pub use session::SessionManager;
