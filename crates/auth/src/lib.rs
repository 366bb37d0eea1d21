//! `storefront-auth`: authentication and ownership boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it verifies
//! bearer tokens issued by the hosted identity provider and answers
//! "does this caller own that row?".

pub mod authorize;
pub mod claims;
pub mod validator;

pub use authorize::{AuthzError, authorize_owner};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use validator::{Hs256JwtValidator, JwtValidator};
