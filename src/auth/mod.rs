//! Identity verification. Tokens are minted by the external identity
//! provider; this service only validates them and extracts the user id.

mod claims;
pub(crate) mod extractors;

pub use claims::Claims;
pub use extractors::AuthUser;
