//! Client credentials, access tokens, and the token lifecycle.

pub mod credentials;
pub mod manager;
pub mod secret;
pub mod token;

pub use credentials::*;
pub use manager::*;
pub use secret::*;
pub use token::*;
