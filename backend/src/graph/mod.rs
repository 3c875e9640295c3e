//! Talk to Microsoft Graph on behalf of a signed in user.

mod config;
pub use config::*;

mod errors;
pub use errors::*;

mod session;
pub use session::*;
