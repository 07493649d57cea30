//! Session Guard Library
//!
//! Represents who is acting in the portal and gates the admin and resident
//! pages by role. Sits directly on top of the record store.

mod guard;
pub mod session;

pub use guard::SessionGuard;
pub use session::{Redirect, Session};
