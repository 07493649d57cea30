//! Domain layer - Core portal entities and value objects.
//!
//! This crate contains pure domain logic with no storage or runtime
//! dependencies. Every other crate in the workspace builds on these types.

pub mod calendar;
pub mod constants;
pub mod display;
pub mod error;
pub mod password;
pub mod profile;
pub mod user;
pub mod wifi;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use password::Password;
pub use profile::{
    BillingHistoryEntry, HistoryItemUpdate, Message, NewHistoryItem, NewMessage, PaymentStatus,
    Profile, ProfileUpdate,
};
pub use user::{CreateUser, SessionUser, UpdateUser, User, UserChanges, UserRole};
