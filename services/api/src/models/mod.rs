//! Domain models and request/response payloads

pub mod account;
pub mod internship;
pub mod profile;

// Re-export for convenience
pub use account::{Account, Credentials, NewAccount};
pub use internship::{Internship, InternshipInput};
pub use profile::{Profile, ProfileInput};
