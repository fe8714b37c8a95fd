//! Shared building blocks for the guildgate login pipeline.
//!
//! This crate holds the identifier types that cross crate boundaries
//! (accounts, identity links, queued jobs) and the `Result` alias every
//! other crate reports errors through.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{IdentityLinkId, JobId, ParseIdError, UserId};
