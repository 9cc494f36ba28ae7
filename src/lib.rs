//! Roster availability tracking and push notification dispatch for
//! recurring team matches.
//!
//! The crate owns the match entity and its per-member attendance map,
//! fans out push announcements whenever a match is created or changed,
//! and keeps a ledger of partial delivery failures. Persistence, the
//! member directory and the push transport are injected collaborators
//! behind traits, with MongoDB, HTTP and Firebase Cloud Messaging
//! backends provided under feature flags.

pub mod config;
pub mod dao;
pub mod directory;
pub mod dto;
pub mod error;
pub mod push;
pub mod services;
