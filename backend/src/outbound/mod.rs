//! Outbound adapters: persistence, mail and third-party identity.

pub mod google;
pub mod mail;
pub mod persistence;
