//! `warden-infra` — storage adapters for the registry.
//!
//! The `Directory` port abstracts the relational store; `InMemoryDirectory`
//! backs tests and dev mode, `PostgresDirectory` backs deployments.

pub mod directory;
pub mod seed;

pub use directory::{Directory, InMemoryDirectory, PostgresDirectory};
pub use seed::{DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD, seed_defaults};
