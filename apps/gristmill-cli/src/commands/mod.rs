//! CLI subcommand implementations

pub mod access;
pub mod map;
pub mod orgs;
pub mod reconcile;
pub mod users;
