//! CardVault - Bank Card Management Service
//!
//! Card records with decimal balances, owned by users, with intra-owner
//! balance transfers and JWT role-based access control.
//!
//! # Modules
//!
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing setup (file + stdout)
//! - [`db`] - PostgreSQL pool and schema bootstrap
//! - [`error`] - API error taxonomy and HTTP mapping
//! - [`auth`] - password hashing, JWT issuance/validation, request identity
//! - [`card`] - card lifecycle and transfer engine
//! - [`user`] - user management (admin)
//! - [`gateway`] - axum router, handlers glue, OpenAPI docs

pub mod config;
pub mod db;
pub mod error;
pub mod logging;

pub mod auth;
pub mod card;
pub mod gateway;
pub mod user;

// Convenient re-exports at crate root
pub use config::AppConfig;
pub use db::Database;
pub use error::ApiError;
