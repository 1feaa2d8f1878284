//! User management (admin-only surface)

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use models::{User, UserDto};
pub use repository::UserRepository;
pub use service::UserService;
