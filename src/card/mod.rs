//! Card lifecycle and transfer engine
//!
//! PostgreSQL-backed card records: lazy expiry reconciliation, the
//! ACTIVE/BLOCKED/EXPIRED state machine and atomic intra-owner transfers.

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use models::{Card, CardDto, CardStatus, CreateCardRequest, TransferRequest};
pub use repository::CardRepository;
pub use service::CardService;
