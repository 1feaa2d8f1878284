//! Card data model and pure lifecycle rules
//!
//! The status state machine and the expiry reconciliation rule live here as
//! plain functions so they can be tested without a database. Persistence of
//! a reconciled status is the caller's job (see [`crate::card::service`]).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::ApiError;

/// Card status, stored as SMALLINT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum CardStatus {
    Active = 1,
    Blocked = 2,
    Expired = 3,
}

impl CardStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CardStatus::Active => "ACTIVE",
            CardStatus::Blocked => "BLOCKED",
            CardStatus::Expired => "EXPIRED",
        }
    }

    /// Parse the wire representation used by the status-update endpoint
    pub fn parse(s: &str) -> Result<Self, ApiError> {
        match s {
            "ACTIVE" => Ok(CardStatus::Active),
            "BLOCKED" => Ok(CardStatus::Blocked),
            "EXPIRED" => Ok(CardStatus::Expired),
            other => Err(ApiError::InvalidArgument(format!(
                "Unknown card status: {}",
                other
            ))),
        }
    }
}

impl From<i16> for CardStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => CardStatus::Active,
            3 => CardStatus::Expired,
            // Unknown values read as BLOCKED: the card stays visible but
            // cannot move funds until an admin repairs it.
            _ => CardStatus::Blocked,
        }
    }
}

/// Card row joined with its owner's username
#[derive(Debug, Clone, FromRow)]
pub struct Card {
    pub card_id: i64,
    pub number: String,
    pub owner_id: i64,
    /// None when the owner row could not be resolved
    pub owner_username: Option<String>,
    pub expiry_date: NaiveDate,
    #[sqlx(try_from = "i16")]
    pub status: CardStatus,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn to_dto(&self) -> CardDto {
        CardDto {
            id: self.card_id,
            number: mask_card_number(&self.number),
            owner: self.owner_username.clone().unwrap_or_default(),
            expiry_date: self.expiry_date,
            status: self.status.as_str().to_string(),
            balance: self.balance,
            created_at: self.created_at,
        }
    }
}

/// Card as rendered to clients; the number is always masked
#[derive(Debug, Serialize, ToSchema)]
pub struct CardDto {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "**** **** **** 5678")]
    pub number: String,
    #[schema(example = "john_doe")]
    pub owner: String,
    #[schema(example = "2027-12-31")]
    pub expiry_date: NaiveDate,
    #[schema(example = "ACTIVE")]
    pub status: String,
    #[schema(example = "1000.50")]
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Card creation request (admin only)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCardRequest {
    /// Card number; surrounding spaces and dashes are stripped before storage
    #[validate(length(min = 1))]
    #[schema(example = "1234 5678 1234 5678")]
    pub number: String,
    /// Username of the card owner
    #[validate(length(min = 1))]
    #[schema(example = "john_doe")]
    pub owner: String,
    #[schema(example = "2027-12-31")]
    pub expiry_date: NaiveDate,
    /// Initial balance; defaults to zero
    #[schema(example = "100.00")]
    pub balance: Option<Decimal>,
}

/// Transfer request: move `amount` between two cards of the same owner
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferRequest {
    #[schema(example = 1)]
    pub from_card_id: i64,
    #[schema(example = 2)]
    pub to_card_id: i64,
    #[schema(example = "25.00")]
    pub amount: Decimal,
}

/// Balance view returned by the balance endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceDto {
    pub id: i64,
    #[schema(example = "1000.50")]
    pub balance: Decimal,
}

/// Expiry reconciliation: the corrected status for `today`.
///
/// A card whose expiry date is strictly before today must read EXPIRED;
/// anything else keeps its stored status. Returns `None` when no change
/// is needed, so callers know whether to persist.
pub fn reconcile_status(status: CardStatus, expiry_date: NaiveDate, today: NaiveDate) -> Option<CardStatus> {
    if expiry_date < today && status != CardStatus::Expired {
        Some(CardStatus::Expired)
    } else {
        None
    }
}

/// Mask a card number for display.
///
/// Length >= 4 renders as `**** **** **** ` + last 4 characters;
/// anything shorter renders as `****`.
pub fn mask_card_number(number: &str) -> String {
    let chars: Vec<char> = number.chars().collect();
    if chars.len() < 4 {
        return "****".to_string();
    }
    let last4: String = chars[chars.len() - 4..].iter().collect();
    format!("**** **** **** {}", last4)
}

/// Strip spaces and dashes from a raw card number
pub fn normalize_card_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_status_round_trip() {
        for status in [CardStatus::Active, CardStatus::Blocked, CardStatus::Expired] {
            assert_eq!(CardStatus::from(status as i16), status);
            assert_eq!(CardStatus::parse(status.as_str()).unwrap(), status);
        }
        // unknown stored values degrade to the fail-safe state
        assert_eq!(CardStatus::from(0), CardStatus::Blocked);
        assert!(CardStatus::parse("FROZEN").is_err());
    }

    #[test]
    fn test_reconcile_expired_card() {
        let today = d(2026, 6, 15);
        // expiry strictly before today -> Expired
        assert_eq!(
            reconcile_status(CardStatus::Active, d(2026, 6, 14), today),
            Some(CardStatus::Expired)
        );
        assert_eq!(
            reconcile_status(CardStatus::Blocked, d(2025, 1, 1), today),
            Some(CardStatus::Expired)
        );
    }

    #[test]
    fn test_reconcile_no_change_on_boundary() {
        let today = d(2026, 6, 15);
        // expiring today is not yet expired
        assert_eq!(reconcile_status(CardStatus::Active, today, today), None);
        assert_eq!(
            reconcile_status(CardStatus::Active, d(2026, 6, 16), today),
            None
        );
        // already expired: nothing to persist
        assert_eq!(
            reconcile_status(CardStatus::Expired, d(2020, 1, 1), today),
            None
        );
    }

    #[test]
    fn test_mask_card_number() {
        assert_eq!(mask_card_number("1234567812345678"), "**** **** **** 5678");
        assert_eq!(mask_card_number("9876"), "**** **** **** 9876");
        assert_eq!(mask_card_number("123"), "****");
        assert_eq!(mask_card_number(""), "****");
    }

    #[test]
    fn test_normalize_card_number() {
        assert_eq!(normalize_card_number("1234 5678-1234 5678"), "1234567812345678");
        assert_eq!(normalize_card_number(" 1111222233334444 "), "1111222233334444");
    }
}
