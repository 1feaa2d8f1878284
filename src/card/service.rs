//! Card lifecycle and transfer engine
//!
//! Every operation that loads a card runs expiry reconciliation first: a
//! card whose expiry date has passed is flipped to EXPIRED and persisted
//! before the requested operation proceeds. There is no background sweep;
//! a card nobody touches stays stale in storage until the next access.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::Row;

use super::models::{
    Card, CardStatus, CardDto, CreateCardRequest, TransferRequest, mask_card_number,
    normalize_card_number, reconcile_status,
};
use super::repository::CardRepository;
use crate::db::Database;
use crate::error::ApiError;
use crate::gateway::types::{Page, PageParams};
use crate::user::repository::UserRepository;

pub struct CardService;

impl CardService {
    /// Load a card by id, reconciling its expiry status first
    async fn load(db: &Database, card_id: i64) -> Result<Card, ApiError> {
        let mut card = CardRepository::find_by_id(db.pool(), card_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;
        Self::reconcile_and_persist(db, &mut card).await?;
        Ok(card)
    }

    /// Persist an expiry flip detected by [`reconcile_status`]
    async fn reconcile_and_persist(db: &Database, card: &mut Card) -> Result<(), ApiError> {
        let today = Utc::now().date_naive();
        if let Some(corrected) = reconcile_status(card.status, card.expiry_date, today) {
            CardRepository::set_status(db.pool(), card.card_id, corrected as i16).await?;
            tracing::info!(card_id = card.card_id, "card expired, status reconciled");
            card.status = corrected;
        }
        Ok(())
    }

    pub async fn get_card(db: &Database, card_id: i64) -> Result<CardDto, ApiError> {
        Ok(Self::load(db, card_id).await?.to_dto())
    }

    pub async fn get_balance(db: &Database, card_id: i64) -> Result<Decimal, ApiError> {
        Ok(Self::load(db, card_id).await?.balance)
    }

    /// All cards, paginated (admin view)
    pub async fn list_all(db: &Database, params: PageParams) -> Result<Page<CardDto>, ApiError> {
        let (_, size) = params.normalized();
        let mut cards = CardRepository::list_all(db.pool(), size, params.offset()).await?;
        let total = CardRepository::count_all(db.pool()).await?;
        let mut items = Vec::with_capacity(cards.len());
        for card in cards.iter_mut() {
            Self::reconcile_and_persist(db, card).await?;
            items.push(card.to_dto());
        }
        Ok(Page::new(items, params, total))
    }

    /// Cards of one owner. `substring` switches between the exact match used
    /// for "my cards" and the case-insensitive search admins get.
    pub async fn list_by_owner(
        db: &Database,
        owner: &str,
        substring: bool,
        params: PageParams,
    ) -> Result<Page<CardDto>, ApiError> {
        let (_, size) = params.normalized();
        let offset = params.offset();
        let (mut cards, total) = if substring {
            (
                CardRepository::list_by_owner_like(db.pool(), owner, size, offset).await?,
                CardRepository::count_by_owner_like(db.pool(), owner).await?,
            )
        } else {
            (
                CardRepository::list_by_owner(db.pool(), owner, size, offset).await?,
                CardRepository::count_by_owner(db.pool(), owner).await?,
            )
        };
        let mut items = Vec::with_capacity(cards.len());
        for card in cards.iter_mut() {
            Self::reconcile_and_persist(db, card).await?;
            items.push(card.to_dto());
        }
        Ok(Page::new(items, params, total))
    }

    /// Create a card for an existing owner. Status is forced to ACTIVE
    /// regardless of input; balance defaults to zero.
    pub async fn create_card(db: &Database, req: CreateCardRequest) -> Result<CardDto, ApiError> {
        let owner = UserRepository::find_by_username(db.pool(), &req.owner)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let number = normalize_card_number(&req.number);
        if number.len() < 12 || number.len() > 19 {
            return Err(ApiError::InvalidArgument(
                "Card number must be 12 to 19 characters".to_string(),
            ));
        }

        let balance = req.balance.unwrap_or(Decimal::ZERO);
        if balance < Decimal::ZERO {
            return Err(ApiError::InvalidArgument(
                "Initial balance must not be negative".to_string(),
            ));
        }

        let card_id = CardRepository::insert(
            db.pool(),
            &number,
            owner.user_id,
            req.expiry_date,
            CardStatus::Active as i16,
            balance,
        )
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(dbe) if dbe.is_unique_violation() => {
                ApiError::InvalidArgument("Card number already exists".to_string())
            }
            _ => ApiError::from(e),
        })?;

        tracing::info!(card_id, owner = %req.owner, "card created");
        Self::get_card(db, card_id).await
    }

    /// Change a card's status.
    ///
    /// EXPIRED can never be assigned directly; it is derived from the expiry
    /// date alone. A card that is EXPIRED after reconciliation is terminal:
    /// no caller-initiated transition leaves that state.
    pub async fn update_status(
        db: &Database,
        card_id: i64,
        status: CardStatus,
    ) -> Result<CardDto, ApiError> {
        if status == CardStatus::Expired {
            return Err(ApiError::InvalidArgument(
                "Status EXPIRED is set automatically and cannot be assigned".to_string(),
            ));
        }

        let mut card = Self::load(db, card_id).await?;
        if card.status == CardStatus::Expired {
            return Err(ApiError::InvalidArgument(
                "Card is expired; its status can no longer be changed".to_string(),
            ));
        }

        CardRepository::set_status(db.pool(), card_id, status as i16).await?;
        card.status = status;
        tracing::info!(card_id, status = status.as_str(), "card status updated");
        Ok(card.to_dto())
    }

    pub async fn delete_card(db: &Database, card_id: i64) -> Result<(), ApiError> {
        let removed = CardRepository::delete(db.pool(), card_id).await?;
        if removed == 0 {
            return Err(ApiError::NotFound("Card not found".to_string()));
        }
        tracing::info!(card_id, "card deleted");
        Ok(())
    }

    /// Ownership predicate used by the authorization layer.
    /// A non-existent card is "not owned", not an error.
    pub async fn is_owner(
        db: &Database,
        card_id: i64,
        username: &str,
    ) -> Result<bool, ApiError> {
        let card = CardRepository::find_by_id(db.pool(), card_id).await?;
        Ok(card
            .and_then(|c| c.owner_username)
            .map(|owner| owner == username)
            .unwrap_or(false))
    }

    /// Transfer funds between two cards of the same owner.
    ///
    /// The two balance writes happen inside one transaction with both card
    /// rows locked `FOR UPDATE` (lower id first, so concurrent transfers on
    /// an overlapping card serialize instead of deadlocking). Either both
    /// updates commit or neither does.
    pub async fn transfer(db: &Database, req: TransferRequest) -> Result<(), ApiError> {
        if req.from_card_id == req.to_card_id {
            return Err(ApiError::InvalidArgument(
                "Cannot transfer to the same card".to_string(),
            ));
        }

        let mut tx = db.pool().begin().await?;

        let first_id = req.from_card_id.min(req.to_card_id);
        let second_id = req.from_card_id.max(req.to_card_id);

        let first = Self::lock_card(&mut tx, first_id).await?;
        let second = Self::lock_card(&mut tx, second_id).await?;

        let (from, to) = if first_id == req.from_card_id {
            (first, second)
        } else {
            (second, first)
        };

        let from =
            from.ok_or_else(|| ApiError::NotFound("Source card not found".to_string()))?;
        let to =
            to.ok_or_else(|| ApiError::NotFound("Destination card not found".to_string()))?;

        // Reconcile both sides inside the same transaction, so an expiry
        // flip and the rejection it causes are consistent. When validation
        // then rejects the transfer, the flip rolls back with everything
        // else; the stored status stays stale until the next access
        // reconciles it again.
        let from = Self::reconcile_in_tx(&mut tx, from).await?;
        let to = Self::reconcile_in_tx(&mut tx, to).await?;

        validate_transfer(&from, &to, req.amount)?;

        sqlx::query("UPDATE cards SET balance = balance - $1 WHERE card_id = $2")
            .bind(req.amount)
            .bind(from.card_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE cards SET balance = balance + $1 WHERE card_id = $2")
            .bind(req.amount)
            .bind(to.card_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            from = from.card_id,
            to = to.card_id,
            amount = %req.amount,
            "transfer completed"
        );
        Ok(())
    }

    async fn lock_card(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        card_id: i64,
    ) -> Result<Option<Card>, ApiError> {
        // Owner username is fetched in a second step; FOR UPDATE with an
        // outer join cannot lock the nullable side.
        let row = sqlx::query(
            r#"SELECT card_id, number, owner_id, expiry_date, status, balance, created_at
               FROM cards WHERE card_id = $1 FOR UPDATE"#,
        )
        .bind(card_id)
        .fetch_optional(&mut **tx)
        .await?;

        let Some(row) = row else { return Ok(None) };

        let status = CardStatus::from(row.get::<i16, _>("status"));
        let owner_id: i64 = row.get("owner_id");

        let owner_username: Option<String> =
            sqlx::query("SELECT username FROM users WHERE user_id = $1")
                .bind(owner_id)
                .fetch_optional(&mut **tx)
                .await?
                .map(|r| r.get("username"));

        Ok(Some(Card {
            card_id: row.get("card_id"),
            number: row.get("number"),
            owner_id,
            owner_username,
            expiry_date: row.get("expiry_date"),
            status,
            balance: row.get("balance"),
            created_at: row.get("created_at"),
        }))
    }

    async fn reconcile_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        mut card: Card,
    ) -> Result<Card, ApiError> {
        let today = Utc::now().date_naive();
        if let Some(corrected) = reconcile_status(card.status, card.expiry_date, today) {
            sqlx::query("UPDATE cards SET status = $1 WHERE card_id = $2")
                .bind(corrected as i16)
                .bind(card.card_id)
                .execute(&mut **tx)
                .await?;
            card.status = corrected;
        }
        Ok(card)
    }
}

/// The business-rule gauntlet a transfer must pass once both cards are
/// loaded, locked and reconciled. Pure so it can be tested directly.
pub fn validate_transfer(from: &Card, to: &Card, amount: Decimal) -> Result<(), ApiError> {
    let from_owner = from
        .owner_username
        .as_deref()
        .ok_or_else(|| ApiError::InvalidArgument("Card owner could not be resolved".to_string()))?;
    let to_owner = to
        .owner_username
        .as_deref()
        .ok_or_else(|| ApiError::InvalidArgument("Card owner could not be resolved".to_string()))?;

    if from_owner != to_owner {
        return Err(ApiError::InvalidArgument(
            "Transfers are only allowed between cards of the same owner".to_string(),
        ));
    }

    if amount <= Decimal::ZERO {
        return Err(ApiError::InvalidArgument(
            "Transfer amount must be positive".to_string(),
        ));
    }

    if from.balance < amount {
        return Err(ApiError::InsufficientBalance);
    }

    if from.status != CardStatus::Active || to.status != CardStatus::Active {
        return Err(ApiError::InvalidArgument(
            "Both cards must be active to transfer".to_string(),
        ));
    }

    // masked rendering is what ends up in logs, never the raw number
    tracing::debug!(
        from = %mask_card_number(&from.number),
        to = %mask_card_number(&to.number),
        "transfer validated"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn card(id: i64, owner: Option<&str>, status: CardStatus, balance: Decimal) -> Card {
        Card {
            card_id: id,
            number: "1234567812345678".to_string(),
            owner_id: 1,
            owner_username: owner.map(|s| s.to_string()),
            expiry_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            status,
            balance,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_transfer_happy_path_passes_validation() {
        let from = card(1, Some("alice"), CardStatus::Active, dec("100.00"));
        let to = card(2, Some("alice"), CardStatus::Active, dec("0.00"));
        assert!(validate_transfer(&from, &to, dec("100.00")).is_ok());
        assert!(validate_transfer(&from, &to, dec("0.01")).is_ok());
    }

    #[test]
    fn test_transfer_rejects_non_positive_amount() {
        let from = card(1, Some("alice"), CardStatus::Active, dec("100.00"));
        let to = card(2, Some("alice"), CardStatus::Active, dec("0.00"));
        assert!(matches!(
            validate_transfer(&from, &to, dec("0.00")),
            Err(ApiError::InvalidArgument(_))
        ));
        assert!(matches!(
            validate_transfer(&from, &to, dec("-5.00")),
            Err(ApiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_transfer_rejects_insufficient_balance() {
        let from = card(1, Some("alice"), CardStatus::Active, dec("100.00"));
        let to = card(2, Some("alice"), CardStatus::Active, dec("0.00"));
        assert!(matches!(
            validate_transfer(&from, &to, dec("100.01")),
            Err(ApiError::InsufficientBalance)
        ));
    }

    #[test]
    fn test_transfer_rejects_cross_owner() {
        let from = card(1, Some("alice"), CardStatus::Active, dec("100.00"));
        let to = card(2, Some("bob"), CardStatus::Active, dec("0.00"));
        assert!(matches!(
            validate_transfer(&from, &to, dec("10.00")),
            Err(ApiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_transfer_rejects_unresolved_owner() {
        let from = card(1, None, CardStatus::Active, dec("100.00"));
        let to = card(2, Some("alice"), CardStatus::Active, dec("0.00"));
        assert!(validate_transfer(&from, &to, dec("10.00")).is_err());
    }

    #[test]
    fn test_transfer_rejects_inactive_cards() {
        for status in [CardStatus::Blocked, CardStatus::Expired] {
            let from = card(1, Some("alice"), status, dec("100.00"));
            let to = card(2, Some("alice"), CardStatus::Active, dec("0.00"));
            assert!(validate_transfer(&from, &to, dec("10.00")).is_err());

            let from = card(1, Some("alice"), CardStatus::Active, dec("100.00"));
            let to = card(2, Some("alice"), status, dec("0.00"));
            assert!(validate_transfer(&from, &to, dec("10.00")).is_err());
        }
    }

    #[test]
    fn test_cross_owner_checked_before_amount() {
        // a cross-owner transfer must not leak balance information
        let from = card(1, Some("alice"), CardStatus::Active, dec("1.00"));
        let to = card(2, Some("bob"), CardStatus::Active, dec("0.00"));
        let err = validate_transfer(&from, &to, dec("100.00")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }
}
