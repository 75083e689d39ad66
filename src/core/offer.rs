//! Offer business logic - pledging funds toward a wish.
//!
//! Creating an offer increments the wish's `raised` total and inserts the offer
//! row in one transaction. The increment is a single conditional statement:
//! `UPDATE wishes SET raised = raised + amount WHERE id = ? AND price >= raised + amount`.
//! The store evaluates the guard against the current row, so two concurrent
//! offers cannot both see the old total and overfund the wish. When the guard
//! matches nothing the transaction is rolled back and the caller gets `BadOffer`.
//!
//! `update_offer` and `delete_offer` form a separate administrative path. They
//! edit offer rows directly and do not adjust `raised` or re-check funding
//! invariants.

use crate::{
    core::{
        access::{is_owner, would_overfund},
        user::get_user_by_id,
        wish::get_wish_model,
    },
    entities::{Offer, User, UserProfile, Wish, offer, wish},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{LoaderTrait, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Funding request, already shape-validated by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOffer {
    /// Wish to fund
    pub item_id: i64,
    /// Amount to pledge
    pub amount: f64,
    /// Keep the contributor out of public listings
    #[serde(default)]
    pub hidden: bool,
}

/// Administrative edit of an offer; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfferPatch {
    /// New amount
    pub amount: Option<f64>,
    /// New visibility flag
    pub hidden: Option<bool>,
}

/// An offer with the funded wish and the contributor resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferDetails {
    /// The offer row
    #[serde(flatten)]
    pub offer: offer::Model,
    /// The funded wish
    pub item: Option<wish::Model>,
    /// Public profile of the contributor
    pub user: Option<UserProfile>,
}

async fn with_relations(
    db: &DatabaseConnection,
    offers: Vec<offer::Model>,
) -> Result<Vec<OfferDetails>> {
    let wishes = offers.load_one(Wish, db).await?;
    let users = offers.load_one(User, db).await?;
    Ok(offers
        .into_iter()
        .zip(wishes)
        .zip(users)
        .map(|((offer, item), user)| OfferDetails {
            offer,
            item,
            user: user.map(UserProfile::from),
        })
        .collect())
}

async fn get_offer_model(db: &DatabaseConnection, offer_id: i64) -> Result<offer::Model> {
    Offer::find_by_id(offer_id)
        .one(db)
        .await?
        .ok_or(Error::OfferNotFound { id: offer_id })
}

/// Atomically adds `amount` to a wish's `raised` if the result stays within its price.
///
/// Returns the number of rows changed: 1 on success, 0 if the wish is missing or
/// the increment would overfund it.
async fn increment_raised_atomic<C>(db: &C, wish_id: i64, amount: f64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Wish::update_many()
        .col_expr(
            wish::Column::Raised,
            Expr::col(wish::Column::Raised).add(amount),
        )
        .col_expr(wish::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(wish::Column::Id.eq(wish_id))
        .filter(Expr::col(wish::Column::Price).gte(Expr::col(wish::Column::Raised).add(amount)))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Pledges `new_offer.amount` toward a wish on behalf of `contributor_id`.
///
/// The wish and the contributor are read concurrently, the preconditions are
/// checked, and then the `raised` increment and the offer insert commit together.
/// A failure at any step leaves both the wish and the offer set unchanged.
///
/// # Errors
/// - `InvalidAmount` if the amount is not a positive finite number
/// - `WishNotFound` / `UserNotFound` if the wish or contributor does not exist
/// - `BadOffer` if the contributor owns the wish or the offer would overfund it
#[instrument(skip(db, new_offer), fields(wish_id = new_offer.item_id, amount = new_offer.amount))]
pub async fn create_offer(
    db: &DatabaseConnection,
    new_offer: NewOffer,
    contributor_id: i64,
) -> Result<offer::Model> {
    let amount = new_offer.amount;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let (wish, contributor) = tokio::try_join!(
        get_wish_model(db, new_offer.item_id),
        get_user_by_id(db, contributor_id),
    )?;

    if is_owner(&wish, contributor.id) {
        warn!(contributor_id, "Owner tried to fund their own wish");
        return Err(Error::bad_offer("cannot fund your own wish"));
    }
    if would_overfund(&wish, amount) {
        warn!(
            raised = wish.raised,
            price = wish.price,
            "Offer would exceed the wish price"
        );
        return Err(Error::bad_offer("raised total would exceed the price"));
    }

    let txn = db.begin().await?;

    if increment_raised_atomic(&txn, wish.id, amount).await? == 0 {
        // Lost the race to another offer, or the wish disappeared meanwhile
        get_wish_model(&txn, wish.id).await?;
        warn!("Offer would exceed the wish price after a concurrent update");
        return Err(Error::bad_offer("raised total would exceed the price"));
    }

    let now = Utc::now();
    let offer = offer::ActiveModel {
        amount: Set(amount),
        hidden: Set(new_offer.hidden),
        wish_id: Set(wish.id),
        user_id: Set(contributor.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let result = offer.insert(&txn).await?;

    txn.commit().await?;

    info!(offer_id = result.id, contributor_id, "Offer committed");
    Ok(result)
}

/// Lists every offer with its wish and contributor, oldest first.
pub async fn get_all_offers(db: &DatabaseConnection) -> Result<Vec<OfferDetails>> {
    let offers = Offer::find()
        .order_by_asc(offer::Column::CreatedAt)
        .order_by_asc(offer::Column::Id)
        .all(db)
        .await?;
    with_relations(db, offers).await
}

/// Retrieves one offer with its wish and contributor.
///
/// # Errors
/// Returns `OfferNotFound` if the offer does not exist.
pub async fn get_offer(db: &DatabaseConnection, offer_id: i64) -> Result<OfferDetails> {
    let offer = get_offer_model(db, offer_id).await?;
    let mut details = with_relations(db, vec![offer]).await?;
    details.pop().ok_or(Error::OfferNotFound { id: offer_id })
}

/// Administrative edit of an offer row.
///
/// Does not touch the funded wish's `raised` and does not re-check funding
/// invariants.
///
/// # Errors
/// Returns `OfferNotFound` if the offer does not exist.
#[instrument(skip(db, patch))]
pub async fn update_offer(
    db: &DatabaseConnection,
    offer_id: i64,
    patch: OfferPatch,
) -> Result<offer::Model> {
    let existing = get_offer_model(db, offer_id).await?;

    let mut active: offer::ActiveModel = existing.into();
    if let Some(amount) = patch.amount {
        active.amount = Set(amount);
    }
    if let Some(hidden) = patch.hidden {
        active.hidden = Set(hidden);
    }
    active.updated_at = Set(Utc::now());

    let result = active.update(db).await?;
    warn!(offer_id, "Offer edited through the administrative path");
    Ok(result)
}

/// Administrative removal of an offer row.
///
/// Does not touch the funded wish's `raised`.
///
/// # Errors
/// Returns `OfferNotFound` if the offer does not exist.
#[instrument(skip(db))]
pub async fn delete_offer(db: &DatabaseConnection, offer_id: i64) -> Result<()> {
    let offer = get_offer_model(db, offer_id).await?;
    offer.delete(db).await?;
    warn!(offer_id, "Offer removed through the administrative path");
    Ok(())
}
