//! Wish business logic - creation, editing, deletion, copying and feeds.
//!
//! Once a wish has offers its price is locked and it cannot be deleted. Both
//! locks are checked against the loaded record and then re-asserted inside the
//! write itself, so an offer that lands between the check and the write still
//! blocks it. `raised` is never taken from a client payload.
//!
//! Copying duplicates the descriptive fields into a new wish for the caller and,
//! in the same transaction, bumps the source's `copied` counter and resets the
//! source's `raised` to zero. The reset discards the source's funding total even
//! though its offers remain; callers relying on that history must be aware.

use crate::{
    config::settings::AppConfig,
    core::{
        access::{has_commitments, is_owner},
        user::get_user_by_id,
    },
    entities::{Offer, User, UserProfile, Wish, offer, wish},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    LoaderTrait, QueryOrder, QuerySelect, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Query, SimpleExpr},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// The author-facing fields of a wish.
///
/// Used both as the creation payload and as the creation response, which
/// deliberately omits identifier, owner, timestamps and funding counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishContent {
    /// Short title
    pub name: String,
    /// Longer description
    #[serde(default)]
    pub description: String,
    /// Image URL
    pub image: String,
    /// Purchase link
    pub link: String,
    /// Funding target
    pub price: f64,
}

impl From<&wish::Model> for WishContent {
    fn from(wish: &wish::Model) -> Self {
        Self {
            name: wish.name.clone(),
            description: wish.description.clone(),
            image: wish.image.clone(),
            link: wish.link.clone(),
            price: wish.price,
        }
    }
}

/// Partial update of a wish; `None` fields are left untouched.
///
/// `raised` is accepted by the payload shape only so that an attempt to set it
/// can be rejected explicitly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WishPatch {
    /// New title
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New image URL
    pub image: Option<String>,
    /// New purchase link
    pub link: Option<String>,
    /// New funding target; locked once offers exist
    pub price: Option<f64>,
    /// Never settable by a client
    pub raised: Option<f64>,
}

/// An offer together with the user who made it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferWithContributor {
    /// The offer row
    #[serde(flatten)]
    pub offer: offer::Model,
    /// Public profile of the contributor
    pub contributor: Option<UserProfile>,
}

/// A wish with its owner and offers resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WishDetails {
    /// The wish row
    #[serde(flatten)]
    pub wish: wish::Model,
    /// Public profile of the owner
    pub owner: UserProfile,
    /// Offers toward this wish, oldest first
    pub offers: Vec<OfferWithContributor>,
}

/// A feed entry: a wish and its owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WishWithOwner {
    /// The wish row
    #[serde(flatten)]
    pub wish: wish::Model,
    /// Public profile of the owner
    pub owner: Option<UserProfile>,
}

/// Inserts a fresh wish owned by `owner_id` with zeroed funding counters.
///
/// Runs on any connection, including an open transaction.
pub(crate) async fn insert_wish<C>(db: &C, content: WishContent, owner_id: i64) -> Result<wish::Model>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let wish = wish::ActiveModel {
        name: Set(content.name),
        description: Set(content.description),
        image: Set(content.image),
        link: Set(content.link),
        price: Set(content.price),
        raised: Set(0.0),
        copied: Set(0),
        owner_id: Set(owner_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    wish.insert(db).await.map_err(Into::into)
}

/// Loads a wish row or fails with `WishNotFound`.
pub(crate) async fn get_wish_model<C>(db: &C, wish_id: i64) -> Result<wish::Model>
where
    C: ConnectionTrait,
{
    Wish::find_by_id(wish_id)
        .one(db)
        .await?
        .ok_or(Error::WishNotFound { id: wish_id })
}

async fn get_offers_for_wish<C>(db: &C, wish: &wish::Model) -> Result<Vec<offer::Model>>
where
    C: ConnectionTrait,
{
    wish.find_related(Offer)
        .order_by_asc(offer::Column::CreatedAt)
        .order_by_asc(offer::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// `NOT EXISTS (SELECT 1 FROM offers WHERE offers.wish_id = wishes.id)`
fn has_no_offers() -> SimpleExpr {
    Expr::exists(
        Query::select()
            .expr(Expr::val(1))
            .from(Offer)
            .and_where(
                Expr::col((Offer, offer::Column::WishId)).equals((Wish, wish::Column::Id)),
            )
            .to_owned(),
    )
    .not()
}

async fn attach_owners(
    db: &DatabaseConnection,
    wishes: Vec<wish::Model>,
) -> Result<Vec<WishWithOwner>> {
    let owners = wishes.load_one(User, db).await?;
    Ok(wishes
        .into_iter()
        .zip(owners)
        .map(|(wish, owner)| WishWithOwner {
            wish,
            owner: owner.map(UserProfile::from),
        })
        .collect())
}

/// Creates a wish for `owner_id` and returns the submitted content as stored.
///
/// # Errors
/// Returns `UserNotFound` if the owner does not exist, or `InvalidAmount` if the
/// price is negative or not finite.
#[instrument(skip(db, content))]
pub async fn create_wish(
    db: &DatabaseConnection,
    content: WishContent,
    owner_id: i64,
) -> Result<WishContent> {
    if !content.price.is_finite() || content.price < 0.0 {
        return Err(Error::InvalidAmount {
            amount: content.price,
        });
    }
    get_user_by_id(db, owner_id).await?;

    let created = insert_wish(db, content, owner_id).await?;
    info!(wish_id = created.id, owner_id, "Created wish");
    Ok(WishContent::from(&created))
}

/// Retrieves a wish with its owner and every offer (each with its contributor).
///
/// # Errors
/// Returns `WishNotFound` if the wish does not exist.
pub async fn get_wish(db: &DatabaseConnection, wish_id: i64) -> Result<WishDetails> {
    let wish = get_wish_model(db, wish_id).await?;
    let owner = get_user_by_id(db, wish.owner_id).await?;
    let offers = get_offers_for_wish(db, &wish).await?;
    let contributors = offers.load_one(User, db).await?;
    debug!(wish_id, offers = offers.len(), "Loaded wish details");

    Ok(WishDetails {
        wish,
        owner: owner.into(),
        offers: offers
            .into_iter()
            .zip(contributors)
            .map(|(offer, contributor)| OfferWithContributor {
                offer,
                contributor: contributor.map(UserProfile::from),
            })
            .collect(),
    })
}

/// Lists every wish, oldest first.
pub async fn get_all_wishes(db: &DatabaseConnection) -> Result<Vec<wish::Model>> {
    Wish::find()
        .order_by_asc(wish::Column::CreatedAt)
        .order_by_asc(wish::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Returns the most recently created wishes, newest first, with owners.
///
/// At most `config.last_wishes_limit` entries are returned.
pub async fn get_last_wishes(
    db: &DatabaseConnection,
    config: &AppConfig,
) -> Result<Vec<WishWithOwner>> {
    let wishes = Wish::find()
        .order_by_desc(wish::Column::CreatedAt)
        .order_by_desc(wish::Column::Id)
        .limit(config.last_wishes_limit)
        .all(db)
        .await?;
    attach_owners(db, wishes).await
}

/// Returns the most copied wishes, most copied first, with owners.
///
/// At most `config.top_wishes_limit` entries are returned.
pub async fn get_top_wishes(
    db: &DatabaseConnection,
    config: &AppConfig,
) -> Result<Vec<WishWithOwner>> {
    let wishes = Wish::find()
        .order_by_desc(wish::Column::Copied)
        .order_by_asc(wish::Column::Id)
        .limit(config.top_wishes_limit)
        .all(db)
        .await?;
    attach_owners(db, wishes).await
}

/// Writes the descriptive fields and price of `patch` in one statement.
///
/// A price change only applies while the wish has no offers and the new price
/// covers `raised`, as seen by the store at write time.
async fn apply_patch(db: &DatabaseConnection, wish_id: i64, patch: WishPatch) -> Result<()> {
    let mut update = Wish::update_many()
        .col_expr(wish::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(wish::Column::Id.eq(wish_id));

    if let Some(price) = patch.price {
        update = update
            .col_expr(wish::Column::Price, Expr::value(price))
            .filter(has_no_offers())
            .filter(Expr::col(wish::Column::Raised).lte(price));
    }
    if let Some(name) = patch.name {
        update = update.col_expr(wish::Column::Name, Expr::value(name));
    }
    if let Some(description) = patch.description {
        update = update.col_expr(wish::Column::Description, Expr::value(description));
    }
    if let Some(image) = patch.image {
        update = update.col_expr(wish::Column::Image, Expr::value(image));
    }
    if let Some(link) = patch.link {
        update = update.col_expr(wish::Column::Link, Expr::value(link));
    }

    let result = update.exec(db).await?;
    if result.rows_affected == 0 {
        // Offers arrived (or the wish vanished) after the caller's checks
        get_wish_model(db, wish_id).await?;
        return Err(Error::access_denied("price is locked once offers exist"));
    }
    Ok(())
}

/// Deletes the wish only if no offer references it at write time.
async fn delete_unfunded(db: &DatabaseConnection, wish_id: i64) -> Result<()> {
    let result = Wish::delete_many()
        .filter(wish::Column::Id.eq(wish_id))
        .filter(has_no_offers())
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        get_wish_model(db, wish_id).await?;
        return Err(Error::access_denied("a wish with offers cannot be deleted"));
    }
    Ok(())
}

/// Applies `patch` to a wish owned by `caller_id`.
///
/// # Errors
/// - `WishNotFound` if the wish does not exist
/// - `AccessDenied` if the patch sets `raised`, the caller is not the owner,
///   the patch changes `price` while offers exist, or the new price is below
///   the amount already raised
#[instrument(skip(db, patch))]
pub async fn update_wish(
    db: &DatabaseConnection,
    wish_id: i64,
    patch: WishPatch,
    caller_id: i64,
) -> Result<()> {
    let wish = get_wish_model(db, wish_id).await?;

    if patch.raised.is_some() {
        warn!(wish_id, caller_id, "Rejected attempt to set raised directly");
        return Err(Error::access_denied("raised cannot be changed directly"));
    }
    if !is_owner(&wish, caller_id) {
        warn!(wish_id, caller_id, "Rejected update by non-owner");
        return Err(Error::access_denied("only the owner can edit this wish"));
    }

    if let Some(price) = patch.price {
        if !price.is_finite() || price < 0.0 {
            return Err(Error::InvalidAmount { amount: price });
        }
        let offers = get_offers_for_wish(db, &wish).await?;
        if has_commitments(&offers) {
            warn!(wish_id, "Rejected price change on a wish with offers");
            return Err(Error::access_denied("price is locked once offers exist"));
        }
        if price < wish.raised {
            return Err(Error::access_denied("price cannot drop below the amount raised"));
        }
    }

    apply_patch(db, wish_id, patch).await?;

    info!(wish_id, caller_id, "Updated wish");
    Ok(())
}

/// Deletes a wish owned by `caller_id` that has no offers.
///
/// # Errors
/// - `WishNotFound` if the wish does not exist
/// - `AccessDenied` if the caller is not the owner or the wish has offers
#[instrument(skip(db))]
pub async fn delete_wish(db: &DatabaseConnection, wish_id: i64, caller_id: i64) -> Result<()> {
    let wish = get_wish_model(db, wish_id).await?;

    if !is_owner(&wish, caller_id) {
        warn!(wish_id, caller_id, "Rejected delete by non-owner");
        return Err(Error::access_denied("only the owner can delete this wish"));
    }
    let offers = get_offers_for_wish(db, &wish).await?;
    if has_commitments(&offers) {
        warn!(wish_id, "Rejected delete of a wish with offers");
        return Err(Error::access_denied("a wish with offers cannot be deleted"));
    }

    delete_unfunded(db, wish_id).await?;

    info!(wish_id, caller_id, "Deleted wish");
    Ok(())
}

/// Copies a wish's descriptive fields into a new wish owned by `caller_id`.
///
/// In one transaction the source's `copied` counter is incremented, the
/// source's `raised` is reset to zero and the duplicate is inserted. The
/// duplicate's owner, counters, identifier and timestamps are fresh.
///
/// # Errors
/// Returns `WishNotFound` if the source does not exist and `UserNotFound` if the
/// caller does not. Any storage failure rolls the whole copy back and is returned.
#[instrument(skip(db))]
pub async fn copy_wish(db: &DatabaseConnection, wish_id: i64, caller_id: i64) -> Result<wish::Model> {
    let txn = db.begin().await?;

    let source = get_wish_model(&txn, wish_id).await?;
    get_user_by_id(&txn, caller_id).await?;

    let result = Wish::update_many()
        .col_expr(wish::Column::Copied, Expr::col(wish::Column::Copied).add(1))
        .col_expr(wish::Column::Raised, Expr::value(0.0))
        .col_expr(wish::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(wish::Column::Id.eq(wish_id))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(Error::WishNotFound { id: wish_id });
    }

    let duplicate = insert_wish(&txn, WishContent::from(&source), caller_id).await?;

    txn.commit().await?;

    info!(
        source_id = wish_id,
        copy_id = duplicate.id,
        caller_id,
        "Copied wish; source raised reset to zero"
    );
    Ok(duplicate)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::offer::{NewOffer, create_offer};
    use crate::test_utils::*;

    fn content(name: &str, price: f64) -> WishContent {
        WishContent {
            name: name.to_string(),
            description: format!("{name} description"),
            image: format!("https://example.com/{name}.png"),
            link: format!("https://example.com/{name}"),
            price,
        }
    }

    #[tokio::test]
    async fn test_create_wish_returns_submitted_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "alice").await?;

        let created = create_wish(&db, content("Bike", 300.0), owner.id).await?;
        assert_eq!(created, content("Bike", 300.0));

        let stored = get_all_wishes(&db).await?;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].owner_id, owner.id);
        assert_eq!(stored[0].raised, 0.0);
        assert_eq!(stored[0].copied, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_wish_unknown_owner() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_wish(&db, content("Bike", 300.0), 99).await;
        assert!(matches!(result, Err(Error::UserNotFound { key: _ })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_wish_rejects_negative_price() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "alice").await?;

        let result = create_wish(&db, content("Bike", -1.0), owner.id).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: _ })));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_wish_includes_owner_and_offers() -> Result<()> {
        let (db, owner, wish) = setup_with_wish(500.0).await?;
        let bob = create_test_user(&db, "bob").await?;
        create_test_offer(&db, wish.id, bob.id, 200.0).await?;

        let details = get_wish(&db, wish.id).await?;
        assert_eq!(details.owner.id, owner.id);
        assert_eq!(details.wish.raised, 200.0);
        assert_eq!(details.offers.len(), 1);
        assert_eq!(details.offers[0].offer.amount, 200.0);
        assert_eq!(
            details.offers[0].contributor.as_ref().unwrap().username,
            "bob"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_get_wish_not_found() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(matches!(
            get_wish(&db, 404).await,
            Err(Error::WishNotFound { id: 404 })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_wish_by_owner() -> Result<()> {
        let (db, owner, wish) = setup_with_wish(100.0).await?;

        update_wish(
            &db,
            wish.id,
            WishPatch {
                name: Some("Road bike".to_string()),
                price: Some(150.0),
                ..Default::default()
            },
            owner.id,
        )
        .await?;

        let updated = get_wish_model(&db, wish.id).await?;
        assert_eq!(updated.name, "Road bike");
        assert_eq!(updated.price, 150.0);
        assert_eq!(updated.description, wish.description);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_wish_rejects_raised() -> Result<()> {
        let (db, owner, wish) = setup_with_wish(100.0).await?;

        let result = update_wish(
            &db,
            wish.id,
            WishPatch {
                raised: Some(100.0),
                ..Default::default()
            },
            owner.id,
        )
        .await;
        assert!(matches!(result, Err(Error::AccessDenied { reason: _ })));
        assert_eq!(get_wish_model(&db, wish.id).await?.raised, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_wish_rejects_non_owner() -> Result<()> {
        let (db, _owner, wish) = setup_with_wish(100.0).await?;
        let bob = create_test_user(&db, "bob").await?;

        let result = update_wish(
            &db,
            wish.id,
            WishPatch {
                name: Some("Mine now".to_string()),
                ..Default::default()
            },
            bob.id,
        )
        .await;
        assert!(matches!(result, Err(Error::AccessDenied { reason: _ })));
        assert_eq!(get_wish_model(&db, wish.id).await?.name, wish.name);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_price_locked_by_offers() -> Result<()> {
        let (db, owner, wish) = setup_with_wish(100.0).await?;
        let bob = create_test_user(&db, "bob").await?;
        create_test_offer(&db, wish.id, bob.id, 10.0).await?;

        let result = update_wish(
            &db,
            wish.id,
            WishPatch {
                price: Some(200.0),
                ..Default::default()
            },
            owner.id,
        )
        .await;
        assert!(matches!(result, Err(Error::AccessDenied { reason: _ })));
        assert_eq!(get_wish_model(&db, wish.id).await?.price, 100.0);

        // Descriptive fields stay editable
        update_wish(
            &db,
            wish.id,
            WishPatch {
                description: Some("Still wanted".to_string()),
                ..Default::default()
            },
            owner.id,
        )
        .await?;
        assert_eq!(
            get_wish_model(&db, wish.id).await?.description,
            "Still wanted"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_wish() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_user(&db, "alice").await?;

        let result = update_wish(&db, 5, WishPatch::default(), owner.id).await;
        assert!(matches!(result, Err(Error::WishNotFound { id: 5 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_wish_by_owner() -> Result<()> {
        let (db, owner, wish) = setup_with_wish(100.0).await?;

        delete_wish(&db, wish.id, owner.id).await?;
        assert!(matches!(
            get_wish_model(&db, wish.id).await,
            Err(Error::WishNotFound { id: _ })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_wish_removes_wishlist_membership() -> Result<()> {
        let (db, owner, wish) = setup_with_wish(100.0).await?;
        let list = create_test_wishlist(&db, owner.id, vec![wish.id]).await?;

        delete_wish(&db, wish.id, owner.id).await?;

        let remaining = crate::entities::Wishlist::find_by_id(list.wishlist.id)
            .one(&db)
            .await?
            .unwrap();
        let items = remaining.find_related(Wish).all(&db).await?;
        assert!(items.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_wish_rejects_non_owner_and_offers() -> Result<()> {
        let (db, owner, wish) = setup_with_wish(100.0).await?;
        let bob = create_test_user(&db, "bob").await?;

        let result = delete_wish(&db, wish.id, bob.id).await;
        assert!(matches!(result, Err(Error::AccessDenied { reason: _ })));

        create_test_offer(&db, wish.id, bob.id, 10.0).await?;
        let result = delete_wish(&db, wish.id, owner.id).await;
        assert!(matches!(result, Err(Error::AccessDenied { reason: _ })));
        assert!(get_wish_model(&db, wish.id).await.is_ok());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_wish() -> Result<()> {
        let db = setup_test_db().await?;

        assert!(matches!(
            delete_wish(&db, 8, 1).await,
            Err(Error::WishNotFound { id: 8 })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_copy_wish_resets_funding_on_both_sides() -> Result<()> {
        let (db, owner, wish) = setup_with_wish(500.0).await?;
        let bob = create_test_user(&db, "bob").await?;
        create_test_offer(&db, wish.id, bob.id, 200.0).await?;

        let duplicate = copy_wish(&db, wish.id, bob.id).await?;

        assert_ne!(duplicate.id, wish.id);
        assert_eq!(duplicate.owner_id, bob.id);
        assert_eq!(duplicate.raised, 0.0);
        assert_eq!(duplicate.copied, 0);
        assert_eq!(WishContent::from(&duplicate), WishContent::from(&wish));

        let source = get_wish_model(&db, wish.id).await?;
        assert_eq!(source.copied, 1);
        assert_eq!(source.raised, 0.0);
        assert_eq!(source.owner_id, owner.id);

        // The duplicate carries no offers
        assert!(get_wish(&db, duplicate.id).await?.offers.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_copy_wish_increments_once_per_copy() -> Result<()> {
        let (db, _owner, wish) = setup_with_wish(50.0).await?;
        let bob = create_test_user(&db, "bob").await?;
        let carol = create_test_user(&db, "carol").await?;

        copy_wish(&db, wish.id, bob.id).await?;
        copy_wish(&db, wish.id, carol.id).await?;

        assert_eq!(get_wish_model(&db, wish.id).await?.copied, 2);
        assert_eq!(get_all_wishes(&db).await?.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_copy_missing_wish_writes_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let bob = create_test_user(&db, "bob").await?;

        let result = copy_wish(&db, 77, bob.id).await;
        assert!(matches!(result, Err(Error::WishNotFound { id: 77 })));
        assert!(get_all_wishes(&db).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_copy_by_unknown_caller_leaves_source_untouched() -> Result<()> {
        let (db, _owner, wish) = setup_with_wish(50.0).await?;

        let result = copy_wish(&db, wish.id, 999).await;
        assert!(matches!(result, Err(Error::UserNotFound { key: _ })));
        assert_eq!(get_wish_model(&db, wish.id).await?.copied, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_funding_after_copy_starts_from_zero() -> Result<()> {
        let (db, _owner, wish) = setup_with_wish(100.0).await?;
        let bob = create_test_user(&db, "bob").await?;
        create_test_offer(&db, wish.id, bob.id, 100.0).await?;
        copy_wish(&db, wish.id, bob.id).await?;

        let offer = create_offer(
            &db,
            NewOffer {
                item_id: wish.id,
                amount: 100.0,
                hidden: false,
            },
            bob.id,
        )
        .await?;
        assert_eq!(offer.amount, 100.0);
        assert_eq!(get_wish_model(&db, wish.id).await?.raised, 100.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_last_and_top_feeds() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        let bob = create_test_user(&db, "bob").await?;
        let first = create_test_wish(&db, alice.id, 10.0).await?;
        let second = create_test_wish(&db, alice.id, 20.0).await?;
        let third = create_test_wish(&db, alice.id, 30.0).await?;

        copy_wish(&db, second.id, bob.id).await?;
        copy_wish(&db, second.id, bob.id).await?;
        copy_wish(&db, third.id, bob.id).await?;

        let narrow = AppConfig {
            last_wishes_limit: 2,
            top_wishes_limit: 2,
        };
        let last = get_last_wishes(&db, &narrow).await?;
        assert_eq!(last.len(), 2);
        assert!(last.iter().all(|w| w.owner.as_ref().unwrap().id == bob.id));

        let top = get_top_wishes(&db, &narrow).await?;
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].wish.id, second.id);
        assert_eq!(top[0].wish.copied, 2);
        assert_eq!(top[1].wish.id, third.id);
        assert_eq!(top[1].owner.as_ref().unwrap().username, "alice");

        let everything = get_last_wishes(&db, &AppConfig::default()).await?;
        assert_eq!(everything.len(), 6);
        assert_eq!(everything.last().unwrap().wish.id, first.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_default_config_bounds_feeds() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        for _ in 0..45 {
            create_test_wish(&db, alice.id, 10.0).await?;
        }

        let config = AppConfig::default();
        assert_eq!(get_last_wishes(&db, &config).await?.len(), 40);
        assert_eq!(get_top_wishes(&db, &config).await?.len(), 20);

        Ok(())
    }

    /// Records an offer row without touching `raised`, as a concurrent
    /// funder would between another request's checks and its write.
    async fn insert_raw_offer(db: &DatabaseConnection, wish_id: i64, user_id: i64) -> Result<()> {
        let now = Utc::now();
        offer::ActiveModel {
            amount: Set(10.0),
            hidden: Set(false),
            wish_id: Set(wish_id),
            user_id: Set(user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_price_write_rechecks_offers() -> Result<()> {
        let (db, _owner, wish) = setup_with_wish(100.0).await?;
        let bob = create_test_user(&db, "bob").await?;
        insert_raw_offer(&db, wish.id, bob.id).await?;

        let result = apply_patch(
            &db,
            wish.id,
            WishPatch {
                name: Some("Renamed".to_string()),
                price: Some(500.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::AccessDenied { reason: _ })));

        let stored = get_wish_model(&db, wish.id).await?;
        assert_eq!(stored.price, 100.0);
        assert_eq!(stored.name, wish.name);

        Ok(())
    }

    #[tokio::test]
    async fn test_price_write_rechecks_raised() -> Result<()> {
        let (db, _owner, wish) = setup_with_wish(100.0).await?;
        Wish::update_many()
            .col_expr(wish::Column::Raised, Expr::value(80.0))
            .filter(wish::Column::Id.eq(wish.id))
            .exec(&db)
            .await?;

        let result = apply_patch(
            &db,
            wish.id,
            WishPatch {
                price: Some(50.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::AccessDenied { reason: _ })));
        assert_eq!(get_wish_model(&db, wish.id).await?.price, 100.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_price_write_on_missing_wish() -> Result<()> {
        let db = setup_test_db().await?;

        let result = apply_patch(
            &db,
            12,
            WishPatch {
                price: Some(5.0),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::WishNotFound { id: 12 })));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_write_rechecks_offers() -> Result<()> {
        let (db, _owner, wish) = setup_with_wish(100.0).await?;
        let bob = create_test_user(&db, "bob").await?;
        insert_raw_offer(&db, wish.id, bob.id).await?;

        let result = delete_unfunded(&db, wish.id).await;
        assert!(matches!(result, Err(Error::AccessDenied { reason: _ })));
        assert!(get_wish_model(&db, wish.id).await.is_ok());

        assert!(matches!(
            delete_unfunded(&db, 404).await,
            Err(Error::WishNotFound { id: 404 })
        ));

        Ok(())
    }
}
