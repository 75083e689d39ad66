//! Wishlist business logic - owner-curated collections of wishes.
//!
//! Item identifiers are resolved against existing wishes; unknown ids are
//! dropped silently and duplicates collapse, so the stored items form a set.
//! Only the owner may edit or delete a wishlist.

use crate::{
    core::{access::is_owner, user::get_user_by_id},
    entities::{
        User, UserProfile, Wish, Wishlist, WishlistItem, wish, wishlist, wishlist_item,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{LoaderTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Creation payload, already shape-validated by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWishlist {
    /// Title of the collection
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Cover image URL
    pub image: String,
    /// Wishes to include
    #[serde(default)]
    pub item_ids: Vec<i64>,
}

/// Partial update; `None` fields are left untouched.
///
/// When `item_ids` is present the item set is replaced entirely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WishlistPatch {
    /// New title
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New cover image URL
    pub image: Option<String>,
    /// Replacement item set
    pub item_ids: Option<Vec<i64>>,
}

/// A wishlist with its owner and items resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WishlistDetails {
    /// The wishlist row
    #[serde(flatten)]
    pub wishlist: wishlist::Model,
    /// Public profile of the owner, if one is recorded
    pub owner: Option<UserProfile>,
    /// Member wishes
    pub items: Vec<wish::Model>,
}

async fn get_wishlist_model(db: &DatabaseConnection, wishlist_id: i64) -> Result<wishlist::Model> {
    Wishlist::find_by_id(wishlist_id)
        .one(db)
        .await?
        .ok_or(Error::WishlistNotFound { id: wishlist_id })
}

/// Looks up the wishes among `item_ids` that actually exist.
async fn resolve_items<C>(db: &C, item_ids: &[i64]) -> Result<Vec<wish::Model>>
where
    C: ConnectionTrait,
{
    if item_ids.is_empty() {
        return Ok(Vec::new());
    }
    let items = Wish::find()
        .filter(wish::Column::Id.is_in(item_ids.iter().copied()))
        .order_by_asc(wish::Column::Id)
        .all(db)
        .await?;
    if items.len() < item_ids.len() {
        debug!(
            requested = item_ids.len(),
            resolved = items.len(),
            "Dropped unknown or repeated wishlist item ids"
        );
    }
    Ok(items)
}

async fn insert_items<C>(db: &C, wishlist_id: i64, items: &[wish::Model]) -> Result<()>
where
    C: ConnectionTrait,
{
    if items.is_empty() {
        return Ok(());
    }
    let rows = items.iter().map(|item| wishlist_item::ActiveModel {
        wishlist_id: Set(wishlist_id),
        wish_id: Set(item.id),
    });
    WishlistItem::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

async fn with_relations(
    db: &DatabaseConnection,
    wishlists: Vec<wishlist::Model>,
) -> Result<Vec<WishlistDetails>> {
    let items = wishlists.load_many_to_many(Wish, WishlistItem, db).await?;

    let owners = wishlists.load_one(User, db).await?;

    Ok(wishlists
        .into_iter()
        .zip(items)
        .zip(owners)
        .map(|((wishlist, mut items), owner)| {
            items.sort_by_key(|item| item.id);
            WishlistDetails {
                wishlist,
                owner: owner.map(UserProfile::from),
                items,
            }
        })
        .collect())
}

/// Creates a wishlist owned by `owner_id` and returns it fully populated.
///
/// # Errors
/// Returns `UserNotFound` if the owner does not exist.
#[instrument(skip(db, new_wishlist), fields(items = new_wishlist.item_ids.len()))]
pub async fn create_wishlist(
    db: &DatabaseConnection,
    new_wishlist: NewWishlist,
    owner_id: i64,
) -> Result<WishlistDetails> {
    get_user_by_id(db, owner_id).await?;

    let txn = db.begin().await?;

    let items = resolve_items(&txn, &new_wishlist.item_ids).await?;
    let now = Utc::now();
    let created = wishlist::ActiveModel {
        name: Set(new_wishlist.name),
        description: Set(new_wishlist.description),
        image: Set(new_wishlist.image),
        user_id: Set(Some(owner_id)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    insert_items(&txn, created.id, &items).await?;

    txn.commit().await?;

    info!(wishlist_id = created.id, owner_id, "Created wishlist");
    get_wishlist(db, created.id).await
}

/// Lists every wishlist with owner and items.
pub async fn get_all_wishlists(db: &DatabaseConnection) -> Result<Vec<WishlistDetails>> {
    let wishlists = Wishlist::find()
        .order_by_asc(wishlist::Column::Id)
        .all(db)
        .await?;
    with_relations(db, wishlists).await
}

/// Retrieves one wishlist with owner and items.
///
/// # Errors
/// Returns `WishlistNotFound` if the wishlist does not exist.
pub async fn get_wishlist(db: &DatabaseConnection, wishlist_id: i64) -> Result<WishlistDetails> {
    let wishlist = get_wishlist_model(db, wishlist_id).await?;
    let mut details = with_relations(db, vec![wishlist]).await?;
    details
        .pop()
        .ok_or(Error::WishlistNotFound { id: wishlist_id })
}

/// Applies `patch` to a wishlist owned by `caller_id`.
///
/// # Errors
/// Returns `WishlistNotFound` if the wishlist does not exist and `AccessDenied`
/// if the caller is not its owner.
#[instrument(skip(db, patch))]
pub async fn update_wishlist(
    db: &DatabaseConnection,
    wishlist_id: i64,
    patch: WishlistPatch,
    caller_id: i64,
) -> Result<WishlistDetails> {
    let existing = get_wishlist_model(db, wishlist_id).await?;
    if !is_owner(&existing, caller_id) {
        warn!(wishlist_id, caller_id, "Rejected wishlist update by non-owner");
        return Err(Error::access_denied("only the owner can edit this wishlist"));
    }

    let txn = db.begin().await?;

    let mut active: wishlist::ActiveModel = existing.into();
    if let Some(name) = patch.name {
        active.name = Set(name);
    }
    if let Some(description) = patch.description {
        active.description = Set(description);
    }
    if let Some(image) = patch.image {
        active.image = Set(image);
    }
    active.updated_at = Set(Utc::now());
    active.update(&txn).await?;

    if let Some(item_ids) = patch.item_ids {
        let items = resolve_items(&txn, &item_ids).await?;
        WishlistItem::delete_many()
            .filter(wishlist_item::Column::WishlistId.eq(wishlist_id))
            .exec(&txn)
            .await?;
        insert_items(&txn, wishlist_id, &items).await?;
    }

    txn.commit().await?;

    info!(wishlist_id, caller_id, "Updated wishlist");
    get_wishlist(db, wishlist_id).await
}

/// Deletes a wishlist.
///
/// # Errors
/// Returns `WishlistNotFound` if the wishlist does not exist and `AccessDenied`
/// if it has an owner other than `caller_id`.
#[instrument(skip(db))]
pub async fn delete_wishlist(db: &DatabaseConnection, wishlist_id: i64, caller_id: i64) -> Result<()> {
    let existing = get_wishlist_model(db, wishlist_id).await?;
    if existing.user_id.is_some() && !is_owner(&existing, caller_id) {
        warn!(wishlist_id, caller_id, "Rejected wishlist delete by non-owner");
        return Err(Error::access_denied("only the owner can delete this wishlist"));
    }

    existing.delete(db).await?;
    info!(wishlist_id, caller_id, "Deleted wishlist");
    Ok(())
}
