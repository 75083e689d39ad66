//! Shared test utilities for `GiftPool`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    core::{offer, user, wish, wishlist},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Registers a test user.
///
/// # Defaults
/// * `email`: `"<username>@example.com"`
/// * `password_hash`: `"hash"`
/// * `about`, `avatar`: empty
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    user::register_user(
        db,
        user::NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
            about: String::new(),
            avatar: String::new(),
        },
    )
    .await
}

/// Creates a test wish owned by `owner_id` with the given price and returns the
/// full stored row.
///
/// # Defaults
/// * `name`: `"Test wish"`
/// * `image`, `link`: `example.com` URLs
pub async fn create_test_wish(
    db: &DatabaseConnection,
    owner_id: i64,
    price: f64,
) -> Result<entities::wish::Model> {
    wish::insert_wish(
        db,
        wish::WishContent {
            name: "Test wish".to_string(),
            description: "Test description".to_string(),
            image: "https://example.com/wish.png".to_string(),
            link: "https://example.com/wish".to_string(),
            price,
        },
        owner_id,
    )
    .await
}

/// Funds a wish through the regular offer path.
pub async fn create_test_offer(
    db: &DatabaseConnection,
    wish_id: i64,
    contributor_id: i64,
    amount: f64,
) -> Result<entities::offer::Model> {
    offer::create_offer(
        db,
        offer::NewOffer {
            item_id: wish_id,
            amount,
            hidden: false,
        },
        contributor_id,
    )
    .await
}

/// Creates a test wishlist owned by `owner_id` containing `item_ids`.
pub async fn create_test_wishlist(
    db: &DatabaseConnection,
    owner_id: i64,
    item_ids: Vec<i64>,
) -> Result<wishlist::WishlistDetails> {
    wishlist::create_wishlist(
        db,
        wishlist::NewWishlist {
            name: "Test wishlist".to_string(),
            description: String::new(),
            image: "https://example.com/list.png".to_string(),
            item_ids,
        },
        owner_id,
    )
    .await
}

/// Sets up a complete test environment with an owner and one wish.
/// Returns (db, owner, wish) for common test scenarios.
pub async fn setup_with_wish(
    price: f64,
) -> Result<(
    DatabaseConnection,
    entities::user::Model,
    entities::wish::Model,
)> {
    let db = setup_test_db().await?;
    let owner = create_test_user(&db, "owner").await?;
    let wish = create_test_wish(&db, owner.id, price).await?;
    Ok((db, owner, wish))
}
