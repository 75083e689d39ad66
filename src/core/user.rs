//! User directory - registration and lookups the funding services rely on.
//!
//! Authentication and credential hashing happen upstream; this module stores the
//! already-hashed credential and resolves users by identifier or username.

use crate::{
    entities::{User, Wish, user, wish},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Registration payload, already validated by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    /// Desired login name
    pub username: String,
    /// Contact address
    pub email: String,
    /// Credential hash produced by the identity layer
    pub password_hash: String,
    /// Profile text
    #[serde(default)]
    pub about: String,
    /// Avatar URL
    #[serde(default)]
    pub avatar: String,
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    /// New login name
    pub username: Option<String>,
    /// New contact address
    pub email: Option<String>,
    /// New credential hash
    pub password_hash: Option<String>,
    /// New profile text
    pub about: Option<String>,
    /// New avatar URL
    pub avatar: Option<String>,
}

async fn ensure_unique(
    db: &DatabaseConnection,
    username: Option<&str>,
    email: Option<&str>,
    except_id: Option<i64>,
) -> Result<()> {
    if let Some(username) = username {
        let mut query = User::find().filter(user::Column::Username.eq(username));
        if let Some(id) = except_id {
            query = query.filter(user::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(Error::AlreadyExists {
                field: "username".to_string(),
            });
        }
    }
    if let Some(email) = email {
        let mut query = User::find().filter(user::Column::Email.eq(email));
        if let Some(id) = except_id {
            query = query.filter(user::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(Error::AlreadyExists {
                field: "email".to_string(),
            });
        }
    }
    Ok(())
}

/// Registers a new user.
///
/// # Errors
/// Returns `AlreadyExists` if the username or email is taken.
#[instrument(skip(db, new_user), fields(username = %new_user.username))]
pub async fn register_user(db: &DatabaseConnection, new_user: NewUser) -> Result<user::Model> {
    ensure_unique(db, Some(&new_user.username), Some(&new_user.email), None).await?;

    let now = Utc::now();
    let user = user::ActiveModel {
        username: Set(new_user.username),
        email: Set(new_user.email),
        password_hash: Set(new_user.password_hash),
        about: Set(new_user.about),
        avatar: Set(new_user.avatar),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = user.insert(db).await?;
    info!(user_id = result.id, "Registered user");
    Ok(result)
}

/// Finds a user by identifier.
pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            key: user_id.to_string(),
        })
}

/// Finds a user by username.
pub async fn get_user_by_username(db: &DatabaseConnection, username: &str) -> Result<user::Model> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            key: username.to_string(),
        })
}

/// Finds users whose username or email contains `query`.
pub async fn search_users(db: &DatabaseConnection, query: &str) -> Result<Vec<user::Model>> {
    User::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.contains(query))
                .add(user::Column::Email.contains(query)),
        )
        .order_by_asc(user::Column::Username)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every wish owned by a user, oldest first.
///
/// # Errors
/// Returns `UserNotFound` if the user does not exist.
pub async fn get_wishes_by_owner(db: &DatabaseConnection, owner_id: i64) -> Result<Vec<wish::Model>> {
    let owner = get_user_by_id(db, owner_id).await?;
    owner
        .find_related(Wish)
        .order_by_asc(wish::Column::CreatedAt)
        .order_by_asc(wish::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists every wish owned by the user with the given username, oldest first.
pub async fn get_wishes_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Vec<wish::Model>> {
    let owner = get_user_by_username(db, username).await?;
    get_wishes_by_owner(db, owner.id).await
}

/// Applies a profile patch and returns the updated user.
///
/// # Errors
/// Returns `UserNotFound` if the user does not exist, or `AlreadyExists` if the
/// new username or email belongs to someone else.
#[instrument(skip(db, patch))]
pub async fn update_user(
    db: &DatabaseConnection,
    user_id: i64,
    patch: UserPatch,
) -> Result<user::Model> {
    let existing = get_user_by_id(db, user_id).await?;
    ensure_unique(
        db,
        patch.username.as_deref(),
        patch.email.as_deref(),
        Some(user_id),
    )
    .await?;

    let mut active: user::ActiveModel = existing.into();
    if let Some(username) = patch.username {
        active.username = Set(username);
    }
    if let Some(email) = patch.email {
        active.email = Set(email);
    }
    if let Some(password_hash) = patch.password_hash {
        active.password_hash = Set(password_hash);
    }
    if let Some(about) = patch.about {
        active.about = Set(about);
    }
    if let Some(avatar) = patch.avatar {
        active.avatar = Set(avatar);
    }
    active.updated_at = Set(Utc::now());

    let result = active.update(db).await?;
    info!(user_id, "Updated user profile");
    Ok(result)
}
