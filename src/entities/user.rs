//! User entity - Represents a registered account.
//!
//! Users own wishes and wishlists and are referenced (never owned) by the
//! offers they make. The credential is stored as an opaque, already-hashed string.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique across all users
    #[sea_orm(unique)]
    pub username: String,
    /// Contact address, unique across all users
    #[sea_orm(unique)]
    pub email: String,
    /// Hashed credential produced by the identity layer
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Free-form profile text
    pub about: String,
    /// Avatar image URL
    pub avatar: String,
    /// When the user registered
    pub created_at: DateTimeUtc,
    /// When the profile was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many wishes
    #[sea_orm(has_many = "super::wish::Entity")]
    Wishes,
    /// One user makes many offers
    #[sea_orm(has_many = "super::offer::Entity")]
    Offers,
    /// One user curates many wishlists
    #[sea_orm(has_many = "super::wishlist::Entity")]
    Wishlists,
}

impl Related<super::wish::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wishes.def()
    }
}

impl Related<super::offer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offers.def()
    }
}

impl Related<super::wishlist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wishlists.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Public view of a user, without contact details or credential.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    /// User identifier
    pub id: i64,
    /// Login name
    pub username: String,
    /// Free-form profile text
    pub about: String,
    /// Avatar image URL
    pub avatar: String,
    /// When the user registered
    pub created_at: DateTimeUtc,
    /// When the profile was last modified
    pub updated_at: DateTimeUtc,
}

impl From<Model> for UserProfile {
    fn from(user: Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            about: user.about,
            avatar: user.avatar,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
