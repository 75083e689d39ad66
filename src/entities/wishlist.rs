//! Wishlist entity - A named, owner-curated set of wishes.
//!
//! Membership lives in the `wishlist_items` join table. Items may reference any
//! wish, not only the owner's own.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wishlist database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wishlists")]
pub struct Model {
    /// Unique identifier for the wishlist
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Title of the collection
    pub name: String,
    /// Description, empty by default
    pub description: String,
    /// Cover image URL
    pub image: String,
    /// Curating user; `None` for orphaned collections
    pub user_id: Option<i64>,
    /// When the wishlist was created
    pub created_at: DateTimeUtc,
    /// When the wishlist was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Wishlist and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each wishlist belongs to at most one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Owner,
    /// Membership rows
    #[sea_orm(has_many = "super::wishlist_item::Entity")]
    Items,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::wishlist_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::wish::Entity> for Entity {
    fn to() -> RelationDef {
        super::wishlist_item::Relation::Wish.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::wishlist_item::Relation::Wishlist.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
