//! Wish entity - A gift request with a funding target.
//!
//! `price` is the target, `raised` the running total of committed offers and
//! `copied` the number of times the wish was duplicated. `raised` is never
//! written from a client payload; only funding and copy touch it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wish database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wishes")]
pub struct Model {
    /// Unique identifier for the wish
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short title
    pub name: String,
    /// Longer description
    pub description: String,
    /// Image URL
    pub image: String,
    /// Link to where the gift can be bought
    pub link: String,
    /// Funding target
    pub price: f64,
    /// Sum of committed offer amounts
    pub raised: f64,
    /// How many times this wish has been copied
    pub copied: i32,
    /// Owning user
    pub owner_id: i64,
    /// When the wish was created
    pub created_at: DateTimeUtc,
    /// When the wish was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Wish and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each wish belongs to one owner
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
    /// One wish is funded by many offers
    #[sea_orm(has_many = "super::offer::Entity")]
    Offers,
    /// Wishlist memberships
    #[sea_orm(has_many = "super::wishlist_item::Entity")]
    WishlistItems,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::offer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offers.def()
    }
}

impl Related<super::wishlist::Entity> for Entity {
    fn to() -> RelationDef {
        super::wishlist_item::Relation::Wishlist.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::wishlist_item::Relation::Wish.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
