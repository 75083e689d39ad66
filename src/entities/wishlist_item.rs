//! Wishlist item - join row linking a wishlist to one of its wishes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wishlist membership model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wishlist_items")]
pub struct Model {
    /// Containing wishlist
    #[sea_orm(primary_key, auto_increment = false)]
    pub wishlist_id: i64,
    /// Referenced wish
    #[sea_orm(primary_key, auto_increment = false)]
    pub wish_id: i64,
}

/// Defines relationships between a membership row and its two sides
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The wishlist side
    #[sea_orm(
        belongs_to = "super::wishlist::Entity",
        from = "Column::WishlistId",
        to = "super::wishlist::Column::Id",
        on_delete = "Cascade"
    )]
    Wishlist,
    /// The wish side
    #[sea_orm(
        belongs_to = "super::wish::Entity",
        from = "Column::WishId",
        to = "super::wish::Column::Id",
        on_delete = "Cascade"
    )]
    Wish,
}

impl Related<super::wishlist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wishlist.def()
    }
}

impl Related<super::wish::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wish.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
