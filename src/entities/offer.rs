//! Offer entity - A single contributor's pledge toward a wish.
//!
//! Offers are bookkeeping entries; the sum of `amount` over a wish's offers is
//! what its `raised` counter tracks.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Offer database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "offers")]
pub struct Model {
    /// Unique identifier for the offer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Pledged amount, always positive
    pub amount: f64,
    /// Whether the contributor asked to stay out of public listings
    pub hidden: bool,
    /// ID of the funded wish
    pub wish_id: i64,
    /// ID of the contributing user
    pub user_id: i64,
    /// When the offer was made
    pub created_at: DateTimeUtc,
    /// When the offer was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Offer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each offer funds one wish
    #[sea_orm(
        belongs_to = "super::wish::Entity",
        from = "Column::WishId",
        to = "super::wish::Column::Id"
    )]
    Wish,
    /// Each offer is made by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    Contributor,
}

impl Related<super::wish::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wish.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
