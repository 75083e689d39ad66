//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Records reference each other by identifier; nothing embeds a back-pointer.

pub mod offer;
pub mod user;
pub mod wish;
pub mod wishlist;
pub mod wishlist_item;

// Re-export specific types to avoid conflicts
pub use offer::{Column as OfferColumn, Entity as Offer, Model as OfferModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, UserProfile};
pub use wish::{Column as WishColumn, Entity as Wish, Model as WishModel};
pub use wishlist::{Column as WishlistColumn, Entity as Wishlist, Model as WishlistModel};
pub use wishlist_item::{
    Column as WishlistItemColumn, Entity as WishlistItem, Model as WishlistItemModel,
};
