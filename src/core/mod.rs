//! Core business logic - framework-agnostic funding, wish and wishlist operations.
//!
//! Every operation takes an explicit connection and an already-authenticated
//! caller identifier. Multi-record writes open their own transaction.

/// Ownership and lock predicates
pub mod access;
/// Offers: funding a wish, plus the administrative edit path
pub mod offer;
/// Registration and lookup of users
pub mod user;
/// Wish lifecycle: create, edit, delete, copy, feeds
pub mod wish;
/// Curated wish collections
pub mod wishlist;
