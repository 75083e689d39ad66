//! Unified error type for the funding core.
//!
//! Domain failures are raised where they are detected and travel unchanged to
//! the caller. [`Error::kind`] and [`Error::status_code`] let a transport layer
//! translate them without matching on every variant.

use thiserror::Error;

/// Coarse classification of an [`Error`], as seen by a boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced wish, offer, wishlist or user does not exist
    NotFound,
    /// Caller is not the owner, or a lock invariant blocks the mutation
    AccessDenied,
    /// Funding would overfund a wish, or the owner tried to fund their own wish
    BadOffer,
    /// A unique field is already taken
    AlreadyExists,
    /// Storage or configuration failure
    Internal,
}

/// Errors produced by the funding core.
#[derive(Debug, Error)]
pub enum Error {
    /// No wish with this identifier
    #[error("Wish not found: {id}")]
    WishNotFound {
        /// Identifier that was looked up
        id: i64,
    },

    /// No offer with this identifier
    #[error("Offer not found: {id}")]
    OfferNotFound {
        /// Identifier that was looked up
        id: i64,
    },

    /// No wishlist with this identifier
    #[error("Wishlist not found: {id}")]
    WishlistNotFound {
        /// Identifier that was looked up
        id: i64,
    },

    /// No user matching the lookup key
    #[error("User not found: {key}")]
    UserNotFound {
        /// Identifier or username that was looked up
        key: String,
    },

    /// Ownership or lock violation
    #[error("Access denied: {reason}")]
    AccessDenied {
        /// Which rule rejected the call
        reason: String,
    },

    /// Rejected funding attempt
    #[error("Bad offer: {reason}")]
    BadOffer {
        /// Which rule rejected the offer
        reason: String,
    },

    /// Amount is zero, negative or not a finite number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Duplicate value for a unique field
    #[error("Already exists: {field}")]
    AlreadyExists {
        /// Name of the conflicting field
        field: String,
    },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable cause
        message: String,
    },

    /// Record store failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl Error {
    pub(crate) fn access_denied(reason: impl Into<String>) -> Self {
        Self::AccessDenied {
            reason: reason.into(),
        }
    }

    pub(crate) fn bad_offer(reason: impl Into<String>) -> Self {
        Self::BadOffer {
            reason: reason.into(),
        }
    }

    /// Classifies this error into one of the boundary-facing kinds.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::WishNotFound { .. }
            | Self::OfferNotFound { .. }
            | Self::WishlistNotFound { .. }
            | Self::UserNotFound { .. } => ErrorKind::NotFound,
            Self::AccessDenied { .. } => ErrorKind::AccessDenied,
            Self::BadOffer { .. } | Self::InvalidAmount { .. } => ErrorKind::BadOffer,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Config { .. } | Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status a transport layer should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::AccessDenied => 403,
            ErrorKind::AlreadyExists => 409,
            ErrorKind::NotFound => 404,
            ErrorKind::BadOffer => 400,
            ErrorKind::Internal => 500,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
