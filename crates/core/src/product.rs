//! The uniform product shape the rest of the storefront works with.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// A catalog product after normalization.
///
/// Products are immutable once built; a new catalog fetch replaces the whole
/// list rather than patching individual entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub description: String,
    pub image: String,
    pub category: String,
    pub seller: String,
    pub rating: Option<Rating>,
    pub details: ListingDetails,
}

/// Customer rating as reported by the products API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: Decimal,
    pub count: u32,
}

/// Listing attributes that some product sources omit.
///
/// Missing values are filled with random placeholders so cards always have
/// something to show; see [`Filled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDetails {
    pub baths: Filled<u32>,
    pub beds: Filled<u32>,
    pub area: Filled<u32>,
}

/// A value that was either supplied by the source record or filled in.
///
/// `Random` values are unspecified: normalizing the same record twice may
/// produce different numbers. Only their range is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum Filled<T> {
    /// Taken from the remote record.
    Provided(T),
    /// Unspecified, randomly filled placeholder.
    Random(T),
}

impl<T: Copy> Filled<T> {
    /// The value regardless of where it came from.
    #[must_use]
    pub const fn value(&self) -> T {
        match *self {
            Self::Provided(v) | Self::Random(v) => v,
        }
    }

    /// Whether the value is a random placeholder.
    #[must_use]
    pub const fn is_random(&self) -> bool {
        matches!(self, Self::Random(_))
    }
}
