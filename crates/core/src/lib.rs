//! Shopfront Core - domain types and state machines.
//!
//! This crate holds the parts of the storefront that do not touch the
//! network, the database or the clock on their own:
//!
//! - [`cart`] - Cart line items and the cart state machine
//! - [`catalog`] - Catalog load state with generation-checked completions
//! - [`normalize`] - Mapping of loosely typed remote records into [`Product`]s
//! - [`product`] - The normalized product shape
//! - [`filter`] - Search, category filter and "load more" pagination
//! - [`countdown`] - Deadline-based countdown for the exclusive offer
//! - [`text`] - Small display helpers shared by templates
//! - [`types`] - Newtype IDs, prices and load statuses
//!
//! # Architecture
//!
//! Everything here is synchronous and deterministic given its inputs. The
//! current time and the random source are passed in by the caller, which
//! keeps the storefront crate in charge of timers, I/O and logging.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod countdown;
pub mod filter;
pub mod normalize;
pub mod product;
pub mod text;
pub mod types;

pub use cart::{Cart, CartAction, CartChange, CartLineItem, CartProduct};
pub use catalog::{CatalogState, LoadTicket};
pub use countdown::{Countdown, CountdownStart, TimeLeft};
pub use filter::{FilterCriteria, FilterResult, FilteredPage, VisibleCount};
pub use normalize::{NormalizeError, NormalizedCatalog, RawProduct};
pub use product::{Filled, ListingDetails, Product, Rating};
pub use types::*;
