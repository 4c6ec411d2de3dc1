//! Storefront-side models.
//!
//! Domain types live in `shopfront_core`; this module only holds what is
//! tied to the HTTP session.

pub mod session;
