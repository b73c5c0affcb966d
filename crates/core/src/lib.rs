//! App Shop Core - shared domain library.
//!
//! This crate holds what both web binaries agree on:
//! - `storefront` - public shop: browsing, checkout, order history
//! - `admin` - back-office: dashboard and role management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no sessions. Handlers in the binaries fetch data, feed it through
//! these types and render the result.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices and statuses
//! - [`access`] - Page policies and the guard decision
//! - [`checkout`] - Cart selection, totals and the order payload
//! - [`role`] - Roles and the create/edit modal state machine
//! - [`sitemap`] - Sitemap entries and `robots.txt`

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod checkout;
pub mod notification;
pub mod order;
pub mod pagination;
pub mod permissions;
pub mod product;
pub mod remote;
pub mod role;
pub mod sitemap;
pub mod types;
pub mod user;

pub use types::*;
