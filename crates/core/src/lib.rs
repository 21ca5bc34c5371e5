//! Voltstore Core - Shared domain types.
//!
//! This crate provides the types shared by all Voltstore components:
//! - `server` - JSON API, WebSocket broadcast, and persistence
//! - `client` - Storefront client library (cart, checkout, history)
//! - `cli` - Command-line tools for migrations and admin management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email addresses, and order status
//! - [`product`] - Product wire types
//! - [`order`] - Order, line-item snapshot, and customer wire types
//! - [`event`] - Invalidation-channel message shapes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod event;
pub mod order;
pub mod product;
pub mod types;

pub use event::ChangeEvent;
pub use order::{Customer, NewOrder, Order, OrderItem, items_total};
pub use product::{NewProduct, Product};
pub use types::*;
