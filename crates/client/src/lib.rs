//! Voltstore Client - storefront client library.
//!
//! Everything a storefront or admin frontend needs to talk to the store:
//!
//! - [`cart`] - The cart engine: an explicitly-owned line-item container
//!   with merge-by-id semantics and a recomputed total
//! - [`checkout`] - Form validation and the cart-to-order submission flow
//! - [`history`] - Locally-kept order history, independent of server state
//! - [`storage`] - Durable local key-value storage behind a trait seam
//! - [`api`] - HTTP client for the store's JSON API
//! - [`events`] - Invalidation-channel subscriber with reconnect
//! - [`catalog`] - The built-in static catalog
//!
//! State containers are injected, never global: construct a [`cart::Cart`]
//! over whatever [`storage::LocalStore`] fits (a [`storage::FileStore`] in
//! an app, a [`storage::MemoryStore`] in tests) and pass it where it is
//! needed. Connect the [`events`] channel *before* the first fetch; the
//! fetch is authoritative and the channel only signals subsequent changes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod events;
pub mod history;
pub mod storage;

pub use api::{ApiError, OrderGateway, StoreApi};
pub use cart::{Cart, CartSource, CartState, LineItem};
pub use checkout::{CheckoutError, CheckoutFlow, CheckoutForm};
pub use events::ChannelClient;
pub use history::{HistorySource, OrderHistory, reconcile};
pub use storage::{FileStore, LocalStore, MemoryStore};
