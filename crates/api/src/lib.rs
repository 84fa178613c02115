//! HTTP API layer for foodgram-rs.
//!
//! REST endpoints for the recipe catalog, the per-user toggle relations
//! (favorites, shopping cart, subscriptions) and the shopping-list
//! download. Built on Axum 0.8 with a Tower middleware stack; token
//! authentication runs as middleware and hands the resolved user to the
//! handlers through request extensions.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{auth_middleware, AppState};
