//! Client for the hosted backend (the "gateway").
//!
//! The hosted service owns persistence, authentication, and the
//! realtime change feed; this crate wraps its REST and WebSocket
//! surfaces behind two object-safe traits:
//!
//! - [`DataGateway`] — query / insert / update / delete / subscribe.
//! - [`AuthProvider`] — session lookup, login, logout, register.
//!
//! [`RestGateway`] and [`RestAuth`] talk to the real service;
//! [`MemoryGateway`] and [`MemoryAuth`] are in-process doubles used by
//! the store crate's tests (and anything else that wants to run
//! without a network).

pub mod auth;
pub mod error;
pub mod feed;
pub mod gateway;
pub mod memory;
pub mod rest;

pub use auth::{AuthProvider, RestAuth, Session, SessionSlot};
pub use error::GatewayError;
pub use feed::FeedClient;
pub use gateway::{ChangeEvent, ChangeFeed, ChangeKind, DataGateway, Filter, Order};
pub use memory::{MemoryAuth, MemoryGateway};
pub use rest::{GatewayConfig, RestGateway};
