//! # cidnav Core
//!
//! Core traits, types, and errors for the cidnav content browser.
//!
//! The browser engine never talks to a peer-to-peer library directly. It
//! consumes a content network through the narrow [`ContentNode`] capability
//! and writes view models to a [`DisplaySurface`]. This crate defines those
//! seams so the same engine runs against a real node or the in-memory
//! [`MockNode`] used in tests.
//!
//! ## Key Traits
//!
//! - [`ContentNode`]: content retrieval, block store, peer status and events
//! - [`Blockstore`]: key/value block storage keyed by content identifier
//! - [`DisplaySurface`]: the named display regions the engine writes to
//! - [`Clipboard`]: scoped clipboard write access
//!
//! ## Key Types
//!
//! - [`ContentId`] / [`RootCid`]: content identifiers
//! - [`PeerId`] / [`PeerRecord`]: peer identity and discovery metadata
//! - [`NodeEvent`] / [`NodeStatus`]: node notifications and operational status
//! - [`ContentView`] / [`NavAction`]: what the content area shows and what its
//!   controls do

pub mod blockstore;
pub mod error;
pub mod event;
pub mod identifier;
pub mod mock;
pub mod peer;
pub mod traits;
pub mod view;

// Re-export main types
pub use blockstore::*;
pub use error::*;
pub use event::*;
pub use identifier::*;
pub use mock::*;
pub use peer::*;
pub use traits::*;
pub use view::*;
