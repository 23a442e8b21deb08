//! Core types, services and trait definitions for the SkillSwap backend.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`store::DocumentStore`]; real-time transports implement
//! [`bus::DeliveryBus`]. The service modules (`accounts`, `board`,
//! `directory`, `messaging`) are generic over both and are shared by every
//! entry point, REST or socket.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod accounts;
pub mod board;
pub mod bus;
pub mod clock;
pub mod contact;
pub mod conversation;
pub mod directory;
pub mod error;
pub mod identity;
pub mod messaging;
pub mod resource;
pub mod store;
pub mod user;

pub use error::{Error, Result};
