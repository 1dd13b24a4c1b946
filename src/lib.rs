//! Append-only, hash-linked ledger of book checkouts.

pub mod api;
pub mod block;
pub mod book;
pub mod chain;
pub mod config;
pub mod error;
pub mod hash;
