//! # quelldex
//!
//! Lightweight embedded version control for project trees.
//!
//! This crate re-exports [`quelldex_core`]; the `quelldex` binary lives in the
//! `quelldex-cli` workspace member.

pub use quelldex_core::*;
