//! Build-time configuration of the plant monitoring sensor node.
//!
//! `cfg.toml` is parsed and checked by `build.rs`; the result is available as
//! [`config::CONFIG`] and through [`config::load_configuration`].
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod constants;
