#![forbid(unsafe_code)]

//! Browser shell for the Keepsake event site.
//!
//! # Role in Keepsake
//! `keepsake-web` is the only crate that touches the document. It resolves
//! element roles to CSS selectors, feeds browser events, timers, and
//! observer callbacks into [`keepsake_core::PageRuntime`], and applies the
//! commands the runtime emits.
//!
//! # Layout
//! - [`selectors`]: role → selector table and the JSON configuration.
//! - [`dom_ops`]: pure translation of commands into DOM operations.
//! - [`console_log`]: `tracing` output on the browser console.
//! - `wasm` (wasm32 only): `start()` / `KeepsakeHandle` exports and the
//!   `web-sys` bindings.

pub mod console_log;
pub mod dom_ops;
pub mod selectors;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{KeepsakeHandle, start};

pub use selectors::{SelectorMap, WebConfig};
