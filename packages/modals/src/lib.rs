//! # Modals — dialog lifecycle management for server-rendered pages
//!
//! [`ModalManager`] owns every dynamically generated dialog on a page. Each
//! dialog lives in a named slot ([`ModalId`]); showing a dialog in an occupied
//! slot tears the old one down first, so a slot never holds more than one live
//! instance.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`model`] | Identifiers, sizes, buttons and the resolved [`ModalConfig`]. |
//! | [`config`] | `modals.toml`: localised [`Labels`] and per-intent option overrides. |
//! | [`markup`] | HTML generation for dialogs and key/value detail tables. |
//! | [`backend`] | The [`RenderSurface`] / [`DialogFactory`] / [`DialogPrimitive`] seams. |
//! | [`manager`] | Registry and the show/cleanup pipeline. |
//! | [`intents`] | Detail, edit, create, delete, custom, loading and confirm dialogs. |
//!
//! Two backends ship with the crate: [`MemorySurface`] + [`MemoryDialogs`]
//! (headless, used in tests and native builds) and, with the `web` feature on
//! `wasm32`, [`DomSurface`] + [`BootstrapDialogs`].

pub mod backend;
pub mod config;
mod error;
pub mod intents;
pub mod manager;
pub mod markup;
pub mod model;

mod memory;
pub use memory::{DialogEvent, MemoryDialog, MemoryDialogs, MemorySurface};

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod dom;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use dom::{BootstrapDialog, BootstrapDialogs, DomSurface};

pub use backend::{CloseNotifier, DialogFactory, DialogPrimitive, RenderSurface};
pub use config::{IntentOverrides, Labels, ModalsConfig};
pub use error::ModalError;
pub use manager::{ModalManager, WeakModalManager};
pub use markup::{DetailContent, Markup};
pub use model::{
    ActionHandler, Backdrop, ButtonKind, ButtonSpec, ButtonStyle, DialogOptions, InstanceToken,
    ModalConfig, ModalId, ModalOptions, ModalSize,
};
