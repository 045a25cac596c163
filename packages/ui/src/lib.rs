//! This crate contains all shared UI for the workspace.

mod modal_provider;
pub use modal_provider::{
    platform_modals, use_modals, ModalProvider, PlatformModals, WeakPlatformModals,
};
