//! Modal manager context for the app.
//!
//! [`ModalProvider`] builds one [`modals::ModalManager`] per app with the
//! platform-appropriate backend and shares it through context:
//! - **Web** (WASM + `web` feature): DOM surface + `bootstrap.Modal`
//! - **Desktop / Mobile** (native): headless memory backend

use dioxus::prelude::*;
use modals::{ModalManager, ModalsConfig, WeakModalManager};

#[cfg(all(target_arch = "wasm32", feature = "web"))]
type Surface = modals::DomSurface;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
type Dialogs = modals::BootstrapDialogs;

#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
type Surface = modals::MemorySurface;
#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
type Dialogs = modals::MemoryDialogs;

pub type PlatformModals = ModalManager<Surface, Dialogs>;
pub type WeakPlatformModals = WeakModalManager<Surface, Dialogs>;

/// Create a manager backed by the current platform's surface and dialogs.
pub fn platform_modals(config: ModalsConfig) -> PlatformModals {
    ModalManager::with_config(Surface::new(), Dialogs::new(), config)
}

/// Get the app's modal manager.
/// Must be called below a [`ModalProvider`].
pub fn use_modals() -> PlatformModals {
    use_context::<PlatformModals>()
}

/// Provider component that owns the modal manager.
/// Every dialog still open when the provider unmounts is cleaned up.
#[component]
pub fn ModalProvider(#[props(default)] config: ModalsConfig, children: Element) -> Element {
    let modals = use_context_provider(|| platform_modals(config));

    use_drop(move || {
        if let Err(e) = modals.cleanup_all() {
            tracing::error!("Failed to clean up modals: {}", e);
        }
    });

    rsx! {
        {children}
    }
}
