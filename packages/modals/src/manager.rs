//! # Modal registry and show pipeline
//!
//! [`ModalManager`] maps each [`ModalId`] to at most one live instance and runs
//! every dialog through the same pipeline:
//!
//! 1. **Pre-emptive cleanup**: an instance already occupying the slot is
//!    disposed and its subtree removed, so a repeated show replaces rather than
//!    stacks.
//! 2. **Markup generation**: [`crate::markup`] renders the dialog and collects
//!    the click bindings for action buttons in the same pass.
//! 3. **Mount**: the markup is handed to the [`RenderSurface`].
//! 4. **Instantiate**: the [`DialogFactory`] builds the primitive with the
//!    backdrop/keyboard/focus options and a close notifier.
//! 5. **Bind**: every action button gets its click handler. Dismiss buttons
//!    rely on the primitive's own dismiss affordance.
//! 6. **Register**: the instance is stored under its id.
//! 7. **Present**: the primitive's `show` is called.
//!
//! ## Slot states
//!
//! A slot is either absent or live. It becomes live on `show`, and absent again
//! when the dialog's close notification fires, when [`cleanup_all`](ModalManager::cleanup_all)
//! runs, or when a later `show` supersedes it. Every instance is disposed
//! exactly once: whichever path removes it from the registry first owns its
//! teardown, and close notifications carrying a superseded [`InstanceToken`]
//! are ignored.
//!
//! ## Re-entrancy
//!
//! The manager is a cheap `Clone` handle over `Rc` state and lives on the UI
//! thread. Registry borrows never span a call into the surface, the primitive,
//! or a caller callback, so handlers are free to call back into the manager.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::backend::{CloseNotifier, DialogFactory, DialogPrimitive, RenderSurface};
use crate::config::{Labels, ModalsConfig};
use crate::error::ModalError;
use crate::markup::{self, RenderedModal};
use crate::model::{ActionHandler, InstanceToken, ModalConfig, ModalId};

/// Owner of every dialog on a page.
pub struct ModalManager<S, F>
where
    S: RenderSurface,
    F: DialogFactory<S::Mount>,
{
    shared: Rc<Shared<S, F>>,
}

/// Non-owning handle, for use inside callbacks held by the dialogs themselves.
pub struct WeakModalManager<S, F>
where
    S: RenderSurface,
    F: DialogFactory<S::Mount>,
{
    shared: Weak<Shared<S, F>>,
}

struct Shared<S, F>
where
    S: RenderSurface,
    F: DialogFactory<S::Mount>,
{
    surface: S,
    dialogs: F,
    config: ModalsConfig,
    registry: RefCell<Registry<F::Dialog>>,
}

struct Registry<D> {
    instances: HashMap<ModalId, ModalInstance<D>>,
    last_token: u64,
}

impl<D> Registry<D> {
    fn next_token(&mut self) -> InstanceToken {
        self.last_token += 1;
        InstanceToken::new(self.last_token)
    }
}

/// A live dialog.
struct ModalInstance<D> {
    token: InstanceToken,
    dialog: Rc<D>,
    button_ids: Vec<String>,
}

impl<S, F> Clone for ModalManager<S, F>
where
    S: RenderSurface,
    F: DialogFactory<S::Mount>,
{
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<S, F> Clone for WeakModalManager<S, F>
where
    S: RenderSurface,
    F: DialogFactory<S::Mount>,
{
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<S, F> WeakModalManager<S, F>
where
    S: RenderSurface,
    F: DialogFactory<S::Mount>,
{
    pub fn upgrade(&self) -> Option<ModalManager<S, F>> {
        self.shared.upgrade().map(|shared| ModalManager { shared })
    }
}

impl<S, F> ModalManager<S, F>
where
    S: RenderSurface + 'static,
    F: DialogFactory<S::Mount> + 'static,
{
    pub fn new(surface: S, dialogs: F) -> Self {
        Self::with_config(surface, dialogs, ModalsConfig::default())
    }

    pub fn with_config(surface: S, dialogs: F, config: ModalsConfig) -> Self {
        Self {
            shared: Rc::new(Shared {
                surface,
                dialogs,
                config,
                registry: RefCell::new(Registry {
                    instances: HashMap::new(),
                    last_token: 0,
                }),
            }),
        }
    }

    pub fn config(&self) -> &ModalsConfig {
        &self.shared.config
    }

    pub fn labels(&self) -> &Labels {
        &self.shared.config.labels
    }

    pub fn surface(&self) -> &S {
        &self.shared.surface
    }

    pub fn dialogs(&self) -> &F {
        &self.shared.dialogs
    }

    pub fn downgrade(&self) -> WeakModalManager<S, F> {
        WeakModalManager {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Show `config` in slot `id`, replacing whatever lives there.
    pub fn show(
        &self,
        id: impl Into<ModalId>,
        config: ModalConfig,
    ) -> Result<InstanceToken, ModalError> {
        let id = id.into();
        self.cleanup(&id)?;

        let token = self.shared.registry.borrow_mut().next_token();
        let RenderedModal {
            markup,
            button_ids,
            actions,
        } = markup::render_modal(&id, token, &config, &self.shared.config.labels);

        let mount = self.shared.surface.mount(id.as_str(), &markup)?;
        let dialog = match self.instantiate(&id, token, &mount, &config, actions) {
            Ok(dialog) => dialog,
            Err(err) => {
                if let Err(remove_err) = self.shared.surface.remove(id.as_str()) {
                    tracing::warn!("Failed to unmount modal {} after error: {}", id, remove_err);
                }
                return Err(err);
            }
        };

        self.shared.registry.borrow_mut().instances.insert(
            id.clone(),
            ModalInstance {
                token,
                dialog: Rc::clone(&dialog),
                button_ids,
            },
        );

        if let Err(err) = dialog.show() {
            if let Err(cleanup_err) = self.cleanup(&id) {
                tracing::warn!("Failed to clean up modal {} after error: {}", id, cleanup_err);
            }
            return Err(err);
        }
        tracing::debug!("Showing modal {} (instance {})", id, token);
        Ok(token)
    }

    fn instantiate(
        &self,
        id: &ModalId,
        token: InstanceToken,
        mount: &S::Mount,
        config: &ModalConfig,
        actions: Vec<(String, ActionHandler)>,
    ) -> Result<Rc<F::Dialog>, ModalError> {
        let dialog = self.shared.dialogs.create(
            mount,
            config.dialog_options(),
            self.close_notifier(id, token),
        )?;
        for (element_id, action) in actions {
            if let Err(err) = self.shared.surface.bind_click(mount, &element_id, action) {
                if let Err(dispose_err) = dialog.dispose() {
                    tracing::warn!("Failed to dispose modal {} after error: {}", id, dispose_err);
                }
                return Err(err);
            }
        }
        Ok(Rc::new(dialog))
    }

    fn close_notifier(&self, id: &ModalId, token: InstanceToken) -> CloseNotifier {
        let manager = self.downgrade();
        let id = id.clone();
        CloseNotifier::new(move || {
            if let Some(manager) = manager.upgrade() {
                manager.on_dialog_closed(&id, token);
            }
        })
    }

    fn on_dialog_closed(&self, id: &ModalId, token: InstanceToken) {
        let instance = {
            let mut registry = self.shared.registry.borrow_mut();
            let is_current = registry
                .instances
                .get(id)
                .is_some_and(|live| live.token == token);
            if is_current {
                registry.instances.remove(id)
            } else {
                None
            }
        };
        let Some(instance) = instance else {
            tracing::debug!("Ignoring close of stale modal {} (instance {})", id, token);
            return;
        };
        if let Err(err) = self.destroy(id, Some(instance)) {
            tracing::warn!("Failed to clean up closed modal {}: {}", id, err);
        }
    }

    /// Hide the dialog in slot `id`. Its close notification then removes it.
    /// No-op when the slot is empty.
    pub fn hide(&self, id: impl AsRef<str>) -> Result<(), ModalError> {
        let id = id.as_ref();
        let dialog = self
            .shared
            .registry
            .borrow()
            .instances
            .get(id)
            .map(|instance| Rc::clone(&instance.dialog));
        match dialog {
            Some(dialog) => {
                tracing::debug!("Hiding modal {}", id);
                dialog.hide()
            }
            None => Ok(()),
        }
    }

    /// Hide and dispose every live dialog. Keeps going past failures and
    /// returns the first one.
    pub fn cleanup_all(&self) -> Result<(), ModalError> {
        let instances: Vec<(ModalId, ModalInstance<F::Dialog>)> =
            self.shared.registry.borrow_mut().instances.drain().collect();
        tracing::debug!("Cleaning up {} modal(s)", instances.len());

        let mut first_err = None;
        for (id, instance) in instances {
            let hidden = instance.dialog.hide();
            let destroyed = self.destroy(&id, Some(instance));
            if let Err(err) = hidden.and(destroyed) {
                tracing::warn!("Failed to clean up modal {}: {}", id, err);
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn cleanup(&self, id: &ModalId) -> Result<(), ModalError> {
        let instance = self.shared.registry.borrow_mut().instances.remove(id);
        self.destroy(id, instance)
    }

    /// Dispose an instance already taken out of the registry and remove the
    /// slot's subtree. The subtree is removed even when disposal fails.
    fn destroy(
        &self,
        id: &ModalId,
        instance: Option<ModalInstance<F::Dialog>>,
    ) -> Result<(), ModalError> {
        let disposed = match &instance {
            Some(instance) => {
                tracing::debug!("Disposing modal {} (instance {})", id, instance.token);
                instance.dialog.dispose()
            }
            None => Ok(()),
        };
        let removed = self.shared.surface.remove(id.as_str());
        disposed.and(removed)
    }

    pub fn is_live(&self, id: impl AsRef<str>) -> bool {
        self.shared
            .registry
            .borrow()
            .instances
            .contains_key(id.as_ref())
    }

    pub fn live_count(&self) -> usize {
        self.shared.registry.borrow().instances.len()
    }

    /// Ids of all live dialogs, sorted.
    pub fn live_ids(&self) -> Vec<ModalId> {
        let mut ids: Vec<ModalId> = self
            .shared
            .registry
            .borrow()
            .instances
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn instance_token(&self, id: impl AsRef<str>) -> Option<InstanceToken> {
        self.shared
            .registry
            .borrow()
            .instances
            .get(id.as_ref())
            .map(|instance| instance.token)
    }

    /// Generated DOM ids of the live dialog's buttons, in display order.
    pub fn button_ids(&self, id: impl AsRef<str>) -> Vec<String> {
        self.shared
            .registry
            .borrow()
            .instances
            .get(id.as_ref())
            .map(|instance| instance.button_ids.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{DialogEvent, MemoryDialogs, MemorySurface};
    use crate::model::{Backdrop, ButtonSpec, DialogOptions};
    use std::cell::Cell;

    type TestManager = ModalManager<MemorySurface, MemoryDialogs>;

    fn manager() -> TestManager {
        ModalManager::new(MemorySurface::new(), MemoryDialogs::new())
    }

    #[test]
    fn test_show_registers_and_presents() {
        let modals = manager();
        let token = modals
            .show("reportModal", ModalConfig::new("Report", "<p>ok</p>"))
            .unwrap();

        assert!(modals.is_live("reportModal"));
        assert_eq!(modals.instance_token("reportModal"), Some(token));
        assert_eq!(modals.surface().mounted_ids(), ["reportModal"]);
        assert!(modals.dialogs().is_visible("reportModal"));
        assert_eq!(
            modals.dialogs().events(),
            [
                DialogEvent::Created("reportModal".to_string()),
                DialogEvent::Shown("reportModal".to_string()),
            ]
        );
    }

    #[test]
    fn test_show_same_id_replaces_instance() {
        let modals = manager();
        let first = modals.show("m", ModalConfig::new("First", "one")).unwrap();
        let second = modals.show("m", ModalConfig::new("Second", "two")).unwrap();

        assert_ne!(first, second);
        assert_eq!(modals.live_count(), 1);
        assert_eq!(modals.instance_token("m"), Some(second));
        assert_eq!(modals.surface().mounted_count(), 1);

        let html = modals.surface().markup("m").unwrap();
        assert!(html.as_str().contains("Second"));
        assert!(!html.as_str().contains("First"));
        assert_eq!(modals.dialogs().disposed_count("m"), 1);
    }

    #[test]
    fn test_stale_close_notification_is_ignored() {
        let modals = manager();
        modals.show("m", ModalConfig::new("First", "one")).unwrap();
        let stale = modals.dialogs().dialog("m").unwrap();
        modals.show("m", ModalConfig::new("Second", "two")).unwrap();

        // The superseded dialog reports a close after it was replaced.
        stale.fire_closed();

        assert!(modals.is_live("m"));
        assert!(modals.surface().markup("m").is_some());
        assert_eq!(modals.dialogs().disposed_count("m"), 1);
    }

    #[test]
    fn test_independent_slots() {
        let modals = manager();
        modals.show("a", ModalConfig::new("A", "a")).unwrap();
        modals.show("b", ModalConfig::new("B", "b")).unwrap();
        modals.hide("a").unwrap();

        assert_eq!(modals.live_ids(), [ModalId::from("b")]);
        assert_eq!(modals.surface().mounted_ids(), ["b"]);
    }

    #[test]
    fn test_hide_removes_after_close_and_ignores_absent() {
        let modals = manager();
        modals.hide("nothing").unwrap();

        modals.show("m", ModalConfig::new("T", "b")).unwrap();
        modals.hide("m").unwrap();

        assert!(!modals.is_live("m"));
        assert_eq!(modals.surface().mounted_count(), 0);
        assert_eq!(modals.dialogs().disposed_count("m"), 1);

        // A second hide on the now-empty slot does nothing.
        modals.hide("m").unwrap();
        assert_eq!(modals.dialogs().disposed_count("m"), 1);
    }

    #[test]
    fn test_user_dismissal_cleans_up() {
        let modals = manager();
        modals.show("m", ModalConfig::new("T", "b")).unwrap();

        assert!(modals.dialogs().dismiss("m"));
        assert!(!modals.is_live("m"));
        assert!(modals.surface().markup("m").is_none());
    }

    #[test]
    fn test_cleanup_all_disposes_everything_once() {
        let modals = manager();
        for id in ["a", "b", "c"] {
            modals.show(id, ModalConfig::new(id, "body")).unwrap();
        }
        modals.cleanup_all().unwrap();

        assert_eq!(modals.live_count(), 0);
        assert_eq!(modals.surface().mounted_count(), 0);
        for id in ["a", "b", "c"] {
            assert_eq!(modals.dialogs().created_count(id), 1);
            assert_eq!(modals.dialogs().disposed_count(id), 1);
        }

        modals.cleanup_all().unwrap();
        assert_eq!(modals.dialogs().disposed_count("a"), 1);
    }

    #[test]
    fn test_action_does_not_auto_dismiss() {
        let modals = manager();
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        modals
            .show(
                "m",
                ModalConfig::new("T", "b")
                    .button(ButtonSpec::action("Go", move || counter.set(counter.get() + 1))),
            )
            .unwrap();

        let go = modals.button_ids("m")[0].clone();
        assert!(modals.surface().click(&go));
        assert!(modals.surface().click(&go));

        assert_eq!(clicks.get(), 2);
        assert!(modals.is_live("m"));
        assert!(modals.dialogs().is_visible("m"));
    }

    #[test]
    fn test_action_can_hide_its_own_dialog() {
        let modals = manager();
        let weak = modals.downgrade();
        modals
            .show(
                "m",
                ModalConfig::new("T", "b").button(ButtonSpec::action("Done", move || {
                    if let Some(modals) = weak.upgrade() {
                        modals.hide("m").unwrap();
                    }
                })),
            )
            .unwrap();

        let done = modals.button_ids("m")[0].clone();
        assert!(modals.surface().click(&done));
        assert!(!modals.is_live("m"));
        assert!(!modals.surface().click(&done));
    }

    #[test]
    fn test_action_can_replace_its_own_dialog() {
        let modals = manager();
        let weak = modals.downgrade();
        modals
            .show(
                "m",
                ModalConfig::new("Step 1", "b").button(ButtonSpec::action("Next", move || {
                    if let Some(modals) = weak.upgrade() {
                        modals.show("m", ModalConfig::new("Step 2", "b")).unwrap();
                    }
                })),
            )
            .unwrap();

        let next = modals.button_ids("m")[0].clone();
        modals.surface().click(&next);

        assert_eq!(modals.live_count(), 1);
        assert!(modals.surface().markup("m").unwrap().as_str().contains("Step 2"));
    }

    #[test]
    fn test_button_ids_unique_across_generations() {
        let modals = manager();
        let config = || ModalConfig::new("T", "b").button(ButtonSpec::action("Go", || {}).name("go"));

        modals.show("m", config()).unwrap();
        let first = modals.button_ids("m");
        modals.show("m", config()).unwrap();
        let second = modals.button_ids("m");

        assert_ne!(first, second);
        assert!(!modals.surface().is_bound(&first[0]));
        assert!(modals.surface().is_bound(&second[0]));
    }

    #[test]
    fn test_button_ids_unique_across_concurrent_slots() {
        let modals = manager();
        let a_hits = Rc::new(Cell::new(0));
        let b_hits = Rc::new(Cell::new(0));

        let hits = Rc::clone(&a_hits);
        modals
            .show(
                "a",
                ModalConfig::new("A", "a")
                    .button(ButtonSpec::action("One", || {}))
                    .button(ButtonSpec::action("Two", || {}))
                    .button(ButtonSpec::action("Three", move || hits.set(hits.get() + 1)).name("0")),
            )
            .unwrap();
        let hits = Rc::clone(&b_hits);
        modals
            .show(
                "a-1",
                ModalConfig::new("B", "b")
                    .button(ButtonSpec::action("Go", move || hits.set(hits.get() + 1))),
            )
            .unwrap();

        let a_ids = modals.button_ids("a");
        let b_ids = modals.button_ids("a-1");
        assert!(b_ids.iter().all(|id| !a_ids.contains(id)));

        assert!(modals.surface().click(&b_ids[0]));
        assert_eq!(b_hits.get(), 1);
        assert_eq!(a_hits.get(), 0);
    }

    #[test]
    fn test_dialog_receives_options() {
        let modals = manager();
        let mut config = ModalConfig::new("T", "b");
        config.backdrop = Backdrop::Static;
        config.keyboard = false;
        modals.show("m", config).unwrap();

        assert_eq!(
            modals.dialogs().options("m"),
            Some(DialogOptions {
                backdrop: Backdrop::Static,
                keyboard: false,
                focus: true,
            })
        );
    }

    #[test]
    fn test_failed_create_unmounts() {
        let modals = manager();
        modals.dialogs().fail_next_create();

        let err = modals.show("m", ModalConfig::new("T", "b")).unwrap_err();
        assert!(matches!(err, ModalError::Dialog { .. }));
        assert!(!modals.is_live("m"));
        assert_eq!(modals.surface().mounted_count(), 0);

        // The slot is usable again afterwards.
        modals.show("m", ModalConfig::new("T", "b")).unwrap();
        assert!(modals.is_live("m"));
    }

    #[test]
    fn test_single_instance_under_mixed_sequence() {
        let modals = manager();
        let ids = ["a", "b", "a", "c", "a", "b"];
        for (step, id) in ids.iter().enumerate() {
            modals.show(*id, ModalConfig::new("T", "b")).unwrap();
            if step % 2 == 1 {
                modals.hide("a").unwrap();
            }
            for slot in ["a", "b", "c"] {
                let mounted = modals
                    .surface()
                    .mounted_ids()
                    .iter()
                    .filter(|m| m.as_str() == slot)
                    .count();
                assert!(mounted <= 1);
                assert_eq!(mounted == 1, modals.is_live(slot));
            }
        }
    }
}
