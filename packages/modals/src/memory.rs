//! Headless backend: a DOM-less [`RenderSurface`] and [`DialogFactory`].
//!
//! Used by tests and by native builds where there is no browser document.
//! Both types are cheap `Clone` handles, so a caller can keep one copy for
//! inspection while the manager owns another.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::backend::{CloseNotifier, DialogFactory, DialogPrimitive, RenderSurface};
use crate::error::ModalError;
use crate::markup::Markup;
use crate::model::{ActionHandler, Backdrop, DialogOptions};

/// In-memory rendering surface recording mounted markup and click bindings.
#[derive(Clone, Debug, Default)]
pub struct MemorySurface {
    state: Rc<RefCell<SurfaceState>>,
}

#[derive(Debug, Default)]
struct SurfaceState {
    /// Mounted roots in insertion order.
    mounted: Vec<(String, Markup)>,
    bindings: Vec<Binding>,
}

#[derive(Debug)]
struct Binding {
    root: String,
    element_id: String,
    action: ActionHandler,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mounted_ids(&self) -> Vec<String> {
        self.state
            .borrow()
            .mounted
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn mounted_count(&self) -> usize {
        self.state.borrow().mounted.len()
    }

    pub fn markup(&self, element_id: &str) -> Option<Markup> {
        self.state
            .borrow()
            .mounted
            .iter()
            .find(|(id, _)| id == element_id)
            .map(|(_, markup)| markup.clone())
    }

    pub fn is_bound(&self, element_id: &str) -> bool {
        self.state
            .borrow()
            .bindings
            .iter()
            .any(|binding| binding.element_id == element_id)
    }

    /// Simulate a click. Returns whether a handler ran.
    pub fn click(&self, element_id: &str) -> bool {
        let action = self
            .state
            .borrow()
            .bindings
            .iter()
            .find(|binding| binding.element_id == element_id)
            .map(|binding| binding.action.clone());
        match action {
            Some(action) => {
                action.call();
                true
            }
            None => false,
        }
    }
}

impl RenderSurface for MemorySurface {
    type Mount = String;

    fn mount(&self, element_id: &str, markup: &Markup) -> Result<String, ModalError> {
        let mut state = self.state.borrow_mut();
        if state.mounted.iter().any(|(id, _)| id == element_id) {
            return Err(ModalError::surface(element_id, "element id is already mounted"));
        }
        state
            .mounted
            .push((element_id.to_string(), markup.clone()));
        Ok(element_id.to_string())
    }

    fn remove(&self, element_id: &str) -> Result<(), ModalError> {
        // Handlers are dropped after the borrow ends; they may own anything.
        let removed: Vec<Binding> = {
            let mut state = self.state.borrow_mut();
            state.mounted.retain(|(id, _)| id != element_id);
            let (removed, kept) = std::mem::take(&mut state.bindings)
                .into_iter()
                .partition(|binding| binding.root == element_id);
            state.bindings = kept;
            removed
        };
        drop(removed);
        Ok(())
    }

    fn bind_click(
        &self,
        mount: &String,
        element_id: &str,
        action: ActionHandler,
    ) -> Result<(), ModalError> {
        let mut state = self.state.borrow_mut();
        let needle = format!("id=\"{element_id}\"");
        let present = state
            .mounted
            .iter()
            .any(|(id, markup)| id == mount && markup.as_str().contains(&needle));
        if !present {
            return Err(ModalError::MissingElement(element_id.to_string()));
        }
        state.bindings.push(Binding {
            root: mount.clone(),
            element_id: element_id.to_string(),
            action,
        });
        Ok(())
    }
}

/// Lifecycle events recorded by [`MemoryDialogs`], keyed by dialog id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogEvent {
    Created(String),
    Shown(String),
    Hidden(String),
    Disposed(String),
}

/// Factory for headless dialogs. Keeps the latest dialog per id and a log of
/// every lifecycle event.
#[derive(Clone, Debug, Default)]
pub struct MemoryDialogs {
    dialogs: Rc<RefCell<HashMap<String, MemoryDialog>>>,
    events: Rc<RefCell<Vec<DialogEvent>>>,
    fail_next: Rc<Cell<bool>>,
}

impl MemoryDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DialogEvent> {
        self.events.borrow().clone()
    }

    pub fn created_count(&self, id: &str) -> usize {
        self.count(|event| matches!(event, DialogEvent::Created(e) if e == id))
    }

    pub fn disposed_count(&self, id: &str) -> usize {
        self.count(|event| matches!(event, DialogEvent::Disposed(e) if e == id))
    }

    fn count(&self, pred: impl Fn(&DialogEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|event| pred(event)).count()
    }

    /// Latest dialog created for `id`, disposed or not.
    pub fn dialog(&self, id: &str) -> Option<MemoryDialog> {
        self.dialogs.borrow().get(id).cloned()
    }

    pub fn options(&self, id: &str) -> Option<DialogOptions> {
        self.dialog(id).map(|dialog| dialog.options())
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.dialog(id).is_some_and(|dialog| dialog.is_visible())
    }

    /// Make the next `create` fail.
    pub fn fail_next_create(&self) {
        self.fail_next.set(true);
    }

    /// The user pressed the close button or a dismiss button.
    pub fn dismiss(&self, id: &str) -> bool {
        self.close_if(id, |_| true)
    }

    /// The user clicked the backdrop. Static backdrops ignore it.
    pub fn click_backdrop(&self, id: &str) -> bool {
        self.close_if(id, |options| options.backdrop == Backdrop::Dismissable)
    }

    /// The user pressed Escape. Ignored when keyboard dismissal is off.
    pub fn press_escape(&self, id: &str) -> bool {
        self.close_if(id, |options| options.keyboard)
    }

    fn close_if(&self, id: &str, allowed: impl Fn(&DialogOptions) -> bool) -> bool {
        let Some(dialog) = self.dialog(id) else {
            return false;
        };
        if !dialog.is_visible() || !allowed(&dialog.options()) {
            return false;
        }
        dialog.close();
        true
    }
}

impl DialogFactory<String> for MemoryDialogs {
    type Dialog = MemoryDialog;

    fn create(
        &self,
        mount: &String,
        options: DialogOptions,
        on_closed: CloseNotifier,
    ) -> Result<MemoryDialog, ModalError> {
        if self.fail_next.replace(false) {
            return Err(ModalError::dialog(mount, "dialog creation failed"));
        }
        let dialog = MemoryDialog {
            inner: Rc::new(DialogInner {
                id: mount.clone(),
                options,
                visible: Cell::new(false),
                disposed: Cell::new(false),
                on_closed,
                events: Rc::clone(&self.events),
            }),
        };
        self.events
            .borrow_mut()
            .push(DialogEvent::Created(mount.clone()));
        self.dialogs
            .borrow_mut()
            .insert(mount.clone(), dialog.clone());
        Ok(dialog)
    }
}

/// A headless dialog. Hiding a visible dialog fires the close notification
/// synchronously.
#[derive(Clone, Debug)]
pub struct MemoryDialog {
    inner: Rc<DialogInner>,
}

#[derive(Debug)]
struct DialogInner {
    id: String,
    options: DialogOptions,
    visible: Cell<bool>,
    disposed: Cell<bool>,
    on_closed: CloseNotifier,
    events: Rc<RefCell<Vec<DialogEvent>>>,
}

impl MemoryDialog {
    pub fn options(&self) -> DialogOptions {
        self.inner.options
    }

    pub fn is_visible(&self) -> bool {
        self.inner.visible.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Fire the close notification without changing state, as a late
    /// browser event would.
    pub fn fire_closed(&self) {
        self.inner.on_closed.notify();
    }

    fn record(&self, event: fn(String) -> DialogEvent) {
        self.inner
            .events
            .borrow_mut()
            .push(event(self.inner.id.clone()));
    }

    fn close(&self) {
        self.inner.visible.set(false);
        self.record(DialogEvent::Hidden);
        self.inner.on_closed.notify();
    }
}

impl DialogPrimitive for MemoryDialog {
    fn show(&self) -> Result<(), ModalError> {
        if self.is_disposed() {
            return Err(ModalError::dialog(&self.inner.id, "dialog is disposed"));
        }
        self.inner.visible.set(true);
        self.record(DialogEvent::Shown);
        Ok(())
    }

    fn hide(&self) -> Result<(), ModalError> {
        if self.is_visible() {
            self.close();
        }
        Ok(())
    }

    fn dispose(&self) -> Result<(), ModalError> {
        self.inner.visible.set(false);
        self.inner.disposed.set(true);
        self.record(DialogEvent::Disposed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier(count: &Rc<Cell<usize>>) -> CloseNotifier {
        let count = Rc::clone(count);
        CloseNotifier::new(move || count.set(count.get() + 1))
    }

    fn options(backdrop: Backdrop, keyboard: bool) -> DialogOptions {
        DialogOptions {
            backdrop,
            keyboard,
            focus: true,
        }
    }

    #[test]
    fn test_surface_mount_and_remove() {
        let surface = MemorySurface::new();
        surface
            .mount("a", &Markup::raw("<div id=\"a\"><button id=\"a-1\"></button></div>"))
            .unwrap();
        surface.mount("b", &Markup::raw("<div id=\"b\"></div>")).unwrap();
        assert_eq!(surface.mounted_ids(), ["a", "b"]);

        assert!(surface.mount("a", &Markup::raw("")).is_err());

        surface.remove("a").unwrap();
        surface.remove("a").unwrap();
        assert_eq!(surface.mounted_ids(), ["b"]);
    }

    #[test]
    fn test_surface_bind_requires_element() {
        let surface = MemorySurface::new();
        let mount = surface
            .mount("a", &Markup::raw("<div id=\"a\"><button id=\"a-1\"></button></div>"))
            .unwrap();

        let err = surface
            .bind_click(&mount, "a-2", ActionHandler::new(|| {}))
            .unwrap_err();
        assert!(matches!(err, ModalError::MissingElement(id) if id == "a-2"));

        surface
            .bind_click(&mount, "a-1", ActionHandler::new(|| {}))
            .unwrap();
        assert!(surface.is_bound("a-1"));
        assert!(surface.click("a-1"));

        surface.remove("a").unwrap();
        assert!(!surface.is_bound("a-1"));
        assert!(!surface.click("a-1"));
    }

    #[test]
    fn test_dialog_hide_notifies_only_when_visible() {
        let dialogs = MemoryDialogs::new();
        let closed = Rc::new(Cell::new(0));
        let dialog = dialogs
            .create(&"m".to_string(), options(Backdrop::Dismissable, true), notifier(&closed))
            .unwrap();

        dialog.hide().unwrap();
        assert_eq!(closed.get(), 0);

        dialog.show().unwrap();
        dialog.hide().unwrap();
        assert_eq!(closed.get(), 1);
        assert!(!dialog.is_visible());
    }

    #[test]
    fn test_static_backdrop_and_keyboard_block_dismissal() {
        let dialogs = MemoryDialogs::new();
        let closed = Rc::new(Cell::new(0));
        let dialog = dialogs
            .create(&"m".to_string(), options(Backdrop::Static, false), notifier(&closed))
            .unwrap();
        dialog.show().unwrap();

        assert!(!dialogs.click_backdrop("m"));
        assert!(!dialogs.press_escape("m"));
        assert!(dialogs.is_visible("m"));

        assert!(dialogs.dismiss("m"));
        assert_eq!(closed.get(), 1);
        assert!(!dialogs.dismiss("m"));
    }

    #[test]
    fn test_disposed_dialog_cannot_show() {
        let dialogs = MemoryDialogs::new();
        let closed = Rc::new(Cell::new(0));
        let dialog = dialogs
            .create(&"m".to_string(), options(Backdrop::Dismissable, true), notifier(&closed))
            .unwrap();
        dialog.dispose().unwrap();

        assert!(dialog.show().is_err());
        assert_eq!(dialogs.disposed_count("m"), 1);
        assert_eq!(closed.get(), 0);
    }
}
