//! Seams between the manager and the page it draws on.
//!
//! A [`RenderSurface`] owns markup and DOM events, a [`DialogFactory`] builds
//! the show/hide/dispose controller for one mounted dialog. Keeping both behind
//! traits lets the registry run unchanged against the browser and the
//! headless backend.

use std::fmt;
use std::rc::Rc;

use crate::error::ModalError;
use crate::markup::Markup;
use crate::model::{ActionHandler, DialogOptions};

/// Inserts and removes dialog markup and routes clicks.
pub trait RenderSurface {
    /// Handle to a mounted dialog root.
    type Mount: Clone;

    /// Insert `markup`, whose root element carries `element_id`, and return a
    /// handle to that root.
    fn mount(&self, element_id: &str, markup: &Markup) -> Result<Self::Mount, ModalError>;

    /// Remove the subtree rooted at `element_id` along with its click
    /// bindings. Removing something that is not mounted is a no-op.
    fn remove(&self, element_id: &str) -> Result<(), ModalError>;

    /// Run `action` whenever the element `element_id` inside `mount` is clicked.
    fn bind_click(
        &self,
        mount: &Self::Mount,
        element_id: &str,
        action: ActionHandler,
    ) -> Result<(), ModalError>;
}

/// Show/hide/dispose controller of a single dialog.
pub trait DialogPrimitive {
    fn show(&self) -> Result<(), ModalError>;

    /// Start closing. The close notification fires once the dialog is fully
    /// hidden.
    fn hide(&self) -> Result<(), ModalError>;

    /// Release the controller. Does not fire the close notification.
    fn dispose(&self) -> Result<(), ModalError>;
}

/// Builds a [`DialogPrimitive`] bound to a mounted dialog.
pub trait DialogFactory<M> {
    type Dialog: DialogPrimitive;

    /// `on_closed` must be fired every time the dialog finishes closing,
    /// whatever closed it (button, backdrop, keyboard, or [`DialogPrimitive::hide`]).
    fn create(
        &self,
        mount: &M,
        options: DialogOptions,
        on_closed: CloseNotifier,
    ) -> Result<Self::Dialog, ModalError>;
}

/// Callback fired by a dialog primitive once it has fully closed.
#[derive(Clone)]
pub struct CloseNotifier(Rc<dyn Fn()>);

impl CloseNotifier {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn notify(&self) {
        (self.0)()
    }
}

impl fmt::Debug for CloseNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CloseNotifier(..)")
    }
}
