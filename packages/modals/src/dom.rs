//! # Browser backend — DOM surface and `bootstrap.Modal`
//!
//! [`DomSurface`] appends dialog markup to `document.body` and wires click
//! listeners with `wasm-bindgen` closures. [`BootstrapDialogs`] wraps the
//! page's global `bootstrap.Modal` class through `js-sys` reflection, so no
//! Bootstrap bindings crate is needed; the page only has to load
//! `bootstrap.bundle.js`.
//!
//! ## Closure lifetime
//!
//! A listener closure may be the one running when its dialog is torn down
//! (a confirm button that hides its own dialog, or the `hidden.bs.modal`
//! handler triggering cleanup). Removed closures are therefore detached
//! immediately but dropped on the next tick via a zero-delay timeout.
//!
//! ## Hide during the show transition
//!
//! Bootstrap ignores `hide()` while the dialog is still animating in. A hide
//! requested before `shown.bs.modal` is remembered and replayed from that
//! event, so `show_loading` followed quickly by `hide_loading` still closes.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Element};

use crate::backend::{CloseNotifier, DialogFactory, DialogPrimitive, RenderSurface};
use crate::error::ModalError;
use crate::markup::Markup;
use crate::model::{ActionHandler, Backdrop, DialogOptions};

type Listener = (Element, &'static str, Closure<dyn FnMut()>);

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}

fn document(id: &str) -> Result<Document, ModalError> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| ModalError::surface(id, "no document available"))
}

/// Detach listeners now, drop their closures on the next tick.
fn release(listeners: Vec<Listener>) {
    if listeners.is_empty() {
        return;
    }
    for (target, event, closure) in &listeners {
        if let Err(e) =
            target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            tracing::warn!("Failed to detach {} listener: {}", event, js_message(&e));
        }
    }
    Timeout::new(0, move || drop(listeners)).forget();
}

/// Renders dialogs into the live document.
#[derive(Clone, Default)]
pub struct DomSurface {
    listeners: Rc<RefCell<HashMap<String, Vec<Listener>>>>,
}

impl DomSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for DomSurface {
    type Mount = Element;

    fn mount(&self, element_id: &str, markup: &Markup) -> Result<Element, ModalError> {
        let document = document(element_id)?;
        let body = document
            .body()
            .ok_or_else(|| ModalError::surface(element_id, "document has no body"))?;
        body.insert_adjacent_html("beforeend", markup.as_str())
            .map_err(|e| ModalError::surface(element_id, js_message(&e)))?;
        document
            .get_element_by_id(element_id)
            .ok_or_else(|| ModalError::MissingElement(element_id.to_string()))
    }

    fn remove(&self, element_id: &str) -> Result<(), ModalError> {
        let listeners = self.listeners.borrow_mut().remove(element_id);
        release(listeners.unwrap_or_default());

        if let Some(element) = document(element_id)?.get_element_by_id(element_id) {
            element.remove();
        }
        Ok(())
    }

    fn bind_click(
        &self,
        mount: &Element,
        element_id: &str,
        action: ActionHandler,
    ) -> Result<(), ModalError> {
        let target = document(element_id)?
            .get_element_by_id(element_id)
            .ok_or_else(|| ModalError::MissingElement(element_id.to_string()))?;
        let closure = Closure::wrap(Box::new(move || action.call()) as Box<dyn FnMut()>);
        target
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            .map_err(|e| ModalError::surface(element_id, js_message(&e)))?;

        self.listeners
            .borrow_mut()
            .entry(mount.id())
            .or_default()
            .push((target, "click", closure));
        Ok(())
    }
}

/// Builds [`BootstrapDialog`]s from the page's `bootstrap.Modal`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BootstrapDialogs;

impl BootstrapDialogs {
    pub fn new() -> Self {
        Self
    }
}

fn modal_class(id: &str) -> Result<Function, ModalError> {
    let window = web_sys::window().ok_or_else(|| ModalError::dialog(id, "no window available"))?;
    Reflect::get(&window, &JsValue::from_str("bootstrap"))
        .and_then(|bootstrap| Reflect::get(&bootstrap, &JsValue::from_str("Modal")))
        .and_then(|class| class.dyn_into::<Function>())
        .map_err(|_| ModalError::dialog(id, "bootstrap.Modal is not loaded"))
}

fn modal_options(options: DialogOptions) -> Result<Object, JsValue> {
    let config = Object::new();
    let backdrop = match options.backdrop {
        Backdrop::Dismissable => JsValue::from_bool(true),
        Backdrop::Static => JsValue::from_str("static"),
    };
    Reflect::set(&config, &JsValue::from_str("backdrop"), &backdrop)?;
    Reflect::set(
        &config,
        &JsValue::from_str("keyboard"),
        &JsValue::from_bool(options.keyboard),
    )?;
    Reflect::set(
        &config,
        &JsValue::from_str("focus"),
        &JsValue::from_bool(options.focus),
    )?;
    Ok(config)
}

fn call_method(id: &str, instance: &JsValue, method: &str) -> Result<(), ModalError> {
    Reflect::get(instance, &JsValue::from_str(method))
        .and_then(|f| f.dyn_into::<Function>())
        .and_then(|f| f.call0(instance))
        .map(|_| ())
        .map_err(|e| ModalError::dialog(id, format!("{method}: {}", js_message(&e))))
}

impl DialogFactory<Element> for BootstrapDialogs {
    type Dialog = BootstrapDialog;

    fn create(
        &self,
        mount: &Element,
        options: DialogOptions,
        on_closed: CloseNotifier,
    ) -> Result<BootstrapDialog, ModalError> {
        let id = mount.id();
        let class = modal_class(&id)?;
        let config = modal_options(options).map_err(|e| ModalError::dialog(&id, js_message(&e)))?;
        let instance = Reflect::construct(&class, &Array::of2(mount, &config))
            .map_err(|e| ModalError::dialog(&id, js_message(&e)))?;

        let dialog = BootstrapDialog {
            id: id.clone(),
            instance: instance.clone(),
            shown: Rc::new(Cell::new(false)),
            hide_pending: Rc::new(Cell::new(false)),
            listeners: RefCell::new(Vec::new()),
        };

        let shown = Rc::clone(&dialog.shown);
        let hide_pending = Rc::clone(&dialog.hide_pending);
        let on_shown = Closure::wrap(Box::new(move || {
            shown.set(true);
            if hide_pending.replace(false) {
                if let Err(e) = call_method(&id, &instance, "hide") {
                    tracing::warn!("Failed to replay hide: {}", e);
                }
            }
        }) as Box<dyn FnMut()>);
        let on_hidden = Closure::wrap(Box::new(move || on_closed.notify()) as Box<dyn FnMut()>);

        for (event, closure) in [("shown.bs.modal", on_shown), ("hidden.bs.modal", on_hidden)] {
            if let Err(e) =
                mount.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            {
                release(dialog.listeners.take());
                return Err(ModalError::dialog(&dialog.id, js_message(&e)));
            }
            dialog
                .listeners
                .borrow_mut()
                .push((mount.clone(), event, closure));
        }
        tracing::debug!("Created bootstrap dialog {}", dialog.id);
        Ok(dialog)
    }
}

/// One `bootstrap.Modal` instance and its event listeners.
pub struct BootstrapDialog {
    id: String,
    instance: JsValue,
    shown: Rc<Cell<bool>>,
    hide_pending: Rc<Cell<bool>>,
    listeners: RefCell<Vec<Listener>>,
}

impl DialogPrimitive for BootstrapDialog {
    fn show(&self) -> Result<(), ModalError> {
        call_method(&self.id, &self.instance, "show")
    }

    fn hide(&self) -> Result<(), ModalError> {
        if !self.shown.get() {
            self.hide_pending.set(true);
            return Ok(());
        }
        call_method(&self.id, &self.instance, "hide")
    }

    fn dispose(&self) -> Result<(), ModalError> {
        release(self.listeners.take());
        call_method(&self.id, &self.instance, "dispose")
    }
}
