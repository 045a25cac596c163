//! # Dialog model — identifiers, buttons and resolved configuration
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`ModalId`] | Name of a dialog slot; also the DOM id of the dialog root. |
//! | [`InstanceToken`] | Identity of one created instance within a slot. |
//! | [`ButtonSpec`] | A footer button: text, style, and what clicking it does ([`ButtonKind`]). |
//! | [`ModalOptions`] | Partial overrides (size, backdrop, keyboard, focus, header) layered over defaults. |
//! | [`ModalConfig`] | The fully resolved description handed to the show pipeline. |
//! | [`DialogOptions`] | The subset of the configuration the dialog primitive needs. |

use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::markup::Markup;

/// Name of a dialog slot. At most one live instance exists per id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalId(String);

impl ModalId {
    pub const DETAIL: &'static str = "detailModal";
    pub const EDIT: &'static str = "editModal";
    pub const CREATE: &'static str = "createModal";
    pub const DELETE: &'static str = "deleteModal";
    pub const CUSTOM: &'static str = "customModal";
    pub const LOADING: &'static str = "loadingModal";
    pub const CONFIRM: &'static str = "confirmModal";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModalId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ModalId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for ModalId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ModalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identity of a single created instance.
///
/// Tokens come from a per-manager counter and are never reused, so a close
/// notification carrying an old token can be told apart from one for the
/// instance currently occupying the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceToken(u64);

impl InstanceToken {
    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for InstanceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModalSize {
    #[serde(rename = "sm")]
    Small,
    #[default]
    #[serde(rename = "md")]
    Medium,
    #[serde(rename = "lg")]
    Large,
    #[serde(rename = "xl")]
    ExtraLarge,
}

impl ModalSize {
    /// Class added to `.modal-dialog`. Medium is the Bootstrap default and has none.
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            ModalSize::Small => Some("modal-sm"),
            ModalSize::Medium => None,
            ModalSize::Large => Some("modal-lg"),
            ModalSize::ExtraLarge => Some("modal-xl"),
        }
    }
}

/// Whether clicking the dimmed background closes the dialog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backdrop {
    #[default]
    Dismissable,
    Static,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    #[default]
    Secondary,
    Success,
    Danger,
    Warning,
    Info,
    Light,
    Dark,
    Link,
    /// Any other class string, e.g. `"btn-outline-primary"`.
    Custom(String),
}

impl ButtonStyle {
    pub fn css_class(&self) -> &str {
        match self {
            ButtonStyle::Primary => "btn-primary",
            ButtonStyle::Secondary => "btn-secondary",
            ButtonStyle::Success => "btn-success",
            ButtonStyle::Danger => "btn-danger",
            ButtonStyle::Warning => "btn-warning",
            ButtonStyle::Info => "btn-info",
            ButtonStyle::Light => "btn-light",
            ButtonStyle::Dark => "btn-dark",
            ButtonStyle::Link => "btn-link",
            ButtonStyle::Custom(class) => class,
        }
    }
}

/// Callback bound to a button click. Invoked with no arguments; its outcome
/// is not inspected and it does not close the dialog on its own.
#[derive(Clone)]
pub struct ActionHandler(Rc<dyn Fn()>);

impl ActionHandler {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl fmt::Debug for ActionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActionHandler(..)")
    }
}

impl<F: Fn() + 'static> From<F> for ActionHandler {
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// What a button does when clicked.
#[derive(Clone, Debug)]
pub enum ButtonKind {
    /// Closes the dialog through the primitive's own dismiss affordance.
    Dismiss,
    /// Runs the handler; the dialog stays open.
    Action(ActionHandler),
}

/// A footer button.
#[derive(Clone, Debug)]
pub struct ButtonSpec {
    pub text: String,
    pub style: ButtonStyle,
    /// Logical name appended to the generated DOM id (`"save"`, `"delete"`, ...).
    pub name: Option<String>,
    pub kind: ButtonKind,
}

impl ButtonSpec {
    /// A secondary button that closes the dialog.
    pub fn dismiss(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: ButtonStyle::Secondary,
            name: None,
            kind: ButtonKind::Dismiss,
        }
    }

    /// A primary button that runs `handler` when clicked.
    pub fn action(text: impl Into<String>, handler: impl Into<ActionHandler>) -> Self {
        Self {
            text: text.into(),
            style: ButtonStyle::Primary,
            name: None,
            kind: ButtonKind::Action(handler.into()),
        }
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_dismiss(&self) -> bool {
        matches!(self.kind, ButtonKind::Dismiss)
    }
}

/// Caller overrides for a dialog. `None` fields fall through to the next layer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ModalSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<Backdrop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_header: Option<bool>,
}

impl ModalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, size: ModalSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn backdrop(mut self, backdrop: Backdrop) -> Self {
        self.backdrop = Some(backdrop);
        self
    }

    pub fn keyboard(mut self, keyboard: bool) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn focus(mut self, focus: bool) -> Self {
        self.focus = Some(focus);
        self
    }

    pub fn show_header(mut self, show_header: bool) -> Self {
        self.show_header = Some(show_header);
        self
    }

    /// Layer `over` on top of `self`; fields set in `over` win.
    pub fn merged(&self, over: &ModalOptions) -> ModalOptions {
        ModalOptions {
            size: over.size.or(self.size),
            backdrop: over.backdrop.or(self.backdrop),
            keyboard: over.keyboard.or(self.keyboard),
            focus: over.focus.or(self.focus),
            show_header: over.show_header.or(self.show_header),
        }
    }
}

/// Fully resolved description of a dialog.
#[derive(Clone, Debug)]
pub struct ModalConfig {
    /// Header title. `None` suppresses the header block entirely.
    pub title: Option<String>,
    pub body: Markup,
    pub size: ModalSize,
    pub backdrop: Backdrop,
    pub keyboard: bool,
    pub focus: bool,
    /// Footer buttons in display order. Empty means no footer.
    pub buttons: Vec<ButtonSpec>,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            title: Some(String::new()),
            body: Markup::default(),
            size: ModalSize::default(),
            backdrop: Backdrop::default(),
            keyboard: true,
            focus: true,
            buttons: Vec::new(),
        }
    }
}

impl ModalConfig {
    pub fn new(title: impl Into<String>, body: impl Into<Markup>) -> Self {
        Self {
            title: Some(title.into()),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn button(mut self, button: ButtonSpec) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn buttons(mut self, buttons: Vec<ButtonSpec>) -> Self {
        self.buttons = buttons;
        self
    }

    /// Apply options; unset fields keep their current value.
    pub fn with_options(mut self, options: &ModalOptions) -> Self {
        if let Some(size) = options.size {
            self.size = size;
        }
        if let Some(backdrop) = options.backdrop {
            self.backdrop = backdrop;
        }
        if let Some(keyboard) = options.keyboard {
            self.keyboard = keyboard;
        }
        if let Some(focus) = options.focus {
            self.focus = focus;
        }
        match options.show_header {
            Some(false) => self.title = None,
            Some(true) if self.title.is_none() => self.title = Some(String::new()),
            _ => {}
        }
        self
    }

    pub fn dialog_options(&self) -> DialogOptions {
        DialogOptions {
            backdrop: self.backdrop,
            keyboard: self.keyboard,
            focus: self.focus,
        }
    }
}

/// Options the dialog primitive is constructed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DialogOptions {
    pub backdrop: Backdrop,
    pub keyboard: bool,
    pub focus: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_merge_prefers_override() {
        let base = ModalOptions::new()
            .size(ModalSize::Large)
            .backdrop(Backdrop::Static)
            .keyboard(false);
        let over = ModalOptions::new().size(ModalSize::Small);

        let merged = base.merged(&over);
        assert_eq!(merged.size, Some(ModalSize::Small));
        assert_eq!(merged.backdrop, Some(Backdrop::Static));
        assert_eq!(merged.keyboard, Some(false));
        assert_eq!(merged.focus, None);
    }

    #[test]
    fn test_show_header_false_suppresses_title() {
        let config = ModalConfig::new("Title", "body")
            .with_options(&ModalOptions::new().show_header(false));
        assert!(config.title.is_none());

        let config = config.with_options(&ModalOptions::new().show_header(true));
        assert_eq!(config.title.as_deref(), Some(""));
    }

    #[test]
    fn test_button_constructors() {
        let close = ButtonSpec::dismiss("Close");
        assert!(close.is_dismiss());
        assert_eq!(close.style, ButtonStyle::Secondary);

        let save = ButtonSpec::action("Save", || {}).name("save");
        assert!(!save.is_dismiss());
        assert_eq!(save.style, ButtonStyle::Primary);
        assert_eq!(save.name.as_deref(), Some("save"));
    }

    #[test]
    fn test_size_classes() {
        assert_eq!(ModalSize::Small.css_class(), Some("modal-sm"));
        assert_eq!(ModalSize::Medium.css_class(), None);
        assert_eq!(ModalSize::ExtraLarge.css_class(), Some("modal-xl"));
    }
}
