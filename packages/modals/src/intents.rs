//! # Built-in dialogs
//!
//! Every intent resolves to a [`ModalConfig`] and goes through
//! [`ModalManager::show`] under its own fixed slot.
//!
//! | Intent | Slot | Size | Backdrop | Keyboard | Buttons |
//! |--------|------|------|----------|----------|---------|
//! | detail | `detailModal` | lg | dismissable | yes | close |
//! | edit | `editModal` | lg | static | no | cancel, save |
//! | create | `createModal` | lg | static | no | cancel, create |
//! | delete | `deleteModal` | md | dismissable | yes | cancel, delete |
//! | custom | `customModal` | md | dismissable | yes | caller's, or close |
//! | loading | `loadingModal` | sm | static | no | none, no header |
//! | confirm | `confirmModal` | md | dismissable | yes | cancel, confirm |
//!
//! Options are layered: the defaults above, then `[intents.<name>]` from
//! [`crate::ModalsConfig`], then the `options` argument.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use tokio::sync::oneshot;

use crate::backend::{DialogFactory, RenderSurface};
use crate::error::ModalError;
use crate::manager::ModalManager;
use crate::markup::{html_escape, DetailContent, Markup};
use crate::model::{
    ActionHandler, Backdrop, ButtonSpec, ButtonStyle, InstanceToken, ModalConfig, ModalId,
    ModalOptions, ModalSize,
};

fn form_defaults() -> ModalOptions {
    ModalOptions::new()
        .size(ModalSize::Large)
        .backdrop(Backdrop::Static)
        .keyboard(false)
}

fn dismissable(size: ModalSize) -> ModalOptions {
    ModalOptions::new()
        .size(size)
        .backdrop(Backdrop::Dismissable)
        .keyboard(true)
}

impl<S, F> ModalManager<S, F>
where
    S: RenderSurface + 'static,
    F: DialogFactory<S::Mount> + 'static,
{
    fn resolve(
        &self,
        config: ModalConfig,
        defaults: ModalOptions,
        overrides: &ModalOptions,
        options: &ModalOptions,
    ) -> ModalConfig {
        config.with_options(&defaults.merged(overrides).merged(options))
    }

    /// Read-only view of `content`: markup as-is, a record as a key/value table.
    pub fn show_detail(
        &self,
        title: &str,
        content: impl Into<DetailContent>,
        options: &ModalOptions,
    ) -> Result<InstanceToken, ModalError> {
        let labels = self.labels();
        let content: DetailContent = content.into();
        let config = ModalConfig::new(title, content.render(labels))
            .button(ButtonSpec::dismiss(&labels.close));
        let config = self.resolve(
            config,
            dismissable(ModalSize::Large),
            &self.config().intents.detail,
            options,
        );
        self.show(ModalId::DETAIL, config)
    }

    /// Form dialog with cancel and save. `on_save` does not close the dialog.
    pub fn show_edit(
        &self,
        title: &str,
        form: impl Into<Markup>,
        on_save: impl Into<ActionHandler>,
        options: &ModalOptions,
    ) -> Result<InstanceToken, ModalError> {
        let labels = self.labels();
        let config = ModalConfig::new(title, form)
            .button(ButtonSpec::dismiss(&labels.cancel))
            .button(ButtonSpec::action(&labels.save, on_save).name("save"));
        let config = self.resolve(config, form_defaults(), &self.config().intents.edit, options);
        self.show(ModalId::EDIT, config)
    }

    /// Same shape as [`show_edit`](Self::show_edit) with a create button.
    pub fn show_create(
        &self,
        title: &str,
        form: impl Into<Markup>,
        on_create: impl Into<ActionHandler>,
        options: &ModalOptions,
    ) -> Result<InstanceToken, ModalError> {
        let labels = self.labels();
        let config = ModalConfig::new(title, form)
            .button(ButtonSpec::dismiss(&labels.cancel))
            .button(
                ButtonSpec::action(&labels.create, on_create)
                    .style(ButtonStyle::Success)
                    .name("create"),
            );
        let config = self.resolve(config, form_defaults(), &self.config().intents.create, options);
        self.show(ModalId::CREATE, config)
    }

    /// Deletion warning. `message` is plain text.
    pub fn show_delete(
        &self,
        message: &str,
        on_delete: impl Into<ActionHandler>,
        options: &ModalOptions,
    ) -> Result<InstanceToken, ModalError> {
        let labels = self.labels();
        let body = format!(
            "<div class=\"text-center\">\
             <i class=\"fas fa-exclamation-triangle text-warning fa-3x mb-3\"></i>\
             <p class=\"mb-0\">{}</p>\
             <small class=\"text-muted\">{}</small>\
             </div>",
            html_escape(message),
            html_escape(&labels.irreversible),
        );
        let config = ModalConfig::new(&labels.delete_title, Markup::raw(body))
            .button(ButtonSpec::dismiss(&labels.cancel))
            .button(
                ButtonSpec::action(&labels.delete, on_delete)
                    .style(ButtonStyle::Danger)
                    .name("delete"),
            );
        let config = self.resolve(
            config,
            dismissable(ModalSize::Medium),
            &self.config().intents.delete,
            options,
        );
        self.show(ModalId::DELETE, config)
    }

    /// Caller-defined buttons. An empty list gets a single close button so
    /// the dialog can always be dismissed.
    pub fn show_custom(
        &self,
        title: &str,
        content: impl Into<Markup>,
        buttons: Vec<ButtonSpec>,
        options: &ModalOptions,
    ) -> Result<InstanceToken, ModalError> {
        let buttons = if buttons.is_empty() {
            vec![ButtonSpec::dismiss(&self.labels().close)]
        } else {
            buttons
        };
        let config = ModalConfig::new(title, content).buttons(buttons);
        let config = self.resolve(
            config,
            dismissable(ModalSize::Medium),
            &self.config().intents.custom,
            options,
        );
        self.show(ModalId::CUSTOM, config)
    }

    /// Blocking spinner without header or buttons. Stays up until
    /// [`hide_loading`](Self::hide_loading); see also
    /// [`while_loading`](Self::while_loading).
    pub fn show_loading(
        &self,
        message: Option<&str>,
        options: &ModalOptions,
    ) -> Result<InstanceToken, ModalError> {
        let labels = self.labels();
        let body = format!(
            "<div class=\"text-center py-4\">\
             <div class=\"spinner-border text-primary mb-3\" role=\"status\">\
             <span class=\"visually-hidden\">{}</span>\
             </div>\
             <p class=\"mb-0\">{}</p>\
             </div>",
            html_escape(&labels.busy),
            html_escape(message.unwrap_or(&labels.loading)),
        );
        let config = ModalConfig::new("", Markup::raw(body));
        let defaults = ModalOptions::new()
            .size(ModalSize::Small)
            .backdrop(Backdrop::Static)
            .keyboard(false)
            .show_header(false);
        let config = self.resolve(config, defaults, &self.config().intents.loading, options);
        self.show(ModalId::LOADING, config)
    }

    pub fn hide_loading(&self) -> Result<(), ModalError> {
        self.hide(ModalId::LOADING)
    }

    /// Run `work` behind the loading dialog and hide it afterwards. A
    /// loading dialog shown by someone else in the meantime is left open.
    pub async fn while_loading<T>(
        &self,
        message: Option<&str>,
        work: impl Future<Output = T>,
    ) -> Result<T, ModalError> {
        let token = self.show_loading(message, &ModalOptions::default())?;
        let output = work.await;
        if self.instance_token(ModalId::LOADING) == Some(token) {
            self.hide_loading()?;
        } else {
            tracing::debug!("Loading dialog {} was replaced, leaving it open", token);
        }
        Ok(output)
    }

    /// Ask a yes/no question. The future resolves to `true` once the confirm
    /// button is clicked and to `false` if the dialog closes any other way,
    /// including being replaced by another confirm.
    pub fn confirm(
        &self,
        message: &str,
        title: Option<&str>,
    ) -> Result<impl Future<Output = bool> + 'static, ModalError> {
        let labels = self.labels();
        let (tx, rx) = oneshot::channel();
        let tx = Rc::new(RefCell::new(Some(tx)));
        let manager = self.downgrade();
        let on_confirm = move || {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(true);
            }
            if let Some(manager) = manager.upgrade() {
                if let Err(err) = manager.hide(ModalId::CONFIRM) {
                    tracing::warn!("Failed to hide confirm dialog: {}", err);
                }
            }
        };

        let body = format!("<p>{}</p>", html_escape(message));
        let config = ModalConfig::new(title.unwrap_or(&labels.confirm_title), Markup::raw(body))
            .button(ButtonSpec::dismiss(&labels.cancel))
            .button(ButtonSpec::action(&labels.confirm, on_confirm).name("confirm"));
        let config = self.resolve(
            config,
            dismissable(ModalSize::Medium),
            &self.config().intents.confirm,
            &ModalOptions::default(),
        );
        self.show(ModalId::CONFIRM, config)?;

        // The sender lives in the confirm button's handler, which the surface
        // drops when the dialog is torn down.
        Ok(async move { rx.await.unwrap_or(false) })
    }
}
