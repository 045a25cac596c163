//! # Modal configuration — `modals.toml`
//!
//! Page-level settings for a [`crate::ModalManager`]: the localised texts used
//! by the built-in dialogs and per-intent option overrides.
//!
//! ## Structure
//!
//! ```toml
//! [labels]
//! close = "Close"
//! yes = "Yes"
//!
//! [intents.edit]
//! size = "xl"          # sm | md | lg | xl
//! backdrop = "static"  # dismissable | static
//! keyboard = false
//! ```
//!
//! Option resolution for a built-in dialog is three layers deep: the intent's
//! own defaults, then `[intents.<name>]` from this file, then the options
//! passed at the call site. All structs derive `Default`, so a missing or
//! empty file is equivalent to the default configuration.

use serde::{Deserialize, Serialize};

use crate::model::ModalOptions;

/// Top-level configuration stored in `modals.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModalsConfig {
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub intents: IntentOverrides,
}

/// Texts rendered by the built-in dialogs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub close: String,
    pub cancel: String,
    pub save: String,
    pub create: String,
    pub delete: String,
    pub confirm: String,
    pub delete_title: String,
    pub confirm_title: String,
    /// Notice shown under the delete message.
    pub irreversible: String,
    /// Default message of the loading dialog.
    pub loading: String,
    /// Screen-reader text of the spinner.
    pub busy: String,
    pub yes: String,
    pub no: String,
    pub empty_record: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            close: "Close".to_string(),
            cancel: "Cancel".to_string(),
            save: "Save".to_string(),
            create: "Create".to_string(),
            delete: "Delete".to_string(),
            confirm: "Confirm".to_string(),
            delete_title: "Confirm deletion".to_string(),
            confirm_title: "Confirm".to_string(),
            irreversible: "This action cannot be undone.".to_string(),
            loading: "Processing...".to_string(),
            busy: "Loading...".to_string(),
            yes: "Yes".to_string(),
            no: "No".to_string(),
            empty_record: "No data to display.".to_string(),
        }
    }
}

impl Labels {
    /// Korean texts.
    pub fn korean() -> Self {
        Self {
            close: "닫기".to_string(),
            cancel: "취소".to_string(),
            save: "저장".to_string(),
            create: "생성".to_string(),
            delete: "삭제".to_string(),
            confirm: "확인".to_string(),
            delete_title: "삭제 확인".to_string(),
            confirm_title: "확인".to_string(),
            irreversible: "이 작업은 되돌릴 수 없습니다.".to_string(),
            loading: "처리 중...".to_string(),
            busy: "Loading...".to_string(),
            yes: "예".to_string(),
            no: "아니오".to_string(),
            empty_record: "표시할 데이터가 없습니다.".to_string(),
        }
    }
}

/// Per-intent overrides, applied over each intent's built-in defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentOverrides {
    pub detail: ModalOptions,
    pub edit: ModalOptions,
    pub create: ModalOptions,
    pub delete: ModalOptions,
    pub custom: ModalOptions,
    pub loading: ModalOptions,
    pub confirm: ModalOptions,
}

impl ModalsConfig {
    /// Create a config with the given labels and no overrides.
    pub fn new(labels: Labels) -> Self {
        Self {
            labels,
            intents: IntentOverrides::default(),
        }
    }

    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "modals.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
