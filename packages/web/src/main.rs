use dioxus::prelude::*;

use modals::ModalsConfig;
use ui::ModalProvider;
use views::Races;

mod views;

const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css";
const BOOTSTRAP_JS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/js/bootstrap.bundle.min.js";
const FONT_AWESOME_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css";

const MODALS_TOML: &str = include_str!("../modals.toml");

fn main() {
    dioxus::launch(App);
}

fn modals_config() -> ModalsConfig {
    ModalsConfig::from_toml(MODALS_TOML).unwrap_or_else(|e| {
        tracing::error!("Invalid {}: {}", ModalsConfig::filename(), e);
        ModalsConfig::default()
    })
}

#[component]
fn App() -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: BOOTSTRAP_CSS }
        document::Link { rel: "stylesheet", href: FONT_AWESOME_CSS }
        document::Script { src: BOOTSTRAP_JS }

        ModalProvider { config: modals_config(),
            Races {}
        }
    }
}
