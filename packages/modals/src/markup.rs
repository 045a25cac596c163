//! # Markup — HTML generation for dialogs
//!
//! [`render_modal`] turns a resolved [`ModalConfig`] into the dialog's DOM
//! representation (Bootstrap 5 modal structure) together with the list of
//! click bindings for its action buttons. Both come out of the same pass over
//! the button list, so every binding targets an id that exists in the markup.
//!
//! Button ids have the form `"modal-btn-{token}-{index}"` with an optional
//! `-{name}` suffix, where the name keeps only `[A-Za-z0-9_]`. The slot id is
//! not part of it, and the name cannot contain `-`, so the token and index
//! alone decide the id. Tokens are never reused, so two dialogs (or two
//! generations of the same dialog) never share an id.
//!
//! [`render_record`] renders a key/value record as a two-column table:
//!
//! | Value | Rendering |
//! |-------|-----------|
//! | `null` | muted `-` placeholder |
//! | boolean | localised yes / no |
//! | object, array | pretty-printed JSON in a `<pre><code>` block |
//! | `http://`, `https://` or `ftp://` string | external link |
//! | other strings, numbers | escaped text |

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::Labels;
use crate::error::ModalError;
use crate::model::{ActionHandler, ButtonKind, InstanceToken, ModalConfig, ModalId};

/// A trusted HTML fragment.
///
/// Converting from a string keeps it verbatim; use [`Markup::text`] for
/// anything that should be shown as plain text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    pub fn raw(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    /// Escape `text` so it renders literally.
    pub fn text(text: &str) -> Self {
        Self(html_escape(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Markup {
    fn from(html: String) -> Self {
        Self(html)
    }
}

impl From<&str> for Markup {
    fn from(html: &str) -> Self {
        Self(html.to_string())
    }
}

/// Body of a detail dialog.
#[derive(Clone, Debug, PartialEq)]
pub enum DetailContent {
    Markup(Markup),
    Record(Map<String, Value>),
    /// Nothing displayable; renders the "no data" notice.
    Empty,
}

impl DetailContent {
    /// Build a record from any serialisable value (typically a struct).
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, ModalError> {
        Ok(serde_json::to_value(value)?.into())
    }

    pub fn render(&self, labels: &Labels) -> Markup {
        match self {
            DetailContent::Markup(markup) => markup.clone(),
            DetailContent::Record(record) => render_record(record, labels),
            DetailContent::Empty => Markup::raw(format!(
                "<p class=\"text-muted\">{}</p>",
                html_escape(&labels.empty_record)
            )),
        }
    }
}

impl From<Markup> for DetailContent {
    fn from(markup: Markup) -> Self {
        DetailContent::Markup(markup)
    }
}

impl From<&str> for DetailContent {
    fn from(html: &str) -> Self {
        DetailContent::Markup(html.into())
    }
}

impl From<String> for DetailContent {
    fn from(html: String) -> Self {
        DetailContent::Markup(html.into())
    }
}

impl From<Map<String, Value>> for DetailContent {
    fn from(record: Map<String, Value>) -> Self {
        DetailContent::Record(record)
    }
}

impl From<Value> for DetailContent {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(record) => DetailContent::Record(record),
            Value::String(html) => DetailContent::Markup(html.into()),
            _ => DetailContent::Empty,
        }
    }
}

/// Output of [`render_modal`].
#[derive(Debug)]
pub(crate) struct RenderedModal {
    pub markup: Markup,
    /// Generated DOM id of every button, in display order.
    pub button_ids: Vec<String>,
    /// Click bindings for action buttons: `(button id, handler)`.
    pub actions: Vec<(String, ActionHandler)>,
}

const BUTTON_ID_PREFIX: &str = "modal-btn";

/// Link schemes rendered as anchors. Anything else stays text.
const LINK_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

pub(crate) fn button_id(token: InstanceToken, index: usize, name: Option<&str>) -> String {
    let name: String = name
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        format!("{BUTTON_ID_PREFIX}-{token}-{index}")
    } else {
        format!("{BUTTON_ID_PREFIX}-{token}-{index}-{name}")
    }
}

pub(crate) fn render_modal(
    id: &ModalId,
    token: InstanceToken,
    config: &ModalConfig,
    labels: &Labels,
) -> RenderedModal {
    let mut button_ids = Vec::with_capacity(config.buttons.len());
    let mut actions = Vec::new();
    let mut buttons_html = Vec::with_capacity(config.buttons.len());

    for (index, button) in config.buttons.iter().enumerate() {
        let dom_id = button_id(token, index, button.name.as_deref());
        let dismiss_attr = match &button.kind {
            ButtonKind::Dismiss => " data-bs-dismiss=\"modal\"",
            ButtonKind::Action(handler) => {
                actions.push((dom_id.clone(), handler.clone()));
                ""
            }
        };
        buttons_html.push(format!(
            "<button type=\"button\" class=\"btn {}\" id=\"{}\"{}>{}</button>",
            html_escape(button.style.css_class()),
            html_escape(&dom_id),
            dismiss_attr,
            html_escape(&button.text),
        ));
        button_ids.push(dom_id);
    }

    let dialog_class = match config.size.css_class() {
        Some(class) => format!("modal-dialog {class}"),
        None => "modal-dialog".to_string(),
    };

    let mut html = format!(
        "<div class=\"modal fade\" id=\"{}\" tabindex=\"-1\" aria-hidden=\"true\">\
         <div class=\"{dialog_class}\"><div class=\"modal-content\">",
        html_escape(id.as_str()),
    );
    if let Some(title) = &config.title {
        html.push_str(&format!(
            "<div class=\"modal-header\"><h5 class=\"modal-title\">{}</h5>\
             <button type=\"button\" class=\"btn-close\" data-bs-dismiss=\"modal\" aria-label=\"{}\"></button></div>",
            html_escape(title),
            html_escape(&labels.close),
        ));
    }
    html.push_str(&format!(
        "<div class=\"modal-body\">{}</div>",
        config.body.as_str()
    ));
    if !buttons_html.is_empty() {
        html.push_str(&format!(
            "<div class=\"modal-footer\">{}</div>",
            buttons_html.join(" ")
        ));
    }
    html.push_str("</div></div></div>");

    RenderedModal {
        markup: Markup(html),
        button_ids,
        actions,
    }
}

/// Render a record as a bordered two-column table, one row per key in
/// insertion order.
pub fn render_record(record: &Map<String, Value>, labels: &Labels) -> Markup {
    if record.is_empty() {
        return DetailContent::Empty.render(labels);
    }
    let mut html = String::from("<div class=\"table-responsive\"><table class=\"table table-bordered\"><tbody>");
    for (key, value) in record {
        html.push_str(&format!(
            "<tr><td class=\"fw-bold\" style=\"width: 30%;\">{}</td><td>{}</td></tr>",
            html_escape(key),
            render_value(value, labels),
        ));
    }
    html.push_str("</tbody></table></div>");
    Markup(html)
}

fn render_value(value: &Value, labels: &Labels) -> String {
    match value {
        Value::Null => "<span class=\"text-muted\">-</span>".to_string(),
        Value::Bool(true) => format!(
            "<span class=\"text-success\">{}</span>",
            html_escape(&labels.yes)
        ),
        Value::Bool(false) => format!(
            "<span class=\"text-danger\">{}</span>",
            html_escape(&labels.no)
        ),
        Value::Array(_) | Value::Object(_) => {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            format!("<pre class=\"mb-0\"><code>{}</code></pre>", html_escape(&pretty))
        }
        Value::String(s) if is_external_link(s) => {
            let escaped = html_escape(s);
            format!("<a href=\"{escaped}\" target=\"_blank\" rel=\"noopener noreferrer\">{escaped}</a>")
        }
        Value::String(s) => html_escape(s),
        Value::Number(n) => n.to_string(),
    }
}

fn is_external_link(s: &str) -> bool {
    s.split_once("://").is_some_and(|(scheme, _)| {
        LINK_SCHEMES
            .iter()
            .any(|allowed| scheme.eq_ignore_ascii_case(allowed))
    })
}

pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ButtonSpec, ModalOptions};
    use serde_json::json;

    fn labels() -> Labels {
        Labels::default()
    }

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_record_renders_bool_and_link_rows() {
        let html = render_record(
            &record(json!({ "active": true, "url": "http://x" })),
            &labels(),
        );
        let html = html.as_str();

        assert_eq!(html.matches("<tr>").count(), 2);
        let rows: Vec<&str> = html.split("<tr>").skip(1).collect();
        assert!(rows[0].contains(">active</td>"));
        assert!(rows[0].contains("<span class=\"text-success\">Yes</span>"));
        assert!(rows[1].contains(">url</td>"));
        assert!(rows[1].contains("<a href=\"http://x\" target=\"_blank\""));
    }

    #[test]
    fn test_record_value_formatting() {
        let html = render_record(
            &record(json!({
                "missing": null,
                "off": false,
                "nested": { "a": [1, 2] },
                "plain": "<b>hi</b>",
                "count": 3,
                "relative": "httpish text",
            })),
            &labels(),
        );
        let html = html.as_str();

        assert!(html.contains("<span class=\"text-muted\">-</span>"));
        assert!(html.contains("<span class=\"text-danger\">No</span>"));
        assert!(html.contains("<pre class=\"mb-0\"><code>{\n  &quot;a&quot;: ["));
        assert!(html.contains("<td>&lt;b&gt;hi&lt;/b&gt;</td>"));
        assert!(html.contains("<td>3</td>"));
        assert!(html.contains("<td>httpish text</td>"));
    }

    #[test]
    fn test_external_link_detection() {
        assert!(is_external_link("https://example.com"));
        assert!(is_external_link("HTTP://EXAMPLE.COM"));
        assert!(is_external_link("ftp://host/file"));
        assert!(!is_external_link("svn+ssh://host"));
        assert!(!is_external_link("mailto:someone@example.com"));
        assert!(!is_external_link("http"));
        assert!(!is_external_link("://missing"));
        assert!(!is_external_link("xhttp://x"));
    }

    #[test]
    fn test_script_scheme_stays_text() {
        let html = render_record(
            &record(json!({
                "k": "javascript://%0Aalert(document.cookie)",
                "d": "data://text/html,<script>alert(1)</script>",
            })),
            &labels(),
        );
        let html = html.as_str();

        assert!(!html.contains("<a "));
        assert!(!html.contains("href="));
        assert!(html.contains("<td>javascript://%0Aalert(document.cookie)</td>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_empty_content_renders_notice() {
        let html = DetailContent::from(json!(null)).render(&labels());
        assert!(html.as_str().contains("text-muted"));
        assert!(html.as_str().contains("No data to display."));

        let html = render_record(&Map::new(), &labels());
        assert!(html.as_str().contains("No data to display."));
    }

    #[test]
    fn test_detail_content_from_value() {
        assert!(matches!(DetailContent::from(json!({"a": 1})), DetailContent::Record(_)));
        assert!(matches!(DetailContent::from(json!("<p>x</p>")), DetailContent::Markup(_)));
        assert!(matches!(DetailContent::from(json!([1, 2])), DetailContent::Empty));
    }

    #[test]
    fn test_detail_content_from_serialize() {
        #[derive(Serialize)]
        struct Race {
            name: &'static str,
            finished: bool,
        }

        let content = DetailContent::from_serialize(&Race {
            name: "Derby",
            finished: false,
        })
        .unwrap();
        let DetailContent::Record(record) = content else {
            panic!("expected record");
        };
        let keys: Vec<&String> = record.keys().collect();
        assert_eq!(keys, ["name", "finished"]);
    }

    #[test]
    fn test_modal_structure_with_header_and_footer() {
        let id = ModalId::from("editModal");
        let config = ModalConfig::new("Edit <race>", "<form></form>")
            .button(ButtonSpec::dismiss("Cancel"))
            .button(ButtonSpec::action("Save", || {}).name("save"))
            .with_options(&ModalOptions::new().size(crate::ModalSize::Large));

        let rendered = render_modal(&id, InstanceToken::new(7), &config, &labels());
        let html = rendered.markup.as_str();

        assert!(html.starts_with("<div class=\"modal fade\" id=\"editModal\""));
        assert!(html.contains("<div class=\"modal-dialog modal-lg\">"));
        assert!(html.contains("<h5 class=\"modal-title\">Edit &lt;race&gt;</h5>"));
        assert!(html.contains("<div class=\"modal-body\"><form></form></div>"));
        assert!(html.contains("<div class=\"modal-footer\">"));
        assert!(html.contains(
            "<button type=\"button\" class=\"btn btn-secondary\" id=\"modal-btn-7-0\" data-bs-dismiss=\"modal\">Cancel</button>"
        ));
        assert!(html.contains(
            "<button type=\"button\" class=\"btn btn-primary\" id=\"modal-btn-7-1-save\">Save</button>"
        ));

        assert_eq!(rendered.button_ids, ["modal-btn-7-0", "modal-btn-7-1-save"]);
        assert_eq!(rendered.actions.len(), 1);
        assert_eq!(rendered.actions[0].0, "modal-btn-7-1-save");
    }

    #[test]
    fn test_modal_without_header_or_buttons() {
        let id = ModalId::from("loadingModal");
        let config = ModalConfig::new("", "<p>busy</p>")
            .with_options(&ModalOptions::new().show_header(false));

        let rendered = render_modal(&id, InstanceToken::new(1), &config, &labels());
        let html = rendered.markup.as_str();

        assert!(!html.contains("modal-header"));
        assert!(!html.contains("modal-footer"));
        assert!(html.contains("<div class=\"modal-body\"><p>busy</p></div>"));
        assert!(rendered.button_ids.is_empty());
        assert!(rendered.actions.is_empty());
    }

    #[test]
    fn test_every_action_binding_targets_rendered_id() {
        let id = ModalId::from("customModal");
        let config = ModalConfig::new("T", "b")
            .button(ButtonSpec::action("A", || {}).name("go"))
            .button(ButtonSpec::action("B", || {}).name("go"))
            .button(ButtonSpec::dismiss("C"));

        let rendered = render_modal(&id, InstanceToken::new(3), &config, &labels());
        assert_eq!(rendered.actions.len(), 2);
        assert_ne!(rendered.actions[0].0, rendered.actions[1].0);
        for (dom_id, _) in &rendered.actions {
            assert!(rendered.markup.as_str().contains(&format!("id=\"{dom_id}\"")));
        }
    }

    #[test]
    fn test_button_names_cannot_shape_the_id() {
        let token = InstanceToken::new(2);
        assert_eq!(button_id(token, 0, Some("save")), "modal-btn-2-0-save");
        assert_eq!(button_id(token, 0, Some("x-1 \"y\"")), "modal-btn-2-0-x1y");
        assert_eq!(button_id(token, 3, Some("-")), "modal-btn-2-3");
        assert_eq!(button_id(token, 3, None), "modal-btn-2-3");
        assert_ne!(
            button_id(InstanceToken::new(1), 2, Some("3")),
            button_id(InstanceToken::new(1), 23, None)
        );
    }

    #[test]
    fn test_markup_text_escapes() {
        assert_eq!(Markup::text("a & \"b\"").as_str(), "a &amp; &quot;b&quot;");
        assert_eq!(Markup::from("<b>").as_str(), "<b>");
    }
}
