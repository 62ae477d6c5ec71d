//! HTML rendering of the page for the web host.

use super::{InputField, Page};
use crate::session::Download;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use uuid::Uuid;

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"']+[^\s<>"'.,;:!?)\]]"#).expect("Invalid regex"));

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
h1 { font-size: 2.5rem; margin-bottom: 0.25rem; }
label { display: block; font-weight: 600; margin-top: 1rem; }
input[type=text], input[type=password] { width: 100%; padding: 0.5rem; font-size: 1rem; box-sizing: border-box; }
.help { color: #666; font-size: 0.85rem; }
button, a.download { display: inline-block; margin-top: 1rem; padding: 0.5rem 1rem; font-size: 1rem; }
.response { white-space: pre-wrap; background: #f6f8fa; padding: 1rem; border-radius: 6px; margin-top: 1.5rem; }
.error { background: #fdecea; color: #611a15; padding: 1rem; border-radius: 6px; margin-top: 1.5rem; }
"#;

/// Page implementation that renders to an HTML document.
///
/// Input values come from the submitted form. Masked fields are never
/// echoed back into the markup.
pub struct HtmlPage {
    session_id: Uuid,
    values: HashMap<String, String>,
    credential_saved: bool,
    header: String,
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl HtmlPage {
    /// Create a page for a session from submitted form values.
    pub fn new(session_id: Uuid, values: HashMap<String, String>, credential_saved: bool) -> Self {
        Self {
            session_id,
            values,
            credential_saved,
            header: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Show a failure in place of the answer.
    pub fn render_error(&mut self, message: &str) {
        self.outputs.push(format!(
            "<div class=\"error\"><strong>Something went wrong.</strong><br>{}</div>",
            escape_html(message)
        ));
    }

    /// Produce the complete HTML document.
    pub fn finish(self) -> String {
        let action = format!("/session/{}", self.session_id);
        let form = if self.inputs.is_empty() {
            String::new()
        } else {
            format!(
                "<form method=\"post\" action=\"{}\">\n{}\n<button type=\"submit\">Ask</button>\n</form>",
                action,
                self.inputs.join("\n")
            )
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>ArXiv QA Bot</title>
<style>{style}</style>
</head>
<body>
{header}
{form}
{outputs}
<form method="post" action="{action}/end"><button type="submit">End session</button></form>
</body>
</html>
"#,
            style = STYLE,
            header = self.header,
            form = form,
            outputs = self.outputs.join("\n"),
            action = action,
        )
    }
}

impl Page for HtmlPage {
    fn header(&mut self, title: &str, intro: &str) {
        self.header = format!(
            "<h1>{}</h1>\n<p>{}</p>",
            escape_html(title),
            escape_html(intro)
        );
    }

    fn text_input(&mut self, field: &InputField) -> String {
        let value = self.values.get(field.key).cloned().unwrap_or_default();

        let input = if field.masked {
            let placeholder = if self.credential_saved {
                "Saved for this session"
            } else {
                ""
            };
            format!(
                "<input type=\"password\" id=\"{key}\" name=\"{key}\" placeholder=\"{placeholder}\" autocomplete=\"off\">",
                key = field.key,
                placeholder = placeholder,
            )
        } else {
            format!(
                "<input type=\"text\" id=\"{key}\" name=\"{key}\" value=\"{value}\">",
                key = field.key,
                value = escape_html(&value),
            )
        };

        let help = field
            .help
            .map(|h| format!("\n<div class=\"help\">{}</div>", linkify(h)))
            .unwrap_or_default();

        self.inputs.push(format!(
            "<label for=\"{}\">{}</label>\n{}{}",
            field.key,
            escape_html(field.label),
            input,
            help
        ));

        value
    }

    fn render_text(&mut self, content: &str) {
        self.outputs.push(format!(
            "<div class=\"response\">{}</div>",
            linkify(content)
        ));
    }

    fn offer_download(&mut self, download: &Download) {
        self.outputs.push(format!(
            "<a class=\"download\" href=\"/session/{}/transcript\" download=\"{}\">{}</a>",
            self.session_id,
            escape_html(&download.file_name),
            escape_html(&download.label)
        ));
    }
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape raw text and turn the URLs in it into links.
fn linkify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in URL.find_iter(text) {
        out.push_str(&escape_html(&text[last..m.start()]));
        let url = escape_html(m.as_str());
        out.push_str(&format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
            url, url
        ));
        last = m.end();
    }
    out.push_str(&escape_html(&text[last..]));
    out
}
