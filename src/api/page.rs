//! Server-side rendering of the single prediction page.

use std::fmt::Write;

use crate::inference::domain::{QualityClass, INPUT_FEATURES};

pub const SERVICE_DOWN: &str =
    "Prediction service is currently down (Model Artifacts Missing/Failed to Load).";

/// Banner text for a field that is blank or not a number.
pub fn invalid_field_message(field: &str) -> String {
    format!(
        "Invalid input for '{field}'. Please ensure all values are valid numbers and are not left blank."
    )
}

pub fn unexpected_error_message(err: &dyn std::fmt::Display) -> String {
    format!("An unexpected error occurred during prediction: {err}")
}

/// Everything that varies between renders.
#[derive(Clone, Debug, Default)]
pub struct PageView {
    /// Field values to pre-fill; falls back to the sample record.
    pub values: Vec<(String, String)>,
    pub result: Option<QualityClass>,
    pub error: Option<String>,
    pub model_error: bool,
}

impl PageView {
    fn value_for(&self, name: &str, default: f64) -> String {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| default.to_string())
    }
}

/// Minimal HTML escaping for text and attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Wine Quality Classifier</title>
<style>
body { font-family: sans-serif; background: #f7fafc; }
.card { max-width: 32rem; margin: 2rem auto; background: #fff; padding: 2rem; border-radius: 0.75rem; box-shadow: 0 10px 25px rgba(0,0,0,0.1); }
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
.error { background: #fee2e2; border-left: 4px solid #ef4444; color: #b91c1c; padding: 1rem; margin-bottom: 1rem; }
.result { padding: 1.5rem; margin-bottom: 1.5rem; border-radius: 0.5rem; }
.result.high { background: #dcfce7; border: 1px solid #4ade80; }
.result.low { background: #fef9c3; border: 1px solid #facc15; }
.note { text-align: center; color: #ef4444; font-size: 0.75rem; }
</style>
</head>
<body>
<div class="card">
<h1>Wine Quality Prediction</h1>
"#;

/// Render the full page.
pub fn render(view: &PageView) -> String {
    let mut html = String::from(HEAD);

    if let Some(error) = &view.error {
        let _ = writeln!(
            html,
            "<div class=\"error\" role=\"alert\"><p><strong>Error</strong></p><p>{}</p></div>",
            escape(error)
        );
    }

    if let Some(result) = view.result {
        let class = match result {
            QualityClass::High => "high",
            QualityClass::Low => "low",
        };
        let _ = writeln!(
            html,
            "<div class=\"result {class}\"><h2>Prediction Result:</h2><p><strong>{}</strong></p>\
             <p>(Quality score &gt;= 6 is classified as HIGH)</p></div>",
            result.as_str()
        );
    }

    html.push_str(
        "<form method=\"POST\" action=\"/predict\">\n\
         <p>Enter the 11 chemical properties of the wine:</p>\n<div class=\"grid\">\n",
    );
    for (name, default) in INPUT_FEATURES {
        let value = escape(&view.value_for(name, default));
        let name = escape(name);
        let _ = writeln!(
            html,
            "<div><label for=\"{name}\">{name}:</label>\
             <input type=\"number\" step=\"0.001\" id=\"{name}\" name=\"{name}\" value=\"{value}\" required></div>"
        );
    }
    html.push_str("</div>\n<button type=\"submit\">Get Prediction</button>\n</form>\n");

    if view.model_error {
        html.push_str(
            "<p class=\"note\">[ERROR] Model failed to load. Please check the model artefact path.</p>\n",
        );
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}
