//! UI serving routes
//!
//! Serves the embedded form page and its script. The page template carries
//! `{{PLACEHOLDER}}` markers filled from the configured framing.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use obesity_common::Framing;

use crate::AppState;

const INDEX_HTML: &str = include_str!("../ui/index.html");
const APP_JS: &str = include_str!("../ui/app.js");

/// Fill the page template for one framing
pub fn render_index(framing: Framing) -> String {
    INDEX_HTML
        .replace("{{TITLE}}", framing.page_title())
        .replace("{{INTRO}}", framing.page_intro())
        .replace("{{UNAVAILABLE}}", framing.unavailable_message())
        .replace("{{FRAMING}}", framing.as_str())
}

/// GET /
///
/// Serves the assessment form
pub async fn serve_index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(state.framing))
}

/// GET /static/app.js
///
/// Serves the form script
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        APP_JS,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_fills_every_placeholder() {
        for framing in [Framing::Consumer, Framing::Clinical] {
            let html = render_index(framing);
            assert!(!html.contains("{{"), "unfilled placeholder for {}", framing);
            assert!(html.contains(framing.page_title()));
        }
    }
}
