//! HTML pages.
//!
//! Pages are handlebars templates compiled into the binary. Handlebars escapes
//! everything substituted with `{{...}}`.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde_json::{Value, json};
use std::fmt;

/// Title of the home page.
pub const HOME_TITLE: &str = "Pagination Basics";

/// Name of the home page template.
const HOMEPAGE: &str = "homepage";

/// Name of the pagination template.
const PAGINATION: &str = "pagination";

/// The page templates.
pub struct Pages {
    registry: Handlebars<'static>,
}

impl Pages {
    /// Compile the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns an error if a template doesn’t parse.
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_partial(
            "header",
            include_str!("../templates/partials/header.hbs"),
        )?;
        registry.register_partial(
            "footer",
            include_str!("../templates/partials/footer.hbs"),
        )?;
        registry.register_template_string(
            HOMEPAGE,
            include_str!("../templates/homepage.hbs"),
        )?;
        registry.register_template_string(
            PAGINATION,
            include_str!("../templates/pagination.hbs"),
        )?;
        Ok(Self { registry })
    }

    /// The home page.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn homepage(&self, title: &str) -> Result<String, RenderError> {
        self.registry.render(HOMEPAGE, &json!({ "title": title }))
    }

    /// One page of a Graph collection response.
    ///
    /// `graphdata` is rendered as received. Items in `value` get a table row
    /// with whichever of the usual message fields they have, and
    /// `@odata.nextLink` turns into a link to the next page.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn pagination(&self, graphdata: &Value) -> Result<String, RenderError> {
        let item_count = graphdata
            .get("value")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        let next_link = graphdata
            .get("@odata.nextLink")
            .and_then(Value::as_str)
            .map(pagination_link);
        let pretty = serde_json::to_string_pretty(graphdata)
            .unwrap_or_else(|_| graphdata.to_string());

        self.registry.render(
            PAGINATION,
            &json!({
                "title": HOME_TITLE,
                "graphdata": graphdata,
                "item_count": item_count,
                "next_link": next_link,
                "pretty": pretty,
            }),
        )
    }
}

impl fmt::Debug for Pages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pages").finish_non_exhaustive()
    }
}

/// Link to view another page of results in [`Pages::pagination()`].
///
/// Every reserved character is percent encoded, so the link can go into an
/// attribute as is.
///
/// ```
/// use pagination_basics::pages::pagination_link;
///
/// assert_eq!(
///     pagination_link("https://graph.microsoft.com/v1.0/me/messages?$skip=10"),
///     "/pagination?endpoint=https%3A%2F%2Fgraph.microsoft.com%2Fv1.0%2Fme%2F\
///     messages%3F%24skip%3D10",
/// );
/// ```
#[must_use]
pub fn pagination_link(endpoint: &str) -> String {
    let encoded: String =
        url::form_urlencoded::byte_serialize(endpoint.as_bytes()).collect();
    format!("/pagination?endpoint={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;

    fn pages() -> Pages {
        Pages::new().unwrap()
    }

    #[test]
    fn homepage_title_and_login() {
        let html = pages().homepage(HOME_TITLE).unwrap();
        assert!(html.contains("<title>Pagination Basics</title>"));
        assert!(html.contains("<h1>Pagination Basics</h1>"));
        assert!(html.contains("href=\"/login\""));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn homepage_escapes_title() {
        let html = pages().homepage("<script>").unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn pagination_rows_and_next_link() {
        let html = pages()
            .pagination(&json!({
                "@odata.context": "https://graph.microsoft.com/v1.0/$metadata",
                "value": [
                    {
                        "receivedDateTime": "2024-01-02T03:04:05Z",
                        "subject": "Lunch & learn",
                        "from": {"emailAddress": {"name": "Sam"}},
                    },
                    {"id": "no-fields"},
                ],
                "@odata.nextLink":
                    "https://graph.microsoft.com/v1.0/me/messages?$skip=10",
            }))
            .unwrap();

        assert!(html.contains("<p>2 items on this page.</p>"));
        assert!(html.contains(
            "<tr><td>2024-01-02T03:04:05Z</td><td>Sam</td>\
            <td>Lunch &amp; learn</td></tr>"
        ));
        assert!(html.contains("<tr><td></td><td></td><td></td></tr>"));
        assert!(html.contains(
            "href=\"/pagination?endpoint=https%3A%2F%2Fgraph.microsoft.com\
            %2Fv1.0%2Fme%2Fmessages%3F%24skip%3D10\""
        ));
        assert!(!html.contains("This is the last page."));
    }

    #[test]
    fn pagination_last_page() {
        let html = pages().pagination(&json!({"value": []})).unwrap();
        assert!(html.contains("<p>0 items on this page.</p>"));
        assert!(!html.contains("<table>"));
        assert!(html.contains("This is the last page."));
    }

    #[test]
    fn pagination_without_value() {
        let html = pages().pagination(&json!({"id": "me"})).unwrap();
        assert!(html.contains("<p>0 items on this page.</p>"));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn pagination_shows_raw_json() {
        let html = pages().pagination(&json!({"error": "<b>"})).unwrap();
        assert!(html.contains("&quot;error&quot;: &quot;&lt;b&gt;&quot;"));
        assert!(!html.contains("<b>"));
    }
}
