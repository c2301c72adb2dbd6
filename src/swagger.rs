use axum::response::Html;

use crate::error::DocsError;

const DEFAULT_DIST_VERSION: &str = "5";
const DEFAULT_TITLE: &str = "SwaggerUI";

/// Swagger UI page that loads the spec through a relative reference.
///
/// Behind API Gateway every path is prefixed with `/{stage}`, so `./openapi` requested from
/// `/dev/ui` resolves to `/dev/openapi` while `/openapi` would miss the stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwaggerUi {
    spec_url: String,
    title: String,
    dist_version: String,
}

impl SwaggerUi {
    /// Creates a page for `spec_url`, which must be a relative-path reference.
    pub fn new(spec_url: impl Into<String>) -> Result<Self, DocsError> {
        let spec_url = spec_url.into();
        if !is_relative_path_reference(&spec_url) {
            return Err(DocsError::NonRelativeSpecUrl(spec_url));
        }

        Ok(Self {
            spec_url,
            title: DEFAULT_TITLE.to_owned(),
            dist_version: DEFAULT_DIST_VERSION.to_owned(),
        })
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Pins the `swagger-ui-dist` release loaded from the CDN.
    pub fn dist_version(mut self, version: impl Into<String>) -> Self {
        self.dist_version = version.into();
        self
    }

    pub fn spec_url(&self) -> &str {
        &self.spec_url
    }

    pub fn render(&self) -> Html<String> {
        let cdn = format!(
            "https://cdn.jsdelivr.net/npm/swagger-ui-dist@{}",
            escape_html(&self.dist_version)
        );
        // JSON string literals are valid JS; escape `<` so the value cannot close the script tag.
        let spec_url = serde_json::Value::String(self.spec_url.clone())
            .to_string()
            .replace('<', "\\u003c");

        Html(format!(
            r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <meta name="description" content="SwaggerUI" />
    <title>{title}</title>
    <link rel="stylesheet" href="{cdn}/swagger-ui.css" />
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="{cdn}/swagger-ui-bundle.js" crossorigin="anonymous"></script>
    <script>
      window.onload = () => {{
        window.ui = SwaggerUIBundle({{
          dom_id: '#swagger-ui',
          url: {spec_url},
        }});
      }};
    </script>
  </body>
</html>
"#,
            title = escape_html(&self.title),
        ))
    }
}

/// True for references like `./openapi` or `openapi`; false for `/openapi`, `//host/x`, `https://...`.
pub fn is_relative_path_reference(reference: &str) -> bool {
    if reference.is_empty() || reference.starts_with('/') {
        return false;
    }

    // A scheme is only recognized before the first `/`, `?`, or `#` (RFC 3986 section 4.2).
    let head = reference
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    !head.contains(':')
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_relative_references() {
        assert!(is_relative_path_reference("./openapi"));
        assert!(is_relative_path_reference("openapi"));
        assert!(is_relative_path_reference("../v1/openapi?x=y:z"));
    }

    #[test]
    fn rejects_rooted_and_absolute_references() {
        assert!(!is_relative_path_reference("/openapi"));
        assert!(!is_relative_path_reference("//cdn.example.com/openapi"));
        assert!(!is_relative_path_reference("https://example.com/openapi"));
        assert!(!is_relative_path_reference(""));
        assert!(matches!(
            SwaggerUi::new("/openapi"),
            Err(DocsError::NonRelativeSpecUrl(url)) if url == "/openapi"
        ));
    }

    #[test]
    fn page_points_at_relative_spec() {
        let Html(page) = SwaggerUi::new("./openapi").unwrap().render();
        assert!(page.contains(r#"url: "./openapi""#));
        assert!(page.contains("swagger-ui-dist@5/swagger-ui-bundle.js"));
        assert!(!page.contains(r#""/openapi""#));
    }

    #[test]
    fn title_is_escaped() {
        let Html(page) = SwaggerUi::new("./openapi")
            .unwrap()
            .title("<Sandbox & Co>")
            .render();
        assert!(page.contains("<title>&lt;Sandbox &amp; Co&gt;</title>"));
    }
}
