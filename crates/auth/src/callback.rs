//! The fragment-extraction page served at `/oauth/callback`.
//!
//! Browsers never send the URL fragment to the server, so the implicit-grant
//! token is invisible to request handlers. The page reads `access_token`,
//! `state` and `error` from `location.hash` and re-submits them with a
//! same-origin `POST` to the completion endpoint.

use serde::Deserialize;

/// Body of `POST /oauth/complete`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteRequest {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub state: String,
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Telemost OAuth</title>
</head>
<body>
    <script>
        const completeUrl = __COMPLETE_URL__;
        const siteUrl = __SITE_URL__;
        const params = new URLSearchParams(window.location.hash.substring(1));

        const accessToken = params.get('access_token');
        const error = params.get('error');
        const state = params.get('state');

        function show(title, text) {
            const h = document.createElement('h1');
            h.textContent = title;
            const p = document.createElement('p');
            p.textContent = text;
            document.body.replaceChildren(h, p);
        }

        if (error) {
            show('OAuth Error', error + ': ' + (params.get('error_description') || ''));
        } else if (accessToken && state) {
            fetch(completeUrl, {
                method: 'POST',
                credentials: 'same-origin',
                headers: {'Content-Type': 'application/json'},
                body: JSON.stringify({access_token: accessToken, state: state})
            }).then(response => {
                if (response.ok) {
                    show('Success!', 'Telemost has been connected. Redirecting back...');
                    setTimeout(() => { window.location.href = siteUrl; }, 2000);
                } else {
                    show('Error', 'Failed to complete OAuth setup.');
                }
            }).catch(err => {
                show('Error', 'Failed to complete OAuth setup: ' + err.message);
            });
        } else {
            show('Error', 'Missing access token or state.');
        }
    </script>
</body>
</html>
"#;

/// Render the callback page.
///
/// `complete_url` is the same-origin completion endpoint; `site_url` is where
/// the browser goes after success. Both are embedded as JSON string literals
/// with `<`, `>` and `&` escaped so they cannot break out of the script block.
#[must_use]
pub fn render_callback_page(site_url: &str, complete_url: &str) -> String {
    PAGE_TEMPLATE
        .replace("__COMPLETE_URL__", &js_string(complete_url))
        .replace("__SITE_URL__", &js_string(site_url))
}

fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string())
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_reads_fragment_and_posts() {
        let html = render_callback_page(
            "https://chat.example.com",
            "/plugins/com.mattermost.plugin-telemost/oauth/complete",
        );
        assert!(html.contains("window.location.hash"));
        assert!(html.contains("method: 'POST'"));
        assert!(html.contains(r#"const completeUrl = "/plugins/com.mattermost.plugin-telemost/oauth/complete";"#));
        assert!(html.contains(r#"const siteUrl = "https://chat.example.com";"#));
    }

    #[test]
    fn test_site_url_cannot_close_script() {
        let html = render_callback_page("https://x/</script><script>alert(1)//", "/c");
        assert!(!html.contains("</script><script>alert"));
        assert!(html.contains("\\u003c/script\\u003e"));
    }

    #[test]
    fn test_complete_request_defaults_missing_fields() {
        let req: CompleteRequest = serde_json::from_str(r#"{"state":"s"}"#).unwrap();
        assert_eq!(req.state, "s");
        assert!(req.access_token.is_empty());
    }
}
