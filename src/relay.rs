//! Image relay: validates a `src` URL against the googleusercontent
//! allow-list and proxies the upstream bytes with long-lived cache headers.
//! Used by the focus view's image download action; the response struct keeps
//! the HTTP semantics (400/403/502 and passthrough status) intact.

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, REFERER};
use serde_json::{json, Value};
use url::Url;

const ALLOWED_HOSTNAMES: &[&str] = &[
    "lh3.googleusercontent.com",
    "lh5.googleusercontent.com",
    "lh7-us.googleusercontent.com",
];

const CACHE_CONTROL_VALUE: &str = "public, max-age=86400, stale-while-revalidate=86400";
const ACCEPT_VALUE: &str = "image/avif,image/webp,image/apng,image/*,*/*;q=0.8";
const REFERER_VALUE: &str = "https://victory-road.fr";

#[derive(Debug)]
pub enum RelayBody {
    Bytes(Vec<u8>),
    Json(Value),
}

#[derive(Debug)]
pub struct RelayResponse {
    pub status: u16,
    pub content_type: String,
    pub cache_control: Option<&'static str>,
    pub cors_allow_origin: Option<&'static str>,
    pub body: RelayBody,
}

impl RelayResponse {
    fn error(status: u16, body: Value) -> Self {
        Self {
            status,
            content_type: "application/json".to_string(),
            cache_control: None,
            cors_allow_origin: None,
            body: RelayBody::Json(body),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Reject anything that is not a well-formed absolute URL on the allow-list:
/// 400 for missing/invalid, 403 for a disallowed host.
pub fn validate_src(src: Option<&str>) -> Result<Url, RelayResponse> {
    let Some(src) = src.filter(|s| !s.trim().is_empty()) else {
        return Err(RelayResponse::error(400, json!({"ok": false, "error": "Missing src"})));
    };

    let parsed = Url::parse(src)
        .map_err(|_| RelayResponse::error(400, json!({"ok": false, "error": "Invalid URL"})))?;

    let allowed = parsed
        .host_str()
        .is_some_and(|host| ALLOWED_HOSTNAMES.contains(&host));
    if !allowed {
        return Err(RelayResponse::error(403, json!({"ok": false, "error": "Host not allowed"})));
    }

    Ok(parsed)
}

pub fn handle_image_relay(client: &Client, src: Option<&str>) -> RelayResponse {
    let url = match validate_src(src) {
        Ok(url) => url,
        Err(resp) => return resp,
    };

    let resp = match client
        .get(url.as_str())
        .header(ACCEPT, ACCEPT_VALUE)
        .header(REFERER, REFERER_VALUE)
        .send()
    {
        Ok(resp) => resp,
        Err(_) => {
            return RelayResponse::error(502, json!({"ok": false, "error": "Upstream error"}));
        }
    };

    let status = resp.status();
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("image/jpeg")
        .to_string();
    let bytes = resp.bytes().ok().map(|b| b.to_vec()).unwrap_or_default();

    if !status.is_success() || bytes.is_empty() {
        // Empty body on a 2xx still counts as an upstream failure.
        let reported = if status.is_success() { 502 } else { status.as_u16() };
        return RelayResponse::error(
            reported,
            json!({"ok": false, "status": status.as_u16(), "error": "Upstream error"}),
        );
    }

    RelayResponse {
        status: 200,
        content_type,
        cache_control: Some(CACHE_CONTROL_VALUE),
        cors_allow_origin: Some("*"),
        body: RelayBody::Bytes(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_field(resp: &RelayResponse) -> String {
        match &resp.body {
            RelayBody::Json(value) => value["error"].as_str().unwrap_or_default().to_string(),
            RelayBody::Bytes(_) => panic!("expected json body"),
        }
    }

    #[test]
    fn missing_src_is_400() {
        let err = validate_src(None).expect_err("should reject");
        assert_eq!(err.status, 400);
        assert_eq!(error_field(&err), "Missing src");

        let err = validate_src(Some("   ")).expect_err("should reject");
        assert_eq!(err.status, 400);
    }

    #[test]
    fn malformed_url_is_400() {
        let err = validate_src(Some("not a url")).expect_err("should reject");
        assert_eq!(err.status, 400);
        assert_eq!(error_field(&err), "Invalid URL");

        // Relative URLs are not absolute, so they fail parsing too.
        let err = validate_src(Some("/images/a.png")).expect_err("should reject");
        assert_eq!(err.status, 400);
    }

    #[test]
    fn disallowed_host_is_403() {
        let err = validate_src(Some("https://example.com/a.png")).expect_err("should reject");
        assert_eq!(err.status, 403);
        assert_eq!(error_field(&err), "Host not allowed");
    }

    #[test]
    fn allow_listed_hosts_pass() {
        for host in ALLOWED_HOSTNAMES {
            let url = validate_src(Some(&format!("https://{host}/img.png"))).expect("allowed");
            assert_eq!(url.host_str(), Some(*host));
        }
    }

    #[test]
    fn subdomains_of_allowed_hosts_are_rejected() {
        let err = validate_src(Some("https://evil.lh3.googleusercontent.com/a.png"))
            .expect_err("should reject");
        assert_eq!(err.status, 403);
    }
}
