//! Out-of-band cache revalidation. The web deployment exposes this as a POST
//! webhook guarded by the `x-revalidate-secret` header; here the same handler
//! backs the manual refresh command, keeping the 401 semantics testable.

use serde_json::{json, Value};

use crate::sheets::{self, REVALIDATE_TAG};

#[derive(Debug)]
pub struct RevalidateResponse {
    pub status: u16,
    pub body: Value,
}

impl RevalidateResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// When a secret is configured, the provided one must match exactly or the
/// request is rejected with 401. On success the shared `"tokens"` tag is
/// purged — there is no per-domain granularity.
pub fn handle_revalidate(
    required_secret: Option<&str>,
    provided_secret: Option<&str>,
) -> RevalidateResponse {
    if let Some(required) = required_secret.filter(|s| !s.is_empty()) {
        if provided_secret != Some(required) {
            return RevalidateResponse {
                status: 401,
                body: json!({"ok": false, "error": "Unauthorized"}),
            };
        }
    }

    sheets::purge_tag(REVALIDATE_TAG);

    RevalidateResponse {
        status: 200,
        body: json!({"ok": true, "revalidated": [REVALIDATE_TAG]}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_secret_is_unauthorized_when_configured() {
        let resp = handle_revalidate(Some("s3cret"), None);
        assert_eq!(resp.status, 401);
        assert_eq!(resp.body["ok"], false);
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let resp = handle_revalidate(Some("s3cret"), Some("nope"));
        assert_eq!(resp.status, 401);
    }

    #[test]
    fn matching_secret_purges_and_acknowledges() {
        let resp = handle_revalidate(Some("s3cret"), Some("s3cret"));
        assert!(resp.is_success());
        assert_eq!(resp.body["ok"], true);
        assert_eq!(resp.body["revalidated"], json!(["tokens"]));
    }

    #[test]
    fn no_configured_secret_accepts_anything() {
        assert!(handle_revalidate(None, None).is_success());
        assert!(handle_revalidate(Some(""), None).is_success());
        assert!(handle_revalidate(None, Some("whatever")).is_success());
    }
}
