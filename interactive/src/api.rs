use agora_shared::VoteOutcome;
use gloo_net::http::Request;
use thiserror::Error;
use web_sys::window;

/// Header the server expects the anti-forgery token under when the page
/// does not name one via `_csrf_header`.
pub const DEFAULT_CSRF_HEADER: &str = "X-CSRF-TOKEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken {
    pub header_name: String,
    pub value: String,
}

/// Where the anti-forgery token comes from. Injected into the vote
/// pipeline so tests can supply a fixed token instead of page metadata.
pub trait CsrfSource {
    fn token(&self) -> Option<CsrfToken>;
}

/// Reads `<meta name="_csrf">` / `<meta name="_csrf_header">` at call
/// time, the way the server-rendered templates publish them.
pub struct MetaCsrf;

fn meta_content(name: &str) -> Option<String> {
    let document = window()?.document()?;
    let el = document
        .query_selector(&format!("meta[name='{name}']"))
        .ok()??;
    el.get_attribute("content").filter(|c| !c.is_empty())
}

impl CsrfSource for MetaCsrf {
    fn token(&self) -> Option<CsrfToken> {
        let value = meta_content("_csrf")?;
        let header_name =
            meta_content("_csrf_header").unwrap_or_else(|| DEFAULT_CSRF_HEADER.to_string());
        Some(CsrfToken { header_name, value })
    }
}

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("vote control is missing its post or comment id")]
    MissingId,
    #[error("vote request failed: {0}")]
    Network(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("malformed vote response: {0}")]
    Malformed(String),
    #[error("vote rejected by the server")]
    Rejected,
}

/// Transport for vote submissions. `Ok` means the server accepted the
/// vote and returned a tally; every other case is a `VoteError`.
#[allow(async_fn_in_trait)]
pub trait VoteTransport {
    async fn post_vote(
        &self,
        path: &str,
        csrf: Option<&CsrfToken>,
    ) -> Result<VoteOutcome, VoteError>;
}

/// Header set for a vote POST: same-origin JSON-accepting AJAX, plus
/// the anti-forgery header whenever a token is available.
pub fn vote_headers(csrf: Option<&CsrfToken>) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("X-Requested-With".to_string(), "XMLHttpRequest".to_string()),
    ];
    if let Some(token) = csrf {
        headers.push((token.header_name.clone(), token.value.clone()));
    }
    headers
}

/// Classifies the response body. Non-JSON and an accepted vote without
/// a score both count as malformed; `success:false` is a rejection.
pub fn decode_outcome(body: &str) -> Result<VoteOutcome, VoteError> {
    let outcome: VoteOutcome =
        serde_json::from_str(body).map_err(|e| VoteError::Malformed(e.to_string()))?;
    if !outcome.success {
        return Err(VoteError::Rejected);
    }
    if outcome.score.is_none() {
        return Err(VoteError::Malformed(
            "accepted vote carried no score".to_string(),
        ));
    }
    Ok(outcome)
}

/// Production transport over the browser fetch API.
pub struct FetchTransport;

impl VoteTransport for FetchTransport {
    async fn post_vote(
        &self,
        path: &str,
        csrf: Option<&CsrfToken>,
    ) -> Result<VoteOutcome, VoteError> {
        let mut req = Request::post(path);
        for (name, value) in vote_headers(csrf) {
            req = req.header(&name, &value);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| VoteError::Network(e.to_string()))?;

        if !resp.ok() {
            return Err(VoteError::Status(resp.status()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| VoteError::Network(e.to_string()))?;
        decode_outcome(&body)
    }
}
