//! Heuristics guessing what a request is trying to do.

use axum::http::{header::CONTENT_TYPE, Method, Request};

const SEARCH_SUFFIXES: &[&str] = &["_search", "/search", "_query"];

const COMMAND_SUFFIXES: &[&str] = &[
    "_command", "/command", "_request", "/request", "_run", "/run", "_execute", "/execute",
];

const CREATE_SUFFIXES: &[&str] = &["/create", "_create"];

/// JSON content type, or a `.json` path.
pub fn wants_json<B>(request: &Request<B>) -> bool {
    let json_content = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            let mime = v.split(';').next().unwrap_or_default().trim();
            mime.eq_ignore_ascii_case("application/json") || mime.eq_ignore_ascii_case("text/json")
        })
        .unwrap_or(false);

    json_content || request.uri().path().ends_with(".json")
}

pub fn looks_like_a_search<B>(request: &Request<B>) -> bool {
    ends_with_any(request.uri().path(), SEARCH_SUFFIXES)
}

pub fn looks_like_a_command<B>(request: &Request<B>) -> bool {
    ends_with_any(request.uri().path(), COMMAND_SUFFIXES)
}

/// A POST that is neither a search nor a command, or an explicit create path.
pub fn looks_like_a_create<B>(request: &Request<B>) -> bool {
    let post = request.method() == Method::POST
        && !looks_like_a_search(request)
        && !looks_like_a_command(request);

    post || ends_with_any(request.uri().path(), CREATE_SUFFIXES)
}

fn ends_with_any(path: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|suffix| path.ends_with(suffix))
}
