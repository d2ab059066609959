// Spectate endpoint derivation from the configured server base URL.

use url::Url;

pub const SPECTATE_PATH: &str = "/spectate";
pub const ROOM_TOKEN_PARAM: &str = "room_token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    InvalidUrl(String),
    UnsupportedScheme(String),
}

impl std::fmt::Display for EndpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointError::InvalidUrl(err) => write!(f, "invalid server url: {err}"),
            EndpointError::UnsupportedScheme(scheme) => {
                write!(f, "unsupported server url scheme: {scheme}")
            }
        }
    }
}

impl std::error::Error for EndpointError {}

/// Maps `http(s)://host[:port]` to `ws(s)://host[:port]/spectate[?room_token=..]`.
pub fn spectate_endpoint(base: &str, room_token: Option<&str>) -> Result<Url, EndpointError> {
    let mut url = Url::parse(base).map_err(|err| EndpointError::InvalidUrl(err.to_string()))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|_| EndpointError::UnsupportedScheme(scheme.to_string()))?;

    url.set_path(SPECTATE_PATH);
    url.set_query(None);
    url.set_fragment(None);
    if let Some(token) = room_token.filter(|token| !token.is_empty()) {
        url.query_pairs_mut().append_pair(ROOM_TOKEN_PARAM, token);
    }

    Ok(url)
}
