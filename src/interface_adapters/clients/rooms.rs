use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

pub const ROOMS_PATH: &str = "/rooms";

// One entry of the server's room listing. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomDescriptor {
    pub id: String,
    pub token: String,
    pub name: String,
    pub max_players: u32,
    #[serde(default)]
    pub time_limit_seconds: Option<u32>,
}

#[derive(Debug)]
pub enum RoomsClientError {
    Transport(reqwest::Error),
    UpstreamStatus(StatusCode),
    Decode(reqwest::Error),
}

impl std::fmt::Display for RoomsClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoomsClientError::Transport(err) => write!(f, "rooms request failed: {err}"),
            RoomsClientError::UpstreamStatus(status) => {
                write!(f, "rooms listing returned {status}")
            }
            RoomsClientError::Decode(err) => write!(f, "invalid rooms listing: {err}"),
        }
    }
}

impl std::error::Error for RoomsClientError {}

// Thin reqwest client for the room listing next to the spectate endpoint.
#[derive(Clone)]
pub struct RoomsClient {
    http: reqwest::Client,
    base_url: String,
}

impl RoomsClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomDescriptor>, RoomsClientError> {
        let url = format!("{}{}", self.base_url, ROOMS_PATH);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(RoomsClientError::Transport)?;

        if !response.status().is_success() {
            return Err(RoomsClientError::UpstreamStatus(response.status()));
        }

        response
            .json::<Vec<RoomDescriptor>>()
            .await
            .map_err(RoomsClientError::Decode)
    }

    /// First listed room, or `None` when the server has no rooms.
    pub async fn first_room(&self) -> Result<Option<RoomDescriptor>, RoomsClientError> {
        Ok(self.list_rooms().await?.into_iter().next())
    }
}
