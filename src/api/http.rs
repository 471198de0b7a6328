use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::models::{
    AuthErrorBody, AuthUrlResponse, CommandRequest, ConfigResponse, FavoriteResponse,
    LastUpdateResponse, PlaybackResponse, QueueResponse, ToggleFavoriteRequest, LAST_UPDATE_FORMAT,
};
use super::{DashboardApi, DashboardConfig, PlayerCommand, Webhook, WebhookStatus};
use crate::error::ApiError;
use crate::spotify::{QueueHead, RemoteStatus};
use crate::weather::WeatherReport;

/// Backend client over plain HTTP.
pub struct HttpApi {
    base_url: String,
    http_client: HttpClient,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .http_client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::network(path, e.to_string()))?;
        Self::decode(path, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = self.post_raw(path, body).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::malformed(path, e.to_string()))
    }

    /// POST and return the body of a 2xx response unparsed.
    async fn post_raw<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<String, ApiError> {
        let response = self
            .http_client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::network(path, e.to_string()))?;
        Self::check(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, ApiError> {
        let body = Self::check(path, response).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::malformed(path, e.to_string()))
    }

    async fn check(path: &str, response: Response) -> Result<String, ApiError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::network(path, e.to_string()))?;

        if status.is_success() {
            return Ok(body);
        }

        let auth_url = if status.as_u16() == 401 {
            serde_json::from_str::<AuthErrorBody>(&body)
                .ok()
                .and_then(|b| b.auth_url)
        } else {
            None
        };
        let excerpt: String = body.chars().take(200).collect();
        tracing::debug!("{} returned {}: {}", path, status, excerpt);
        Err(ApiError::from_status(path, status.as_u16(), auth_url))
    }
}

#[async_trait]
impl DashboardApi for HttpApi {
    async fn playback(&self) -> Result<Option<RemoteStatus>, ApiError> {
        let response: PlaybackResponse = self.get_json("/api/spotify").await?;
        Ok(response.into_status())
    }

    async fn next_in_queue(&self) -> Result<Option<QueueHead>, ApiError> {
        let response: QueueResponse = self.get_json("/api/spotify/queue").await?;
        Ok(response.into_head())
    }

    async fn is_favorite(&self, track_id: &str) -> Result<bool, ApiError> {
        let path = format!("/api/spotify/is-favorite/{}", urlencoding::encode(track_id));
        let response: FavoriteResponse = self.get_json(&path).await?;
        Ok(response.is_favorite)
    }

    async fn toggle_favorite(&self, track_id: &str) -> Result<bool, ApiError> {
        let response: FavoriteResponse = self
            .post_json("/api/spotify/toggle-favorite", &ToggleFavoriteRequest { track_id })
            .await?;
        Ok(response.is_favorite)
    }

    async fn send_command(&self, command: PlayerCommand) -> Result<(), ApiError> {
        // The body varies by backend version; only the status matters
        self.post_raw(
            "/api/spotify/command",
            &CommandRequest {
                command: command.as_str(),
            },
        )
        .await?;
        Ok(())
    }

    async fn auth_url(&self) -> Result<String, ApiError> {
        let response: AuthUrlResponse = self.get_json("/api/spotify/auth-url").await?;
        Ok(response.auth_url)
    }

    async fn webhook(&self, hook: Webhook) -> Result<WebhookStatus, ApiError> {
        self.get_json(hook.path()).await
    }

    async fn weather(&self) -> Result<WeatherReport, ApiError> {
        self.get_json("/api/weather").await
    }

    async fn dashboard_config(&self) -> Result<DashboardConfig, ApiError> {
        let response: ConfigResponse = self.get_json("/api/config").await?;
        Ok(response.into())
    }

    async fn last_update(&self) -> Result<Option<NaiveDateTime>, ApiError> {
        const PATH: &str = "/api/last-update";
        let response: LastUpdateResponse = match self.get_json(PATH).await {
            Ok(response) => response,
            // 404 until the backend has recorded its first weather update
            Err(ApiError::NetworkFailure {
                status: Some(404), ..
            }) => return Ok(None),
            Err(e) => return Err(e),
        };
        NaiveDateTime::parse_from_str(&response.last_update, LAST_UPDATE_FORMAT)
            .map(Some)
            .map_err(|e| ApiError::malformed(PATH, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let api = HttpApi::new("http://pi.local:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url(), "http://pi.local:8000");
        assert_eq!(api.url("/api/spotify"), "http://pi.local:8000/api/spotify");
    }
}
