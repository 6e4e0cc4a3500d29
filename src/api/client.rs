use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, info};

use super::images::apply_image_results;
use super::GenerationService;
use crate::deck::{Deck, StoryboardFrame};
use crate::error::RemoteError;

/// HTTP client for the deck and image generation endpoints.
///
/// No request timeout is configured: a hung request stays pending until
/// the transport gives up.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    client: Client,
    deck_url: String,
    image_url: String,
}

impl GenerationClient {
    pub fn new(deck_url: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), deck_url, image_url)
    }

    pub fn with_client(
        client: Client,
        deck_url: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            deck_url: deck_url.into(),
            image_url: image_url.into(),
        }
    }

    pub fn deck_url(&self) -> &str {
        &self.deck_url
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    async fn post(&self, url: &str, body: &serde_json::Value) -> Result<String, RemoteError> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RemoteError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl GenerationService for GenerationClient {
    async fn request_deck(&self, idea: &str, style: &str) -> Result<Deck, RemoteError> {
        info!("Requesting deck from {}", self.deck_url);

        let request_body = json!({
            "idea": idea,
            "style": style,
        });

        let text = self.post(&self.deck_url, &request_body).await?;

        let mut deck: Deck = serde_json::from_str(&text)
            .map_err(|e| RemoteError::InvalidResponse(format!("Failed to parse deck JSON: {}", e)))?;
        deck.validate().map_err(RemoteError::InvalidResponse)?;

        if deck.style.is_none() {
            deck.style = Some(style.to_string());
        }

        info!(
            "Received deck '{}' with {} beats and {} frames",
            deck.title,
            deck.beats.len(),
            deck.storyboard_frames.len()
        );
        Ok(deck)
    }

    async fn request_images(
        &self,
        frames: &[StoryboardFrame],
        style: &str,
    ) -> Result<Vec<StoryboardFrame>, RemoteError> {
        info!("Requesting images for {} frames from {}", frames.len(), self.image_url);

        let request_body = json!({
            "frames": frames,
            "style": style,
        });

        let text = self.post(&self.image_url, &request_body).await?;
        debug!("Image response: {} bytes", text.len());

        let body: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            RemoteError::InvalidResponse(format!("Failed to parse image response: {}", e))
        })?;

        Ok(apply_image_results(frames, &body))
    }
}
