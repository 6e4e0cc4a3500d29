mod client;
pub mod images;

use async_trait::async_trait;

use crate::deck::{Deck, StoryboardFrame};
use crate::error::RemoteError;

pub use client::GenerationClient;

/// The remote generation service, as seen by the studio.
#[async_trait]
pub trait GenerationService {
    /// Requests a full deck for `idea` in the given style.
    async fn request_deck(&self, idea: &str, style: &str) -> Result<Deck, RemoteError>;

    /// Requests images for `frames` and returns a copy of them with the
    /// matched image URLs filled in.
    async fn request_images(
        &self,
        frames: &[StoryboardFrame],
        style: &str,
    ) -> Result<Vec<StoryboardFrame>, RemoteError>;
}
