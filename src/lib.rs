//! Story deck generation: turn a short idea into a deck (title, logline,
//! synopsis, beats, storyboard frames), then edit, save, share and export it.

pub mod api;
pub mod config;
pub mod deck;
pub mod error;
pub mod export;
pub mod host;
pub mod share;
pub mod studio;

pub use api::{GenerationClient, GenerationService};
pub use config::Config;
pub use deck::{fallback_deck, Beat, Deck, DeckField, StoryboardFrame};
pub use error::{DecodeError, RemoteError, Result, StorageError, StudioError};
pub use studio::{DeckRequest, ImageRequest, Studio};
