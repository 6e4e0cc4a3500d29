//! The studio owns everything the user works on: the working deck, the
//! selected style, the saved deck collection and the status line.
//!
//! All mutation goes through [`Studio`]; front-ends only read its state
//! and call its operations.

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crate::api::GenerationService;
use crate::deck::{fallback_deck, Deck, DeckField, StoryboardFrame};
use crate::error::{RemoteError, Result, StorageError, StudioError};
use crate::host::KeyValueStore;
use crate::share;

/// Storage slot holding the saved deck collection.
pub const SAVED_DECKS_SLOT: &str = "deckforge.savedDecks";

pub struct Studio<S> {
    store: S,
    deck: Option<Deck>,
    style: String,
    saved: Vec<Deck>,
    generating: bool,
    generating_images: bool,
    status: String,
    // bumped whenever the working deck is swapped out
    revision: u64,
}

/// An outstanding deck request, from [`Studio::begin_generate`].
#[derive(Debug, Clone)]
pub struct DeckRequest {
    pub idea: String,
    pub style: String,
    revision: u64,
}

/// An outstanding image request, from [`Studio::begin_images`].
#[derive(Debug, Clone)]
pub struct ImageRequest {
    /// Frames as they were when the request started
    pub frames: Vec<StoryboardFrame>,
    pub style: String,
    revision: u64,
}

fn same_frames(current: &[StoryboardFrame], returned: &[StoryboardFrame]) -> bool {
    current.len() == returned.len()
        && current.iter().zip(returned).all(|(a, b)| a.name == b.name)
}

impl<S: KeyValueStore> Studio<S> {
    /// Creates a studio and loads the saved collection from `store`.
    ///
    /// Unreadable or malformed stored data starts an empty collection.
    pub fn hydrate(store: S, style: impl Into<String>) -> Self {
        let saved = match store.get(SAVED_DECKS_SLOT) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Deck>>(&raw) {
                Ok(decks) => decks,
                Err(e) => {
                    warn!("Ignoring malformed saved decks: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read saved decks: {}", e);
                Vec::new()
            }
        };

        info!("Loaded {} saved decks", saved.len());

        Self {
            store,
            deck: None,
            style: style.into(),
            saved,
            generating: false,
            generating_images: false,
            status: String::new(),
            revision: 0,
        }
    }

    pub fn deck(&self) -> Option<&Deck> {
        self.deck.as_ref()
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn set_style(&mut self, style: impl Into<String>) {
        self.style = style.into();
    }

    pub fn saved(&self) -> &[Deck] {
        &self.saved
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn is_generating_images(&self) -> bool {
        self.generating_images
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clear(&mut self) {
        self.replace_deck(None);
        self.status.clear();
    }

    fn replace_deck(&mut self, deck: Option<Deck>) {
        self.deck = deck;
        self.revision += 1;
    }

    /// Starts a deck generation for `idea`: clears the working deck and
    /// raises the generating flag.
    ///
    /// The returned request carries what the service needs; hand its
    /// outcome to [`Studio::finish_generate`].
    pub fn begin_generate(&mut self, idea: &str) -> Result<DeckRequest> {
        let idea = idea.trim();
        if idea.is_empty() {
            self.status = "Enter an idea first.".to_string();
            return Err(StudioError::EmptyIdea);
        }

        self.replace_deck(None);
        self.generating = true;
        self.status = "Generating deck...".to_string();

        Ok(DeckRequest {
            idea: idea.to_string(),
            style: self.style.clone(),
            revision: self.revision,
        })
    }

    /// Applies the outcome of a deck request, substituting the local
    /// fallback deck when the service failed.
    ///
    /// If another deck was opened while the request was out, the result is
    /// dropped and [`StudioError::StaleResult`] returned.
    pub fn finish_generate(
        &mut self,
        request: DeckRequest,
        result: std::result::Result<Deck, RemoteError>,
    ) -> Result<()> {
        self.generating = false;

        if request.revision != self.revision {
            warn!("Dropping generated deck for '{}': working deck changed", request.idea);
            return Err(StudioError::StaleResult);
        }

        match result {
            Ok(deck) => {
                self.status = format!("Generated \"{}\".", deck.title);
                self.replace_deck(Some(deck));
            }
            Err(e) => {
                warn!("Deck generation failed, using fallback: {}", e);
                self.replace_deck(fallback_deck(&request.idea, &request.style));
                self.status =
                    "Generation service unavailable; showing a locally drafted deck.".to_string();
            }
        }

        Ok(())
    }

    /// Generates a deck for `idea` in one call. See [`Studio::begin_generate`]
    /// for driving the request without holding the studio.
    pub async fn generate<G>(&mut self, service: &G, idea: &str) -> Result<()>
    where
        G: GenerationService + ?Sized,
    {
        let request = self.begin_generate(idea)?;
        let result = service.request_deck(&request.idea, &request.style).await;
        self.finish_generate(request, result)
    }

    /// Starts an image request for the working deck's frames and raises the
    /// image flag. Returns `None` when there is no working deck.
    pub fn begin_images(&mut self) -> Option<ImageRequest> {
        let Some(deck) = &self.deck else {
            self.status = "Generate a deck before requesting images.".to_string();
            return None;
        };

        let frames = deck.storyboard_frames.clone();
        self.generating_images = true;
        self.status = "Generating storyboard images...".to_string();

        Some(ImageRequest {
            frames,
            style: self.style.clone(),
            revision: self.revision,
        })
    }

    /// Applies the outcome of an image request. Returns how many frames
    /// have an image afterwards.
    ///
    /// Only image URLs are taken from the result, so description edits made
    /// while the request was out are kept. A result for a deck that has
    /// since been replaced, or whose frame names no longer line up, is
    /// dropped with [`StudioError::StaleResult`]. On service failure the
    /// frames stay as they were and the error is returned after the status
    /// line is updated.
    pub fn finish_images(
        &mut self,
        request: ImageRequest,
        result: std::result::Result<Vec<StoryboardFrame>, RemoteError>,
    ) -> Result<usize> {
        self.generating_images = false;

        let frames = match result {
            Ok(frames) => frames,
            Err(e) => {
                warn!("Image generation failed: {}", e);
                self.status = format!("Image generation failed: {}", e);
                return Err(e.into());
            }
        };

        let current = request.revision == self.revision;
        let deck = match self.deck.as_mut() {
            Some(deck) if current && same_frames(&deck.storyboard_frames, &frames) => deck,
            _ => {
                warn!("Dropping {} storyboard images: working deck changed", frames.len());
                self.status = "Images arrived for a deck that is no longer open.".to_string();
                return Err(StudioError::StaleResult);
            }
        };

        for (frame, result) in deck.storyboard_frames.iter_mut().zip(frames) {
            if result.image_url.is_some() {
                frame.image_url = result.image_url;
            }
        }

        let count = deck.images_generated();
        self.status = format!(
            "Images ready for {} of {} frames.",
            count,
            deck.storyboard_frames.len()
        );
        Ok(count)
    }

    /// Requests storyboard images for the working deck in one call.
    pub async fn generate_images<G>(&mut self, service: &G) -> Result<usize>
    where
        G: GenerationService + ?Sized,
    {
        let request = self.begin_images().ok_or(StudioError::NoDeck)?;
        let result = service.request_images(&request.frames, &request.style).await;
        self.finish_images(request, result)
    }

    /// Replaces a top-level text field. Does nothing without a working deck.
    pub fn set_field(&mut self, field: DeckField, value: impl Into<String>) {
        if let Some(deck) = self.deck.as_mut() {
            debug!("Editing {} of '{}'", field, deck.title);
            deck.set_field(field, value.into());
        }
    }

    pub fn set_beat_text(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        let Some(deck) = self.deck.as_mut() else {
            return Ok(());
        };
        let len = deck.beats.len();
        let beat = deck
            .beats
            .get_mut(index)
            .ok_or(StudioError::Index { index, len })?;
        beat.text = value.into();
        Ok(())
    }

    pub fn set_frame_description(&mut self, index: usize, value: impl Into<String>) -> Result<()> {
        let Some(deck) = self.deck.as_mut() else {
            return Ok(());
        };
        let len = deck.storyboard_frames.len();
        let frame = deck
            .storyboard_frames
            .get_mut(index)
            .ok_or(StudioError::Index { index, len })?;
        frame.description = value.into();
        Ok(())
    }

    /// Appends a snapshot of the working deck and writes the whole
    /// collection to storage.
    ///
    /// The snapshot is kept in memory even when storage rejects the write;
    /// the storage error is still returned.
    pub fn save(&mut self) -> Result<()> {
        let Some(deck) = &self.deck else {
            self.status = "Nothing to save yet.".to_string();
            return Ok(());
        };

        // savedAt must strictly increase across the collection
        let mut saved_at = Utc::now();
        if let Some(last) = self.saved.last().and_then(|d| d.saved_at) {
            if saved_at <= last {
                saved_at = last + Duration::milliseconds(1);
            }
        }

        let mut snapshot = deck.clone();
        snapshot.saved_at = Some(saved_at);
        snapshot.style = Some(self.style.clone());
        info!("Saving deck '{}' ({} saved)", snapshot.title, self.saved.len() + 1);
        self.saved.push(snapshot);

        match self.persist() {
            Ok(()) => {
                self.status = "Deck saved.".to_string();
                Ok(())
            }
            Err(e) => {
                warn!("Failed to persist saved decks: {}", e);
                self.status = format!("Deck saved for this session only: {}", e);
                Err(e.into())
            }
        }
    }

    fn persist(&mut self) -> std::result::Result<(), StorageError> {
        let raw = serde_json::to_string(&self.saved)?;
        self.store.set(SAVED_DECKS_SLOT, &raw)
    }

    /// Makes a copy of saved deck `index` the working deck and selects its
    /// style.
    pub fn load(&mut self, index: usize) -> Result<()> {
        let deck = self.saved.get(index).cloned().ok_or(StudioError::Index {
            index,
            len: self.saved.len(),
        })?;

        if let Some(style) = &deck.style {
            self.style = style.clone();
        }
        self.status = format!("Loaded \"{}\".", deck.title);
        self.replace_deck(Some(deck));
        Ok(())
    }

    /// Opens a deck from a share token. A bad token is treated as no shared
    /// deck at all; returns whether a deck was opened.
    pub fn open_shared(&mut self, token: &str) -> bool {
        match share::decode(token) {
            Ok(deck) => {
                if let Some(style) = &deck.style {
                    self.style = style.clone();
                }
                self.status = format!("Opened shared deck \"{}\".", deck.title);
                self.replace_deck(Some(deck));
                true
            }
            Err(e) => {
                warn!("Ignoring unusable share token: {}", e);
                false
            }
        }
    }

    /// Startup hook: opens the shared deck carried by `url`, if any.
    pub fn open_shared_url(&mut self, url: &str) -> bool {
        match share::token_from_url(url) {
            Some(token) => self.open_shared(token),
            None => false,
        }
    }

    pub fn share_link(&self, base_url: &str) -> Option<String> {
        self.deck
            .as_ref()
            .map(|deck| share::share_url(base_url, deck))
    }
}
