pub mod fallback;

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use fallback::fallback_deck;

/// Styles offered by the style picker. Anything else is a custom style.
pub const PROJECT_STYLES: &[&str] = &[
    "Film / Narrative",
    "Commercial / Brand",
    "Music Video",
    "Documentary",
    "Animation",
    "Game / Interactive",
];

pub const DEFAULT_STYLE: &str = "Film / Narrative";

pub fn is_known_style(style: &str) -> bool {
    PROJECT_STYLES.contains(&style)
}

/// One structural story point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beat {
    /// Fixed label, unique within the deck
    pub label: String,
    /// Editable beat text
    pub text: String,
}

impl Beat {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// One storyboard panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardFrame {
    /// Fixed frame name, unique within the deck
    pub name: String,
    /// Editable shot description, also the image prompt
    pub description: String,
    /// Set once image generation succeeds for this frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl StoryboardFrame {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image_url: None,
        }
    }
}

/// A generated creative deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    /// Short project title
    pub title: String,
    /// One-sentence hook
    pub logline: String,
    /// Paragraph summary
    pub synopsis: String,
    /// Narrative beats, order fixed at creation
    pub beats: Vec<Beat>,
    /// Storyboard frames, order fixed at creation
    pub storyboard_frames: Vec<StoryboardFrame>,
    /// Project style selected at generation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Set only on saved snapshots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

/// Top-level scalar fields that can be edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckField {
    Title,
    Logline,
    Synopsis,
}

impl fmt::Display for DeckField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeckField::Title => "title",
            DeckField::Logline => "logline",
            DeckField::Synopsis => "synopsis",
        };
        f.write_str(name)
    }
}

impl Deck {
    /// Checks that beat labels and frame names are unique.
    ///
    /// Labels and names are the keys edits are addressed by, so a deck
    /// with duplicates is rejected wherever one enters from outside.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut labels = HashSet::new();
        for beat in &self.beats {
            if !labels.insert(beat.label.as_str()) {
                return Err(format!("duplicate beat label '{}'", beat.label));
            }
        }

        let mut names = HashSet::new();
        for frame in &self.storyboard_frames {
            if !names.insert(frame.name.as_str()) {
                return Err(format!("duplicate frame name '{}'", frame.name));
            }
        }

        Ok(())
    }

    pub fn field(&self, field: DeckField) -> &str {
        match field {
            DeckField::Title => &self.title,
            DeckField::Logline => &self.logline,
            DeckField::Synopsis => &self.synopsis,
        }
    }

    pub fn set_field(&mut self, field: DeckField, value: String) {
        match field {
            DeckField::Title => self.title = value,
            DeckField::Logline => self.logline = value,
            DeckField::Synopsis => self.synopsis = value,
        }
    }

    pub fn images_generated(&self) -> usize {
        self.storyboard_frames
            .iter()
            .filter(|frame| frame.image_url.is_some())
            .count()
    }
}
