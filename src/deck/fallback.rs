use super::{Beat, Deck, StoryboardFrame};

const PLACEHOLDER_TITLE: &str = "Untitled Project";
const TITLE_WORDS: usize = 4;

pub const BEAT_LABELS: [&str; 3] = ["Act I – Setup", "Act II – Conflict", "Act III – Resolution"];

pub const FRAME_NAMES: [&str; 4] = [
    "Frame 1 – Opening Image",
    "Frame 2 – Inciting Moment",
    "Frame 3 – Turning Point",
    "Frame 4 – Final Image",
];

/// Builds a deck locally from the raw idea when the generation service is
/// unavailable. Returns `None` if the idea is blank.
pub fn fallback_deck(idea: &str, style: &str) -> Option<Deck> {
    let idea = idea.trim();
    if idea.is_empty() {
        return None;
    }

    let words: Vec<&str> = idea.split_whitespace().take(TITLE_WORDS).collect();
    let title = if words.is_empty() {
        PLACEHOLDER_TITLE.to_string()
    } else {
        format!("{}: {}", style, words.join(" "))
    };

    let logline = format!(
        "A {} project about {}, told through one unforgettable turn of events.",
        style,
        idea.to_lowercase()
    );

    let synopsis = format!(
        "Starting from the idea \"{}\", this {} piece introduces a world under pressure, \
         pushes its characters into a conflict they cannot avoid, and resolves it in a \
         way that leaves the audience with a lasting image.",
        idea, style
    );

    let beats = vec![
        Beat::new(
            BEAT_LABELS[0],
            format!(
                "We establish the world of \"{}\" and the people living in it, in a {} tone.",
                idea, style
            ),
        ),
        Beat::new(
            BEAT_LABELS[1],
            format!(
                "The situation around \"{}\" escalates and forces a choice with real stakes.",
                idea
            ),
        ),
        Beat::new(
            BEAT_LABELS[2],
            format!(
                "The conflict resolves and the {} story lands its final emotional note.",
                style
            ),
        ),
    ];

    // Only the first and last frames depend on the input.
    let storyboard_frames = vec![
        StoryboardFrame::new(
            FRAME_NAMES[0],
            format!(
                "Wide establishing shot that sets up \"{}\" in a {} visual language.",
                idea, style
            ),
        ),
        StoryboardFrame::new(
            FRAME_NAMES[1],
            "Medium shot of the main character as the inciting moment breaks the routine.",
        ),
        StoryboardFrame::new(
            FRAME_NAMES[2],
            "Close-up at the turning point, the decision visible on the character's face.",
        ),
        StoryboardFrame::new(
            FRAME_NAMES[3],
            format!(
                "Closing image that echoes the opening of \"{}\" with a changed {} mood.",
                idea, style
            ),
        ),
    ];

    Some(Deck {
        title,
        logline,
        synopsis,
        beats,
        storyboard_frames,
        style: Some(style.to_string()),
        saved_at: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_idea_produces_no_deck() {
        assert_eq!(fallback_deck("", "Film / Narrative"), None);
        assert_eq!(fallback_deck("   \n\t ", "Film / Narrative"), None);
    }

    #[test]
    fn always_three_beats_and_four_frames() {
        for idea in ["x", "a lighthouse keeper finds a map", "  padded idea  "] {
            for style in ["Film / Narrative", "Music Video", ""] {
                let deck = fallback_deck(idea, style).unwrap();

                let labels: Vec<&str> = deck.beats.iter().map(|b| b.label.as_str()).collect();
                let names: Vec<&str> = deck
                    .storyboard_frames
                    .iter()
                    .map(|f| f.name.as_str())
                    .collect();
                assert_eq!(labels, BEAT_LABELS);
                assert_eq!(names, FRAME_NAMES);
                assert!(deck.storyboard_frames.iter().all(|f| f.image_url.is_none()));
                assert!(deck.validate().is_ok());
            }
        }
    }

    #[test]
    fn title_uses_first_four_words_with_style_prefix() {
        let deck = fallback_deck("  A lighthouse   keeper finds a map ", "Documentary").unwrap();

        assert_eq!(deck.title, "Documentary: A lighthouse keeper finds");
        assert_eq!(deck.style.as_deref(), Some("Documentary"));
        assert_eq!(deck.saved_at, None);
    }

    #[test]
    fn logline_lowercases_the_idea() {
        let deck = fallback_deck("Robot Learns To Paint", "Animation").unwrap();

        assert!(deck.logline.contains("robot learns to paint"));
        assert!(deck.synopsis.contains("Robot Learns To Paint"));
    }

    #[test]
    fn middle_frames_do_not_depend_on_input() {
        let a = fallback_deck("first idea", "Animation").unwrap();
        let b = fallback_deck("second idea", "Documentary").unwrap();

        assert_ne!(a.storyboard_frames[0], b.storyboard_frames[0]);
        assert_eq!(a.storyboard_frames[1], b.storyboard_frames[1]);
        assert_eq!(a.storyboard_frames[2], b.storyboard_frames[2]);
        assert_ne!(a.storyboard_frames[3], b.storyboard_frames[3]);
    }

    #[test]
    fn deterministic_for_same_input() {
        assert_eq!(
            fallback_deck("same idea", "Music Video"),
            fallback_deck("same idea", "Music Video")
        );
    }
}
