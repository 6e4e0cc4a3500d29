use tracing::info;

use crate::deck::Deck;
use crate::error::Result;
use crate::host::Printer;

/// Renders a deck as a printable Markdown document.
pub fn render_deck(deck: &Deck) -> String {
    let mut doc = format!("# {}\n\n", deck.title);
    if let Some(style) = &deck.style {
        doc.push_str(&format!("_{}_\n\n", style));
    }
    doc.push_str(&format!("> {}\n\n", deck.logline));
    doc.push_str(&format!("## Synopsis\n\n{}\n\n", deck.synopsis));

    doc.push_str("## Beats\n\n");
    for beat in &deck.beats {
        doc.push_str(&format!("**{}**: {}\n\n", beat.label, beat.text));
    }

    doc.push_str("## Storyboard\n\n");
    for frame in &deck.storyboard_frames {
        doc.push_str(&format!("### {}\n\n{}\n\n", frame.name, frame.description));
        if let Some(url) = &frame.image_url {
            doc.push_str(&format!("![{}]({})\n\n", frame.name, url));
        }
    }

    if let Some(saved_at) = deck.saved_at {
        doc.push_str(&format!("---\nSaved {}\n", saved_at.to_rfc3339()));
    }

    doc
}

/// Renders `deck` and sends it to `printer`.
pub fn export_deck(deck: &Deck, printer: &mut dyn Printer) -> Result<()> {
    info!("Exporting deck '{}'", deck.title);
    let document = render_deck(deck);
    printer.print(&deck.title, &document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::fallback_deck;
    use crate::host::FilePrinter;

    #[test]
    fn render_includes_every_section() {
        let mut deck = fallback_deck("a lighthouse keeper finds a map", "Documentary").unwrap();
        deck.storyboard_frames[2].image_url = Some("http://x/3.png".to_string());

        let doc = render_deck(&deck);

        assert!(doc.starts_with("# Documentary: a lighthouse keeper finds\n"));
        assert!(doc.contains("_Documentary_"));
        assert!(doc.contains("## Synopsis"));
        for beat in &deck.beats {
            assert!(doc.contains(&beat.label));
        }
        for frame in &deck.storyboard_frames {
            assert!(doc.contains(&format!("### {}", frame.name)));
        }
        assert!(doc.contains("![Frame 3 – Turning Point](http://x/3.png)"));
        assert!(!doc.contains("Saved "));
    }

    #[test]
    fn render_lays_out_sections_in_order() {
        let mut deck = fallback_deck("robot painter", "Animation").unwrap();
        deck.saved_at = Some(chrono::Utc::now());

        let doc = render_deck(&deck);

        let synopsis = doc.find("## Synopsis").unwrap();
        let beats = doc.find("## Beats").unwrap();
        let storyboard = doc.find("## Storyboard").unwrap();
        let footer = doc.find("---\nSaved ").unwrap();
        assert!(synopsis < beats && beats < storyboard && storyboard < footer);
        assert!(doc.contains(&format!("**{}**: {}\n\n", deck.beats[0].label, deck.beats[0].text)));
        assert!(doc.ends_with('\n'));
    }

    #[test]
    fn export_goes_through_printer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.md");
        let deck = fallback_deck("robot painter", "Animation").unwrap();

        export_deck(&deck, &mut FilePrinter::new(&path)).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), render_deck(&deck));
    }
}
