use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use deckforge::deck::{is_known_style, PROJECT_STYLES};
use deckforge::export::{export_deck, render_deck};
use deckforge::host::{
    CommandPrinter, FilePrinter, FileStore, LineDictation, Printer, SpeechInput,
};
use deckforge::{share, Config, DeckField, GenerationClient, Studio};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "deckforge")]
#[command(about = "Generate, edit, save and share story decks from a short idea", long_about = None)]
struct Args {
    /// Directory holding saved decks
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Deck generation endpoint
    #[arg(long, global = true)]
    deck_api_url: Option<String>,

    /// Image generation endpoint
    #[arg(long, global = true)]
    image_api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new deck from an idea
    Generate {
        /// Idea text
        #[arg(short, long)]
        idea: Option<String>,

        /// Read the idea from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Read one dictated line from stdin
        #[arg(long)]
        dictate: bool,

        /// Project style
        #[arg(short, long)]
        style: Option<String>,

        /// Also generate storyboard images
        #[arg(long)]
        images: bool,

        /// Save the result
        #[arg(long)]
        save: bool,
    },
    /// List saved decks
    List,
    /// Print a saved deck
    Show { index: usize },
    /// Edit a saved deck and save the result as a new entry
    Edit {
        index: usize,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        logline: Option<String>,

        #[arg(long)]
        synopsis: Option<String>,

        /// Replace a beat's text, as INDEX=TEXT
        #[arg(long = "beat", value_parser = parse_indexed)]
        beats: Vec<(usize, String)>,

        /// Replace a frame's description, as INDEX=TEXT
        #[arg(long = "frame", value_parser = parse_indexed)]
        frames: Vec<(usize, String)>,
    },
    /// Generate storyboard images for a saved deck and save the result
    Images { index: usize },
    /// Print a share link for a saved deck
    Share { index: usize },
    /// Open a shared deck from a link or token
    Open {
        link: String,

        /// Save the opened deck
        #[arg(long)]
        save: bool,
    },
    /// Export a saved deck as a printable document
    Export {
        index: usize,

        /// Output file
        #[arg(short, long, default_value = "deck.md")]
        output: PathBuf,

        /// Send to the host print command instead of a file
        #[arg(long)]
        print: bool,
    },
    /// List the built-in project styles
    Styles,
}

fn parse_indexed(raw: &str) -> Result<(usize, String), String> {
    let (index, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=TEXT, got '{}'", raw))?;
    let index = index
        .trim()
        .parse()
        .map_err(|e| format!("invalid index '{}': {}", index, e))?;
    Ok((index, text.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(url) = args.deck_api_url {
        config.deck_api_url = url;
    }
    if let Some(url) = args.image_api_url {
        config.image_api_url = url;
    }

    let store = FileStore::new(&config.data_dir);
    let mut studio = Studio::hydrate(store, config.default_style.clone());
    let client = GenerationClient::new(&config.deck_api_url, &config.image_api_url);
    info!("Deck endpoint: {}", client.deck_url());
    info!("Image endpoint: {}", client.image_url());

    match args.command {
        Command::Generate {
            idea,
            file,
            dictate,
            style,
            images,
            save,
        } => {
            let idea = read_idea(idea, file, dictate).await?;
            if let Some(style) = style {
                if !is_known_style(&style) {
                    warn!("Using custom style '{}'", style);
                }
                studio.set_style(style);
            }

            info!("Input idea length: {} characters", idea.len());
            studio.generate(&client, &idea).await?;
            info!("{}", studio.status());

            if images {
                // failure leaves the deck without images
                if studio.generate_images(&client).await.is_err() {
                    warn!("{}", studio.status());
                } else {
                    info!("{}", studio.status());
                }
            }

            if save {
                save_reporting(&mut studio);
            }

            if let Some(deck) = studio.deck() {
                println!("{}", render_deck(deck));
            }
        }
        Command::List => {
            if studio.saved().is_empty() {
                println!("No saved decks in {}.", studio.store().dir().display());
            }
            for (i, deck) in studio.saved().iter().enumerate() {
                let saved_at = deck
                    .saved_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "{:>3}  {}  [{}]  {}",
                    i,
                    saved_at,
                    deck.style.as_deref().unwrap_or("-"),
                    deck.title
                );
            }
        }
        Command::Show { index } => {
            studio.load(index)?;
            if let Some(deck) = studio.deck() {
                println!("{}", render_deck(deck));
            }
        }
        Command::Edit {
            index,
            title,
            logline,
            synopsis,
            beats,
            frames,
        } => {
            studio.load(index)?;

            for (field, value) in [
                (DeckField::Title, title),
                (DeckField::Logline, logline),
                (DeckField::Synopsis, synopsis),
            ] {
                if let Some(value) = value {
                    studio.set_field(field, value);
                }
            }
            for (i, text) in beats {
                studio.set_beat_text(i, text)?;
            }
            for (i, text) in frames {
                studio.set_frame_description(i, text)?;
            }

            save_reporting(&mut studio);
            println!("Saved as deck {}", studio.saved().len() - 1);
        }
        Command::Images { index } => {
            studio.load(index)?;
            match studio.generate_images(&client).await {
                Ok(_) => {
                    info!("{}", studio.status());
                    save_reporting(&mut studio);
                }
                Err(_) => warn!("{}", studio.status()),
            }
        }
        Command::Share { index } => {
            studio.load(index)?;
            if let Some(link) = studio.share_link(&config.app_url) {
                println!("{}", link);
            }
        }
        Command::Open { link, save } => {
            let opened = if share::token_from_url(&link).is_some() {
                studio.open_shared_url(&link)
            } else {
                studio.open_shared(&link)
            };
            if !opened {
                println!("No shared deck found.");
                return Ok(());
            }

            if save {
                save_reporting(&mut studio);
            }
            if let Some(deck) = studio.deck() {
                println!("{}", render_deck(deck));
            }
        }
        Command::Export {
            index,
            output,
            print,
        } => {
            studio.load(index)?;
            let mut printer: Box<dyn Printer> = if print {
                Box::new(CommandPrinter::new(&config.print_command, &config.data_dir))
            } else {
                Box::new(FilePrinter::new(&output))
            };
            if let Some(deck) = studio.deck() {
                export_deck(deck, printer.as_mut())?;
            }
        }
        Command::Styles => {
            for style in PROJECT_STYLES {
                println!("{}", style);
            }
        }
    }

    Ok(())
}

async fn read_idea(
    idea: Option<String>,
    file: Option<PathBuf>,
    dictate: bool,
) -> anyhow::Result<String> {
    if let Some(text) = idea {
        return Ok(text);
    }

    if let Some(path) = file {
        return tokio::fs::read_to_string(&path)
            .await
            .context(format!("Failed to read file: {}", path.display()));
    }

    if dictate {
        eprintln!("Listening... (type or pipe the dictated idea, then press Enter)");
        let mut speech = LineDictation::new(BufReader::new(std::io::stdin()));
        return match speech.listen()? {
            Some(text) => Ok(text),
            None => bail!("Nothing was heard"),
        };
    }

    bail!("Either --idea, --file or --dictate must be provided")
}

/// Saves the working deck; a storage failure is reported but the run goes on.
fn save_reporting(studio: &mut Studio<FileStore>) {
    match studio.save() {
        Ok(()) => info!("{}", studio.status()),
        Err(e) => warn!("{} ({})", studio.status(), e),
    }
}
