//! End-to-end flows through the HTTP client, the studio and file storage.
//!
//! Each test stands up a one-shot local HTTP responder so the real
//! [`GenerationClient`] is exercised without the hosted service.

use deckforge::deck::fallback::{BEAT_LABELS, FRAME_NAMES};
use deckforge::host::FileStore;
use deckforge::{fallback_deck, GenerationClient, GenerationService, RemoteError, StoryboardFrame, Studio};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const STYLE: &str = "Film / Narrative";

// ---------------------------------------------------------------------------
// One-shot HTTP responder
// ---------------------------------------------------------------------------

/// Serves exactly one request with `status` and `body`; the join handle
/// yields the raw request text.
async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (format!("http://{}/api", addr), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn client_for(url: &str) -> GenerationClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    GenerationClient::with_client(http, url, url)
}

const DECK_BODY: &str = r#"{
    "title": "Moon Heist",
    "logline": "A crew robs the lunar bank.",
    "synopsis": "Low gravity, high stakes.",
    "beats": [
        {"label": "Act I – Setup", "text": "The crew assembles."},
        {"label": "Act II – Conflict", "text": "The vault fights back."},
        {"label": "Act III – Resolution", "text": "They float away rich."}
    ],
    "storyboardFrames": [
        {"name": "Frame 1", "description": "Earthrise over the bank."},
        {"name": "Frame 2", "description": "Helmets in the airlock."}
    ]
}"#;

// ---------------------------------------------------------------------------
// Remote client
// ---------------------------------------------------------------------------

#[tokio::test]
async fn request_deck_posts_idea_and_style() {
    let (url, server) = serve_once(200, DECK_BODY).await;

    let deck = client_for(&url)
        .request_deck("a heist on the moon", STYLE)
        .await
        .unwrap();
    let request = server.await.unwrap();

    assert!(request.starts_with("POST /api"));
    assert!(request.contains(r#""idea":"a heist on the moon""#));
    assert!(request.contains(r#""style":"Film / Narrative""#));
    assert_eq!(deck.title, "Moon Heist");
    assert_eq!(deck.beats.len(), 3);
    // style filled in when the service leaves it out
    assert_eq!(deck.style.as_deref(), Some(STYLE));
}

#[tokio::test]
async fn request_deck_non_success_status_is_api_error() {
    let (url, _server) = serve_once(500, r#"{"error":"boom"}"#).await;

    let result = client_for(&url).request_deck("idea", STYLE).await;

    match result {
        Err(RemoteError::ApiError { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn request_deck_rejects_unusable_body() {
    let (url, _server) = serve_once(200, r#"{"title": "only a title"}"#).await;

    let result = client_for(&url).request_deck("idea", STYLE).await;

    assert!(matches!(result, Err(RemoteError::InvalidResponse(_))));
}

const DUPLICATE_LABEL_BODY: &str = r#"{
    "title": "Moon Heist",
    "logline": "A crew robs the lunar bank.",
    "synopsis": "Low gravity, high stakes.",
    "beats": [
        {"label": "Act I", "text": "The crew assembles."},
        {"label": "Act I", "text": "The vault fights back."}
    ],
    "storyboardFrames": [
        {"name": "Frame 1", "description": "Earthrise over the bank."}
    ]
}"#;

#[tokio::test]
async fn request_deck_rejects_duplicate_beat_labels() {
    let (url, _server) = serve_once(200, DUPLICATE_LABEL_BODY).await;

    let result = client_for(&url).request_deck("idea", STYLE).await;

    match result {
        Err(RemoteError::InvalidResponse(reason)) => assert!(reason.contains("Act I")),
        other => panic!("expected InvalidResponse, got {:?}", other),
    }
}

#[tokio::test]
async fn duplicate_beat_labels_fall_back_to_local_deck() {
    let (url, _server) = serve_once(200, DUPLICATE_LABEL_BODY).await;
    let client = client_for(&url);
    let dir = tempfile::tempdir().unwrap();

    let mut studio = Studio::hydrate(FileStore::new(dir.path()), STYLE);
    studio.generate(&client, "a heist on the moon").await.unwrap();

    assert_eq!(studio.deck(), fallback_deck("a heist on the moon", STYLE).as_ref());
    assert!(studio.status().contains("unavailable"));
}

#[tokio::test]
async fn request_images_matches_results_by_position() {
    let (url, server) = serve_once(
        200,
        r#"{"data": [{"url": "http://x/1.png"}, {"b64_json": "QUJD"}]}"#,
    )
    .await;
    let frames: Vec<StoryboardFrame> = fallback_deck("a heist", STYLE)
        .unwrap()
        .storyboard_frames;

    let output = client_for(&url).request_images(&frames, STYLE).await.unwrap();
    let request = server.await.unwrap();

    assert!(request.contains(r#""frames":[{"#));
    assert_eq!(output.len(), 4);
    assert_eq!(output[0].image_url.as_deref(), Some("http://x/1.png"));
    assert_eq!(output[1].image_url.as_deref(), Some("data:image/png;base64,QUJD"));
    assert_eq!(output[2], frames[2]);
    assert_eq!(output[3], frames[3]);
}

// ---------------------------------------------------------------------------
// Studio over real storage
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_generation_falls_back_and_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let (url, _server) = serve_once(503, "unavailable").await;
    let client = client_for(&url);

    let mut studio = Studio::hydrate(FileStore::new(dir.path()), STYLE);
    studio.generate(&client, "a lighthouse keeper finds a map").await.unwrap();

    let deck = studio.deck().unwrap().clone();
    let labels: Vec<&str> = deck.beats.iter().map(|b| b.label.as_str()).collect();
    let names: Vec<&str> = deck.storyboard_frames.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(labels, BEAT_LABELS);
    assert_eq!(names, FRAME_NAMES);

    studio.set_beat_text(1, "The map is a forgery.").unwrap();
    studio.save().unwrap();

    let reopened = Studio::hydrate(FileStore::new(dir.path()), STYLE);
    assert_eq!(reopened.saved().len(), 1);
    assert_eq!(reopened.saved()[0].beats[1].text, "The map is a forgery.");
    assert_eq!(reopened.saved()[0].beats[0], deck.beats[0]);
    assert!(reopened.saved()[0].saved_at.is_some());
}

#[tokio::test]
async fn image_failure_leaves_deck_without_images() {
    let (url, _server) = serve_once(502, "bad gateway").await;
    let client = client_for(&url);
    let dir = tempfile::tempdir().unwrap();

    let mut studio = Studio::hydrate(FileStore::new(dir.path()), STYLE);
    assert!(studio.open_shared(&deckforge::share::encode(
        &fallback_deck("a heist", STYLE).unwrap()
    )));

    assert!(studio.generate_images(&client).await.is_err());
    assert_eq!(studio.deck().unwrap().images_generated(), 0);
    assert!(studio.status().contains("Image generation failed"));
}
