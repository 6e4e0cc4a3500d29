use serde_json::Value;

use crate::deck::StoryboardFrame;

/// Keys the result list may live under, in priority order.
const RESULT_KEYS: [&str; 3] = ["frames", "images", "data"];

/// Keys a result element may carry a URL under, in priority order.
const URL_KEYS: [&str; 3] = ["imageUrl", "url", "image"];

const BASE64_KEY: &str = "b64_json";

/// Matches an image generation response against `frames` by position.
///
/// Frames without a usable result (missing element, or an element with
/// no recognised URL field) come back unchanged.
pub fn apply_image_results(frames: &[StoryboardFrame], body: &Value) -> Vec<StoryboardFrame> {
    let results = result_list(body);

    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| {
            let mut frame = frame.clone();
            if let Some(url) = results.get(i).and_then(image_url) {
                frame.image_url = Some(url);
            }
            frame
        })
        .collect()
}

fn result_list(body: &Value) -> &[Value] {
    RESULT_KEYS
        .iter()
        .find_map(|key| body.get(*key).filter(|value| !value.is_null()))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn image_url(result: &Value) -> Option<String> {
    if let Some(url) = URL_KEYS
        .iter()
        .find_map(|key| non_empty_str(result, key))
    {
        return Some(url.to_string());
    }

    non_empty_str(result, BASE64_KEY).map(|payload| format!("data:image/png;base64,{}", payload))
}

fn non_empty_str<'a>(result: &'a Value, key: &str) -> Option<&'a str> {
    result
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}
