//! YouTube transcript retrieval.
//!
//! Caption tracks are discovered with `yt-dlp --dump-json` and the selected
//! track payload (json3 events) is fetched over HTTP and flattened into plain
//! text for the LLM planner.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::process::Stdio;
use tokio::process::Command;

use crate::VideoGenError;

/// Container for a transcript and metadata
#[derive(Debug, Clone)]
pub struct VideoTranscript {
    pub video_id: String,
    pub title: String,
    pub text: String,
}

/// Extract the 11-character video identifier from a YouTube URL
pub fn extract_video_id(url: &str) -> Result<String> {
    const MARKERS: &[&str] = &["v=", "youtu.be/", "youtube.com/embed/"];

    for marker in MARKERS {
        if let Some(position) = url.find(marker) {
            let candidate: String = url[position + marker.len()..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .take(11)
                .collect();
            if candidate.len() == 11 {
                return Ok(candidate);
            }
        }
    }

    anyhow::bail!(VideoGenError::UnsupportedUrl(format!(
        "Could not determine video id for url: {}",
        url
    )))
}

/// Transcript fetcher backed by yt-dlp
pub struct TranscriptFetcher {
    yt_dlp_path: String,
    client: reqwest::Client,
}

impl TranscriptFetcher {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> Result<bool> {
        let output = Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        Ok(output.map(|out| out.status.success()).unwrap_or(false))
    }

    /// Get video metadata (including caption track listings) using yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<Value> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--no-playlist", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error);
        }

        let json_str = String::from_utf8(output.stdout)?;
        let info: Value = serde_json::from_str(&json_str)?;

        Ok(info)
    }

    /// Download the transcript for a single video URL
    pub async fn fetch(&self, url: &str, languages: &[String]) -> Result<VideoTranscript> {
        if !self.check_availability().await? {
            anyhow::bail!(
                "yt-dlp is not available. Please install it: https://github.com/yt-dlp/yt-dlp"
            );
        }

        let video_id = extract_video_id(url)?;
        let info = self.get_video_info(url).await?;

        let title = info["title"]
            .as_str()
            .map(|s| s.to_string())
            .unwrap_or_else(|| video_id.clone());

        let track_url = select_caption_track(&info, languages).ok_or_else(|| {
            anyhow::anyhow!(
                "No captions available for video {} in languages [{}]",
                video_id,
                languages.join(", ")
            )
        })?;

        let response = self
            .client
            .get(&track_url)
            .send()
            .await
            .context("Failed to download caption track")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download captions: HTTP {}", response.status());
        }

        let payload: Json3Transcript = response
            .json()
            .await
            .context("Failed to decode caption track payload")?;

        let text = join_caption_events(&payload);
        if text.is_empty() {
            anyhow::bail!("Caption track for video {} contained no text", video_id);
        }

        Ok(VideoTranscript {
            video_id,
            title,
            text,
        })
    }
}

impl Default for TranscriptFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect transcripts for each supplied URL
pub async fn gather_transcripts(
    urls: &[String],
    languages: &[String],
) -> Result<Vec<VideoTranscript>> {
    let fetcher = TranscriptFetcher::new();
    let mut transcripts = Vec::with_capacity(urls.len());

    for url in urls {
        let transcript = fetcher.fetch(url, languages).await?;
        tracing::info!("Downloaded transcript for {}", transcript.video_id);
        transcripts.push(transcript);
    }

    Ok(transcripts)
}

/// Pick a caption track URL from yt-dlp metadata, preferring manual subtitles
/// over automatic captions and earlier languages over later ones.
fn select_caption_track(info: &Value, languages: &[String]) -> Option<String> {
    for section in ["subtitles", "automatic_captions"] {
        for language in languages {
            let Some(tracks) = info[section][language.as_str()].as_array() else {
                continue;
            };

            // json3 is the structured format we know how to flatten
            let preferred = tracks
                .iter()
                .find(|track| track["ext"].as_str() == Some("json3"))
                .or_else(|| tracks.first());

            if let Some(url) = preferred.and_then(|track| track["url"].as_str()) {
                return Some(url.to_string());
            }
        }
    }
    None
}

/// YouTube json3 caption payload
#[derive(Debug, Deserialize)]
struct Json3Transcript {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default, rename = "utf8")]
    text: String,
}

/// Flatten json3 events into a single space-joined transcript string
fn join_caption_events(payload: &Json3Transcript) -> String {
    payload
        .events
        .iter()
        .flat_map(|event| event.segs.iter())
        .map(|seg| seg.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_id_from_watch_url() {
        let id = extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");
    }

    #[test]
    fn extracts_id_from_short_url() {
        let id = extract_video_id("https://youtu.be/dQw4w9WgXcQ?feature=shared").unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");
    }

    #[test]
    fn extracts_id_from_embed_url() {
        let id = extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ").unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");
    }

    #[test]
    fn rejects_urls_without_video_id() {
        assert!(extract_video_id("https://example.com/watch").is_err());
        assert!(extract_video_id("https://www.youtube.com/watch?v=short").is_err());
    }

    #[test]
    fn joins_caption_events_into_text() {
        let payload: Json3Transcript = serde_json::from_value(json!({
            "events": [
                {"segs": [{"utf8": "Hello "}, {"utf8": "world"}]},
                {},
                {"segs": [{"utf8": "\n"}, {"utf8": "again"}]}
            ]
        }))
        .unwrap();
        assert_eq!(join_caption_events(&payload), "Hello world again");
    }

    #[test]
    fn caption_selection_prefers_manual_subtitles() {
        let info = json!({
            "subtitles": {
                "en": [{"ext": "json3", "url": "https://captions/manual"}]
            },
            "automatic_captions": {
                "en": [{"ext": "json3", "url": "https://captions/auto"}]
            }
        });
        let languages = vec!["tr".to_string(), "en".to_string()];
        assert_eq!(
            select_caption_track(&info, &languages),
            Some("https://captions/manual".to_string())
        );
    }

    #[test]
    fn caption_selection_falls_back_to_automatic() {
        let info = json!({
            "automatic_captions": {
                "tr": [{"ext": "json3", "url": "https://captions/auto-tr"}]
            }
        });
        let languages = vec!["tr".to_string(), "en".to_string()];
        assert_eq!(
            select_caption_track(&info, &languages),
            Some("https://captions/auto-tr".to_string())
        );
    }
}
