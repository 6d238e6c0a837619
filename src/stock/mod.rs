//! Pexels stock footage search and download.

use anyhow::{Context, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::io::Write;
use std::path::PathBuf;

use crate::config::Config;

const PEXELS_SEARCH_URL: &str = "https://api.pexels.com/videos/search";

/// Representation of a downloaded Pexels video
#[derive(Debug, Clone)]
pub struct StockVideo {
    pub title: String,
    pub filepath: PathBuf,
    pub duration: f64,
}

/// A single search hit from the Pexels videos API
#[derive(Debug, Clone, Deserialize)]
pub struct VideoHit {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub duration: u32,

    #[serde(default)]
    pub video_files: Vec<VideoFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoFile {
    #[serde(default)]
    pub width: u32,

    pub link: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    videos: Vec<VideoHit>,
}

/// Simple wrapper around the Pexels videos API
pub struct PexelsClient {
    client: reqwest::Client,
    api_key: String,
    download_dir: PathBuf,
    min_duration: u32,
    max_duration: u32,
    orientation: String,
}

impl PexelsClient {
    pub fn new(config: &Config, download_dir: PathBuf) -> Result<Self> {
        fs_err::create_dir_all(&download_dir)?;
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: config.pexels_api_key()?,
            download_dir,
            min_duration: config.pexels.min_duration,
            max_duration: config.pexels.max_duration,
            orientation: config.pexels.orientation.clone(),
        })
    }

    /// Search for a clip matching the query whose duration falls inside the
    /// configured window
    pub async fn search_video(&self, query: &str) -> Result<Option<VideoHit>> {
        let response = self
            .client
            .get(PEXELS_SEARCH_URL)
            .header("Authorization", &self.api_key)
            .query(&[
                ("query", query),
                ("per_page", "1"),
                ("orientation", self.orientation.as_str()),
            ])
            .send()
            .await
            .context("Failed to call the Pexels search API")?;

        if !response.status().is_success() {
            anyhow::bail!("Pexels search returned HTTP {}", response.status());
        }

        let data: SearchResponse = response
            .json()
            .await
            .context("Failed to decode the Pexels search response")?;

        Ok(pick_hit(data.videos, self.min_duration, self.max_duration))
    }

    /// Download the highest-resolution file of a search hit
    pub async fn download_video(&self, video: &VideoHit, filename_hint: &str) -> Result<StockVideo> {
        let chosen = best_video_file(&video.video_files)
            .ok_or_else(|| anyhow::anyhow!("Video has no downloadable files"))?;

        // Suffix with a short random id so identical queries never clobber
        // each other's downloads
        let filepath = self.download_dir.join(format!(
            "{}_{}.mp4",
            safe_filename_stem(filename_hint),
            &uuid::Uuid::new_v4().to_string()[..8]
        ));

        let response = self
            .client
            .get(&chosen.link)
            .send()
            .await
            .context("Failed to download Pexels video")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download video: HTTP {}", response.status());
        }

        let total_size = response.content_length().unwrap_or(0);
        let progress = ProgressBar::new(total_size);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                .unwrap()
        );
        progress.set_message("Downloading footage...");

        let mut file = fs_err::File::create(&filepath)?;
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
            progress.set_position(downloaded);
        }

        progress.finish_with_message("Download complete");
        tracing::info!("Downloaded Pexels video to {}", filepath.display());

        Ok(StockVideo {
            title: if video.url.is_empty() {
                "Pexels Video".to_string()
            } else {
                video.url.clone()
            },
            filepath,
            duration: video.duration as f64,
        })
    }

    /// Search for footage and download the best match, if any
    pub async fn search_and_download(&self, query: &str) -> Result<Option<StockVideo>> {
        match self.search_video(query).await? {
            Some(video) => Ok(Some(self.download_video(&video, query).await?)),
            None => {
                tracing::warn!("No Pexels video found for query '{}'", query);
                Ok(None)
            }
        }
    }
}

/// First hit whose duration falls inside the accepted window
fn pick_hit(videos: Vec<VideoHit>, min_duration: u32, max_duration: u32) -> Option<VideoHit> {
    videos
        .into_iter()
        .find(|video| video.duration >= min_duration && video.duration <= max_duration)
}

/// Highest-resolution downloadable file of a hit
fn best_video_file(files: &[VideoFile]) -> Option<&VideoFile> {
    files.iter().max_by_key(|file| file.width)
}

/// Lowercase, underscore-joined filename stem derived from a query string
fn safe_filename_stem(hint: &str) -> String {
    let stem = hint
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    if stem.is_empty() {
        "segment".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(duration: u32) -> VideoHit {
        VideoHit {
            url: format!("https://pexels.test/{}", duration),
            duration,
            video_files: Vec::new(),
        }
    }

    #[test]
    fn picks_first_hit_within_duration_window() {
        let videos = vec![hit(3), hit(120), hit(42), hit(60)];
        let chosen = pick_hit(videos, 5, 90).unwrap();
        assert_eq!(chosen.duration, 42);
    }

    #[test]
    fn returns_none_when_no_hit_fits() {
        assert!(pick_hit(vec![hit(2), hit(200)], 5, 90).is_none());
        assert!(pick_hit(Vec::new(), 5, 90).is_none());
    }

    #[test]
    fn best_file_is_highest_resolution() {
        let files = vec![
            VideoFile { width: 640, link: "sd".to_string() },
            VideoFile { width: 1920, link: "hd".to_string() },
            VideoFile { width: 1280, link: "mid".to_string() },
        ];
        assert_eq!(best_video_file(&files).unwrap().link, "hd");
        assert!(best_video_file(&[]).is_none());
    }

    #[test]
    fn filename_stem_is_sanitized() {
        assert_eq!(safe_filename_stem("Mountain  Sunrise"), "mountain_sunrise");
        assert_eq!(safe_filename_stem(""), "segment");
        assert_eq!(safe_filename_stem("   "), "segment");
    }
}
