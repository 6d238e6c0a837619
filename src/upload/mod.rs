//! YouTube publishing via the Data API v3 resumable upload protocol.
//!
//! Two HTTP round-trips: an initiation POST carrying the video metadata whose
//! `Location` response header names the upload session, then a PUT of the raw
//! video bytes to that session URI.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::PrivacyStatus;
use crate::VideoGenError;

const UPLOAD_INITIATE_URL: &str =
    "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status";

/// "People & Blogs" in the YouTube category taxonomy
const DEFAULT_CATEGORY_ID: &str = "22";

#[derive(Debug, Serialize)]
struct UploadMetadata<'a> {
    snippet: Snippet<'a>,
    status: Status<'a>,
}

#[derive(Debug, Serialize)]
struct Snippet<'a> {
    title: &'a str,
    description: &'a str,
    #[serde(rename = "categoryId")]
    category_id: &'a str,
    tags: &'a [String],
}

#[derive(Debug, Serialize)]
struct Status<'a> {
    #[serde(rename = "privacyStatus")]
    privacy_status: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadedVideo {
    id: String,
}

/// YouTube upload client holding an OAuth2 bearer token with the
/// `youtube.upload` scope
pub struct YoutubeUploader {
    client: reqwest::Client,
    access_token: String,
}

impl YoutubeUploader {
    pub fn new(access_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token,
        }
    }

    /// Upload a rendered video and return the YouTube video id
    pub async fn upload(
        &self,
        video_path: &Path,
        title: &str,
        description: &str,
        tags: &[String],
        privacy: PrivacyStatus,
    ) -> Result<String> {
        let (file_size, body) = file_body(video_path).await?;

        let metadata = UploadMetadata {
            snippet: Snippet {
                title,
                description,
                category_id: DEFAULT_CATEGORY_ID,
                tags,
            },
            status: Status {
                privacy_status: privacy.as_str(),
            },
        };

        tracing::info!(
            "Initiating YouTube upload of {} ({} bytes)",
            video_path.display(),
            file_size
        );

        let upload_uri = self.initiate_session(&metadata, file_size).await?;

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap(),
        );
        progress.set_message("Uploading video to YouTube...");

        let response = self
            .client
            .put(&upload_uri)
            .header("Content-Type", "video/mp4")
            .header("Content-Length", file_size.to_string())
            .body(body)
            .send()
            .await
            .context("Failed to upload video bytes")?;

        progress.finish_with_message("Upload complete");

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(VideoGenError::UploadFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let uploaded: UploadedVideo = response
            .json()
            .await
            .context("Failed to decode the upload response")?;

        tracing::info!("Uploaded video id: {}", uploaded.id);
        Ok(uploaded.id)
    }

    /// Start a resumable upload session and return the session URI
    async fn initiate_session(
        &self,
        metadata: &UploadMetadata<'_>,
        file_size: u64,
    ) -> Result<String> {
        let response = self
            .client
            .post(UPLOAD_INITIATE_URL)
            .bearer_auth(&self.access_token)
            .header("X-Upload-Content-Type", "video/mp4")
            .header("X-Upload-Content-Length", file_size.to_string())
            .json(metadata)
            .send()
            .await
            .context("Failed to initiate YouTube upload")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(VideoGenError::UploadFailed(format!(
                "Upload initiation returned HTTP {}: {}",
                status, body
            )));
        }

        response
            .headers()
            .get("Location")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string())
            .ok_or_else(|| {
                anyhow::anyhow!(VideoGenError::UploadFailed(
                    "No Location header in the upload-initiation response; \
                     check that the access token has the youtube.upload scope"
                        .to_string()
                ))
            })
    }
}

/// Stat the rendered file and open it as a streaming request body, so uploads
/// never buffer the whole video in memory
async fn file_body(path: &Path) -> Result<(u64, reqwest::Body)> {
    let file_size = fs_err::metadata(path)
        .with_context(|| format!("Cannot stat {}", path.display()))?
        .len();

    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Cannot open {}", path.display()))?;

    Ok((file_size, reqwest::Body::from(file)))
}
