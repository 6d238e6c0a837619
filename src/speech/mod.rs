//! Narration speech synthesis and audio probing.
//!
//! Speech is produced by the OpenAI text-to-speech endpoint and streamed to
//! disk; segment durations are read back with ffprobe.

use anyhow::{Context, Result};
use futures_util::StreamExt;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::config::Config;
use crate::VideoGenError;

const OPENAI_SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";

/// Wrapper around the OpenAI text-to-speech API
pub struct SpeechSynthesizer {
    client: reqwest::Client,
    api_key: String,
    model: String,
    voice: String,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

impl SpeechSynthesizer {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: config.openai_api_key()?,
            model: config.openai.tts_model.clone(),
            voice: config.openai.tts_voice.clone(),
        })
    }

    /// Generate narration audio for the provided text, streaming the response
    /// bytes to `destination`
    pub async fn synthesize(&self, text: &str, destination: &Path) -> Result<()> {
        if let Some(parent) = destination.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let request = SpeechRequest {
            model: &self.model,
            voice: &self.voice,
            input: text,
            response_format: "mp3",
        };

        let response = self
            .client
            .post(OPENAI_SPEECH_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to call the OpenAI speech API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(VideoGenError::SpeechFailed(format!(
                "OpenAI speech API returned HTTP {}: {}",
                status, body
            )));
        }

        let mut file = fs_err::File::create(destination)?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)?;
        }

        tracing::info!("Generated speech at {}", destination.display());
        Ok(())
    }
}

/// Probe the duration of a media file in seconds using ffprobe
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .context("Failed to run ffprobe (is it installed and on PATH?)")?;

    if !output.status.success() {
        let error = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("ffprobe failed for {}: {}", path.display(), error);
    }

    let stdout = String::from_utf8(output.stdout)?;
    parse_probe_output(&stdout)
        .with_context(|| format!("Could not parse ffprobe output for {}", path.display()))
}

fn parse_probe_output(stdout: &str) -> Result<f64> {
    let duration: f64 = stdout.trim().parse()?;
    if !duration.is_finite() || duration < 0.0 {
        anyhow::bail!("Invalid duration: {}", stdout.trim());
    }
    Ok(duration)
}
