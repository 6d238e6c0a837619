//! Rendering via ffmpeg.
//!
//! Each segment's stock footage is looped (or replaced by a black source when
//! footage is missing) to the narration length and muxed with the speech
//! audio; the per-segment clips are then concatenated into one output file.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;

use crate::project::ProjectSegment;
use crate::VideoGenError;

const FRAME_SIZE: &str = "1920x1080";
const SCALE_FILTER: &str =
    "scale=1920:1080:force_original_aspect_ratio=decrease,pad=1920:1080:(ow-iw)/2:(oh-ih)/2";

/// ffmpeg-backed project renderer
pub struct Renderer {
    ffmpeg_path: String,
    fps: u32,
    temp_dir: TempDir,
}

impl Renderer {
    pub fn new(fps: u32) -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temporary clip directory")?;
        Ok(Self {
            ffmpeg_path: "ffmpeg".to_string(),
            fps,
            temp_dir,
        })
    }

    /// Render the segments into a single video file at `destination`
    pub async fn render(
        &self,
        segments: &[ProjectSegment],
        destination: &Path,
    ) -> Result<PathBuf> {
        if segments.is_empty() {
            anyhow::bail!(VideoGenError::RenderFailed(
                "No segments to render".to_string()
            ));
        }

        if let Some(parent) = destination.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let mut clip_paths = Vec::with_capacity(segments.len());
        for segment in segments {
            let clip_path = self
                .temp_dir
                .path()
                .join(format!("clip_{:02}.mp4", segment.index));
            self.render_segment_clip(segment, &clip_path).await?;
            clip_paths.push(clip_path);
        }

        let manifest_path = self.temp_dir.path().join("concat.txt");
        fs_err::write(&manifest_path, concat_manifest(&clip_paths))?;

        tracing::info!("Concatenating {} clips", clip_paths.len());
        self.run_ffmpeg(&[
            "-y".to_string(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            manifest_path.to_string_lossy().into_owned(),
            "-c".to_string(),
            "copy".to_string(),
            destination.to_string_lossy().into_owned(),
        ])
        .await?;

        tracing::info!("Rendered video to {}", destination.display());
        Ok(destination.to_path_buf())
    }

    /// Produce one clip aligned with the segment's narration audio
    async fn render_segment_clip(&self, segment: &ProjectSegment, clip_path: &Path) -> Result<()> {
        tracing::info!(
            "Rendering segment {} ({:.2}s) to {}",
            segment.index,
            segment.duration,
            clip_path.display()
        );
        let args = segment_clip_args(segment, clip_path, self.fps);
        self.run_ffmpeg(&args).await
    }

    async fn run_ffmpeg(&self, args: &[String]) -> Result<()> {
        let output = Command::new(&self.ffmpeg_path)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to run ffmpeg (is it installed and on PATH?)")?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(VideoGenError::RenderFailed(error.into_owned()));
        }

        Ok(())
    }
}

/// ffmpeg arguments muxing one segment's footage with its narration.
///
/// Footage shorter than the narration is looped; a black lavfi source stands
/// in when the segment has no footage at all.
fn segment_clip_args(segment: &ProjectSegment, clip_path: &Path, fps: u32) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".to_string()];

    match &segment.video_path {
        Some(video_path) => {
            args.extend([
                "-stream_loop".to_string(),
                "-1".to_string(),
                "-i".to_string(),
                video_path.to_string_lossy().into_owned(),
            ]);
        }
        None => {
            args.extend([
                "-f".to_string(),
                "lavfi".to_string(),
                "-i".to_string(),
                format!("color=c=black:s={}:r={}", FRAME_SIZE, fps),
            ]);
        }
    }

    args.extend([
        "-i".to_string(),
        segment.speech_path.to_string_lossy().into_owned(),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-t".to_string(),
        format!("{:.3}", segment.duration),
        "-vf".to_string(),
        SCALE_FILTER.to_string(),
        "-r".to_string(),
        fps.to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        clip_path.to_string_lossy().into_owned(),
    ]);

    args
}

/// Concat-demuxer manifest listing the per-segment clips in order
fn concat_manifest(clip_paths: &[PathBuf]) -> String {
    clip_paths
        .iter()
        .map(|path| format!("file '{}'\n", path.to_string_lossy().replace('\'', "'\\''")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(index: usize, video: Option<&str>, duration: f64) -> ProjectSegment {
        ProjectSegment {
            index,
            title: "Test".to_string(),
            summary: "Test.".to_string(),
            script: "Test script.".to_string(),
            keywords: Vec::new(),
            speech_path: PathBuf::from(format!("speech_{:02}.mp3", index)),
            video_path: video.map(PathBuf::from),
            duration,
        }
    }

    #[test]
    fn footage_clip_loops_the_video_input() {
        let args = segment_clip_args(&segment(0, Some("clip.mp4"), 4.5), Path::new("out.mp4"), 30);
        assert!(args.windows(2).any(|w| w == ["-stream_loop", "-1"]));
        assert!(args.contains(&"clip.mp4".to_string()));
        assert!(args.windows(2).any(|w| w == ["-t", "4.500"]));
    }

    #[test]
    fn missing_footage_uses_black_source() {
        let args = segment_clip_args(&segment(1, None, 2.0), Path::new("out.mp4"), 30);
        assert!(args.windows(2).any(|w| w == ["-f", "lavfi"]));
        assert!(args.iter().any(|arg| arg.starts_with("color=c=black")));
    }

    #[test]
    fn manifest_lists_clips_in_order() {
        let manifest = concat_manifest(&[PathBuf::from("a.mp4"), PathBuf::from("b.mp4")]);
        assert_eq!(manifest, "file 'a.mp4'\nfile 'b.mp4'\n");
    }

    #[test]
    fn manifest_escapes_single_quotes() {
        let manifest = concat_manifest(&[PathBuf::from("it's.mp4")]);
        assert!(manifest.contains("it'\\''s.mp4"));
    }
}
