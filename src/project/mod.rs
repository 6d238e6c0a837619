//! Project data structures and serialization.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::planner::SegmentPlan;
use crate::VideoGenError;

/// A segment within a video project, pairing a plan with its fetched artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSegment {
    pub index: usize,
    pub title: String,
    pub summary: String,
    pub script: String,
    pub keywords: Vec<String>,
    pub speech_path: PathBuf,

    /// Absent when no stock footage matched the segment's query; the renderer
    /// substitutes a black clip
    pub video_path: Option<PathBuf>,

    /// Narration duration in seconds
    pub duration: f64,
}

/// Container for the full project state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoProject {
    pub name: String,
    pub render_path: PathBuf,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub segments: Vec<ProjectSegment>,
}

impl VideoProject {
    pub fn new(name: String, segments: Vec<ProjectSegment>, render_path: PathBuf) -> Self {
        Self {
            name,
            render_path,
            created_at: chrono::Utc::now(),
            segments,
        }
    }

    /// Persist the project as pretty-printed JSON
    pub fn save(&self, destination: &Path) -> Result<PathBuf> {
        if let Some(parent) = destination.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs_err::write(destination, content)?;

        tracing::info!("Project saved to {}", destination.display());
        Ok(destination.to_path_buf())
    }
}

/// Zip parallel plan/artifact sequences into project segments.
///
/// All four sequences must have equal length; a mismatch is a caller-contract
/// violation, not a recoverable runtime condition.
pub fn assemble_segments(
    plans: Vec<SegmentPlan>,
    speech_paths: Vec<PathBuf>,
    video_paths: Vec<Option<PathBuf>>,
    durations: Vec<f64>,
) -> Result<Vec<ProjectSegment>> {
    if plans.len() != speech_paths.len()
        || plans.len() != video_paths.len()
        || plans.len() != durations.len()
    {
        anyhow::bail!(VideoGenError::MismatchedSequences {
            plans: plans.len(),
            speech: speech_paths.len(),
            video: video_paths.len(),
            durations: durations.len(),
        });
    }

    let segments = plans
        .into_iter()
        .zip(speech_paths)
        .zip(video_paths)
        .zip(durations)
        .enumerate()
        .map(|(index, (((plan, speech_path), video_path), duration))| ProjectSegment {
            index,
            title: plan.title,
            summary: plan.summary,
            script: plan.script,
            keywords: plan.keywords,
            speech_path,
            video_path,
            duration,
        })
        .collect();

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(title: &str) -> SegmentPlan {
        SegmentPlan {
            title: title.to_string(),
            summary: format!("{}.", title),
            script: format!("{} script.", title),
            keywords: vec![title.to_lowercase()],
        }
    }

    #[test]
    fn assembles_segments_in_order() {
        let segments = assemble_segments(
            vec![plan("Intro"), plan("Outro")],
            vec![PathBuf::from("speech_00.mp3"), PathBuf::from("speech_01.mp3")],
            vec![Some(PathBuf::from("clip_00.mp4")), None],
            vec![4.2, 7.5],
        )
        .unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].index, 0);
        assert_eq!(segments[0].title, "Intro");
        assert_eq!(segments[0].video_path, Some(PathBuf::from("clip_00.mp4")));
        assert_eq!(segments[1].index, 1);
        assert_eq!(segments[1].video_path, None);
        assert_eq!(segments[1].duration, 7.5);
    }

    #[test]
    fn rejects_mismatched_sequence_lengths() {
        let result = assemble_segments(
            vec![plan("Only")],
            vec![PathBuf::from("a.mp3"), PathBuf::from("b.mp3")],
            vec![None],
            vec![1.0],
        );
        assert!(result.is_err());
    }

    #[test]
    fn missing_video_serializes_as_null() {
        let segments = assemble_segments(
            vec![plan("Solo")],
            vec![PathBuf::from("speech_00.mp3")],
            vec![None],
            vec![3.0],
        )
        .unwrap();

        let json = serde_json::to_value(&segments[0]).unwrap();
        assert!(json["video_path"].is_null());
    }

    #[test]
    fn project_serializes_expected_fields() {
        let project = VideoProject::new(
            "demo".to_string(),
            Vec::new(),
            PathBuf::from("output/demo.mp4"),
        );
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["name"], "demo");
        assert_eq!(json["render_path"], "output/demo.mp4");
        assert!(json["segments"].as_array().unwrap().is_empty());
    }
}
