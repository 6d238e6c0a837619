//! The generation pipeline.
//!
//! Sequences the collaborator calls for a run: plan segments, then per
//! segment synthesize narration, probe its duration and fetch stock footage;
//! finally assemble and persist the project, optionally render it and
//! optionally publish it to YouTube.

use anyhow::Result;
use std::path::PathBuf;

use crate::cli::PrivacyStatus;
use crate::config::Config;
use crate::planner::{PlanSource, SegmentPlan};
use crate::project::{assemble_segments, VideoProject};
use crate::render::Renderer;
use crate::speech::{self, SpeechSynthesizer};
use crate::stock::PexelsClient;
use crate::upload::YoutubeUploader;

/// Options for a single generation run
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub project_name: String,
    pub brief: String,
    pub render: bool,
    pub upload: bool,
    pub privacy: PrivacyStatus,
    pub upload_title: Option<String>,
    pub upload_description: Option<String>,
}

/// Main generation pipeline
pub struct GenerationPipeline {
    config: Config,
}

impl GenerationPipeline {
    pub fn new(config: Config) -> Result<Self> {
        config.ensure_directories()?;
        Ok(Self { config })
    }

    /// Run the full pipeline for the given plan source
    pub async fn run(
        &self,
        source: &dyn PlanSource,
        options: &GenerationOptions,
    ) -> Result<VideoProject> {
        tracing::info!("Planning segments from {}", source.source_name());
        let mut plans = source.plans().await?;

        let before = plans.len();
        plans.retain(|plan| !plan.script.is_empty());
        if plans.len() < before {
            tracing::warn!("Discarded {} plans with empty scripts", before - plans.len());
        }

        if plans.is_empty() {
            anyhow::bail!(
                "No segments could be generated. Provide a longer script or additional context."
            );
        }

        let segments = self.prepare_segments(plans).await?;

        let file_stem = crate::utils::sanitize_filename(&options.project_name);
        let render_path = self
            .config
            .app
            .output_dir
            .join(format!("{}.mp4", file_stem));
        let project = VideoProject::new(options.project_name.clone(), segments, render_path.clone());

        let project_file = self
            .config
            .app
            .output_dir
            .join(format!("{}.json", file_stem));
        project.save(&project_file)?;

        if options.render {
            let renderer = Renderer::new(self.config.app.render_fps)?;
            renderer.render(&project.segments, &render_path).await?;
        }

        if options.upload {
            let title = options
                .upload_title
                .clone()
                .unwrap_or_else(|| options.project_name.clone());
            let description = resolve_description(
                options.upload_description.as_deref(),
                &options.brief,
                &options.project_name,
            );
            let tags = collect_tags(&project);

            let uploader = YoutubeUploader::new(self.config.youtube_access_token()?);
            let video_id = uploader
                .upload(&render_path, &title, &description, &tags, options.privacy)
                .await?;
            println!("Published to YouTube: https://youtu.be/{}", video_id);
        }

        Ok(project)
    }

    /// Fetch speech and footage for each plan, in order, and zip the results
    /// into project segments
    async fn prepare_segments(
        &self,
        plans: Vec<SegmentPlan>,
    ) -> Result<Vec<crate::project::ProjectSegment>> {
        let speech_dir = self.config.app.working_dir.join("speech");
        let video_dir = self.config.app.working_dir.join("video");

        let synthesizer = SpeechSynthesizer::new(&self.config)?;
        let pexels = PexelsClient::new(&self.config, video_dir)?;

        let mut speech_paths: Vec<PathBuf> = Vec::with_capacity(plans.len());
        let mut video_paths: Vec<Option<PathBuf>> = Vec::with_capacity(plans.len());
        let mut durations: Vec<f64> = Vec::with_capacity(plans.len());

        for (index, plan) in plans.iter().enumerate() {
            let speech_path = speech_dir.join(format!("segment_{:02}.mp3", index));
            synthesizer.synthesize(&plan.script, &speech_path).await?;

            let duration = speech::probe_duration(&speech_path).await?;

            let query = stock_query(plan);
            let stock = pexels.search_and_download(&query).await?;
            let video_path = stock.map(|video| video.filepath);

            speech_paths.push(speech_path);
            video_paths.push(video_path);
            durations.push(duration);

            tracing::info!(
                "Prepared segment {} with duration {:.2}s",
                index + 1,
                duration
            );
        }

        let total: f64 = durations.iter().sum();
        tracing::info!(
            "Prepared {} segments, {} of narration",
            plans.len(),
            crate::utils::format_duration(total)
        );

        assemble_segments(plans, speech_paths, video_paths, durations)
    }
}

/// Stock-footage search query for a plan: its keywords joined by spaces, or
/// the title when it has no keywords
fn stock_query(plan: &SegmentPlan) -> String {
    if plan.keywords.is_empty() {
        plan.title.clone()
    } else {
        plan.keywords.join(" ")
    }
}

/// Upload description: explicit override, then the brief, then the project name
fn resolve_description(override_text: Option<&str>, brief: &str, project_name: &str) -> String {
    match override_text {
        Some(text) => text.to_string(),
        None if !brief.is_empty() => brief.to_string(),
        None => project_name.to_string(),
    }
}

/// Distinct segment keywords, in first-seen order, used as upload tags
fn collect_tags(project: &VideoProject) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for segment in &project.segments {
        for keyword in &segment.keywords {
            if !tags.contains(keyword) {
                tags.push(keyword.clone());
            }
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectSegment;

    fn plan(keywords: &[&str]) -> SegmentPlan {
        SegmentPlan {
            title: "Fallback Title".to_string(),
            summary: "Summary.".to_string(),
            script: "Script.".to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn stock_query_joins_keywords() {
        assert_eq!(stock_query(&plan(&["sea", "waves"])), "sea waves");
    }

    #[test]
    fn stock_query_falls_back_to_title() {
        assert_eq!(stock_query(&plan(&[])), "Fallback Title");
    }

    #[test]
    fn description_prefers_override_then_brief_then_name() {
        assert_eq!(resolve_description(Some("custom"), "brief", "name"), "custom");
        assert_eq!(resolve_description(None, "brief", "name"), "brief");
        assert_eq!(resolve_description(None, "", "name"), "name");
    }

    #[test]
    fn tags_are_deduplicated_in_first_seen_order() {
        let segment = |keywords: &[&str], index: usize| ProjectSegment {
            index,
            title: String::new(),
            summary: String::new(),
            script: String::new(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            speech_path: PathBuf::new(),
            video_path: None,
            duration: 0.0,
        };
        let project = VideoProject::new(
            "demo".to_string(),
            vec![segment(&["sea", "sun"], 0), segment(&["sun", "sand"], 1)],
            PathBuf::from("demo.mp4"),
        );
        assert_eq!(collect_tags(&project), vec!["sea", "sun", "sand"]);
    }
}
