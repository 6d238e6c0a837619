//! VideoGen - A Rust CLI tool for generating narrated videos
//!
//! This library orchestrates a content-generation pipeline: plan segments from
//! YouTube transcripts (via an LLM) or a plain-text script (via a rule-based
//! splitter), synthesize narration with OpenAI TTS, fetch matching stock
//! footage from Pexels, then optionally render with ffmpeg and publish to
//! YouTube.

pub mod cli;
pub mod config;
pub mod pipeline;
pub mod planner;
pub mod project;
pub mod render;
pub mod segmenter;
pub mod speech;
pub mod stock;
pub mod transcripts;
pub mod upload;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use pipeline::GenerationPipeline;
pub use planner::SegmentPlan;
pub use project::{ProjectSegment, VideoProject};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the generator
#[derive(thiserror::Error, Debug)]
pub enum VideoGenError {
    #[error("Unsupported URL format: {0}")]
    UnsupportedUrl(String),

    #[error("Planning failed: {0}")]
    PlanningFailed(String),

    #[error("Segment assembly failed: plans={plans}, speech={speech}, video={video}, durations={durations}")]
    MismatchedSequences {
        plans: usize,
        speech: usize,
        video: usize,
        durations: usize,
    },

    #[error("Speech synthesis failed: {0}")]
    SpeechFailed(String),

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),
}
