use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "videogen",
    about = "VideoGen - Generate AI-assisted videos from YouTube transcripts or custom scripts",
    version,
    long_about = "A CLI tool that plans narrated video segments from YouTube transcripts (via OpenAI) or a plain-text script, synthesizes speech, fetches matching Pexels stock footage, and optionally renders and publishes the result to YouTube."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a video project from YouTube URLs or a script file
    Generate {
        /// YouTube video URLs to source transcripts from
        #[arg(value_name = "URL", conflicts_with = "script_file")]
        urls: Vec<String>,

        /// Path to a text file used as the narration script instead of URLs
        #[arg(long, value_name = "FILE")]
        script_file: Option<PathBuf>,

        /// Creative brief for the new video (required with URLs)
        #[arg(short, long, default_value = "")]
        prompt: String,

        /// Name of the project
        #[arg(long, default_value = "videogen_project")]
        project: String,

        /// Render the final video with ffmpeg
        #[arg(long)]
        render: bool,

        /// Upload the rendered video to YouTube
        #[arg(long)]
        upload: bool,

        /// YouTube privacy status for the upload
        #[arg(long, value_enum, default_value = "unlisted")]
        privacy: PrivacyStatus,

        /// Title for the YouTube upload (defaults to the project name)
        #[arg(long, value_name = "TITLE")]
        upload_title: Option<String>,

        /// Description for the YouTube upload (defaults to the brief)
        #[arg(long, value_name = "TEXT")]
        upload_description: Option<String>,
    },

    /// Configure API settings and project directories
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List required external tools
    Tools,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum PrivacyStatus {
    /// Visible to everyone
    Public,
    /// Visible only via direct link
    Unlisted,
    /// Visible only to the channel owner
    Private,
}

impl PrivacyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyStatus::Public => "public",
            PrivacyStatus::Unlisted => "unlisted",
            PrivacyStatus::Private => "private",
        }
    }
}

impl std::fmt::Display for PrivacyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
