use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenAI model settings
    pub openai: OpenAiConfig,

    /// Pexels stock footage settings
    pub pexels: PexelsConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Chat model used for segment planning
    pub model: String,

    /// Text-to-speech model
    pub tts_model: String,

    /// Text-to-speech voice
    pub tts_voice: String,

    /// Sampling temperature for planning
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PexelsConfig {
    /// Minimum acceptable clip duration in seconds
    pub min_duration: u32,

    /// Maximum acceptable clip duration in seconds
    pub max_duration: u32,

    /// Preferred clip orientation
    pub orientation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for persisted projects and renders
    pub output_dir: PathBuf,

    /// Directory for intermediate speech and footage files
    pub working_dir: PathBuf,

    /// Preferred caption languages, in priority order
    pub caption_languages: Vec<String>,

    /// Frames per second for rendered output
    pub render_fps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig {
                model: "gpt-4o-mini".to_string(),
                tts_model: "gpt-4o-mini-tts".to_string(),
                tts_voice: "alloy".to_string(),
                temperature: 0.7,
            },
            pexels: PexelsConfig {
                min_duration: 5,
                max_duration: 90,
                orientation: "landscape".to_string(),
            },
            app: AppConfig {
                output_dir: PathBuf::from("output"),
                working_dir: PathBuf::from("working"),
                caption_languages: vec!["tr".to_string(), "en".to_string()],
                render_fps: 30,
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("videogen").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.openai.model.is_empty() {
            anyhow::bail!("OpenAI chat model must be configured");
        }

        if self.pexels.min_duration > self.pexels.max_duration {
            anyhow::bail!(
                "Pexels min_duration ({}) exceeds max_duration ({})",
                self.pexels.min_duration,
                self.pexels.max_duration
            );
        }

        if self.app.caption_languages.is_empty() {
            anyhow::bail!("At least one caption language must be configured");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Chat Model: {}", self.openai.model);
        println!("  TTS Model: {}", self.openai.tts_model);
        println!("  TTS Voice: {}", self.openai.tts_voice);
        println!("  Output Dir: {}", self.app.output_dir.display());
        println!("  Working Dir: {}", self.app.working_dir.display());
        println!("  Caption Languages: {}", self.app.caption_languages.join(", "));
        println!();
        println!("Secrets are read from the environment:");
        println!("  OPENAI_API_KEY       {}", env_status("OPENAI_API_KEY"));
        println!("  PEXELS_API_KEY       {}", env_status("PEXELS_API_KEY"));
        println!("  YOUTUBE_ACCESS_TOKEN {}", env_status("YOUTUBE_ACCESS_TOKEN"));
    }

    /// OpenAI API key from the environment
    pub fn openai_api_key(&self) -> Result<String> {
        std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")
    }

    /// Pexels API key from the environment
    pub fn pexels_api_key(&self) -> Result<String> {
        std::env::var("PEXELS_API_KEY").context("PEXELS_API_KEY must be set")
    }

    /// YouTube OAuth2 bearer token from the environment
    pub fn youtube_access_token(&self) -> Result<String> {
        std::env::var("YOUTUBE_ACCESS_TOKEN")
            .context("YOUTUBE_ACCESS_TOKEN must be set to upload")
    }

    /// Ensure output and working directories exist
    pub fn ensure_directories(&self) -> Result<()> {
        fs_err::create_dir_all(&self.app.output_dir)?;
        fs_err::create_dir_all(&self.app.working_dir)?;
        Ok(())
    }
}

fn env_status(name: &str) -> &'static str {
    if std::env::var(name).is_ok() {
        "set"
    } else {
        "not set"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_durations() {
        let mut config = Config::default();
        config.pexels.min_duration = 120;
        config.pexels.max_duration = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_languages() {
        let mut config = Config::default();
        config.app.caption_languages.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_path_points_at_yaml_file() {
        let path = Config::path().unwrap();
        assert_eq!(path.file_name().unwrap(), "config.yaml");
    }

    #[test]
    fn config_round_trips_through_yaml() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.openai.model, config.openai.model);
        assert_eq!(parsed.app.caption_languages, config.app.caption_languages);
    }
}
