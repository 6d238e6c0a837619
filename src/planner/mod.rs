use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Config;
use crate::segmenter;
use crate::transcripts;
use crate::VideoGenError;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

const PLANNER_SYSTEM_PROMPT: &str = "You are an assistant that creates structured video scripts. \
     Return valid JSON with a list of segments under a 'segments' key. \
     Each segment must include title, summary, script, and keywords array.";

/// Structured representation of a planned video segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPlan {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub script: String,

    #[serde(default)]
    pub keywords: Vec<String>,
}

fn default_title() -> String {
    "Unnamed".to_string()
}

/// A source of segment plans for a pipeline run
#[async_trait]
pub trait PlanSource: Send + Sync {
    /// Produce the ordered segment plans for this run
    async fn plans(&self) -> Result<Vec<SegmentPlan>>;

    /// Short name for logging
    fn source_name(&self) -> &'static str;
}

/// Offline plan source backed by the rule-based script splitter
pub struct ScriptFileSource {
    path: PathBuf,
}

impl ScriptFileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl PlanSource for ScriptFileSource {
    async fn plans(&self) -> Result<Vec<SegmentPlan>> {
        let script_text = fs_err::read_to_string(&self.path)
            .with_context(|| format!("Failed to read script file: {}", self.path.display()))?;
        Ok(segmenter::segment_script(&script_text))
    }

    fn source_name(&self) -> &'static str {
        "script file"
    }
}

/// Plan source that feeds YouTube transcripts and a creative brief to the LLM
pub struct TranscriptSource {
    urls: Vec<String>,
    brief: String,
    planner: LlmPlanner,
    caption_languages: Vec<String>,
}

impl TranscriptSource {
    pub fn new(
        urls: Vec<String>,
        brief: String,
        planner: LlmPlanner,
        caption_languages: Vec<String>,
    ) -> Self {
        Self {
            urls,
            brief,
            planner,
            caption_languages,
        }
    }
}

#[async_trait]
impl PlanSource for TranscriptSource {
    async fn plans(&self) -> Result<Vec<SegmentPlan>> {
        let transcripts =
            transcripts::gather_transcripts(&self.urls, &self.caption_languages).await?;
        let texts: Vec<String> = transcripts.into_iter().map(|t| t.text).collect();
        self.planner.generate_outline(&texts, &self.brief).await
    }

    fn source_name(&self) -> &'static str {
        "youtube transcripts"
    }
}

/// Wrapper around the OpenAI chat completions API for segment planning
pub struct LlmPlanner {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct PlannerOutput {
    #[serde(default)]
    segments: Vec<SegmentPlan>,
}

impl LlmPlanner {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: config.openai_api_key()?,
            model: config.openai.model.clone(),
            temperature: config.openai.temperature,
        })
    }

    /// Generate a structured plan for the new video from source transcripts
    /// and a creative brief
    pub async fn generate_outline(
        &self,
        transcripts: &[String],
        prompt: &str,
    ) -> Result<Vec<SegmentPlan>> {
        let combined_text = transcripts.join("\n");
        let user_prompt = format!(
            "Original transcripts:\n{}\n\nCreative brief:\n{}\n\nRespond with JSON only.",
            combined_text, prompt
        );

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: PLANNER_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        tracing::info!("Requesting segment outline from model {}", self.model);

        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to call the OpenAI chat API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI chat API returned HTTP {}: {}", status, body);
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to decode the OpenAI chat response")?;

        let content = chat
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| {
                VideoGenError::PlanningFailed("OpenAI response had no choices".to_string())
            })?;

        let parsed = parse_planner_output(content)?;

        tracing::info!("Generated {} segments", parsed.len());
        Ok(parsed)
    }
}

/// Decode the model's JSON payload into segment plans.
///
/// Malformed JSON and an empty segment list are both fatal: the pipeline has
/// nothing to produce without plans.
fn parse_planner_output(content: &str) -> Result<Vec<SegmentPlan>> {
    let output: PlannerOutput = serde_json::from_str(content).map_err(|err| {
        tracing::error!("Failed to parse planner response: {}", content);
        VideoGenError::PlanningFailed(format!("OpenAI response was not valid JSON: {}", err))
    })?;

    if output.segments.is_empty() {
        anyhow::bail!(VideoGenError::PlanningFailed(
            "OpenAI returned no segments".to_string()
        ));
    }

    Ok(output.segments)
}
