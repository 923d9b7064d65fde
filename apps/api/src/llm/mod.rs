//! Zhipu provider client, the single point of entry for all model calls.
//! No other module talks to the provider endpoint directly.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

pub mod prompts;

use crate::models::entry::TimeEntryRow;

const ZHIPU_API_URL: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 2000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
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
    content: Option<String>,
}

/// The daily analysis payload returned to clients. Every field has a
/// defined default so a mangled model response degrades to an empty
/// analysis instead of an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAnalysis {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_narrative: Option<String>,
    pub time_distribution: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_mood_curve: Option<BTreeMap<String, String>>,
    pub patterns: Vec<String>,
    pub insights: Vec<String>,
    pub focus_score: i64,
    pub highlights: Vec<String>,
    pub improvements: Vec<String>,
}

impl DailyAnalysis {
    /// The well-defined fallback used when the model output can't be parsed.
    pub fn empty() -> Self {
        Self {
            summary: "暂无足够的数据进行分析".to_string(),
            daily_narrative: None,
            time_distribution: BTreeMap::new(),
            energy_mood_curve: None,
            patterns: Vec::new(),
            insights: Vec::new(),
            focus_score: 50,
            highlights: Vec::new(),
            improvements: Vec::new(),
        }
    }
}

/// Seam for AI providers: one daily-analysis call, one range summary.
/// Zhipu is the only implementation today; new providers slot in without
/// touching the handlers.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn analyze_day(&self, entries: &[TimeEntryRow]) -> Result<DailyAnalysis, LlmError>;
    async fn summarize_range(
        &self,
        documents: &[(String, String)],
        range_label: &str,
    ) -> Result<String, LlmError>;
}

/// Zhipu chat-completions client. Key and model come from the persisted
/// settings blob, so the client is built per request rather than at startup.
#[derive(Clone)]
pub struct ZhipuClient {
    client: Client,
    api_key: String,
    model: String,
}

impl ZhipuClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            api_key,
            model,
        }
    }

    /// Raw chat-completions call returning the first choice's text.
    /// No automatic retries; failures surface to the caller once.
    pub async fn call(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(ZHIPU_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::EmptyContent)?;

        debug!("Zhipu call succeeded ({} chars)", content.len());
        Ok(content)
    }
}

#[async_trait]
impl AnalysisProvider for ZhipuClient {
    /// Runs the daily analysis. Model output is parsed defensively; a
    /// response we can't make sense of yields the empty analysis, never an
    /// error.
    async fn analyze_day(&self, entries: &[TimeEntryRow]) -> Result<DailyAnalysis, LlmError> {
        let raw = self.call(&prompts::daily_analysis_prompt(entries)).await?;
        Ok(parse_daily_analysis(&raw))
    }

    /// Summarizes saved documents over a range. The markdown comes back
    /// verbatim; section structure is a best-effort display contract.
    async fn summarize_range(
        &self,
        documents: &[(String, String)],
        range_label: &str,
    ) -> Result<String, LlmError> {
        self.call(&prompts::range_summary_prompt(documents, range_label))
            .await
    }
}

/// Slices from the first `{` to the last `}`; the model often wraps the
/// JSON in prose or code fences.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end >= start).then(|| &text[start..=end])
}

pub fn parse_daily_analysis(raw: &str) -> DailyAnalysis {
    let Some(json) = extract_json_object(raw) else {
        error!("No JSON object in model response, falling back to empty analysis");
        return DailyAnalysis::empty();
    };
    let value: Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to parse model response: {e}");
            return DailyAnalysis::empty();
        }
    };

    DailyAnalysis {
        summary: value["summary"].as_str().unwrap_or("").to_string(),
        daily_narrative: value["dailyNarrative"]
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        time_distribution: value["timeDistribution"]
            .as_object()
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_f64().map(|n| (k.clone(), n)))
                    .collect()
            })
            .unwrap_or_default(),
        energy_mood_curve: value["energyMoodCurve"].as_object().map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        }),
        patterns: string_list(&value["patterns"]),
        insights: string_list(&value["insights"]),
        focus_score: value["focusScore"]
            .as_i64()
            .or_else(|| value["focusScore"].as_f64().map(|f| f.round() as i64))
            .unwrap_or(50),
        highlights: string_list(&value["highlights"]),
        improvements: string_list(&value["improvements"]),
    }
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
