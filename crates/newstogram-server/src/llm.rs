//! Translation through an OpenAI-compatible chat completions API.
//!
//! The model is asked for a JSON object with three title candidates
//! (`judul`), the translated body (`isi`) and an optional `summary`. Models
//! do not always comply, so parsing is tolerant and falls back to the
//! scraped original.

use crate::config::LlmSettings;
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MAX_TOKENS: u32 = 2048;
const TITLE_CANDIDATES: usize = 3;

/// Translated article text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub titles: Vec<String>,
    pub body: String,
    pub summary: Option<String>,
}

impl Translation {
    /// The scraped text as-is, for when no model is configured.
    pub fn untranslated(title: &str, content: &str) -> Self {
        Self {
            titles: vec![title.to_string()],
            body: content.to_string(),
            summary: None,
        }
    }
}

/// Human-readable name of a language code, for the prompt.
pub fn language_name(code: &str) -> &str {
    match code.trim().to_ascii_lowercase().as_str() {
        "" | "id" => "Bahasa Indonesia",
        "en" => "English",
        "ms" => "Bahasa Melayu",
        _ => code.trim(),
    }
}

fn system_prompt(language: &str) -> String {
    format!(
        "You are a news content writer tasked with translating text into {language}. \
         Translate the given content into {language} and create three engaging title candidates \
         that make users click. Output must be valid JSON with the keys 'judul' as an array \
         containing three candidate titles, 'isi' for the translated content, and 'summary' \
         for a one-sentence summary. Do not include any additional text or explanation."
    )
}

fn user_prompt(language: &str, content: &str) -> String {
    format!(
        "Translate the following news content into {language} and write 3 title candidates.\n\
         Output MUST be a valid JSON string with keys \"judul\" (array of 3 titles), \"isi\" \
         and \"summary\". Do not include any text outside the JSON.\n---\nContent: {content}"
    )
}

/// Strip a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
pub fn clean_json_text(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    // The opening fence must end its line.
    let Some(newline) = rest.find(['\n', '\r']) else {
        return trimmed;
    };
    if !rest[..newline].trim().is_empty() {
        return trimmed;
    }
    let body = rest[newline..].trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Interpret a model reply, falling back to the scraped original.
///
/// Titles are kept only when exactly three non-blank candidates come back
/// (or a single title string); otherwise the original title is used.
/// Unparseable replies keep the original title and drop the body.
pub fn parse_translation(reply: &str, original_title: &str, original_content: &str) -> Translation {
    let parsed: Value = match serde_json::from_str(clean_json_text(reply)) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Could not parse translation as JSON: {}", e);
            return Translation {
                titles: vec![original_title.to_string()],
                body: String::new(),
                summary: None,
            };
        }
    };

    let titles = match parsed.get("judul") {
        Some(Value::Array(items)) if items.len() == TITLE_CANDIDATES => {
            let titles: Vec<String> = items.iter().filter_map(|item| non_empty(Some(item))).collect();
            if titles.len() == TITLE_CANDIDATES {
                titles
            } else {
                vec![original_title.to_string()]
            }
        }
        single @ Some(Value::String(_)) => match non_empty(single) {
            Some(title) => vec![title],
            None => vec![original_title.to_string()],
        },
        _ => vec![original_title.to_string()],
    };

    let body = match parsed.get("isi").and_then(Value::as_str) {
        Some(isi) if !isi.trim().is_empty() => isi.to_string(),
        _ => original_content.to_string(),
    };

    Translation {
        titles,
        body,
        summary: non_empty(parsed.get("summary")),
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completions client.
pub struct LlmClient {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(http: reqwest::Client, settings: LlmSettings) -> Self {
        Self { http, settings }
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Ask the model to translate `content`; returns its raw reply text.
    pub async fn translate(&self, content: &str, lang: &str) -> Result<String, ApiError> {
        let language = language_name(lang);
        let system = system_prompt(language);
        let user = user_prompt(language, content);
        let body = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: 1.0,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.settings.base_url))
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Llm(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Llm(e.to_string()))?;
        if !status.is_success() {
            return Err(ApiError::Llm(format!("status {}: {}", status.as_u16(), text)));
        }
        parse_reply(&text)
    }
}

fn parse_reply(text: &str) -> Result<String, ApiError> {
    let response: ChatResponse = serde_json::from_str(text).map_err(|e| ApiError::Llm(e.to_string()))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ApiError::Llm("response has no choices".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_json_text() {
        assert_eq!(clean_json_text("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(clean_json_text("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(clean_json_text("```\r\n{\"a\":1}\r\n```  "), "{\"a\":1}");
        // Not a fence followed by a newline: left alone.
        assert_eq!(clean_json_text("```{\"a\":1}```"), "```{\"a\":1}```");
    }

    #[test]
    fn test_three_titles() {
        let reply = r#"```json
{"judul": [" Satu ", "Dua", "Tiga"], "isi": "Isi terjemahan", "summary": "Ringkas."}
```"#;
        let t = parse_translation(reply, "Original", "Body");
        assert_eq!(t.titles, vec!["Satu", "Dua", "Tiga"]);
        assert_eq!(t.body, "Isi terjemahan");
        assert_eq!(t.summary.as_deref(), Some("Ringkas."));
    }

    #[test]
    fn test_title_fallbacks() {
        let blank = parse_translation(r#"{"judul": ["A", " ", "C"], "isi": ""}"#, "Original", "Body");
        assert_eq!(blank.titles, vec!["Original"]);
        assert_eq!(blank.body, "Body");

        let two = parse_translation(r#"{"judul": ["A", "B"]}"#, "Original", "Body");
        assert_eq!(two.titles, vec!["Original"]);

        let single = parse_translation(r#"{"judul": " Only one "}"#, "Original", "Body");
        assert_eq!(single.titles, vec!["Only one"]);
        assert_eq!(single.summary, None);
    }

    #[test]
    fn test_unparseable_reply() {
        let t = parse_translation("Sure! Here is your JSON:", "Original", "Body");
        assert_eq!(t.titles, vec!["Original"]);
        assert_eq!(t.body, "");
    }

    #[test]
    fn test_parse_reply() {
        let text = r#"{"choices":[{"message":{"role":"assistant","content":"{}"}}]}"#;
        assert_eq!(parse_reply(text).unwrap(), "{}");
        assert!(matches!(parse_reply(r#"{"choices":[]}"#), Err(ApiError::Llm(_))));
        assert!(matches!(parse_reply("not json"), Err(ApiError::Llm(_))));
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name("id"), "Bahasa Indonesia");
        assert_eq!(language_name("EN"), "English");
        assert_eq!(language_name("fr"), "fr");
    }

    #[test]
    fn test_prompts_name_the_language() {
        assert!(system_prompt("English").contains("into English"));
        assert!(user_prompt("English", "Hello").ends_with("Content: Hello"));
    }
}
