use serde::Serialize;
use serde_json::Value;
use tracing::error;

use super::EmailError;
use crate::config::GenerationConfig;
use crate::shared::utils::extract_api_error;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GeneratedEmail {
    pub subject: String,
    pub body: String,
}

#[derive(Clone)]
pub struct EmailGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl EmailGenerator {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<GeneratedEmail, EmailError> {
        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&serde_json::json!({
                "model": self.model,
                "max_tokens": 1024,
                "messages": [{"role": "user", "content": prompt}]
            }))
            .send()
            .await
            .map_err(|e| {
                error!("generation API request failed: {e}");
                EmailError::Generation(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let details = extract_api_error(response).await;
            return Err(EmailError::Generation(format!("{status}: {details}")));
        }

        let result: Value = response
            .json()
            .await
            .map_err(|e| EmailError::Generation(format!("malformed response: {e}")))?;
        let text = result["content"][0]["text"].as_str().unwrap_or("");
        if text.is_empty() {
            return Err(EmailError::Generation("empty completion".to_string()));
        }

        Ok(parse_generated(text))
    }
}

/// The model is asked for a JSON object, but completions drift; fall back
/// to treating the first line as the subject.
pub fn parse_generated(text: &str) -> GeneratedEmail {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let (Some(subject), Some(body)) = (
            value.get("subject").and_then(|v| v.as_str()),
            value.get("body").and_then(|v| v.as_str()),
        ) {
            return GeneratedEmail {
                subject: subject.to_string(),
                body: body.to_string(),
            };
        }
    }

    let mut lines = trimmed.lines();
    let first = lines.next().unwrap_or_default();
    let subject = first
        .strip_prefix("Subject:")
        .map(str::trim)
        .unwrap_or(first)
        .to_string();
    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    GeneratedEmail { subject, body }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_completion() {
        let email = parse_generated(r#"{"subject": "Hello", "body": "World"}"#);
        assert_eq!(email.subject, "Hello");
        assert_eq!(email.body, "World");
    }

    #[test]
    fn test_parse_plain_text_with_subject_prefix() {
        let email = parse_generated("Subject: Follow up\n\nThanks for your time today.");
        assert_eq!(email.subject, "Follow up");
        assert_eq!(email.body, "Thanks for your time today.");
    }

    #[test]
    fn test_parse_plain_text_without_prefix() {
        let email = parse_generated("Quick intro\nHi there,\nbest regards");
        assert_eq!(email.subject, "Quick intro");
        assert_eq!(email.body, "Hi there,\nbest regards");
    }
}
