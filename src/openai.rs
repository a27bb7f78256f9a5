use anyhow::Context as _;

pub fn chat_completions_endpoint(base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    format!("{base_url}/chat/completions")
}

/// Sends a single user message to an OpenAI-compatible chat completions endpoint and returns
/// the assistant message content.
pub async fn chat_completion_text(
    client: &reqwest::Client,
    endpoint: &str,
    api_key: &str,
    model: &str,
    prompt: &str,
    temperature: f32,
) -> anyhow::Result<String> {
    let body = serde_json::json!({
        "model": model,
        "messages": [
            { "role": "user", "content": prompt }
        ],
        "temperature": temperature,
        "stream": false,
    });

    let response = client
        .post(endpoint)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .with_context(|| format!("POST {endpoint}"))?;

    let status = response.status();
    let raw = response.text().await.context("read completion response body")?;
    if !status.is_success() {
        let message = parse_error_message(&raw).unwrap_or_else(|| raw.clone());
        anyhow::bail!("completion API error ({status}): {message}");
    }

    let value: serde_json::Value =
        serde_json::from_str(&raw).context("parse completion response")?;
    extract_message_content(&value).context("extract message content")
}

fn parse_error_message(raw_json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw_json).ok()?;
    let message = value.get("error")?.get("message")?.as_str()?.to_owned();
    Some(message)
}

fn extract_message_content(value: &serde_json::Value) -> anyhow::Result<String> {
    let choices = value
        .get("choices")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow::anyhow!("missing `choices` array in response"))?;

    let text = choices
        .first()
        .and_then(|choice| choice.pointer("/message/content"))
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    if text.trim().is_empty() {
        anyhow::bail!("completion output text is empty");
    }
    Ok(text.to_owned())
}
