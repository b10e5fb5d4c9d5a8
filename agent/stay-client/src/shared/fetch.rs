/// Tool server calls and response parsing
/// Handles tool definition fetching and the {success, data, error} envelope

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::provider::ProviderError;

/// Fetch tool definitions from a server with timeout
pub async fn fetch_tool_definitions(
    client: &reqwest::Client,
    server_url: &str,
) -> Result<Value, ProviderError> {
    let url = format!("{}/tools", server_url);

    match tokio::time::timeout(Duration::from_secs(5), client.get(&url).send()).await {
        Ok(Ok(response)) => {
            if !response.status().is_success() {
                return Err(ProviderError::InvalidResponse(format!(
                    "Server returned error status {}",
                    response.status()
                )));
            }
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))
        }
        Ok(Err(e)) => Err(ProviderError::Transport(e.to_string())),
        Err(_) => Err(ProviderError::Transport("Request timeout".to_string())),
    }
}

/// POST a tool call and unwrap the response envelope into `T`
pub async fn call_server_tool<A, T>(
    client: &reqwest::Client,
    server_url: &str,
    tool_name: &str,
    arguments: &A,
) -> Result<T, ProviderError>
where
    A: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let url = format!("{}/tools/{}", server_url, tool_name);

    let response = client
        .post(&url)
        .json(arguments)
        .send()
        .await
        .map_err(|e| ProviderError::Transport(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::Transport(e.to_string()))?;

    let result: Value = serde_json::from_str(&body).map_err(|_| {
        if status.is_success() {
            ProviderError::InvalidResponse(format!("Non-JSON body from {}", tool_name))
        } else {
            ProviderError::Tool(format!("{} returned {}: {}", tool_name, status, body))
        }
    })?;

    unwrap_envelope(tool_name, result)
}

fn unwrap_envelope<T: DeserializeOwned>(tool_name: &str, result: Value) -> Result<T, ProviderError> {
    if let Some(error) = result.get("error").filter(|e| !e.is_null()) {
        let message = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());
        return Err(ProviderError::Tool(format!("{}: {}", tool_name, message)));
    }

    let data = result
        .get("data")
        .cloned()
        .ok_or_else(|| ProviderError::InvalidResponse("Invalid server response".to_string()))?;

    serde_json::from_value(data)
        .map_err(|e| ProviderError::InvalidResponse(format!("Unexpected {} payload: {}", tool_name, e)))
}

/// Pull the first JSON object out of a model reply, tolerating prose
/// around it.
pub fn parse_json_object(reply: &str) -> Result<Value, String> {
    let json_start = reply.find('{');
    let json_end = reply.rfind('}');

    match (json_start, json_end) {
        (Some(start), Some(end)) if start < end => {
            let json_str = &reply[start..=end];
            serde_json::from_str::<Value>(json_str).map_err(|e| format!("JSON parse error: {}", e))
        }
        _ => Err("Could not find a JSON object in the reply".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_object_with_prose() {
        let value = parse_json_object("Sure! Here it is: {\"choice\": 2} Hope that helps.").unwrap();
        assert_eq!(value, json!({"choice": 2}));
    }

    #[test]
    fn test_parse_json_object_without_braces() {
        assert!(parse_json_object("I could not tell").is_err());
        assert!(parse_json_object("} backwards {").is_err());
    }

    #[test]
    fn test_unwrap_envelope_data() {
        let data: Vec<u32> = unwrap_envelope("t", json!({"success": true, "data": [1, 2], "error": null})).unwrap();
        assert_eq!(data, vec![1, 2]);
    }

    #[test]
    fn test_unwrap_envelope_error() {
        let err = unwrap_envelope::<Value>("book-listing", json!({"success": false, "data": null, "error": "nope"}))
            .unwrap_err();
        assert!(matches!(err, ProviderError::Tool(ref m) if m == "book-listing: nope"));
    }
}
