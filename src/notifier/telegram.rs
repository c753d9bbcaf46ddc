use crate::core::error::DeliveryError;
use crate::notifier::Notifier;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramNotifier {
    client: reqwest::Client,
    send_url: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        api_url: &str,
        token: &str,
        chat_id: &str,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError {
                chat_id: chat_id.to_string(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            send_url: format!("{}/bot{}/sendMessage", api_url.trim_end_matches('/'), token),
            chat_id: chat_id.to_string(),
        })
    }

    fn error(&self, reason: String) -> DeliveryError {
        DeliveryError {
            chat_id: self.chat_id.clone(),
            reason,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn chat_id(&self) -> &str {
        &self.chat_id
    }

    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        if text.trim().is_empty() {
            return Err(self.error("refusing to send an empty message".to_string()));
        }

        // reqwest errors carry the URL, which holds the bot token.
        let response = self
            .client
            .post(&self.send_url)
            .json(&SendMessageRequest {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .await
            .map_err(|e| self.error(format!("Request failed: {}", e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.error(format!("Failed to read response: {}", e.without_url())))?;

        let parsed: Option<BotApiResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(BotApiResponse { ok: true, .. }) if status.is_success() => {
                tracing::info!(chat_id = %self.chat_id, "Message sent");
                Ok(())
            }
            Some(BotApiResponse { description, .. }) => Err(self.error(format!(
                "{status} - {}",
                description.unwrap_or_else(|| "no description".to_string())
            ))),
            None => Err(self.error(format!("{status} - unexpected response body"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123456:ABC-DEF";

    fn notifier(server: &MockServer) -> TelegramNotifier {
        TelegramNotifier::new(&server.uri(), TOKEN, "987654", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_chat_and_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/bot{TOKEN}/sendMessage")))
            .and(body_json(json!({
                "chat_id": "987654",
                "text": "Бот / Работа взята на проверку."
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": { "message_id": 42 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        notifier(&server)
            .send("Бот / Работа взята на проверку.")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_bot_api_rejection_is_delivery_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let err = notifier(&server).send("hello").await.unwrap_err();
        assert_eq!(err.chat_id, "987654");
        assert!(err.reason.contains("chat not found"));
    }

    #[tokio::test]
    async fn test_rate_limit_is_delivery_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "ok": false,
                "error_code": 429,
                "description": "Too Many Requests: retry after 5"
            })))
            .mount(&server)
            .await;

        let err = notifier(&server).send("hello").await.unwrap_err();
        assert!(err.reason.contains("429"));
    }

    #[tokio::test]
    async fn test_empty_text_is_not_sent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(0)
            .mount(&server)
            .await;

        assert!(notifier(&server).send("   ").await.is_err());
    }

    #[tokio::test]
    async fn test_transport_error_hides_token() {
        let notifier =
            TelegramNotifier::new("http://127.0.0.1:1", TOKEN, "987654", Duration::from_secs(2))
                .unwrap();

        let err = notifier.send("hello").await.unwrap_err();
        assert!(!err.to_string().contains(TOKEN));
    }
}
