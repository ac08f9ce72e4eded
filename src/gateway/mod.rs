use std::env;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::info;

use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub bot_token: String,
    pub admin_chat_id: i64,
}

impl GatewayConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let bot_token = env::var("BOT_TOKEN")
            .map_err(|_| AppError::BadRequest("BOT_TOKEN is not set".to_string()))?;
        let admin_chat_id = env::var("ADMIN_CHAT_ID")
            .map_err(|_| AppError::BadRequest("ADMIN_CHAT_ID is not set".to_string()))?
            .parse::<i64>()
            .map_err(|_| AppError::BadRequest("ADMIN_CHAT_ID is not a chat id".to_string()))?;

        Ok(Self {
            bot_token,
            admin_chat_id,
        })
    }
}

/// Outbound half of the chat transport: pushes an exported roster file
/// into a chat. The inbound half (commands, keyboards) lives in the
/// conversation router, outside this service.
#[async_trait]
pub trait RosterDelivery: Send + Sync {
    async fn send_document(
        &self,
        chat_id: i64,
        file: &Path,
        caption: &str,
    ) -> Result<(), AppError>;
}

pub struct TelegramDelivery {
    client: Client,
    bot_token: String,
}

impl TelegramDelivery {
    pub fn new(config: &GatewayConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::BadRequest(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            bot_token: config.bot_token.clone(),
        })
    }
}

#[async_trait]
impl RosterDelivery for TelegramDelivery {
    async fn send_document(
        &self,
        chat_id: i64,
        file: &Path,
        caption: &str,
    ) -> Result<(), AppError> {
        let bytes = tokio::fs::read(file)
            .await
            .map_err(|e| AppError::ExternalIo(format!("read {}: {}", file.display(), e)))?;
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("roster.csv")
            .to_string();

        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", Part::bytes(bytes).file_name(file_name.clone()));

        let url = format!("https://api.telegram.org/bot{}/sendDocument", self.bot_token);
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::ExternalIo(format!("sendDocument: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalIo(format!(
                "sendDocument {}: {}",
                status, body
            )));
        }

        info!("delivered {} to chat {}", file_name, chat_id);
        Ok(())
    }
}

/// Delivery stub that drops everything on the floor.
pub struct NoopDelivery;

#[async_trait]
impl RosterDelivery for NoopDelivery {
    async fn send_document(
        &self,
        _chat_id: i64,
        _file: &Path,
        _caption: &str,
    ) -> Result<(), AppError> {
        Ok(())
    }
}
