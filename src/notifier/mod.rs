mod telegram;

use crate::core::error::DeliveryError;
use async_trait::async_trait;

pub use telegram::TelegramNotifier;

/// Delivers text to one chat fixed at construction.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn chat_id(&self) -> &str;

    async fn send(&self, text: &str) -> Result<(), DeliveryError>;
}
