pub mod whatsapp;

use async_trait::async_trait;

/// Outbound capability: hand a fully formed deep link to whatever
/// opens it. No response is awaited beyond delivery of the hand-off.
#[async_trait]
pub trait OutboundMessenger: Send + Sync {
    async fn open_link(&self, url: &str) -> anyhow::Result<()>;
}
