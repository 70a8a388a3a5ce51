use async_trait::async_trait;

use super::OutboundMessenger;

/// Production hand-off. The navigation itself happens in the visitor's
/// browser with the URL the confirm endpoint returns; the service only
/// records that a link left the building.
pub struct WhatsappHandoff;

#[async_trait]
impl OutboundMessenger for WhatsappHandoff {
    async fn open_link(&self, url: &str) -> anyhow::Result<()> {
        tracing::info!(url, "whatsapp hand-off composed");
        Ok(())
    }
}
