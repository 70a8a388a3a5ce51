use serde::{Deserialize, Serialize};

/// A priced service the shop offers. Authored in the admin panel; the
/// booking flow only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub duration_minutes: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub active: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub is_child: bool,
    /// Whether picking this service opens the adult style selector.
    /// Explicit attribute; legacy rows are backfilled by migration.
    #[serde(default)]
    pub requires_style: bool,
}

impl Service {
    /// Rows with an empty name are placeholder slots, never shown.
    pub fn is_visible(&self) -> bool {
        self.active && !self.name.trim().is_empty()
    }
}
