use serde::{Deserialize, Serialize};

/// A retail product that can be added to a booking with a quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    #[serde(default)]
    pub image_url: String,
    pub active: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

impl Product {
    pub fn is_visible(&self) -> bool {
        self.active && !self.name.trim().is_empty()
    }
}
