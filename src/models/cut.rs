use serde::{Deserialize, Serialize};

/// A named haircut style from the suggestions gallery. A visitor may
/// pre-select one for the booking, independently of the priced services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cut {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub technical_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
    pub active: bool,
    #[serde(default)]
    pub options: Vec<String>,
}

impl Cut {
    pub fn is_visible(&self) -> bool {
        self.active && !self.name.trim().is_empty()
    }
}
