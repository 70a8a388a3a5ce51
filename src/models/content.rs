use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: String,
    pub client_name: String,
    pub comment: String,
    pub rating: i32,
    pub active: bool,
}
