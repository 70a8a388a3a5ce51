use serde::{Deserialize, Serialize};

pub const DEFAULT_BUSINESS_NAME: &str = "Fio & Navalha";

/// Site-wide content and feature toggles, edited in the admin panel.
/// Stored as a single JSON document row; every field is named — no
/// dynamically constructed keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessSettings {
    pub name: String,
    pub subtitle: String,
    pub phone: String,
    pub address: String,
    pub map_link: String,
    pub google_maps_url: String,
    pub logo_url: String,
    pub app_icon_url: String,
    pub hero_image: String,
    pub opening_hours_text: String,

    pub whatsapp_link: String,
    pub instagram_link: String,
    pub facebook_link: String,

    pub products_enabled: bool,
    pub child_cut_enabled: bool,

    pub hero_button_text_schedule: String,
    pub hero_button_text_cuts: String,

    pub feature1_title: String,
    pub feature1_description: String,
    pub feature2_title: String,
    pub feature2_description: String,
    pub feature3_title: String,
    pub feature3_description: String,

    pub footer_quote: String,

    pub enable_pwa_banner: bool,
    pub pwa_banner_text: String,
    pub pwa_name: String,
    pub pwa_short_name: String,
}

impl BusinessSettings {
    /// Outbound WhatsApp number with every non-digit stripped. May be
    /// empty; the composer still builds a (degraded) link in that case.
    pub fn whatsapp_digits(&self) -> String {
        self.phone.chars().filter(char::is_ascii_digit).collect()
    }
}

impl Default for BusinessSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_BUSINESS_NAME.to_string(),
            subtitle: "Barbearia de bairro com atendimento individual. Sem frescura, só respeito."
                .to_string(),
            phone: "5511999999999".to_string(),
            address: "Rua do Comércio, 123 - Centro".to_string(),
            map_link: "https://www.google.com/maps".to_string(),
            google_maps_url: "https://goo.gl/maps/example".to_string(),
            logo_url: String::new(),
            app_icon_url: String::new(),
            hero_image: String::new(),
            opening_hours_text: "Seg–Sex: 09:00 – 20:00\nSábado: 09:00 – 18:00\nDomingo: Fechado"
                .to_string(),
            whatsapp_link: "https://wa.me/5511999999999".to_string(),
            instagram_link: "https://instagram.com/".to_string(),
            facebook_link: "https://facebook.com/".to_string(),
            products_enabled: true,
            child_cut_enabled: true,
            hero_button_text_schedule: "Agendar".to_string(),
            hero_button_text_cuts: "Sugestão de Cortes".to_string(),
            feature1_title: "Com Prioridade".to_string(),
            feature1_description: "Quem agenda tem preferência. Respeitamos seu tempo.".to_string(),
            feature2_title: "Preço Justo".to_string(),
            feature2_description: "Valores simples para um serviço de primeira.".to_string(),
            feature3_title: "Ambiente Tranquilo".to_string(),
            feature3_description: "Lugar para relaxar. Cerveja gelada e boa conversa.".to_string(),
            footer_quote: "\"Estilo é para quem tem.\"".to_string(),
            enable_pwa_banner: true,
            pwa_banner_text: "Instale nosso App para agendar mais rápido!".to_string(),
            pwa_name: String::new(),
            pwa_short_name: String::new(),
        }
    }
}
