use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::settings::DEFAULT_BUSINESS_NAME;
use crate::models::{BookingState, BusinessSettings, Cut, Product, Service};
use crate::services::totals;

/// Everything except the characters JavaScript's encodeURIComponent
/// leaves verbatim, so links render identically to the legacy site.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const DECIDE_IN_PERSON: &str = "Definir na hora / Escolher no local";

const FALLBACK_SLUG: &str = "agendamento-barbearia";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedBooking {
    pub message: String,
    pub url: String,
}

/// URL-friendly identifier from a business name: lowercased, accents
/// folded away, "&" spelled out as the connective, anything else
/// collapsed into single hyphens.
pub fn generate_slug(text: &str) -> String {
    if text.is_empty() {
        return FALLBACK_SLUG.to_string();
    }

    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    let spelled = folded.replace('&', " e ");

    let mut slug = String::with_capacity(spelled.len());
    let mut pending_hyphen = false;
    for c in spelled.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        "barbearia".to_string()
    } else {
        slug
    }
}

pub fn format_brl(value: i64) -> String {
    format!("R$ {value},00")
}

fn name_with_option(name: &str, option: Option<&str>) -> String {
    match option.filter(|o| !o.trim().is_empty()) {
        Some(o) => format!("{name} ({o})"),
        None => name.to_string(),
    }
}

/// Style line for one slot: the chosen cut, or the fixed decide-later
/// phrase for the explicit null. A stale cut id renders nothing.
fn style_line(cut_id: Option<&str>, option: Option<&str>, cuts: &[Cut]) -> String {
    match cut_id {
        None => format!("- {DECIDE_IN_PERSON}"),
        Some(id) => cuts
            .iter()
            .find(|c| c.id == id)
            .map(|c| format!("- {}", name_with_option(&c.name, option)))
            .unwrap_or_default(),
    }
}

/// Deterministic transform from the finished wizard state into the
/// WhatsApp text and deep link. Pure: no clock, no I/O.
pub fn compose(
    state: &BookingState,
    services: &[Service],
    cuts: &[Cut],
    products: &[Product],
    settings: &BusinessSettings,
) -> ComposedBooking {
    let business_name = if settings.name.trim().is_empty() {
        DEFAULT_BUSINESS_NAME
    } else {
        settings.name.as_str()
    };
    let slug = generate_slug(business_name);

    let mut msg = format!("agendamento-{slug}\n");
    msg.push_str(&format!("✂️ *Agendamento – {business_name}*\n\n"));
    msg.push_str(&format!("👤 *Responsável:* {}\n", state.client_name));

    if totals::has_child_service(state, services) && !state.child_name.is_empty() {
        msg.push_str(&format!("👶 *Criança:* {}\n", state.child_name));
    }
    msg.push('\n');

    let service_lines: Vec<String> = state
        .selected_services
        .iter()
        .filter_map(|id| services.iter().find(|s| s.id == *id))
        .map(|s| {
            format!(
                "* {} – {}",
                name_with_option(&s.name, state.item_options.get(&s.id).map(String::as_str)),
                format_brl(s.price)
            )
        })
        .collect();
    if !service_lines.is_empty() {
        msg.push_str(&format!("💈 *Serviços:*\n{}\n\n", service_lines.join("\n")));
    }

    let product_lines: Vec<String> = state
        .product_quantities
        .iter()
        .filter_map(|(id, qty)| products.iter().find(|p| p.id == *id).map(|p| (p, *qty)))
        .map(|(p, qty)| {
            format!(
                "* {} (x{qty}) – {}",
                name_with_option(&p.name, state.item_options.get(&p.id).map(String::as_str)),
                format_brl(p.price * i64::from(qty))
            )
        })
        .collect();
    if !product_lines.is_empty() {
        msg.push_str(&format!("🛍️ *Produtos:*\n{}\n\n", product_lines.join("\n")));
    }

    if totals::show_adult_style_flow(state, services) {
        msg.push_str(&format!(
            "✂️ *Estilo(s) Adulto:*\n{}\n\n",
            style_line(
                state.adult_style.as_deref(),
                state.adult_style_option.as_deref(),
                cuts
            )
        ));
    }

    if totals::show_child_style_flow(state, services, settings.child_cut_enabled) {
        msg.push_str(&format!(
            "✂️ *Estilo(s) Infantil:*\n{}\n\n",
            style_line(
                state.child_style.as_deref(),
                state.child_style_option.as_deref(),
                cuts
            )
        ));
    }

    let totals = totals::compute(state, services, products);
    msg.push_str(&format!(
        "💰 *Total Geral:* {}\n\n",
        format_brl(totals.grand_total)
    ));

    let date_text = state
        .specific_date
        .as_deref()
        .or(state.day_type.map(|d| d.label()))
        .unwrap_or("");
    msg.push_str(&format!("📅 *Data:* {date_text}\n"));
    msg.push_str(&format!("🕒 *Horário:* {}", state.time.as_deref().unwrap_or("")));

    // An empty number still yields a link; accepted degraded behavior.
    let digits = settings.whatsapp_digits();
    let encoded = utf8_percent_encode(&msg, URI_COMPONENT).to_string();
    let url = format!("https://wa.me/{digits}?text={encoded}");

    ComposedBooking { message: msg, url }
}
