use crate::models::BusinessSettings;

/// Dynamic PWA manifest so an installed app picks up the admin's name
/// and icon without a redeploy. Android launchers prefer the maskable
/// icon when present, so it points at the same image.
pub fn generate_manifest(settings: &BusinessSettings) -> serde_json::Value {
    let name = first_non_empty(&[&settings.pwa_name, &settings.name], "App");
    let short_name = first_non_empty(&[&settings.pwa_short_name, &settings.name], "App");

    let icon_src = if settings.app_icon_url.trim().is_empty() {
        "/icons/icon-512.png".to_string()
    } else {
        settings.app_icon_url.clone()
    };

    serde_json::json!({
        "name": name,
        "short_name": short_name,
        "start_url": "/",
        "display": "standalone",
        "background_color": "#0B1F3B",
        "theme_color": "#C1121F",
        "icons": [
            { "src": icon_src, "sizes": "192x192", "type": "image/png", "purpose": "any" },
            { "src": icon_src, "sizes": "512x512", "type": "image/png", "purpose": "any" },
            { "src": icon_src, "sizes": "512x512", "type": "image/png", "purpose": "maskable" },
        ],
    })
}

fn first_non_empty(candidates: &[&String], fallback: &str) -> String {
    candidates
        .iter()
        .find(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| fallback.to_string())
}
