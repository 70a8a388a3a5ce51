use serde::Serialize;

use crate::models::{BookingState, Product, Service};

/// Per-category totals in integer BRL units. Recomputed on demand;
/// the inputs are small enough that caching would buy nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub services_total: i64,
    pub products_total: i64,
    pub grand_total: i64,
}

/// Visibility of the optional sub-flows, derived from the current
/// selection. `has_child_service` gates the child-name field on its
/// own, independently of the child style sub-flow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowFlags {
    pub has_child_service: bool,
    pub show_adult_style_flow: bool,
    pub show_child_style_flow: bool,
}

fn selected<'a>(
    state: &'a BookingState,
    services: &'a [Service],
) -> impl Iterator<Item = &'a Service> {
    state
        .selected_services
        .iter()
        .filter_map(|id| services.iter().find(|s| s.id == *id))
}

pub fn compute(state: &BookingState, services: &[Service], products: &[Product]) -> Totals {
    let services_total: i64 = selected(state, services).map(|s| s.price).sum();

    // A stale id (product removed from the catalog after being picked)
    // contributes zero, never an error.
    let products_total: i64 = state
        .product_quantities
        .iter()
        .map(|(id, qty)| {
            products
                .iter()
                .find(|p| p.id == *id)
                .map(|p| p.price * i64::from(*qty))
                .unwrap_or(0)
        })
        .sum();

    Totals {
        services_total,
        products_total,
        grand_total: services_total + products_total,
    }
}

pub fn has_child_service(state: &BookingState, services: &[Service]) -> bool {
    selected(state, services).any(|s| s.is_child)
}

pub fn show_adult_style_flow(state: &BookingState, services: &[Service]) -> bool {
    selected(state, services).any(|s| !s.is_child && s.requires_style)
}

pub fn show_child_style_flow(
    state: &BookingState,
    services: &[Service],
    child_cut_enabled: bool,
) -> bool {
    child_cut_enabled && has_child_service(state, services)
}

pub fn flags(state: &BookingState, services: &[Service], child_cut_enabled: bool) -> FlowFlags {
    FlowFlags {
        has_child_service: has_child_service(state, services),
        show_adult_style_flow: show_adult_style_flow(state, services),
        show_child_style_flow: show_child_style_flow(state, services, child_cut_enabled),
    }
}
