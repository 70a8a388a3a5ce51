use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{BookingState, DayType, Service, Step};
use crate::services::totals;

/// Bookable slots offered by the shop. The midday hour is the lunch
/// break.
pub const TIME_SLOTS: [&str; 10] = [
    "09:00", "10:00", "11:00", "13:00", "14:00", "15:00", "16:00", "17:00", "18:00", "19:00",
];

pub const MAX_PRODUCT_QTY: u32 = 99;

/// Snapshot of the settings the machine needs for one action. `today`
/// is injected by the caller (dd/mm/yyyy) so transitions stay
/// deterministic under test.
#[derive(Debug, Clone)]
pub struct WizardContext {
    pub products_enabled: bool,
    pub child_cut_enabled: bool,
    pub today: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingAction {
    ToggleService {
        service_id: String,
    },
    SetItemOption {
        item_id: String,
        option: String,
    },
    SelectAdultStyle {
        cut_id: Option<String>,
    },
    SetAdultStyleOption {
        option: String,
    },
    SelectChildStyle {
        cut_id: Option<String>,
    },
    SetChildStyleOption {
        option: String,
    },
    ToggleProduct {
        product_id: String,
    },
    AdjustProductQuantity {
        product_id: String,
        delta: i32,
    },
    ChooseDay {
        day: DayType,
        #[serde(default)]
        date: Option<String>,
    },
    ChooseTime {
        time: String,
    },
    SetNames {
        #[serde(default)]
        client_name: Option<String>,
        #[serde(default)]
        child_name: Option<String>,
    },
    Next,
    Back,
}

/// User-facing, so the messages are the ones the site shows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("Selecione um serviço")]
    NoServiceSelected,

    #[error("Data inválida")]
    InvalidDate,

    #[error("Horário inválido")]
    InvalidTimeSlot,
}

/// Both fields are always evaluated so the UI can flag them together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub client_name: bool,
    pub child_name: bool,
}

impl ValidationErrors {
    pub fn any(self) -> bool {
        self.client_name || self.child_name
    }
}

/// A session created while products were enabled may be parked on the
/// Products step when the toggle goes off; fold it onto the next step.
pub fn normalize_step(step: Step, products_enabled: bool) -> Step {
    if step == Step::Products && !products_enabled {
        Step::Date
    } else {
        step
    }
}

pub fn apply(
    state: &mut BookingState,
    action: BookingAction,
    ctx: &WizardContext,
) -> Result<(), BookingError> {
    state.step = normalize_step(state.step, ctx.products_enabled);

    match action {
        BookingAction::ToggleService { service_id } => {
            if let Some(pos) = state
                .selected_services
                .iter()
                .position(|id| *id == service_id)
            {
                state.selected_services.remove(pos);
                // Deselecting also forgets the chosen sub-option.
                state.item_options.remove(&service_id);
            } else {
                state.selected_services.push(service_id);
            }
            Ok(())
        }

        BookingAction::SetItemOption { item_id, option } => {
            if option.trim().is_empty() {
                state.item_options.remove(&item_id);
            } else {
                state.item_options.insert(item_id, option);
            }
            Ok(())
        }

        BookingAction::SelectAdultStyle { cut_id } => {
            state.adult_style = cut_id;
            state.adult_style_option = None;
            Ok(())
        }

        BookingAction::SetAdultStyleOption { option } => {
            state.adult_style_option = non_empty(option);
            Ok(())
        }

        BookingAction::SelectChildStyle { cut_id } => {
            state.child_style = cut_id;
            state.child_style_option = None;
            Ok(())
        }

        BookingAction::SetChildStyleOption { option } => {
            state.child_style_option = non_empty(option);
            Ok(())
        }

        BookingAction::ToggleProduct { product_id } => {
            if state.product_quantities.remove(&product_id).is_some() {
                // Quantity entry and option entry go together.
                state.item_options.remove(&product_id);
            } else {
                state.product_quantities.insert(product_id, 1);
            }
            Ok(())
        }

        BookingAction::AdjustProductQuantity { product_id, delta } => {
            let current = state
                .product_quantities
                .get(&product_id)
                .copied()
                .unwrap_or(0) as i32;
            let next = current + delta;
            if next <= 0 {
                state.product_quantities.remove(&product_id);
                state.item_options.remove(&product_id);
            } else {
                state
                    .product_quantities
                    .insert(product_id, (next as u32).min(MAX_PRODUCT_QTY));
            }
            Ok(())
        }

        BookingAction::ChooseDay { day, date } => {
            state.day_type = Some(day);
            match day {
                DayType::Today => {
                    state.specific_date = Some(ctx.today.clone());
                    advance_from(state, Step::Date, ctx);
                }
                DayType::Tomorrow => {
                    state.specific_date = None;
                    advance_from(state, Step::Date, ctx);
                }
                DayType::Other => match date {
                    Some(raw) => {
                        state.specific_date = Some(parse_explicit_date(&raw)?);
                        advance_from(state, Step::Date, ctx);
                    }
                    None => {
                        // Waiting for the explicit date input.
                        state.specific_date = None;
                    }
                },
            }
            Ok(())
        }

        BookingAction::ChooseTime { time } => {
            if !TIME_SLOTS.contains(&time.as_str()) {
                return Err(BookingError::InvalidTimeSlot);
            }
            state.time = Some(time);
            advance_from(state, Step::Time, ctx);
            Ok(())
        }

        BookingAction::SetNames {
            client_name,
            child_name,
        } => {
            if let Some(name) = client_name {
                state.client_name = name;
            }
            if let Some(name) = child_name {
                state.child_name = name;
            }
            Ok(())
        }

        BookingAction::Next => {
            if state.step == Step::Services && state.selected_services.is_empty() {
                return Err(BookingError::NoServiceSelected);
            }
            advance(state, ctx);
            Ok(())
        }

        BookingAction::Back => {
            let seq = Step::sequence(ctx.products_enabled);
            if let Some(i) = seq.iter().position(|s| *s == state.step) {
                if i > 0 {
                    state.step = seq[i - 1];
                }
            }
            Ok(())
        }
    }
}

/// Runs at confirm only. Never short-circuits: both flags are computed
/// so the UI can mark both inputs in one round-trip.
pub fn validate(state: &BookingState, services: &[Service]) -> ValidationErrors {
    let needs_child_name = totals::has_child_service(state, services);
    ValidationErrors {
        client_name: state.client_name.trim().is_empty(),
        child_name: needs_child_name && state.child_name.trim().is_empty(),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn advance(state: &mut BookingState, ctx: &WizardContext) {
    let seq = Step::sequence(ctx.products_enabled);
    if let Some(i) = seq.iter().position(|s| *s == state.step) {
        if i + 1 < seq.len() {
            state.step = seq[i + 1];
        }
    }
}

/// Day and time picks auto-advance, but only from their own step, so a
/// stray out-of-order action cannot leapfrog the service check.
fn advance_from(state: &mut BookingState, expected: Step, ctx: &WizardContext) {
    if state.step == expected {
        advance(state, ctx);
    }
}

/// The date input arrives as ISO (yyyy-mm-dd) and is stored in the
/// site's dd/mm/yyyy form.
fn parse_explicit_date(raw: &str) -> Result<String, BookingError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format("%d/%m/%Y").to_string())
        .map_err(|_| BookingError::InvalidDate)
}
