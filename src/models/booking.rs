use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sessions slide forward on every action and disappear when idle.
pub const SESSION_TTL_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Services,
    Products,
    Date,
    Time,
    Confirm,
}

impl Step {
    /// The wizard's step sequence. When products are disabled the
    /// Products step is absent from the sequence, not merely hidden,
    /// so forward and backward navigation both skip it.
    pub fn sequence(products_enabled: bool) -> &'static [Step] {
        if products_enabled {
            &[
                Step::Services,
                Step::Products,
                Step::Date,
                Step::Time,
                Step::Confirm,
            ]
        } else {
            &[Step::Services, Step::Date, Step::Time, Step::Confirm]
        }
    }

    /// 1-based position within the active sequence.
    pub fn position(self, products_enabled: bool) -> usize {
        Step::sequence(products_enabled)
            .iter()
            .position(|s| *s == self)
            .map(|i| i + 1)
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    Today,
    Tomorrow,
    Other,
}

impl DayType {
    pub fn label(self) -> &'static str {
        match self {
            DayType::Today => "Hoje",
            DayType::Tomorrow => "Amanhã",
            DayType::Other => "Outro dia",
        }
    }
}

/// Everything the visitor has picked so far. Owned and mutated only by
/// the booking state machine; aggregation reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingState {
    pub step: Step,
    /// Selected service ids, unique, in click order.
    pub selected_services: Vec<String>,
    /// Chosen sub-option per service or product id (one shared map).
    pub item_options: BTreeMap<String, String>,
    /// `None` is the explicit "decide in person" choice.
    pub adult_style: Option<String>,
    pub adult_style_option: Option<String>,
    pub child_style: Option<String>,
    pub child_style_option: Option<String>,
    /// Product id -> quantity (1..=99). Absence means "not selected";
    /// zero is never stored.
    pub product_quantities: BTreeMap<String, u32>,
    pub day_type: Option<DayType>,
    /// Literal dd/mm/yyyy text; set for Today and for an explicit
    /// "other day" pick, never for Tomorrow.
    pub specific_date: Option<String>,
    pub time: Option<String>,
    pub client_name: String,
    pub child_name: String,
}

impl BookingState {
    /// `preselected_cut` is the one-shot hand-off from the cut
    /// suggestions gallery, passed in explicitly at session start.
    pub fn new(preselected_cut: Option<String>) -> Self {
        Self {
            step: Step::Services,
            selected_services: vec![],
            item_options: BTreeMap::new(),
            adult_style: preselected_cut,
            adult_style_option: None,
            child_style: None,
            child_style_option: None,
            product_quantities: BTreeMap::new(),
            day_type: None,
            specific_date: None,
            time: None,
            client_name: String::new(),
            child_name: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSession {
    pub id: String,
    pub state: BookingState,
    pub last_activity: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl BookingSession {
    pub fn new(id: String, preselected_cut: Option<String>) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id,
            state: BookingState::new(preselected_cut),
            last_activity: now,
            expires_at: now + Duration::minutes(SESSION_TTL_MINUTES),
        }
    }

    pub fn touch(&mut self) {
        let now = Utc::now().naive_utc();
        self.last_activity = now;
        self.expires_at = now + Duration::minutes(SESSION_TTL_MINUTES);
    }
}
