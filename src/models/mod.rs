pub mod booking;
pub mod content;
pub mod cut;
pub mod product;
pub mod service;
pub mod settings;

pub use booking::{BookingSession, BookingState, DayType, Step};
pub use content::{PortfolioItem, Testimonial};
pub use cut::Cut;
pub use product::Product;
pub use service::Service;
pub use settings::BusinessSettings;

/// Catalog items carry at most this many sub-option slots.
pub const MAX_OPTIONS: usize = 4;
