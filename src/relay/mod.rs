//! Relay orchestration: validation, reset handling, windowing, delivery

pub mod allowlist;
pub mod controller;

pub use allowlist::CountryAllowList;
pub use controller::{
    is_reset_command, RelayController, RelayOutcome, OVERSIZED_NOTICE, RESET_CONFIRMATION,
    RESET_KEYWORDS,
};
