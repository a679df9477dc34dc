//! Sliderblend HTTP service.
//!
//! Accepts PDF uploads, registers documents for Telegram bot users, starts the ingestion
//! pipeline in the background and reports job progress from the job store.

pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError, ValidatedJson};
pub use state::AppState;
