//! Flight price alerts: form validation, baseline pricing at creation, and the
//! periodic re-check that emails users when the tracked fare moves.

pub mod domain;
pub mod link;
pub mod money;
pub(crate) mod notify;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Alert, AlertDraft, AlertId, AlertRequest, NewAlert, ValidationError};
pub use link::purchase_link;
pub use money::format_brl;
pub use repository::{AlertStore, StoreError};
pub use router::{alert_router, AlertApi};
pub use service::{
    AlertService, AlertServiceError, CheckFailure, CheckReport, CreatedAlert, PriceChange,
};
