//! Single-record editor core.
//!
//! Two cooperating pieces: [`controller::RecordEditorController`] owns the
//! draft of one record and drives the load-on-entry and save-on-submit
//! flows against injected collaborators, and [`upload::ImageUploadBridge`]
//! turns the rich-text widget's inline image uploads into multipart POSTs
//! with progress reporting.

pub mod alert;
pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod i18n;
pub mod logging;
pub mod model;
pub mod upload;
pub mod validation;

pub use error::{AppError, AppResult};
