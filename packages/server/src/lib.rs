//! HTTP front-end for the verification pipeline.
//!
//! Two inbound surfaces share one pipeline: a JSON API (`POST /api/verify`)
//! that runs synchronously and returns the structured result, and a chat
//! webhook (`POST /webhook`) that acknowledges immediately and delivers the
//! formatted result through a [`reply::ReplySink`] in the background.

pub mod app;
pub mod format;
pub mod reply;
pub mod routes;

pub use app::{build_app, AppState, VerifyService};
pub use reply::{ChatProgress, LoggingSink, ReplySink};
