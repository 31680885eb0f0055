//! Markdown display for plans, incidents and manifests.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! the output is markdown meant to be rendered by the terminal front end.
//! Timestamps are stored as caller-supplied strings, so [`LocalDateTime`]
//! formats them in the system timezone when they parse and prints them
//! verbatim when they do not.
//!
//! ```rust
//! use rescue_core::{models::UpdateEntry, display::LocalDateTime};
//!
//! let update = UpdateEntry::new("Bridge A closed", "not a timestamp");
//! assert_eq!(LocalDateTime(&update.ts).to_string(), "not a timestamp");
//! ```

pub mod datetime;
pub mod models;

pub use datetime::LocalDateTime;
