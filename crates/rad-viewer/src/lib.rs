//! # rad-viewer
//!
//! A terminal viewer for annotated radiology reports stored as JSONL.
//! Each record's tokens are drawn with their NER spans color-coded, next to
//! a legend, category filters, and the record's relations.
//!
//! ## Key Bindings
//!
//! - `q` / `Esc` - Quit
//! - `Tab` - Move focus between the filters and the relations list
//! - `Up`/`Down` - Move within the focused panel
//! - `Space` / `Enter` - Toggle the focused checkbox
//! - `a` / `o` - Toggle the Anatomy / Observation filters
//! - `s` - Select or clear all relations
//! - `n` / `p` - Next / previous record

pub mod highlight;
pub use highlight::{Filters, SpanColor, StyledToken, TokenStyle, LEGEND, SWATCH};

mod input;
pub use input::*;

mod state;
pub use state::*;

mod widgets;
pub use widgets::*;

mod viewer;
pub use viewer::*;
