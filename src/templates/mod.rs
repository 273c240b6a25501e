//! HTML templates and styling for the summarizer.
//!
//! ## Module Structure
//!
//! - `styles` - CSS constants and theme definitions
//! - `components` - Shared HTML components (nav bar, history sidebar, base template)
//! - `upload` - Summary and multi-agent upload pages
//! - `viewer` - Paper view with the highlighted text layer, PDF and chat

mod components;
mod styles;
mod upload;
mod viewer;

pub use components::{base_html, history_sidebar, nav_bar};
pub use styles::STYLE;
pub use upload::{render_index, render_multi_agent};
pub use viewer::render_paper;
