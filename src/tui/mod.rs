//! Interactive form editor.
//!
//! Built with Ratatui on a crossterm backend. The editor works on a
//! [`ConfigModel`](crate::model::ConfigModel) and only writes the file when
//! the user saves.

pub mod app;
pub mod colors;
pub mod input;
pub mod text_input;
pub mod ui;
pub mod widgets;

mod run;

pub use run::{run_editor, TuiResult};
