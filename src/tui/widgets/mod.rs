//! Widget components for the editor.
//!
//! - [`form_panel`]: section list and field form
//! - [`choice_list`]: modal picker for multi-select fields

pub mod choice_list;
pub mod form_panel;

pub use choice_list::ChoiceList;
pub use form_panel::{render_form_screen, FormPanel};
