//! Stack templates: what a joined scope synthesizes to.

mod template;

pub use template::{OutputDef, ResourceDef, ResourceRef, Template, TemplateError, logical_id};
