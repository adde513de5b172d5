//! Application use cases (template rendering and layered resolution).

mod render_template;
mod resolve_layers;

pub use render_template::RenderTemplate;
pub use resolve_layers::{LayeredVariables, NOW_VARIABLE, ResolveLayeredVariables};
