#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod search;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, ScopeConfig};
pub use ir::{Gender, Person, RelationKind, Register, Relationship};
pub use layout::{EdgeKind, EdgeLayout, Layout, NodeLayout, Position, compute_layout};
pub use parser::{ParseError, ParseOutput, parse_register};
pub use render::render_svg;
pub use search::search_persons;
pub use theme::Theme;

/// Everything needed to turn a register document into a tree view.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    /// Person to center a scoped view on.
    pub focus: Option<String>,
    /// Family-line tag to restrict the register to before layout.
    pub family: Option<String>,
}

impl RenderOptions {
    pub fn classic() -> Self {
        Self::default()
    }

    pub fn modern() -> Self {
        Self {
            theme: Theme::modern(),
            ..Self::default()
        }
    }

    pub fn with_focus(mut self, focus: impl Into<String>) -> Self {
        self.focus = Some(focus.into());
        self
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }
}

/// Parses `input` and lays it out according to `options`.
pub fn layout_register(input: &str, options: &RenderOptions) -> anyhow::Result<Layout> {
    let parsed = parse_register(input)?;
    let register = match options.family.as_deref() {
        Some(family) => parsed.register.restrict_to_family(family),
        None => parsed.register,
    };
    Ok(compute_layout(
        &register,
        options.focus.as_deref(),
        &options.layout,
    ))
}

/// Layout of `input` as the `{nodes, edges}` JSON document.
pub fn layout_json(input: &str, options: &RenderOptions) -> anyhow::Result<String> {
    let layout = layout_register(input, options)?;
    Ok(serde_json::to_string(&layout)?)
}

/// Static SVG preview of `input`.
pub fn render_with_options(input: &str, options: RenderOptions) -> anyhow::Result<String> {
    let layout = layout_register(input, &options)?;
    Ok(render_svg(&layout, &options.theme, &options.layout))
}
