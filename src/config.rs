use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeConfig {
    pub ancestor_generations: usize,
    pub descendant_generations: usize,
    pub include_collateral: bool,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            ancestor_generations: 3,
            descendant_generations: 3,
            include_collateral: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub horizontal_gap: f32,
    pub vertical_gap: f32,
    /// Multiple of `horizontal_gap` between unrelated trees.
    pub forest_gap_factor: f32,
    /// Stand-in birth year for persons without one.
    pub unknown_birth_year: i32,
    pub scope: ScopeConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 130.0,
            node_height: 110.0,
            horizontal_gap: 40.0,
            vertical_gap: 120.0,
            forest_gap_factor: 6.0,
            unknown_birth_year: 9999,
            scope: ScopeConfig::default(),
        }
    }
}

impl LayoutConfig {
    pub fn row_height(&self) -> f32 {
        self.node_height + self.vertical_gap
    }

    pub fn couple_width(&self, has_spouse: bool) -> f32 {
        if has_spouse {
            self.node_width * 2.0 + self.horizontal_gap
        } else {
            self.node_width
        }
    }

    pub fn forest_gap(&self) -> f32 {
        self.horizontal_gap * self.forest_gap_factor
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFBEB".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    background: Option<String>,
    text_color: Option<String>,
    secondary_text_color: Option<String>,
    male_fill: Option<String>,
    male_border: Option<String>,
    female_fill: Option<String>,
    female_border: Option<String>,
    unknown_fill: Option<String>,
    unknown_border: Option<String>,
    focal_border: Option<String>,
    focal_glow: Option<String>,
    couple_edge_color: Option<String>,
    parent_edge_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().trim_end_matches("px").parse::<f32>().ok(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ScopeConfigFile {
    ancestor_generations: Option<usize>,
    descendant_generations: Option<usize>,
    include_collateral: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    horizontal_gap: Option<f32>,
    vertical_gap: Option<f32>,
    forest_gap_factor: Option<f32>,
    unknown_birth_year: Option<i32>,
    scope: Option<ScopeConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("invalid config file: {json_err}"))?,
    };
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        } else {
            tracing::warn!(theme = theme_name, "unknown theme name, keeping default");
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        apply_theme_variables(&mut config.theme, vars);
        config.render.background = config.theme.background.clone();
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.node_width {
            target.node_width = v.max(1.0);
        }
        if let Some(v) = layout.node_height {
            target.node_height = v.max(1.0);
        }
        if let Some(v) = layout.horizontal_gap {
            target.horizontal_gap = v.max(0.0);
        }
        if let Some(v) = layout.vertical_gap {
            target.vertical_gap = v.max(0.0);
        }
        if let Some(v) = layout.forest_gap_factor {
            target.forest_gap_factor = v.max(1.0);
        }
        if let Some(v) = layout.unknown_birth_year {
            target.unknown_birth_year = v;
        }
        if let Some(scope) = layout.scope {
            if let Some(v) = scope.ancestor_generations {
                target.scope.ancestor_generations = v;
            }
            if let Some(v) = scope.descendant_generations {
                target.scope.descendant_generations = v;
            }
            if let Some(v) = scope.include_collateral {
                target.scope.include_collateral = v;
            }
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.background {
            config.render.background = v;
        }
    }

    Ok(config)
}

fn apply_theme_variables(theme: &mut Theme, vars: ThemeVariables) {
    if let Some(v) = vars.font_family {
        theme.font_family = v;
    }
    if let Some(v) = vars.font_size.as_ref().and_then(NumberOrString::as_f32) {
        theme.font_size = v;
    }
    if let Some(v) = vars.background {
        theme.background = v;
    }
    if let Some(v) = vars.text_color {
        theme.text_color = v;
    }
    if let Some(v) = vars.secondary_text_color {
        theme.secondary_text_color = v;
    }
    if let Some(v) = vars.male_fill {
        theme.male_fill = v;
    }
    if let Some(v) = vars.male_border {
        theme.male_border = v;
    }
    if let Some(v) = vars.female_fill {
        theme.female_fill = v;
    }
    if let Some(v) = vars.female_border {
        theme.female_border = v;
    }
    if let Some(v) = vars.unknown_fill {
        theme.unknown_fill = v;
    }
    if let Some(v) = vars.unknown_border {
        theme.unknown_border = v;
    }
    if let Some(v) = vars.focal_border {
        theme.focal_border = v;
    }
    if let Some(v) = vars.focal_glow {
        theme.focal_glow = v;
    }
    if let Some(v) = vars.couple_edge_color {
        theme.couple_edge_color = v;
    }
    if let Some(v) = vars.parent_edge_color {
        theme.parent_edge_color = v;
    }
}
