use crate::config::LayoutConfig;
#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::ir::Person;
use crate::layout::{EdgeKind, EdgeLayout, Layout, NodeLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

const CARD_RADIUS: f32 = 12.0;
const CARD_PADDING_X: f32 = 12.0;
const FOCAL_RING: f32 = 3.0;
const ELLIPSIS: char = '\u{2026}';

pub fn render_svg(layout: &Layout, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = String::new();
    let width = (layout.width + config.node_width).max(200.0);
    let height = (layout.height + config.vertical_gap / 2.0).max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.parent_edge_color
    ));
    svg.push_str("</defs>");

    let nodes: HashMap<&str, &NodeLayout> = layout
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), node))
        .collect();

    for edge in &layout.edges {
        let (Some(source), Some(target)) = (
            nodes.get(edge.source.as_str()),
            nodes.get(edge.target.as_str()),
        ) else {
            continue;
        };
        svg.push_str(&edge_svg(edge, source, target, theme, config));
    }

    for node in &layout.nodes {
        svg.push_str(&card_svg(node, theme, config));
    }

    svg.push_str("</svg>");
    svg
}

fn edge_svg(
    edge: &EdgeLayout,
    source: &NodeLayout,
    target: &NodeLayout,
    theme: &Theme,
    config: &LayoutConfig,
) -> String {
    match edge.kind {
        EdgeKind::Couple => {
            let (left, right) = if source.position.x <= target.position.x {
                (source, target)
            } else {
                (target, source)
            };
            let mid = config.node_height / 2.0;
            format!(
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"2\" stroke-dasharray=\"6 4\"/>",
                left.position.x + config.node_width,
                left.position.y + mid,
                right.position.x,
                right.position.y + mid,
                theme.couple_edge_color
            )
        }
        EdgeKind::ParentChild => {
            let start = (
                source.position.x + config.node_width / 2.0,
                source.position.y + config.node_height,
            );
            let end = (
                target.position.x + config.node_width / 2.0,
                target.position.y,
            );
            let bend_y = (start.1 + end.1) / 2.0;
            let points = [start, (start.0, bend_y), (end.0, bend_y), end];
            format!(
                "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" marker-end=\"url(#arrow)\"/>",
                points_to_path(&points),
                theme.parent_edge_color
            )
        }
    }
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    let mut d = String::new();
    for (idx, point) in points.iter().enumerate() {
        let cmd = if idx == 0 { "M" } else { " L" };
        d.push_str(&format!("{cmd} {:.2} {:.2}", point.0, point.1));
    }
    d
}

fn card_svg(node: &NodeLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let person = &node.person_data;
    let (x, y) = (node.position.x, node.position.y);
    let mut card = String::new();

    if node.is_focal {
        card.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{FOCAL_RING}\"/>",
            x - FOCAL_RING,
            y - FOCAL_RING,
            config.node_width + FOCAL_RING * 2.0,
            config.node_height + FOCAL_RING * 2.0,
            CARD_RADIUS + FOCAL_RING,
            CARD_RADIUS + FOCAL_RING,
            theme.focal_glow
        ));
    }
    card.push_str(&format!(
        "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{CARD_RADIUS}\" ry=\"{CARD_RADIUS}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>",
        config.node_width,
        config.node_height,
        theme.fill_for(person.gender),
        theme.border_for(person.gender, node.is_focal)
    ));

    let center_x = x + config.node_width / 2.0;
    let name_y = y + config.node_height / 2.0;
    let max_width = config.node_width - CARD_PADDING_X * 2.0;
    let name = fit_text(&person.name, max_width, theme.font_size);
    card.push_str(&format!(
        "<text x=\"{center_x:.2}\" y=\"{name_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.text_color,
        escape_xml(&name)
    ));

    if let Some(years) = life_span(person) {
        let years_size = (theme.font_size - 2.0).max(1.0);
        let years_y = name_y + theme.font_size + 4.0;
        card.push_str(&format!(
            "<text x=\"{center_x:.2}\" y=\"{years_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{years_size}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            theme.secondary_text_color,
            escape_xml(&years)
        ));
    }
    card
}

fn life_span(person: &Person) -> Option<String> {
    match (person.birth_year, person.death_year) {
        (Some(birth), Some(death)) => Some(format!("{birth}~{death}")),
        (Some(birth), None) => Some(format!("{birth}~")),
        (None, Some(death)) => Some(format!("~{death}")),
        (None, None) => None,
    }
}

/// Shortens `text` with a trailing ellipsis until it fits `max_width`.
fn fit_text(text: &str, max_width: f32, font_size: f32) -> String {
    if text_width(text, font_size) <= max_width {
        return text.to_string();
    }
    let budget = max_width - char_width_factor(ELLIPSIS) * font_size;
    let mut fitted = String::new();
    let mut used = 0.0;
    for ch in text.chars() {
        let advance = char_width_factor(ch) * font_size;
        if used + advance > budget {
            break;
        }
        used += advance;
        fitted.push(ch);
    }
    fitted.push(ELLIPSIS);
    fitted
}

fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

// Rough advance widths relative to the font size.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '\'' => 0.321,
        'i' | 'j' | 'l' | 'I' => 0.24,
        'f' | 'r' | 't' => 0.34,
        'm' | 'w' | 'M' | 'W' => 0.88,
        'A'..='Z' => 0.68,
        'a'..='z' | '0'..='9' => 0.57,
        '\u{1100}'..='\u{11FF}'
        | '\u{2E80}'..='\u{9FFF}'
        | '\u{AC00}'..='\u{D7AF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FF00}'..='\u{FFEF}' => 1.0,
        _ => 0.6,
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Noto Sans KR".to_string();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    if let Some((r, g, b)) = parse_hex_rgb(&render_cfg.background) {
        pixmap.fill(resvg::tiny_skia::Color::from_rgba8(r, g, b, 255));
    }

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(feature = "png")]
fn parse_hex_rgb(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().strip_prefix('#')?;
    let channel = |idx: usize| u8::from_str_radix(hex.get(idx..idx + 2)?, 16).ok();
    match hex.len() {
        6 => Some((channel(0)?, channel(2)?, channel(4)?)),
        3 => {
            let short = |idx: usize| {
                let digit = u8::from_str_radix(hex.get(idx..idx + 1)?, 16).ok()?;
                Some(digit * 17)
            };
            Some((short(0)?, short(1)?, short(2)?))
        }
        _ => None,
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
