use crate::layout::{EdgeKind, Layout};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub center: Option<String>,
    pub width: f32,
    pub height: f32,
    pub couples: usize,
    pub parent_links: usize,
    pub rows: Vec<RowDump>,
    pub nodes: Vec<NodeDump>,
}

/// Persons sharing one generation row, left to right.
#[derive(Debug, Serialize)]
pub struct RowDump {
    pub generation: usize,
    pub y: f32,
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub generation: usize,
    pub focal: bool,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let nodes: Vec<NodeDump> = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                name: node.person_data.name.clone(),
                x: node.position.x,
                y: node.position.y,
                generation: node.generation,
                focal: node.is_focal,
            })
            .collect();

        let mut by_generation: BTreeMap<usize, Vec<&NodeDump>> = BTreeMap::new();
        for node in &nodes {
            by_generation.entry(node.generation).or_default().push(node);
        }
        let rows = by_generation
            .into_iter()
            .map(|(generation, mut members)| {
                members.sort_by(|a, b| a.x.total_cmp(&b.x).then_with(|| a.id.cmp(&b.id)));
                RowDump {
                    generation,
                    y: members.first().map_or(0.0, |node| node.y),
                    ids: members.iter().map(|node| node.id.clone()).collect(),
                }
            })
            .collect();

        LayoutDump {
            center: layout.center.clone(),
            width: layout.width,
            height: layout.height,
            couples: layout.edges_of_kind(EdgeKind::Couple).count(),
            parent_links: layout.edges_of_kind(EdgeKind::ParentChild).count(),
            rows,
            nodes,
        }
    }
}

/// Writes the `{nodes, edges}` document consumed by the tree view.
pub fn write_layout_json(layout: &Layout, output: Option<&Path>, pretty: bool) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            write_json(writer, layout, pretty)
        }
        None => {
            let stdout = std::io::stdout();
            write_json(stdout.lock(), layout, pretty)
        }
    }
}

pub fn write_layout_dump(layout: &Layout, output: Option<&Path>) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            write_json(writer, &dump, true)
        }
        None => {
            let stdout = std::io::stdout();
            write_json(stdout.lock(), &dump, true)
        }
    }
}

fn write_json<W: Write, T: Serialize>(mut writer: W, value: &T, pretty: bool) -> anyhow::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
