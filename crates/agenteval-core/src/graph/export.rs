//! JSON and GraphML serialisation of interaction graphs.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};

use crate::domain::error::{EvalError, Result};
use crate::graph::model::InteractionGraph;

const GRAPHML_NS: &str = "http://graphml.graphdrawing.org/xmlns";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeExport {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeExport {
    pub source: String,
    pub target: String,
    pub weight: u64,
    pub interaction_type: String,
    pub timestamp: DateTime<Utc>,
    pub metadata: Option<BTreeMap<String, String>>,
}

/// Node-link document: `{directed, nodes: [{id}], edges: [{source, target, weight, ...}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    pub directed: bool,
    pub nodes: Vec<NodeExport>,
    pub edges: Vec<EdgeExport>,
}

impl From<&InteractionGraph> for GraphExport {
    fn from(graph: &InteractionGraph) -> Self {
        Self {
            directed: true,
            nodes: graph
                .nodes()
                .iter()
                .map(|id| NodeExport { id: id.clone() })
                .collect(),
            edges: graph
                .edges()
                .iter()
                .map(|e| EdgeExport {
                    source: e.source.clone(),
                    target: e.target.clone(),
                    weight: e.weight,
                    interaction_type: e.interaction_type.clone(),
                    timestamp: e.timestamp,
                    metadata: e.metadata.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphExportFormat {
    Json,
    Graphml,
}

impl fmt::Display for GraphExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphExportFormat::Json => f.write_str("json"),
            GraphExportFormat::Graphml => f.write_str("graphml"),
        }
    }
}

impl FromStr for GraphExportFormat {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(GraphExportFormat::Json),
            "graphml" => Ok(GraphExportFormat::Graphml),
            other => Err(EvalError::Export(format!("unsupported format: {other}"))),
        }
    }
}

/// Pretty-printed node-link JSON.
pub fn to_json(graph: &InteractionGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(&GraphExport::from(graph))?)
}

fn xml_err(e: impl fmt::Display) -> EvalError {
    EvalError::Export(format!("graphml write failed: {e}"))
}

/// GraphML document. Attributes without a value are left out, since
/// GraphML has no null.
pub fn to_graphml(graph: &InteractionGraph) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;

    let mut root = BytesStart::new("graphml");
    root.push_attribute(("xmlns", GRAPHML_NS));
    writer.write_event(Event::Start(root)).map_err(xml_err)?;

    for (id, ty) in [
        ("weight", "int"),
        ("interaction_type", "string"),
        ("timestamp", "string"),
        ("metadata", "string"),
    ] {
        let mut key = BytesStart::new("key");
        key.push_attribute(("id", id));
        key.push_attribute(("for", "edge"));
        key.push_attribute(("attr.name", id));
        key.push_attribute(("attr.type", ty));
        writer.write_event(Event::Empty(key)).map_err(xml_err)?;
    }

    let mut g = BytesStart::new("graph");
    g.push_attribute(("id", "G"));
    g.push_attribute(("edgedefault", "directed"));
    writer.write_event(Event::Start(g)).map_err(xml_err)?;

    for id in graph.nodes() {
        let mut node = BytesStart::new("node");
        node.push_attribute(("id", id.as_str()));
        writer.write_event(Event::Empty(node)).map_err(xml_err)?;
    }

    for edge in graph.edges() {
        let mut el = BytesStart::new("edge");
        el.push_attribute(("source", edge.source.as_str()));
        el.push_attribute(("target", edge.target.as_str()));
        writer.write_event(Event::Start(el)).map_err(xml_err)?;

        write_data(&mut writer, "weight", &edge.weight.to_string())?;
        if !edge.interaction_type.is_empty() {
            write_data(&mut writer, "interaction_type", &edge.interaction_type)?;
        }
        write_data(&mut writer, "timestamp", &edge.timestamp.to_rfc3339())?;
        if let Some(metadata) = &edge.metadata {
            write_data(&mut writer, "metadata", &serde_json::to_string(metadata)?)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("edge")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("graph")))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new("graphml")))
        .map_err(xml_err)?;

    String::from_utf8(writer.into_inner()).map_err(xml_err)
}

fn write_data(writer: &mut Writer<Vec<u8>>, key: &str, value: &str) -> Result<()> {
    let mut data = BytesStart::new("data");
    data.push_attribute(("key", key));
    writer.write_event(Event::Start(data)).map_err(xml_err)?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new("data")))
        .map_err(xml_err)?;
    Ok(())
}

/// Render `graph` in `format` and write it to `path`, creating parent
/// directories.
pub fn write_graph_export(
    path: &Path,
    graph: &InteractionGraph,
    format: GraphExportFormat,
) -> Result<()> {
    let content = match format {
        GraphExportFormat::Json => to_json(graph)?,
        GraphExportFormat::Graphml => to_graphml(graph)?,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content)?;
    Ok(())
}
