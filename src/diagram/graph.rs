//! Flowchart graph data structures.
//!
//! In-memory representation of a parsed Mermaid flowchart: nodes with
//! shapes, directed edges with optional labels, and subgraph groupings.

use eframe::egui::{Pos2, Rect, Vec2};
use std::collections::HashMap;

/// A parsed flowchart.
#[derive(Debug, Clone)]
pub struct FlowGraph {
    /// All nodes, keyed by identifier.
    pub nodes: HashMap<String, FlowNode>,

    /// Node identifiers in declaration order. Layout iterates this, not
    /// the map, so positions are deterministic.
    pub order: Vec<String>,

    /// All edges in declaration order.
    pub edges: Vec<FlowEdge>,

    /// Subgraph groupings in declaration order.
    pub subgraphs: Vec<Subgraph>,

    /// Flow direction from the diagram header.
    pub direction: FlowDirection,

    /// Filled by the layout pass.
    pub layout_computed: bool,

    /// Bounding box of the laid-out graph.
    pub bounds: Rect,
}

/// A flowchart node.
#[derive(Debug, Clone)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
    /// Index into `FlowGraph::subgraphs`, if this node belongs to one.
    pub subgraph: Option<usize>,
    /// Position of the top-left corner (filled by layout).
    pub position: Pos2,
    /// Size (filled by layout).
    pub size: Vec2,
}

/// A directed edge between two nodes.
#[derive(Debug, Clone)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub kind: EdgeKind,
}

/// A `subgraph ... end` grouping.
#[derive(Debug, Clone)]
pub struct Subgraph {
    pub label: String,
    pub members: Vec<String>,
}

/// Mermaid node shapes, keyed by their bracket syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeShape {
    /// `[text]`
    #[default]
    Rectangle,
    /// `(text)`
    Rounded,
    /// `([text])`
    Stadium,
    /// `[[text]]`
    Subroutine,
    /// `[(text)]`
    Cylinder,
    /// `((text))`
    Circle,
    /// `{text}`
    Diamond,
    /// `{{text}}`
    Hexagon,
    /// `>text]`
    Asymmetric,
}

/// Mermaid edge styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeKind {
    /// `-->`
    #[default]
    Arrow,
    /// `---`
    Open,
    /// `-.->`
    Dotted,
    /// `==>`
    Thick,
}

/// Flow direction from `flowchart TD` / `graph LR` etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowDirection {
    /// TD / TB
    #[default]
    Down,
    /// BT
    Up,
    /// LR
    Right,
    /// RL
    Left,
}

impl FlowDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TD" | "TB" => Some(FlowDirection::Down),
            "BT" => Some(FlowDirection::Up),
            "LR" => Some(FlowDirection::Right),
            "RL" => Some(FlowDirection::Left),
            _ => None,
        }
    }
}

impl FlowNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, shape: NodeShape) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            shape,
            subgraph: None,
            position: Pos2::ZERO,
            size: Vec2::new(150.0, 60.0),
        }
    }

    /// Bounding rectangle in world coordinates.
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.size)
    }

    pub fn center(&self) -> Pos2 {
        self.position + self.size / 2.0
    }
}

impl Default for FlowGraph {
    fn default() -> Self {
        Self::new(FlowDirection::default())
    }
}

impl FlowGraph {
    pub fn new(direction: FlowDirection) -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
            edges: Vec::new(),
            subgraphs: Vec::new(),
            direction,
            layout_computed: false,
            bounds: Rect::from_min_size(Pos2::ZERO, Vec2::ZERO),
        }
    }

    /// Insert a node, or update label/shape when the id was first seen as
    /// a bare edge endpoint.
    pub fn upsert_node(&mut self, node: FlowNode) {
        match self.nodes.get_mut(&node.id) {
            Some(existing) => {
                // A bracketed mention refines an earlier bare mention.
                if node.label != node.id || node.shape != NodeShape::Rectangle {
                    existing.label = node.label;
                    existing.shape = node.shape;
                }
                if existing.subgraph.is_none() {
                    existing.subgraph = node.subgraph;
                }
            }
            None => {
                self.order.push(node.id.clone());
                self.nodes.insert(node.id.clone(), node);
            }
        }
        self.layout_computed = false;
    }

    pub fn add_edge(&mut self, edge: FlowEdge) {
        self.edges.push(edge);
        self.layout_computed = false;
    }

    pub fn get_node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.get(id)
    }

    /// Nodes in declaration order.
    pub fn nodes_in_order(&self) -> impl Iterator<Item = &FlowNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }
}
