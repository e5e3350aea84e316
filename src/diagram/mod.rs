//! Mermaid Flowchart Rendering Module
//!
//! Native egui rendering of Mermaid flowchart markup:
//! - Line-oriented parser for the flowchart subset
//! - Deterministic layered layout
//! - Ticketed render lifecycle (stale results are discarded)
//! - Interactive pan/zoom viewport with fit-to-view

pub mod graph;
pub mod layout;
pub mod parser;
pub mod renderer;
pub mod theme;
pub mod viewer;

pub use graph::{EdgeKind, FlowDirection, FlowEdge, FlowGraph, FlowNode, NodeShape, Subgraph};
pub use layout::{compute_layout, LayoutConfig};
pub use parser::{parse_string, ParseError};
pub use renderer::{DiagramRenderer, RenderConfig, RenderState, RenderTicket, Scene};
pub use theme::DiagramTheme;
pub use viewer::{DiagramViewer, DragState, ViewTransform};
