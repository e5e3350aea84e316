//! Layered layout for flowcharts.
//!
//! Assigns each node a rank by longest path from the sources, places
//! ranks along the main axis of the declared direction, and spreads each
//! rank's nodes along the cross axis in declaration order. Deterministic
//! for a given graph; no randomness, no iteration-order dependence.

use super::graph::{FlowDirection, FlowGraph};
use eframe::egui::{Pos2, Rect, Vec2};
use std::collections::HashMap;

/// Layout tuning knobs.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Minimum node width
    pub node_width: f32,
    /// Node height
    pub node_height: f32,
    /// Per-character label width estimate
    pub char_width: f32,
    /// Spacing between ranks (main axis)
    pub rank_spacing: f32,
    /// Spacing between nodes within a rank (cross axis)
    pub node_spacing: f32,
    /// Padding around the graph
    pub padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 110.0,
            node_height: 48.0,
            char_width: 8.5,
            rank_spacing: 90.0,
            node_spacing: 50.0,
            padding: 40.0,
        }
    }
}

/// Compute positions, sizes, and bounds for every node in the graph.
/// After this call `graph.bounds` has strictly positive width and height,
/// which the viewer's fit-to-viewport math relies on.
pub fn compute_layout(graph: &mut FlowGraph, config: &LayoutConfig) {
    let ranks = assign_ranks(graph);

    // Bucket ids per rank, declaration order within a rank.
    let max_rank = ranks.values().copied().max().unwrap_or(0);
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); max_rank + 1];
    for id in &graph.order {
        rows[ranks[id]].push(id.clone());
    }

    // Size nodes by their label first; placement needs the extents.
    for id in &graph.order {
        if let Some(node) = graph.nodes.get_mut(id) {
            let width = (node.label.chars().count() as f32 * config.char_width + 30.0)
                .max(config.node_width);
            node.size = Vec2::new(width, config.node_height);
        }
    }

    let vertical = matches!(graph.direction, FlowDirection::Down | FlowDirection::Up);

    let mut main = config.padding;
    for row in &rows {
        if row.is_empty() {
            continue;
        }

        // Rank thickness is the largest node on the main axis; for
        // vertical flows that is just the node height.
        let thickness = if vertical {
            config.node_height
        } else {
            row.iter()
                .filter_map(|id| graph.nodes.get(id))
                .map(|n| n.size.x)
                .fold(config.node_width, f32::max)
        };

        let row_extent: f32 = row
            .iter()
            .filter_map(|id| graph.nodes.get(id))
            .map(|n| if vertical { n.size.x } else { n.size.y })
            .sum::<f32>()
            + config.node_spacing * (row.len().saturating_sub(1)) as f32;

        let mut cross = config.padding - row_extent / 2.0;
        for id in row {
            if let Some(node) = graph.nodes.get_mut(id) {
                node.position = if vertical {
                    Pos2::new(cross, main)
                } else {
                    // Center the node within the rank thickness.
                    Pos2::new(main + (thickness - node.size.x) / 2.0, cross)
                };
                cross += (if vertical { node.size.x } else { node.size.y }) + config.node_spacing;
            }
        }

        main += thickness + config.rank_spacing;
    }

    // BT / RL flow along the same axis, mirrored.
    mirror_if_reversed(graph);

    compute_bounds(graph);
    graph.layout_computed = true;
}

/// Longest-path rank assignment in declaration order. Back edges (cycles)
/// do not advance the rank, so the pass terminates on any input.
fn assign_ranks(graph: &FlowGraph) -> HashMap<String, usize> {
    let mut preds: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &graph.edges {
        preds.entry(edge.to.as_str()).or_default().push(edge.from.as_str());
    }

    let mut ranks: HashMap<String, usize> = HashMap::new();
    // A few passes let ranks settle through chains declared out of order;
    // bounded so cycles cannot spin forever.
    for _ in 0..graph.order.len().max(1) {
        let mut changed = false;
        for id in &graph.order {
            let rank = preds
                .get(id.as_str())
                .map(|ps| {
                    ps.iter()
                        .filter_map(|p| ranks.get(*p))
                        .map(|r| r + 1)
                        .max()
                        .unwrap_or(0)
                })
                .unwrap_or(0);
            match ranks.get(id) {
                Some(&old) if old >= rank => {}
                _ => {
                    ranks.insert(id.clone(), rank);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    ranks
}

fn mirror_if_reversed(graph: &mut FlowGraph) {
    let reversed = matches!(graph.direction, FlowDirection::Up | FlowDirection::Left);
    if !reversed {
        return;
    }
    compute_bounds(graph);
    let bounds = graph.bounds;
    for node in graph.nodes.values_mut() {
        match graph.direction {
            FlowDirection::Up => {
                node.position.y = bounds.max.y - (node.position.y - bounds.min.y) - node.size.y;
            }
            FlowDirection::Left => {
                node.position.x = bounds.max.x - (node.position.x - bounds.min.x) - node.size.x;
            }
            _ => {}
        }
    }
}

/// Bounding box over all nodes, with a positive fallback for an empty
/// graph so the scene extent is never degenerate.
fn compute_bounds(graph: &mut FlowGraph) {
    let mut min = Pos2::new(f32::MAX, f32::MAX);
    let mut max = Pos2::new(f32::MIN, f32::MIN);

    for node in graph.nodes.values() {
        min.x = min.x.min(node.position.x);
        min.y = min.y.min(node.position.y);
        max.x = max.x.max(node.position.x + node.size.x);
        max.y = max.y.max(node.position.y + node.size.y);
    }

    if min.x < max.x && min.y < max.y {
        graph.bounds = Rect::from_min_max(min, max);
    } else {
        graph.bounds = Rect::from_min_size(Pos2::ZERO, Vec2::new(400.0, 300.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::parser::parse_string;

    fn laid_out(source: &str) -> FlowGraph {
        let mut graph = parse_string(source).unwrap();
        compute_layout(&mut graph, &LayoutConfig::default());
        graph
    }

    #[test]
    fn test_chain_ranks_advance_downward() {
        let graph = laid_out("flowchart TD\n  A --> B --> C");
        assert!(graph.nodes["A"].position.y < graph.nodes["B"].position.y);
        assert!(graph.nodes["B"].position.y < graph.nodes["C"].position.y);
    }

    #[test]
    fn test_lr_ranks_advance_rightward() {
        let graph = laid_out("flowchart LR\n  A --> B --> C");
        assert!(graph.nodes["A"].position.x < graph.nodes["B"].position.x);
        assert!(graph.nodes["B"].position.x < graph.nodes["C"].position.x);
    }

    #[test]
    fn test_bt_reverses_vertical_order() {
        let graph = laid_out("flowchart BT\n  A --> B");
        assert!(graph.nodes["A"].position.y > graph.nodes["B"].position.y);
    }

    #[test]
    fn test_siblings_share_rank() {
        let graph = laid_out("flowchart TD\n  A --> B\n  A --> C");
        let b = &graph.nodes["B"];
        let c = &graph.nodes["C"];
        assert_eq!(b.position.y, c.position.y);
        assert_ne!(b.position.x, c.position.x);
    }

    #[test]
    fn test_diamond_join_ranks_below_both_branches() {
        let graph = laid_out("flowchart TD\n  A --> B\n  A --> C\n  B --> D\n  C --> D");
        assert!(graph.nodes["D"].position.y > graph.nodes["B"].position.y);
    }

    #[test]
    fn test_cycle_terminates_with_positive_bounds() {
        let graph = laid_out("flowchart TD\n  A --> B\n  B --> A");
        assert!(graph.layout_computed);
        assert!(graph.bounds.width() > 0.0);
        assert!(graph.bounds.height() > 0.0);
    }

    #[test]
    fn test_empty_graph_has_positive_fallback_extent() {
        let graph = laid_out("flowchart TD");
        assert!(graph.bounds.width() > 0.0);
        assert!(graph.bounds.height() > 0.0);
    }

    #[test]
    fn test_long_label_widens_node() {
        let graph = laid_out(
            "flowchart TD\n  A[tiny]\n  B[a considerably longer node label here]",
        );
        assert!(graph.nodes["B"].size.x > graph.nodes["A"].size.x);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let a = laid_out("flowchart TD\n  A --> B\n  A --> C\n  C --> D");
        let b = laid_out("flowchart TD\n  A --> B\n  A --> C\n  C --> D");
        for id in &a.order {
            assert_eq!(a.nodes[id].position, b.nodes[id].position);
        }
    }
}
