//! Mermaid flowchart parser.
//!
//! Line-oriented parser for the flowchart subset the completion backend is
//! instructed to produce. It builds the graph structures for layout and
//! painting; it does not validate diagram semantics beyond a successful
//! parse. Styling statements (classDef, style, linkStyle, click) are
//! accepted and ignored.

use super::graph::{EdgeKind, FlowDirection, FlowEdge, FlowGraph, FlowNode, NodeShape, Subgraph};
use thiserror::Error;

/// Parse Mermaid flowchart source into a graph.
pub fn parse_string(source: &str) -> Result<FlowGraph, ParseError> {
    let mut parser = MermaidParser::new(source);
    parser.parse()
}

#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("expected a 'flowchart' or 'graph' header")]
    MissingHeader,

    #[error("syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },
}

impl ParseError {
    fn syntax(line: usize, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Statement prefixes accepted and skipped without interpretation.
const IGNORED_PREFIXES: &[&str] = &[
    "classDef ",
    "class ",
    "style ",
    "linkStyle ",
    "click ",
    "direction ",
];

struct MermaidParser<'a> {
    lines: Vec<&'a str>,
    graph: FlowGraph,
    subgraph_stack: Vec<usize>,
    header_seen: bool,
}

impl<'a> MermaidParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines().collect(),
            graph: FlowGraph::default(),
            subgraph_stack: Vec::new(),
            header_seen: false,
        }
    }

    fn parse(&mut self) -> Result<FlowGraph, ParseError> {
        for idx in 0..self.lines.len() {
            let line_no = idx + 1;
            let line = self.lines[idx].trim().trim_end_matches(';').trim_end();

            if line.is_empty() || line.starts_with("%%") {
                continue;
            }

            if !self.header_seen {
                self.parse_header(line, line_no)?;
                continue;
            }

            self.parse_line(line, line_no)?;
        }

        if !self.header_seen {
            return Err(ParseError::MissingHeader);
        }
        if let Some(idx) = self.subgraph_stack.last() {
            let line = self.lines.len();
            let label = self.graph.subgraphs[*idx].label.clone();
            return Err(ParseError::syntax(
                line,
                format!("subgraph '{}' is never closed", label),
            ));
        }

        Ok(std::mem::take(&mut self.graph))
    }

    fn parse_header(&mut self, line: &str, line_no: usize) -> Result<(), ParseError> {
        let rest = line
            .strip_prefix("flowchart")
            .or_else(|| line.strip_prefix("graph"))
            .ok_or(ParseError::MissingHeader)?;

        let rest = rest.trim();
        let direction = if rest.is_empty() {
            FlowDirection::default()
        } else {
            FlowDirection::parse(rest)
                .ok_or_else(|| ParseError::syntax(line_no, format!("unknown direction '{rest}'")))?
        };

        self.graph.direction = direction;
        self.header_seen = true;
        Ok(())
    }

    fn parse_line(&mut self, line: &str, line_no: usize) -> Result<(), ParseError> {
        if line == "end" {
            return match self.subgraph_stack.pop() {
                Some(_) => Ok(()),
                None => Err(ParseError::syntax(line_no, "'end' without a subgraph")),
            };
        }

        if let Some(rest) = line.strip_prefix("subgraph") {
            return self.open_subgraph(rest.trim(), line_no);
        }

        if IGNORED_PREFIXES.iter().any(|p| line.starts_with(p)) {
            return Ok(());
        }

        self.parse_statement(line, line_no)
    }

    fn open_subgraph(&mut self, rest: &str, line_no: usize) -> Result<(), ParseError> {
        if rest.is_empty() {
            return Err(ParseError::syntax(line_no, "subgraph is missing a name"));
        }
        // Both `subgraph Title` and `subgraph id [Title]` occur.
        let label = match (rest.find('['), rest.rfind(']')) {
            (Some(open), Some(close)) if close > open => unquote(&rest[open + 1..close]),
            _ => unquote(rest),
        };
        self.graph.subgraphs.push(Subgraph {
            label,
            members: Vec::new(),
        });
        self.subgraph_stack.push(self.graph.subgraphs.len() - 1);
        Ok(())
    }

    /// A statement is one or more node groups joined by edge operators:
    /// `A[Start] --> B{Choice} -->|yes| C & D`.
    fn parse_statement(&mut self, line: &str, line_no: usize) -> Result<(), ParseError> {
        let (mut from_group, mut rest) = self.parse_node_group(line, line_no)?;

        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                return Ok(());
            }

            let (kind, label, after_op) = parse_edge_op(rest)
                .ok_or_else(|| ParseError::syntax(line_no, format!("unexpected input '{rest}'")))?;

            let (to_group, after_nodes) = self.parse_node_group(after_op, line_no)?;

            for from in &from_group {
                for to in &to_group {
                    self.graph.add_edge(FlowEdge {
                        from: from.clone(),
                        to: to.clone(),
                        label: label.clone(),
                        kind,
                    });
                }
            }

            from_group = to_group;
            rest = after_nodes;
        }
    }

    /// One or more `&`-joined node terms. Returns the node ids and the
    /// unconsumed remainder of the line.
    fn parse_node_group<'b>(
        &mut self,
        input: &'b str,
        line_no: usize,
    ) -> Result<(Vec<String>, &'b str), ParseError> {
        let mut ids = Vec::new();
        let mut rest = input;

        loop {
            let (node, after) = parse_node_term(rest, line_no)?;
            ids.push(node.id.clone());
            self.insert_node(node);

            let trimmed = after.trim_start();
            match trimmed.strip_prefix('&') {
                Some(after_amp) => rest = after_amp,
                None => return Ok((ids, after)),
            }
        }
    }

    fn insert_node(&mut self, mut node: FlowNode) {
        if let Some(&idx) = self.subgraph_stack.last() {
            node.subgraph = Some(idx);
        }
        let is_new = !self.graph.nodes.contains_key(&node.id);
        let id = node.id.clone();
        let subgraph = node.subgraph;
        self.graph.upsert_node(node);
        if is_new {
            if let Some(idx) = subgraph {
                self.graph.subgraphs[idx].members.push(id);
            }
        }
    }

}

/// Shape delimiters, multi-character openers first so `((` is not read as
/// `(`.
const SHAPE_DELIMITERS: &[(&str, &str, NodeShape)] = &[
    ("([", "])", NodeShape::Stadium),
    ("[[", "]]", NodeShape::Subroutine),
    ("[(", ")]", NodeShape::Cylinder),
    ("((", "))", NodeShape::Circle),
    ("{{", "}}", NodeShape::Hexagon),
    ("[", "]", NodeShape::Rectangle),
    ("(", ")", NodeShape::Rounded),
    ("{", "}", NodeShape::Diamond),
    (">", "]", NodeShape::Asymmetric),
];

fn parse_node_term(input: &str, line_no: usize) -> Result<(FlowNode, &str), ParseError> {
    let input = input.trim_start();

    let id_len = input
        .find(|c: char| !c.is_alphanumeric() && c != '_')
        .unwrap_or(input.len());
    if id_len == 0 {
        return Err(ParseError::syntax(
            line_no,
            format!("expected a node identifier at '{input}'"),
        ));
    }
    let id = &input[..id_len];
    let rest = &input[id_len..];

    for (open, close, shape) in SHAPE_DELIMITERS {
        if let Some(after_open) = rest.strip_prefix(open) {
            let close_at = after_open.find(close).ok_or_else(|| {
                ParseError::syntax(line_no, format!("unclosed '{open}' on node '{id}'"))
            })?;
            let label = unquote(after_open[..close_at].trim());
            let remaining = &after_open[close_at + close.len()..];
            return Ok((FlowNode::new(id, label, *shape), remaining));
        }
    }

    Ok((FlowNode::new(id, id, NodeShape::Rectangle), rest))
}

/// Match an edge operator, including the inline-text forms `-- label -->`
/// and the `|label|` suffix. Returns kind, label, remainder.
fn parse_edge_op(input: &str) -> Option<(EdgeKind, Option<String>, &str)> {
    let input = input.trim_start();

    let (kind, mut label, rest) = if let Some(rest) = input.strip_prefix("-.->") {
        (EdgeKind::Dotted, None, rest)
    } else if let Some(rest) = input.strip_prefix("==>") {
        (EdgeKind::Thick, None, rest)
    } else if let Some(rest) = input.strip_prefix("-->") {
        (EdgeKind::Arrow, None, rest)
    } else if let Some(rest) = input.strip_prefix("---") {
        (EdgeKind::Open, None, rest)
    } else if let Some(rest) = input.strip_prefix("-.") {
        // `-. label .->`
        let end = rest.find(".->")?;
        let label = unquote(rest[..end].trim());
        (EdgeKind::Dotted, Some(label), &rest[end + 3..])
    } else if let Some(rest) = input.strip_prefix("==") {
        // `== label ==>`
        let end = rest.find("==>")?;
        let label = unquote(rest[..end].trim());
        (EdgeKind::Thick, Some(label), &rest[end + 3..])
    } else if let Some(rest) = input.strip_prefix("--") {
        // `-- label -->`
        let end = rest.find("-->")?;
        let label = unquote(rest[..end].trim());
        (EdgeKind::Arrow, Some(label), &rest[end + 3..])
    } else {
        return None;
    };

    // `|label|` after the operator wins over any inline text.
    let mut remaining = rest.trim_start();
    if let Some(after_pipe) = remaining.strip_prefix('|') {
        if let Some(close) = after_pipe.find('|') {
            label = Some(unquote(after_pipe[..close].trim()));
            remaining = &after_pipe[close + 1..];
        }
    }

    let label = label.filter(|l| !l.is_empty());
    Some((kind, label, remaining))
}

/// Strip one layer of matching quotes.
fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_flowchart() {
        let graph = parse_string("flowchart TD\n  A[Start] --> B{Choice}\n  B -->|yes| C[Done]")
            .unwrap();
        assert_eq!(graph.direction, FlowDirection::Down);
        assert_eq!(graph.order, vec!["A", "B", "C"]);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.nodes["A"].shape, NodeShape::Rectangle);
        assert_eq!(graph.nodes["B"].shape, NodeShape::Diamond);
        assert_eq!(graph.edges[1].label.as_deref(), Some("yes"));
    }

    #[test]
    fn test_graph_header_and_no_spaces() {
        let graph = parse_string("graph LR\nA-->B-->C").unwrap();
        assert_eq!(graph.direction, FlowDirection::Right);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[0].from, "A");
        assert_eq!(graph.edges[1].to, "C");
    }

    #[test]
    fn test_missing_header_is_error() {
        assert!(matches!(
            parse_string("A --> B"),
            Err(ParseError::MissingHeader)
        ));
    }

    #[test]
    fn test_unknown_direction_is_error() {
        assert!(matches!(
            parse_string("flowchart XY\nA --> B"),
            Err(ParseError::Syntax { line: 1, .. })
        ));
    }

    #[test]
    fn test_all_shapes() {
        let source = "flowchart TD
  a[rect]
  b(round)
  c([stadium])
  d[[subroutine]]
  e[(cylinder)]
  f((circle))
  g{diamond}
  h{{hexagon}}
  i>flag]";
        let graph = parse_string(source).unwrap();
        let shape = |id: &str| graph.nodes[id].shape;
        assert_eq!(shape("a"), NodeShape::Rectangle);
        assert_eq!(shape("b"), NodeShape::Rounded);
        assert_eq!(shape("c"), NodeShape::Stadium);
        assert_eq!(shape("d"), NodeShape::Subroutine);
        assert_eq!(shape("e"), NodeShape::Cylinder);
        assert_eq!(shape("f"), NodeShape::Circle);
        assert_eq!(shape("g"), NodeShape::Diamond);
        assert_eq!(shape("h"), NodeShape::Hexagon);
        assert_eq!(shape("i"), NodeShape::Asymmetric);
    }

    #[test]
    fn test_quoted_label_unquoted() {
        let graph = parse_string("flowchart TD\n  A[\"Start here\"] --> B").unwrap();
        assert_eq!(graph.nodes["A"].label, "Start here");
    }

    #[test]
    fn test_inline_edge_text_forms() {
        let graph = parse_string(
            "flowchart TD\n  A -- calls --> B\n  B -. async .-> C\n  C == bulk ==> D",
        )
        .unwrap();
        assert_eq!(graph.edges[0].label.as_deref(), Some("calls"));
        assert_eq!(graph.edges[0].kind, EdgeKind::Arrow);
        assert_eq!(graph.edges[1].label.as_deref(), Some("async"));
        assert_eq!(graph.edges[1].kind, EdgeKind::Dotted);
        assert_eq!(graph.edges[2].label.as_deref(), Some("bulk"));
        assert_eq!(graph.edges[2].kind, EdgeKind::Thick);
    }

    #[test]
    fn test_open_and_dotted_operators() {
        let graph = parse_string("flowchart TD\n  A --- B\n  B -.-> C").unwrap();
        assert_eq!(graph.edges[0].kind, EdgeKind::Open);
        assert_eq!(graph.edges[1].kind, EdgeKind::Dotted);
    }

    #[test]
    fn test_ampersand_fanout() {
        let graph = parse_string("flowchart TD\n  A & B --> C & D").unwrap();
        assert_eq!(graph.edges.len(), 4);
        let pairs: Vec<(&str, &str)> = graph
            .edges
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect();
        assert!(pairs.contains(&("A", "C")));
        assert!(pairs.contains(&("B", "D")));
    }

    #[test]
    fn test_subgraph_membership() {
        let source = "flowchart TD
  subgraph Backend
    api[API] --> db[(DB)]
  end
  ui --> api";
        let graph = parse_string(source).unwrap();
        assert_eq!(graph.subgraphs.len(), 1);
        assert_eq!(graph.subgraphs[0].label, "Backend");
        assert_eq!(graph.subgraphs[0].members, vec!["api", "db"]);
        assert_eq!(graph.nodes["ui"].subgraph, None);
    }

    #[test]
    fn test_subgraph_with_bracket_title() {
        let graph = parse_string("flowchart TD\n  subgraph s1 [Data Layer]\n  a\n  end").unwrap();
        assert_eq!(graph.subgraphs[0].label, "Data Layer");
    }

    #[test]
    fn test_unclosed_subgraph_is_error() {
        assert!(parse_string("flowchart TD\n  subgraph S\n  a --> b").is_err());
    }

    #[test]
    fn test_stray_end_is_error() {
        assert!(parse_string("flowchart TD\n  end").is_err());
    }

    #[test]
    fn test_comments_and_style_lines_skipped() {
        let source = "flowchart TD
  %% a comment
  A --> B
  classDef hot fill:#f96
  class A hot
  style B stroke:#333
  linkStyle 0 stroke:red
  click A href \"https://example.com\"";
        let graph = parse_string(source).unwrap();
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.order.len(), 2);
    }

    #[test]
    fn test_unclosed_bracket_is_error() {
        assert!(matches!(
            parse_string("flowchart TD\n  A[Start --> B"),
            Err(ParseError::Syntax { line: 2, .. })
        ));
    }

    #[test]
    fn test_garbage_after_node_is_error() {
        assert!(parse_string("flowchart TD\n  A[ok] ???").is_err());
    }

    #[test]
    fn test_trailing_semicolons_accepted() {
        let graph = parse_string("graph TD;\n  A-->B;").unwrap();
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn test_empty_edge_label_dropped() {
        let graph = parse_string("flowchart TD\n  A -->|| B").unwrap();
        assert_eq!(graph.edges[0].label, None);
    }
}
