//! Edge-list rendering for external visualization
//!
//! The graph hands renderers a plain edge list of canonical-string pairs,
//! terminal edges included; what to draw is the renderer's decision. The DOT
//! writer here produces Graphviz input, with the conventional filter that
//! drops dead-end markers (recognizable by their zero sequence) from the
//! picture.

use std::io::{self, Write};

/// Keep only edges that touch no dead-end marker.
pub fn excludes_terminal(left: &str, right: &str) -> bool {
    !left.contains("000000") && !right.contains("000000")
}

/// Keep every edge.
pub fn include_all(_left: &str, _right: &str) -> bool {
    true
}

/// Write `edges` as a Graphviz `digraph`, keeping the edges `keep` accepts.
pub fn write_dot<W: Write>(
    out: &mut W,
    edges: &[(String, String)],
    keep: impl Fn(&str, &str) -> bool,
) -> io::Result<()> {
    writeln!(out, "digraph lineage {{")?;
    for (left, right) in edges {
        if keep(left, right) {
            writeln!(out, "    {:?} -> {:?};", left, right)?;
        }
    }
    writeln!(out, "}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges() -> Vec<(String, String)> {
        vec![
            ("K052896".to_string(), "K000000".to_string()),
            ("K173585".to_string(), "K052896".to_string()),
            ("K173585".to_string(), "K081113".to_string()),
        ]
    }

    #[test]
    fn conventional_filter_drops_terminal_edges() {
        let mut out = Vec::new();
        write_dot(&mut out, &edges(), excludes_terminal).unwrap();
        let dot = String::from_utf8(out).unwrap();
        assert_eq!(
            dot,
            "digraph lineage {\n    \"K173585\" -> \"K052896\";\n    \"K173585\" -> \"K081113\";\n}\n"
        );
    }

    #[test]
    fn permissive_filter_keeps_everything() {
        let mut out = Vec::new();
        write_dot(&mut out, &edges(), include_all).unwrap();
        let dot = String::from_utf8(out).unwrap();
        assert!(dot.contains("\"K052896\" -> \"K000000\";"));
    }
}
