//! Fuzzy node lookup using nucleo

use nucleo_matcher::{
    pattern::{AtomKind, CaseMatching, Normalization, Pattern},
    Config, Matcher, Utf32Str,
};
use wayfinder_core::Node;

fn searchable(node: &Node) -> String {
    format!("{} {} {}", node.node_code, node.name, node.building)
}

/// Nodes matching `query`, best first
pub fn rank<'a>(nodes: &'a [Node], query: &str, limit: usize) -> Vec<(&'a Node, u32)> {
    let pattern = Pattern::new(
        query,
        CaseMatching::Ignore,
        Normalization::Smart,
        AtomKind::Fuzzy,
    );
    let mut matcher = Matcher::new(Config::DEFAULT);
    let mut buf = Vec::new();

    let mut scored: Vec<(&Node, u32)> = nodes
        .iter()
        .filter_map(|node| {
            let haystack = searchable(node);
            pattern
                .score(Utf32Str::new(&haystack, &mut buf), &mut matcher)
                .map(|score| (node, score))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| a.0.node_code.cmp(&b.0.node_code))
    });
    scored.truncate(limit);
    scored
}

/// Codes of the closest matches for an unknown code
pub fn suggestions(nodes: &[Node], code: &str) -> Vec<String> {
    rank(nodes, code, 3)
        .into_iter()
        .map(|(node, _)| node.node_code.clone())
        .collect()
}
