use serde::Serialize;
use std::collections::HashMap;

/// What the layout engine needs to know about a node: identity and parentage
pub trait GraphNode {
    fn hash(&self) -> &str;
    fn parents(&self) -> &[String];
}

/// Column assignments for a node sequence.
///
/// `columns[i]` is the column of the i-th input node; `column_count` is
/// `1 + max(columns)` (0 for an empty graph).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLayout {
    pub columns: Vec<usize>,
    pub column_count: usize,
}

// A link in a chain under construction. Links live in a per-root arena that
// is cleared between roots, bounding memory to one chain's depth.
struct ChainLink {
    node: usize,
    parent: Option<usize>,
    size: usize,
}

// Inclusive range of traversal positions spanned by one chain
#[derive(Clone, Copy)]
struct ChainRange {
    start: usize,
    end: usize,
}

fn ranges_disjoint(r1: ChainRange, r2: ChainRange) -> bool {
    r2.end < r1.start || r1.end < r2.start
}

/// Assign each node a column such that parent-child edges can be drawn
/// without ambiguous overlap.
///
/// Nodes are grouped into maximal vertical chains by greedily attaching each
/// node to whichever unvisited parent heads the longest chain (first-seen
/// parent wins ties). Chains are then packed into columns first-fit: a chain
/// reuses the first column whose occupants' traversal-order ranges are all
/// disjoint from its own, so a lane frees up as soon as its chain has ended.
/// The result is deterministic for a fixed input order; overlap-freedom is
/// guaranteed, a minimal column count is not.
pub fn assign_columns<N: GraphNode>(nodes: &[N]) -> GraphLayout {
    let order: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.hash(), index))
        .collect();
    let unvisited_parents = |node: usize, visited: &[bool]| {
        nodes[node]
            .parents()
            .iter()
            .filter_map(|parent| order.get(parent.as_str()).copied())
            .filter(|&parent| !visited[parent])
            .collect::<Vec<usize>>()
    };

    let mut visited = vec![false; nodes.len()];
    let mut chains: Vec<(Vec<usize>, ChainRange)> = Vec::new();
    let mut links: Vec<ChainLink> = Vec::new();
    let mut memo: HashMap<usize, usize> = HashMap::new();

    for root in 0..nodes.len() {
        if visited[root] {
            continue;
        }

        // Chain formation: a depth-first walk with an explicit work stack,
        // memoizing the longest chain reachable from each node
        let mut stack = vec![root];
        while let Some(&node) = stack.last() {
            if memo.contains_key(&node) {
                stack.pop();
                continue;
            }
            let parents = unvisited_parents(node, &visited);
            let pending: Vec<usize> = parents
                .iter()
                .copied()
                .filter(|parent| !memo.contains_key(parent))
                .collect();
            if !pending.is_empty() {
                stack.extend(pending);
                continue;
            }

            let mut best: Option<usize> = None;
            for parent in parents {
                let link = memo[&parent];
                let best_size = best.map_or(0, |b| links[b].size);
                if links[link].size > best_size {
                    best = Some(link);
                }
            }
            let size = best.map_or(0, |b| links[b].size) + 1;
            links.push(ChainLink { node, parent: best, size });
            memo.insert(node, links.len() - 1);
            stack.pop();
        }

        // Linearize the chain and compute its traversal-order range
        let mut chain_nodes = Vec::new();
        let mut range = ChainRange { start: usize::MAX, end: 0 };
        let mut current = Some(memo[&root]);
        while let Some(link) = current {
            let node = links[link].node;
            range.start = range.start.min(node);
            range.end = range.end.max(node);
            chain_nodes.push(node);
            visited[node] = true;
            current = links[link].parent;
        }
        chains.push((chain_nodes, range));

        memo.clear();
        links.clear();
    }

    // Column packing: first fitting column without range overlap
    let mut columns = vec![0; nodes.len()];
    let mut placed: Vec<Vec<ChainRange>> = Vec::new();
    for (chain_nodes, range) in chains {
        let column = placed
            .iter()
            .position(|ranges| ranges.iter().all(|&r| ranges_disjoint(range, r)));
        let column = match column {
            Some(column) => {
                placed[column].push(range);
                column
            }
            None => {
                placed.push(vec![range]);
                placed.len() - 1
            }
        };
        for node in chain_nodes {
            columns[node] = column;
        }
    }

    GraphLayout {
        columns,
        column_count: placed.len(),
    }
}
