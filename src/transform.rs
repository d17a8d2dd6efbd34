//! Graph-level passes: dead-code elimination and topological sorting.
//!
//! Both mutate the node list in place and chain, so a builder can finish
//! with `graph.cleanup().toposort()` before export.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::ir::{Graph, Node};

impl Graph {
    /// The node producing `tensor_name`, if any.
    pub fn producer(&self, tensor_name: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|node| node.outputs.iter().any(|out| out.name == tensor_name))
    }

    /// All nodes consuming `tensor_name`, in node order.
    pub fn consumers(&self, tensor_name: &str) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|node| node.inputs.iter().any(|input| input.name == tensor_name))
            .collect()
    }

    /// Remove every node that is not backward-reachable from the declared
    /// outputs. Declared graph inputs are kept even when unused.
    pub fn cleanup(&mut self) -> &mut Self {
        let producer_of: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .flat_map(|(idx, node)| node.outputs.iter().map(move |out| (out.name.as_str(), idx)))
            .collect();

        let mut live: HashSet<usize> = HashSet::new();
        let mut queue: VecDeque<usize> = self
            .outputs
            .iter()
            .filter_map(|out| producer_of.get(out.name.as_str()).copied())
            .collect();

        while let Some(idx) = queue.pop_front() {
            if !live.insert(idx) {
                continue;
            }
            for input in &self.nodes[idx].inputs {
                if let Some(&src) = producer_of.get(input.name.as_str()) {
                    queue.push_back(src);
                }
            }
        }

        let before = self.nodes.len();
        let mut idx = 0;
        self.nodes.retain(|_| {
            let keep = live.contains(&idx);
            idx += 1;
            keep
        });
        if self.nodes.len() != before {
            log::debug!("cleanup removed {} dead node(s)", before - self.nodes.len());
        }
        self
    }

    /// Reorder the node list into dependency order (deterministic Kahn sort:
    /// among ready nodes, the one appended first goes first).
    ///
    /// # Panics
    /// Panics when the graph contains a cycle.
    pub fn toposort(&mut self) -> &mut Self {
        let producer_of: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .flat_map(|(idx, node)| node.outputs.iter().map(move |out| (out.name.as_str(), idx)))
            .collect();

        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        let mut indegree: Vec<usize> = vec![0; self.nodes.len()];
        for (idx, node) in self.nodes.iter().enumerate() {
            let mut sources: Vec<usize> = node
                .inputs
                .iter()
                .filter_map(|input| producer_of.get(input.name.as_str()).copied())
                .filter(|&src| src != idx)
                .collect();
            sources.sort_unstable();
            sources.dedup();
            indegree[idx] = sources.len();
            for src in sources {
                dependents[src].push(idx);
            }
        }

        let mut ready: std::collections::BinaryHeap<std::cmp::Reverse<usize>> = indegree
            .iter()
            .enumerate()
            .filter(|&(_, &deg)| deg == 0)
            .map(|(idx, _)| std::cmp::Reverse(idx))
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(std::cmp::Reverse(idx)) = ready.pop() {
            order.push(idx);
            for &next in &dependents[idx] {
                indegree[next] -= 1;
                if indegree[next] == 0 {
                    ready.push(std::cmp::Reverse(next));
                }
            }
        }
        assert_eq!(
            order.len(),
            self.nodes.len(),
            "graph contains a cycle, cannot toposort"
        );

        let mut slots: Vec<Option<Node>> = self.nodes.drain(..).map(Some).collect();
        self.nodes = order
            .into_iter()
            .map(|idx| slots[idx].take().expect("each node placed once"))
            .collect();
        self
    }
}
