//! Rewriting a graph's declared outputs.
//!
//! [`mark_graph_output`] redirects the graph's output list to the tensors of
//! named nodes, typically to expose an intermediate activation for
//! inspection, then re-runs cleanup and toposort so the graph stays a valid,
//! minimal DAG.

use crate::ir::{Argument, ElementType, Graph};

/// Options for [`mark_graph_output`].
#[derive(Debug, Clone)]
pub struct MarkOptions {
    /// Append the selected output tensors of each matched node.
    pub mark_output: bool,
    /// Append the selected input tensors of each matched node.
    pub mark_input: bool,
    /// Which outputs to select. Only honored when exactly one node name was
    /// requested; otherwise all outputs are taken.
    pub output_indices: Option<Vec<usize>>,
    /// Which inputs to select, same single-name rule as `output_indices`.
    pub input_indices: Option<Vec<usize>>,
    /// Clear the graph's current output list first, cutting the graph down
    /// to the marked tensors.
    pub remove_old_output: bool,
}

impl Default for MarkOptions {
    fn default() -> Self {
        Self {
            mark_output: true,
            mark_input: false,
            output_indices: None,
            input_indices: None,
            remove_old_output: true,
        }
    }
}

/// Mark the tensors of the nodes named in `node_names` as graph outputs.
///
/// Marked *output* tensors are coerced to [`ElementType::Float32`] as a side
/// effect (on the producing node and on the appended graph output); marked
/// *input* tensors keep their type. Arguments are held by value, so the
/// coercion does not reach input copies held by consumer nodes. Afterwards
/// the graph is cleaned up and re-sorted, so nodes no longer reachable from
/// the new output set are gone.
///
/// Returns the number of node names that were *searched for*, not the number
/// actually matched. Downstream callers rely on this count, so it is kept
/// even though a match count might be expected.
pub fn mark_graph_output(graph: &mut Graph, node_names: &[&str], options: MarkOptions) -> usize {
    if options.remove_old_output {
        graph.outputs.clear();
    }

    let single_target = node_names.len() == 1;
    let mut marked: Vec<Argument> = Vec::new();

    for node in graph.nodes.iter_mut() {
        if !node_names.contains(&node.name.as_str()) {
            continue;
        }
        if options.mark_output {
            let indices: Vec<usize> = match (&options.output_indices, single_target) {
                (Some(indices), true) => indices.clone(),
                _ => (0..node.outputs.len()).collect(),
            };
            for index in indices {
                node.outputs[index].elem_type = ElementType::Float32;
                log::info!(
                    "mark node [{}] output tensor [{}]",
                    node.name,
                    node.outputs[index].name
                );
                marked.push(node.outputs[index].clone());
            }
        }
        if options.mark_input {
            let indices: Vec<usize> = match (&options.input_indices, single_target) {
                (Some(indices), true) => indices.clone(),
                _ => (0..node.inputs.len()).collect(),
            };
            for index in indices {
                log::info!(
                    "mark node [{}] input tensor [{}]",
                    node.name,
                    node.inputs[index].name
                );
                marked.push(node.inputs[index].clone());
            }
        }
    }

    graph.outputs.extend(marked);
    graph.cleanup().toposort();

    node_names.len()
}
