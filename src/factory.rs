//! The graph node factory.
//!
//! [`add_node`] synthesizes a uniquely named node plus its output value
//! placeholders and appends the node to a graph. Name uniqueness comes from a
//! counter the caller threads through successive calls, so a whole builder
//! run needs no shared naming state.

use crate::ir::{Argument, Attributes, ElementType, Graph, Node, NodeType, Shape};

/// Output declaration for a node under construction.
#[derive(Debug, Clone)]
pub enum OutputSpec {
    /// Exactly one output with the given element type and shape.
    Single(ElementType, Shape),
    /// Several outputs, described by parallel lists of element types and
    /// shapes. The lists must have equal length.
    Multi(Vec<ElementType>, Vec<Shape>),
}

/// The value placeholders created for a node's outputs.
///
/// Mirrors the [`OutputSpec`] that requested them: a single declaration
/// yields the bare argument, parallel lists yield the ordered sequence.
#[derive(Debug, Clone)]
pub enum NodeOutputs {
    Single(Argument),
    Multi(Vec<Argument>),
}

impl NodeOutputs {
    /// Unwrap the single output.
    ///
    /// # Panics
    /// Panics when the node was declared with [`OutputSpec::Multi`].
    pub fn single(self) -> Argument {
        match self {
            NodeOutputs::Single(arg) => arg,
            NodeOutputs::Multi(args) => {
                panic!("node declared {} outputs, expected a single one", args.len())
            }
        }
    }

    /// All outputs in declaration order.
    pub fn into_vec(self) -> Vec<Argument> {
        match self {
            NodeOutputs::Single(arg) => vec![arg],
            NodeOutputs::Multi(args) => args,
        }
    }

    /// Number of outputs.
    pub fn len(&self) -> usize {
        match self {
            NodeOutputs::Single(_) => 1,
            NodeOutputs::Multi(args) => args.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Append a freshly named node to `graph` and return its output placeholders
/// together with the next counter value.
///
/// The node is named `{prefix}-N-{counter}-{op_type}`; output `i` is named
/// `{prefix}-V-{counter}-{op_type}-{i}`, with `-{suffix}` appended when
/// `suffix` is non-empty. As long as one builder run uses a fixed prefix and
/// strictly increasing counters, all generated names are pairwise distinct.
///
/// The operator type is not validated here; downstream consumers interpret
/// it. Appending the node is the only side effect.
///
/// # Panics
/// Panics before touching the graph when [`OutputSpec::Multi`] lists have
/// different lengths.
#[allow(clippy::too_many_arguments)]
pub fn add_node(
    graph: &mut Graph,
    op_type: NodeType,
    inputs: Vec<Argument>,
    attrs: Attributes,
    outputs: OutputSpec,
    prefix: &str,
    suffix: &str,
    counter: usize,
) -> (NodeOutputs, usize) {
    let (dtypes, shapes, single) = match outputs {
        OutputSpec::Single(dtype, shape) => (vec![dtype], vec![shape], true),
        OutputSpec::Multi(dtypes, shapes) => {
            assert_eq!(
                dtypes.len(),
                shapes.len(),
                "output dtype and shape lists must have equal length ({} dtypes, {} shapes)",
                dtypes.len(),
                shapes.len()
            );
            (dtypes, shapes, false)
        }
    };

    let node_name = format!("{prefix}-N-{counter}-{op_type}");

    let mut out_args = Vec::with_capacity(dtypes.len());
    for (i, (dtype, shape)) in dtypes.into_iter().zip(shapes).enumerate() {
        let mut tensor_name = format!("{prefix}-V-{counter}-{op_type}-{i}");
        if !suffix.is_empty() {
            tensor_name.push('-');
            tensor_name.push_str(suffix);
        }
        out_args.push(Argument::variable(tensor_name, dtype, shape));
    }

    log::debug!(
        "append node {node_name} ({} inputs, {} outputs)",
        inputs.len(),
        out_args.len()
    );

    graph.nodes.push(Node {
        node_type: op_type,
        name: node_name,
        inputs,
        outputs: out_args.clone(),
        attrs,
    });

    let outputs = if single {
        NodeOutputs::Single(out_args.into_iter().next().expect("one output declared"))
    } else {
        NodeOutputs::Multi(out_args)
    };
    (outputs, counter + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dims;
    use crate::ir::Dim;
    use std::collections::HashSet;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn input() -> Argument {
        Argument::variable("x", ElementType::Float32, dims!["B"])
    }

    #[test]
    fn single_output_is_unwrapped_and_ends_in_zero() {
        let mut graph = Graph::new();
        let (out, next) = add_node(
            &mut graph,
            NodeType::Relu,
            vec![input()],
            vec![],
            OutputSpec::Single(ElementType::Float32, dims!["B"]),
            "Test",
            "",
            0,
        );
        let out = out.single();
        assert_eq!(out.name, "Test-V-0-Relu-0");
        assert_eq!(next, 1);
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].name, "Test-N-0-Relu");
    }

    #[test]
    fn suffix_is_appended_after_the_index() {
        let mut graph = Graph::new();
        let (out, _) = add_node(
            &mut graph,
            NodeType::Identity,
            vec![input()],
            vec![],
            OutputSpec::Single(ElementType::Float32, dims!["B"]),
            "Test",
            "bTensor",
            3,
        );
        assert_eq!(out.single().name, "Test-V-3-Identity-0-bTensor");
    }

    #[test]
    fn multi_output_names_are_indexed_and_one_node_is_appended() {
        let mut graph = Graph::new();
        let (outs, next) = add_node(
            &mut graph,
            NodeType::Split,
            vec![input()],
            vec![],
            OutputSpec::Multi(
                vec![ElementType::Float32; 3],
                vec![dims!["B"], dims!["B"], dims!["B"]],
            ),
            "Test",
            "",
            0,
        );
        let outs = outs.into_vec();
        assert_eq!(outs.len(), 3);
        for (i, out) in outs.iter().enumerate() {
            assert_eq!(out.name, format!("Test-V-0-Split-{i}"));
        }
        assert_eq!(next, 1);
        assert_eq!(graph.nodes.len(), 1);
    }

    #[test]
    fn multi_with_one_entry_stays_a_sequence() {
        let mut graph = Graph::new();
        let (outs, _) = add_node(
            &mut graph,
            NodeType::Relu,
            vec![input()],
            vec![],
            OutputSpec::Multi(vec![ElementType::Float32], vec![dims!["B"]]),
            "Test",
            "",
            0,
        );
        assert!(matches!(outs, NodeOutputs::Multi(ref v) if v.len() == 1));
    }

    #[test]
    fn threaded_counters_never_collide() {
        let mut graph = Graph::new();
        let mut names = HashSet::new();
        let mut counter = 0;
        let mut cursor = input();
        for _ in 0..16 {
            let (out, next) = add_node(
                &mut graph,
                NodeType::Relu,
                vec![cursor],
                vec![],
                OutputSpec::Multi(
                    vec![ElementType::Float32; 2],
                    vec![dims!["B"], dims!["B"]],
                ),
                "Chain",
                "",
                counter,
            );
            counter = next;
            let mut outs = out.into_vec();
            for arg in &outs {
                assert!(names.insert(arg.name.clone()), "duplicate {}", arg.name);
            }
            cursor = outs.remove(0);
        }
        for node in &graph.nodes {
            assert!(names.insert(node.name.clone()), "duplicate {}", node.name);
        }
        assert_eq!(names.len(), 16 * 3);
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn mismatched_output_lists_panic() {
        let mut graph = Graph::new();
        add_node(
            &mut graph,
            NodeType::Split,
            vec![input()],
            vec![],
            OutputSpec::Multi(vec![ElementType::Float32; 2], vec![dims!["B"]]),
            "Test",
            "",
            0,
        );
    }

    #[test]
    fn mismatched_output_lists_leave_the_graph_untouched() {
        let mut graph = Graph::new();
        let result = catch_unwind(AssertUnwindSafe(|| {
            add_node(
                &mut graph,
                NodeType::Split,
                vec![input()],
                vec![],
                OutputSpec::Multi(vec![ElementType::Float32; 2], vec![dims!["B"]]),
                "Test",
                "",
                0,
            )
        }));
        assert!(result.is_err());
        assert!(graph.nodes.is_empty());
    }

    #[test]
    fn shapes_pass_through_verbatim() {
        let mut graph = Graph::new();
        let (out, _) = add_node(
            &mut graph,
            NodeType::Reshape,
            vec![input()],
            vec![],
            OutputSpec::Single(ElementType::Float32, dims![-1, "B", 7]),
            "Test",
            "",
            0,
        );
        assert_eq!(
            out.single().shape,
            vec![Dim::Unknown, Dim::Named("B".to_string()), Dim::Static(7)]
        );
    }
}
