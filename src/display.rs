//! Human-readable graph dump.
//!
//! `Display` for [`Graph`] walks the node list (attributes, input and output
//! tensors, producer/consumer neighbors) and then a sorted tensor table, so
//! `format!("{graph}")` gives a complete picture of a graph under
//! construction.

use core::fmt;
use std::collections::BTreeMap;
use std::fmt::Formatter;

use crate::ir::{Argument, Attributes, Graph};

fn fmt_attrs(attrs: &Attributes) -> String {
    let mut out = String::from("{");
    for (name, value) in attrs {
        out.push_str(name);
        out.push(':');
        out.push_str(&format!("{value:?}"));
        out.push(',');
    }
    out.push('}');
    out
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "======== nodes ========")?;
        for (index, node) in self.nodes.iter().enumerate() {
            writeln!(
                f,
                "Node{index:4}: op={}, name={}, attrs={}",
                node.node_type,
                node.name,
                fmt_attrs(&node.attrs)
            )?;
            for (j, input) in node.inputs.iter().enumerate() {
                writeln!(f, "    InTensor  {j}: {input}")?;
            }
            for (j, output) in node.outputs.iter().enumerate() {
                writeln!(f, "    OutTensor {j}: {output}")?;
            }

            let mut parents: Vec<&str> = Vec::new();
            for input in &node.inputs {
                if let Some(parent) = self.producer(&input.name)
                    && !parents.contains(&parent.name.as_str())
                {
                    parents.push(&parent.name);
                }
            }
            for (j, parent) in parents.iter().enumerate() {
                writeln!(f, "    ParentNode{j}: {parent}")?;
            }

            let mut children: Vec<&str> = Vec::new();
            for output in &node.outputs {
                for child in self.consumers(&output.name) {
                    if !children.contains(&child.name.as_str()) {
                        children.push(&child.name);
                    }
                }
            }
            for (j, child) in children.iter().enumerate() {
                writeln!(f, "    ChildNode {j}: {child}")?;
            }
        }

        writeln!(f, "======== tensors ========")?;
        let mut tensors: BTreeMap<&str, &Argument> = BTreeMap::new();
        for arg in self.inputs.iter().chain(self.outputs.iter()) {
            tensors.insert(&arg.name, arg);
        }
        for node in &self.nodes {
            for arg in node.inputs.iter().chain(node.outputs.iter()) {
                tensors.insert(&arg.name, arg);
            }
        }
        for (index, (name, tensor)) in tensors.iter().enumerate() {
            writeln!(f, "Tensor{index:4}: {tensor}")?;
            if let Some(producer) = self.producer(name) {
                writeln!(f, "    FromNode: {}", producer.name)?;
            }
            for (j, consumer) in self.consumers(name).iter().enumerate() {
                writeln!(f, "    ToNode  {j}: {}", consumer.name)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dims;
    use crate::factory::{OutputSpec, add_node};
    use crate::ir::{Argument, ElementType, Graph, NodeType, attr};

    #[test]
    fn dump_lists_nodes_tensors_and_neighbors() {
        let mut graph = Graph::new();
        let x = Argument::variable("x", ElementType::Float32, dims!["B"]);
        let (t1, n) = add_node(
            &mut graph,
            NodeType::Relu,
            vec![x.clone()],
            vec![],
            OutputSpec::Single(ElementType::Float32, dims!["B"]),
            "D",
            "",
            0,
        );
        let (t2, _) = add_node(
            &mut graph,
            NodeType::Softmax,
            vec![t1.single()],
            vec![attr("axis", 1i64)],
            OutputSpec::Single(ElementType::Float32, dims!["B"]),
            "D",
            "",
            n,
        );
        graph.inputs = vec![x];
        graph.outputs = vec![t2.single()];

        let dump = graph.to_string();
        assert!(dump.contains("op=Relu, name=D-N-0-Relu"));
        assert!(dump.contains("attrs={axis:Int64(1),}"));
        assert!(dump.contains("ChildNode 0: D-N-1-Softmax"));
        assert!(dump.contains("ParentNode0: D-N-0-Relu"));
        assert!(dump.contains("x: Float32[B]"));
    }
}
