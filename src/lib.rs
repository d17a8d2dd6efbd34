#![allow(clippy::upper_case_acronyms)]

//! `onnx-builder` constructs ONNX computation graphs programmatically and
//! exports them as ONNX protobuf files. It carries a small in-memory graph
//! model (nodes, value placeholders, constants, attributes), a node factory
//! that generates collision-free names from a threaded counter, graph
//! cleanup/toposort passes, output-marking surgery and a set of prebuilt
//! model graphs used as test inputs for inference-engine tooling.
//!
//! ```
//! use onnx_builder::{
//!     Argument, ElementType, Graph, NodeType, OutputSpec, add_node, attr,
//!     dims, export_model,
//! };
//!
//! let mut graph = Graph::new();
//! let x = Argument::variable("x", ElementType::Float32, dims!["B", 10]);
//! let (y, _) = add_node(
//!     &mut graph,
//!     NodeType::Softmax,
//!     vec![x.clone()],
//!     vec![attr("axis", 1i64)],
//!     OutputSpec::Single(ElementType::Float32, dims!["B", 10]),
//!     "Demo",
//!     "",
//!     0,
//! );
//! graph.inputs = vec![x];
//! graph.outputs = vec![y.single()];
//! graph.cleanup().toposort();
//! let model = export_model(&graph);
//! assert_eq!(model.graph.node.len(), 1);
//! ```

pub mod factory;
pub mod ir;
pub mod models;
pub mod proto_export;
pub mod protos;
pub mod surgery;

mod display;
mod transform;

pub use factory::{NodeOutputs, OutputSpec, add_node};
pub use ir::{
    Argument, AttributeValue, Attributes, Data, Dim, ElementType, Graph, Node, NodeType, Shape,
    TensorData, attr,
};
pub use proto_export::{ExportError, export_model, save_model};
pub use surgery::{MarkOptions, mark_graph_output};
