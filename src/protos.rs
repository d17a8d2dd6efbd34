//! Generated ONNX protobuf bindings.
//!
//! The bindings are produced at build time by `build.rs` from
//! `src/protos/onnx.proto`. The generated `mod.rs` declares `pub mod onnx`,
//! which rustc resolves relative to the included file.

include!(concat!(env!("OUT_DIR"), "/onnx-protos/mod.rs"));
