//! Conversion of the in-memory [`Graph`] into the ONNX interchange format,
//! plus saving the result to disk.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use protobuf::{Enum, EnumOrUnknown, Message, MessageField};

use crate::ir::{Argument, AttributeValue, Data, Dim, ElementType, Graph, TensorData};
use crate::protos::onnx::{
    AttributeProto, GraphProto, ModelProto, NodeProto, OperatorSetIdProto, TensorProto,
    TensorShapeProto, TypeProto, ValueInfoProto, attribute_proto::AttributeType,
    tensor_proto::DataType, tensor_shape_proto, tensor_shape_proto::dimension::Value, type_proto,
};

/// Operator set version stamped on exported models.
pub const OPSET_VERSION: i64 = 16;

/// ONNX IR version stamped on exported models.
pub const IR_VERSION: i64 = 8;

/// Error raised when an exported model cannot be written.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protobuf error: {0}")]
    Protobuf(#[from] protobuf::Error),
}

/// Map an element type to the wire-format data type code.
fn data_type_code(elem: ElementType) -> i32 {
    let dt = match elem {
        ElementType::Float32 => DataType::FLOAT,
        ElementType::Float64 => DataType::DOUBLE,
        ElementType::Float16 => DataType::FLOAT16,
        ElementType::Int32 => DataType::INT32,
        ElementType::Int64 => DataType::INT64,
        ElementType::Int8 => DataType::INT8,
        ElementType::Uint8 => DataType::UINT8,
        ElementType::Uint16 => DataType::UINT16,
        ElementType::Bool => DataType::BOOL,
        ElementType::String => DataType::STRING,
    };
    dt.value()
}

fn vec_to_bytes<T: bytemuck::Pod>(data: &[T]) -> bytes::Bytes {
    bytes::Bytes::copy_from_slice(bytemuck::cast_slice(data))
}

/// Raw little-endian payload for a tensor buffer.
fn raw_bytes(data: &Data) -> bytes::Bytes {
    match data {
        Data::Float16(v) => vec_to_bytes(v),
        Data::Float32(v) => vec_to_bytes(v),
        Data::Float64(v) => vec_to_bytes(v),
        Data::Int32(v) => vec_to_bytes(v),
        Data::Int64(v) => vec_to_bytes(v),
        Data::Uint8(v) => bytes::Bytes::copy_from_slice(v),
        Data::Bool(v) => {
            let raw: Vec<u8> = v.iter().map(|&b| b as u8).collect();
            bytes::Bytes::from(raw)
        }
    }
}

fn tensor_proto(name: &str, tensor: &TensorData) -> TensorProto {
    let mut proto = TensorProto::new();
    proto.name = name.to_string();
    proto.dims = tensor.shape.iter().map(|&d| d as i64).collect();
    proto.data_type = data_type_code(tensor.elem_type());
    proto.raw_data = raw_bytes(&tensor.data);
    proto
}

fn dimension(dim: &Dim) -> tensor_shape_proto::Dimension {
    let mut proto = tensor_shape_proto::Dimension::new();
    proto.value = match dim {
        Dim::Static(n) => Some(Value::DimValue(*n as i64)),
        Dim::Named(s) => Some(Value::DimParam(s.clone())),
        // unknown extent: dimension present, value absent
        Dim::Unknown => None,
    };
    proto
}

fn value_info(arg: &Argument) -> ValueInfoProto {
    let mut shape = TensorShapeProto::new();
    shape.dim = arg.shape.iter().map(dimension).collect();

    let mut tensor_type = type_proto::Tensor::new();
    tensor_type.elem_type = data_type_code(arg.elem_type);
    tensor_type.shape = MessageField::some(shape);

    let mut ty = TypeProto::new();
    ty.value = Some(type_proto::Value::TensorType(tensor_type));

    let mut proto = ValueInfoProto::new();
    proto.name = arg.name.clone();
    proto.type_ = MessageField::some(ty);
    proto
}

fn attribute_proto(name: &str, value: &AttributeValue) -> AttributeProto {
    let mut proto = AttributeProto::new();
    proto.name = name.to_string();
    match value {
        AttributeValue::Float32(f) => {
            proto.f = *f;
            proto.type_ = EnumOrUnknown::new(AttributeType::FLOAT);
        }
        AttributeValue::Float32s(floats) => {
            proto.floats = floats.clone();
            proto.type_ = EnumOrUnknown::new(AttributeType::FLOATS);
        }
        AttributeValue::Int64(i) => {
            proto.i = *i;
            proto.type_ = EnumOrUnknown::new(AttributeType::INT);
        }
        AttributeValue::Int64s(ints) => {
            proto.ints = ints.clone();
            proto.type_ = EnumOrUnknown::new(AttributeType::INTS);
        }
        AttributeValue::String(s) => {
            proto.s = bytes::Bytes::copy_from_slice(s.as_bytes());
            proto.type_ = EnumOrUnknown::new(AttributeType::STRING);
        }
        AttributeValue::Strings(strings) => {
            proto.strings = strings
                .iter()
                .map(|s| bytes::Bytes::copy_from_slice(s.as_bytes()))
                .collect();
            proto.type_ = EnumOrUnknown::new(AttributeType::STRINGS);
        }
        AttributeValue::Tensor(tensor) => {
            proto.t = MessageField::some(tensor_proto("", tensor));
            proto.type_ = EnumOrUnknown::new(AttributeType::TENSOR);
        }
        AttributeValue::Tensors(tensors) => {
            proto.tensors = tensors.iter().map(|t| tensor_proto("", t)).collect();
            proto.type_ = EnumOrUnknown::new(AttributeType::TENSORS);
        }
    }
    proto
}

/// Convert a graph into an ONNX `ModelProto`.
///
/// Constants encountered as node inputs become graph initializers (deduped
/// by name); intermediate node outputs that are not declared graph outputs
/// are exported as `value_info` entries so their declared types survive the
/// round trip.
pub fn export_model(graph: &Graph) -> ModelProto {
    let mut graph_proto = GraphProto::new();
    graph_proto.name = "graph".to_string();

    let mut seen_constants: HashSet<&str> = HashSet::new();
    for node in &graph.nodes {
        for input in &node.inputs {
            if let Some(data) = &input.data
                && seen_constants.insert(input.name.as_str())
            {
                graph_proto.initializer.push(tensor_proto(&input.name, data));
            }
        }
    }

    for node in &graph.nodes {
        let mut node_proto = NodeProto::new();
        node_proto.name = node.name.clone();
        node_proto.op_type = node.node_type.to_string();
        node_proto.input = node.inputs.iter().map(|arg| arg.name.clone()).collect();
        node_proto.output = node.outputs.iter().map(|arg| arg.name.clone()).collect();
        node_proto.attribute = node
            .attrs
            .iter()
            .map(|(name, value)| attribute_proto(name, value))
            .collect();
        graph_proto.node.push(node_proto);
    }

    graph_proto.input = graph.inputs.iter().map(value_info).collect();
    graph_proto.output = graph.outputs.iter().map(value_info).collect();

    let output_names: HashSet<&str> = graph.outputs.iter().map(|o| o.name.as_str()).collect();
    for node in &graph.nodes {
        for out in &node.outputs {
            if !output_names.contains(out.name.as_str()) {
                graph_proto.value_info.push(value_info(out));
            }
        }
    }

    let mut opset = OperatorSetIdProto::new();
    opset.domain = String::new();
    opset.version = OPSET_VERSION;

    let mut model = ModelProto::new();
    model.ir_version = IR_VERSION;
    model.producer_name = env!("CARGO_PKG_NAME").to_string();
    model.producer_version = env!("CARGO_PKG_VERSION").to_string();
    model.opset_import.push(opset);
    model.graph = MessageField::some(graph_proto);
    model
}

/// Serialize a model and write it to `path`.
pub fn save_model(model: &ModelProto, path: &Path) -> Result<(), ExportError> {
    let encoded = model.write_to_bytes()?;
    fs::write(path, encoded)?;
    log::info!("saved ONNX model to {}", path.display());
    Ok(())
}
