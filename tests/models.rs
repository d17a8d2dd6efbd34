//! End-to-end checks of the prebuilt model graphs: node counts, declared
//! outputs and the round trip through serialized bytes.

use onnx_builder::models::{
    custom_op_model, half_mnist_model, invalid_model, mnist_model, redundant_model, reshape_model,
    unknown_op_model,
};
use onnx_builder::protos::onnx::{
    GraphProto, ModelProto, attribute_proto::AttributeType, tensor_proto::DataType,
    tensor_shape_proto::dimension::Value,
};
use protobuf::{Enum, Message};

fn op_types(graph: &GraphProto) -> Vec<&str> {
    graph.node.iter().map(|n| n.op_type.as_str()).collect()
}

#[test]
fn mnist_has_fifteen_nodes_with_logits_and_argmax_outputs() {
    let model = mnist_model(None).unwrap();
    let graph = model.graph.as_ref().unwrap();

    assert_eq!(graph.node.len(), 15);
    assert_eq!(
        op_types(graph),
        vec![
            "Conv", "Relu", "MaxPool", "Conv", "Relu", "MaxPool", "Transpose", "Reshape",
            "MatMul", "Add", "Relu", "MatMul", "Add", "Softmax", "ArgMax",
        ]
    );

    // outputs: pre-softmax logits, then the class index
    assert_eq!(graph.output.len(), 2);
    assert_eq!(graph.output[0].name, "MNIST-V-12-Add-0");
    assert_eq!(graph.output[1].name, "MNIST-V-14-ArgMax-0");
    let class_index = graph.output[1].type_.tensor_type();
    assert_eq!(class_index.elem_type, DataType::INT64.value());
    assert_eq!(
        class_index.shape.dim[0].value,
        Some(Value::DimParam("B".to_string()))
    );

    // 9 weight/bias/shape constants survive as initializers
    assert_eq!(graph.initializer.len(), 9);
    assert_eq!(graph.input.len(), 1);
    assert_eq!(graph.input[0].name, "tensorX");
}

#[test]
fn mnist_nodes_are_in_dependency_order() {
    let model = mnist_model(None).unwrap();
    let graph = model.graph.as_ref().unwrap();

    let mut defined: Vec<&str> = graph.input.iter().map(|i| i.name.as_str()).collect();
    defined.extend(graph.initializer.iter().map(|i| i.name.as_str()));
    for node in &graph.node {
        for input in &node.input {
            assert!(
                defined.contains(&input.as_str()),
                "node {} consumes undefined tensor {}",
                node.name,
                input
            );
        }
        defined.extend(node.output.iter().map(|o| o.as_str()));
    }
}

#[test]
fn mnist_saves_and_parses_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mnist.onnx");
    let saved = mnist_model(Some(&path)).unwrap();

    let decoded = ModelProto::parse_from_bytes(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(decoded.ir_version, saved.ir_version);
    assert_eq!(decoded.graph.node.len(), 15);
    assert_eq!(decoded.opset_import[0].version, 16);
}

#[test]
fn half_mnist_stops_after_the_second_max_pool() {
    let model = half_mnist_model(None).unwrap();
    let graph = model.graph.as_ref().unwrap();
    assert_eq!(graph.node.len(), 6);
    assert_eq!(
        op_types(graph),
        vec!["Conv", "Relu", "MaxPool", "Conv", "Relu", "MaxPool"]
    );
    assert_eq!(graph.output.len(), 1);
    assert_eq!(graph.output[0].name, "HALF_MNIST-V-5-MaxPool-0");
}

#[test]
fn custom_op_model_carries_the_scalar_attribute() {
    let model = custom_op_model(None).unwrap();
    let graph = model.graph.as_ref().unwrap();
    assert_eq!(graph.node.len(), 1);
    assert_eq!(graph.node[0].op_type, "AddScalar");
    let attr = &graph.node[0].attribute[0];
    assert_eq!(attr.name, "scalar");
    assert_eq!(attr.type_.unwrap(), AttributeType::FLOAT);
    assert_eq!(attr.f, 1.0);
}

#[test]
fn invalid_model_divides_by_a_zero_initializer() {
    let model = invalid_model(None).unwrap();
    let graph = model.graph.as_ref().unwrap();
    assert_eq!(graph.node[0].op_type, "Div");
    assert_eq!(graph.initializer.len(), 1);
    let zero = &graph.initializer[0];
    assert_eq!(zero.name, "constant0");
    assert_eq!(zero.data_type, DataType::FLOAT.value());
    assert!(zero.raw_data.iter().all(|&b| b == 0));
}

#[test]
fn redundant_model_builds_both_batch_variants() {
    for static_batch in [false, true] {
        let model = redundant_model(None, static_batch).unwrap();
        let graph = model.graph.as_ref().unwrap();
        assert_eq!(graph.node.len(), 8, "static_batch={static_batch}");
        assert_eq!(graph.output.len(), 2);

        let batch_dim = &graph.input[0].type_.tensor_type().shape.dim[0];
        if static_batch {
            assert_eq!(batch_dim.value, Some(Value::DimValue(7)));
        } else {
            assert_eq!(batch_dim.value, Some(Value::DimParam("nBS".to_string())));
        }

        // the flattened output keeps its symbolic extent in both variants
        let label = if static_batch { "7*24" } else { "nBS*24" };
        let flat_dim = &graph.output[0].type_.tensor_type().shape.dim[0];
        assert_eq!(flat_dim.value, Some(Value::DimParam(label.to_string())));
    }
}

#[test]
fn unknown_op_model_keeps_unrecognized_op_types_verbatim() {
    let model = unknown_op_model(None).unwrap();
    let graph = model.graph.as_ref().unwrap();
    assert_eq!(
        op_types(graph),
        vec!["Identity", "UnknownNode1", "Identity", "UnknownNode2", "Identity"]
    );
    assert_eq!(graph.output[0].name, "UnknownModel-V-4-Identity-0");
}

#[test]
fn reshape_model_declares_runtime_shape_input_and_plugin_attribute() {
    let model = reshape_model(None).unwrap();
    let graph = model.graph.as_ref().unwrap();

    assert_eq!(graph.input.len(), 2);
    assert_eq!(graph.input[1].name, "inputT1");
    assert_eq!(
        graph.input[1].type_.tensor_type().elem_type,
        DataType::INT32.value()
    );

    // all three input dims unknown
    let dims = &graph.input[0].type_.tensor_type().shape.dim;
    assert_eq!(dims.len(), 3);
    assert!(dims.iter().all(|d| d.value.is_none()));

    let attr = &graph.node[0].attribute[0];
    assert_eq!(attr.name, "tensorrt_plugin_shape_input_indices");
    assert_eq!(attr.type_.unwrap(), AttributeType::TENSOR);
    let tensor = attr.t.as_ref().unwrap();
    assert_eq!(tensor.data_type, DataType::INT32.value());
    assert_eq!(tensor.dims, vec![1]);
    assert_eq!(tensor.raw_data, 1i32.to_le_bytes().as_ref());
}

#[test]
fn fixture_weights_are_reproducible() {
    let a = mnist_model(None).unwrap();
    let b = mnist_model(None).unwrap();
    assert_eq!(
        a.graph.initializer[0].raw_data,
        b.graph.initializer[0].raw_data
    );
}
