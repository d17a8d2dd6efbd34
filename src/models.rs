//! Prebuilt model graphs.
//!
//! Each function assembles one fixed topology through repeated
//! [`add_node`](crate::factory::add_node) calls, exports it to a
//! [`ModelProto`] and optionally saves it to disk. The models are consumed
//! by inference-engine test harnesses; some are deliberately invalid or use
//! unrecognized operators to exercise a validator's error paths.

use std::path::Path;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::dims;
use crate::factory::{OutputSpec, add_node};
use crate::ir::{Argument, Data, Dim, ElementType, Graph, NodeType, TensorData, attr};
use crate::proto_export::{ExportError, export_model, save_model};
use crate::protos::onnx::ModelProto;

/// Constant with uniform values in `[-1, 1)`.
fn uniform_constant(name: &str, shape: &[usize], rng: &mut StdRng) -> Argument {
    let count: usize = shape.iter().product();
    let values: Vec<f32> = (0..count).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect();
    Argument::constant(name, TensorData::new(Data::Float32(values), shape.to_vec()))
}

fn finish(
    graph: &mut Graph,
    export_path: Option<&Path>,
) -> Result<ModelProto, ExportError> {
    graph.cleanup().toposort();
    let model = export_model(graph);
    if let Some(path) = export_path {
        save_model(&model, path)?;
    }
    Ok(model)
}

/// Two-convolution / two-max-pool MNIST classifier (15 nodes). Outputs are
/// the pre-softmax logits and the ArgMax class index.
pub fn mnist_model(export_path: Option<&Path>) -> Result<ModelProto, ExportError> {
    let mut graph = Graph::new();
    let mut rng = StdRng::seed_from_u64(0);

    let x = Argument::variable("tensorX", ElementType::Float32, dims!["B", 1, 28, 28]);
    let conv1_weight = uniform_constant("constant32x1x5x5", &[32, 1, 5, 5], &mut rng);
    let conv1_bias = uniform_constant("constant32", &[32], &mut rng);
    let conv2_weight = uniform_constant("constant64x32x5x5", &[64, 32, 5, 5], &mut rng);
    let conv2_bias = uniform_constant("constant64", &[64], &mut rng);
    let reshape_shape = Argument::constant(
        "constantM1Comma3136",
        TensorData::int64(vec![-1, 7 * 7 * 64]),
    );
    let fc1_weight = uniform_constant("constant3136x1024", &[3136, 1024], &mut rng);
    let fc1_bias = uniform_constant("constant1024", &[1024], &mut rng);
    let fc2_weight = uniform_constant("constant1024x10", &[1024, 10], &mut rng);
    let fc2_bias = uniform_constant("constant10", &[10], &mut rng);

    let scope = "MNIST";
    let n = 0;

    let (t1, n) = add_node(
        &mut graph,
        NodeType::Conv,
        vec![x.clone(), conv1_weight, conv1_bias],
        vec![attr("kernel_shape", vec![5i64, 5]), attr("pads", vec![2i64, 2, 2, 2])],
        OutputSpec::Single(ElementType::Float32, dims!["B", 32, 28, 28]),
        scope,
        "",
        n,
    );
    let (t2, n) = add_node(
        &mut graph,
        NodeType::Relu,
        vec![t1.single()],
        vec![],
        OutputSpec::Single(ElementType::Float32, dims!["B", 32, 28, 28]),
        scope,
        "",
        n,
    );
    let (t3, n) = add_node(
        &mut graph,
        NodeType::MaxPool,
        vec![t2.single()],
        vec![
            attr("kernel_shape", vec![2i64, 2]),
            attr("pads", vec![0i64, 0, 0, 0]),
            attr("strides", vec![2i64, 2]),
        ],
        OutputSpec::Single(ElementType::Float32, dims!["B", 32, 14, 14]),
        scope,
        "",
        n,
    );
    let (t4, n) = add_node(
        &mut graph,
        NodeType::Conv,
        vec![t3.single(), conv2_weight, conv2_bias],
        vec![attr("kernel_shape", vec![5i64, 5]), attr("pads", vec![2i64, 2, 2, 2])],
        OutputSpec::Single(ElementType::Float32, dims!["B", 64, 14, 14]),
        scope,
        "",
        n,
    );
    let (t5, n) = add_node(
        &mut graph,
        NodeType::Relu,
        vec![t4.single()],
        vec![],
        OutputSpec::Single(ElementType::Float32, dims!["B", 64, 14, 14]),
        scope,
        "",
        n,
    );
    let (t6, n) = add_node(
        &mut graph,
        NodeType::MaxPool,
        vec![t5.single()],
        vec![
            attr("kernel_shape", vec![2i64, 2]),
            attr("pads", vec![0i64, 0, 0, 0]),
            attr("strides", vec![2i64, 2]),
        ],
        OutputSpec::Single(ElementType::Float32, dims!["B", 64, 7, 7]),
        scope,
        "",
        n,
    );
    let (t7, n) = add_node(
        &mut graph,
        NodeType::Transpose,
        vec![t6.single()],
        vec![attr("perm", vec![0i64, 2, 3, 1])],
        OutputSpec::Single(ElementType::Float32, dims!["B", 7, 7, 64]),
        scope,
        "",
        n,
    );
    let (t8, n) = add_node(
        &mut graph,
        NodeType::Reshape,
        vec![t7.single(), reshape_shape],
        vec![],
        OutputSpec::Single(ElementType::Float32, dims!["B", 3136]),
        scope,
        "",
        n,
    );
    let (t9, n) = add_node(
        &mut graph,
        NodeType::MatMul,
        vec![t8.single(), fc1_weight],
        vec![],
        OutputSpec::Single(ElementType::Float32, dims!["B", 1024]),
        scope,
        "",
        n,
    );
    let (t10, n) = add_node(
        &mut graph,
        NodeType::Add,
        vec![t9.single(), fc1_bias],
        vec![],
        OutputSpec::Single(ElementType::Float32, dims!["B", 1024]),
        scope,
        "",
        n,
    );
    let (t11, n) = add_node(
        &mut graph,
        NodeType::Relu,
        vec![t10.single()],
        vec![],
        OutputSpec::Single(ElementType::Float32, dims!["B", 1024]),
        scope,
        "",
        n,
    );
    let (t12, n) = add_node(
        &mut graph,
        NodeType::MatMul,
        vec![t11.single(), fc2_weight],
        vec![],
        OutputSpec::Single(ElementType::Float32, dims!["B", 10]),
        scope,
        "",
        n,
    );
    let (t13, n) = add_node(
        &mut graph,
        NodeType::Add,
        vec![t12.single(), fc2_bias],
        vec![],
        OutputSpec::Single(ElementType::Float32, dims!["B", 10]),
        scope,
        "",
        n,
    );
    let t13 = t13.single();
    let (t14, n) = add_node(
        &mut graph,
        NodeType::Softmax,
        vec![t13.clone()],
        vec![attr("axis", 1i64)],
        OutputSpec::Single(ElementType::Float32, dims!["B", 10]),
        scope,
        "",
        n,
    );
    let (t15, _) = add_node(
        &mut graph,
        NodeType::ArgMax,
        vec![t14.single()],
        vec![attr("axis", 1i64), attr("keepdims", 0i64)],
        OutputSpec::Single(ElementType::Int64, dims!["B"]),
        scope,
        "",
        n,
    );

    graph.inputs = vec![x];
    graph.outputs = vec![t13, t15.single()];
    finish(&mut graph, export_path)
}

/// The front half of the MNIST classifier, ending after the second max pool.
pub fn half_mnist_model(export_path: Option<&Path>) -> Result<ModelProto, ExportError> {
    let mut graph = Graph::new();
    let mut rng = StdRng::seed_from_u64(0);

    let x = Argument::variable("tensorX", ElementType::Float32, dims!["B", 1, 28, 28]);
    let conv1_weight = uniform_constant("constant32x1x5x5", &[32, 1, 5, 5], &mut rng);
    let conv1_bias = uniform_constant("constant32", &[32], &mut rng);
    let conv2_weight = uniform_constant("constant64x32x5x5", &[64, 32, 5, 5], &mut rng);
    let conv2_bias = uniform_constant("constant64", &[64], &mut rng);

    let scope = "HALF_MNIST";
    let n = 0;

    let (t1, n) = add_node(
        &mut graph,
        NodeType::Conv,
        vec![x.clone(), conv1_weight, conv1_bias],
        vec![attr("kernel_shape", vec![5i64, 5]), attr("pads", vec![2i64, 2, 2, 2])],
        OutputSpec::Single(ElementType::Float32, dims!["B", 32, 28, 28]),
        scope,
        "",
        n,
    );
    let (t2, n) = add_node(
        &mut graph,
        NodeType::Relu,
        vec![t1.single()],
        vec![],
        OutputSpec::Single(ElementType::Float32, dims!["B", 32, 28, 28]),
        scope,
        "",
        n,
    );
    let (t3, n) = add_node(
        &mut graph,
        NodeType::MaxPool,
        vec![t2.single()],
        vec![
            attr("kernel_shape", vec![2i64, 2]),
            attr("pads", vec![0i64, 0, 0, 0]),
            attr("strides", vec![2i64, 2]),
        ],
        OutputSpec::Single(ElementType::Float32, dims!["B", 32, 14, 14]),
        scope,
        "",
        n,
    );
    let (t4, n) = add_node(
        &mut graph,
        NodeType::Conv,
        vec![t3.single(), conv2_weight, conv2_bias],
        vec![attr("kernel_shape", vec![5i64, 5]), attr("pads", vec![2i64, 2, 2, 2])],
        OutputSpec::Single(ElementType::Float32, dims!["B", 64, 14, 14]),
        scope,
        "",
        n,
    );
    let (t5, n) = add_node(
        &mut graph,
        NodeType::Relu,
        vec![t4.single()],
        vec![],
        OutputSpec::Single(ElementType::Float32, dims!["B", 64, 14, 14]),
        scope,
        "",
        n,
    );
    let (t6, _) = add_node(
        &mut graph,
        NodeType::MaxPool,
        vec![t5.single()],
        vec![
            attr("kernel_shape", vec![2i64, 2]),
            attr("pads", vec![0i64, 0, 0, 0]),
            attr("strides", vec![2i64, 2]),
        ],
        OutputSpec::Single(ElementType::Float32, dims!["B", 64, 7, 7]),
        scope,
        "",
        n,
    );

    graph.inputs = vec![x];
    graph.outputs = vec![t6.single()];
    finish(&mut graph, export_path)
}

/// A single non-standard `AddScalar` operator, for custom-op plugin tests.
pub fn custom_op_model(export_path: Option<&Path>) -> Result<ModelProto, ExportError> {
    let mut graph = Graph::new();

    let x = Argument::variable("inputT0", ElementType::Float32, dims!["nBS"]);
    let (t1, _) = add_node(
        &mut graph,
        NodeType::Custom("AddScalar".to_string()),
        vec![x.clone()],
        vec![attr("scalar", 1.0f32)],
        OutputSpec::Single(ElementType::Float32, dims!["nBS"]),
        "CustomOpModel",
        "",
        0,
    );

    graph.inputs = vec![x];
    graph.outputs = vec![t1.single()];
    finish(&mut graph, export_path)
}

/// Deliberately invalid graph: a division by a zero constant. Exists to
/// exercise a downstream validator's error path.
pub fn invalid_model(export_path: Option<&Path>) -> Result<ModelProto, ExportError> {
    let mut graph = Graph::new();

    let x = Argument::variable("tensorT0", ElementType::Float32, dims!["nBS"]);
    let zero = Argument::constant("constant0", TensorData::float32(vec![0.0]));
    let (t1, _) = add_node(
        &mut graph,
        NodeType::Div,
        vec![x.clone(), zero],
        vec![],
        OutputSpec::Single(ElementType::Float32, dims!["nBS"]),
        "InvalidModel",
        "",
        0,
    );

    graph.inputs = vec![x];
    graph.outputs = vec![t1.single()];
    finish(&mut graph, export_path)
}

/// Graph computing the same reshape twice through redundant shape
/// arithmetic, in a static-batch (7) or dynamic-batch (`nBS`) variant.
pub fn redundant_model(
    export_path: Option<&Path>,
    static_batch: bool,
) -> Result<ModelProto, ExportError> {
    let mut graph = Graph::new();

    let batch = if static_batch {
        Dim::Static(7)
    } else {
        Dim::Named("nBS".to_string())
    };
    let x = Argument::variable(
        "inputT0",
        ElementType::Float32,
        vec![batch.clone(), Dim::Static(2), Dim::Static(3), Dim::Static(4)],
    );
    let gather_front = Argument::constant("constant0C1", TensorData::int64(vec![0, 1]));
    let gather_back = Argument::constant("constant2C3", TensorData::int64(vec![2, 3]));

    let scope = "RedundantModel";
    let n = 0;

    let (t1, n) = add_node(
        &mut graph,
        NodeType::Shape,
        vec![x.clone()],
        vec![],
        OutputSpec::Single(ElementType::Int64, dims![4]),
        scope,
        "",
        n,
    );
    let t1 = t1.single();
    let (t2, n) = add_node(
        &mut graph,
        NodeType::ReduceProd,
        vec![t1.clone()],
        vec![attr("axes", vec![0i64]), attr("keepdims", 1i64)],
        OutputSpec::Single(ElementType::Int64, dims![1]),
        scope,
        "",
        n,
    );
    let (t3, n) = add_node(
        &mut graph,
        NodeType::Reshape,
        vec![x.clone(), t2.single()],
        vec![],
        OutputSpec::Single(
            ElementType::Float32,
            vec![Dim::Named(format!("{batch}*24"))],
        ),
        scope,
        "",
        n,
    );
    let (t4, n) = add_node(
        &mut graph,
        NodeType::Gather,
        vec![t1.clone(), gather_front],
        vec![],
        OutputSpec::Single(ElementType::Int64, dims![2]),
        scope,
        "",
        n,
    );
    let (t5, n) = add_node(
        &mut graph,
        NodeType::Gather,
        vec![t1, gather_back],
        vec![],
        OutputSpec::Single(ElementType::Int64, dims![2]),
        scope,
        "",
        n,
    );
    let (t6, n) = add_node(
        &mut graph,
        NodeType::ReduceProd,
        vec![t5.single()],
        vec![attr("axes", vec![0i64]), attr("keepdims", 1i64)],
        OutputSpec::Single(ElementType::Int64, dims![1]),
        scope,
        "",
        n,
    );
    let (t7, n) = add_node(
        &mut graph,
        NodeType::Concat,
        vec![t4.single(), t6.single()],
        vec![attr("axis", 0i64)],
        OutputSpec::Single(ElementType::Int64, dims![4]),
        scope,
        "",
        n,
    );
    let (t8, _) = add_node(
        &mut graph,
        NodeType::Reshape,
        vec![x.clone(), t7.single()],
        vec![],
        OutputSpec::Single(
            ElementType::Float32,
            vec![batch, Dim::Static(2), Dim::Static(12)],
        ),
        scope,
        "",
        n,
    );

    graph.inputs = vec![x];
    graph.outputs = vec![t3.single(), t8.single()];
    finish(&mut graph, export_path)
}

/// Identity chain interleaved with unrecognized operator types, for testing
/// fallback handling of unknown ops.
pub fn unknown_op_model(export_path: Option<&Path>) -> Result<ModelProto, ExportError> {
    let mut graph = Graph::new();

    let x = Argument::variable("x", ElementType::Float32, dims!["B"]);
    let scope = "UnknownModel";
    let n = 0;

    let ops = [
        NodeType::Identity,
        NodeType::Custom("UnknownNode1".to_string()),
        NodeType::Identity,
        NodeType::Custom("UnknownNode2".to_string()),
        NodeType::Identity,
    ];
    let mut cursor = x.clone();
    let mut counter = n;
    for op in ops {
        let (out, next) = add_node(
            &mut graph,
            op,
            vec![cursor],
            vec![],
            OutputSpec::Single(ElementType::Float32, dims!["B"]),
            scope,
            "",
            counter,
        );
        cursor = out.single();
        counter = next;
    }

    graph.inputs = vec![x];
    graph.outputs = vec![cursor];
    finish(&mut graph, export_path)
}

/// A non-standard reshape whose target shape arrives as a runtime input,
/// with a tensor-valued plugin attribute naming the shape-input index.
pub fn reshape_model(export_path: Option<&Path>) -> Result<ModelProto, ExportError> {
    let mut graph = Graph::new();

    const OUTPUT_RANK: usize = 3;
    let x = Argument::variable("inputT0", ElementType::Float32, dims![-1, -1, -1]);
    let target_shape = Argument::variable("inputT1", ElementType::Int32, dims![OUTPUT_RANK]);

    let (t1, _) = add_node(
        &mut graph,
        NodeType::Custom("MyReshape".to_string()),
        vec![x.clone(), target_shape.clone()],
        vec![attr(
            "tensorrt_plugin_shape_input_indices",
            TensorData::int32(vec![1]),
        )],
        OutputSpec::Single(ElementType::Float32, vec![Dim::Unknown; OUTPUT_RANK]),
        "ReshapeModel",
        "",
        0,
    );

    graph.inputs = vec![x, target_shape];
    graph.outputs = vec![t1.single()];
    finish(&mut graph, export_path)
}
