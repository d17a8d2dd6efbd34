//! In-memory representation of an ONNX computation graph.
//!
//! The model is deliberately thin: a [`Graph`] owns an ordered list of
//! [`Node`]s plus its declared input and output [`Argument`]s. Arguments are
//! value placeholders — a name, an element type and a symbolic shape — and
//! optionally bind a constant data buffer.

use core::fmt;
use std::fmt::Formatter;

use half::f16;
use strum::{Display, EnumString};

/// A symbolic shape: one entry per dimension.
pub type Shape = Vec<Dim>;

/// A single dimension of a symbolic shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dim {
    /// Fixed positive extent.
    Static(usize),
    /// Named symbol resolved at execution time, e.g. a batch size `"B"`.
    Named(String),
    /// Unknown extent (`-1` in the builder-facing convention).
    Unknown,
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Static(n) => write!(f, "{n}"),
            Dim::Named(s) => write!(f, "{s}"),
            Dim::Unknown => write!(f, "-1"),
        }
    }
}

impl From<usize> for Dim {
    fn from(value: usize) -> Self {
        Dim::Static(value)
    }
}

impl From<i32> for Dim {
    fn from(value: i32) -> Self {
        if value < 0 {
            Dim::Unknown
        } else {
            Dim::Static(value as usize)
        }
    }
}

impl From<i64> for Dim {
    fn from(value: i64) -> Self {
        if value < 0 {
            Dim::Unknown
        } else {
            Dim::Static(value as usize)
        }
    }
}

impl From<&str> for Dim {
    fn from(value: &str) -> Self {
        Dim::Named(value.to_string())
    }
}

impl From<String> for Dim {
    fn from(value: String) -> Self {
        Dim::Named(value)
    }
}

/// Build a [`Shape`] from mixed literals: positive integers become static
/// dims, negative integers become [`Dim::Unknown`], strings become named
/// symbols.
///
/// ```
/// use onnx_builder::dims;
/// let shape = dims!["B", 1, 28, 28];
/// ```
#[macro_export]
macro_rules! dims {
    ($($d:expr),* $(,)?) => {
        vec![$($crate::ir::Dim::from($d)),*]
    };
}

/// The element type of a tensor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Float32,
    Float64,
    Float16,
    Int32,
    Int64,
    Int8,
    Uint8,
    Uint16,
    Bool,
    String,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A node input or output: a named, typed, shaped handle to a tensor-valued
/// edge. Holds no data unless it is a constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// Unique name within the graph.
    pub name: String,
    /// Element type of the tensor values.
    pub elem_type: ElementType,
    /// Symbolic shape.
    pub shape: Shape,
    /// Bound data buffer. `Some` marks this argument as a constant.
    pub data: Option<TensorData>,
}

impl Argument {
    /// A runtime value placeholder.
    pub fn variable(name: impl Into<String>, elem_type: ElementType, shape: Shape) -> Self {
        Self {
            name: name.into(),
            elem_type,
            shape,
            data: None,
        }
    }

    /// A constant binding a fixed data buffer. Element type and shape are
    /// taken from the buffer.
    pub fn constant(name: impl Into<String>, data: TensorData) -> Self {
        let elem_type = data.elem_type();
        let shape = data.shape.iter().map(|&d| Dim::Static(d)).collect();
        Self {
            name: name.into(),
            elem_type,
            shape,
            data: Some(data),
        }
    }

    /// Whether this argument binds constant data.
    pub fn is_constant(&self) -> bool {
        self.data.is_some()
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}[", self.name, self.elem_type)?;
        for (i, dim) in self.shape.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dim}")?;
        }
        write!(f, "]")?;
        if let Some(data) = &self.data {
            write!(f, " = {:?}", data.data)?;
        }
        Ok(())
    }
}

/// A tensor value: a shape and a typed buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorData {
    /// Extent of each dimension.
    pub shape: Vec<usize>,
    /// The element buffer.
    pub data: Data,
}

impl TensorData {
    /// Create a tensor from a buffer and shape.
    ///
    /// # Panics
    /// Panics when the buffer length does not match the shape's element count.
    pub fn new(data: Data, shape: Vec<usize>) -> Self {
        let expected: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            expected,
            "tensor data length {} does not match shape {:?}",
            data.len(),
            shape
        );
        Self { shape, data }
    }

    /// Rank-1 float32 tensor.
    pub fn float32(values: Vec<f32>) -> Self {
        let len = values.len();
        Self::new(Data::Float32(values), vec![len])
    }

    /// Rank-1 int64 tensor.
    pub fn int64(values: Vec<i64>) -> Self {
        let len = values.len();
        Self::new(Data::Int64(values), vec![len])
    }

    /// Rank-1 int32 tensor.
    pub fn int32(values: Vec<i32>) -> Self {
        let len = values.len();
        Self::new(Data::Int32(values), vec![len])
    }

    /// The element type of the buffer.
    pub fn elem_type(&self) -> ElementType {
        match self.data {
            Data::Float16(_) => ElementType::Float16,
            Data::Float32(_) => ElementType::Float32,
            Data::Float64(_) => ElementType::Float64,
            Data::Int32(_) => ElementType::Int32,
            Data::Int64(_) => ElementType::Int64,
            Data::Uint8(_) => ElementType::Uint8,
            Data::Bool(_) => ElementType::Bool,
        }
    }

    /// Total number of elements.
    pub fn num_elements(&self) -> usize {
        self.data.len()
    }
}

/// Typed tensor buffer.
#[derive(Clone, PartialEq)]
pub enum Data {
    Float16(Vec<f16>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Uint8(Vec<u8>),
    Bool(Vec<bool>),
}

impl Data {
    /// Buffer length in elements.
    pub fn len(&self) -> usize {
        match self {
            Data::Float16(v) => v.len(),
            Data::Float32(v) => v.len(),
            Data::Float64(v) => v.len(),
            Data::Int32(v) => v.len(),
            Data::Int64(v) => v.len(),
            Data::Uint8(v) => v.len(),
            Data::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render the first few elements of a buffer for debug output.
fn preview<T: fmt::Display>(values: &[T]) -> String {
    const LIMIT: usize = 6;
    let mut out = String::from("[");
    for (i, value) in values.iter().take(LIMIT).enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&value.to_string());
    }
    if values.len() > LIMIT {
        out.push_str(", ...");
    }
    out.push(']');
    out
}

// Shorten the buffer for debug display
impl fmt::Debug for Data {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Data::Float16(v) => write!(f, "Float16({})", preview(v)),
            Data::Float32(v) => write!(f, "Float32({})", preview(v)),
            Data::Float64(v) => write!(f, "Float64({})", preview(v)),
            Data::Int32(v) => write!(f, "Int32({})", preview(v)),
            Data::Int64(v) => write!(f, "Int64({})", preview(v)),
            Data::Uint8(v) => write!(f, "Uint8({})", preview(v)),
            Data::Bool(v) => write!(f, "Bool({})", preview(v)),
        }
    }
}

/// The value of a node attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Float32(f32),
    Float32s(Vec<f32>),
    Int64(i64),
    Int64s(Vec<i64>),
    String(String),
    Strings(Vec<String>),
    Tensor(TensorData),
    Tensors(Vec<TensorData>),
}

/// Ordered attribute mapping. Order is preserved so exports are
/// deterministic.
pub type Attributes = Vec<(String, AttributeValue)>;

/// Build a single attribute entry.
pub fn attr(name: &str, value: impl Into<AttributeValue>) -> (String, AttributeValue) {
    (name.to_string(), value.into())
}

impl From<f32> for AttributeValue {
    fn from(value: f32) -> Self {
        AttributeValue::Float32(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int64(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Int64(value as i64)
    }
}

impl From<Vec<f32>> for AttributeValue {
    fn from(value: Vec<f32>) -> Self {
        AttributeValue::Float32s(value)
    }
}

impl From<Vec<i64>> for AttributeValue {
    fn from(value: Vec<i64>) -> Self {
        AttributeValue::Int64s(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<TensorData> for AttributeValue {
    fn from(value: TensorData) -> Self {
        AttributeValue::Tensor(value)
    }
}

/// Operator type of a node.
///
/// Covers the common standard operators; anything else goes through
/// [`NodeType::Custom`], since op semantics are interpreted by downstream
/// consumers and never validated here. `Display`/`FromStr` round-trip the
/// ONNX operator spelling.
///
/// See: <https://github.com/onnx/onnx/blob/main/docs/Operators.md>
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, EnumString)]
pub enum NodeType {
    Abs,
    Add,
    And,
    ArgMax,
    ArgMin,
    AveragePool,
    BatchNormalization,
    Cast,
    Ceil,
    Clip,
    Concat,
    Constant,
    ConstantOfShape,
    Conv,
    ConvTranspose,
    Div,
    Equal,
    Erf,
    Exp,
    Expand,
    Flatten,
    Floor,
    Gather,
    GatherElements,
    Gemm,
    GlobalAveragePool,
    Greater,
    Identity,
    InstanceNormalization,
    LayerNormalization,
    LeakyRelu,
    Less,
    Log,
    LogSoftmax,
    MatMul,
    Max,
    MaxPool,
    Mean,
    Min,
    Mul,
    Neg,
    Not,
    Or,
    Pad,
    Pow,
    Range,
    Reciprocal,
    ReduceMax,
    ReduceMean,
    ReduceMin,
    ReduceProd,
    ReduceSum,
    Relu,
    Reshape,
    Resize,
    Shape,
    Sigmoid,
    Sign,
    Size,
    Slice,
    Softmax,
    Split,
    Sqrt,
    Squeeze,
    Sub,
    Sum,
    Tanh,
    Tile,
    TopK,
    Transpose,
    Unsqueeze,
    Where,
    Xor,
    /// Any operator not in the list above, kept as its literal spelling.
    #[strum(default, to_string = "{0}")]
    Custom(String),
}

/// A single operation instance in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The operator type.
    pub node_type: NodeType,
    /// Unique name within the graph.
    pub name: String,
    /// Ordered inputs.
    pub inputs: Vec<Argument>,
    /// Ordered outputs.
    pub outputs: Vec<Argument>,
    /// Ordered attributes.
    pub attrs: Attributes,
}

/// An ONNX computation graph under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    /// The nodes of the graph, append-only during construction.
    pub nodes: Vec<Node>,
    /// Declared graph inputs.
    pub inputs: Vec<Argument>,
    /// Declared graph outputs.
    pub outputs: Vec<Argument>,
}

impl Graph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }
}
