use protobuf_codegen::Customize;

fn main() {
    // Generate the onnx protobuf bindings.
    // tokio_bytes makes bytes fields use bytes::Bytes instead of Vec<u8>.
    protobuf_codegen::Codegen::new()
        .pure()
        .includes(["src"])
        .input("src/protos/onnx.proto")
        .cargo_out_dir("onnx-protos")
        .customize(Customize::default().tokio_bytes(true))
        .run_from_script();
}
