/// Builds the gRPC client and server code for `checklist.proto` and
/// `helloworld.proto` using `tonic-prost-build`.
///
/// # Files and Paths
///
/// - Proto files: `proto/checklist.proto`, `proto/helloworld.proto`
/// - Includes: `proto/`
/// - Descriptor set: `$OUT_DIR/checklist_descriptor.bin`, served by the
///   reflection service.
///
/// # Panics
///
/// This function will `panic!` if code generation fails.
///
/// # Output
///
/// Generated code will be accessible in Rust via:
///
/// ```rust
/// pub mod checklist {
///     tonic::include_proto!("checklist");
/// }
/// ```
use std::env;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("checklist_descriptor.bin");

    println!("cargo:rerun-if-changed=proto");

    tonic_prost_build::configure()
        .file_descriptor_set_path(&descriptor_path)
        // `optional` fields in UpdateTodoRequest; older protoc releases
        // still gate them behind this flag.
        .protoc_arg("--experimental_allow_proto3_optional")
        .compile_protos(
            &["proto/checklist.proto", "proto/helloworld.proto"],
            &["proto"],
        )
        .unwrap();
}
