/// Build script for flat_obj_viewer
///
/// The WGSL shader is embedded with `include_str!` and validated by wgpu at runtime.
fn main() {
    // Trigger rebuild if the shader changes
    println!("cargo:rerun-if-changed=src/renderer/shaders/flat.wgsl");
}
