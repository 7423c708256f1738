use build_script_cfg::Cfg;
use find_cuda_helper::find_cuda_root;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let nvidia = Cfg::new("nvidia");
    if find_cuda_root().is_some() {
        nvidia.define();
    }
}
