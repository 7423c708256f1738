use build_script_cfg::Cfg;
use find_cuda_helper::{find_cuda_root, include_cuda};
use std::{
    env,
    path::{Path, PathBuf},
};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let nvidia = Cfg::new("nvidia");
    if let Some(cuda_root) = find_cuda_root() {
        nvidia.define();
        include_cuda();
        bind_cuda(cuda_root)
    }
}

fn bind_cuda(toolkit: impl AsRef<Path>) {
    let toolkit = toolkit.as_ref();
    println!("cargo:rustc-link-lib=dylib=cuda");

    // Tell cargo to invalidate the built crate whenever the wrapper changes.
    println!("cargo:rerun-if-changed=wrapper.h");
    let include = toolkit.join("include");

    let bindings = bindgen::Builder::default()
        .header("wrapper.h")
        .clang_arg(format!("-I{}", include.display()))
        // Only generate bindings for the driver api.
        .allowlist_function("cu.*")
        .allowlist_item("CU.*")
        .must_use_type("CUresult")
        .default_enum_style(bindgen::EnumVariation::Rust {
            non_exhaustive: true,
        })
        .use_core()
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
        .generate()
        .expect("Unable to generate bindings");

    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
    bindings
        .write_to_file(out_path.join("bindings.rs"))
        .expect("Couldn't write bindings!");
}
