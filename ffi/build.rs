//! Generates `resume_ffi.h` from the `extern "C"` surface into `OUT_DIR`.
//!
//! Set `RESUME_FFI_HEADER_DIR` to also copy the header into a directory of
//! the host's choosing. A header failure is reported as a build warning; the
//! library still builds so Rust-only consumers are not blocked on cbindgen.

use std::env;
use std::path::PathBuf;

const HEADER: &str = "resume_ffi.h";

fn main() {
    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".into()));
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap_or_else(|_| ".".into()));

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");
    println!("cargo:rerun-if-changed=cbindgen.toml");
    println!("cargo:rerun-if-env-changed=RESUME_FFI_HEADER_DIR");

    let config = cbindgen::Config::from_file(crate_dir.join("cbindgen.toml")).unwrap_or_default();
    let bindings = match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
    {
        Ok(bindings) => bindings,
        Err(e) => {
            println!("cargo:warning=skipping C header generation: {e}");
            return;
        }
    };

    bindings.write_to_file(out_dir.join(HEADER));
    if let Some(dir) = env::var_os("RESUME_FFI_HEADER_DIR") {
        bindings.write_to_file(PathBuf::from(dir).join(HEADER));
    }
}
