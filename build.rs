use std::env;
use std::io::Result;

fn main() -> Result<()> {
    // The onnxruntime pulled in by usls needs compiler-rt builtins on Apple targets.
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let apple = matches!(target_os.as_str(), "macos" | "ios" | "tvos");
    if apple && env::var_os("CARGO_FEATURE_USLS").is_some() {
        println!("cargo:rustc-link-arg=-fapple-link-rtlib");
    }

    Ok(())
}
