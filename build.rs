fn main() {
    // Check if KOMAL_DEFAULT_API_URL environment variable is set at build time
    if let Ok(api_url) = std::env::var("KOMAL_DEFAULT_API_URL") {
        let trimmed = api_url.trim();
        if !trimmed.is_empty() {
            println!("cargo:rustc-env=BUILTIN_API_URL={}", trimmed);
            println!("cargo:rustc-env=HAS_BUILTIN_API_URL=1");
        } else {
            println!("cargo:rustc-env=BUILTIN_API_URL=");
            println!("cargo:rustc-env=HAS_BUILTIN_API_URL=0");
        }
    } else {
        println!("cargo:rustc-env=BUILTIN_API_URL=");
        println!("cargo:rustc-env=HAS_BUILTIN_API_URL=0");
    }

    // Re-run build script if KOMAL_DEFAULT_API_URL changes
    println!("cargo:rerun-if-env-changed=KOMAL_DEFAULT_API_URL");
}
