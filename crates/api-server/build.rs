fn main() {
    // Re-embed dashboard assets when they change
    println!("cargo:rerun-if-changed=frontend/");
}
