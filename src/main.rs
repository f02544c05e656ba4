fn main() -> anyhow::Result<()> {
    // The web build starts from the library's wasm entry point.
    #[cfg(not(target_arch = "wasm32"))]
    tyre_studio::run()?;
    Ok(())
}
