pub fn run() -> anyhow::Result<()> {
    println!("hindsight {}", env!("CARGO_PKG_VERSION"));
    println!("Screen session recorder with compressed activity logs");
    Ok(())
}
