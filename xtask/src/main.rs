fn main() -> anyhow::Result<()> {
    let mut args = std::env::args();
    let _ = args.next();
    let task_name = args.next();
    match task_name.as_deref() {
        Some("update-products") => {
            let input = args.next().unwrap_or_else(|| "products.json".to_owned());
            let output = args.next().unwrap_or_else(|| "products.yaml".to_owned());
            xtask::update_products(&input, &output)
        }
        Some(other) => anyhow::bail!("unknown task {:?}", other),
        None => {
            eprintln!("usage: cargo xtask update-products [products.json] [products.yaml]");
            Ok(())
        }
    }
}
