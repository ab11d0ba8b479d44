#[tokio::main]
async fn main() {
    if let Err(e) = storefront_sync::run().await {
        eprintln!("storefront-sync: {e}");
        std::process::exit(1);
    }
}
