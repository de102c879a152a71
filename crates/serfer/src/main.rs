#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    lib_serfer::init().await
}
