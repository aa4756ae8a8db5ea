#[tokio::main]
async fn main() {
    bowl_pickem::run().await;
}
