#[tokio::main]
async fn main() {
    bookwise_backend::run().await;
}
