#[tokio::main]
async fn main() {
    guestlist_backend::run().await;
}
