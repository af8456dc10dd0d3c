#[tokio::main]
async fn main() {
    botdash::dashboard::main::run_dashboard().await;
}
