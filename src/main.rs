#[tokio::main]
async fn main() {
    design_house::start_server().await;
}
