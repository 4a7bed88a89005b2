use tokio::net::TcpListener;

/// Serves the session test API for manual poking with curl or a client.
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let host = std::env::var("MOCK_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "4010".to_string());
    let listener = TcpListener::bind(format!("{host}:{port}")).await?;
    println!("mock session api listening on {}", listener.local_addr()?);
    mock_server::run(listener).await
}
