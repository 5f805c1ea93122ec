use std::net::SocketAddr;

use axum::Router;

/// Serve `router` on an ephemeral local port and return its base URL.
///
/// The server task lives until the test runtime shuts down.
pub async fn spawn_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
