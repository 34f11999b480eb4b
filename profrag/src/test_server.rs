use axum::Router;
use std::net::TcpListener;

/// Serves `router` on a free local port, returning its base URL.
pub fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();

    tokio::spawn(
        axum::Server::from_tcp(listener)
            .unwrap()
            .serve(router.into_make_service()),
    );

    format!("http://{address}")
}
