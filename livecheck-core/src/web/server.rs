use std::sync::Arc;

use axum::Router;
use axum::http::Request;
use hyper::body::Incoming;
use hyper_util::rt::TokioExecutor;
use hyper_util::rt::TokioIo;
use hyper_util::server;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tower::Service;

use crate::config::Config;
use crate::error::Error;

pub(super) async fn serve(config: Arc<Config>, app: Router) -> Result<(), Error> {
    let mut set = JoinSet::new();
    for addr in config.server.addrs.iter() {
        set.spawn(http(addr.clone(), app.clone()));
    }
    while let Some(_) = set.join_next().await {}
    Ok(())
}

// See //examples/serve-with-hyper in tokio-rs/axum.

async fn http(addr: String, app: Router) -> Result<(), Error> {
    let listener = TcpListener::bind(addr.as_str()).await?;
    tracing::info!(%addr, "Listening");
    let mut make_service = app.into_make_service();
    loop {
        let (socket, _remote_addr) = listener.accept().await?;
        let tower_service = make_service.call(&socket).await.unwrap();
        tokio::spawn(async move {
            let socket = TokioIo::new(socket);
            let hyper_service = hyper::service::service_fn(move |request: Request<Incoming>| {
                tower_service.clone().call(request)
            });
            if let Err(err) = server::conn::auto::Builder::new(TokioExecutor::new())
                .serve_connection(socket, hyper_service)
                .await
            {
                tracing::debug!(?err, "Failed to serve connection");
            }
        });
    }
}
