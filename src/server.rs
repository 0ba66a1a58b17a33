//! HTTP server: accept loop, request adaptation, and access logging.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use crate::config::urls::build_router;
use crate::http::{Request, Response};
use crate::routing::Router;
use crate::state::AppState;

/// Bind and serve until Ctrl-C. Connections run on their own tasks;
/// in-flight requests finish before the process exits because the
/// runtime is dropped after this returns.
pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
	let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
	let listener = TcpListener::bind(addr).await?;
	tracing::info!(addr = %listener.local_addr()?, "listening");
	let router = Arc::new(build_router(state));

	loop {
		tokio::select! {
			accepted = listener.accept() => {
				let (stream, peer) = accepted?;
				let io = TokioIo::new(stream);
				let router = router.clone();
				tokio::spawn(async move {
					let service =
						service_fn(move |hyper_request| handle(router.clone(), hyper_request));
					if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
						tracing::debug!(%peer, error = %err, "connection closed with error");
					}
				});
			}
			_ = tokio::signal::ctrl_c() => {
				tracing::info!("shutdown signal received");
				return Ok(());
			}
		}
	}
}

async fn handle(
	router: Arc<Router>,
	hyper_request: hyper::Request<Incoming>,
) -> Result<hyper::Response<Full<Bytes>>, hyper::Error> {
	let (parts, body) = hyper_request.into_parts();
	let method = parts.method.clone();
	let path = parts.uri.path().to_string();
	let body = body.collect().await?.to_bytes();
	let request = Request::new(parts.method, parts.uri, parts.version, parts.headers, body);

	let started = Instant::now();
	let response = router.dispatch(request).await;
	tracing::info!(
		%method,
		%path,
		status = response.status.as_u16(),
		elapsed_ms = started.elapsed().as_millis() as u64,
		"request handled"
	);
	Ok(into_hyper(response))
}

fn into_hyper(response: Response) -> hyper::Response<Full<Bytes>> {
	let mut out = hyper::Response::new(Full::new(response.body));
	*out.status_mut() = response.status;
	*out.headers_mut() = response.headers;
	out
}
