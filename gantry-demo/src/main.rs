// HTTP/1 adapter: feeds hyper requests into the Gantry dispatcher

use bytes::Bytes;
use gantry::gantry_config::Settings;
use gantry::{request_path, Application, RequestContext, ResponseSink};
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{body::Incoming as IncomingBody, Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

// Link the demo components into this binary.
use gantry_demo as _;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut settings = Settings::from_pairs([("scan_root", "gantry_demo"), ("port", "8080")]);
    settings.load_env();

    let app = Arc::new(Application::bootstrap_from(settings.values())?);
    let port = settings.get_int("port")? as u16;
    let context_path = settings.get_or("context_path", "").to_string();

    serve(app, port, context_path).await?;
    Ok(())
}

/// Accept loop: one task per connection, dispatching into the shared,
/// immutable application.
async fn serve(app: Arc<Application>, port: u16, context_path: String) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "server listening");

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let app = app.clone();
        let context_path = context_path.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: Request<IncomingBody>| {
                let app = app.clone();
                let context_path = context_path.clone();
                async move { handle_request(req, app, &context_path).await }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                error!(error = ?err, "error serving connection");
            }
        });
    }
}

/// Builds the request context from the URI and body, dispatches, and turns
/// the sink body into the HTTP response.
async fn handle_request(
    req: Request<IncomingBody>,
    app: Arc<Application>,
    context_path: &str,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let path = request_path(req.uri().path(), context_path);

    let mut params: HashMap<String, Vec<String>> = HashMap::new();
    if let Some(query) = req.uri().query() {
        parse_params(query, &mut params);
    }

    let is_form = req
        .headers()
        .get(hyper::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));
    let body = req.collect().await?.to_bytes();
    if is_form {
        if let Ok(text) = std::str::from_utf8(&body) {
            parse_params(text, &mut params);
        }
    }

    let ctx = RequestContext { path, params };
    let mut sink = ResponseSink::new();
    app.dispatch(&ctx, &mut sink);

    let body = sink.into_body().unwrap_or_default();
    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(body)))
        .unwrap())
}

/// Parses `a=1&a=2&b=x` into the multi-valued parameter bag, decoding
/// percent escapes and `+` as space.
fn parse_params(query: &str, params: &mut HashMap<String, Vec<String>>) {
    for part in query.split('&').filter(|part| !part.is_empty()) {
        let (key, value) = part.split_once('=').unwrap_or((part, ""));
        params
            .entry(decode_component(key))
            .or_default()
            .push(decode_component(value));
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}
