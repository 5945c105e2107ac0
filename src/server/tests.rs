use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::time::Duration;

use http::{Method, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::request::split_target;
use super::*;
use crate::chain::{Next, from_fn};
use crate::error::ChainResult;
use crate::shutdown::shutdown_channel;

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn request(method: Method, path: &str, body: &str) -> HttpRequest {
    HttpRequest {
        method,
        path: path.to_owned(),
        query: Vec::new(),
        http_version: "HTTP/1.1".to_owned(),
        headers: HashMap::new(),
        body: body.as_bytes().to_vec(),
        params: BTreeMap::new(),
    }
}

#[test]
fn default_routes_greet_and_echo() -> Result<(), String> {
    let router = Router::default_routes();

    let greeting = router.handle(&mut request(Method::GET, "/", ""));
    if greeting.status() != StatusCode::OK || greeting.body_text() != GREETING {
        return Err(format!("Unexpected greeting: {:?}", greeting));
    }

    let echo = router.handle(&mut request(Method::POST, "/echo", "Young john"));
    if echo.body_text() != "Young john" {
        return Err(format!("Unexpected echo: {:?}", echo));
    }

    let mut param_request = request(Method::GET, "/echo/abc", "");
    let param_echo = router.handle(&mut param_request);
    if param_echo.body_text() != "abc" || param_request.param("message") != Some("abc") {
        return Err(format!("Unexpected param echo: {:?}", param_echo));
    }
    Ok(())
}

#[test]
fn unmatched_routes_are_not_found() -> Result<(), String> {
    let router = Router::default_routes();
    for (method, path) in [
        (Method::GET, "/missing"),
        (Method::DELETE, "/"),
        (Method::GET, "/echo/a/b"),
    ] {
        let response = router.handle(&mut request(method.clone(), path, ""));
        if response.status() != StatusCode::NOT_FOUND {
            return Err(format!("{} {} answered {}", method, path, response.status()));
        }
    }
    Ok(())
}

#[test]
fn trailing_slashes_are_ignored() -> Result<(), String> {
    let router = Router::new().route(Method::GET, "/status/", |_request| {
        HttpResponse::text("up")
    });
    let response = router.handle(&mut request(Method::GET, "/status", ""));
    if response.body_text() != "up" {
        return Err(format!("Unexpected response: {:?}", response));
    }
    Ok(())
}

#[test]
fn nested_routes_come_after_existing_ones() -> Result<(), String> {
    let first = Router::new().route(Method::GET, "/:any", |_request| HttpResponse::text("first"));
    let second = Router::new().route(Method::GET, "/fixed", |_request| {
        HttpResponse::text("second")
    });
    let router = first.nest(second);
    if router.len() != 2 {
        return Err(format!("Expected 2 routes, got {}", router.len()));
    }
    let response = router.handle(&mut request(Method::GET, "/fixed", ""));
    if response.body_text() != "first" {
        return Err(format!("Expected first match to win: {:?}", response));
    }
    Ok(())
}

#[test]
fn split_target_extracts_query_pairs() -> Result<(), String> {
    let (path, query) = split_target("/search?q=rust&flag&page=2");
    if path != "/search" {
        return Err(format!("Unexpected path: {}", path));
    }
    let expected = vec![
        ("q".to_owned(), "rust".to_owned()),
        ("page".to_owned(), "2".to_owned()),
    ];
    if query != expected {
        return Err(format!("Unexpected query: {:?}", query));
    }
    Ok(())
}

#[test]
fn read_request_parses_headers_and_body() -> Result<(), String> {
    run_async_test(async {
        let raw = b"POST /echo?x=1 HTTP/1.1\r\nHost: localhost\r\nContent-Type: text/plain\r\nContent-Length: 10\r\n\r\nYoung john";
        let mut reader: &[u8] = raw;
        let parsed = read_request(&mut reader)
            .await
            .map_err(|reject| reject.message)?;
        if parsed.method != Method::POST || parsed.path != "/echo" {
            return Err(format!("Unexpected request line: {:?}", parsed));
        }
        if parsed.header("Content-Type") != Some("text/plain") {
            return Err("Missing content type".to_owned());
        }
        if parsed.body_text() != "Young john" {
            return Err(format!("Unexpected body: {}", parsed.body_text()));
        }
        if parsed.query != [("x".to_owned(), "1".to_owned())] {
            return Err(format!("Unexpected query: {:?}", parsed.query));
        }
        Ok(())
    })
}

#[test]
fn read_request_rejects_bad_input() -> Result<(), String> {
    run_async_test(async {
        let cases: [(&[u8], StatusCode); 4] = [
            (b"", StatusCode::BAD_REQUEST),
            (b"GET\r\n\r\n", StatusCode::BAD_REQUEST),
            (b"GET / HTTP/1.1\r\nbroken\r\n\r\n", StatusCode::BAD_REQUEST),
            (
                b"POST / HTTP/1.1\r\nContent-Length: 99999999\r\n\r\n",
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
        ];
        for (raw, expected) in cases {
            let mut reader = raw;
            match read_request(&mut reader).await {
                Err(reject) if reject.status == expected => {}
                Err(reject) => {
                    return Err(format!("Expected {}, got {}", expected, reject.status));
                }
                Ok(parsed) => return Err(format!("Expected rejection, parsed {:?}", parsed)),
            }
        }
        Ok(())
    })
}

#[test]
fn response_serialises_status_headers_and_length() -> Result<(), String> {
    let bytes = HttpResponse::text("hi").to_bytes();
    let text = String::from_utf8(bytes).map_err(|err| err.to_string())?;
    let expected =
        "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: 2\r\nconnection: close\r\n\r\nhi";
    if text != expected {
        return Err(format!("Unexpected response: {:?}", text));
    }
    Ok(())
}

#[test]
fn pipeline_routes_exchange() -> Result<(), String> {
    let pipeline = build_pipeline(Router::default_routes()).map_err(|err| err.to_string())?;
    if pipeline.len() != 2 {
        return Err(format!("Expected 2 handlers, got {}", pipeline.len()));
    }
    let exchange = pipeline
        .handle(Exchange::new(request(Method::GET, "/", "")))
        .map_err(|err| err.to_string())?;
    let response = exchange.into_response();
    if response.body_text() != GREETING {
        return Err(format!("Unexpected response: {:?}", response));
    }
    Ok(())
}

fn run_pipeline(router: Router, request: HttpRequest) -> Result<HttpResponse, String> {
    let pipeline = build_pipeline(router).map_err(|err| err.to_string())?;
    let exchange = pipeline
        .handle(Exchange::new(request))
        .map_err(|err| err.to_string())?;
    Ok(exchange.into_response())
}

#[test]
fn before_hook_that_stops_ends_the_request() -> Result<(), String> {
    let deny = from_fn(
        |exchange: &mut Exchange, _next: Next<'_, Exchange>| -> ChainResult<()> {
            exchange.response =
                Some(HttpResponse::with_status(StatusCode::UNAUTHORIZED).body("denied"));
            Ok(())
        },
    );
    let router = || {
        Router::default_routes()
            .before("/echo", deny)
            .after("/echo", |_request, response| response.body("rewritten"))
    };

    let blocked = run_pipeline(router(), request(Method::POST, "/echo", "Young john"))?;
    if blocked.status() != StatusCode::UNAUTHORIZED || blocked.body_text() != "denied" {
        return Err(format!("Expected the before hook to answer: {:?}", blocked));
    }

    let greeting = run_pipeline(router(), request(Method::GET, "/", ""))?;
    if greeting.body_text() != GREETING {
        return Err(format!("Other paths must pass through: {:?}", greeting));
    }
    Ok(())
}

#[test]
fn before_hook_sees_path_params_and_can_continue() -> Result<(), String> {
    let router = || {
        Router::default_routes().before(
            "/echo/:message",
            from_fn(
                |exchange: &mut Exchange, next: Next<'_, Exchange>| -> ChainResult<()> {
                    if exchange.request.param("message") == Some("blocked") {
                        exchange.response = Some(HttpResponse::with_status(StatusCode::FORBIDDEN));
                        return Ok(());
                    }
                    next.run(exchange)
                },
            ),
        )
    };

    let allowed = run_pipeline(router(), request(Method::GET, "/echo/hello", ""))?;
    if allowed.body_text() != "hello" {
        return Err(format!("Expected routed echo: {:?}", allowed));
    }
    let forbidden = run_pipeline(router(), request(Method::GET, "/echo/blocked", ""))?;
    if forbidden.status() != StatusCode::FORBIDDEN {
        return Err(format!("Expected 403: {:?}", forbidden));
    }
    Ok(())
}

#[test]
fn after_hooks_rewrite_in_registration_order() -> Result<(), String> {
    let append = |suffix: &'static str| {
        move |_request: &HttpRequest, response: HttpResponse| {
            let body = format!("{}{}", response.body_text(), suffix);
            response.body(body)
        }
    };
    let router = Router::default_routes()
        .after("/", append("!"))
        .after("/", append("?"));
    let pipeline = build_pipeline(router).map_err(|err| err.to_string())?;
    if pipeline.len() != 4 {
        return Err(format!("Expected 4 handlers, got {}", pipeline.len()));
    }

    let greeting = pipeline
        .handle(Exchange::new(request(Method::GET, "/", "")))
        .map_err(|err| err.to_string())?
        .into_response();
    if greeting.body_text() != "Jung jung!?" {
        return Err(format!("Unexpected rewrite: {:?}", greeting));
    }

    let echo = pipeline
        .handle(Exchange::new(request(Method::POST, "/echo", "x")))
        .map_err(|err| err.to_string())?
        .into_response();
    if echo.body_text() != "x" {
        return Err(format!("Hooks on / must not touch /echo: {:?}", echo));
    }
    Ok(())
}

#[test]
fn silent_peer_is_rejected_with_request_timeout() -> Result<(), String> {
    run_async_test(async {
        let (_client, mut server_side) = tokio::io::duplex(64);
        match read_request_within(&mut server_side, Duration::from_millis(50)).await {
            Err(reject) if reject.status == StatusCode::REQUEST_TIMEOUT => Ok(()),
            Err(reject) => Err(format!("Expected 408, got {}", reject.status)),
            Ok(parsed) => Err(format!("Expected timeout, parsed {:?}", parsed)),
        }
    })
}

#[test]
fn server_answers_408_to_idle_connection() -> Result<(), String> {
    run_async_test(async {
        let addr = parse_listen_addr("127.0.0.1:0").map_err(|err| err.to_string())?;
        let server = Server::bind(addr, Router::default_routes())
            .await
            .map_err(|err| err.to_string())?
            .with_read_timeout(Duration::from_millis(100));
        let local = server.local_addr();
        let (_shutdown_tx, shutdown_rx) = shutdown_channel();
        tokio::spawn(server.run(shutdown_rx));

        let mut stream = tokio::net::TcpStream::connect(local)
            .await
            .map_err(|err| format!("connect failed: {}", err))?;
        let mut raw = String::new();
        tokio::time::timeout(Duration::from_secs(2), stream.read_to_string(&mut raw))
            .await
            .map_err(|err| format!("server kept the idle connection: {}", err))?
            .map_err(|err| format!("read failed: {}", err))?;
        if !raw.starts_with("HTTP/1.1 408") {
            return Err(format!("Unexpected response: {:?}", raw));
        }
        Ok(())
    })
}

#[test]
fn parse_listen_addr_requires_ip_and_port() -> Result<(), String> {
    let addr = parse_listen_addr("127.0.0.1:4221").map_err(|err| err.to_string())?;
    if addr.port() != 4221 {
        return Err(format!("Unexpected port: {}", addr));
    }
    if parse_listen_addr("localhost").is_ok() {
        return Err("Expected missing port to fail".to_owned());
    }
    Ok(())
}

#[test]
fn server_echoes_over_tcp_until_shutdown() -> Result<(), String> {
    run_async_test(async {
        let addr = parse_listen_addr("127.0.0.1:0").map_err(|err| err.to_string())?;
        let server = Server::bind(addr, Router::default_routes())
            .await
            .map_err(|err| err.to_string())?;
        let local = server.local_addr();
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let handle = tokio::spawn(server.run(shutdown_rx));

        let mut stream = tokio::net::TcpStream::connect(local)
            .await
            .map_err(|err| format!("connect failed: {}", err))?;
        stream
            .write_all(
                b"POST /echo HTTP/1.1\r\nContent-Type: text/plain\r\nContent-Length: 10\r\n\r\nYoung john",
            )
            .await
            .map_err(|err| format!("write failed: {}", err))?;
        let mut raw = String::new();
        stream
            .read_to_string(&mut raw)
            .await
            .map_err(|err| format!("read failed: {}", err))?;
        if !raw.starts_with("HTTP/1.1 200 OK") || !raw.ends_with("Young john") {
            return Err(format!("Unexpected response: {:?}", raw));
        }

        shutdown_tx
            .send(())
            .map_err(|err| format!("shutdown send failed: {}", err))?;
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .map_err(|err| format!("server did not stop: {}", err))?
            .map_err(|err| format!("server task failed: {}", err))?;
        Ok(())
    })
}
