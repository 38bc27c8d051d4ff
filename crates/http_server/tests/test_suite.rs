use std::{net::SocketAddr, time::Duration};

use skiff_http_server::{
    HttpServer,
    connection::ConnectionOptions,
    policy::{Policy, WriteFailurePolicy},
    service::{App, fs::DirStore},
};
use skiff_http_test_suite::{RawResponse, request, send_raw};
use tempfile::TempDir;

struct TestServer {
    addr: SocketAddr,
    dir: TempDir,
}

fn start_with(options: ConnectionOptions, write_failure: WriteFailurePolicy) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let app = App::new(DirStore::new(dir.path())).with_write_failure(write_failure);
    let server = HttpServer::with_options(SocketAddr::from(([127, 0, 0, 1], 0)), app, options);
    let listening = server.bind().unwrap();
    let addr = listening.local_addr().unwrap();
    tokio::spawn(listening.serve());
    TestServer { addr, dir }
}

fn start() -> TestServer {
    start_with(ConnectionOptions::default(), WriteFailurePolicy::ReportOk)
}

async fn exchange(server: &TestServer, raw: &str) -> RawResponse {
    request(server.addr, raw.as_bytes()).await.unwrap()
}

#[tokio::test]
async fn root_for_any_method() {
    let server = start();
    for method in ["GET", "POST", "DELETE"] {
        let res = exchange(&server, &format!("{method} / HTTP/1.1\r\n\r\n")).await;
        assert_eq!(res.status, 200, "{method}");
        assert_eq!(res.reason, "OK");
        assert!(res.body.is_empty());
        assert_eq!(res.header("Content-Length"), None);
        assert_eq!(res.header("Content-Type"), Some("text/plain"));
    }
}

#[tokio::test]
async fn echo_plain() {
    let server = start();
    for s in ["abc", "", "with%20escape", "ünïcödé"] {
        let res = exchange(&server, &format!("GET /echo/{s} HTTP/1.1\r\nHost: x\r\n\r\n")).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.header("Content-Type"), Some("text/plain"));
        assert_eq!(res.header("Content-Encoding"), None);
        assert_eq!(res.body, s.as_bytes());
        if s.is_empty() {
            assert_eq!(res.header("Content-Length"), None);
        } else {
            assert_eq!(res.header("Content-Length"), Some(s.len().to_string().as_str()));
        }
    }
}

#[tokio::test]
async fn echo_gzip() {
    let server = start();
    let res = exchange(
        &server,
        "GET /echo/abcabcabc HTTP/1.1\r\nAccept-Encoding: deflate, gzip\r\n\r\n",
    )
    .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.header("Content-Encoding"), Some("gzip"));
    assert_eq!(
        res.header("Content-Length"),
        Some(res.body.len().to_string().as_str())
    );
    assert_ne!(res.body, b"abcabcabc");
    assert_eq!(res.decoded_body().unwrap(), b"abcabcabc");

    let res = exchange(
        &server,
        "GET /echo/abc HTTP/1.1\r\nAccept-Encoding: invalid-encoding\r\n\r\n",
    )
    .await;
    assert_eq!(res.header("Content-Encoding"), None);
    assert_eq!(res.body, b"abc");
}

#[tokio::test]
async fn user_agent() {
    let server = start();
    let res = exchange(
        &server,
        "GET /user-agent HTTP/1.1\r\nHost: localhost:4221\r\nUser-Agent: foobar/1.2.3\r\n\r\n",
    )
    .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, b"foobar/1.2.3");
    assert_eq!(res.header("Content-Length"), Some("12"));
}

#[tokio::test]
async fn post_then_get_file() {
    let server = start();
    let res = exchange(
        &server,
        "POST /files/foo.txt HTTP/1.1\r\nContent-Type: application/octet-stream\r\nContent-Length: 11\r\n\r\nhello world",
    )
    .await;
    assert_eq!(res.status, 201);
    assert_eq!(res.reason, "Created");
    assert_eq!(
        std::fs::read(server.dir.path().join("foo.txt")).unwrap(),
        b"hello world"
    );

    let res = exchange(&server, "GET /files/foo.txt HTTP/1.1\r\n\r\n").await;
    assert_eq!(res.status, 200);
    assert_eq!(res.header("Content-Type"), Some("application/octet-stream"));
    assert_eq!(res.header("Content-Length"), Some("11"));
    assert_eq!(res.body, b"hello world");
}

#[tokio::test]
async fn missing_file_and_unknown_paths() {
    let server = start();
    let res = exchange(&server, "GET /files/does-not-exist HTTP/1.1\r\n\r\n").await;
    assert_eq!(res.status, 404);
    assert_eq!(res.reason, "Not Found");
    assert!(res.body.is_empty());

    let res = exchange(&server, "GET /files/../Cargo.toml HTTP/1.1\r\n\r\n").await;
    assert_eq!(res.status, 404);

    let res = exchange(&server, "GET /nonexistent/path HTTP/1.1\r\n\r\n").await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn put_is_not_allowed() {
    let server = start();
    let res = exchange(
        &server,
        "PUT /files/anything HTTP/1.1\r\nContent-Length: 1\r\n\r\nx",
    )
    .await;
    assert_eq!(res.status, 405);
    assert_eq!(res.reason, "Not Allowed");
    assert!(!server.dir.path().join("anything").exists());
}

#[tokio::test]
async fn version_is_echoed() {
    let server = start();
    let res = exchange(&server, "GET / HTTP/1.0\r\n\r\n").await;
    assert_eq!(res.version, "HTTP/1.0");
}

#[tokio::test]
async fn malformed_request_line() {
    let server = start();
    let res = exchange(&server, "GET /\r\n\r\n").await;
    assert_eq!(res.status, 400);
    assert_eq!(res.version, "HTTP/1.1");

    // The server keeps serving
    let res = exchange(&server, "GET / HTTP/1.1\r\n\r\n").await;
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn closed_mid_request_gets_no_response() {
    let server = start();
    let out = send_raw(server.addr, b"GET / HTTP/1.1\r\nHost:").await;
    // The client half-closes after writing, so the server hits EOF inside the headers
    assert!(out.map(|out| out.is_empty()).unwrap_or(true));
}

#[tokio::test]
async fn write_failure_policies() {
    let lenient = start();
    let strict = start_with(
        ConnectionOptions {
            policy: Policy::strict(),
            read_timeout: Some(Duration::from_secs(5)),
        },
        WriteFailurePolicy::ReportError,
    );
    // A directory cannot be overwritten with a file
    for server in [&lenient, &strict] {
        std::fs::create_dir(server.dir.path().join("taken")).unwrap();
    }
    const POST: &str = "POST /files/taken HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc";

    assert_eq!(exchange(&lenient, POST).await.status, 200);
    assert_eq!(exchange(&strict, POST).await.status, 500);
}

#[tokio::test]
async fn concurrent_connections() {
    let server = start();
    let mut tasks = Vec::new();
    for i in 0..16 {
        let addr = server.addr;
        tasks.push(tokio::spawn(async move {
            let raw = format!("GET /echo/{i} HTTP/1.1\r\n\r\n");
            request(addr, raw.as_bytes()).await.unwrap()
        }));
    }
    for (i, task) in tasks.into_iter().enumerate() {
        let res = task.await.unwrap();
        assert_eq!(res.body, i.to_string().as_bytes());
    }
}
