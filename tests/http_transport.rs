//! `HttpTransport` against a ledger served over HTTP.

use std::time::Duration;

use ledger_vdr::{
    CreateOptions, Error, HttpTransport, LedgerConfig, LedgerModule, LedgerTransport, Method,
    NetworkConfig, Outcome, ResolveOutcome, UpdateFields,
};
use serde_json::{json, Value};
use test_ledger::{LedgerServer, ServerOptions};

async fn server(token: Option<&str>) -> LedgerServer {
    let options = ServerOptions {
        token: token.map(ToString::to_string),
        ..ServerOptions::default()
    };
    LedgerServer::start(options).await.expect("should start")
}

fn config(base_url: &str, token: Option<&str>) -> LedgerConfig {
    let mut network = NetworkConfig::new("testnet", base_url);
    network.auth_token = token.map(ToString::to_string);
    LedgerConfig {
        networks: vec![network],
        timeout_secs: Some(5),
    }
}

#[tokio::test]
async fn lifecycle_over_http() {
    let server = server(Some("Bearer T")).await;
    let module = LedgerModule::new(&config(server.base_url(), Some("Bearer T"))).expect("should build");
    let svc = module.service();

    let Outcome::Finished(created) = svc.create(CreateOptions::new("demo123", "Verkey123")).await
    else {
        panic!("should finish");
    };
    assert_eq!(created.did, "did:testnet:demo123");
    assert!(server.ledger().nym("did:testnet:demo123").is_some());

    let ResolveOutcome::Found(doc) = svc.resolve("did:testnet:demo123").await else {
        panic!("should resolve");
    };
    assert_eq!(doc, created.document);

    let fields = UpdateFields {
        verkey: Some("NewKey".into()),
        role: None,
    };
    assert!(svc.update("did:testnet:demo123", fields).await.is_finished());
    let nym = server.ledger().nym("did:testnet:demo123").expect("should exist");
    assert_eq!(nym["verkey"], "NewKey");

    assert!(svc.deactivate("did:testnet:demo123").await.is_finished());
    assert!(matches!(svc.resolve("did:testnet:demo123").await, ResolveOutcome::NotFound(_)));
}

#[tokio::test]
async fn trailing_slash_in_base_url() {
    let server = server(None).await;
    let base_url = format!("{}/", server.base_url());
    let module = LedgerModule::new(&config(&base_url, None)).expect("should build");

    let outcome = module.service().create(CreateOptions::new("demo123", "Verkey123")).await;
    assert!(outcome.is_finished(), "{outcome:?}");
}

#[tokio::test]
async fn authorization_sent_verbatim() {
    let server = server(Some("Bearer T")).await;
    let transport = HttpTransport::new().expect("should build");

    let network = NetworkConfig::new("testnet", server.base_url()).auth_token("Bearer T");
    let body = json!({
        "transaction": {"operation": {"dest": "demo123", "verkey": "Verkey123", "role": "TRUST_ANCHOR"}},
        "type": "nym",
        "network": "testnet"
    });
    let res = transport
        .send(&network, Method::Post, "/CreateTransaction", Some(&body))
        .await
        .expect("should be accepted");
    assert_eq!(res["did"], "did:testnet:demo123");

    // missing or different token
    for network in [
        NetworkConfig::new("testnet", server.base_url()),
        NetworkConfig::new("testnet", server.base_url()).auth_token("T"),
    ] {
        let err = transport
            .send(&network, Method::Get, "/ReadTransaction/did%3Atestnet%3Ademo123/nym", None)
            .await
            .expect_err("should be rejected");
        assert_eq!(
            err,
            Error::LedgerRejected {
                status: 401,
                body: "unauthorized".into()
            }
        );
    }
}

#[tokio::test]
async fn non_2xx_is_rejection() {
    let server = server(None).await;
    let transport = HttpTransport::new().expect("should build");
    let network = NetworkConfig::new("testnet", server.base_url());

    let err = transport
        .send(&network, Method::Delete, "/DeleteTransaction/did%3Atestnet%3Amissing", None)
        .await
        .expect_err("should be rejected");
    assert_eq!(
        err,
        Error::LedgerRejected {
            status: 404,
            body: "nym did:testnet:missing not found".into()
        }
    );
}

#[tokio::test]
async fn connection_failure_is_transport_error() {
    // bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("should bind");
    let addr = listener.local_addr().expect("should have address");
    drop(listener);

    let transport = HttpTransport::new().expect("should build");
    let network = NetworkConfig::new("testnet", format!("http://{addr}"));
    let err = transport
        .send(&network, Method::Get, "/ReadTransaction/x/nym", None)
        .await
        .expect_err("should fail");
    assert_eq!(err.code(), "request_error");
}

#[tokio::test]
async fn timeout_is_transport_error() {
    let options = ServerOptions {
        delay: Some(Duration::from_secs(5)),
        ..ServerOptions::default()
    };
    let server = LedgerServer::start(options).await.expect("should start");

    let transport = HttpTransport::with_timeout(Duration::from_millis(200)).expect("should build");
    let network = NetworkConfig::new("testnet", server.base_url());
    let err = transport
        .send(&network, Method::Get, "/ReadTransaction/did%3Atestnet%3Ademo123/nym", None)
        .await
        .expect_err("should time out");
    assert_eq!(err.code(), "request_error");
}

#[tokio::test]
async fn invalid_base_url() {
    let transport = HttpTransport::new().expect("should build");
    let network = NetworkConfig::new("testnet", "not a url");
    let err = transport
        .send(&network, Method::Get, "/ReadTransaction/x/nym", None)
        .await
        .expect_err("should fail");
    assert_eq!(err.code(), "request_error");
}

async fn raw_read(read_body: &str) -> ledger_vdr::Result<Value> {
    let options = ServerOptions {
        read_body: Some(read_body.to_string()),
        ..ServerOptions::default()
    };
    let server = LedgerServer::start(options).await.expect("should start");

    let transport = HttpTransport::from_client(reqwest::Client::new());
    let network = NetworkConfig::new("testnet", server.base_url());
    transport.send(&network, Method::Get, "/ReadTransaction/did%3Atestnet%3Ademo123/nym", None).await
}

#[tokio::test]
async fn malformed_2xx_is_transport_error() {
    let err = raw_read("not json").await.expect_err("should fail");
    assert_eq!(err.code(), "request_error");
}

#[tokio::test]
async fn empty_2xx_is_null() {
    let value = raw_read("").await.expect("should succeed");
    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn encoded_identifiers_over_http() {
    let server = server(None).await;
    let module = LedgerModule::new(&config(server.base_url(), None)).expect("should build");
    let svc = module.service();

    for id in ["a b", "a/b", "a+b"] {
        let Outcome::Finished(created) = svc.create(CreateOptions::new(id, "Verkey123")).await
        else {
            panic!("should create {id}");
        };
        let ResolveOutcome::Found(doc) = svc.resolve(&created.did).await else {
            panic!("should resolve {}", created.did);
        };
        assert_eq!(doc, created.document);
        assert!(svc.deactivate(&created.did).await.is_finished(), "{}", created.did);
    }
}
