//! DID lifecycle against an in-memory ledger.

use std::sync::Arc;

use ledger_vdr::{
    CreateOptions, DidDocument, LedgerService, Method, NetworkConfig, NetworkRegistry, Outcome,
    ResolveOutcome, UpdateFields,
};
use test_ledger::{DuplicatePolicy, MockLedger};

fn service(ledger: &MockLedger) -> LedgerService<MockLedger> {
    let registry = NetworkRegistry::new(vec![
        NetworkConfig::new("testnet", "http://ledger").auth_token("T"),
        NetworkConfig::new("devnet", "http://dev-ledger"),
    ]);
    LedgerService::new(Arc::new(registry), ledger.clone())
}

// Create on the default network and read back the same key.
#[tokio::test]
async fn create_then_resolve() {
    let ledger = MockLedger::new();
    let svc = service(&ledger);

    let Outcome::Finished(created) = svc.create(CreateOptions::new("demo123", "Verkey123")).await
    else {
        panic!("should finish");
    };
    assert_eq!(created.did, "did:testnet:demo123");
    assert_eq!(created.verkey, "Verkey123");

    let vm = created.document.authentication_key().expect("should have key");
    assert_eq!(vm.public_key_base58, "Verkey123");
    assert_eq!(created.document.verification_method.len(), 1);

    let ResolveOutcome::Found(doc) = svc.resolve(&created.did).await else {
        panic!("should resolve");
    };
    assert_eq!(doc, created.document);
}

#[tokio::test]
async fn create_on_each_network() {
    let ledger = MockLedger::new();
    let svc = service(&ledger);

    for network in ["testnet", "devnet"] {
        let outcome = svc.create(CreateOptions::new("abc", "Key").network(network)).await;
        let Outcome::Finished(created) = outcome else {
            panic!("should finish on {network}");
        };
        assert_eq!(created.did, format!("did:{network}:abc"));
    }
    assert!(ledger.ledger().nym("did:testnet:abc").is_some());
    assert!(ledger.ledger().nym("did:devnet:abc").is_some());
}

#[tokio::test]
async fn invalid_input_never_reaches_ledger() {
    let ledger = MockLedger::new();
    let svc = service(&ledger);

    assert!(!svc.create(CreateOptions::new("", "Verkey123")).await.is_finished());
    assert!(!svc.create(CreateOptions::new("demo123", "")).await.is_finished());
    assert!(matches!(svc.resolve("did:mainnet:demo123").await, ResolveOutcome::Error(_)));
    assert!(!svc.update("did:mainnet:demo123", UpdateFields::default()).await.is_finished());
    assert!(!svc.deactivate("not-a-did").await.is_finished());

    assert!(ledger.calls().is_empty());
}

#[tokio::test]
async fn resolve_unknown_did() {
    let ledger = MockLedger::new();
    let svc = service(&ledger);

    let outcome = svc.resolve("did:testnet:missing").await;
    assert!(matches!(outcome, ResolveOutcome::NotFound(_)), "{outcome:?}");
}

#[tokio::test]
async fn duplicate_rejected() {
    let ledger = MockLedger::with_policy(DuplicatePolicy::Reject);
    let svc = service(&ledger);

    assert!(svc.create(CreateOptions::new("demo123", "Verkey123")).await.is_finished());
    let outcome = svc.create(CreateOptions::new("demo123", "Other")).await;
    assert_eq!(
        outcome.reason(),
        Some("Ledger returned 409: nym did:testnet:demo123 already exists")
    );

    // no read precedes a create
    let calls = ledger.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.method == Method::Post && c.path == "/CreateTransaction"));
}

#[tokio::test]
async fn duplicate_accepted() {
    let ledger = MockLedger::with_policy(DuplicatePolicy::Accept);
    let svc = service(&ledger);

    assert!(svc.create(CreateOptions::new("demo123", "Verkey123")).await.is_finished());
    assert!(svc.create(CreateOptions::new("demo123", "Other")).await.is_finished());

    let ResolveOutcome::Found(doc) = svc.resolve("did:testnet:demo123").await else {
        panic!("should resolve");
    };
    assert_eq!(doc, DidDocument::build("did:testnet:demo123", "Other"));
}

#[tokio::test]
async fn update_key_and_role() {
    let ledger = MockLedger::new();
    let svc = service(&ledger);
    assert!(svc.create(CreateOptions::new("demo123", "Verkey123")).await.is_finished());

    // role only: key is left as is
    let fields = UpdateFields {
        verkey: None,
        role: Some("ENDORSER".into()),
    };
    assert!(svc.update("did:testnet:demo123", fields).await.is_finished());
    let nym = ledger.ledger().nym("did:testnet:demo123").expect("should exist");
    assert_eq!(nym["verkey"], "Verkey123");
    assert_eq!(nym["role"], "ENDORSER");

    let fields = UpdateFields {
        verkey: Some("NewKey".into()),
        role: None,
    };
    assert!(svc.update("did:testnet:demo123", fields).await.is_finished());

    let ResolveOutcome::Found(doc) = svc.resolve("did:testnet:demo123").await else {
        panic!("should resolve");
    };
    let vm = doc.authentication_key().expect("should have key");
    assert_eq!(vm.public_key_base58, "NewKey");
}

#[tokio::test]
async fn update_unknown_did() {
    let ledger = MockLedger::new();
    let svc = service(&ledger);

    let outcome = svc.update("did:testnet:missing", UpdateFields::default()).await;
    assert_eq!(outcome.reason(), Some("Ledger returned 404: nym did:testnet:missing not found"));
}

#[tokio::test]
async fn deactivate_then_resolve() {
    let ledger = MockLedger::new();
    let svc = service(&ledger);
    assert!(svc.create(CreateOptions::new("demo123", "Verkey123")).await.is_finished());

    assert_eq!(svc.deactivate("did:testnet:demo123").await, Outcome::Finished(()));
    assert!(matches!(svc.resolve("did:testnet:demo123").await, ResolveOutcome::NotFound(_)));

    // second delete is rejected by the ledger
    assert!(!svc.deactivate("did:testnet:demo123").await.is_finished());
}

#[tokio::test]
async fn rejecting_ledger() {
    let ledger = MockLedger::rejecting(503);
    let svc = service(&ledger);

    let outcome = svc.create(CreateOptions::new("demo123", "Verkey123")).await;
    assert_eq!(outcome.reason(), Some("Ledger returned 503: rejected"));
    assert!(!svc.deactivate("did:testnet:demo123").await.is_finished());
    assert!(matches!(svc.resolve("did:testnet:demo123").await, ResolveOutcome::NotFound(_)));
}

#[tokio::test]
async fn concurrent_creates() {
    let ledger = MockLedger::new();
    let svc = service(&ledger);

    let mut handles = Vec::new();
    for i in 0..8 {
        let svc = svc.clone();
        handles.push(tokio::spawn(async move {
            svc.create(CreateOptions::new(format!("id{i}"), format!("Key{i}"))).await
        }));
    }
    for handle in handles {
        assert!(handle.await.expect("should join").is_finished());
    }
    assert_eq!(ledger.calls().len(), 8);
}

// Every DID `create` reports as finished is addressable afterwards.
#[tokio::test]
async fn unusual_identifiers_round_trip() {
    let ledger = MockLedger::new();
    let registry = NetworkRegistry::new(vec![NetworkConfig::new("fabric.test", "http://ledger")]);
    let svc = LedgerService::new(Arc::new(registry), ledger.clone());

    for id in ["demo123", "a/b", "a b", "a+b", "abc#1?x=2"] {
        let Outcome::Finished(created) = svc.create(CreateOptions::new(id, "Verkey123")).await
        else {
            panic!("should create {id}");
        };
        assert_eq!(created.did, format!("did:fabric.test:{id}"));

        let ResolveOutcome::Found(doc) = svc.resolve(&created.did).await else {
            panic!("should resolve {}", created.did);
        };
        assert_eq!(doc, created.document);

        assert!(svc.deactivate(&created.did).await.is_finished(), "{}", created.did);
        assert!(ledger.ledger().nym(&created.did).is_none());
    }
}
