//! # Reconciliation Tests
//!
//! The decision procedure and the fetch → decide → write entry point,
//! run against the in-memory secret store.

mod common;

use ca_completer::constants::{CA_CRT_KEY, TLS_CRT_KEY};
use ca_completer::prelude::*;
use common::{
    secret_ref, tls_view, typed_view, MemorySecretStore, RacingSecretStore, ISSUER, LEAF,
};
use std::sync::atomic::Ordering;

mod decide_tests {
    use super::*;

    #[test]
    fn test_two_certificate_chain_uses_issuer() {
        let chain = format!("{LEAF}{ISSUER}");
        let outcome = decide(&secret_ref(), &tls_view(None, Some(chain.as_str())));
        assert_eq!(outcome, ReconcileOutcome::Updated(ISSUER.as_bytes().to_vec()));
    }

    #[test]
    fn test_single_certificate_chain() {
        let outcome = decide(&secret_ref(), &tls_view(Some(""), Some(LEAF)));
        assert_eq!(outcome, ReconcileOutcome::Updated(LEAF.as_bytes().to_vec()));
    }

    #[test]
    fn test_existing_ca_is_never_replaced() {
        let tls_crts = [
            format!("{LEAF}{ISSUER}"),
            LEAF[..LEAF.len() - 100].to_string(),
            "not a certificate".to_string(),
            "\n\n".to_string(),
        ];
        for tls_crt in &tls_crts {
            let outcome = decide(&secret_ref(), &tls_view(Some(ISSUER), Some(tls_crt.as_str())));
            assert_eq!(outcome, ReconcileOutcome::Unchanged(SkipReason::HasCa));
        }
    }

    #[test]
    fn test_non_tls_secret_is_ignored() {
        let chain = format!("{LEAF}{ISSUER}");
        let outcome = decide(&secret_ref(), &typed_view("Opaque", Some(""), Some(chain.as_str())));
        assert_eq!(outcome, ReconcileOutcome::Unchanged(SkipReason::NotTls));
    }

    #[test]
    fn test_missing_tls_crt_is_ignored() {
        let outcome = decide(&secret_ref(), &tls_view(None, None));
        assert_eq!(outcome, ReconcileOutcome::Unchanged(SkipReason::EmptyTlsCrt));
    }

    #[test]
    fn test_partial_certificate_fails() {
        let partial = &LEAF[..LEAF.len() - 100];
        let outcome = decide(&secret_ref(), &tls_view(None, Some(partial)));
        assert_eq!(outcome, ReconcileOutcome::Failed(ChainError::InvalidChain));
    }

    #[test]
    fn test_non_pem_text_fails() {
        let outcome = decide(&secret_ref(), &tls_view(None, Some("random text")));
        assert_eq!(outcome, ReconcileOutcome::Failed(ChainError::InvalidChain));
    }

    #[test]
    fn test_blank_tls_crt_fails() {
        let outcome = decide(&secret_ref(), &tls_view(None, Some("  \n\n")));
        assert_eq!(outcome, ReconcileOutcome::Failed(ChainError::InvalidChain));
    }
}

mod event_tests {
    use super::*;

    #[tokio::test]
    async fn test_updates_ca_and_leaves_other_fields() {
        let chain = format!("{LEAF}{ISSUER}");
        let store = MemorySecretStore::with_secret(secret_ref(), tls_view(None, Some(chain.as_str())));

        let outcome = on_secret_event(&store, &secret_ref()).await.unwrap();
        assert_eq!(outcome, EventOutcome::Updated);

        let stored = store.get(&secret_ref()).unwrap();
        assert_eq!(stored.field(CA_CRT_KEY), ISSUER.as_bytes());
        assert_eq!(stored.field(TLS_CRT_KEY), chain.as_bytes());
        assert_eq!(stored.resource_version.as_deref(), Some("2"));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_event_is_a_no_op() {
        let store = MemorySecretStore::with_secret(secret_ref(), tls_view(None, Some(LEAF)));

        assert_eq!(
            on_secret_event(&store, &secret_ref()).await.unwrap(),
            EventOutcome::Updated
        );
        assert_eq!(
            on_secret_event(&store, &secret_ref()).await.unwrap(),
            EventOutcome::Unchanged(SkipReason::HasCa)
        );
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_chain_is_surfaced_without_writing() {
        let partial = &LEAF[..LEAF.len() - 100];
        let store = MemorySecretStore::with_secret(secret_ref(), tls_view(None, Some(partial)));

        let err = on_secret_event(&store, &secret_ref()).await.unwrap_err();
        assert!(matches!(
            err,
            ReconcilerError::InvalidChain {
                source: ChainError::InvalidChain,
                ..
            }
        ));
        assert_eq!(err.disposition(), Disposition::Surface);
        assert_eq!(
            err.to_string(),
            "secret test-namespace/test-secret: failed to parse certificate chain in tls.crt"
        );
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert!(store.get(&secret_ref()).unwrap().field(CA_CRT_KEY).is_empty());
    }

    #[tokio::test]
    async fn test_missing_secret_is_gone() {
        let store = MemorySecretStore::default();
        let outcome = on_secret_event(&store, &secret_ref()).await.unwrap();
        assert_eq!(outcome, EventOutcome::Gone);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_retryable() {
        let store = MemorySecretStore::with_secret(secret_ref(), tls_view(None, Some(LEAF)));
        store.fail_fetch.store(true, Ordering::SeqCst);

        let err = on_secret_event(&store, &secret_ref()).await.unwrap_err();
        assert!(matches!(err, ReconcilerError::Store(StoreError::Backend(_))));
        assert_eq!(err.disposition(), Disposition::Retry);
        assert!(!err.is_conflict());
    }

    #[tokio::test]
    async fn test_concurrent_modification_is_a_retryable_conflict() {
        let store = RacingSecretStore {
            inner: MemorySecretStore::with_secret(secret_ref(), tls_view(None, Some(LEAF))),
        };

        let err = on_secret_event(&store, &secret_ref()).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(err.disposition(), Disposition::Retry);
        assert_eq!(store.inner.writes.load(Ordering::SeqCst), 0);

        // A retry sees the fresh version and succeeds against the plain store
        let outcome = on_secret_event(&store.inner, &secret_ref()).await.unwrap();
        assert_eq!(outcome, EventOutcome::Updated);
    }

    #[tokio::test]
    async fn test_works_through_trait_object() {
        let store: std::sync::Arc<dyn SecretStore> = std::sync::Arc::new(
            MemorySecretStore::with_secret(secret_ref(), typed_view("Opaque", None, Some(LEAF))),
        );
        let outcome = on_secret_event(store.as_ref(), &secret_ref()).await.unwrap();
        assert_eq!(outcome, EventOutcome::Unchanged(SkipReason::NotTls));
    }
}
