//! Integration tests for the longest-valid-chain rule

mod common;

use common::{ledger_with_blocks, peer_chain, Reply, ScriptedFetch};
use linkchain::{Ledger, ResolvePolicy};

fn register(ledger: &Ledger, hosts: &[&str]) {
    for host in hosts {
        ledger
            .register_node(&format!("http://{}", host))
            .expect("valid peer address");
    }
}

#[tokio::test]
async fn test_longer_valid_chain_replaces_local() {
    let local = ledger_with_blocks(1);
    let remote = peer_chain(2);
    register(&local, &["a.peer:5000"]);

    let fetch = ScriptedFetch::new().with("a.peer:5000", Reply::Chain(remote.clone()));

    assert!(local.resolve_conflicts(&fetch).await);
    assert_eq!(local.get_chain(), remote);
}

#[tokio::test]
async fn test_shorter_chain_is_ignored() {
    let local = ledger_with_blocks(1);
    let before = local.get_chain();
    register(&local, &["a.peer:5000"]);

    let fetch = ScriptedFetch::new().with("a.peer:5000", Reply::Chain(peer_chain(0)));

    assert!(!local.resolve_conflicts(&fetch).await);
    assert_eq!(local.get_chain(), before);
}

#[tokio::test]
async fn test_equal_length_chain_is_ignored() {
    let local = ledger_with_blocks(1);
    let before = local.get_chain();
    register(&local, &["a.peer:5000"]);

    let fetch = ScriptedFetch::new().with("a.peer:5000", Reply::Chain(peer_chain(1)));

    assert!(!local.resolve_conflicts(&fetch).await);
    assert_eq!(local.get_chain(), before);
}

#[tokio::test]
async fn test_invalid_longer_chain_is_skipped() {
    let local = ledger_with_blocks(1);
    let before = local.get_chain();
    register(&local, &["a.peer:5000", "b.peer:5000"]);

    let mut tampered = peer_chain(3);
    tampered.chain[2].previous_hash = "0".repeat(64);
    let valid = peer_chain(2);

    let fetch = ScriptedFetch::new()
        .with("a.peer:5000", Reply::Chain(tampered))
        .with("b.peer:5000", Reply::Chain(valid.clone()));

    assert!(local.resolve_conflicts(&fetch).await);
    assert_eq!(local.get_chain(), valid);
    assert_ne!(local.get_chain(), before);
}

#[tokio::test]
async fn test_longest_of_several_wins() {
    let local = ledger_with_blocks(0);
    register(&local, &["a.peer:5000", "b.peer:5000", "c.peer:5000"]);

    let longest = peer_chain(3);
    let fetch = ScriptedFetch::new()
        .with("a.peer:5000", Reply::Chain(peer_chain(1)))
        .with("b.peer:5000", Reply::Chain(longest.clone()))
        .with("c.peer:5000", Reply::Chain(peer_chain(2)));

    assert!(local.resolve_conflicts(&fetch).await);
    assert_eq!(local.chain_len(), 4);
    assert_eq!(local.get_chain(), longest);
}

#[tokio::test]
async fn test_unreachable_peer_aborts_resolution() {
    let local = ledger_with_blocks(0);
    register(&local, &["a.peer:5000", "b.peer:5000"]);

    let fetch = ScriptedFetch::new()
        .with("a.peer:5000", Reply::Unreachable)
        .with("b.peer:5000", Reply::Chain(peer_chain(2)));

    assert!(!local.resolve_conflicts(&fetch).await);
    assert_eq!(local.chain_len(), 1);
    // The remaining peer is never consulted.
    assert_eq!(fetch.calls(), vec!["a.peer:5000".to_string()]);
}

#[tokio::test]
async fn test_malformed_response_aborts_resolution() {
    let local = ledger_with_blocks(0);
    register(&local, &["a.peer:5000", "b.peer:5000"]);

    let fetch = ScriptedFetch::new()
        .with("a.peer:5000", Reply::Chain(peer_chain(2)))
        .with("b.peer:5000", Reply::Malformed);

    // Even a good candidate found earlier is discarded.
    assert!(!local.resolve_conflicts(&fetch).await);
    assert_eq!(local.chain_len(), 1);
}

#[tokio::test]
async fn test_rejected_chain_does_not_abort_resolution() {
    let local = ledger_with_blocks(0);
    register(&local, &["a.peer:5000", "b.peer:5000"]);

    let remote = peer_chain(2);
    let fetch = ScriptedFetch::new()
        .with("a.peer:5000", Reply::Rejected)
        .with("b.peer:5000", Reply::Chain(remote.clone()));

    assert!(local.resolve_conflicts(&fetch).await);
    assert_eq!(local.get_chain(), remote);
    assert_eq!(fetch.calls().len(), 2);
}

#[tokio::test]
async fn test_skip_policy_continues_past_failures() {
    let local = Ledger::with_policy(ResolvePolicy {
        abort_on_peer_failure: false,
    });
    register(&local, &["a.peer:5000", "b.peer:5000"]);

    let remote = peer_chain(2);
    let fetch = ScriptedFetch::new()
        .with("a.peer:5000", Reply::Unreachable)
        .with("b.peer:5000", Reply::Chain(remote.clone()));

    assert!(local.resolve_conflicts(&fetch).await);
    assert_eq!(local.get_chain(), remote);
    assert_eq!(fetch.calls().len(), 2);
}

#[tokio::test]
async fn test_no_peers_keeps_local_chain() {
    let local = ledger_with_blocks(1);
    let fetch = ScriptedFetch::new();

    assert!(!local.resolve_conflicts(&fetch).await);
    assert_eq!(local.chain_len(), 2);
    assert!(fetch.calls().is_empty());
}

#[tokio::test]
async fn test_mining_continues_on_adopted_chain() {
    let local = ledger_with_blocks(0);
    register(&local, &["a.peer:5000"]);
    let fetch = ScriptedFetch::new().with("a.peer:5000", Reply::Chain(peer_chain(2)));
    assert!(local.resolve_conflicts(&fetch).await);

    let block = local.mine("local-miner");
    assert_eq!(block.index, 4);
    assert!(linkchain::blockchain::is_valid(&local.get_chain().chain));
}
