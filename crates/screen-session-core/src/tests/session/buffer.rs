use crate::session::ChunkCollector;

use std::time::Duration;

/// WHAT: Chunks are kept in arrival order and empty chunks are skipped
/// WHY: The uploaded blob is the in-order concatenation of real data
#[tokio::test]
async fn given_chunks_when_channel_closes_then_collected_in_order() {
    // Given: A collector
    let (tx, collector) = ChunkCollector::spawn(4);

    // When: Sending chunks, including an empty one, then closing
    for chunk in [b"a".to_vec(), Vec::new(), b"b".to_vec(), b"c".to_vec()] {
        let _ = tx.send(chunk).await;
    }
    drop(tx);
    let chunks = collector.finish(Duration::from_secs(1)).await;

    // Then: Non-empty chunks in order
    assert_eq!(chunks, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
}

/// WHAT: Finish returns what arrived when the sender never closes
/// WHY: A stuck capture must not hang stop
#[tokio::test(start_paused = true)]
async fn given_open_channel_when_finishing_then_timeout_returns_partial() {
    // Given: A collector whose sender stays alive
    let (tx, collector) = ChunkCollector::spawn(4);
    let _ = tx.send(b"partial".to_vec()).await;
    tokio::task::yield_now().await;

    // When: Finishing with a short timeout
    let chunks = collector.finish(Duration::from_millis(100)).await;

    // Then: The chunk that arrived is returned
    assert_eq!(chunks, vec![b"partial".to_vec()]);
    drop(tx);
}

/// WHAT: Abort discards collected chunks
/// WHY: A failed start must leave nothing behind
#[tokio::test]
async fn given_collected_chunks_when_aborted_then_sender_sees_closed_channel() {
    let (tx, collector) = ChunkCollector::spawn(2);
    let _ = tx.send(b"x".to_vec()).await;

    collector.abort();

    let closed = tokio::time::timeout(Duration::from_secs(1), tx.closed()).await;
    assert!(closed.is_ok());
    assert!(tx.send(b"y".to_vec()).await.is_err());
}
