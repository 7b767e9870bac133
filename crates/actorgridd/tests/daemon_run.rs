//! Runs the daemon node from the bundled sample configuration.

use std::path::Path;
use std::time::Duration;

use tokio::sync::watch;

use actorgridd::{DaemonConfig, Node};

fn sample_config() -> DaemonConfig {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("actorgrid.toml");
    DaemonConfig::from_file(&path).unwrap()
}

#[test]
fn sample_config_is_valid() {
    let config = sample_config();
    assert_eq!(config.cluster.peers, vec!["p1", "p2", "p3"]);
    assert_eq!(config.pools.len(), 2);
    assert_eq!(config.scheduler.prune_dead_after_cycles, 30);
}

#[test]
fn missing_config_file_is_an_error() {
    let err = DaemonConfig::from_file(Path::new("/nonexistent/actorgrid.toml")).unwrap_err();
    assert!(err.to_string().contains("No such file"));
}

#[tokio::test(start_paused = true)]
async fn sample_cluster_converges_and_survives_peer_loss() {
    let node = Node::build(&sample_config()).unwrap();
    let cluster = node.cluster();
    let tracker = node.tracker();
    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(node.run(rx, Some(Duration::from_secs(5))));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(tracker.missing().is_empty());
    // Six workers, two indexers, one monitor per peer.
    assert_eq!(cluster.num_actors(), 11);

    cluster.lose_peer("p3");
    tokio::time::sleep(Duration::from_secs(40)).await;
    assert!(tracker.missing().is_empty());
    assert!(cluster.actors_on("p3").is_empty());
    for pool in tracker.pool_names() {
        let pool = tracker.pool(&pool).unwrap();
        assert_eq!(pool.num_registered_on("p3"), 0);
    }

    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}
