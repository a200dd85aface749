// Worker lifecycle tests: install pre-population and generation eviction

use std::sync::Arc;

use threefold::config::{AppConfig, WorkerConfig};
use threefold::notify::{MemoryPresenter, MemoryWindows};
use threefold::worker::{
    CacheStore, CapturedResponse, MemoryCacheStore, OfflineWorker, ScriptedNetwork, WorkerEvent,
    WorkerPhase,
};

fn make_worker(
    config: AppConfig,
) -> (OfflineWorker, Arc<MemoryCacheStore>, Arc<ScriptedNetwork>) {
    let cache = Arc::new(MemoryCacheStore::new());
    let network = Arc::new(ScriptedNetwork::new());
    let worker = OfflineWorker::new(
        &config,
        cache.clone(),
        network.clone(),
        Arc::new(MemoryPresenter::new()),
        Arc::new(MemoryWindows::new()),
    )
    .unwrap();
    (worker, cache, network)
}

fn config_with_precache(precache: Vec<&str>) -> AppConfig {
    AppConfig {
        worker: WorkerConfig {
            precache: precache.into_iter().map(String::from).collect(),
            ..WorkerConfig::default()
        },
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn test_install_completes_despite_failed_entry() {
    // "/" succeeds while "/offline" is unreachable; install still completes
    // and the cache holds "/" but not "/offline"
    let (worker, cache, network) = make_worker(config_with_precache(vec!["/", "/offline"]));
    network
        .serve("https://cleave.app/", CapturedResponse::ok(b"home".to_vec()))
        .await;

    worker.handle_event(WorkerEvent::Install).await.unwrap();

    assert_eq!(worker.phase().await, WorkerPhase::Installed);
    assert!(cache
        .get("threefold-v1", "GET https://cleave.app/")
        .await
        .unwrap()
        .is_some());
    assert!(cache
        .get("threefold-v1", "GET https://cleave.app/offline")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_activate_keeps_only_current_generation() {
    // After activation only "threefold-v1" remains
    let (worker, cache, _) = make_worker(config_with_precache(vec![]));
    cache
        .put("threefold-v0", "GET https://cleave.app/", CapturedResponse::ok(b"stale".to_vec()))
        .await
        .unwrap();
    cache
        .put("threefold-v1", "GET https://cleave.app/", CapturedResponse::ok(b"current".to_vec()))
        .await
        .unwrap();

    worker.handle_event(WorkerEvent::Install).await.unwrap();
    worker.handle_event(WorkerEvent::Activate).await.unwrap();

    assert_eq!(
        cache.cache_names().await.unwrap(),
        vec!["threefold-v1".to_string()]
    );
}

#[tokio::test]
async fn test_activation_evicts_foreign_cache_names() {
    let (worker, cache, _) = make_worker(config_with_precache(vec![]));
    cache
        .put("unrelated-cache", "k", CapturedResponse::ok(b"x".to_vec()))
        .await
        .unwrap();

    worker.handle_event(WorkerEvent::Install).await.unwrap();
    worker.handle_event(WorkerEvent::Activate).await.unwrap();

    assert!(cache.cache_names().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_phase_progression() {
    let (worker, _, network) = make_worker(config_with_precache(vec!["/"]));
    network
        .serve("https://cleave.app/", CapturedResponse::ok(b"home".to_vec()))
        .await;

    assert_eq!(worker.phase().await, WorkerPhase::Parsed);
    worker.handle_event(WorkerEvent::Install).await.unwrap();
    assert_eq!(worker.phase().await, WorkerPhase::Installed);
    worker.handle_event(WorkerEvent::Activate).await.unwrap();
    assert_eq!(worker.phase().await, WorkerPhase::Active);
    assert!(worker.lifecycle().is_claimed().await);
}

#[tokio::test]
async fn test_activate_without_install_is_rejected() {
    let (worker, _, _) = make_worker(config_with_precache(vec![]));
    assert!(worker.handle_event(WorkerEvent::Activate).await.is_err());
    assert_eq!(worker.phase().await, WorkerPhase::Parsed);
}

#[tokio::test]
async fn test_new_version_supersedes_old_caches() {
    // Deploying v2 over an installed v1: activation deletes the v1 caches
    let (worker_v1, cache, network) = make_worker(config_with_precache(vec!["/"]));
    network
        .serve("https://cleave.app/", CapturedResponse::ok(b"home".to_vec()))
        .await;
    worker_v1.handle_event(WorkerEvent::Install).await.unwrap();
    worker_v1.handle_event(WorkerEvent::Activate).await.unwrap();

    let v2_config = AppConfig {
        worker: WorkerConfig {
            cache_version: "v2".to_string(),
            precache: vec!["/".to_string()],
            ..WorkerConfig::default()
        },
        ..AppConfig::default()
    };
    let worker_v2 = OfflineWorker::new(
        &v2_config,
        cache.clone(),
        network.clone(),
        Arc::new(MemoryPresenter::new()),
        Arc::new(MemoryWindows::new()),
    )
    .unwrap();

    worker_v2.handle_event(WorkerEvent::Install).await.unwrap();
    worker_v2.handle_event(WorkerEvent::Activate).await.unwrap();

    assert_eq!(
        cache.cache_names().await.unwrap(),
        vec!["threefold-v2".to_string()]
    );
}
