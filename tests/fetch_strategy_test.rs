// Fetch interception strategy tests

use std::sync::Arc;

use threefold::config::AppConfig;
use threefold::notify::{MemoryPresenter, MemoryWindows};
use threefold::worker::{
    CacheStore, CapturedResponse, EventOutcome, FetchRequest, HttpMethod, Intercepted,
    MemoryCacheStore, OfflineWorker, ResponseSource, ScriptedNetwork, WorkerEvent,
};

fn make_worker() -> (OfflineWorker, Arc<MemoryCacheStore>, Arc<ScriptedNetwork>) {
    let cache = Arc::new(MemoryCacheStore::new());
    let network = Arc::new(ScriptedNetwork::new());
    let worker = OfflineWorker::new(
        &AppConfig::default(),
        cache.clone(),
        network.clone(),
        Arc::new(MemoryPresenter::new()),
        Arc::new(MemoryWindows::new()),
    )
    .unwrap();
    (worker, cache, network)
}

async fn fetch(worker: &OfflineWorker, request: FetchRequest) -> Intercepted {
    match worker.handle_event(WorkerEvent::Fetch(request)).await.unwrap() {
        EventOutcome::Fetched(intercepted) => intercepted,
        other => panic!("expected fetch outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_network_first_freshness() {
    // A successful navigation returns the live response and the cache
    // afterwards holds an equal entry
    let (worker, cache, network) = make_worker();
    let live = CapturedResponse::ok(b"<html>dashboard</html>".to_vec());
    network.serve("https://cleave.app/dashboard", live.clone()).await;

    let result = fetch(&worker, FetchRequest::navigation("https://cleave.app/dashboard")).await;

    assert_eq!(result.source(), Some(ResponseSource::Network));
    assert_eq!(result.response(), Some(&live));

    let cached = cache
        .get("threefold-v1", "GET https://cleave.app/dashboard")
        .await
        .unwrap();
    assert_eq!(cached.as_ref(), Some(&live));
}

#[tokio::test]
async fn test_offline_fallback_page() {
    // An offline navigation with no matching entry returns the
    // pre-populated offline fallback
    let (worker, _, network) = make_worker();
    let offline_page = CapturedResponse::ok(b"<html>offline</html>".to_vec());
    network.serve("https://cleave.app/offline", offline_page.clone()).await;

    worker.handle_event(WorkerEvent::Install).await.unwrap();
    network.set_offline(true).await;

    let result = fetch(
        &worker,
        FetchRequest::navigation("https://cleave.app/groups/retreat"),
    )
    .await;

    assert_eq!(result.source(), Some(ResponseSource::OfflineFallback));
    assert_eq!(result.response(), Some(&offline_page));
}

#[tokio::test]
async fn test_cache_first_idempotence() {
    // A second asset request returns the identical cached response
    // without another network call
    let (worker, _, network) = make_worker();
    let url = "https://cleave.app/images/couple.webp";
    network.serve(url, CapturedResponse::ok(b"webp".to_vec())).await;

    let first = fetch(&worker, FetchRequest::get(url)).await;
    let second = fetch(&worker, FetchRequest::get(url)).await;

    assert_eq!(first.response(), second.response());
    assert_eq!(second.source(), Some(ResponseSource::Cache));
    assert_eq!(network.fetch_count(url).await, 1);
}

#[tokio::test]
async fn test_api_post_passes_through_untouched() {
    // POST /api/nudge is never intercepted
    let (worker, cache, network) = make_worker();

    let request = FetchRequest {
        method: HttpMethod::Post,
        url: "https://cleave.app/api/nudge".to_string(),
        accept: None,
    };
    let result = fetch(&worker, request).await;

    assert!(result.is_passthrough());
    assert_eq!(cache.entry_count("threefold-v1").await, 0);
    assert_eq!(network.fetch_count("https://cleave.app/api/nudge").await, 0);
}

#[tokio::test]
async fn test_api_get_navigation_also_bypasses() {
    let (worker, _, network) = make_worker();
    let result = fetch(&worker, FetchRequest::navigation("https://cleave.app/api/session")).await;
    assert!(result.is_passthrough());
    assert_eq!(network.fetch_count("https://cleave.app/api/session").await, 0);
}

#[tokio::test]
async fn test_backend_service_urls_bypass() {
    let (worker, _, _) = make_worker();
    let result = fetch(
        &worker,
        FetchRequest::get("https://cleave.app/storage/abcd.supabase.co/avatars"),
    )
    .await;
    assert!(result.is_passthrough());
}

#[tokio::test]
async fn test_cross_origin_requests_bypass() {
    let (worker, _, _) = make_worker();
    let result = fetch(
        &worker,
        FetchRequest::navigation("https://fonts.example.com/serif.woff2"),
    )
    .await;
    assert!(result.is_passthrough());
}

#[tokio::test]
async fn test_offline_navigation_prefers_own_cached_entry() {
    let (worker, _, network) = make_worker();
    let page = CapturedResponse::ok(b"<html>devotional</html>".to_vec());
    network.serve("https://cleave.app/devotional", page.clone()).await;
    network
        .serve("https://cleave.app/offline", CapturedResponse::ok(b"offline".to_vec()))
        .await;
    worker.handle_event(WorkerEvent::Install).await.unwrap();

    // Visit once online, then go offline: the page's own entry wins over
    // the offline fallback
    let request = FetchRequest::navigation("https://cleave.app/devotional");
    fetch(&worker, request.clone()).await;
    network.set_offline(true).await;

    let result = fetch(&worker, request).await;
    assert_eq!(result.source(), Some(ResponseSource::Cache));
    assert_eq!(result.response(), Some(&page));
}
