use anyhow::Result;
use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use threefold::config::AppConfig;
use threefold::dispatch::{DispatchError, Dispatcher, PushSender};
use threefold::notify::{MemoryPresenter, MemoryWindows, NotificationPayload};
use threefold::push::{
    MemoryPreferencesStore, MemorySubscriptionStore, PushSubscriptionManager,
    PushSubscriptionRecord, SimulatedPushChannel,
};
use threefold::worker::{
    CapturedResponse, EventOutcome, FetchRequest, MemoryCacheStore, OfflineWorker,
    ScriptedNetwork, WorkerEvent,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    let config = match parse_arg(&args, "--config") {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match command {
        "simulate" => simulate_offline(config).await?,
        "subscribe" => {
            let profile = parse_arg(&args, "--profile").unwrap_or("demo-profile").to_string();
            simulate_subscription(config, &profile).await?;
        }
        "notify" => {
            let raw = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("Payload JSON required"))?;
            render_payload(config, raw.as_bytes()).await?;
        }
        _ => print_help(),
    }

    Ok(())
}

/// Walk the worker through install, activate, and fetches with the network
/// going away halfway through.
async fn simulate_offline(config: AppConfig) -> Result<()> {
    let cache = Arc::new(MemoryCacheStore::new());
    let network = Arc::new(ScriptedNetwork::new());
    let presenter = Arc::new(MemoryPresenter::new());
    let windows = Arc::new(MemoryWindows::new());

    let origin = config.worker.origin.trim_end_matches('/').to_string();
    for path in &config.worker.precache {
        network
            .serve(
                format!("{origin}{path}"),
                CapturedResponse::ok(format!("<html>{path}</html>").into_bytes()),
            )
            .await;
    }

    let worker = OfflineWorker::new(&config, cache, network.clone(), presenter, windows)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    worker
        .handle_event(WorkerEvent::Install)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    worker
        .handle_event(WorkerEvent::Activate)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    println!("worker phase: {}", worker.phase().await.as_str());

    let home = FetchRequest::navigation(format!("{origin}/"));
    report_fetch(&worker, &home, "online navigation").await;

    network.set_offline(true).await;
    report_fetch(&worker, &home, "offline navigation (cached)").await;

    let unseen = FetchRequest::navigation(format!("{origin}/groups/retreat-2026"));
    report_fetch(&worker, &unseen, "offline navigation (fallback)").await;

    Ok(())
}

async fn report_fetch(worker: &OfflineWorker, request: &FetchRequest, label: &str) {
    match worker.handle_event(WorkerEvent::Fetch(request.clone())).await {
        Ok(EventOutcome::Fetched(intercepted)) => match intercepted.source() {
            Some(source) => println!(
                "{label}: {} ({source:?})",
                intercepted.response().map(|r| r.status).unwrap_or(0)
            ),
            None => println!("{label}: passthrough"),
        },
        Ok(_) => {}
        Err(err) => println!("{label}: failed ({err})"),
    }
}

/// Subscribe a demo profile, fan a payload out to it, and unsubscribe.
async fn simulate_subscription(config: AppConfig, profile: &str) -> Result<()> {
    let channel = Arc::new(SimulatedPushChannel::new());
    let subscriptions = Arc::new(MemorySubscriptionStore::new());
    let preferences = Arc::new(MemoryPreferencesStore::new());

    let manager = PushSubscriptionManager::new(
        &config.push,
        channel,
        subscriptions.clone(),
        preferences,
    );

    if !manager.subscribe(profile).await {
        println!("subscribe failed for {profile}");
        return Ok(());
    }
    println!("subscribed: {}", manager.is_subscribed().await);

    let dispatcher = Dispatcher::new(subscriptions, Arc::new(PrintingSender));
    let payload = NotificationPayload::decode(
        br#"{ "title": "Daily Devotional", "body": "Today's reading is ready", "url": "/devotional/today" }"#,
        &config.notify,
    );
    let report = dispatcher.deliver(&[profile.to_string()], &payload).await;
    println!("delivered {}/{} pushes", report.delivered, report.attempted);

    println!("unsubscribed: {}", manager.unsubscribe(profile).await);
    Ok(())
}

/// Decode a payload the way the worker would on push arrival and print the
/// resulting notification.
async fn render_payload(config: AppConfig, raw: &[u8]) -> Result<()> {
    let payload = NotificationPayload::decode(raw, &config.notify);
    println!("title: {}", payload.title);
    println!("body:  {}", payload.body);
    println!("url:   {}", payload.url);
    if let Some(tag) = &payload.tag {
        println!("tag:   {tag}");
    }
    for action in &payload.actions {
        println!("action: {} ({})", action.title, action.action);
    }
    Ok(())
}

struct PrintingSender;

#[async_trait]
impl PushSender for PrintingSender {
    async fn send(
        &self,
        subscription: &PushSubscriptionRecord,
        payload: &NotificationPayload,
    ) -> std::result::Result<(), DispatchError> {
        println!("push -> {}: {}", subscription.endpoint, payload.title);
        Ok(())
    }
}

fn parse_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

fn print_help() {
    println!("threefold - offline cache and push delivery core");
    println!();
    println!("Usage:");
    println!("  threefold simulate [--config <path>]");
    println!("  threefold subscribe [--profile <id>] [--config <path>]");
    println!("  threefold notify <payload-json> [--config <path>]");
}
