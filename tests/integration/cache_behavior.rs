//! Remote cache behavior observed through the fetcher and compiler

use anyhow::Result;
use filetime::FileTime;
use mdxe::cache::{CacheStore, Freshness};
use mdxe::compiler::CompileOptions;
use mdxe::core::ArtifactReference;
use mdxe::fetcher::HttpResponse;
use mdxe::test_utils::{DocumentFixture, TestProject};
use std::path::Path;
use std::time::{Duration, SystemTime};

const URL: &str = "https://esm.sh/react@18.2.0";

fn age(path: &Path, seconds: u64) -> Result<()> {
    let then = SystemTime::now() - Duration::from_secs(seconds);
    filetime::set_file_mtime(path, FileTime::from_system_time(then))?;
    Ok(())
}

/// Compiling twice within the TTL issues one request per artifact
#[tokio::test]
async fn test_repeat_compile_uses_cache() -> Result<()> {
    let project = TestProject::new()?;
    project.transport.respond(URL, HttpResponse::ok("export default React"));
    let compiler = project.compiler()?;

    let document = DocumentFixture::new("a.mdx").with_body("<App />").document();
    let options = CompileOptions::default().with_component(ArtifactReference::new("React", URL));

    let first = compiler.compile(&document, &options).await?;
    let second = compiler.compile(&document, &options).await?;

    assert_eq!(first, second);
    assert_eq!(project.transport.request_count(URL), 1);
    Ok(())
}

/// Entry is named by the SHA-256 of the exact URL string
#[tokio::test]
async fn test_entry_location_is_content_addressed() -> Result<()> {
    let project = TestProject::new()?;
    project.transport.respond(URL, HttpResponse::ok("export default React"));

    project.fetcher().fetch(URL, None).await?;

    let entry = project.cache_dir().join(CacheStore::key_for(URL));
    assert_eq!(std::fs::read_to_string(&entry)?, "export default React");
    assert_eq!(CacheStore::key_for(URL).len(), 64);
    assert_ne!(CacheStore::key_for(URL), CacheStore::key_for("https://esm.sh/react@18.2.0/"));
    Ok(())
}

/// Cache entries written by one fetcher are visible to another over the same root
#[tokio::test]
async fn test_cache_shared_across_fetchers() -> Result<()> {
    let project = TestProject::new()?;
    project.transport.respond(URL, HttpResponse::ok("shared"));

    project.fetcher().fetch(URL, None).await?;
    let content = project.fetcher().fetch(URL, None).await?;

    assert_eq!(content, "shared");
    assert_eq!(project.transport.request_count(URL), 1);
    Ok(())
}

/// Concurrent cold fetches of one URL all succeed and leave a complete entry
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cold_fetches() -> Result<()> {
    let project = TestProject::new()?;
    let body = "x".repeat(64 * 1024);
    project.transport.respond(URL, HttpResponse::ok(body.clone()));
    project.transport.set_delay(Duration::from_millis(20));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let fetcher = project.fetcher();
        handles.push(tokio::spawn(async move { fetcher.fetch(URL, None).await }));
    }
    for handle in handles {
        assert_eq!(handle.await??, body);
    }

    let entry = project.cache().lookup(URL).await.expect("entry should exist");
    assert_eq!(entry.content, body);
    let leftovers: Vec<_> = std::fs::read_dir(project.cache_dir())?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temporary files left behind: {leftovers:?}");
    Ok(())
}

/// A stale entry is served, then replaced in the background
#[tokio::test]
async fn test_stale_entry_served_then_refreshed() -> Result<()> {
    let project = TestProject::new()?;
    let cache = project.cache();
    let path = cache.store(URL, "old").await?;
    age(&path, 23 * 3600 + 30 * 60)?;
    assert_eq!(cache.lookup(URL).await.map(|e| e.freshness), Some(Freshness::RefreshDue));

    project.transport.respond(URL, HttpResponse::ok("new"));
    project.transport.set_delay(Duration::from_millis(50));

    let served = project.fetcher().fetch(URL, None).await?;
    assert_eq!(served, "old");

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if std::fs::read_to_string(&path)? == "new" {
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "background refresh never landed");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(cache.lookup(URL).await.map(|e| e.freshness), Some(Freshness::Fresh));
    Ok(())
}

/// Background refresh failures change neither the result nor the entry
#[tokio::test]
async fn test_refresh_failure_is_silent() -> Result<()> {
    let project = TestProject::new()?;
    let path = project.cache().store(URL, "old").await?;
    age(&path, 23 * 3600 + 30 * 60)?;
    project.transport.fail(URL, "connection reset by peer");

    let served = project.fetcher().fetch(URL, None).await?;
    assert_eq!(served, "old");
    assert!(project.transport.wait_for_requests(URL, 1, Duration::from_secs(5)).await);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(std::fs::read_to_string(&path)?, "old");
    Ok(())
}

/// An expired entry is a miss; the fetch blocks on the network
#[tokio::test]
async fn test_expired_entry_refetched() -> Result<()> {
    let project = TestProject::new()?;
    let path = project.cache().store(URL, "ancient").await?;
    age(&path, 25 * 3600)?;
    project.transport.respond(URL, HttpResponse::ok("current"));

    assert_eq!(project.fetcher().fetch(URL, None).await?, "current");
    assert_eq!(std::fs::read_to_string(&path)?, "current");
    Ok(())
}

/// Expired entry with an unreachable origin is a failure, not a stale hit
#[tokio::test]
async fn test_expired_entry_not_used_as_fallback() -> Result<()> {
    let project = TestProject::new()?;
    let path = project.cache().store(URL, "ancient").await?;
    age(&path, 25 * 3600)?;
    project.transport.fail(URL, "network unreachable");

    assert!(project.fetcher().fetch(URL, None).await.is_err());
    Ok(())
}

/// Configured TTL governs expiry
#[tokio::test]
async fn test_configured_ttl() -> Result<()> {
    let mut project = TestProject::new()?;
    project.config.cache.ttl_hours = 1;
    project.config.cache.refresh_window_minutes = 10;

    let store = project.config.cache_store();
    assert_eq!(store.root(), project.cache_dir().as_path());
    assert_eq!(store.ttl(), Duration::from_secs(3600));

    let path = store.store(URL, "cached").await?;
    age(&path, 2 * 3600)?;
    assert!(store.lookup(URL).await.is_none());
    Ok(())
}
