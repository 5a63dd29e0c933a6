//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the forum and the tracker list
//! and run the crawl, thread processing and catalog writes end-to-end
//! against an in-memory store.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tb_harvest::catalog::CatalogReader;
use tb_harvest::config::Config;
use tb_harvest::crawler::{
    Coordinator, FetchOutcome, Fetcher, ForumCrawler, Schedule, Scheduler, StopReason,
    ThreadProcessor, UrlQueue,
};
use tb_harvest::store::{Batch, SharedStore, SqliteStore, Store, StoreError, StoreResult};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PATH: &str = "/forums/forum/63-series/";
const HASH: &str = "0123456789abcdef0123456789abcdef01234567";
const DAY_SECS: i64 = 24 * 3600;

/// Creates a test configuration pointing at the mock forum, with no throttle
/// and millisecond backoff
fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::for_forum(format!("{}{}", server.uri(), LISTING_PATH));
    config.crawler.request_throttle_ms = 0;
    config.crawler.request_timeout_secs = 5;
    config.crawler.max_concurrency = 4;
    config.crawler.initial_pages = 5;
    config.retry.max_attempts = 3;
    config.retry.base_delay_ms = 1;
    config.retry.max_delay_ms = 5;
    config.trackers.source_url = format!("{}/trackers.txt", server.uri());
    config
}

fn memory_store() -> SharedStore {
    Arc::new(SqliteStore::new_in_memory().expect("in-memory store"))
}

fn fetcher(config: &Config) -> Arc<Fetcher> {
    Arc::new(Fetcher::from_config(config).expect("fetcher"))
}

fn crawler(config: &Config, store: &SharedStore, queue: &UrlQueue) -> ForumCrawler {
    ForumCrawler::new(
        fetcher(config),
        store.clone(),
        queue.clone(),
        config.forum.base_url.clone(),
        config.crawler.revisit_cooldown(),
    )
}

fn topic_url(server: &MockServer, id: u32) -> String {
    format!("{}/forums/topic/{}-release-thread/", server.uri(), id)
}

/// A listing page with one hover-card link per thread id
fn listing_page(server: &MockServer, ids: &[u32]) -> String {
    let links: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<li><a data-ipshover href="{}">Thread {}</a></li>"#,
                topic_url(server, *id),
                id
            )
        })
        .collect();
    format!("<html><body><ul>{}</ul></body></html>", links)
}

fn magnet_for(title: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(title.as_bytes()).collect();
    format!("magnet:?xt=urn:btih:{}&dn={}", HASH, encoded)
}

fn thread_page(magnets: &[String]) -> String {
    let links: String = magnets
        .iter()
        .map(|m| format!(r#"<a href="{}">Download</a>"#, m.replace('&', "&amp;")))
        .collect();
    format!("<html><body><div class=\"post\">{}</div></body></html>", links)
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn drain(queue: &UrlQueue) -> Vec<String> {
    std::iter::from_fn(|| queue.try_pop()).collect()
}

#[tokio::test]
async fn test_pagination_stops_at_missing_page() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    mount_page(&server, LISTING_PATH, listing_page(&server, &[1, 2])).await;
    mount_page(
        &server,
        "/forums/forum/63-series/page/2/",
        listing_page(&server, &[3]),
    )
    .await;
    // Page 3 is not mounted, so wiremock answers 404

    let store = memory_store();
    let queue = UrlQueue::new();
    let report = crawler(&config, &store, &queue).run(10).await.unwrap();

    assert_eq!(report.pages_crawled, 2);
    assert_eq!(report.stop_reason, StopReason::NotFound);
    assert_eq!(report.enqueued, 3);
    assert_eq!(
        drain(&queue),
        vec![
            topic_url(&server, 1),
            topic_url(&server, 2),
            topic_url(&server, 3)
        ]
    );
}

#[tokio::test]
async fn test_pagination_stops_on_page_without_threads() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    mount_page(&server, LISTING_PATH, listing_page(&server, &[1])).await;
    mount_page(
        &server,
        "/forums/forum/63-series/page/2/",
        "<html><body><p>No topics</p></body></html>".to_string(),
    )
    .await;

    let store = memory_store();
    let queue = UrlQueue::new();
    let report = crawler(&config, &store, &queue).run(10).await.unwrap();

    assert_eq!(report.stop_reason, StopReason::NoThreadLinks);
    assert_eq!(report.pages_crawled, 2);
    assert_eq!(report.enqueued, 1);
}

#[tokio::test]
async fn test_page_budget_limits_crawl() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    mount_page(&server, LISTING_PATH, listing_page(&server, &[1])).await;
    mount_page(
        &server,
        "/forums/forum/63-series/page/2/",
        listing_page(&server, &[2]),
    )
    .await;

    let store = memory_store();
    let queue = UrlQueue::new();
    let report = crawler(&config, &store, &queue).run(1).await.unwrap();

    assert_eq!(report.stop_reason, StopReason::PageBudget);
    assert_eq!(report.pages_crawled, 1);
    assert_eq!(drain(&queue), vec![topic_url(&server, 1)]);
}

#[tokio::test]
async fn test_session_dedup_enqueues_each_thread_once() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    mount_page(&server, LISTING_PATH, listing_page(&server, &[1, 1, 2])).await;
    mount_page(
        &server,
        "/forums/forum/63-series/page/2/",
        listing_page(&server, &[2, 3]),
    )
    .await;

    let store = memory_store();
    let queue = UrlQueue::new();
    let crawler = crawler(&config, &store, &queue);

    let report = crawler.run(2).await.unwrap();
    assert_eq!(report.links_found, 5);
    assert_eq!(report.enqueued, 3);
    assert_eq!(report.skipped_duplicate, 2);
    assert_eq!(drain(&queue).len(), 3);
    assert_eq!(store.scard("session:crawled_urls").unwrap(), 3);

    // A new run starts a new session
    let again = crawler.run(2).await.unwrap();
    assert_eq!(again.enqueued, 3);
}

#[tokio::test]
async fn test_revisit_cooldown_skips_recent_threads() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    mount_page(&server, LISTING_PATH, listing_page(&server, &[1, 2, 3])).await;

    let store = memory_store();
    let now = chrono::Utc::now().timestamp();
    store
        .hset("thread:1", "last_visited", &(now - DAY_SECS + 60).to_string())
        .unwrap();
    store
        .hset("thread:2", "last_visited", &(now - DAY_SECS - 60).to_string())
        .unwrap();

    let queue = UrlQueue::new();
    let report = crawler(&config, &store, &queue).run(1).await.unwrap();

    assert_eq!(report.skipped_recent, 1);
    assert_eq!(
        drain(&queue),
        vec![topic_url(&server, 2), topic_url(&server, 3)]
    );
}

#[tokio::test]
async fn test_unreadable_last_visited_is_revisited() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    mount_page(&server, LISTING_PATH, listing_page(&server, &[1, 2])).await;
    mount_page(
        &server,
        "/forums/topic/1-release-thread/",
        thread_page(&[magnet_for("Ayali S01E02 [720p]")]),
    )
    .await;

    let store = memory_store();
    store.hset("thread:1", "last_visited", "yesterday").unwrap();
    store
        .hset("thread:2", "last_visited", &chrono::Utc::now().timestamp().to_string())
        .unwrap();

    let queue = UrlQueue::new();
    let report = crawler(&config, &store, &queue).run(1).await.unwrap();

    assert_eq!(report.skipped_recent, 1);
    assert_eq!(drain(&queue), vec![topic_url(&server, 1)]);

    let processor = ThreadProcessor::new(fetcher(&config), store.clone());
    processor.process(&topic_url(&server, 1)).await.expect("thread report");

    let stamp = store.hget("thread:1", "last_visited").unwrap().unwrap();
    assert!(stamp.parse::<i64>().is_ok());
}

#[tokio::test]
async fn test_listing_failure_ends_run_with_error() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let store = memory_store();
    let queue = UrlQueue::new();
    let result = crawler(&config, &store, &queue).run(5).await;

    assert!(result.is_err());
    assert!(!result.unwrap_err().is_store());
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_fetch_retries_then_succeeds() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_page(&server, "/flaky", "<html>ok</html>".to_string()).await;

    let outcome = fetcher(&config)
        .fetch(&format!("{}/flaky", server.uri()))
        .await
        .unwrap();
    assert_eq!(outcome, FetchOutcome::Page("<html>ok</html>".to_string()));
}

#[tokio::test]
async fn test_fetch_does_not_retry_not_found() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = fetcher(&config)
        .fetch(&format!("{}/gone", server.uri()))
        .await
        .unwrap();
    assert_eq!(outcome, FetchOutcome::NotFound);
}

#[tokio::test]
async fn test_thread_processing_files_episodes() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    let magnets = vec![
        magnet_for("Kitchen Wars (2023) S01E01-03 [1080p - Tamil + Telugu]"),
        magnet_for("Untitled upload"),
        "magnet:?xt=urn:btih:nothex&dn=Broken+S01E01".to_string(),
    ];
    mount_page(
        &server,
        "/forums/topic/12345-release-thread/",
        thread_page(&magnets),
    )
    .await;

    let store = memory_store();
    let processor = ThreadProcessor::new(fetcher(&config), store.clone());
    let report = processor
        .process(&topic_url(&server, 12345))
        .await
        .expect("thread report");

    assert_eq!(report.thread_id, "12345");
    assert_eq!(report.magnets, 3);
    assert_eq!(report.stored, 1);
    assert_eq!(report.invalid, 1);
    assert_eq!(report.unparsable, 1);

    let members: Vec<String> = store
        .zrange("season:tb:kitchen_war_2023:1")
        .unwrap()
        .into_iter()
        .map(|(member, _)| member)
        .collect();
    assert_eq!(members.len(), 3);
    for member in ["1:1080p", "2:1080p", "3:1080p"] {
        assert!(members.contains(&member.to_string()), "missing {}", member);
    }

    let episode = store
        .hgetall("episode:season:tb:kitchen_war_2023:1:2")
        .unwrap();
    assert_eq!(episode["languages"], "ta,te");
    assert_eq!(episode["thread_id"], "12345");
    assert!(store.hget("thread:12345", "last_visited").unwrap().is_some());
    assert_eq!(store.llen("error_queue").unwrap(), 0);
}

#[tokio::test]
async fn test_thread_without_magnets_is_still_marked_visited() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    mount_page(
        &server,
        "/forums/topic/7-release-thread/",
        "<html><body><p>Links coming soon</p></body></html>".to_string(),
    )
    .await;

    let store = memory_store();
    let processor = ThreadProcessor::new(fetcher(&config), store.clone());
    let report = processor.process(&topic_url(&server, 7)).await.unwrap();

    assert_eq!(report.magnets, 0);
    assert!(store.hget("thread:7", "last_visited").unwrap().is_some());
}

#[tokio::test]
async fn test_missing_thread_leaves_no_state() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    let store = memory_store();
    let processor = ThreadProcessor::new(fetcher(&config), store.clone());

    assert!(processor.process(&topic_url(&server, 404)).await.is_none());
    assert!(store.hget("thread:404", "last_visited").unwrap().is_none());
    assert_eq!(store.llen("error_queue").unwrap(), 0);
}

#[tokio::test]
async fn test_failing_thread_is_logged_to_error_queue() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    Mock::given(method("GET"))
        .and(path("/forums/topic/9-release-thread/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = memory_store();
    let processor = ThreadProcessor::new(fetcher(&config), store.clone());

    assert!(processor.process(&topic_url(&server, 9)).await.is_none());
    assert!(store.hget("thread:9", "last_visited").unwrap().is_none());

    let errors = store.lrange("error_queue").unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Error in thread 9: "));
}

#[tokio::test]
async fn test_tracker_refresh_replaces_list() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    Mock::given(method("GET"))
        .and(path("/trackers.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "udp://tracker.one:1337/announce\n\nudp://tracker.two:80/announce\n",
        ))
        .mount(&server)
        .await;

    let store = memory_store();
    store.rpush("trackers:latest", "udp://stale:1/announce").unwrap();

    let count = tb_harvest::crawler::refresh_trackers(
        &fetcher(&config),
        store.as_ref(),
        &config.trackers.source_url,
    )
    .await
    .unwrap();

    assert_eq!(count, Some(2));
    assert_eq!(
        store.lrange("trackers:latest").unwrap(),
        vec![
            "udp://tracker.one:1337/announce",
            "udp://tracker.two:80/announce"
        ]
    );
}

#[tokio::test]
async fn test_tracker_refresh_failure_keeps_old_list() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    Mock::given(method("GET"))
        .and(path("/trackers.txt"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let store = memory_store();
    store.rpush("trackers:latest", "udp://cached:1/announce").unwrap();

    let count = tb_harvest::crawler::refresh_trackers(
        &fetcher(&config),
        store.as_ref(),
        &config.trackers.source_url,
    )
    .await
    .unwrap();

    assert_eq!(count, None);
    assert_eq!(
        store.lrange("trackers:latest").unwrap(),
        vec!["udp://cached:1/announce"]
    );
}

#[tokio::test]
async fn test_single_pass_end_to_end() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    Mock::given(method("GET"))
        .and(path("/trackers.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("udp://tracker.one:1337/announce\n"))
        .mount(&server)
        .await;
    mount_page(&server, LISTING_PATH, listing_page(&server, &[12345, 777])).await;
    mount_page(
        &server,
        "/forums/topic/12345-release-thread/",
        thread_page(&[magnet_for(
            "Kitchen Wars (2023) S01E01-03 [1080p - Tamil + Telugu]",
        )]),
    )
    .await;
    mount_page(
        &server,
        "/forums/topic/777-release-thread/",
        thread_page(&[magnet_for("Ayali S01E02 [720p]")]),
    )
    .await;

    let store = memory_store();
    let coordinator = Coordinator::new(config.clone(), store.clone()).unwrap();
    let report = tokio::time::timeout(Duration::from_secs(30), coordinator.run_once())
        .await
        .expect("single pass finished")
        .unwrap();

    let crawl = report.crawl.expect("crawl report");
    assert_eq!(crawl.enqueued, 2);
    assert_eq!(report.trackers, Some(1));
    assert_eq!(coordinator.queue().pending(), 0);

    assert!(store.sismember("catalog:series", "tb:kitchen_war_2023").unwrap());
    assert_eq!(
        store.hget("show:tb:kitchen_war_2023", "name").unwrap().as_deref(),
        Some("Kitchen Wars (2023)")
    );
    assert_eq!(
        store.smembers("show:tb:kitchen_war_2023:langs").unwrap(),
        vec!["ta", "te"]
    );
    assert!(store.hget("thread:12345", "last_visited").unwrap().is_some());
    assert!(store.hget("thread:777", "last_visited").unwrap().is_some());

    let reader = CatalogReader::new(store.clone(), config.search.similarity_threshold);
    let meta = reader
        .show_meta("tb:kitchen_war_2023")
        .unwrap()
        .expect("show meta");
    assert_eq!(meta.videos.len(), 3);

    let stream = reader
        .episode_stream("tb:kitchen_war_2023", 1, 2)
        .unwrap()
        .expect("stream");
    assert_eq!(stream.name, "TamilBlasters 1080p");
    assert!(stream.url.ends_with("&tr=udp://tracker.one:1337/announce"));

    // Within the cooldown a second pass enqueues nothing
    let second = coordinator.run_once().await.unwrap();
    assert_eq!(second.crawl.expect("crawl report").enqueued, 0);
}

#[tokio::test]
async fn test_run_until_stops_on_shutdown_signal() {
    let server = MockServer::start().await;
    let mut config = create_test_config(&server);
    config.crawler.crawl_interval_secs = 3600;

    mount_page(&server, LISTING_PATH, listing_page(&server, &[])).await;

    let coordinator = Coordinator::new(config, memory_store()).unwrap();
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        coordinator.run_until(tokio::time::sleep(Duration::from_millis(200))),
    )
    .await
    .expect("shutdown honored");

    assert!(result.is_ok());
}

/// Delegates to an in-memory store until `fail_writes` is set
struct FlakyStore {
    inner: SqliteStore,
    fail_writes: std::sync::atomic::AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: SqliteStore::new_in_memory().expect("in-memory store"),
            fail_writes: std::sync::atomic::AtomicBool::new(false),
        }
    }

    fn break_writes(&self) {
        self.fail_writes
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Store for FlakyStore {
    fn hget(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        self.inner.hget(key, field)
    }

    fn hgetall(&self, key: &str) -> StoreResult<BTreeMap<String, String>> {
        self.inner.hgetall(key)
    }

    fn sismember(&self, key: &str, member: &str) -> StoreResult<bool> {
        self.inner.sismember(key, member)
    }

    fn smembers(&self, key: &str) -> StoreResult<Vec<String>> {
        self.inner.smembers(key)
    }

    fn scard(&self, key: &str) -> StoreResult<u64> {
        self.inner.scard(key)
    }

    fn zrange(&self, key: &str) -> StoreResult<Vec<(String, i64)>> {
        self.inner.zrange(key)
    }

    fn lrange(&self, key: &str) -> StoreResult<Vec<String>> {
        self.inner.lrange(key)
    }

    fn llen(&self, key: &str) -> StoreResult<u64> {
        self.inner.llen(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.inner.keys_with_prefix(prefix)
    }

    fn flush(&self) -> StoreResult<()> {
        self.inner.flush()
    }

    fn execute(&self, batch: Batch) -> StoreResult<()> {
        if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StoreError::Poisoned);
        }
        self.inner.execute(batch)
    }
}

fn scheduler(config: &Config, store: &SharedStore, schedule: Schedule) -> Scheduler {
    Scheduler::new(
        crawler(config, store, &UrlQueue::new()),
        fetcher(config),
        store.clone(),
        config.trackers.source_url.clone(),
        schedule,
    )
}

async fn mount_trackers(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/trackers.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("udp://tracker.one:1337/announce\n"))
        .mount(server)
        .await;
}

/// Number of requests the mock server has seen for `request_path`
async fn hits(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}

/// Polls the mock server until `request_path` has been requested `count` times
async fn wait_for_hits(server: &MockServer, request_path: &str, count: usize) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while hits(server, request_path).await < count {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("{} never reached {} requests", request_path, count));
}

#[tokio::test]
async fn test_periodic_cycle_uses_max_pages() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    mount_trackers(&server).await;
    mount_page(&server, LISTING_PATH, listing_page(&server, &[1])).await;
    mount_page(
        &server,
        "/forums/forum/63-series/page/2/",
        listing_page(&server, &[2]),
    )
    .await;

    let store = memory_store();
    let scheduler = scheduler(
        &config,
        &store,
        Schedule {
            initial_pages: 1,
            max_pages: 3,
            interval: Duration::from_millis(300),
        },
    );
    let handle = tokio::spawn(async move { scheduler.run_forever().await });

    // The initial cycle only reads page 1
    wait_for_hits(&server, LISTING_PATH, 1).await;
    assert_eq!(hits(&server, "/forums/forum/63-series/page/2/").await, 0);

    // The first periodic cycle refreshes trackers again and pages further
    wait_for_hits(&server, "/forums/forum/63-series/page/3/", 1).await;
    assert!(hits(&server, "/trackers.txt").await >= 2);
    assert!(hits(&server, "/forums/forum/63-series/page/2/").await >= 1);
    assert!(!handle.is_finished());

    handle.abort();
}

#[tokio::test]
async fn test_listing_outage_does_not_stop_schedule() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    mount_trackers(&server).await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = memory_store();
    let scheduler = scheduler(
        &config,
        &store,
        Schedule {
            initial_pages: 1,
            max_pages: 2,
            interval: Duration::from_millis(50),
        },
    );
    let handle = tokio::spawn(async move { scheduler.run_forever().await });

    // Initial cycle plus two periodic cycles, each with a failing listing
    wait_for_hits(&server, "/trackers.txt", 3).await;
    assert!(hits(&server, LISTING_PATH).await >= 2 * config.retry.max_attempts as usize);
    assert!(!handle.is_finished());

    handle.abort();
}

#[tokio::test]
async fn test_store_failure_ends_schedule() {
    let server = MockServer::start().await;
    let config = create_test_config(&server);

    mount_trackers(&server).await;
    mount_page(&server, LISTING_PATH, listing_page(&server, &[])).await;

    let flaky = Arc::new(FlakyStore::new());
    let store: SharedStore = flaky.clone();
    let scheduler = scheduler(
        &config,
        &store,
        Schedule {
            initial_pages: 1,
            max_pages: 2,
            interval: Duration::from_millis(200),
        },
    );
    let handle = tokio::spawn(async move { scheduler.run_forever().await });

    // The empty listing page is the last store user of the initial cycle
    wait_for_hits(&server, LISTING_PATH, 1).await;
    flaky.break_writes();

    let result = tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("schedule ended")
        .expect("schedule task joined");

    assert!(result.unwrap_err().is_store());
    assert_eq!(store.lrange("trackers:latest").unwrap().len(), 1);
}
