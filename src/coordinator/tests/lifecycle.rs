use super::*;

#[tokio::test]
async fn test_exit_without_downloads_leaves_empty_log() {
    let fetcher = Arc::new(FakeFetcher::succeeding());
    let (coordinator, temp_dir) = create_test_coordinator(fetcher).await;
    assert_eq!(coordinator.state(), CoordinatorState::Ready);

    coordinator.shutdown().await.unwrap();

    assert_eq!(coordinator.state(), CoordinatorState::Closed);
    assert!(coordinator.worker.log.is_closed().await);
    let log_path = temp_dir.path().join("download_log.txt");
    assert!(log_path.exists(), "log file is created at startup");
    assert!(read_log_lines(&log_path).is_empty());
    assert_eq!(coordinator.tickets_issued(), 0);
}

#[tokio::test]
async fn test_submit_after_shutdown_is_rejected() {
    let fetcher = Arc::new(FakeFetcher::succeeding());
    let (coordinator, temp_dir) = create_test_coordinator(fetcher.clone()).await;

    coordinator.submit("http://x/a.png").unwrap();
    coordinator.shutdown().await.unwrap();

    let result = coordinator.submit("http://x/b.png");
    assert!(matches!(result, Err(Error::ShuttingDown)));

    // Rejected submission neither ran nor touched the log
    assert_eq!(fetcher.calls().len(), 1);
    assert_eq!(coordinator.tickets_issued(), 1);
    assert_eq!(
        read_log_lines(&temp_dir.path().join("download_log.txt")).len(),
        2
    );
}

#[tokio::test]
async fn test_clones_share_state() {
    let fetcher = Arc::new(FakeFetcher::succeeding());
    let (coordinator, _temp_dir) = create_test_coordinator(fetcher).await;
    let other = coordinator.clone();

    other.submit("http://x/a.png").unwrap();
    coordinator.shutdown().await.unwrap();

    assert_eq!(other.state(), CoordinatorState::Closed);
    assert!(matches!(other.submit("http://x/b.png"), Err(Error::ShuttingDown)));
    assert_eq!(other.tickets_issued(), 1);
}

#[tokio::test]
async fn test_shutdown_waits_for_in_flight_downloads() {
    let fetcher = Arc::new(FakeFetcher::succeeding().with_delay(Duration::from_millis(200)));
    let (coordinator, temp_dir) = create_test_coordinator(fetcher).await;

    for i in 0..5 {
        coordinator.submit(&format!("http://x/{i}.png")).unwrap();
    }
    coordinator.shutdown().await.unwrap();

    let lines = read_log_lines(&temp_dir.path().join("download_log.txt"));
    assert_eq!(lines.len(), 10);
    assert_eq!(lines.iter().filter(|l| l.contains(" completed: ")).count(), 5);
    assert_eq!(coordinator.pending(), 0);
}

#[tokio::test]
async fn test_shutdown_timeout_abandons_slow_downloads() {
    let fetcher = Arc::new(FakeFetcher::succeeding().with_delay(Duration::from_secs(5)));
    let (mut config, temp_dir) = test_config();
    config.shutdown_timeout = Some(Duration::from_millis(100));
    let coordinator = DownloadCoordinator::start(config, fetcher).await.unwrap();

    coordinator.submit("http://x/slow.png").unwrap();

    let started = std::time::Instant::now();
    coordinator.shutdown().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(coordinator.state(), CoordinatorState::Closed);
    assert_eq!(coordinator.pending(), 1);

    let lines = read_log_lines(&temp_dir.path().join("download_log.txt"));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("] Download 1 started for: http://x/slow.png"));
}

#[tokio::test]
async fn test_no_wait_skips_drain() {
    let fetcher = Arc::new(FakeFetcher::succeeding().with_delay(Duration::from_secs(5)));
    let (mut config, _temp_dir) = test_config();
    config.wait_for_pending = false;
    let coordinator = DownloadCoordinator::start(config, fetcher).await.unwrap();

    coordinator.submit("http://x/slow.png").unwrap();

    let started = std::time::Instant::now();
    coordinator.shutdown().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(coordinator.state(), CoordinatorState::Closed);
}

#[tokio::test]
async fn test_abandon_pending_cuts_unbounded_drain_short() {
    let fetcher = Arc::new(FakeFetcher::succeeding().with_delay(Duration::from_secs(3600)));
    let (coordinator, _temp_dir) = create_test_coordinator(fetcher).await;
    assert_eq!(coordinator.config().shutdown_timeout, None);

    coordinator.submit("http://x/stalled.png").unwrap();

    let draining = coordinator.clone();
    let shutdown = tokio::spawn(async move { draining.shutdown().await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!shutdown.is_finished(), "drain waits while the download is stalled");

    coordinator.abandon_pending();
    tokio::time::timeout(Duration::from_secs(3), shutdown)
        .await
        .expect("shutdown finishes once pending downloads are abandoned")
        .unwrap()
        .unwrap();

    assert_eq!(coordinator.state(), CoordinatorState::Closed);
    assert_eq!(coordinator.pending(), 1);
}

#[tokio::test]
async fn test_abandon_before_shutdown_skips_drain() {
    let fetcher = Arc::new(FakeFetcher::succeeding().with_delay(Duration::from_secs(3600)));
    let (coordinator, _temp_dir) = create_test_coordinator(fetcher).await;

    coordinator.submit("http://x/stalled.png").unwrap();
    coordinator.abandon_pending();
    coordinator.abandon_pending();

    tokio::time::timeout(Duration::from_secs(3), coordinator.shutdown())
        .await
        .expect("shutdown does not wait")
        .unwrap();
    assert_eq!(coordinator.state(), CoordinatorState::Closed);
}

#[tokio::test]
async fn test_second_shutdown_is_noop() {
    let fetcher = Arc::new(FakeFetcher::succeeding());
    let (coordinator, _temp_dir) = create_test_coordinator(fetcher).await;
    let mut events = coordinator.subscribe();

    coordinator.shutdown().await.unwrap();
    coordinator.shutdown().await.unwrap();

    assert!(matches!(events.recv().await.unwrap(), Event::Shutdown));
    assert!(events.try_recv().is_err(), "only one Shutdown event");
}

#[tokio::test]
async fn test_start_fails_when_log_cannot_be_opened() {
    let fetcher = Arc::new(FakeFetcher::succeeding());
    let (mut config, temp_dir) = test_config();
    // A directory cannot be opened for appending
    config.log_path = temp_dir.path().to_path_buf();

    let result = DownloadCoordinator::start(config, fetcher).await;
    match result {
        Err(e @ Error::LogOpen { .. }) => assert!(e.is_fatal()),
        Err(other) => panic!("Expected LogOpen error, got {:?}", other),
        Ok(_) => panic!("Expected start to fail"),
    }
}

#[tokio::test]
async fn test_start_rejects_invalid_config() {
    let fetcher = Arc::new(FakeFetcher::succeeding());
    let (mut config, _temp_dir) = test_config();
    config.file_prefix = "nested/image_".into();

    let result = DownloadCoordinator::start(config, fetcher).await;
    assert!(matches!(result, Err(Error::Config { .. })));
}

#[tokio::test]
async fn test_start_fails_when_download_dir_is_a_file() {
    let fetcher = Arc::new(FakeFetcher::succeeding());
    let (mut config, temp_dir) = test_config();
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();
    config.download_dir = blocker;

    let result = DownloadCoordinator::start(config, fetcher).await;
    assert!(matches!(result, Err(Error::Io(_))));
}

#[tokio::test]
async fn test_log_appends_across_runs() {
    let (config, temp_dir) = test_config();

    for url in ["http://x/run1.png", "http://x/run2.png"] {
        let fetcher = Arc::new(FakeFetcher::succeeding());
        let coordinator = DownloadCoordinator::start(config.clone(), fetcher)
            .await
            .unwrap();
        coordinator.submit(url).unwrap();
        coordinator.shutdown().await.unwrap();
    }

    let lines = read_log_lines(&temp_dir.path().join("download_log.txt"));
    assert_eq!(lines.len(), 4);
    // Counter restarts every run
    assert!(lines[0].ends_with("] Download 1 started for: http://x/run1.png"));
    assert!(lines[2].ends_with("] Download 1 started for: http://x/run2.png"));
}
