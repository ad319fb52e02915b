//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置合约测试
//! - 端到端测试（解析 -> 过滤 -> 去重 -> 双渠道分发）
//! - 限流、取消与关闭行为

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ChannelKind, DedupKey, TransportType};

    #[test]
    fn test_documented_config_loads() {
        let blueprint = ConfigLoader::load_from_str(
            r#"
version = "V1"

[input]
path = "files/input/data.txt"
dedup = "by_phone"

[message]
text = "Your credit score went up"

[dispatch]
timeout_secs = 0

[channels.email]
transport = { transport_type = "file", params = { path = "files/output/notified_emails.txt" } }
max_in_flight = 0

[channels.sms]
transport = { transport_type = "file", params = { path = "files/output/notified_phone_numbers.txt" } }
rate_limit = { rate = 100, window_ms = 1000 }
"#,
            ConfigFormat::Toml,
        )
        .unwrap();

        assert_eq!(blueprint.input.dedup, DedupKey::ByPhone);
        assert!(blueprint.dispatch.timeout().is_none());
        let email = blueprint.channel(ChannelKind::Email);
        assert_eq!(email.transport.transport_type, TransportType::File);
        assert!(email.in_flight_limit().is_none());
        assert_eq!(blueprint.channel(ChannelKind::Sms).rate_limit.map(|r| r.rate), Some(100));
    }

    #[test]
    fn test_json_round_trip_keeps_channels() {
        let blueprint =
            ConfigLoader::load_from_str("[message]\ntext = \"hi\"\n", ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&blueprint).unwrap();
        let restored = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();

        assert!(restored.channels.email.rate_limit.is_none());
        assert_eq!(restored.channels.sms.rate_limit, blueprint.channels.sms.rate_limit);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{
        CancelReason, CancelSignal, ChannelKind, ContractError, DedupKey, DispatchState, Recipient,
    };
    use dispatcher::{ChannelSender, DispatchCoordinator, MockTransport, RateLimiter};
    use ingestion::IngestionPipeline;
    use tokio::time::Instant;

    const MESSAGE: &str = "Your credit score went up";

    fn recipients(n: usize) -> Vec<Recipient> {
        (1..=n)
            .map(|i| {
                Recipient::new(format!("user{i}@example.fake"), format!("000-0000-{i:04}"), true)
                    .unwrap()
            })
            .collect()
    }

    fn coordinator(
        email: MockTransport,
        sms: MockTransport,
        sms_limit: Option<RateLimiter>,
    ) -> DispatchCoordinator<MockTransport, MockTransport> {
        let sms = ChannelSender::new(ChannelKind::Sms, sms, MESSAGE);
        let sms = match sms_limit {
            Some(limiter) => sms.with_rate_limiter(limiter),
            None => sms,
        };
        DispatchCoordinator::new(ChannelSender::new(ChannelKind::Email, email, MESSAGE), sms)
    }

    /// 解析 -> 过滤 -> 去重 -> 分发
    #[tokio::test]
    async fn test_e2e_records_to_both_channels() {
        let input = b"\
Duser1@example.fake       000-0000-0001  Y
Duser2@example.fake       000-0000-0002  N
Duser3@example.fake       000-0000-0003  Y
Duser1@example.fake       000-0000-0009  Y
";
        let prepared = IngestionPipeline::new(DedupKey::ByEmail)
            .prepare(input, &CancelSignal::new())
            .unwrap();
        assert_eq!(prepared.recipients.len(), 2);

        let limiter = RateLimiter::new(100, Duration::from_secs(1)).unwrap();
        let coordinator = coordinator(
            MockTransport::new("email"),
            MockTransport::new("sms"),
            Some(limiter),
        );

        let outcome = coordinator.dispatch(&prepared.recipients, &CancelSignal::new()).await;

        assert_eq!(outcome.state(), DispatchState::Completed);
        assert_eq!(outcome.clone().into_result().unwrap(), (2, 2));
        assert_eq!(
            coordinator.sms().transport().sent(),
            ["000-0000-0001", "000-0000-0003"]
        );
        let mut emails = coordinator.email().transport().sent();
        emails.sort_unstable();
        assert_eq!(emails, ["Duser1@example.fake", "Duser3@example.fake"]);

        coordinator.close().await;
    }

    /// 不限流渠道 + 总是成功的发送端：成功数等于收件人数
    #[tokio::test]
    async fn test_unthrottled_reaches_everyone() {
        let coordinator = coordinator(
            MockTransport::new("email").with_delay(Duration::from_millis(5)),
            MockTransport::new("sms"),
            None,
        );

        let outcome = coordinator.dispatch(&recipients(50), &CancelSignal::new()).await;

        assert_eq!(outcome.email.succeeded, 50);
        assert!(coordinator.email().transport().peak_in_flight() > 1);
    }

    /// 30 个收件人，每秒 10 个：至少 2 秒
    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_channel_throughput_bound() {
        let limiter = RateLimiter::new(10, Duration::from_secs(1)).unwrap();
        let coordinator = coordinator(
            MockTransport::new("email"),
            MockTransport::new("sms"),
            Some(limiter),
        );

        let start = Instant::now();
        let outcome = coordinator.dispatch(&recipients(30), &CancelSignal::new()).await;

        assert_eq!(outcome.counts(), (30, 30));
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert!(outcome.sms.elapsed >= Duration::from_secs(2));
    }

    /// 并发等待与补充过程中令牌数始终位于 [0, capacity]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_token_count_stays_in_bounds() {
        let limiter = Arc::new(RateLimiter::new(16, Duration::from_millis(80)).unwrap());
        let done = Arc::new(AtomicBool::new(false));
        let signal = CancelSignal::new();

        let sampler = {
            let limiter = Arc::clone(&limiter);
            let done = Arc::clone(&done);
            tokio::spawn(async move {
                let mut samples = 0u64;
                while !done.load(Ordering::Acquire) {
                    assert!(limiter.available() <= limiter.capacity());
                    samples += 1;
                    tokio::task::yield_now().await;
                }
                samples
            })
        };

        let mut waiters = Vec::new();
        for _ in 0..6 {
            let limiter = Arc::clone(&limiter);
            let signal = signal.clone();
            waiters.push(tokio::spawn(async move {
                for _ in 0..8 {
                    limiter.wait(&signal).await.unwrap();
                }
            }));
        }
        for waiter in waiters {
            waiter.await.unwrap();
        }

        done.store(true, Ordering::Release);
        assert!(sampler.await.unwrap() > 0);
        limiter.stop().await;
    }

    /// 多次触发取消、且在分发前触发：返回取消错误，成功数为 0，不 panic
    #[tokio::test]
    async fn test_cancel_before_dispatch() {
        let signal = CancelSignal::new();
        signal.cancel();
        signal.cancel();
        signal.cancel();

        let limiter = RateLimiter::new(5, Duration::from_secs(1)).unwrap();
        let coordinator = coordinator(
            MockTransport::new("email"),
            MockTransport::new("sms"),
            Some(limiter),
        );
        let outcome = coordinator.dispatch(&recipients(5), &signal).await;

        assert_eq!(outcome.counts(), (0, 0));
        assert_eq!(outcome.state(), DispatchState::Cancelled);
        match outcome.into_result() {
            Err(ContractError::Cancelled {
                channel,
                reason,
                email_succeeded,
                sms_succeeded,
            }) => {
                assert_eq!(channel, ChannelKind::Email);
                assert_eq!(reason, CancelReason::Cancelled);
                assert_eq!((email_succeeded, sms_succeeded), (0, 0));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    /// 分发中途取消：部分成功保留
    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_dispatch_keeps_partial_counts() {
        let limiter = RateLimiter::new(2, Duration::from_secs(1)).unwrap();
        let coordinator = coordinator(
            MockTransport::new("email"),
            MockTransport::new("sms"),
            Some(limiter),
        );
        let signal = CancelSignal::new();

        let canceller = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(700)).await;
            canceller.cancel();
            canceller.cancel();
        });

        let outcome = coordinator.dispatch(&recipients(10), &signal).await;

        // 2 burst tokens + 1 at 500ms
        assert_eq!(outcome.counts(), (10, 3));
        assert_eq!(
            outcome.terminal(),
            Some((ChannelKind::Sms, CancelReason::Cancelled))
        );
        assert_eq!(outcome.sms.skipped(), 7);
    }

    /// 5 个收件人，第 2、4 个失败：成功 3，无错误
    #[tokio::test]
    async fn test_partial_transport_failure_is_not_an_error() {
        let failing = MockTransport::new("email")
            .failing_for(["user2@example.fake", "user4@example.fake"]);
        let coordinator = coordinator(failing, MockTransport::new("sms"), None);

        let outcome = coordinator.dispatch(&recipients(5), &CancelSignal::new()).await;

        assert_eq!(outcome.email.succeeded, 3);
        assert_eq!(outcome.email.failed, 2);
        assert_eq!(outcome.into_result().unwrap(), (3, 5));
    }

    /// close 之后不再补充令牌
    #[tokio::test(start_paused = true)]
    async fn test_close_stops_replenishment() {
        let limiter = RateLimiter::new(3, Duration::from_millis(300)).unwrap();
        let sender = ChannelSender::new(ChannelKind::Sms, MockTransport::new("sms"), MESSAGE)
            .with_rate_limiter(limiter);

        let report = sender.send_all(&recipients(3), &CancelSignal::new()).await;
        assert_eq!(report.succeeded, 3);

        sender.close().await;
        let after_close = sender.rate_limiter().map(RateLimiter::available);
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(sender.rate_limiter().map(RateLimiter::available), after_close);
        assert!(sender.transport().is_closed());
    }

    /// 截止时间到达：DeadlineExceeded 与部分计数
    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let limiter = RateLimiter::new(1, Duration::from_secs(1)).unwrap();
        let coordinator = coordinator(
            MockTransport::new("email"),
            MockTransport::new("sms"),
            Some(limiter),
        );
        let signal = CancelSignal::with_deadline(Duration::from_millis(2500));

        let outcome = coordinator.dispatch(&recipients(5), &signal).await;

        assert_eq!(outcome.counts(), (5, 3));
        let err = outcome.into_result().unwrap_err();
        assert!(err.to_string().contains("deadline exceeded"), "got: {err}");
    }

    /// 聚合器统计
    #[tokio::test]
    async fn test_outcome_feeds_metrics_aggregator() {
        let coordinator = coordinator(MockTransport::new("email"), MockTransport::new("sms"), None);
        let outcome = coordinator.dispatch(&recipients(4), &CancelSignal::new()).await;

        let mut aggregator = observability::DispatchMetricsAggregator::new();
        aggregator.update(&outcome);
        observability::record_dispatch_outcome(&outcome);

        let summary = aggregator.summary();
        assert_eq!(summary.runs, 1);
        assert!(summary.channels.iter().all(|c| c.succeeded == 4));
    }
}
