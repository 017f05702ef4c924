//! Job lifecycle tests
//!
//! Submission through dispatch to finalization against the in-memory store.

#[cfg(test)]
mod tests {
    use crate::common::{
        Reply, ScriptedProvider, admin_in, fast_dispatch, member, member_in, phone_numbers,
        wire_service,
    };
    use std::sync::Arc;
    use uuid::Uuid;
    use verification_gateway::config::DispatchConfig;
    use verification_gateway::core::jobs::{
        DetailFilter, DetailStatus, JobFilter, JobManager, JobStatus, JobStore,
    };
    use verification_gateway::core::providers::ProductType;
    use verification_gateway::storage::InMemoryJobStore;
    use verification_gateway::utils::error::GatewayError;

    /// Composite provider status is split into its two parts
    #[tokio::test]
    async fn test_single_item_composite_status_is_split() {
        let store = Arc::new(InMemoryJobStore::new());
        let provider = Arc::new(ScriptedProvider::live_status(Reply::Status(
            "active, reachable",
        )));
        let service = wire_service(store.clone(), provider.clone(), &fast_dispatch());

        let result = service
            .submit_single(&member(), ProductType::LiveStatus, "081234567890".into())
            .await
            .unwrap();

        assert_eq!(result.detail.status, DetailStatus::Success);
        assert_eq!(result.detail.primary_status.as_deref(), Some("active"));
        assert_eq!(result.detail.secondary_status.as_deref(), Some("reachable"));
        assert_eq!(result.detail.transaction_id.as_deref(), Some("TX-081234567890"));
        assert!(!result.detail.in_progress);

        let stored = store.find_detail(result.detail.id).await.unwrap().unwrap();
        assert_eq!(stored, result.detail);
        assert_eq!(result.job.status, JobStatus::Done);
        assert_eq!(provider.calls(), 1);
    }

    /// A transport error on one row leaves the others successful
    #[tokio::test]
    async fn test_batch_with_one_transport_error() {
        let store = Arc::new(InMemoryJobStore::new());
        let items = phone_numbers(3);
        let provider = Arc::new(
            ScriptedProvider::live_status(Reply::Status("active, reachable"))
                .with_reply(&items[1], Reply::Transport),
        );
        let service = wire_service(store.clone(), provider, &fast_dispatch());

        let ack = service
            .submit_batch(&member(), ProductType::LiveStatus, items)
            .await
            .unwrap();

        let job = store.find_job(ack.job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Done);
        assert_eq!(job.success_count, 2);
        assert!(job.end_at.is_some());

        let details = store.details_for_job(ack.job_id).await.unwrap();
        assert_eq!(details[1].status, DetailStatus::Error);
        assert!(details[1].message.as_deref().unwrap().contains("connection refused"));
        assert_eq!(details[0].status, DetailStatus::Success);
        assert_eq!(details[2].status, DetailStatus::Success);
    }

    /// Malformed items are rejected without a provider call
    #[tokio::test]
    async fn test_malformed_item_never_reaches_provider() {
        let store = Arc::new(InMemoryJobStore::new());
        let provider = Arc::new(ScriptedProvider::live_status(Reply::Status("active")));
        let service = wire_service(store.clone(), provider.clone(), &fast_dispatch());

        let ack = service
            .submit_batch(
                &member(),
                ProductType::LiveStatus,
                vec!["08123".into(), "081234567890".into()],
            )
            .await
            .unwrap();

        let details = store.details_for_job(ack.job_id).await.unwrap();
        assert_eq!(details[0].status, DetailStatus::Error);
        assert!(
            details[0]
                .message
                .as_deref()
                .unwrap()
                .contains("invalid phone number")
        );
        assert_eq!(details[1].status, DetailStatus::Success);
        assert_eq!(provider.seen(), vec!["081234567890".to_string()]);
        assert_eq!(provider.calls(), 1);
    }

    /// An empty batch is a validation error and persists nothing
    #[tokio::test]
    async fn test_empty_batch_persists_nothing() {
        let store = Arc::new(InMemoryJobStore::new());
        let manager = JobManager::new(store.clone());

        let err = manager
            .create_job(&member(), ProductType::LiveStatus, Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Validation(_)));
        assert_eq!(store.job_count(), 0);
        assert_eq!(store.detail_count(), 0);
    }

    #[tokio::test]
    async fn test_total_matches_detail_count_after_creation() {
        let store = Arc::new(InMemoryJobStore::new());
        let manager = JobManager::new(store.clone());

        let job = manager
            .create_job(&member(), ProductType::LiveStatus, phone_numbers(17))
            .await
            .unwrap();

        let details = store.details_for_job(job.id).await.unwrap();
        assert_eq!(job.total, details.len() as u64);
        assert!(details.iter().all(|d| d.status == DetailStatus::Pending));
        let sequences: Vec<u32> = details.iter().map(|d| d.sequence).collect();
        assert_eq!(sequences, (0..17).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_every_detail_is_terminal_after_dispatch() {
        let store = Arc::new(InMemoryJobStore::new());
        let items = phone_numbers(40);
        let provider = ScriptedProvider::live_status(Reply::Status("active"))
            .with_reply(&items[3], Reply::Transport)
            .with_reply(&items[7], Reply::Business("PHONE_NOT_ACTIVE"))
            .with_reply(&items[9], Reply::Unsuccessful("quota exhausted"));
        let service = wire_service(store.clone(), Arc::new(provider), &fast_dispatch());

        let ack = service
            .submit_batch(&member(), ProductType::LiveStatus, items)
            .await
            .unwrap();

        let details = store.details_for_job(ack.job_id).await.unwrap();
        assert!(details.iter().all(|d| d.status.is_terminal() && !d.in_progress));

        let counts = store.count_details(ack.job_id).await.unwrap();
        assert_eq!((counts.success, counts.fail, counts.error), (37, 1, 2));

        let job = store.find_job(ack.job_id).await.unwrap().unwrap();
        assert_eq!(job.success_count, counts.success);
        assert_eq!(job.total, 40);
    }

    #[tokio::test]
    async fn test_finalize_twice_is_idempotent() {
        let store = Arc::new(InMemoryJobStore::new());
        let provider = Arc::new(ScriptedProvider::live_status(Reply::Status("active")));
        let service = wire_service(store.clone(), provider, &fast_dispatch());
        let ack = service
            .submit_batch(&member(), ProductType::LiveStatus, phone_numbers(5))
            .await
            .unwrap();

        let manager = JobManager::new(store.clone());
        let first = manager.finalize_job(ack.job_id).await.unwrap();
        let second = manager.finalize_job(ack.job_id).await.unwrap();

        assert_eq!(first.success_count, 5);
        assert_eq!(second.success_count, first.success_count);
        assert_eq!(second.status, first.status);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_affect_siblings() {
        let store = Arc::new(InMemoryJobStore::new());
        let items = phone_numbers(25);
        let provider = ScriptedProvider::live_status(Reply::Status("active"))
            .with_reply(&items[12], Reply::Transport);
        let service = wire_service(store.clone(), Arc::new(provider), &fast_dispatch());

        let ack = service
            .submit_batch(&member(), ProductType::LiveStatus, items)
            .await
            .unwrap();

        let counts = store.count_details(ack.job_id).await.unwrap();
        assert_eq!(counts.success, 24);
        assert_eq!(counts.error, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_large_batch_pauses_between_waves() {
        let store = Arc::new(InMemoryJobStore::new());
        let provider = Arc::new(ScriptedProvider::live_status(Reply::Status("active")));
        let dispatch = DispatchConfig {
            batch_size: 100,
            pause_ms: 1000,
            call_timeout_secs: 5,
        };
        let service = wire_service(store.clone(), provider.clone(), &dispatch);

        let started = tokio::time::Instant::now();
        let ack = service
            .submit_batch(&member(), ProductType::LiveStatus, phone_numbers(250))
            .await
            .unwrap();

        assert!(started.elapsed() >= std::time::Duration::from_secs(2));
        assert_eq!(provider.calls(), 250);
        let job = store.find_job(ack.job_id).await.unwrap().unwrap();
        assert_eq!(job.success_count, 250);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let store = Arc::new(InMemoryJobStore::new());
        let provider = Arc::new(ScriptedProvider::live_status(Reply::Status("active")));
        let service = wire_service(store.clone(), provider, &fast_dispatch());

        let err = service
            .submit_batch(&member(), ProductType::TaxScore, vec!["012345678901000".into()])
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::NotFound(_)));
        assert_eq!(store.job_count(), 0);
    }

    #[tokio::test]
    async fn test_visibility_by_role() {
        let store = Arc::new(InMemoryJobStore::new());
        let provider = Arc::new(ScriptedProvider::live_status(Reply::Status("active")));
        let service = wire_service(store.clone(), provider, &fast_dispatch());
        let manager = JobManager::new(store.clone());

        let scope = Uuid::new_v4();
        let owner = member_in(scope);
        let ack = service
            .submit_batch(&owner, ProductType::LiveStatus, phone_numbers(2))
            .await
            .unwrap();

        assert!(manager.get_job(&owner, ack.job_id).await.is_ok());
        assert!(manager.get_job(&admin_in(scope), ack.job_id).await.is_ok());
        assert!(matches!(
            manager.get_job(&member_in(scope), ack.job_id).await,
            Err(GatewayError::NotFound(_))
        ));
        assert!(matches!(
            manager.get_job(&admin_in(Uuid::new_v4()), ack.job_id).await,
            Err(GatewayError::NotFound(_))
        ));

        let page = manager
            .get_jobs(&admin_in(scope), &JobFilter::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_detail_filters_and_percentages() {
        let store = Arc::new(InMemoryJobStore::new());
        let items = phone_numbers(4);
        let provider = ScriptedProvider::live_status(Reply::Status("active"))
            .with_reply(&items[0], Reply::Business("PHONE_UNREACHABLE"));
        let service = wire_service(store.clone(), Arc::new(provider), &fast_dispatch());
        let ctx = member();
        let ack = service
            .submit_batch(&ctx, ProductType::LiveStatus, items.clone())
            .await
            .unwrap();

        let manager = JobManager::new(store.clone());
        let page = manager
            .get_job_details(
                &ctx,
                ack.job_id,
                &DetailFilter {
                    status: Some(DetailStatus::Success),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.details.total, 3);
        assert_eq!(page.percentages.success, 75.0);
        assert_eq!(page.percentages.fail, 25.0);

        let by_keyword = manager
            .get_job_details(
                &ctx,
                ack.job_id,
                &DetailFilter {
                    keyword: Some(items[2].clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(by_keyword.details.items.len(), 1);
        assert_eq!(by_keyword.details.items[0].item, items[2]);
    }

    /// Abandoning the submission does not cancel the job
    #[tokio::test(start_paused = true)]
    async fn test_abandoned_batch_still_finalizes() {
        let store = Arc::new(InMemoryJobStore::new());
        let provider = Arc::new(
            ScriptedProvider::live_status(Reply::Status("active"))
                .with_latency(std::time::Duration::from_secs(2)),
        );
        let service = wire_service(store.clone(), provider.clone(), &fast_dispatch());
        let caller = member();

        let abandoned = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            service.submit_batch(&caller, ProductType::LiveStatus, phone_numbers(5)),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(std::time::Duration::from_secs(30)).await;

        let manager = JobManager::new(store.clone());
        let jobs = manager.get_jobs(&caller, &JobFilter::default()).await.unwrap();
        assert_eq!(jobs.items.len(), 1);
        let job = &jobs.items[0];
        assert_eq!(job.status, JobStatus::Done);
        assert_eq!(job.success_count, 5);

        let counts = store.count_details(job.id).await.unwrap();
        assert_eq!(counts.success, 5);
        assert_eq!(counts.pending, 0);
        assert_eq!(provider.calls(), 5);
    }
}
