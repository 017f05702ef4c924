//! SeaORM job store tests
//!
//! Runs the store against a migrated in-memory SQLite database.

#[cfg(test)]
mod tests {
    use crate::common::{
        Reply, ScriptedProvider, admin_in, fast_dispatch, member_in, phone_numbers, wire_service,
    };
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;
    use verification_gateway::config::DatabaseConfig;
    use verification_gateway::core::jobs::{
        DateRange, DetailQuery, DetailStatus, DetailUpdate, Job, JobDetail, JobQuery, JobStatus,
        JobStore, RequestContext,
    };
    use verification_gateway::core::providers::ProductType;
    use verification_gateway::storage::SeaOrmJobStore;
    use verification_gateway::utils::error::GatewayError;

    async fn store() -> SeaOrmJobStore {
        SeaOrmJobStore::connect_and_migrate(&DatabaseConfig::sqlite_memory())
            .await
            .expect("in-memory database")
    }

    fn job_at(
        ctx: &RequestContext,
        product: ProductType,
        items: usize,
        created_at: DateTime<Utc>,
    ) -> (Job, Vec<JobDetail>) {
        let job = Job {
            id: Uuid::new_v4(),
            product,
            total: items as u64,
            success_count: 0,
            status: JobStatus::Pending,
            owner_id: ctx.owner_id,
            scope_id: ctx.scope_id,
            created_at,
            end_at: None,
        };
        let details = phone_numbers(items)
            .into_iter()
            .enumerate()
            .map(|(sequence, item)| JobDetail::pending(job.id, sequence as u32, item, created_at))
            .collect();
        (job, details)
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 10, 0, 0).unwrap()
    }

    fn page(ctx: &RequestContext) -> JobQuery {
        JobQuery {
            visibility: ctx.visibility(),
            range: DateRange::default(),
            product: None,
            offset: 0,
            limit: 20,
        }
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let store = store().await;
        let ctx = member_in(Uuid::new_v4());
        let (job, details) = job_at(&ctx, ProductType::LiveStatus, 3, day(1));

        store.create_job(&job, &details).await.unwrap();

        let found = store.find_job(job.id).await.unwrap().unwrap();
        assert_eq!(found, job);
        let loaded = store.details_for_job(job.id).await.unwrap();
        assert_eq!(loaded, details);
        assert_eq!(store.count_details(job.id).await.unwrap().pending, 3);
        assert!(store.find_job(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_large_job_is_inserted_in_chunks() {
        let store = store().await;
        let ctx = member_in(Uuid::new_v4());
        let (job, details) = job_at(&ctx, ProductType::LiveStatus, 150, day(1));

        store.create_job(&job, &details).await.unwrap();

        let loaded = store.details_for_job(job.id).await.unwrap();
        assert_eq!(loaded.len(), 150);
        assert_eq!(loaded.last().unwrap().sequence, 149);
    }

    #[tokio::test]
    async fn test_failed_create_leaves_nothing_behind() {
        let store = store().await;
        let ctx = member_in(Uuid::new_v4());
        let (first, first_details) = job_at(&ctx, ProductType::LiveStatus, 2, day(1));
        store.create_job(&first, &first_details).await.unwrap();

        // second job reuses a detail id, so its detail insert fails after the job row
        let (second, mut second_details) = job_at(&ctx, ProductType::LiveStatus, 2, day(2));
        second_details[1].id = first_details[0].id;

        let err = store.create_job(&second, &second_details).await.unwrap_err();
        assert!(err.is_persistence());
        assert!(store.find_job(second.id).await.unwrap().is_none());
        assert!(store.details_for_job(second.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_detail_writes_and_finalize() {
        let store = store().await;
        let ctx = member_in(Uuid::new_v4());
        let (job, details) = job_at(&ctx, ProductType::LiveStatus, 3, day(1));
        store.create_job(&job, &details).await.unwrap();

        store.mark_detail_in_progress(details[0].id).await.unwrap();
        assert!(store.find_detail(details[0].id).await.unwrap().unwrap().in_progress);

        let success = DetailUpdate {
            status: DetailStatus::Success,
            message: Some("Success".into()),
            primary_status: Some("active".into()),
            secondary_status: Some("reachable".into()),
            pricing_strategy: Some("PAY".into()),
            transaction_id: Some("TX-1".into()),
            provider_datetime: Some("2024-03-01 10:00:01".into()),
            raw_data: Some(json!({"live_status": "active, reachable"})),
        };
        store.complete_detail(details[0].id, &success).await.unwrap();
        store
            .complete_detail(details[1].id, &DetailUpdate::error("timed out"))
            .await
            .unwrap();

        let stored = store.find_detail(details[0].id).await.unwrap().unwrap();
        assert!(!stored.in_progress);
        assert_eq!(stored.status, DetailStatus::Success);
        assert_eq!(stored.secondary_status.as_deref(), Some("reachable"));
        assert_eq!(stored.raw_data, success.raw_data);

        let counts = store.count_details(job.id).await.unwrap();
        assert_eq!((counts.pending, counts.success, counts.error), (1, 1, 1));

        store
            .finalize_job(job.id, JobStatus::Done, counts.success, day(2))
            .await
            .unwrap();
        let finished = store.find_job(job.id).await.unwrap().unwrap();
        assert_eq!(finished.status, JobStatus::Done);
        assert_eq!(finished.success_count, 1);
        assert_eq!(finished.end_at, Some(day(2)));
    }

    #[tokio::test]
    async fn test_writes_to_missing_rows_are_not_found() {
        let store = store().await;

        let err = store
            .complete_detail(Uuid::new_v4(), &DetailUpdate::error("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));

        let err = store
            .finalize_job(Uuid::new_v4(), JobStatus::Done, 0, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_jobs_visibility_paging_and_product() {
        let store = store().await;
        let scope = Uuid::new_v4();
        let alice = member_in(scope);
        let bob = member_in(scope);

        for (ctx, product, d) in [
            (&alice, ProductType::LiveStatus, 1),
            (&alice, ProductType::TaxScore, 2),
            (&alice, ProductType::LiveStatus, 3),
            (&bob, ProductType::LiveStatus, 4),
        ] {
            let (job, details) = job_at(ctx, product, 1, day(d));
            store.create_job(&job, &details).await.unwrap();
        }

        let (jobs, total) = store.list_jobs(&page(&alice)).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(jobs[0].created_at, day(3));

        let (_, total) = store.list_jobs(&page(&admin_in(scope))).await.unwrap();
        assert_eq!(total, 4);

        let second_page = JobQuery {
            offset: 2,
            limit: 2,
            ..page(&alice)
        };
        let (jobs, total) = store.list_jobs(&second_page).await.unwrap();
        assert_eq!((jobs.len(), total), (1, 3));
        assert_eq!(jobs[0].created_at, day(1));

        let tax_only = JobQuery {
            product: Some(ProductType::TaxScore),
            ..page(&alice)
        };
        let (jobs, _) = store.list_jobs(&tax_only).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].product, ProductType::TaxScore);

        let march_2_to_3 = JobQuery {
            range: DateRange::new(Some(day(2)), Some(day(3))),
            ..page(&alice)
        };
        let (_, total) = store.list_jobs(&march_2_to_3).await.unwrap();
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn test_list_details_filters() {
        let store = store().await;
        let ctx = member_in(Uuid::new_v4());
        let (job, details) = job_at(&ctx, ProductType::LiveStatus, 5, day(1));
        store.create_job(&job, &details).await.unwrap();
        store
            .complete_detail(details[2].id, &DetailUpdate::error("provider unreachable"))
            .await
            .unwrap();

        let errors = DetailQuery {
            status: Some(DetailStatus::Error),
            limit: 20,
            ..Default::default()
        };
        let (items, total) = store.list_details(job.id, &errors).await.unwrap();
        assert_eq!((items.len(), total), (1, 1));
        assert_eq!(items[0].sequence, 2);

        let by_message = DetailQuery {
            keyword: Some("unreachable".into()),
            limit: 20,
            ..Default::default()
        };
        let (items, _) = store.list_details(job.id, &by_message).await.unwrap();
        assert_eq!(items.len(), 1);

        let by_item = DetailQuery {
            keyword: Some(details[4].item.clone()),
            limit: 20,
            ..Default::default()
        };
        let (items, _) = store.list_details(job.id, &by_item).await.unwrap();
        assert_eq!(items[0].id, details[4].id);

        let paged = DetailQuery {
            offset: 3,
            limit: 20,
            ..Default::default()
        };
        let (items, total) = store.list_details(job.id, &paged).await.unwrap();
        assert_eq!((items.len(), total), (2, 5));
    }

    #[tokio::test]
    async fn test_range_queries() {
        let store = store().await;
        let scope = Uuid::new_v4();
        let ctx = member_in(scope);
        let (early, early_details) = job_at(&ctx, ProductType::LiveStatus, 2, day(1));
        let (late, late_details) = job_at(&ctx, ProductType::LiveStatus, 3, day(10));
        store.create_job(&late, &late_details).await.unwrap();
        store.create_job(&early, &early_details).await.unwrap();

        let everything = DateRange::default();
        let details = store
            .details_in_range(&ctx.visibility(), &everything, 0, 100)
            .await
            .unwrap();
        assert_eq!(details.len(), 5);
        assert_eq!(details[0].job_id, early.id);
        assert_eq!(details[4].job_id, late.id);

        let mut paged = Vec::new();
        for offset in [0, 2, 4] {
            paged.extend(
                store
                    .details_in_range(&ctx.visibility(), &everything, offset, 2)
                    .await
                    .unwrap(),
            );
        }
        assert_eq!(
            paged.iter().map(|d| d.id).collect::<Vec<_>>(),
            details.iter().map(|d| d.id).collect::<Vec<_>>()
        );

        let first_week = DateRange::new(Some(day(1)), Some(day(1) + Duration::days(6)));
        assert_eq!(
            store.count_jobs(&ctx.visibility(), &first_week).await.unwrap(),
            1
        );
        let counts = store
            .count_details_in_range(&ctx.visibility(), &first_week)
            .await
            .unwrap();
        assert_eq!(counts.total(), 2);

        let outsider = member_in(scope);
        assert!(
            store
                .details_in_range(&outsider.visibility(), &everything, 0, 100)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_batch_through_database_store() {
        let store: Arc<dyn JobStore> = Arc::new(store().await);
        let items = phone_numbers(3);
        let provider = ScriptedProvider::live_status(Reply::Status("active, reachable"))
            .with_reply(&items[1], Reply::Transport);
        let service = wire_service(store.clone(), Arc::new(provider), &fast_dispatch());

        let ack = service
            .submit_batch(&member_in(Uuid::new_v4()), ProductType::LiveStatus, items)
            .await
            .unwrap();

        let job = store.find_job(ack.job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Done);
        assert_eq!(job.success_count, 2);
        let details = store.details_for_job(ack.job_id).await.unwrap();
        assert_eq!(details[1].status, DetailStatus::Error);
        assert!(details.iter().all(|d| !d.in_progress));
        assert_eq!(details[0].primary_status.as_deref(), Some("active"));
    }
}
