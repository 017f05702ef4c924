//! CSV export tests

#[cfg(test)]
mod tests {
    use crate::common::{
        Reply, ScriptedProvider, admin_in, fast_dispatch, member_in, phone_numbers, wire_service,
    };
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use uuid::Uuid;
    use verification_gateway::core::jobs::export::EXPORT_COLUMNS;
    use verification_gateway::core::jobs::{DateRange, Exporter};
    use verification_gateway::core::providers::ProductType;
    use verification_gateway::storage::InMemoryJobStore;
    use verification_gateway::utils::error::GatewayError;

    fn read_rows(body: &[u8]) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::Reader::from_reader(body);
        let headers = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect();
        let rows = reader
            .records()
            .map(|record| record.unwrap().iter().map(str::to_string).collect())
            .collect();
        (headers, rows)
    }

    #[tokio::test]
    async fn test_export_job_writes_one_row_per_detail() {
        let store = Arc::new(InMemoryJobStore::new());
        let items = phone_numbers(3);
        let provider = ScriptedProvider::live_status(Reply::Status("active, reachable"))
            .with_reply(&items[2], Reply::Business("PHONE_NOT_ACTIVE"));
        let service = wire_service(store.clone(), Arc::new(provider), &fast_dispatch());
        let ctx = member_in(Uuid::new_v4());
        let ack = service
            .submit_batch(&ctx, ProductType::LiveStatus, items.clone())
            .await
            .unwrap();

        let export = Exporter::new(store).export_job(&ctx, ack.job_id).await.unwrap();

        assert_eq!(export.filename, format!("job-{}.csv", ack.job_id));
        assert_eq!(export.rows, 3);
        let (headers, rows) = read_rows(&export.body);
        assert_eq!(headers, EXPORT_COLUMNS.to_vec());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][1], "0");
        assert_eq!(rows[0][2], items[0]);
        assert_eq!(rows[0][3], "success");
        assert_eq!(rows[0][5], "active");
        assert_eq!(rows[0][6], "reachable");
        assert_eq!(rows[2][3], "fail");
        assert_eq!(rows[2][4], "rejected by provider");
        assert!(rows[0][10].ends_with('Z'));
    }

    #[tokio::test]
    async fn test_export_job_respects_visibility() {
        let store = Arc::new(InMemoryJobStore::new());
        let provider = Arc::new(ScriptedProvider::live_status(Reply::Status("active")));
        let service = wire_service(store.clone(), provider, &fast_dispatch());
        let scope = Uuid::new_v4();
        let ack = service
            .submit_batch(&member_in(scope), ProductType::LiveStatus, phone_numbers(1))
            .await
            .unwrap();
        let exporter = Exporter::new(store);

        let err = exporter
            .export_job(&member_in(scope), ack.job_id)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));

        assert!(exporter.export_job(&admin_in(scope), ack.job_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_export_range_spans_jobs() {
        let store = Arc::new(InMemoryJobStore::new());
        let provider = Arc::new(ScriptedProvider::live_status(Reply::Status("active")));
        let service = wire_service(store.clone(), provider, &fast_dispatch());
        let scope = Uuid::new_v4();
        let ctx = admin_in(scope);

        for count in [2, 3] {
            service
                .submit_batch(&member_in(scope), ProductType::LiveStatus, phone_numbers(count))
                .await
                .unwrap();
        }

        let now = Utc::now();
        let range = DateRange::new(Some(now - Duration::days(1)), Some(now + Duration::days(1)));
        let export = Exporter::new(store.clone())
            .with_page_size(2)
            .export_range(&ctx, range)
            .await
            .unwrap();

        assert!(export.filename.starts_with("details-"));
        let body = export.collect_body().await.unwrap();
        let (headers, rows) = read_rows(&body);
        assert_eq!(headers.len(), EXPORT_COLUMNS.len());
        assert_eq!(rows.len(), 5);
        assert_eq!(rows.iter().filter(|row| row[1] == "0").count(), 2);

        let empty = Exporter::new(store)
            .export_range(
                &ctx,
                DateRange::new(Some(now + Duration::days(2)), None),
            )
            .await
            .unwrap();
        assert!(empty.filename.ends_with("-now.csv"));
        let (headers, rows) = read_rows(&empty.collect_body().await.unwrap());
        assert_eq!(headers.len(), EXPORT_COLUMNS.len());
        assert!(rows.is_empty());
    }
}
