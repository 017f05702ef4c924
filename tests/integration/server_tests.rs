//! HTTP route tests
//!
//! Builds the real application with an in-memory store and a scripted provider.

#[cfg(test)]
mod tests {
    use crate::common::{Reply, ScriptedProvider, phone_numbers};
    use actix_web::http::StatusCode;
    use actix_web::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
    use actix_web::{test, web};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use uuid::Uuid;
    use verification_gateway::config::Config;
    use verification_gateway::core::jobs::ErrorSink;
    use verification_gateway::core::providers::ProviderRegistry;
    use verification_gateway::server::context::{OWNER_HEADER, ROLE_HEADER, SCOPE_HEADER};
    use verification_gateway::server::{AppState, HttpServer};
    use verification_gateway::storage::InMemoryJobStore;

    struct Caller {
        owner: Uuid,
        scope: Uuid,
        role: &'static str,
    }

    impl Caller {
        fn member() -> Self {
            Self {
                owner: Uuid::new_v4(),
                scope: Uuid::new_v4(),
                role: "member",
            }
        }

        fn admin_of(other: &Caller) -> Self {
            Self {
                owner: Uuid::new_v4(),
                scope: other.scope,
                role: "admin",
            }
        }

        fn sign(&self, req: test::TestRequest) -> test::TestRequest {
            req.insert_header((OWNER_HEADER, self.owner.to_string()))
                .insert_header((SCOPE_HEADER, self.scope.to_string()))
                .insert_header((ROLE_HEADER, self.role))
        }
    }

    fn state() -> AppState {
        let mut config = Config::default();
        config.gateway.dispatch.pause_ms = 0;

        let items = phone_numbers(3);
        let provider = ScriptedProvider::live_status(Reply::Status("active, reachable"))
            .with_reply(&items[1], Reply::Transport);
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(provider), "test-key");

        AppState::new(
            config,
            Arc::new(InMemoryJobStore::new()),
            registry,
            ErrorSink::channel(64).0,
        )
    }

    macro_rules! app {
        () => {
            test::init_service(HttpServer::create_app(web::Data::new(state()))).await
        };
    }

    #[actix_web::test]
    async fn test_health_lists_products() {
        let app = app!();

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["status"], json!("healthy"));
        assert_eq!(body["data"]["products"], json!(["live-status"]));
    }

    #[actix_web::test]
    async fn test_missing_identity_is_unauthorized() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/v1/verifications/live-status")
            .set_json(json!({"item": "081234567890"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_single_verification_inline() {
        let app = app!();
        let caller = Caller::member();

        let req = caller
            .sign(test::TestRequest::post().uri("/v1/verifications/live-status"))
            .set_json(json!({"item": "081234567890"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["detail"]["status"], json!("success"));
        assert_eq!(body["data"]["detail"]["primary_status"], json!("active"));
        assert_eq!(body["data"]["detail"]["secondary_status"], json!("reachable"));
        assert_eq!(body["data"]["job"]["status"], json!("done"));
    }

    #[actix_web::test]
    async fn test_unknown_product_is_404() {
        let app = app!();

        let req = Caller::member()
            .sign(test::TestRequest::post().uri("/v1/verifications/credit-score"))
            .set_json(json!({"item": "081234567890"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        // known product without a configured provider
        let req = Caller::member()
            .sign(test::TestRequest::post().uri("/v1/verifications/tax-score"))
            .set_json(json!({"item": "012345678901000"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_empty_batch_is_rejected() {
        let app = app!();

        let req = Caller::member()
            .sign(test::TestRequest::post().uri("/v1/verifications/live-status/batch"))
            .set_json(json!({"items": []}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_batch_then_query_and_export() {
        let app = app!();
        let caller = Caller::member();

        let req = caller
            .sign(test::TestRequest::post().uri("/v1/verifications/live-status/batch"))
            .set_json(json!({"items": phone_numbers(3)}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["total"], json!(3));
        assert_eq!(body["data"]["status"], json!("done"));
        let job_id = body["data"]["job_id"].as_str().unwrap().to_string();

        let req = caller
            .sign(test::TestRequest::get().uri(&format!("/v1/jobs/{}", job_id)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["success_count"], json!(2));

        let req = caller
            .sign(test::TestRequest::get().uri(&format!(
                "/v1/jobs/{}/details?status=error&page=1&limit=10",
                job_id
            )))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["details"]["pagination"]["total"], json!(1));
        assert_eq!(body["data"]["details"]["items"][0]["sequence"], json!(1));
        assert_eq!(body["data"]["counts"]["success"], json!(2));

        let req = caller
            .sign(test::TestRequest::get().uri("/v1/jobs?page=1&limit=10"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["pagination"]["total"], json!(1));
        assert_eq!(body["data"]["items"][0]["id"], json!(job_id));

        let req = Caller::admin_of(&caller)
            .sign(test::TestRequest::get().uri("/v1/jobs/summary"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["total_jobs"], json!(1));
        assert_eq!(body["data"]["total_items"], json!(3));

        let req = caller
            .sign(test::TestRequest::get().uri(&format!("/v1/jobs/{}/export", job_id)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap(),
            "text/csv"
        );
        assert!(
            resp.headers()
                .get(CONTENT_DISPOSITION)
                .unwrap()
                .to_str()
                .unwrap()
                .contains(&format!("job-{}.csv", job_id))
        );
        let csv_body = test::read_body(resp).await;
        assert_eq!(csv_body.iter().filter(|b| **b == b'\n').count(), 4);

        let req = caller
            .sign(test::TestRequest::get().uri("/v1/jobs/export?from=2000-01-01"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            resp.headers()
                .get(CONTENT_DISPOSITION)
                .unwrap()
                .to_str()
                .unwrap()
                .contains("details-20000101-now.csv")
        );
        let csv_body = test::read_body(resp).await;
        assert_eq!(csv_body.iter().filter(|b| **b == b'\n').count(), 4);
    }

    #[actix_web::test]
    async fn test_other_member_cannot_see_job() {
        let app = app!();
        let owner = Caller::member();

        let req = owner
            .sign(test::TestRequest::post().uri("/v1/verifications/live-status"))
            .set_json(json!({"item": "081234567890"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let job_id = body["data"]["job"]["id"].as_str().unwrap().to_string();

        let stranger = Caller {
            owner: Uuid::new_v4(),
            scope: owner.scope,
            role: "member",
        };
        let req = stranger
            .sign(test::TestRequest::get().uri(&format!("/v1/jobs/{}", job_id)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_csv_batch_upload() {
        let app = app!();

        let req = Caller::member()
            .sign(test::TestRequest::post().uri("/v1/verifications/live-status/batch"))
            .insert_header((CONTENT_TYPE, "text/csv"))
            .set_payload("phone_number\n081234567890\n\n081234567891\n")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["total"], json!(2));
    }

    #[actix_web::test]
    async fn test_invalid_query_parameters_are_400() {
        let app = app!();
        let caller = Caller::member();

        for uri in [
            "/v1/jobs?limit=5000".to_string(),
            "/v1/jobs?page=0".to_string(),
            "/v1/jobs?from=2024-02-01&to=2024-01-01".to_string(),
            "/v1/jobs/summary?from=yesterday".to_string(),
            format!("/v1/jobs/{}/details?status=bogus", Uuid::new_v4()),
        ] {
            let req = caller.sign(test::TestRequest::get().uri(&uri)).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_unknown_job_is_404() {
        let app = app!();

        let req = Caller::member()
            .sign(test::TestRequest::get().uri(&format!("/v1/jobs/{}", Uuid::new_v4())))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
