#[cfg(test)]
mod facade_tests {
    use async_trait::async_trait;
    use chrono::{Duration, Local, NaiveDate};
    use ga4_mcp_core::AnalyticsAdapter;
    use ga4_mcp_providers::types::*;
    use ga4_mcp_providers::{AnalyticsClient, ClientFactory, ProviderError};
    use ga4_mcp_tools::analytics::DEFAULT_ROW_LIMIT;
    use ga4_mcp_tools::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // Mock provider: the token "denied" triggers a permission failure,
    // "broken" a malformed-response failure.
    struct MockClient {
        mode: &'static str,
        requests: Arc<Mutex<Vec<RunReportRequest>>>,
    }

    impl MockClient {
        fn fail(&self) -> Result<(), ProviderError> {
            match self.mode {
                "denied" => Err(ProviderError::Api {
                    status: 403,
                    code: Some("PERMISSION_DENIED".into()),
                    message: "User does not have sufficient permissions for this property."
                        .into(),
                }),
                "expired" => Err(ProviderError::Api {
                    status: 401,
                    code: Some("UNAUTHENTICATED".into()),
                    message: "Request had invalid authentication credentials.".into(),
                }),
                "broken" => Err(ProviderError::Parse("unexpected end of input".into())),
                _ => Ok(()),
            }
        }

        fn report(&self) -> ReportResponse {
            serde_json::from_value(json!({
                "dimensionHeaders": [{"name": "country"}],
                "metricHeaders": [{"name": "activeUsers", "type": "TYPE_INTEGER"}],
                "rows": [
                    {"dimensionValues": [{"value": "US"}], "metricValues": [{"value": "100"}]},
                    {"dimensionValues": [{"value": "FR"}], "metricValues": [{"value": "40"}]}
                ],
                "rowCount": 2
            }))
            .unwrap()
        }
    }

    #[async_trait]
    impl AnalyticsClient for MockClient {
        async fn run_report(&self, request: RunReportRequest) -> Result<ReportResponse, ProviderError> {
            self.requests.lock().push(request);
            self.fail()?;
            Ok(self.report())
        }

        async fn run_realtime_report(
            &self,
            _: RunRealtimeReportRequest,
        ) -> Result<ReportResponse, ProviderError> {
            self.fail()?;
            Ok(ReportResponse::default())
        }

        async fn get_metadata(&self, name: &str) -> Result<Metadata, ProviderError> {
            self.fail()?;
            Ok(Metadata {
                name: name.to_string(),
                dimensions: vec![DimensionMetadata {
                    api_name: "country".into(),
                    ui_name: "Country".into(),
                    description: "The country of the user".into(),
                    category: "Geography".into(),
                }],
                metrics: vec![MetricMetadata {
                    api_name: "sessions".into(),
                    ui_name: "Sessions".into(),
                    description: "The number of sessions".into(),
                    category: "Session".into(),
                    metric_type: Some("TYPE_INTEGER".into()),
                }],
            })
        }

        async fn close(&self) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockFactory {
        builds: AtomicUsize,
        requests: Arc<Mutex<Vec<RunReportRequest>>>,
    }

    impl MockFactory {
        fn client(&self, mode: &'static str) -> Arc<dyn AnalyticsClient> {
            Arc::new(MockClient {
                mode,
                requests: self.requests.clone(),
            })
        }

        fn sent(&self) -> Vec<RunReportRequest> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl ClientFactory for MockFactory {
        async fn ambient(&self) -> Result<Arc<dyn AnalyticsClient>, ProviderError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            Ok(self.client("ok"))
        }

        fn with_access_token(
            &self,
            access_token: &str,
        ) -> Result<Arc<dyn AnalyticsClient>, ProviderError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            let mode = match access_token {
                "denied" => "denied",
                "expired" => "expired",
                "broken" => "broken",
                _ => "ok",
            };
            Ok(self.client(mode))
        }
    }

    fn setup(default_property: Option<&str>) -> (ToolRegistry, Arc<MockFactory>) {
        let factory = Arc::new(MockFactory::default());
        let dyn_factory: Arc<dyn ClientFactory> = factory.clone();
        let adapter = Arc::new(
            AnalyticsAdapter::with_workers(dyn_factory, default_property.map(str::to_string), 2)
                .unwrap(),
        );
        (analytics_tools(adapter), factory)
    }

    fn expect_error(result: ToolResult) -> ErrorPayload {
        match result {
            ToolResult::Error(payload) => payload,
            ToolResult::Text(text) => panic!("Expected error payload, got text: {}", text),
        }
    }

    #[tokio::test]
    async fn test_registry_lists_three_tools() {
        let (registry, _) = setup(Some("123"));
        assert_eq!(
            registry.list(),
            vec!["get_metadata", "run_realtime_report", "run_report"]
        );
        for descriptor in registry.descriptors() {
            assert_eq!(descriptor["inputSchema"]["type"], "object");
        }
    }

    #[tokio::test]
    async fn test_run_report_renders_table() {
        let (registry, _) = setup(Some("123"));
        let result = registry
            .call(
                "run_report",
                json!({"metrics": ["activeUsers"], "dimensions": ["country"]}),
            )
            .await
            .unwrap();

        assert_eq!(
            result,
            ToolResult::Text(
                "| country | activeUsers |\n| --- | --- |\n| US | 100 |\n| FR | 40 |".into()
            )
        );
    }

    fn parse_date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_run_report_last7days_with_limit() {
        let (registry, factory) = setup(Some("123"));
        let result = registry
            .call(
                "run_report",
                json!({
                    "metrics": ["activeUsers"],
                    "dimensions": ["country"],
                    "date_range": "last7days",
                    "limit": 5
                }),
            )
            .await
            .unwrap();

        let text = result.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "| country | activeUsers |");
        assert_eq!(lines[1], "| --- | --- |");
        assert_eq!(lines[2], "| US | 100 |");
        assert_eq!(lines[3], "| FR | 40 |");

        let sent = factory.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].property, "properties/123");
        assert_eq!(sent[0].limit, 5);
        assert_eq!(sent[0].metrics[0].name, "activeUsers");
        assert_eq!(sent[0].dimensions[0].name, "country");
        assert_eq!(sent[0].date_ranges.len(), 1);

        let start = parse_date(&sent[0].date_ranges[0].start_date);
        let end = parse_date(&sent[0].date_ranges[0].end_date);
        assert_eq!(end, Local::now().date_naive());
        assert_eq!(end - start, Duration::days(6));
    }

    #[tokio::test]
    async fn test_run_report_defaults_to_last30days_and_ten_rows() {
        let (registry, factory) = setup(Some("123"));
        registry
            .call("run_report", json!({"metrics": ["sessions"]}))
            .await
            .unwrap();

        let sent = factory.sent();
        assert_eq!(sent[0].limit, DEFAULT_ROW_LIMIT);
        assert!(sent[0].dimensions.is_empty());

        let start = parse_date(&sent[0].date_ranges[0].start_date);
        let end = parse_date(&sent[0].date_ranges[0].end_date);
        assert_eq!(end, Local::now().date_naive());
        assert_eq!(end - start, Duration::days(29));
    }

    #[tokio::test]
    async fn test_realtime_with_no_rows() {
        let (registry, _) = setup(Some("123"));
        let result = registry
            .call("run_realtime_report", json!({"metrics": ["activeUsers"]}))
            .await
            .unwrap();
        assert_eq!(result.text(), "No data returned.");
    }

    #[tokio::test]
    async fn test_get_metadata_renders_document() {
        let (registry, _) = setup(Some("123"));
        let result = registry
            .call("get_metadata", json!({"type": "metrics"}))
            .await
            .unwrap();

        let text = result.text();
        assert!(text.starts_with("# Available Metrics"));
        assert!(text.contains("- **sessions**: Sessions"));
        assert!(text.contains("  - Category: Session"));
        assert!(!text.contains("# Available Dimensions"));
    }

    #[tokio::test]
    async fn test_permission_denied_payload() {
        let (registry, _) = setup(Some("123"));
        for tool in ["run_report", "run_realtime_report", "get_metadata"] {
            let result = registry
                .call(
                    tool,
                    json!({"metrics": ["sessions"], "kwargs": {"access_token": "denied"}}),
                )
                .await
                .unwrap();

            let payload = expect_error(result);
            assert_eq!(payload.status, "error");
            assert_eq!(payload.error_type, ErrorKind::PermissionDenied);
            assert!(payload.message.contains("sufficient permissions"));
        }
    }

    #[tokio::test]
    async fn test_unauthenticated_payload() {
        let (registry, _) = setup(Some("123"));
        let result = registry
            .call(
                "run_report",
                json!({"metrics": ["sessions"], "kwargs": {"access_token": "expired"}}),
            )
            .await
            .unwrap();
        assert_eq!(expect_error(result).error_type, ErrorKind::Unauthenticated);
    }

    #[tokio::test]
    async fn test_validation_errors_skip_network() {
        let (registry, factory) = setup(None);

        let missing_property = registry
            .call("run_report", json!({"metrics": ["sessions"]}))
            .await
            .unwrap();
        assert_eq!(expect_error(missing_property).error_type, ErrorKind::ValueError);

        let empty_metrics = registry
            .call("run_report", json!({"metrics": [], "property_id": "1"}))
            .await
            .unwrap();
        assert_eq!(expect_error(empty_metrics).error_type, ErrorKind::ValueError);

        let bad_type = registry
            .call("get_metadata", json!({"type": "segments", "property_id": "1"}))
            .await
            .unwrap();
        let payload = expect_error(bad_type);
        assert_eq!(payload.error_type, ErrorKind::ValueError);
        assert!(payload.message.contains("segments"));

        assert_eq!(factory.builds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unexpected_error_is_generic() {
        let (registry, _) = setup(Some("123"));
        let result = registry
            .call(
                "run_report",
                json!({"metrics": ["sessions"], "kwargs": {"access_token": "broken"}}),
            )
            .await
            .unwrap();

        let payload = expect_error(result);
        assert_eq!(payload.error_type, ErrorKind::UnexpectedServerError);
        assert!(!payload.message.contains("end of input"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (registry, _) = setup(Some("123"));
        assert!(registry.call("delete_property", json!({})).await.is_none());
    }
}
