//! Integration tests for monitoring-synth.
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::too_many_lines,
    clippy::doc_markdown
)]

use std::collections::{HashMap, HashSet};

use monitoring_synth::models::Metrics;
use monitoring_synth::rendering::{CUSTOM_METRICS_EXPORTER_NAMES_KEY, CUSTOM_METRICS_EXPORTERS_KEY};
use monitoring_synth::{
    Error, ExporterAssembler, Monitoring, ReconcileContext, ReconciliationRequest,
    StructuredValue, get_template_data,
};

fn request(entries: &[(&str, &str)]) -> ReconciliationRequest {
    let exporters = entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    Monitoring::new("opendatahub")
        .with_metrics(Metrics::with_exporters(exporters))
        .into()
}

#[test]
fn test_error_types() {
    let err = Error::ReservedName {
        name: "prometheus".to_string(),
    };
    assert!(err.to_string().contains("reserved"));
    assert!(err.is_reserved_name());

    let err = Error::InvalidInput("test message".to_string());
    let display = format!("{err}");
    assert!(display.contains("invalid input"));
    assert!(display.contains("test message"));

    let err = Error::OperationFailed {
        operation: "read".to_string(),
        cause: "file not found".to_string(),
    };
    let display = format!("{err}");
    assert!(display.contains("read"));
    assert!(display.contains("file not found"));
}

/// The four reference cases for custom exporter template data.
mod template_data_scenarios {
    use super::*;

    #[test]
    fn test_single_logging_exporter() {
        let data = get_template_data(
            &ReconcileContext::new(),
            &request(&[("logging", "loglevel: debug")]),
        )
        .unwrap();

        let exporters = data.custom_exporters().expect("exporters key present");
        let expected: StructuredValue = [("loglevel", StructuredValue::from("debug"))]
            .into_iter()
            .collect();
        assert_eq!(exporters.get("logging"), Some(&expected));
        assert_eq!(
            data.custom_exporter_names(),
            Some(&["logging".to_string()][..])
        );
    }

    #[test]
    fn test_nested_exporter_with_slash_in_name() {
        let data = get_template_data(
            &ReconcileContext::new(),
            &request(&[(
                "otlp/jaeger",
                "endpoint: http://jaeger:4317\ntls:\n  insecure: true",
            )]),
        )
        .unwrap();

        let tls: StructuredValue = [("insecure", StructuredValue::from(true))]
            .into_iter()
            .collect();
        let expected: StructuredValue = [
            ("endpoint", StructuredValue::from("http://jaeger:4317")),
            ("tls", tls),
        ]
        .into_iter()
        .collect();

        let exporters = data.custom_exporters().unwrap();
        assert_eq!(exporters.get("otlp/jaeger"), Some(&expected));
    }

    #[test]
    fn test_reserved_name_is_rejected() {
        let err = get_template_data(
            &ReconcileContext::new(),
            &request(&[("prometheus", "endpoint: http://example.com")]),
        )
        .unwrap_err();

        assert!(err.to_string().contains("reserved"));
        assert_eq!(err.exporter(), Some("prometheus"));
    }

    #[test]
    fn test_malformed_fragment_is_rejected() {
        let err = get_template_data(
            &ReconcileContext::new(),
            &request(&[("logging", "invalid: yaml: content: [unclosed")]),
        )
        .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("invalid YAML"));
        assert!(message.len() > "invalid YAML".len());
        assert!(err.is_invalid_yaml());
    }
}

mod assembly_contract {
    use super::*;

    #[test]
    fn test_views_agree_for_many_exporters() {
        let input: HashMap<String, String> = (0..25)
            .map(|i| (format!("otlp/backend-{i}"), format!("endpoint: host-{i}:4317")))
            .collect();

        let data = ExporterAssembler::new().assemble(&input).unwrap();

        assert_eq!(data.exporters.len(), input.len());
        assert_eq!(data.exporter_names.len(), input.len());
        let names: HashSet<_> = data.exporter_names.iter().collect();
        let keys: HashSet<_> = data.exporters.keys().collect();
        let inputs: HashSet<_> = input.keys().collect();
        assert_eq!(names, keys);
        assert_eq!(keys, inputs);
    }

    #[test]
    fn test_reserved_name_wins_over_malformed_fragment() {
        let input: HashMap<String, String> = [
            ("prometheus", "endpoint: http://example.com"),
            ("a-broken", "key: [unclosed"),
            ("z-broken", "key: {unclosed"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        for _ in 0..10 {
            let err = ExporterAssembler::new().assemble(&input).unwrap_err();
            assert!(err.is_reserved_name(), "unexpected error: {err}");
        }
    }

    #[test]
    fn test_no_partial_results() {
        let err = get_template_data(
            &ReconcileContext::new(),
            &request(&[("logging", "loglevel: debug"), ("debug", "[unclosed")]),
        )
        .unwrap_err();
        assert_eq!(err.exporter(), Some("debug"));
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let req = request(&[
            ("logging", "loglevel: debug"),
            ("otlp", "endpoint: collector:4317\nheaders:\n  x-tenant: a"),
            ("file", "path: /tmp/metrics.json"),
        ]);
        let ctx = ReconcileContext::new();

        let first = get_template_data(&ctx, &req).unwrap();
        let second = get_template_data(&ctx, &req).unwrap();

        assert_eq!(first.custom_exporters(), second.custom_exporters());
        let first_names: HashSet<_> = first.custom_exporter_names().unwrap().iter().collect();
        let second_names: HashSet<_> = second.custom_exporter_names().unwrap().iter().collect();
        assert_eq!(first_names, second_names);
    }

    #[test]
    fn test_empty_exporters_succeed() {
        let data = get_template_data(&ReconcileContext::new(), &request(&[])).unwrap();
        assert!(data.contains(CUSTOM_METRICS_EXPORTERS_KEY));
        assert!(data.contains(CUSTOM_METRICS_EXPORTER_NAMES_KEY));
        assert!(data.custom_exporters().unwrap().is_empty());
        assert!(data.custom_exporter_names().unwrap().is_empty());
    }

    #[test]
    fn test_metrics_disabled_yields_empty_exporters() {
        let req = ReconciliationRequest::new(Monitoring::new("opendatahub"));
        let data = get_template_data(&ReconcileContext::new(), &req).unwrap();
        assert!(data.custom_exporters().unwrap().is_empty());
        assert!(data.custom_exporter_names().unwrap().is_empty());
    }

    #[test]
    fn test_diagnose_reports_every_problem() {
        let input: HashMap<String, String> = [
            ("prometheus", "endpoint: http://example.com"),
            ("logging", "loglevel: debug"),
            ("debug", "[unclosed"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let problems = ExporterAssembler::new().diagnose(&input);
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].exporter(), Some("debug"));
        assert!(problems[0].is_invalid_yaml());
        assert_eq!(problems[1].exporter(), Some("prometheus"));
        assert!(problems[1].is_reserved_name());
    }
}

mod reconciliation {
    use super::*;

    #[test]
    fn test_cancelled_context_short_circuits() {
        let ctx = ReconcileContext::new();
        ctx.cancel();

        let err = get_template_data(&ctx, &request(&[("logging", "loglevel: debug")])).unwrap_err();
        assert!(matches!(err, Error::Cancelled { .. }));
    }

    #[test]
    fn test_manifest_to_template_data() {
        let manifest = r"
apiVersion: services.platform.opendatahub.io/v1alpha1
kind: Monitoring
metadata:
  name: default-monitoring
spec:
  namespace: opendatahub
  metrics:
    replicas: 3
    storage:
      size: 10Gi
    exporters:
      logging: |
        loglevel: debug
      otlp/backend: |
        endpoint: backend:4317
        compression: gzip
";
        let req = ReconciliationRequest::new(Monitoring::from_yaml(manifest).unwrap());
        let data = get_template_data(&ReconcileContext::new(), &req).unwrap();

        assert_eq!(data.get_string("Namespace"), Some("opendatahub"));
        assert_eq!(data.get_integer("Replicas"), Some(3));
        assert_eq!(data.get_string("StorageSize"), Some("10Gi"));
        assert_eq!(data.custom_exporters().unwrap().len(), 2);

        let json: serde_json::Value = serde_json::from_str(&data.to_json().unwrap()).unwrap();
        assert_eq!(
            json[CUSTOM_METRICS_EXPORTERS_KEY]["otlp/backend"]["compression"],
            "gzip"
        );
    }

    #[test]
    fn test_manifest_with_reserved_exporter_fails_at_build() {
        let manifest = "
kind: Monitoring
spec:
  namespace: opendatahub
  metrics:
    exporters:
      prometheus: 'endpoint: http://example.com'
";
        let req = ReconciliationRequest::new(Monitoring::from_yaml(manifest).unwrap());
        let err = get_template_data(&ReconcileContext::new(), &req).unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn test_concurrent_reconciliations_share_nothing() {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                std::thread::spawn(move || {
                    let name = format!("exporter-{i}");
                    let fragment = format!("endpoint: host-{i}:4317");
                    let data = get_template_data(
                        &ReconcileContext::new(),
                        &request(&[(name.as_str(), fragment.as_str())]),
                    )
                    .unwrap();
                    (name, data.custom_exporter_names().unwrap().to_vec())
                })
            })
            .collect();

        for handle in handles {
            let (name, names) = handle.join().unwrap();
            assert_eq!(names, vec![name]);
        }
    }

    #[tokio::test]
    async fn test_scoped_context_is_visible_during_build() {
        use monitoring_synth::reconcile::{current_reconcile_id, scope_reconcile_context};

        let ctx = ReconcileContext::from_id("scoped-run");
        let seen = scope_reconcile_context(ctx.clone(), async move {
            let id = current_reconcile_id();
            get_template_data(&ctx, &request(&[("logging", "loglevel: info")])).unwrap();
            id
        })
        .await;

        assert_eq!(seen.as_deref(), Some("scoped-run"));
        assert_eq!(current_reconcile_id(), None);
    }
}
