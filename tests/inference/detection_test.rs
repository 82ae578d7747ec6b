#[cfg(test)]
mod tests {
    use cartographer::inference::{
        detect_keys, detect_relationships, ConfidenceTier, DetectionFlags, DetectionMode, Engine,
        EngineConfig, SignalBucket, SignalCategory,
    };
    use cartographer::table::{Table, Value};

    fn orders() -> Table {
        Table::new("orders")
            .with_column("customer_id", [1, 2, 2, 3])
            .with_column("amount", [19.5, 5.25, 7.0, 12.75])
    }

    fn customers() -> Table {
        Table::new("customers")
            .with_column("customer_id", [1, 2, 3])
            .with_column("name", ["ann", "bob", "cy"])
    }

    // Two seven-digit codes keep the column below the int_code format threshold.
    fn regions() -> Table {
        Table::new("regions").with_column("code", [1, 2, 3, 1_234_567, 2_345_678])
    }

    #[test]
    fn test_orders_reference_customers() {
        let rels = detect_relationships(
            &[orders(), customers()],
            DetectionMode::Both,
            ConfidenceTier::Medium,
            None,
        );

        assert_eq!(rels.len(), 1);
        let rel = &rels[0];
        assert_eq!(
            (rel.from_table.as_str(), rel.from_column.as_str()),
            ("orders", "customer_id")
        );
        assert_eq!(
            (rel.to_table.as_str(), rel.to_column.as_str()),
            ("customers", "customer_id")
        );
        assert_eq!(rel.confidence, ConfidenceTier::High);
        assert_eq!(rel.score, 1.0);
        assert_eq!(rel.detected_by, SignalCategory::Naming);
        assert!(rel.has_signal(SignalBucket::NamingExact));
        assert_eq!(rel.reasons[0], "exact FK naming");
    }

    #[test]
    fn test_unrelated_tables_produce_nothing() {
        let alpha = Table::new("alpha")
            .with_column("code", ["x1", "x2", "x2"])
            .with_column("size", [1.5, 2.5, 2.5]);
        let beta = Table::new("beta")
            .with_column(
                "moment",
                vec![
                    Value::Timestamp("2024-01-01T00:00:00".into()),
                    Value::Timestamp("2024-01-02T00:00:00".into()),
                    Value::Timestamp("2024-01-03T00:00:00".into()),
                ],
            )
            .with_column("level", [10, 20, 30]);

        let rels = detect_relationships(
            &[alpha, beta],
            DetectionMode::Both,
            ConfidenceTier::Low,
            None,
        );
        assert!(rels.is_empty(), "unexpected: {rels:?}");
    }

    #[test]
    fn test_detection_is_deterministic() {
        let tables = [orders(), customers(), regions()];
        let first = detect_relationships(&tables, DetectionMode::Both, ConfidenceTier::Low, None);
        let second = detect_relationships(&tables, DetectionMode::Both, ConfidenceTier::Low, None);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_type_mismatch_blocks_exact_naming() {
        let orders = Table::new("orders").with_column("customer_id", ["a", "b", "b"]);
        let customers = Table::new("customers").with_column("customer_id", [1, 2, 3]);
        let rels = detect_relationships(
            &[orders, customers],
            DetectionMode::Both,
            ConfidenceTier::Low,
            None,
        );
        assert!(rels.is_empty());
    }

    #[test]
    fn test_min_confidence_filters_medium_candidates() {
        // Overlap 0.8 plus a shared int_code format: 1 - 0.45 * 0.6 = 0.73.
        let tables = [
            Table::new("left").with_column("a", [1, 2, 3, 4, 5, 5]),
            Table::new("right").with_column("b", [1, 2, 3, 4, 9]),
        ];

        let medium = detect_relationships(
            &tables,
            DetectionMode::Content,
            ConfidenceTier::Medium,
            None,
        );
        assert_eq!(medium.len(), 1);
        assert_eq!(medium[0].score, 0.73);
        assert_eq!(medium[0].confidence, ConfidenceTier::Medium);
        assert_eq!(medium[0].detected_by, SignalCategory::ValueOverlap);
        assert_eq!(
            medium[0].reasons,
            vec!["partial overlap 80%", "shared format [int_code]"]
        );

        let high = detect_relationships(
            &tables,
            DetectionMode::Content,
            ConfidenceTier::High,
            None,
        );
        assert!(high.is_empty());
    }

    #[test]
    fn test_explicit_flags_override_mode() {
        let tables = [orders(), customers()];
        let flags = DetectionFlags::none();
        let rels = detect_relationships(
            &tables,
            DetectionMode::Both,
            ConfidenceTier::Low,
            Some(&flags),
        );
        assert!(rels.is_empty());
    }

    #[test]
    fn test_near_best_filter_depends_on_table_order() {
        // Full overlap plus weak naming: 1 - 0.1 * 0.75 = 0.925.
        let to_regions = detect_relationships(
            &[orders(), regions()],
            DetectionMode::Both,
            ConfidenceTier::Medium,
            None,
        );
        assert_eq!(to_regions.len(), 1);
        assert_eq!(to_regions[0].score, 0.925);
        assert!(!to_regions[0].has_signal(SignalBucket::FormatMatch));

        // customers first: regions falls more than 0.05 below the running best.
        let rels = detect_relationships(
            &[orders(), customers(), regions()],
            DetectionMode::Both,
            ConfidenceTier::Medium,
            None,
        );
        let targets: Vec<_> = rels.iter().map(|r| r.to_table.as_str()).collect();
        assert_eq!(targets, vec!["customers"]);

        // regions first: its lower score is accepted, then customers beats it.
        let rels = detect_relationships(
            &[orders(), regions(), customers()],
            DetectionMode::Both,
            ConfidenceTier::Medium,
            None,
        );
        let targets: Vec<_> = rels.iter().map(|r| r.to_table.as_str()).collect();
        assert_eq!(targets, vec!["customers", "regions"]);
        assert!(rels[0].score >= rels[1].score);
    }

    #[test]
    fn test_large_source_only_targets_key_names() {
        let people = || {
            Table::new("people")
                .with_column("ident", [1, 2])
                .with_column("person_key", [1, 2])
        };

        let small = Table::new("events").with_column("owner", [1, 1]);
        let rels = detect_relationships(
            &[small, people()],
            DetectionMode::Content,
            ConfidenceTier::Medium,
            None,
        );
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].to_column, "ident");

        let mut wide = Table::new("events");
        for i in 0..300 {
            wide = wide.with_column(format!("f{i}"), [0, 0]);
        }
        wide = wide.with_column("owner", [1, 1]);
        assert_eq!(wide.column_count(), 301);

        let rels = detect_relationships(
            &[wide, people()],
            DetectionMode::Content,
            ConfidenceTier::Medium,
            None,
        );
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].from_column, "owner");
        assert_eq!(rels[0].to_column, "person_key");
    }

    #[test]
    fn test_empty_tables_use_naming_only() {
        let tables = [
            Table::new("orders").with_column("customer_id", Vec::<Value>::new()),
            Table::new("customers").with_column("customer_id", Vec::<Value>::new()),
        ];

        let content = detect_relationships(
            &tables,
            DetectionMode::Content,
            ConfidenceTier::Low,
            None,
        );
        assert!(content.is_empty());

        let naming = detect_relationships(
            &tables,
            DetectionMode::Naming,
            ConfidenceTier::Low,
            None,
        );
        assert_eq!(naming.len(), 2);
        assert_eq!(naming[0].from_table, "orders");
        assert_eq!(naming[0].confidence, ConfidenceTier::High);
        // Identical stems, no naming convention: strong similarity only.
        assert_eq!(naming[1].from_table, "customers");
        assert_eq!(naming[1].score, 0.6);
        assert_eq!(naming[1].confidence, ConfidenceTier::Medium);
    }

    #[test]
    fn test_results_sorted_by_tier_then_score() {
        let tables = [orders(), regions(), customers()];
        let rels = detect_relationships(&tables, DetectionMode::Both, ConfidenceTier::Low, None);
        for pair in rels.windows(2) {
            assert!(
                (pair[0].confidence, pair[0].score) >= (pair[1].confidence, pair[1].score),
                "out of order: {} before {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_primary_keys() {
        let stock = Table::new("stock")
            .with_column("label", ["x", "y", "z"])
            .with_column("item_code", ["a", "b", "c"]);
        let keys = detect_keys(&[orders(), customers(), stock], DetectionMode::Both);

        assert_eq!(keys.get("customers"), Some("customer_id"));
        assert_eq!(keys.get("stock"), Some("item_code"));
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_engine_analyze_snapshot() {
        let engine = Engine::new(EngineConfig::new(DetectionMode::Both));
        let analysis = engine.analyze(&[orders(), customers()]);
        let lines: Vec<String> = analysis.relationships.iter().map(ToString::to_string).collect();
        insta::assert_snapshot!(
            lines.join("\n"),
            @"orders.customer_id -> customers.customer_id (high, 1.000, naming)"
        );
    }
}
