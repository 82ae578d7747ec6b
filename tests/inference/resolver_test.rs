#[cfg(test)]
mod tests {
    use cartographer::inference::{
        detect_relationships, resolve, ConfidenceTier, DeclaredRelationship, DeclaredSource,
        DetectionMode, ManualRelationship, RelationshipSource,
    };
    use cartographer::table::Table;

    fn tables() -> Vec<Table> {
        vec![
            Table::new("orders")
                .with_column("customer_id", [1, 2, 2, 3])
                .with_column("store_id", [7, 7, 8, 8]),
            Table::new("customers")
                .with_column("customer_id", [1, 2, 3])
                .with_column("name", ["ann", "bob", "cy"]),
            Table::new("stores").with_column("store_id", [7, 8]),
        ]
    }

    #[test]
    fn test_inferred_pairs_before_resolution() {
        let inferred = detect_relationships(
            &tables(),
            DetectionMode::Both,
            ConfidenceTier::Medium,
            None,
        );
        let pairs: Vec<_> = inferred
            .iter()
            .map(|r| (r.from_table.as_str(), r.to_table.as_str()))
            .collect();
        assert!(pairs.contains(&("orders", "customers")));
        assert!(pairs.contains(&("orders", "stores")));
    }

    #[test]
    fn test_declared_pair_supersedes_inferred() {
        let inferred = detect_relationships(
            &tables(),
            DetectionMode::Both,
            ConfidenceTier::Medium,
            None,
        );
        let declared = [DeclaredRelationship::new(
            "orders",
            "customer_id",
            "customers",
            "name",
        )];

        let rels = resolve(&declared, inferred, &[]);

        let to_customers: Vec<_> = rels
            .iter()
            .filter(|r| r.from_table == "orders" && r.to_table == "customers")
            .collect();
        assert_eq!(to_customers.len(), 1);
        assert_eq!(to_customers[0].source, RelationshipSource::Schema);
        assert_eq!(to_customers[0].to_column, "name");

        // Other pairs still come from inference.
        assert!(rels
            .iter()
            .any(|r| r.to_table == "stores" && r.source == RelationshipSource::Inferred));
        assert_eq!(rels[0].source, RelationshipSource::Schema);
    }

    #[test]
    fn test_database_constraints_follow_schema() {
        let declared = [
            DeclaredRelationship::new("orders", "customer_id", "customers", "customer_id"),
            DeclaredRelationship::new("orders", "customer_id", "customers", "customer_id")
                .with_source(DeclaredSource::Database),
            DeclaredRelationship::new("orders", "store_id", "stores", "store_id")
                .with_source(DeclaredSource::Database),
        ];
        let inferred = detect_relationships(
            &tables(),
            DetectionMode::Both,
            ConfidenceTier::Medium,
            None,
        );

        let rels = resolve(&declared, inferred, &[]);
        let sources: Vec<_> = rels.iter().map(|r| r.source).collect();
        assert_eq!(
            sources,
            vec![RelationshipSource::Schema, RelationshipSource::DatabaseConstraint]
        );
    }

    #[test]
    fn test_manual_relationships_come_last() {
        let declared = [DeclaredRelationship::new(
            "orders",
            "customer_id",
            "customers",
            "customer_id",
        )];
        let manual = [
            ManualRelationship::new("orders", "customer_id", "customers", "customer_id"),
            ManualRelationship::new("customers", "name", "stores", "store_id"),
        ];
        let inferred = detect_relationships(
            &tables(),
            DetectionMode::Both,
            ConfidenceTier::Medium,
            None,
        );

        let rels = resolve(&declared, inferred, &manual);
        let n = rels.len();
        assert!(n >= 3);
        assert_eq!(rels[n - 2].source, RelationshipSource::Manual);
        assert_eq!(rels[n - 1].source, RelationshipSource::Manual);
        assert_eq!(rels[n - 1].from_table, "customers");
        assert!(rels[..n - 2].iter().all(|r| r.source != RelationshipSource::Manual));

        for rel in &rels[n - 2..] {
            assert_eq!(rel.confidence, ConfidenceTier::High);
            assert_eq!(rel.score, 1.0);
            assert_eq!(rel.reasons, vec!["manual override"]);
        }
    }

    #[test]
    fn test_resolved_json_shape() {
        let declared = [DeclaredRelationship::new("orders", "store_id", "stores", "store_id")];
        let rels = resolve(&declared, Vec::new(), &[]);
        let json = serde_json::to_value(&rels).unwrap();

        assert_eq!(json[0]["source"], "schema");
        assert_eq!(json[0]["confidence"], "high");
        assert_eq!(json[0]["score"], 1.0);
        assert!(json[0].get("detected_by").is_none());
    }
}
