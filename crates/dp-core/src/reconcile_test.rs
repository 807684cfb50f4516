use super::*;
use crate::manifest::CompiledGraph;
use crate::resource_tree::ResourceTree;

fn tree(entries: &[(&str, &str, &str)]) -> ResourceTree {
    entries.iter().copied().collect()
}

fn leaves(tree: &ResourceTree, namespace: &str, container: &str) -> Vec<String> {
    tree.container(namespace, container)
        .map(|set| set.iter().cloned().collect())
        .unwrap_or_default()
}

#[test]
fn test_undeclared_table_is_unmanaged() {
    let manifest = tree(&[("proj1", "ds1", "tableA")]);
    let inventory = tree(&[("proj1", "ds1", "tableA"), ("proj1", "ds1", "tableB")]);

    let unmanaged = reconcile(&manifest, &inventory, &ExclusionRule::new()).unwrap();

    assert_eq!(unmanaged, tree(&[("proj1", "ds1", "tableB")]));
    assert_eq!(
        unmanaged.to_pretty_json().unwrap(),
        "{\n    \"proj1\": {\n        \"ds1\": [\n            \"tableB\"\n        ]\n    }\n}"
    );
}

#[test]
fn test_pattern_exclusion_yields_empty_result() {
    let manifest = tree(&[("proj1", "other", "declared")]);
    let inventory = tree(&[("proj1", "ds1", "v_am_1")]);
    let exclusion = ExclusionRule::new().with_pattern("v_am|t_prm");

    let unmanaged = reconcile(&manifest, &inventory, &exclusion).unwrap();

    assert!(unmanaged.is_empty());
    assert_eq!(unmanaged.to_pretty_json().unwrap(), "{}");
}

#[test]
fn test_disabled_item_does_not_protect_live_table() {
    let graph = CompiledGraph::from_json(
        r#"{
            "tables": [
                {"target": {"database": "proj1", "schema": "ds1", "name": "tableA"}},
                {"target": {"database": "proj1", "schema": "ds1", "name": "tableC"}, "disabled": true}
            ],
            "assertions": []
        }"#,
    )
    .unwrap();
    let manifest = graph.declared_resources();
    let inventory = tree(&[("proj1", "ds1", "tableA"), ("proj1", "ds1", "tableC")]);

    let unmanaged = reconcile(&manifest, &inventory, &ExclusionRule::new()).unwrap();

    assert_eq!(leaves(&unmanaged, "proj1", "ds1"), vec!["tableC"]);
}

#[test]
fn test_namespaces_outside_manifest_are_never_visited() {
    let manifest = tree(&[("proj1", "ds1", "tableA")]);
    let inventory = tree(&[
        ("proj1", "ds1", "tableA"),
        ("proj2", "ds1", "orphan"),
        ("proj2", "ds2", "orphan_2"),
    ]);

    let unmanaged = reconcile(&manifest, &inventory, &ExclusionRule::new()).unwrap();

    assert!(unmanaged.is_empty());
    assert!(unmanaged.containers("proj2").is_none());
}

#[test]
fn test_declaration_must_match_exact_container() {
    let manifest = tree(&[("proj1", "ds1", "orders")]);
    let inventory = tree(&[("proj1", "ds1", "orders"), ("proj1", "ds2", "orders")]);

    let unmanaged = reconcile(&manifest, &inventory, &ExclusionRule::new()).unwrap();

    assert_eq!(unmanaged, tree(&[("proj1", "ds2", "orders")]));
}

#[test]
fn test_exclusion_wins_over_declaration_status() {
    let manifest = tree(&[("proj1", "ds1", "keep_me")]);
    let inventory = tree(&[
        ("proj1", "ds1", "keep_me"),
        ("proj1", "ds1", "tmp_scratch"),
        ("proj1", "ds1", "schema_migrations"),
        ("proj1", "ds1", "orphan"),
    ]);
    let exclusion = ExclusionRule::new()
        .with_pattern("^tmp_")
        .with_names(["schema_migrations"]);

    let unmanaged = reconcile(&manifest, &inventory, &exclusion).unwrap();

    assert_eq!(leaves(&unmanaged, "proj1", "ds1"), vec!["orphan"]);
}

#[test]
fn test_output_follows_inventory_order() {
    let manifest = tree(&[("proj1", "ds_z", "declared"), ("proj0", "ds", "declared")]);
    let inventory = tree(&[
        ("proj1", "ds_z", "zzz"),
        ("proj1", "ds_z", "aaa"),
        ("proj1", "ds_a", "mmm"),
        ("proj0", "ds", "bbb"),
    ]);

    let unmanaged = reconcile(&manifest, &inventory, &ExclusionRule::new()).unwrap();
    let paths: Vec<String> = unmanaged.paths().map(|p| p.to_string()).collect();

    // Namespace order comes from the manifest, container and leaf order from inventory.
    assert_eq!(
        paths,
        vec![
            "proj1.ds_z.zzz",
            "proj1.ds_z.aaa",
            "proj1.ds_a.mmm",
            "proj0.ds.bbb",
        ]
    );
}

#[test]
fn test_invalid_pattern_fails_reconciliation() {
    let manifest = tree(&[("proj1", "ds1", "a")]);
    let inventory = tree(&[("proj1", "ds1", "b")]);
    let exclusion = ExclusionRule::new().with_pattern("[");

    let err = reconcile(&manifest, &inventory, &exclusion).unwrap_err();
    assert!(matches!(
        err,
        crate::error::CoreError::InvalidExclusionPattern { .. }
    ));
}

#[test]
fn test_reconcile_is_idempotent() {
    let manifest = tree(&[("proj1", "ds1", "a"), ("proj1", "ds2", "c")]);
    let inventory = tree(&[
        ("proj1", "ds1", "a"),
        ("proj1", "ds1", "b"),
        ("proj1", "ds2", "c"),
        ("proj1", "ds2", "tmp_d"),
    ]);
    let exclusion = ExclusionRule::new().with_pattern("^tmp_");

    let first = reconcile(&manifest, &inventory, &exclusion).unwrap();
    let second = reconcile(&manifest, &inventory, &exclusion).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_pretty_json().unwrap(), second.to_pretty_json().unwrap());
}

#[test]
fn test_partition_covers_every_inventory_leaf() {
    let manifest = tree(&[
        ("proj1", "ds1", "a"),
        ("proj1", "ds1", "gone"),
        ("proj1", "ds2", "c"),
    ]);
    let inventory = tree(&[
        ("proj1", "ds1", "a"),
        ("proj1", "ds1", "b"),
        ("proj1", "ds1", "tmp_x"),
        ("proj1", "ds2", "c"),
        ("proj1", "ds2", "d"),
        ("proj1", "ds2", "audit"),
    ]);
    let exclusion = ExclusionRule::new()
        .with_pattern("^tmp_")
        .with_names(["audit"]);
    let matcher = exclusion.compile().unwrap();

    let unmanaged = reconcile_with(&manifest, &inventory, &matcher);

    for (namespace, container, inventory_leaves) in inventory.iter_containers() {
        for name in inventory_leaves {
            let is_unmanaged = unmanaged.contains(namespace, container, name);
            let is_declared = manifest.contains(namespace, container, name);
            let is_excluded = matcher.is_excluded(name);

            // Every leaf lands in at least one class; unmanaged is disjoint from the others.
            assert!(is_unmanaged || is_declared || is_excluded, "{name} unaccounted");
            if is_unmanaged {
                assert!(!is_declared && !is_excluded, "{name} misclassified");
            }
        }
    }
    for path in unmanaged.paths() {
        assert!(inventory.contains_path(&path));
    }
    assert_eq!(unmanaged.len(), 2);
}

#[test]
fn test_empty_inventory() {
    let manifest = tree(&[("proj1", "ds1", "a")]);
    let unmanaged = reconcile(&manifest, &ResourceTree::new(), &ExclusionRule::new()).unwrap();
    assert!(unmanaged.is_empty());
}
