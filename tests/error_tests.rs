// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use activity_reconcile::error::ReconcileError;
use activity_reconcile::models::{Activity, Field, FieldTable, Policy, Uid};

#[test]
fn test_structural_errors() {
    let err = Uid::parse(":101").unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidUid(_)));
    assert!(err.is_structural());

    let err = Activity::default().value_of("pace").unwrap_err();
    assert!(matches!(err, ReconcileError::UnknownField(ref name) if name == "pace"));
    assert!(err.is_structural());

    let err = FieldTable::default()
        .with_policy(Field::Equipment, Policy::Max)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Field equipment does not support aggregation policy max"
    );
    assert!(err.is_structural());
}

#[test]
fn test_non_structural_errors() {
    let err = ReconcileError::Store("connection reset".to_string());
    assert!(!err.is_structural());
    assert_eq!(err.to_string(), "Store error: connection reset");

    let err: ReconcileError = anyhow::anyhow!("boom").into();
    assert!(matches!(err, ReconcileError::Internal(_)));
    assert!(!err.is_structural());
}

#[test]
fn test_path_and_part_are_exclusive() {
    assert!(matches!(
        Uid::parse("polar:101?recording.gpx#2"),
        Err(ReconcileError::InvalidUid(_))
    ));
    let resource = Uid::parse("polar:101?recording.gpx").unwrap();
    assert!(resource.with_part(2).is_err());
}
