// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

mod common;

use activity_reconcile::models::ActivityType;
use activity_reconcile::services::Reconciler;
use chrono::TimeDelta;
use common::{at, recorded, uid};

#[test]
fn test_duration_weighted_average() {
    let mut long = recorded("polar:1", "Long", at(8, 0, 0), 120);
    long.heartrate = Some(120);
    let mut short = recorded("polar:2", "Short", at(10, 5, 0), 60);
    short.heartrate = Some(180);

    let multipart = Reconciler::default().multipart_of(&[&long, &short]).unwrap();
    assert_eq!(multipart.heartrate, Some(140));
    assert_eq!(multipart.duration, Some(TimeDelta::minutes(180)));
}

#[test]
fn test_triathlon_segments() {
    let t = at(8, 0, 0);
    let mut swim = recorded("polar:1", "Swim", t, 30);
    swim.activity_type = Some(ActivityType::SwimOpenWater);
    swim.distance = Some(1500.0);
    let mut bike = recorded("polar:2", "Bike", t + TimeDelta::minutes(35), 80);
    bike.activity_type = Some(ActivityType::BikeRoad);
    bike.distance = Some(40000.0);
    bike.tags = vec!["race".to_string()];
    let mut run = recorded("polar:3", "Run", t + TimeDelta::hours(2), 45);
    run.activity_type = Some(ActivityType::Run);
    run.distance = Some(10000.0);
    run.tags = vec!["race".to_string(), "triathlon".to_string()];

    // input order does not matter
    let multipart = Reconciler::default()
        .multipart_of(&[&run, &swim, &bike])
        .unwrap();

    let gaps: Vec<_> = multipart.parts.iter().map(|p| p.gap).collect();
    assert_eq!(
        gaps,
        vec![TimeDelta::zero(), TimeDelta::minutes(5), TimeDelta::minutes(5)]
    );
    let segments: Vec<_> = multipart.parts.iter().map(|p| p.uids.clone()).collect();
    assert_eq!(
        segments,
        vec![vec![uid("polar:1")], vec![uid("polar:2")], vec![uid("polar:3")]]
    );

    assert!(multipart.is_multipart());
    assert_eq!(multipart.activity_type, Some(ActivityType::Multisport));
    assert_eq!(multipart.name.as_deref(), Some("Swim"));
    assert_eq!(multipart.tags, vec!["race", "triathlon"]);
    assert_eq!(multipart.starttime, Some(t));
    assert_eq!(multipart.endtime, Some(t + TimeDelta::minutes(165)));
    assert_eq!(multipart.distance, Some(51500.0));
    assert_eq!(multipart.uid, None);
}

#[test]
fn test_group_segment_refers_to_its_members() {
    let mut group = recorded("group:220222080000", "Swim", at(8, 0, 0), 30);
    group.metadata.members = [uid("polar:1"), uid("strava:9")].into_iter().collect();
    let run = recorded("polar:3", "Run", at(8, 35, 0), 30);

    let multipart = Reconciler::default().multipart_of(&[&group, &run]).unwrap();
    assert_eq!(multipart.parts[0].uids, vec![uid("polar:1"), uid("strava:9")]);
    assert_eq!(multipart.parts[1].uids, vec![uid("polar:3")]);
}
