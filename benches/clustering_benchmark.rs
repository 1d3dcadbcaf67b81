// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use activity_reconcile::models::{Activity, Uid};
use activity_reconcile::services::{cluster_by_starttime, GroupOptions, Reconciler};
use chrono::{TimeDelta, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// A year of activities, each recorded by two services a few seconds apart.
fn imported_activities(days: i64) -> Vec<Activity> {
    let t0 = Utc
        .with_ymd_and_hms(2022, 1, 1, 7, 0, 0)
        .single()
        .expect("valid start");
    let mut activities = Vec::new();
    for day in 0..days {
        let start = t0 + TimeDelta::days(day);
        for (offset, classifier) in [(0, "polar"), (12, "strava")] {
            activities.push(Activity {
                uid: Some(Uid::activity(classifier, day).expect("valid uid")),
                name: Some(format!("Run {}", day)),
                starttime: Some(start + TimeDelta::seconds(offset)),
                duration: Some(TimeDelta::minutes(45)),
                distance: Some(10000.0),
                heartrate: Some(140 + (day % 20) as u32),
                ..Default::default()
            });
        }
    }
    activities
}

fn benchmark_clustering(c: &mut Criterion) {
    let activities = imported_activities(365);
    let threshold = TimeDelta::seconds(180);
    let reconciler = Reconciler::default();

    let mut group = c.benchmark_group("reconcile");

    group.bench_function("cluster_by_starttime", |b| {
        b.iter(|| cluster_by_starttime(black_box(&activities), threshold))
    });

    group.bench_function("cluster_and_group_of", |b| {
        b.iter(|| {
            cluster_by_starttime(black_box(&activities), threshold)
                .iter()
                .map(|cluster| reconciler.group_of(cluster.members(), GroupOptions::default()))
                .collect::<Result<Vec<_>, _>>()
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_clustering);
criterion_main!(benches);
