use chrono::{Days, NaiveDate};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use teammate_radar::config::RadarConfig;
use teammate_radar::radar::build_radar;
use teammate_radar::table::{AST, GameRecord, MIN, PTS, REB, Schema, Table};
use teammate_radar::teammate_impact::{CompareOptions, compare};

/// 30 teams, 15 players each, 82 games; starters rest on a fixed rotation.
fn synthetic_league() -> Table {
    let opening = NaiveDate::from_ymd_opt(2024, 10, 22).expect("valid date");
    let mut records = Vec::new();
    for team in 0..30u32 {
        let city = format!("City {team}");
        let name = format!("Team {team}");
        for game in 0..82u32 {
            let date = opening
                .checked_add_days(Days::new(u64::from(game * 2 + team % 2)))
                .expect("date in range");
            for slot in 0..15u32 {
                let starter = slot < 5;
                if starter && (game + slot) % 7 == 0 {
                    continue;
                }
                let minutes = if starter { 34.0 } else { 8.0 + slot as f64 };
                let bump = f64::from((game * 31 + slot * 17) % 9);
                records.push(
                    GameRecord::new(format!("P{team}-{slot}"))
                        .team(city.clone(), name.clone())
                        .on(date)
                        .stat(MIN, minutes)
                        .stat(PTS, minutes * 0.5 + bump)
                        .stat(REB, 2.0 + bump / 2.0)
                        .stat(AST, 1.0 + bump / 3.0),
                );
            }
        }
    }
    Table::from_records(&Schema::box_score(), records)
}

fn bench_build_radar(c: &mut Criterion) {
    let table = synthetic_league();
    let cfg = RadarConfig::default();
    c.bench_function("build_radar_league", |b| {
        b.iter(|| {
            let rows = build_radar(black_box(&table), &cfg).unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_compare_pair(c: &mut Criterion) {
    let table = synthetic_league();
    let opts = CompareOptions::default();
    c.bench_function("compare_pair", |b| {
        b.iter(|| {
            let out = compare(black_box(&table), "P3-7", "P3-1", &opts).unwrap();
            black_box(out.n_without());
        })
    });
}

criterion_group!(benches, bench_build_radar, bench_compare_pair);
criterion_main!(benches);
