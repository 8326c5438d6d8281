use fitcoach_core::db::open_db_in_memory;
use fitcoach_core::stats::api::unit_for_field;
use fitcoach_core::{
    calculate_stats, handle_stats_request, handle_store_stats_request, health,
    transform_workouts_batch, Loader, StatField, StatsRequest,
};
use serde_json::{json, Value};

const ALL_FIELDS: [&str; 5] = [
    "avg_heart_rate",
    "total_distance",
    "total_duration",
    "run_count",
    "avg_pace_min_per_km",
];

fn two_runs() -> Vec<Value> {
    vec![
        json!({ "type": "run", "status": "completed", "date": "2024-01-01", "runDistance": 5, "runHeartRate": 140 }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-02", "runDistance": 3, "runHeartRate": 150 }),
    ]
}

#[test]
fn aggregates_completed_runs_in_range() {
    let runs = two_runs();
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-02", "run_count"), Some(2.0));
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-02", "total_distance"), Some(8.0));
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-02", "avg_heart_rate"), Some(145.0));
}

#[test]
fn empty_filtered_set_is_absent_for_every_field() {
    let outside = two_runs();
    let not_runs = vec![
        json!({ "type": "strength", "status": "completed", "date": "2024-01-01", "runDistance": 5 }),
        json!({ "type": "run", "status": "planned", "date": "2024-01-01", "runDistance": 5 }),
        json!({ "status": "completed", "date": "2024-01-01", "runDistance": 5 }),
    ];

    for field in ALL_FIELDS {
        assert_eq!(calculate_stats(&outside, "2023-01-01", "2023-12-31", field), None);
        assert_eq!(calculate_stats(&not_runs, "2024-01-01", "2024-01-31", field), None);
        assert_eq!(calculate_stats(&[], "2024-01-01", "2024-01-31", field), None);
    }
}

#[test]
fn range_bounds_are_inclusive_and_exclude_outside_dates() {
    let runs = vec![
        json!({ "type": "run", "status": "completed", "date": "2023-12-31", "runDistance": 10 }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-01", "runDistance": 5 }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-07", "runDistance": 3 }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-08", "runDistance": 7 }),
        json!({ "type": "run", "status": "completed", "runDistance": 1 }),
    ];
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-07", "run_count"), Some(2.0));
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-07", "total_distance"), Some(8.0));
}

#[test]
fn date_str_is_used_when_date_is_missing() {
    let runs = vec![json!({ "type": "run", "status": "completed", "dateStr": "2024-01-03", "runDuration": "45 min" })];
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-07", "total_duration"), Some(45.0));
}

#[test]
fn zero_totals_are_absent_not_zero() {
    let runs = vec![
        json!({ "type": "run", "status": "completed", "date": "2024-01-01" }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-02", "runDistance": "n/a", "runDuration": 0 }),
    ];
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-02", "run_count"), Some(2.0));
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-02", "total_distance"), None);
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-02", "total_duration"), None);
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-02", "avg_heart_rate"), None);
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-02", "avg_pace_min_per_km"), None);
}

#[test]
fn totals_are_rounded() {
    let runs = vec![
        json!({ "type": "run", "status": "completed", "date": "2024-01-01", "runDistance": 5.123, "runDuration": 30.26 }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-02", "runDistance": "3.111 km", "runDuration": "20.11" }),
    ];
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-02", "total_distance"), Some(8.23));
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-02", "total_duration"), Some(50.4));
}

#[test]
fn exact_halves_round_half_to_even() {
    let runs = vec![
        json!({ "type": "run", "status": "completed", "date": "2024-01-01", "runHeartRate": 145, "runDuration": 30.25, "runDistance": 0.125 }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-02", "runHeartRate": 145 }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-03", "runHeartRate": 145 }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-04", "runHeartRate": 146 }),
    ];
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-31", "avg_heart_rate"), Some(145.2));
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-31", "total_duration"), Some(30.2));
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-31", "total_distance"), Some(0.12));
}

#[test]
fn average_heart_rate_ignores_non_positive_values() {
    let runs = vec![
        json!({ "type": "run", "status": "completed", "date": "2024-01-01", "runHeartRate": "140-150 bpm" }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-02", "runHeartRate": 0 }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-03", "runHeartRate": -5 }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-04", "runHeartRate": 151 }),
    ];
    assert_eq!(calculate_stats(&runs, "2024-01-01", "2024-01-31", "avg_heart_rate"), Some(145.5));
}

#[test]
fn pace_prefers_computed_ratio_over_text() {
    let runs = vec![
        // 30 min / 5 km = 6.0, the textual pace is ignored
        json!({ "type": "run", "status": "completed", "date": "2024-01-01", "runDistance": 5, "runDuration": 30, "runPace": "4:00" }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-02", "runPace": "5:30" }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-03", "runPace": "5'30\"" }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-04", "runDistance": 5 }),
    ];
    assert_eq!(
        calculate_stats(&runs, "2024-01-01", "2024-01-31", "avg_pace_min_per_km"),
        Some(5.75)
    );
}

#[test]
fn textual_pace_accepts_unit_suffixes() {
    let runs = vec![
        json!({ "type": "run", "status": "completed", "date": "2024-01-01", "runPace": "5:30/km" }),
        json!({ "type": "run", "status": "completed", "date": "2024-01-02", "runPace": "6:00\"" }),
    ];
    assert_eq!(
        calculate_stats(&runs, "2024-01-01", "2024-01-31", "avg_pace_min_per_km"),
        Some(5.75)
    );
}

#[test]
fn unknown_field_is_absent_with_empty_unit() {
    let response = handle_stats_request(&StatsRequest {
        workouts: two_runs(),
        start_date: "2024-01-01".to_string(),
        end_date: "2024-01-02".to_string(),
        field: "max_speed".to_string(),
    });
    assert_eq!(response.value, None);
    assert_eq!(response.unit, "");
    assert_eq!(response.field, "max_speed");
}

#[test]
fn response_echoes_request_and_unit() {
    let response = handle_stats_request(&StatsRequest {
        workouts: two_runs(),
        start_date: "2024-01-01".to_string(),
        end_date: "2024-01-02".to_string(),
        field: "total_distance".to_string(),
    });
    assert_eq!(response.value, Some(8.0));
    assert_eq!(response.unit, "km");
    assert_eq!(response.start_date, "2024-01-01");
    assert_eq!(response.end_date, "2024-01-02");

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["value"], 8.0);
}

#[test]
fn absent_value_serializes_as_null() {
    let response = handle_stats_request(&StatsRequest {
        workouts: Vec::new(),
        start_date: "2024-01-01".to_string(),
        end_date: "2024-01-02".to_string(),
        field: "avg_heart_rate".to_string(),
    });
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["value"], Value::Null);
    assert_eq!(json["unit"], "bpm");
}

#[test]
fn unit_table_covers_every_field() {
    let units: Vec<&str> = ALL_FIELDS.iter().map(|field| unit_for_field(field)).collect();
    assert_eq!(units, vec!["bpm", "km", "min", "runs", "min/km"]);
    assert_eq!(StatField::RunCount.unit(), "runs");
}

#[test]
fn health_reports_ok() {
    let status = health();
    assert_eq!(status.status, "ok");
    assert!(!status.version.is_empty());
}

#[test]
fn stored_workouts_are_projected_back_to_export_units() {
    let exported = vec![
        json!({ "id": "w1", "type": "run", "status": "completed", "date": "2024-01-01", "runDistance": 5, "runDuration": 30, "runHeartRate": 140 }),
        json!({ "id": "w2", "type": "run", "status": "completed", "date": "2024-01-02", "runDistance": 3, "runDuration": 18, "runHeartRate": 150 }),
        json!({ "id": "w3", "type": "run", "status": "completed", "date": "2024-02-01", "runDistance": 10 }),
    ];
    let records = transform_workouts_batch(&exported, "u1");

    let mut conn = open_db_in_memory().unwrap();
    let mut loader = Loader::new(&mut conn);
    loader.ensure_user("u1").unwrap();
    loader.load_workouts(&records).unwrap();

    let stat = |field: &str| {
        handle_store_stats_request(&conn, "u1", "2024-01-01", "2024-01-31", field)
            .unwrap()
            .value
    };
    assert_eq!(stat("run_count"), Some(2.0));
    assert_eq!(stat("total_distance"), Some(8.0));
    assert_eq!(stat("total_duration"), Some(48.0));
    assert_eq!(stat("avg_heart_rate"), Some(145.0));
    assert_eq!(stat("avg_pace_min_per_km"), Some(6.0));

    let other_user = handle_store_stats_request(&conn, "u2", "2024-01-01", "2024-01-31", "run_count")
        .unwrap();
    assert_eq!(other_user.value, None);
    assert_eq!(other_user.unit, "runs");
}
