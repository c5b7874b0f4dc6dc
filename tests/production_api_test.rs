mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{body_json, expect_status, TestApp};
use prodtrack_api::entities::production_plan;
use prodtrack_api::errors::ServiceError;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{json, Value};

fn rate(value: &Value) -> f64 {
    value.as_f64().unwrap_or_else(|| panic!("not a number: {value}"))
}

async fn seed_cut_and_pack_plan(app: &TestApp) {
    app.seed_product("A").await;
    app.seed_process("cut").await;
    app.seed_process("pack").await;
    app.save_plan(json!({
        "product": "A",
        "process1": "cut",
        "qty1": 100,
        "process2": "pack",
        "qty2": 50
    }))
    .await;
}

#[tokio::test]
async fn completion_reflects_recorded_output() {
    let app = TestApp::new().await;
    seed_cut_and_pack_plan(&app).await;

    app.seed_record("A", "cut", "40").await;
    app.seed_record("A", "cut", "30").await;
    app.seed_record("A", "pack", "50").await;
    // other products never count
    app.seed_record("B", "cut", "999").await;

    let response = app.get("/api/v1/completion?product=A").await;
    let report = app.expect_data(response, StatusCode::OK).await;

    assert_eq!(report["product"], "A");
    assert_eq!(report["configured"], true);
    let processes = report["processes"].as_array().unwrap();
    assert_eq!(processes.len(), 2);

    assert_eq!(processes[0]["process"], "cut");
    assert_eq!(processes[0]["planned_qty"], 100);
    assert_eq!(rate(&processes[0]["actual_qty"]), 70.0);
    assert_eq!(rate(&processes[0]["completion_rate"]), 70.0);
    assert_eq!(processes[0]["band"], "on-track");

    assert_eq!(processes[1]["process"], "pack");
    assert_eq!(rate(&processes[1]["actual_qty"]), 50.0);
    assert_eq!(rate(&processes[1]["completion_rate"]), 100.0);
    assert_eq!(processes[1]["band"], "complete");
}

#[tokio::test]
async fn completion_without_plan_is_not_configured() {
    let app = TestApp::new().await;
    app.seed_record("Z", "cut", "10").await;

    let response = app.get("/api/v1/completion?product=Z").await;
    let report = app.expect_data(response, StatusCode::OK).await;

    assert_eq!(report["configured"], false);
    assert_eq!(report["processes"], json!([]));
}

#[tokio::test]
async fn completion_requires_a_product() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/completion").await;
    expect_status(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn plan_listing_carries_both_completion_forms() {
    let app = TestApp::new().await;
    seed_cut_and_pack_plan(&app).await;
    app.seed_record("A", "cut", "33").await;

    let response = app.get("/api/v1/production-plans").await;
    let plans = app.expect_data(response, StatusCode::OK).await;
    let plan = &plans.as_array().unwrap()[0];

    assert_eq!(plan["product"], "A");
    assert_eq!(plan["process1"], "cut");
    assert_eq!(plan["process3"], "");
    assert_eq!(plan["qty3"], 0);
    assert_eq!(plan["slots"].as_array().unwrap().len(), 2);

    let completion = plan["completion"].as_array().unwrap();
    assert_eq!(rate(&completion[0]["completion_rate"]), 33.0);
    assert_eq!(completion[0]["band"], "behind");
    assert_eq!(rate(&completion[1]["progress_width"]), 0.0);

    let map = &plan["process_completion"];
    assert_eq!(rate(&map["cut"]["actual_qty"]), 33.0);
    assert_eq!(rate(&map["pack"]["completion_rate"]), 0.0);
}

#[tokio::test]
async fn zero_quantity_slot_reports_zero_rate() {
    let app = TestApp::new().await;
    app.save_plan(json!({
        "product": "A",
        "process1": "cut",
        "qty1": 0
    }))
    .await;
    app.seed_record("A", "cut", "25").await;

    let response = app.get("/api/v1/completion?product=A").await;
    let report = app.expect_data(response, StatusCode::OK).await;
    let cut = &report["processes"][0];

    assert_eq!(rate(&cut["actual_qty"]), 25.0);
    assert_eq!(rate(&cut["completion_rate"]), 0.0);
}

#[tokio::test]
async fn saving_a_plan_twice_replaces_it() {
    let app = TestApp::new().await;
    let first = app
        .save_plan(json!({ "product": "A", "process1": "cut", "qty1": 10 }))
        .await;
    let second = app
        .save_plan(json!({ "product": "A", "process1": "pack", "qty1": 20 }))
        .await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["process1"], "pack");

    let response = app.get("/api/v1/production-plans").await;
    let plans = app.expect_data(response, StatusCode::OK).await;
    assert_eq!(plans.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_plan_insert_maps_to_conflict() {
    let app = TestApp::new().await;
    seed_cut_and_pack_plan(&app).await;

    // a second writer that passed the existence check before the first committed
    let now = Utc::now();
    let racing = production_plan::ActiveModel {
        product: Set("A".to_string()),
        process1: Set(Some("cut".to_string())),
        qty1: Set(10),
        process2: Set(None),
        qty2: Set(0),
        process3: Set(None),
        qty3: Set(0),
        process4: Set(None),
        qty4: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let err = racing
        .insert(&*app.state.db)
        .await
        .map_err(|e| ServiceError::from_write(e, || "plan for 'A' exists".to_string()))
        .unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn plan_validation_rejects_bad_slots() {
    let app = TestApp::new().await;

    let duplicate = app
        .post(
            "/api/v1/production-plans",
            json!({ "product": "A", "process1": "cut", "qty1": 1, "process2": "cut", "qty2": 2 }),
        )
        .await;
    expect_status(duplicate, StatusCode::BAD_REQUEST).await;

    let negative = app
        .post(
            "/api/v1/production-plans",
            json!({ "product": "A", "process1": "cut", "qty1": -5 }),
        )
        .await;
    expect_status(negative, StatusCode::BAD_REQUEST).await;

    let orphan_qty = app
        .post(
            "/api/v1/production-plans",
            json!({ "product": "A", "process1": "", "qty1": 5 }),
        )
        .await;
    expect_status(orphan_qty, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn deleting_a_plan() {
    let app = TestApp::new().await;
    let plan = app
        .save_plan(json!({ "product": "A", "process1": "cut", "qty1": 10 }))
        .await;
    let id = plan["id"].as_i64().unwrap();

    let response = app.delete(&format!("/api/v1/production-plans/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let again = app.delete(&format!("/api/v1/production-plans/{id}")).await;
    expect_status(again, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn record_creation_fills_derived_columns() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/api/v1/records",
            json!({
                "date": "2024-06-03",
                "name": "Ann",
                "product": "A",
                "process": "cut",
                "adjustment_time": "30",
                "downtime_duration": "45",
                "single_time": "20",
                "total_weight": "105.5",
                "tare_weight": "5.5",
                "unit_weight": "0.1",
                "theoretical_runtime": "9999"
            }),
        )
        .await;
    let record = app.expect_data(response, StatusCode::CREATED).await;

    assert_eq!(record["theoretical_runtime"], "450");
    assert_eq!(record["actual_runtime"], "405");
    assert_eq!(record["theoretical_qty"], "1215");
    assert_eq!(record["actual_qty"], "1000");
    assert_eq!(record["capacity_rate"], "82.30%");
    assert_eq!(record["time_rate"], "90.00%");
}

#[tokio::test]
async fn shift_length_comes_from_configuration() {
    let app = TestApp::with_config(|cfg| cfg.standard_shift_minutes = 600).await;
    let record = app.seed_record("A", "cut", "5").await;
    assert_eq!(record["theoretical_runtime"], "600");
}

#[tokio::test]
async fn negative_derived_quantity_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .post(
            "/api/v1/records",
            json!({
                "date": "2024-06-03",
                "name": "Ann",
                "product": "A",
                "process": "cut",
                "total_weight": "5",
                "tare_weight": "10",
                "unit_weight": "1"
            }),
        )
        .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert!(body["message"].as_str().unwrap().contains("negative"));
}

#[tokio::test]
async fn typed_quantities_must_be_whole_and_non_negative() {
    let app = TestApp::new().await;
    let entry = |actual_qty: &str| {
        json!({
            "date": "2024-06-03",
            "name": "Ann",
            "product": "A",
            "process": "cut",
            "actual_qty": actual_qty
        })
    };

    let response = app.post("/api/v1/records", entry("-3")).await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("must not be negative (got -3)"));
    assert!(!message.contains("tare"));

    let response = app.post("/api/v1/records", entry("12.5")).await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert!(body["message"].as_str().unwrap().contains("whole number"));

    // unparseable text is kept and counts as zero
    let response = app.post("/api/v1/records", entry("n/a")).await;
    let record = app.expect_data(response, StatusCode::CREATED).await;
    assert_eq!(record["actual_qty"], "n/a");
}

#[tokio::test]
async fn adjustment_master_must_hold_the_position() {
    let app = TestApp::new().await;
    app.seed_employee("Bo", "operator").await;
    app.seed_employee("Cy", "Adjustment Master").await;

    for (master, status) in [
        ("Nobody", StatusCode::BAD_REQUEST),
        ("Bo", StatusCode::BAD_REQUEST),
        ("Cy", StatusCode::CREATED),
    ] {
        let response = app
            .post(
                "/api/v1/records",
                json!({
                    "date": "2024-06-03",
                    "name": "Ann",
                    "product": "A",
                    "process": "cut",
                    "adjustment_master": master
                }),
            )
            .await;
        expect_status(response, status).await;
    }
}

#[tokio::test]
async fn missing_required_fields_are_rejected() {
    let app = TestApp::new().await;
    let response = app
        .post(
            "/api/v1/records",
            json!({ "date": "2024-06-03", "name": "Ann", "product": "A", "process": "  " }),
        )
        .await;
    expect_status(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn record_update_recomputes_derived_columns() {
    let app = TestApp::new().await;
    let record = app.seed_record("A", "cut", "40").await;
    let id = record["id"].as_i64().unwrap();
    assert_eq!(record["time_rate"], "100.00%");

    let response = app
        .put(
            &format!("/api/v1/records/{id}"),
            json!({ "downtime_duration": "48" }),
        )
        .await;
    let updated = app.expect_data(response, StatusCode::OK).await;

    assert_eq!(updated["actual_runtime"], "432");
    assert_eq!(updated["time_rate"], "90.00%");
    assert_eq!(updated["actual_qty"], "40");
    assert_eq!(updated["process"], "cut");

    let missing = app
        .put("/api/v1/records/9999", json!({ "downtime_duration": "1" }))
        .await;
    expect_status(missing, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn moving_a_record_changes_only_its_process() {
    let app = TestApp::new().await;
    let record = app.seed_record("A", "cut", "40").await;
    let id = record["id"].as_i64().unwrap();

    let response = app
        .put(
            &format!("/api/v1/records/{id}/process"),
            json!({ "process": "pack" }),
        )
        .await;
    let moved = app.expect_data(response, StatusCode::OK).await;

    assert_eq!(moved["process"], "pack");
    assert_eq!(moved["actual_qty"], record["actual_qty"]);
    assert_eq!(moved["time_rate"], record["time_rate"]);
}

#[tokio::test]
async fn record_filters_are_conjunctive() {
    let app = TestApp::new().await;
    for (date, product, process) in [
        ("2024-06-01", "A", "cut"),
        ("2024-06-02", "A", "pack"),
        ("2024-06-03", "B", "cut"),
        ("2024-06-04", "A", "cut"),
    ] {
        let response = app
            .post(
                "/api/v1/records",
                json!({ "date": date, "name": "Ann", "product": product, "process": process }),
            )
            .await;
        expect_status(response, StatusCode::CREATED).await;
    }

    let response = app
        .get("/api/v1/records?product=A&process=cut&start_date=2024-06-01&end_date=2024-06-04")
        .await;
    let records = app.expect_data(response, StatusCode::OK).await;
    let dates: Vec<&str> = records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-06-04", "2024-06-01"]);

    let response = app.get("/api/v1/records?end_date=2024-06-02").await;
    let records = app.expect_data(response, StatusCode::OK).await;
    assert_eq!(records.as_array().unwrap().len(), 2);

    let response = app.get("/api/v1/records?name=&product=").await;
    let records = app.expect_data(response, StatusCode::OK).await;
    assert_eq!(records.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn comments_round_trip_and_clear() {
    let app = TestApp::new().await;
    let record = app.seed_record("A", "cut", "40").await;
    let id = record["id"].as_i64().unwrap();
    let uri = format!("/api/v1/records/{id}/comments/downtime_duration");

    let empty = app.expect_data(app.get(&uri).await, StatusCode::OK).await;
    assert_eq!(empty["comment"], "");

    let saved = app
        .expect_data(
            app.put(&uri, json!({ "comment": "  belt jam  " })).await,
            StatusCode::OK,
        )
        .await;
    assert_eq!(saved["comment"], "belt jam");

    let read = app.expect_data(app.get(&uri).await, StatusCode::OK).await;
    assert_eq!(read["comment"], "belt jam");

    app.expect_data(app.put(&uri, json!({ "comment": "" })).await, StatusCode::OK)
        .await;
    let cleared = app.expect_data(app.get(&uri).await, StatusCode::OK).await;
    assert_eq!(cleared["comment"], "");
}

#[tokio::test]
async fn comments_are_reachable_by_record_id() {
    let app = TestApp::new().await;
    let record = app.seed_record("A", "cut", "40").await;
    let id = record["id"].as_i64().unwrap();

    let saved = app
        .expect_data(
            app.post(
                &format!("/api/v1/comments/{id}/adjustment_time"),
                json!({ "comment": "die change" }),
            )
            .await,
            StatusCode::OK,
        )
        .await;
    assert_eq!(saved["comment"], "die change");

    let read = app
        .expect_data(
            app.get(&format!("/api/v1/records/{id}/comments/adjustment_time"))
                .await,
            StatusCode::OK,
        )
        .await;
    assert_eq!(read["comment"], "die change");
}

#[tokio::test]
async fn comments_are_limited_to_known_columns_and_records() {
    let app = TestApp::new().await;
    let record = app.seed_record("A", "cut", "40").await;
    let id = record["id"].as_i64().unwrap();

    let bad_column = app
        .get(&format!("/api/v1/records/{id}/comments/actual_qty"))
        .await;
    expect_status(bad_column, StatusCode::BAD_REQUEST).await;

    let missing = app
        .put(
            "/api/v1/records/9999/comments/adjustment_time",
            json!({ "comment": "x" }),
        )
        .await;
    expect_status(missing, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn deleting_a_record_removes_its_comments() {
    let app = TestApp::new().await;
    let record = app.seed_record("A", "cut", "40").await;
    let id = record["id"].as_i64().unwrap();
    app.put(
        &format!("/api/v1/records/{id}/comments/adjustment_time"),
        json!({ "comment": "new die" }),
    )
    .await;

    let response = app.delete(&format!("/api/v1/records/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let gone = app.get(&format!("/api/v1/records/{id}")).await;
    expect_status(gone, StatusCode::NOT_FOUND).await;

    let comment = app
        .get(&format!("/api/v1/records/{id}/comments/adjustment_time"))
        .await;
    expect_status(comment, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn reference_data_is_unique_and_sorted() {
    let app = TestApp::new().await;
    app.seed_process("pack").await;
    app.seed_process("cut").await;

    let duplicate = app
        .post("/api/v1/processes", json!({ "name": " cut " }))
        .await;
    expect_status(duplicate, StatusCode::CONFLICT).await;

    let response = app.get("/api/v1/processes").await;
    let processes = app.expect_data(response, StatusCode::OK).await;
    let names: Vec<&str> = processes
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["cut", "pack"]);
}

#[tokio::test]
async fn referenced_reference_data_cannot_be_deleted() {
    let app = TestApp::new().await;
    let product = app.seed_product("A").await;
    let process = app.seed_process("cut").await;
    let unused = app.seed_process("polish").await;
    let employee = app.seed_employee("Cy", "adjustment master").await;
    app.save_plan(json!({ "product": "A", "process1": "cut", "qty1": 10 }))
        .await;
    app.post(
        "/api/v1/records",
        json!({
            "date": "2024-06-03",
            "name": "Ann",
            "product": "A",
            "process": "glue",
            "adjustment_master": "Cy"
        }),
    )
    .await;

    let process_id = process["id"].as_i64().unwrap();
    let response = app.delete(&format!("/api/v1/processes/{process_id}")).await;
    expect_status(response, StatusCode::CONFLICT).await;

    let product_id = product["id"].as_i64().unwrap();
    let response = app.delete(&format!("/api/v1/products/{product_id}")).await;
    expect_status(response, StatusCode::CONFLICT).await;

    let employee_id = employee["id"].as_i64().unwrap();
    let response = app.delete(&format!("/api/v1/employees/{employee_id}")).await;
    expect_status(response, StatusCode::CONFLICT).await;

    let unused_id = unused["id"].as_i64().unwrap();
    let response = app.delete(&format!("/api/v1/processes/{unused_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.delete("/api/v1/employees/9999").await;
    expect_status(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn statistics_follow_record_filters() {
    let app = TestApp::new().await;
    for (product, qty, single_time) in [("A", "100", "60"), ("A", "200", "60"), ("B", "7", "")] {
        let response = app
            .post(
                "/api/v1/records",
                json!({
                    "date": "2024-06-03",
                    "name": "Ann",
                    "product": product,
                    "process": "cut",
                    "actual_qty": qty,
                    "single_time": single_time
                }),
            )
            .await;
        expect_status(response, StatusCode::CREATED).await;
    }

    let response = app.get("/api/v1/statistics?product=A").await;
    let stats = app.expect_data(response, StatusCode::OK).await;

    assert_eq!(stats["total_records"], 2);
    assert_eq!(rate(&stats["total_actual_qty"]), 300.0);
    // 480 pieces theoretical: 20.83% and 41.67%
    assert_eq!(rate(&stats["avg_capacity_rate"]), 31.25);
    assert_eq!(rate(&stats["avg_time_rate"]), 100.0);
}

#[tokio::test]
async fn health_and_status_endpoints_respond() {
    let app = TestApp::new().await;

    let live = app.get("/health").await;
    let body = expect_status(live, StatusCode::OK).await;
    assert_eq!(body["status"], "up");

    let ready = app.get("/health/ready").await;
    let body = expect_status(ready, StatusCode::OK).await;
    assert_eq!(body["ready"], true);

    let status = app.get("/api/v1/status").await;
    let data = app.expect_data(status, StatusCode::OK).await;
    assert_eq!(data["status"], "ok");
}

#[tokio::test]
async fn request_ids_are_echoed_into_error_bodies() {
    let app = TestApp::new().await;

    let response = app
        .request_with_headers(
            axum::http::Method::GET,
            "/api/v1/records/4242",
            None,
            &[("x-request-id", "shift-b-17")],
        )
        .await;

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "shift-b-17"
    );
    let body = expect_status(response, StatusCode::NOT_FOUND).await;
    assert_eq!(body["request_id"], "shift-b-17");

    let ok = app.get("/api/v1/status").await;
    assert!(ok.headers().contains_key("x-request-id"));
    let json = body_json(ok).await;
    assert!(json["meta"]["request_id"].is_string());
}
