mod common;

use axum::http::StatusCode;
use chrono::Days;
use common::{TestApp, get, post_json, seeded_app};
use eraport::testing::{PeriodFixture, attendance, class, date, student};
use eraport_models::attendance::AttendanceStatus;
use eraport_models::ids::{ClassId, StudentId};
use eraport_models::students::Student;
use serde_json::{Value, json};

/// A class of 25 students with daily check-ins on 100 consecutive days:
/// 2500 rows, more than two store pages.
async fn large_class(app: &TestApp, fixture: &PeriodFixture) -> (ClassId, Vec<Student>) {
    let xii = class("XII IPS 2");
    app.store.add_class(xii.clone()).await;

    let students: Vec<Student> = (0..25)
        .map(|i| student(xii.id, &format!("Siswa {:02}", i)))
        .collect();
    for s in &students {
        app.store.add_student(s.clone()).await;
    }

    let start = fixture.odd.start_date;
    let rows = (0..100u64).flat_map(|offset| {
        let day = start.checked_add_days(Days::new(offset)).unwrap();
        let period_id = fixture.odd.id;
        let class_id = xii.id;
        students.iter().map(move |s| {
            let status = if offset % 10 == 0 {
                AttendanceStatus::Sick
            } else {
                AttendanceStatus::Present
            };
            attendance(s.id, class_id, period_id, day, None, status)
        })
    });
    app.store.add_attendance_batch(rows.collect::<Vec<_>>()).await;

    (xii.id, students)
}

fn summary_for<'a>(report: &'a Value, student_id: StudentId) -> &'a Value {
    report["students"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["student_id"] == student_id.to_string())
        .unwrap()
}

#[tokio::test]
async fn test_summary_reads_past_the_store_row_limit() {
    let (app, fixture) = seeded_app().await;
    let (class_id, students) = large_class(&app, &fixture).await;

    let uri = format!(
        "/api/attendance/summary?period_id={}&class_id={}",
        fixture.odd.id, class_id
    );
    let (status, report) = get(&app.router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["complete"], true);
    assert_eq!(report["pages_read"], 3);
    assert_eq!(report["effective_days"], 100);
    assert_eq!(report["students"].as_array().unwrap().len(), 25);

    let first = summary_for(&report, students[0].id);
    assert_eq!(first["present"], 90);
    assert_eq!(first["sick"], 10);
    assert_eq!(first["percentage"], 90);
}

#[tokio::test]
async fn test_failed_page_yields_a_partial_report() {
    let (app, fixture) = seeded_app().await;
    let (class_id, _) = large_class(&app, &fixture).await;
    app.store.fail_page(1).await;

    let uri = format!(
        "/api/attendance/summary?period_id={}&class_id={}",
        fixture.odd.id, class_id
    );
    let (status, report) = get(&app.router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["complete"], false);
    let failures = report["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["scope"]["kind"], "page");
    assert_eq!(failures[0]["scope"]["index"], 1);
    assert_eq!(failures[0]["scope"]["offset"], 1000);
}

#[tokio::test]
async fn test_subject_summary_ignores_daily_rows_and_matches_aliases() {
    let (app, fixture) = seeded_app().await;
    let x = class("X MIPA 1");
    app.store.add_class(x.clone()).await;
    let ayu = student(x.id, "Ayu");
    app.store.add_student(ayu.clone()).await;

    let day = date(2025, 9, 1);
    for (subject, status) in [
        (None, AttendanceStatus::Absent),
        (Some("MTK"), AttendanceStatus::Present),
        (Some("Matematika"), AttendanceStatus::Present),
        (Some("Fisika"), AttendanceStatus::Absent),
    ] {
        app.store
            .add_attendance(attendance(ayu.id, x.id, fixture.odd.id, day, subject, status))
            .await;
    }

    let uri = format!(
        "/api/attendance/summary?period_id={}&class_id={}&subject=mtk",
        fixture.odd.id, x.id
    );
    let (status, report) = get(&app.router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["subject"], "Matematika (Umum)");
    let row = summary_for(&report, ayu.id);
    assert_eq!(row["present"], 2);
    assert_eq!(row["absent"], 0);
}

#[tokio::test]
async fn test_monthly_detail_is_bounded_to_the_month() {
    let (app, fixture) = seeded_app().await;
    let (class_id, students) = large_class(&app, &fixture).await;

    // 14 July + 100 days covers 14 July..21 October; August has 31 of them.
    let uri = format!(
        "/api/attendance/monthly?month=8&year=2025&period_id={}&class_id={}",
        fixture.odd.id, class_id
    );
    let (status, report) = get(&app.router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["effective_days"], 31);
    let first = summary_for(&report, students[0].id);
    assert_eq!(first["daily_status"].as_object().unwrap().len(), 31);
    assert_eq!(first["daily_status"]["2025-08-01"], "present");
}

#[tokio::test]
async fn test_monthly_detail_rejects_invalid_month() {
    let (app, fixture) = seeded_app().await;

    let uri = format!(
        "/api/attendance/monthly?month=13&year=2025&period_id={}&class_id={}",
        fixture.odd.id,
        ClassId::new()
    );
    let (status, _) = get(&app.router, &uri).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_record_attendance_defaults_to_the_school_date() {
    let (app, fixture) = seeded_app().await;
    let x = class("X MIPA 1");
    app.store.add_class(x.clone()).await;
    let ayu = student(x.id, "Ayu");
    app.store.add_student(ayu.clone()).await;

    let (status, record) = post_json(
        &app.router,
        "/api/attendance",
        json!({
            "student_id": ayu.id,
            "class_id": x.id,
            "status": "S"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["date"], "2025-09-15");
    assert_eq!(record["status"], "sick");
    assert_eq!(record["period_id"], fixture.odd.id.to_string());
    assert!(record["subject"].is_null());
}
