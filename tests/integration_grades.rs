mod common;

use axum::http::StatusCode;
use common::{TestApp, get, post_json, seeded_app};
use eraport::testing::{PeriodFixture, class, grade, student};
use eraport_models::ids::{ClassId, StudentId, TeacherId};
use serde_json::{Value, json};

struct ClassSetup {
    class_id: ClassId,
    teacher_id: TeacherId,
    students: Vec<StudentId>,
}

/// XI MIPA 1 with three students; "MTK" and "Fisika" assigned to one teacher.
/// Everyone has a mathematics score and Ayu also has a second record under
/// the canonical spelling. Only Ayu has a physics score.
async fn setup(app: &TestApp, fixture: &PeriodFixture) -> ClassSetup {
    let xi = class("XI MIPA 1");
    app.store.add_class(xi.clone()).await;

    let mut students = Vec::new();
    for name in ["Ayu", "Budi", "Citra"] {
        let s = student(xi.id, name);
        students.push(s.id);
        app.store.add_student(s).await;
    }

    let teacher_id = TeacherId::new();
    for subject in ["MTK", "Fisika"] {
        app.store
            .add_assignment(teacher_id, xi.id, subject, fixture.odd.id)
            .await;
    }

    for id in &students {
        app.store
            .add_grade_record(
                grade(*id, xi.id, "MTK", &fixture.odd, Some(80.0), Some("Baik")),
                vec![],
            )
            .await;
    }
    app.store
        .add_grade_record(
            grade(
                students[0],
                xi.id,
                "Matematika (Umum)",
                &fixture.odd,
                Some(85.0),
                Some("Baik"),
            ),
            vec![],
        )
        .await;
    app.store
        .add_grade_record(
            grade(students[0], xi.id, "Fisika", &fixture.odd, Some(90.0), None),
            vec![],
        )
        .await;

    ClassSetup {
        class_id: xi.id,
        teacher_id,
        students,
    }
}

fn row<'a>(report: &'a Value, subject: &str) -> &'a Value {
    report["subjects"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["subject"] == subject)
        .unwrap_or_else(|| panic!("no row for {subject}: {report}"))
}

#[tokio::test]
async fn test_completion_flags_alias_duplicates() {
    let (app, fixture) = seeded_app().await;
    let setup = setup(&app, &fixture).await;

    let uri = format!(
        "/api/grades/completion?class_id={}&period_id={}",
        setup.class_id, fixture.odd.id
    );
    let (status, report) = get(&app.router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total_students"], 3);
    let subjects: Vec<&str> = report["subjects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["subject"].as_str().unwrap())
        .collect();
    assert_eq!(subjects, ["Matematika (Umum)", "Fisika"]);

    let math = row(&report, "Matematika (Umum)");
    assert_eq!(math["scored_count"], 4);
    assert_eq!(math["status"], "duplicate");

    let physics = row(&report, "Fisika");
    assert_eq!(physics["scored_count"], 1);
    assert_eq!(physics["described_count"], 0);
    assert_eq!(physics["status"], "partial");
    assert!(report["failures"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_teacher_completion_reports_failed_subject_and_keeps_the_rest() {
    let (app, fixture) = seeded_app().await;
    let setup = setup(&app, &fixture).await;
    app.store.fail_subject("Fisika").await;

    let uri = format!(
        "/api/grades/completion?class_id={}&period_id={}&teacher_id={}",
        setup.class_id, fixture.odd.id, setup.teacher_id
    );
    let (status, report) = get(&app.router, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["subjects"].as_array().unwrap().len(), 1);
    let failures = report["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["scope"]["kind"], "subject");
    assert_eq!(failures[0]["scope"]["subject"], "Fisika");
}

#[tokio::test]
async fn test_roster_failure_fails_the_request() {
    let (app, fixture) = seeded_app().await;
    let setup = setup(&app, &fixture).await;
    app.store.fail_roster().await;

    let uri = format!(
        "/api/grades/completion?class_id={}&period_id={}",
        setup.class_id, fixture.odd.id
    );
    let (status, _) = get(&app.router, &uri).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_clean_duplicates_requires_confirmation() {
    let (app, fixture) = seeded_app().await;
    let setup = setup(&app, &fixture).await;

    let (status, _) = post_json(
        &app.router,
        "/api/grades/clean-duplicates",
        json!({
            "class_id": setup.class_id,
            "period_id": fixture.odd.id,
            "confirm": false
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.grade_records().await.len(), 5);
}

#[tokio::test]
async fn test_clean_duplicates_resolves_the_duplicate_status() {
    let (app, fixture) = seeded_app().await;
    let setup = setup(&app, &fixture).await;

    let (status, cleanup) = post_json(
        &app.router,
        "/api/grades/clean-duplicates",
        json!({
            "class_id": setup.class_id,
            "period_id": fixture.odd.id,
            "confirm": true
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleanup["affected_pairs"], 1);
    assert_eq!(cleanup["removed_records"], 1);

    let uri = format!(
        "/api/grades/completion?class_id={}&period_id={}",
        setup.class_id, fixture.odd.id
    );
    let (_, report) = get(&app.router, &uri).await;
    let math = row(&report, "Matematika (Umum)");
    assert_eq!(math["scored_count"], 3);
    assert_eq!(math["status"], "complete");
}

#[tokio::test]
async fn test_save_grade_normalizes_subject_and_derives_description() {
    let (app, fixture) = seeded_app().await;
    let setup = setup(&app, &fixture).await;

    let (status, saved) = post_json(
        &app.router,
        "/api/grades",
        json!({
            "student_id": setup.students[1],
            "class_id": setup.class_id,
            "subject": "  kimia ",
            "period_id": fixture.even.id,
            "final_score": 88.5,
            "achievement_description": "draft",
            "objectives": [
                { "objective_id": "00000000-0000-0000-0000-000000000001", "description": "stoikiometri", "achieved": true },
                { "objective_id": "00000000-0000-0000-0000-000000000002", "description": "ikatan kimia", "achieved": false }
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["subject"], "Kimia");
    assert_eq!(saved["semester"], 2);
    assert_eq!(
        saved["achievement_description"],
        "Menunjukkan penguasaan yang baik dalam stoikiometri. Perlu bantuan dalam ikatan kimia."
    );
    assert_eq!(saved["objectives"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_save_grade_rejects_closed_periods() {
    let (app, fixture) = seeded_app().await;
    let setup = setup(&app, &fixture).await;

    let (status, body) = post_json(
        &app.router,
        "/api/grades",
        json!({
            "student_id": setup.students[0],
            "class_id": setup.class_id,
            "subject": "Fisika",
            "period_id": fixture.previous_odd.id,
            "final_score": 70
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"]["kind"], "period_not_editable");
}

#[tokio::test]
async fn test_save_grade_validates_score_range() {
    let (app, fixture) = seeded_app().await;
    let setup = setup(&app, &fixture).await;

    let (status, _) = post_json(
        &app.router,
        "/api/grades",
        json!({
            "student_id": setup.students[0],
            "class_id": setup.class_id,
            "subject": "Fisika",
            "period_id": fixture.odd.id,
            "final_score": 101
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_bad_requests_answer_with_json_errors() {
    let (app, fixture) = seeded_app().await;
    let setup = setup(&app, &fixture).await;

    let (status, body) = post_json(
        &app.router,
        "/api/grades/clean-duplicates",
        json!({ "period_id": fixture.odd.id, "confirm": true }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "class_id is required");
    assert_eq!(app.store.grade_records().await.len(), 5);

    let uri = format!("/api/grades/completion?class_id={}", setup.class_id);
    let (status, body) = get(&app.router, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "period_id is required");
}
