use utoipa::OpenApi;

use eraport_core::PeriodError;

use crate::modules::assignments::model::{
    ClassRef, TeacherClassesResponse, TeacherLoadQuery, TeacherSubjectsResponse,
};
use crate::modules::attendance::model::{
    AttendanceKind, AttendanceRecord, AttendanceReport, AttendanceStatus,
    MonthlyAttendanceReport, MonthlyQuery, RecordAttendanceDto, StudentDetail, StudentSummary,
    SummaryQuery,
};
use crate::modules::grades::model::{
    CleanDuplicatesDto, CleanupReport, CompletionQuery, CompletionReport, CompletionStatus,
    FailureScope, FetchFailure, GradeRecord, GradeRecordWithObjectives, ObjectiveDetail,
    ObjectiveInput, SaveGradeDto, SubjectCompletion,
};
use crate::modules::ledger::model::{LedgerQuery, LedgerReport, RankedRow};
use crate::modules::periods::model::{
    AcademicPeriod, CreatePeriodDto, PeriodContext, PeriodValidation,
};
use crate::modules::subjects::model::{NormalizeQuery, NormalizedSubject, SubjectListResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::periods::controller::list_periods,
        crate::modules::periods::controller::create_period,
        crate::modules::periods::controller::get_active_period,
        crate::modules::periods::controller::list_active_year,
        crate::modules::periods::controller::get_suggested_period,
        crate::modules::periods::controller::validate_period,
        crate::modules::periods::controller::activate_period,
        crate::modules::assignments::controller::get_teacher_classes,
        crate::modules::assignments::controller::get_teacher_subjects,
        crate::modules::subjects::controller::normalize_subject,
        crate::modules::subjects::controller::list_subjects,
        crate::modules::grades::controller::get_completion,
        crate::modules::grades::controller::save_grade,
        crate::modules::grades::controller::clean_duplicates,
        crate::modules::attendance::controller::get_summary,
        crate::modules::attendance::controller::get_monthly,
        crate::modules::attendance::controller::record_attendance,
        crate::modules::ledger::controller::get_ledger,
    ),
    components(
        schemas(
            AcademicPeriod,
            CreatePeriodDto,
            PeriodValidation,
            PeriodContext,
            PeriodError,
            ClassRef,
            TeacherLoadQuery,
            TeacherClassesResponse,
            TeacherSubjectsResponse,
            NormalizeQuery,
            NormalizedSubject,
            SubjectListResponse,
            GradeRecord,
            ObjectiveDetail,
            GradeRecordWithObjectives,
            CompletionQuery,
            CompletionStatus,
            SubjectCompletion,
            CompletionReport,
            CleanDuplicatesDto,
            CleanupReport,
            ObjectiveInput,
            SaveGradeDto,
            FailureScope,
            FetchFailure,
            AttendanceStatus,
            AttendanceKind,
            AttendanceRecord,
            SummaryQuery,
            MonthlyQuery,
            StudentSummary,
            StudentDetail,
            AttendanceReport,
            MonthlyAttendanceReport,
            RecordAttendanceDto,
            LedgerQuery,
            RankedRow,
            LedgerReport,
        )
    ),
    tags(
        (name = "Periods", description = "Academic year and semester resolution"),
        (name = "Teachers", description = "Classes and subjects assigned to a teacher"),
        (name = "Subjects", description = "Subject name normalization and curriculum order"),
        (name = "Grades", description = "Grade entry, completion status and duplicate cleanup"),
        (name = "Attendance", description = "Check-ins, semester summaries and monthly detail"),
        (name = "Ledger", description = "Ranked grade ledger")
    ),
    info(
        title = "E-Raport API",
        version = "0.1.0",
        description = "Academic period resolution and scoped aggregation for school report cards.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;
