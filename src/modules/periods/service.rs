use chrono::{DateTime, FixedOffset, Utc};
use tracing::{info, instrument, warn};

use eraport_core::{AppError, PeriodError};
use eraport_models::ids::AcademicPeriodId;

use crate::clock::{Clock, school_date};
use crate::metrics::{track_period_activated, track_period_cache};
use crate::modules::periods::cache::PeriodCache;
use crate::modules::periods::model::{
    AcademicPeriod, CreatePeriodDto, NewAcademicPeriod, PeriodContext, PeriodValidation,
};
use crate::store::{AcademicStore, StoreError};

pub struct PeriodService;

impl PeriodService {
    /// Picks the active period out of a full period list.
    ///
    /// More than one active row is a data error; the most recently started one
    /// wins so the system keeps working while it gets fixed.
    fn pick_active(periods: &[AcademicPeriod]) -> Result<AcademicPeriod, PeriodError> {
        let active: Vec<&AcademicPeriod> = periods.iter().filter(|p| p.is_active).collect();
        if active.len() > 1 {
            warn!(
                active_count = active.len(),
                "more than one academic period is active; using the most recently started"
            );
        }
        active
            .into_iter()
            .max_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)))
            .cloned()
            .ok_or(PeriodError::NoActivePeriod)
    }

    fn periods_of_year(periods: &[AcademicPeriod], year: &str) -> Vec<AcademicPeriod> {
        let mut in_year: Vec<AcademicPeriod> =
            periods.iter().filter(|p| p.year == year).cloned().collect();
        in_year.sort_by(|a, b| {
            a.semester
                .cmp(&b.semester)
                .then(a.start_date.cmp(&b.start_date))
        });
        in_year
    }

    /// All periods, ordered by year then semester.
    #[instrument(skip(store))]
    pub async fn list_periods(store: &dyn AcademicStore) -> Result<Vec<AcademicPeriod>, AppError> {
        Ok(store.list_periods().await?)
    }

    /// The single active period. Fails with `NoActivePeriod` when none is set.
    #[instrument(skip(store))]
    pub async fn get_active_period(store: &dyn AcademicStore) -> Result<AcademicPeriod, AppError> {
        let periods = store.list_periods().await?;
        Ok(Self::pick_active(&periods)?)
    }

    /// Every period sharing the active period's academic year, semester ascending.
    #[instrument(skip(store))]
    pub async fn list_periods_in_active_year(
        store: &dyn AcademicStore,
    ) -> Result<Vec<AcademicPeriod>, AppError> {
        let periods = store.list_periods().await?;
        let active = Self::pick_active(&periods)?;
        Ok(Self::periods_of_year(&periods, &active.year))
    }

    /// Resolves the period context, serving it from `cache` when possible.
    #[instrument(skip(store, cache, clock))]
    pub async fn context(
        store: &dyn AcademicStore,
        cache: &PeriodCache,
        clock: &dyn Clock,
    ) -> Result<PeriodContext, AppError> {
        if let Some(context) = cache.get(clock.now()).await {
            track_period_cache(true);
            return Ok(context);
        }
        track_period_cache(false);

        let periods = store.list_periods().await?;
        let active = Self::pick_active(&periods)?;
        let context = PeriodContext {
            year_periods: Self::periods_of_year(&periods, &active.year),
            active,
            resolved_at: clock.now(),
        };
        cache.store(context.clone()).await;
        Ok(context)
    }

    /// Checks whether `period_id` may receive new grade or attendance data.
    ///
    /// Rejections are returned as values; only a missing active period or a
    /// store failure is an error.
    #[instrument(skip(store, cache, clock))]
    pub async fn validate_for_input(
        store: &dyn AcademicStore,
        cache: &PeriodCache,
        clock: &dyn Clock,
        period_id: AcademicPeriodId,
    ) -> Result<PeriodValidation, AppError> {
        let context = Self::context(store, cache, clock).await?;
        if context.in_active_year(period_id) {
            return Ok(PeriodValidation::accepted(period_id));
        }

        // The cached year can predate a semester opened since it was resolved.
        let reason = match store.find_period(period_id).await? {
            None => PeriodError::PeriodNotFound {
                period_id: period_id.into_inner(),
            },
            Some(period) if period.year == context.active.year => {
                return Ok(PeriodValidation::accepted(period_id));
            }
            Some(_) => PeriodError::PeriodNotEditable {
                period_id: period_id.into_inner(),
            },
        };
        Ok(PeriodValidation::rejected(period_id, reason))
    }

    /// Default semester for pickers: the period of the active year whose dates
    /// contain today's school-local date, else the active period.
    pub fn suggest_from(
        context: &PeriodContext,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> AcademicPeriod {
        let today = school_date(now, offset);
        context
            .year_periods
            .iter()
            .find(|p| p.contains_date(today))
            .cloned()
            .unwrap_or_else(|| context.active.clone())
    }

    #[instrument(skip(store, cache, clock))]
    pub async fn suggest_period(
        store: &dyn AcademicStore,
        cache: &PeriodCache,
        clock: &dyn Clock,
        offset: FixedOffset,
    ) -> Result<AcademicPeriod, AppError> {
        let context = Self::context(store, cache, clock).await?;
        Ok(Self::suggest_from(&context, clock.now(), offset))
    }

    /// Opens a new (inactive) semester and drops the cached context.
    #[instrument(skip(store, cache))]
    pub async fn create_period(
        store: &dyn AcademicStore,
        cache: &PeriodCache,
        dto: CreatePeriodDto,
    ) -> Result<AcademicPeriod, AppError> {
        if dto.start_date >= dto.end_date {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Start date must be before end date"
            )));
        }

        // Legacy rows may spell the semester differently, so the unique
        // constraint alone does not catch every clash.
        let existing = store.list_periods().await?;
        if existing
            .iter()
            .any(|p| p.year == dto.year && p.semester == dto.semester)
        {
            return Err(AppError::conflict(anyhow::anyhow!(
                "Semester {} of {} already exists",
                dto.semester,
                dto.year
            )));
        }

        let period = store
            .insert_period(NewAcademicPeriod {
                year: dto.year,
                semester: dto.semester,
                start_date: dto.start_date,
                end_date: dto.end_date,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(message) => AppError::conflict(anyhow::anyhow!(message)),
                other => AppError::from(other),
            })?;

        cache.invalidate().await;
        info!(period_id = %period.id, year = %period.year, semester = %period.semester, "academic period created");
        Ok(period)
    }

    /// Period transition: makes `period_id` the only active period and drops
    /// the cached context.
    #[instrument(skip(store, cache))]
    pub async fn activate_period(
        store: &dyn AcademicStore,
        cache: &PeriodCache,
        period_id: AcademicPeriodId,
    ) -> Result<AcademicPeriod, AppError> {
        let period = store
            .activate_period(period_id)
            .await?
            .ok_or(PeriodError::PeriodNotFound {
                period_id: period_id.into_inner(),
            })?;

        cache.invalidate().await;
        track_period_activated();
        info!(period_id = %period.id, year = %period.year, semester = %period.semester, "academic period activated");

        Ok(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::MemoryStore;
    use crate::testing::{PeriodFixture, date, instant, period};
    use axum::http::StatusCode;
    use eraport_models::periods::Semester;

    fn wib() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    async fn seeded() -> (MemoryStore, PeriodFixture) {
        let store = MemoryStore::new();
        let fixture = PeriodFixture::new();
        fixture.seed(&store).await;
        (store, fixture)
    }

    #[tokio::test]
    async fn test_active_year_lists_both_semesters_in_order() {
        let (store, fixture) = seeded().await;

        let active = PeriodService::get_active_period(&store).await.unwrap();
        assert_eq!(active.id, fixture.odd.id);

        let year = PeriodService::list_periods_in_active_year(&store)
            .await
            .unwrap();
        let semesters: Vec<Semester> = year.iter().map(|p| p.semester).collect();
        assert_eq!(semesters, vec![Semester::Odd, Semester::Even]);
        assert!(year.iter().all(|p| p.year == "2025/2026"));
    }

    #[tokio::test]
    async fn test_no_active_period_is_an_error() {
        let store = MemoryStore::new();
        store
            .add_period(period(
                "2025/2026",
                Semester::Odd,
                date(2025, 7, 14),
                date(2025, 12, 19),
                false,
            ))
            .await;

        let err = PeriodService::get_active_period(&store).await.unwrap_err();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.period_error(), Some(&PeriodError::NoActivePeriod));

        let err = PeriodService::list_periods_in_active_year(&store)
            .await
            .unwrap_err();
        assert_eq!(err.period_error(), Some(&PeriodError::NoActivePeriod));
    }

    #[tokio::test]
    async fn test_two_active_rows_resolve_to_latest_start() {
        let store = MemoryStore::new();
        let older = period(
            "2024/2025",
            Semester::Even,
            date(2025, 1, 6),
            date(2025, 6, 20),
            true,
        );
        let newer = period(
            "2025/2026",
            Semester::Odd,
            date(2025, 7, 14),
            date(2025, 12, 19),
            true,
        );
        store.add_period(older).await;
        store.add_period(newer.clone()).await;

        let active = PeriodService::get_active_period(&store).await.unwrap();
        assert_eq!(active.id, newer.id);
    }

    #[tokio::test]
    async fn test_validate_for_input_outcomes() {
        let (store, fixture) = seeded().await;
        let cache = PeriodCache::new();
        let clock = FixedClock::new(instant(2025, 9, 15, 2));

        let ok = PeriodService::validate_for_input(&store, &cache, &clock, fixture.even.id)
            .await
            .unwrap();
        assert!(ok.valid);
        assert!(ok.reason.is_none());

        let old = PeriodService::validate_for_input(&store, &cache, &clock, fixture.previous_odd.id)
            .await
            .unwrap();
        assert!(!old.valid);
        assert!(matches!(
            old.reason,
            Some(PeriodError::PeriodNotEditable { .. })
        ));

        let missing = AcademicPeriodId::new();
        let unknown = PeriodService::validate_for_input(&store, &cache, &clock, missing)
            .await
            .unwrap();
        assert_eq!(
            unknown.reason,
            Some(PeriodError::PeriodNotFound {
                period_id: missing.into_inner()
            })
        );
    }

    #[tokio::test]
    async fn test_validate_for_input_is_idempotent() {
        let (store, fixture) = seeded().await;
        let cache = PeriodCache::new();
        let clock = FixedClock::new(instant(2025, 9, 15, 2));

        let first = PeriodService::validate_for_input(&store, &cache, &clock, fixture.previous_even.id)
            .await
            .unwrap();
        let second = PeriodService::validate_for_input(&store, &cache, &clock, fixture.previous_even.id)
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(store.list_periods().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_context_is_cached_until_invalidated() {
        let (store, fixture) = seeded().await;
        let cache = PeriodCache::new();
        let clock = FixedClock::new(instant(2025, 9, 15, 2));

        let first = PeriodService::context(&store, &cache, &clock).await.unwrap();
        assert_eq!(first.active.id, fixture.odd.id);

        // Activated behind the resolver's back: the cache still answers.
        store.activate_period(fixture.previous_odd.id).await.unwrap();
        let cached = PeriodService::context(&store, &cache, &clock).await.unwrap();
        assert_eq!(cached.active.id, fixture.odd.id);

        cache.invalidate().await;
        let fresh = PeriodService::context(&store, &cache, &clock).await.unwrap();
        assert_eq!(fresh.active.id, fixture.previous_odd.id);
        assert_eq!(fresh.year_periods.len(), 2);
    }

    #[tokio::test]
    async fn test_activate_period_invalidates_cache() {
        let (store, fixture) = seeded().await;
        let cache = PeriodCache::new();
        let clock = FixedClock::new(instant(2026, 2, 2, 2));

        PeriodService::context(&store, &cache, &clock).await.unwrap();
        let activated = PeriodService::activate_period(&store, &cache, fixture.even.id)
            .await
            .unwrap();
        assert!(activated.is_active);
        assert!(cache.get(clock.now()).await.is_none());

        let active: Vec<_> = store
            .list_periods()
            .await
            .unwrap()
            .into_iter()
            .filter(|p| p.is_active)
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, fixture.even.id);

        let err = PeriodService::activate_period(&store, &cache, AcademicPeriodId::new())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_suggest_period_follows_school_date() {
        let (store, fixture) = seeded().await;
        let cache = PeriodCache::new();

        // 2026-01-04 20:00 UTC is already 2026-01-05 in WIB: semester 2 has started.
        let clock = FixedClock::new(instant(2026, 1, 4, 20));
        let suggested = PeriodService::suggest_period(&store, &cache, &clock, wib())
            .await
            .unwrap();
        assert_eq!(suggested.id, fixture.even.id);

        // School holiday between semesters falls back to the active period.
        clock.set(instant(2025, 12, 28, 3));
        let suggested = PeriodService::suggest_period(&store, &cache, &clock, wib())
            .await
            .unwrap();
        assert_eq!(suggested.id, fixture.odd.id);
    }

    #[tokio::test]
    async fn test_create_period_rules() {
        let (store, _) = seeded().await;
        let cache = PeriodCache::new();

        let created = PeriodService::create_period(
            &store,
            &cache,
            CreatePeriodDto {
                year: "2026/2027".to_string(),
                semester: Semester::Odd,
                start_date: date(2026, 7, 13),
                end_date: date(2026, 12, 18),
            },
        )
        .await
        .unwrap();
        assert!(!created.is_active);

        let err = PeriodService::create_period(
            &store,
            &cache,
            CreatePeriodDto {
                year: "2026/2027".to_string(),
                semester: Semester::Odd,
                start_date: date(2026, 7, 13),
                end_date: date(2026, 12, 18),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err = PeriodService::create_period(
            &store,
            &cache,
            CreatePeriodDto {
                year: "2026/2027".to_string(),
                semester: Semester::Even,
                start_date: date(2027, 6, 1),
                end_date: date(2027, 1, 4),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_semester_opened_mid_year_is_editable_right_away() {
        let store = MemoryStore::new();
        let odd = period(
            "2025/2026",
            Semester::Odd,
            date(2025, 7, 14),
            date(2025, 12, 19),
            true,
        );
        store.add_period(odd).await;
        let cache = PeriodCache::new();
        let clock = FixedClock::new(instant(2025, 9, 15, 2));

        let before = PeriodService::context(&store, &cache, &clock).await.unwrap();
        assert_eq!(before.year_periods.len(), 1);

        let even = PeriodService::create_period(
            &store,
            &cache,
            CreatePeriodDto {
                year: "2025/2026".to_string(),
                semester: Semester::Even,
                start_date: date(2026, 1, 5),
                end_date: date(2026, 6, 19),
            },
        )
        .await
        .unwrap();
        assert!(cache.get(clock.now()).await.is_none());

        let validation = PeriodService::validate_for_input(&store, &cache, &clock, even.id)
            .await
            .unwrap();
        assert!(validation.valid);
        assert!(validation.reason.is_none());
    }

    #[tokio::test]
    async fn test_stale_context_still_accepts_period_of_active_year() {
        let store = MemoryStore::new();
        let odd = period(
            "2025/2026",
            Semester::Odd,
            date(2025, 7, 14),
            date(2025, 12, 19),
            true,
        );
        store.add_period(odd).await;
        let cache = PeriodCache::new();
        let clock = FixedClock::new(instant(2025, 9, 15, 2));
        PeriodService::context(&store, &cache, &clock).await.unwrap();

        // Inserted by another process; this cache never saw it.
        let even = period(
            "2025/2026",
            Semester::Even,
            date(2026, 1, 5),
            date(2026, 6, 19),
            false,
        );
        store.add_period(even.clone()).await;

        let validation = PeriodService::validate_for_input(&store, &cache, &clock, even.id)
            .await
            .unwrap();
        assert!(validation.valid);
    }
}
