use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Select};
use dotenvy::dotenv;
use eraport::modules::grades::GradeService;
use eraport::modules::periods::{PeriodCache, PeriodService};
use eraport::store::PgStore;
use eraport_cli::seeder::{self, ClassRoster, SeedConfig};
use eraport_core::AppError;
use eraport_models::ids::{AcademicPeriodId, ClassId};
use eraport_models::periods::AcademicPeriod;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "eraport-cli")]
#[command(about = "E-Raport CLI - Administrative tools for the e-raport engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List academic periods, marking the active one
    Periods,
    /// Make a period the single active period (semester or year transition)
    ActivatePeriod {
        /// Period to activate (prompted from the list if omitted)
        #[arg(short = 'p', long)]
        period_id: Option<Uuid>,
    },
    /// Remove duplicate grade records of a class, keeping the latest per subject
    CleanDuplicates {
        /// Class to clean
        #[arg(short = 'c', long)]
        class_id: Uuid,

        /// Period to clean (defaults to the active period)
        #[arg(short = 'p', long)]
        period_id: Option<Uuid>,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Seed classes, students, assignments, grades and attendance into the active period
    Seed {
        /// Number of classes to create
        #[arg(short = 'c', long, default_value = "6")]
        classes: usize,

        /// Number of students per class
        #[arg(long, default_value = "32")]
        students: usize,

        /// Number of subjects per class
        #[arg(long, default_value = "8")]
        subjects: usize,

        /// Number of teachers sharing the subjects
        #[arg(long, default_value = "6")]
        teachers: usize,

        /// School days of daily attendance
        #[arg(long, default_value = "40")]
        days: usize,
    },
    /// Clear all seeded data (keeps academic periods)
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let pool = eraport_db::init_db_pool().await;
    let store = PgStore::new(pool.clone());

    let cli = Cli::parse();

    match cli.command {
        Commands::Periods => handle_periods(&store).await,
        Commands::ActivatePeriod { period_id } => handle_activate_period(&store, period_id).await,
        Commands::CleanDuplicates {
            class_id,
            period_id,
            yes,
        } => handle_clean_duplicates(&store, class_id, period_id, yes).await,
        Commands::Seed {
            classes,
            students,
            subjects,
            teachers,
            days,
        } => handle_seed(&store, classes, students, subjects, teachers, days).await,
        Commands::ClearSeed => handle_clear_seed(&store).await,
    }
}

fn fail(context: &str, e: AppError) -> ! {
    eprintln!("\n❌ {}: {}", context, e.error);
    std::process::exit(1);
}

fn describe(period: &AcademicPeriod) -> String {
    format!(
        "{} semester {} ({} - {}){}",
        period.year,
        period.semester,
        period.start_date,
        period.end_date,
        if period.is_active { " [active]" } else { "" }
    )
}

async fn load_periods(store: &PgStore) -> Vec<AcademicPeriod> {
    PeriodService::list_periods(store)
        .await
        .unwrap_or_else(|e| fail("Error loading periods", e))
}

async fn handle_periods(store: &PgStore) {
    let periods = load_periods(store).await;
    if periods.is_empty() {
        println!("No academic periods found.");
        return;
    }

    for period in &periods {
        println!("{}  {}", period.id, describe(period));
    }
}

async fn handle_activate_period(store: &PgStore, period_id: Option<Uuid>) {
    let period_id = match period_id {
        Some(id) => AcademicPeriodId::from(id),
        None => {
            let periods = load_periods(store).await;
            if periods.is_empty() {
                eprintln!("❌ No academic periods found. Create one through the API first.");
                std::process::exit(1);
            }
            let labels: Vec<String> = periods.iter().map(describe).collect();
            let default = periods.iter().position(|p| p.is_active).unwrap_or(0);
            let choice = Select::new()
                .with_prompt("Period to activate")
                .items(&labels)
                .default(default)
                .interact()
                .expect("Failed to read selection");
            periods[choice].id
        }
    };

    // A fresh cache: running servers pick the change up when their cached
    // context expires.
    let cache = PeriodCache::new();
    match PeriodService::activate_period(store, &cache, period_id).await {
        Ok(period) => {
            println!("\n✅ Active period is now {}", describe(&period));
        }
        Err(e) => fail("Error activating period", e),
    }
}

async fn handle_clean_duplicates(
    store: &PgStore,
    class_id: Uuid,
    period_id: Option<Uuid>,
    yes: bool,
) {
    let period_id = match period_id {
        Some(id) => AcademicPeriodId::from(id),
        None => {
            PeriodService::get_active_period(store)
                .await
                .unwrap_or_else(|e| fail("Error resolving the active period", e))
                .id
        }
    };

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete duplicate grade records of class {} in period {}?",
                class_id, period_id
            ))
            .default(false)
            .interact()
            .expect("Failed to read confirmation");
        if !confirmed {
            println!("Aborted.");
            return;
        }
    }

    match GradeService::clean_duplicates(store, ClassId::from(class_id), period_id).await {
        Ok(report) if report.removed_records == 0 => {
            println!("✅ No duplicate grade records found");
        }
        Ok(report) => {
            println!(
                "✅ Removed {} records across {} student/subject pairs",
                report.removed_records, report.affected_pairs
            );
        }
        Err(e) => fail("Error cleaning duplicates", e),
    }
}

async fn handle_seed(
    store: &PgStore,
    classes: usize,
    students: usize,
    subjects: usize,
    teachers: usize,
    days: usize,
) {
    let period = PeriodService::get_active_period(store)
        .await
        .unwrap_or_else(|e| fail("Seeding needs an active period", e));

    let config = SeedConfig::new(classes)
        .with_roster(ClassRoster { students, subjects })
        .with_teachers(teachers)
        .with_attendance_days(days);

    if let Err(e) = seeder::seed_all(store.pool(), &period, config).await {
        eprintln!("\n❌ Error seeding database: {}", e);
        std::process::exit(1);
    }
}

async fn handle_clear_seed(store: &PgStore) {
    if let Err(e) = seeder::clear_all(store.pool()).await {
        eprintln!("\n❌ Error clearing seeded data: {}", e);
        std::process::exit(1);
    }
}
