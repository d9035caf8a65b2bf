//! `rollcall`: command line access to the attendance store.
//!
//! ```bash
//! # Apply pending migrations
//! rollcall migrate
//!
//! # Mark everyone in a class present on a day, except one late student
//! rollcall mark --class <uuid> --date 2024-03-01 --status <student-uuid>=late
//! ```

use std::collections::HashMap;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use rollcall_attendance::usecase::roll_call::{
    GetDailyTallyUseCase, RecordRollCallUseCase, RollCallInput,
};
use rollcall_attendance::usecase::summary::{StudentAttendanceSummaryUseCase, SummaryQuery};
use rollcall_attendance::{AttendanceDb, StoreConfig};
use rollcall_core::config::Config;
use rollcall_core::tracing::init_tracing;
use rollcall_domain::id::{ClassId, StudentId, UserId};
use rollcall_domain::status::AttendanceStatus;
use rollcall_migration::Migrator;

#[derive(Parser)]
#[command(about = "Record and report class attendance")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply every pending schema migration
    Migrate,
    /// Record one day of attendance for a class
    Mark {
        #[arg(long)]
        class: ClassId,
        /// Day in YYYY-MM-DD form
        #[arg(long)]
        date: NaiveDate,
        /// Status for enrolled students without an explicit entry
        #[arg(long, default_value = "present", value_parser = parse_status)]
        default: AttendanceStatus,
        /// Explicit status as <student-id>=<status>, repeatable
        #[arg(long = "status", value_parser = parse_entry)]
        statuses: Vec<(StudentId, AttendanceStatus)>,
    },
    /// Print a student's attendance grouped by status
    Summary {
        #[arg(long)]
        student: StudentId,
        #[arg(long)]
        class: Option<ClassId>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Print a teacher's tally for one day
    Tally {
        #[arg(long)]
        teacher: UserId,
        #[arg(long)]
        date: NaiveDate,
    },
}

fn parse_status(s: &str) -> Result<AttendanceStatus, String> {
    s.to_ascii_uppercase().parse().map_err(|e| format!("{e}"))
}

fn parse_entry(s: &str) -> Result<(StudentId, AttendanceStatus), String> {
    let (id, status) = s
        .split_once('=')
        .ok_or_else(|| format!("expected <student-id>=<status>, got `{s}`"))?;
    let id = id.trim().parse().map_err(|e| format!("{e}"))?;
    Ok((id, parse_status(status.trim())?))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = StoreConfig::from_env().context("load configuration")?;
    init_tracing(config.log_format);

    let db = AttendanceDb::connect(&config)
        .await
        .context("connect to database")?;

    match args.command {
        Command::Migrate => {
            Migrator::up(db.connection(), None)
                .await
                .context("apply migrations")?;
            info!("migrations applied");
        }
        Command::Mark {
            class,
            date,
            default,
            statuses,
        } => {
            let input = RollCallInput {
                class_id: class,
                date,
                statuses: statuses.into_iter().collect::<HashMap<_, _>>(),
                default_status: default,
            };
            let roll_call = RecordRollCallUseCase { db: db.clone() }
                .execute(input)
                .await
                .context("record roll call")?;
            println!("{}", serde_json::to_string_pretty(&roll_call.tally)?);
        }
        Command::Summary {
            student,
            class,
            from,
            to,
        } => {
            let summary = StudentAttendanceSummaryUseCase { db: db.clone() }
                .execute(
                    student,
                    SummaryQuery {
                        class_id: class,
                        from,
                        to,
                    },
                )
                .await
                .context("load summary")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Tally { teacher, date } => {
            let tally = GetDailyTallyUseCase { db: db.clone() }
                .execute(teacher, date)
                .await
                .context("load tally")?;
            match tally {
                Some(tally) => println!("{}", serde_json::to_string_pretty(&tally)?),
                None => println!("no tally recorded for {date}"),
            }
        }
    }

    db.close().await.context("close database")?;
    Ok(())
}
