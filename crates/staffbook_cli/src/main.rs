//! Command-line front end for staffbook review records.
//!
//! # Responsibility
//! - Parse commands and connection settings.
//! - Route each command to one `ReviewService` call and print the result.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use staffbook_core::{
    default_log_level, init_logging, open_db, DbOptions, Review, ReviewPatch, ReviewService,
    SharedReview, SqliteReviewRepository,
};
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "staffbook.sqlite3";

#[derive(Parser, Debug)]
#[command(name = "staffbook")]
#[command(version, about = "Manage employee performance reviews", long_about = None)]
struct Cli {
    /// SQLite database file (defaults to the system temp dir)
    #[arg(long, env = "STAFFBOOK_DB_PATH")]
    db: Option<PathBuf>,

    /// Enforce the `employees` foreign key on writes
    #[arg(long)]
    enforce_foreign_keys: bool,

    /// Directory for rolling log files; logging stays off when unset
    #[arg(long, env = "STAFFBOOK_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "STAFFBOOK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the reviews table
    Init,
    /// Drop the reviews table
    Drop,
    /// Record a new review
    Add {
        year: i64,
        summary: String,
        employee_id: i64,
    },
    /// Show one review
    Show { id: i64 },
    /// List reviews
    List {
        /// Only reviews for this employee
        #[arg(long)]
        employee: Option<i64>,
    },
    /// Change fields of an existing review
    Update {
        id: i64,
        #[arg(long)]
        year: Option<i64>,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        employee: Option<i64>,
    },
    /// Delete a review
    Delete { id: i64 },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let log_dir = std::path::absolute(log_dir)
            .with_context(|| format!("cannot resolve log dir `{}`", log_dir.display()))?;
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, &log_dir) {
            bail!("logging init failed: {err}");
        }
    }

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
    let options = DbOptions {
        enforce_foreign_keys: cli.enforce_foreign_keys,
        ..DbOptions::default()
    };
    let conn = open_db(&db_path, &options)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;
    info!("event=cli_start module=cli status=ok db={}", db_path.display());

    let mut service = ReviewService::new(SqliteReviewRepository::new(&conn));
    run(&mut service, cli.command, cli.json)
}

fn run(
    service: &mut ReviewService<SqliteReviewRepository<'_>>,
    command: Command,
    json: bool,
) -> Result<()> {
    match command {
        Command::Init => {
            service.ensure_schema()?;
            println!("reviews table ready");
        }
        Command::Drop => {
            service.drop_schema()?;
            println!("reviews table dropped");
        }
        Command::Add {
            year,
            summary,
            employee_id,
        } => {
            let review = service.record_review(year, &summary, employee_id)?;
            print_one(&review, json)?;
        }
        Command::Show { id } => match service.get_review(id)? {
            Some(review) => print_one(&review, json)?,
            None => bail!("review not found: {id}"),
        },
        Command::List { employee } => {
            let reviews = match employee {
                Some(employee_id) => service.list_reviews_for_employee(employee_id)?,
                None => service.list_reviews()?,
            };
            print_many(&reviews, json)?;
        }
        Command::Update {
            id,
            year,
            summary,
            employee,
        } => {
            let patch = ReviewPatch {
                year,
                summary,
                employee_id: employee,
            };
            let review = service.revise_review(id, patch)?;
            print_one(&review, json)?;
        }
        Command::Delete { id } => {
            service.remove_review(id)?;
            println!("review {id} deleted");
        }
    }
    Ok(())
}

fn print_one(review: &SharedReview, json: bool) -> Result<()> {
    let review = review.borrow();
    if json {
        println!("{}", serde_json::to_string(&*review)?);
    } else {
        println!("{review}");
    }
    Ok(())
}

fn print_many(reviews: &[SharedReview], json: bool) -> Result<()> {
    if json {
        let snapshot: Vec<Review> = reviews.iter().map(|review| review.borrow().clone()).collect();
        println!("{}", serde_json::to_string(&snapshot)?);
        return Ok(());
    }
    for review in reviews {
        println!("{}", review.borrow());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_add_command() {
        let cli = Cli::try_parse_from(["staffbook", "add", "2023", "Good performance", "5"]).unwrap();
        match cli.command {
            Command::Add {
                year,
                summary,
                employee_id,
            } => {
                assert_eq!(year, 2023);
                assert_eq!(summary, "Good performance");
                assert_eq!(employee_id, 5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_partial_update() {
        let cli =
            Cli::try_parse_from(["staffbook", "--json", "update", "3", "--year", "2024"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Update {
                id, year, summary, ..
            } => {
                assert_eq!(id, 3);
                assert_eq!(year, Some(2024));
                assert!(summary.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
