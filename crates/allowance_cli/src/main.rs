//! Command-line front end for the allowance tracker.
//!
//! # Responsibility
//! - Resolve configuration and start logging.
//! - Open one session per invocation, run one command, render the result.
//!
//! # Invariants
//! - Storage problems are printed as warnings and never change the exit code.
//! - Amounts from the command line are clamped to zero before reaching core.

mod render;

use allowance_core::{
    flush_logging, init_logging, AllowanceSession, AppConfig, CommandOutcome, DocumentStore,
    JsonFileStore, LedgerError, Money, TaskId,
};
use clap::{Parser, Subcommand};
use log::info;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "allowance", version, about = "Weekly allowance and chore tracker")]
struct Cli {
    /// Data file; overrides ALLOWANCE_DATA_PATH.
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show this week's tasks, totals and history.
    Show,
    /// Show archived weeks, most recent first.
    History,
    /// Set the fixed weekly allowance.
    Allowance {
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
    },
    /// Add a task worth `value` extra.
    Add {
        name: String,
        #[arg(allow_negative_numbers = true)]
        value: Decimal,
    },
    /// Rename a task and change its value.
    Edit {
        id: TaskId,
        name: String,
        #[arg(allow_negative_numbers = true)]
        value: Decimal,
    },
    /// Remove a task.
    Remove { id: TaskId },
    /// Mark a task done for this week.
    Done { id: TaskId },
    /// Mark a task not done for this week.
    Undo { id: TaskId },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = AppConfig::from_env();

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("warning: file logging disabled: {err}");
        }
    }

    let data_path = cli.data.unwrap_or(config.data_path);
    let today = chrono::Local::now().date_naive();
    info!(
        "event=cli_start module=cli status=ok version={}",
        allowance_core::core_version()
    );

    let mut session = AllowanceSession::open(JsonFileStore::new(data_path), today);
    if let Some(recovery) = session.recovery() {
        eprintln!("warning: {}", render::recovery_warning(recovery));
    }
    if let Some(err) = session.open_save_error() {
        eprintln!("warning: {}", render::save_warning(err));
    }
    if let Some(notice) = render::rollover_notice(session.rollover()) {
        println!("{notice}");
    }

    let code = match run(&mut session, cli.command.unwrap_or(Command::Show)) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    };
    flush_logging();
    code
}

fn run<S: DocumentStore>(
    session: &mut AllowanceSession<S>,
    command: Command,
) -> Result<String, LedgerError> {
    let message = match command {
        Command::Show => return Ok(summary(session)),
        Command::History => {
            let history = render::history(session.history_newest_first());
            return Ok(if history.is_empty() {
                "No weeks archived yet.\n".to_string()
            } else {
                history
            });
        }
        Command::Allowance { amount } => {
            let outcome = session.set_weekly_allowance(clamp_amount(amount))?;
            report_save(&outcome);
            format!(
                "Weekly allowance set to {}.",
                render::money(session.document().weekly_allowance())
            )
        }
        Command::Add { name, value } => {
            let outcome = session.add_task(&name, clamp_amount(value))?;
            report_save(&outcome);
            format!("Added task #{}: {}.", outcome.value.id, outcome.value.name)
        }
        Command::Edit { id, name, value } => {
            let outcome = session.edit_task(id, &name, clamp_amount(value))?;
            report_save(&outcome);
            format!("Updated task #{}.", outcome.value.id)
        }
        Command::Remove { id } => {
            let outcome = session.delete_task(id);
            report_save(&outcome);
            if outcome.value {
                format!("Removed task #{id}.")
            } else {
                format!("No task #{id}; nothing removed.")
            }
        }
        Command::Done { id } => {
            report_save(&session.set_completion(id, true)?);
            format!("Task #{id} done.")
        }
        Command::Undo { id } => {
            report_save(&session.set_completion(id, false)?);
            format!("Task #{id} not done.")
        }
    };
    Ok(format!("{message}\n\n{}", summary(session)))
}

fn summary<S: DocumentStore>(session: &AllowanceSession<S>) -> String {
    let document = session.document();
    let tasks = session
        .tasks_by_name()
        .into_iter()
        .map(|task| (task, document.is_completed(task.id)));
    let mut out = render::task_list(document.week(), tasks);
    out.push('\n');
    out.push_str(&render::totals(&session.earnings()));
    let history = render::history(session.history_newest_first());
    if !history.is_empty() {
        out.push('\n');
        out.push_str(&history);
    }
    out
}

fn report_save<T>(outcome: &CommandOutcome<T>) {
    if let Some(err) = &outcome.save_error {
        eprintln!("warning: {}", render::save_warning(err));
    }
}

fn clamp_amount(amount: Decimal) -> Money {
    amount.max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::{clamp_amount, run, Cli, Command};
    use allowance_core::{AllowanceSession, LedgerError, MemoryStore};
    use chrono::NaiveDate;
    use clap::Parser;
    use rust_decimal_macros::dec;

    fn session() -> AllowanceSession<MemoryStore> {
        AllowanceSession::open(
            MemoryStore::new(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        )
    }

    #[test]
    fn clamp_amount_floors_negative_input() {
        assert_eq!(clamp_amount(dec!(-2)), dec!(0));
        assert_eq!(clamp_amount(dec!(1.25)), dec!(1.25));
    }

    #[test]
    fn parses_negative_amounts_and_global_data_flag() {
        let cli = Cli::try_parse_from(["allowance", "add", "Dishes", "-1", "--data", "/tmp/a.json"])
            .unwrap();
        assert_eq!(cli.data.unwrap().to_str(), Some("/tmp/a.json"));
        assert!(matches!(cli.command, Some(Command::Add { value, .. }) if value == dec!(-1)));
    }

    #[test]
    fn add_then_done_renders_summary() {
        let mut session = session();

        let added = run(
            &mut session,
            Command::Add {
                name: "Clean Room".to_string(),
                value: dec!(2.5),
            },
        )
        .unwrap();
        assert!(added.starts_with("Added task #1: Clean Room.\n\n"));

        let done = run(&mut session, Command::Done { id: 1 }).unwrap();
        assert!(done.contains("  [x] #1 Clean Room (extra $2.50)\n"));
        assert!(done.contains("Total money:      $7.50\n"));
    }

    #[test]
    fn negative_value_is_stored_as_zero() {
        let mut session = session();
        run(
            &mut session,
            Command::Add {
                name: "Chores".to_string(),
                value: dec!(-3),
            },
        )
        .unwrap();

        assert_eq!(session.document().tasks()[0].value, dec!(0));
    }

    #[test]
    fn unknown_task_is_rejected() {
        let mut session = session();
        let err = run(&mut session, Command::Done { id: 4 }).unwrap_err();
        assert_eq!(err, LedgerError::NotFound(4));

        let removed = run(&mut session, Command::Remove { id: 4 }).unwrap();
        assert!(removed.starts_with("No task #4; nothing removed."));
    }

    #[test]
    fn oversized_allowance_is_rejected() {
        let mut session = session();
        let err = run(
            &mut session,
            Command::Allowance {
                amount: rust_decimal::Decimal::MAX,
            },
        )
        .unwrap_err();

        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(session.document().weekly_allowance(), dec!(5));
    }

    #[test]
    fn history_without_entries_says_so() {
        let mut session = session();
        assert_eq!(
            run(&mut session, Command::History).unwrap(),
            "No weeks archived yet.\n"
        );
    }
}
