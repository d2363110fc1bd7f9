use std::fmt::Write as _;

use chrono::{Datelike, NaiveDate};

use crate::calendar::DAYS_PER_WEEK;
use crate::core::services::SummaryService;
use crate::domain::record::{date_label, format_yen};
use crate::domain::{CategoryRanking, Mode, RecordDraft, YearMonth};
use crate::ledger::parse_date_string;
use crate::utils::build_info;

use super::output::{self, heat_cell, signed_yen};
use super::shell::{CommandError, ShellContext};

const HEAT_LEVELS: u8 = 4;
const WEEKDAY_HEADER: &str = "Su Mo Tu We Th Fr Sa";

pub const COMMANDS: &[(&str, &str)] = &[
    ("summary [YYYY-MM]", "month totals, balance and category rankings"),
    ("calendar [YYYY-MM]", "month grid tinted by daily spending"),
    (
        "add <expense|income> <amount> [category] [YYYY/M/D]",
        "record a new entry",
    ),
    ("remove <id>", "delete a record"),
    ("list [YYYY/M/D]", "records of one day, newest first"),
    (
        "categories [add <expense|income> <name> | remove <id>]",
        "show or edit the category list",
    ),
    ("backups", "saved copies of the record store"),
    ("restore <backup>", "replace the record store with a saved copy"),
    ("version", "build information"),
    ("exit", "leave the shell"),
];

type CommandResult = Result<String, CommandError>;

pub(crate) fn dispatch(context: &ShellContext, command: &str, args: &[&str]) -> CommandResult {
    match command {
        "help" => Ok(help()),
        "summary" => summary(context, args),
        "calendar" => calendar(context, args),
        "add" => add(context, args),
        "remove" | "rm" => remove(context, args),
        "list" | "ls" => list(context, args),
        "categories" => categories(context, args),
        "backups" => backups(context),
        "restore" => restore(context, args),
        "version" => Ok(version()),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

fn help() -> String {
    let mut out = output::format_message(output::MessageKind::Section, "Commands");
    for (usage, description) in COMMANDS {
        let _ = write!(out, "\n  {usage:<56} {description}");
    }
    out
}

fn summary(context: &ShellContext, args: &[&str]) -> CommandResult {
    let year_month = month_arg(context, args.first().copied())?;
    let report = context.book.summarize(year_month)?;

    let mut out = output::format_message(output::MessageKind::Section, year_month);
    let _ = write!(
        out,
        "\nIncome:  {}\nExpense: {}\nNet:     {}\nBalance: {} (all time)",
        signed_yen(i64::try_from(report.month.income_total).unwrap_or(i64::MAX)),
        signed_yen(-i64::try_from(report.month.expense_total).unwrap_or(i64::MAX)),
        signed_yen(report.month.net),
        signed_yen(report.balance.net),
    );
    for mode in Mode::ALL {
        write_ranking(&mut out, report.ranking(mode));
    }
    Ok(out)
}

fn write_ranking(out: &mut String, ranking: &CategoryRanking) {
    let heading = match ranking.mode {
        Mode::Expense => "Expense by category",
        Mode::Income => "Income by category",
    };
    let _ = write!(out, "\n{heading}:");
    if ranking.is_empty() {
        out.push_str("\n  (none)");
        return;
    }
    let total = ranking.total();
    for entry in &ranking.entries {
        let _ = write!(
            out,
            "\n  {:<20} {:>12}円 {:>5.1}%",
            entry.category,
            format_yen(entry.total),
            SummaryService::share_percent(entry.total, total)
        );
    }
}

fn calendar(context: &ShellContext, args: &[&str]) -> CommandResult {
    let year_month = month_arg(context, args.first().copied())?;
    let view = context.book.month_view(year_month)?;

    let mut out = output::format_message(output::MessageKind::Section, year_month);
    let _ = write!(out, "\n{WEEKDAY_HEADER}");
    for row in view.rows() {
        out.push('\n');
        let cells: Vec<String> = row
            .iter()
            .map(|cell| match cell.cell.day() {
                Some(day) => heat_cell(
                    &format!("{day:>2}"),
                    view.heat_level(cell, HEAT_LEVELS),
                    cell.is_today,
                )
                .to_string(),
                None => "  ".to_string(),
            })
            .collect();
        debug_assert_eq!(cells.len(), DAYS_PER_WEEK);
        out.push_str(&cells.join(" "));
    }
    let _ = write!(
        out,
        "\nIncome {}  Expense {}  Net {}",
        format_yen(view.month_summary.income_total),
        format_yen(view.month_summary.expense_total),
        signed_yen(view.month_summary.net)
    );
    Ok(out)
}

fn add(context: &ShellContext, args: &[&str]) -> CommandResult {
    let (Some(mode), Some(amount)) = (args.first(), args.get(1)) else {
        return Err(usage("add <expense|income> <amount> [category] [YYYY/M/D]"));
    };
    let mode = parse_mode(mode)?;
    let amount = parse_amount_arg(amount)?;
    let category = args.get(2).copied().unwrap_or_default();
    let date = match args.get(3) {
        Some(raw) => parse_date_arg(context, raw)?,
        None => context.book.today(),
    };
    let stored = context
        .book
        .record(RecordDraft::new(date, mode, category, amount))?;
    Ok(output::format_message(
        output::MessageKind::Success,
        format!(
            "Recorded {} {} on {} ({})",
            mode,
            stored.display_amount().unwrap_or_default(),
            stored.date().unwrap_or_default(),
            stored.id().unwrap_or_default()
        ),
    ))
}

fn remove(context: &ShellContext, args: &[&str]) -> CommandResult {
    let Some(id) = args.first() else {
        return Err(usage("remove <id>"));
    };
    let before = context.book.stored()?.len();
    let remaining = context.book.remove(id)?;
    let message = if remaining.len() < before {
        output::format_message(output::MessageKind::Success, format!("Removed `{id}`"))
    } else {
        output::format_message(output::MessageKind::Warning, format!("No record with id `{id}`"))
    };
    Ok(message)
}

fn list(context: &ShellContext, args: &[&str]) -> CommandResult {
    let date = match args.first() {
        Some(raw) => parse_date_arg(context, raw)?,
        None => context.book.today(),
    };
    let records = context.book.day_records(date)?;
    let mut out = output::format_message(
        output::MessageKind::Section,
        date_label(date),
    );
    if records.is_empty() {
        out.push_str("\n(no records)");
    }
    for record in records {
        let _ = write!(
            out,
            "\n{:<24} {:<8} {:<20} {}",
            record.id,
            record.mode.as_str(),
            record.category,
            signed_yen(record.signed_amount())
        );
    }
    Ok(out)
}

fn categories(context: &ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {
            let list = context.book.categories()?;
            let mut out = output::format_message(output::MessageKind::Section, "Categories");
            for mode in Mode::ALL {
                let _ = write!(out, "\n{mode}:");
                for entry in list.iter().filter(|entry| entry.mode == mode) {
                    let _ = write!(out, "\n  {:<20} {}", entry.name, entry.id);
                }
            }
            Ok(out)
        }
        ["add", mode, name @ ..] if !name.is_empty() => {
            let entry = context.book.add_category(parse_mode(mode)?, &name.join(" "))?;
            Ok(output::format_message(
                output::MessageKind::Success,
                format!("Added {} category `{}` ({})", entry.mode, entry.name, entry.id),
            ))
        }
        ["remove", id] => {
            context.book.remove_category(id)?;
            Ok(output::format_message(
                output::MessageKind::Success,
                "Category list updated",
            ))
        }
        _ => Err(usage(
            "categories [add <expense|income> <name> | remove <id>]",
        )),
    }
}

fn backups(context: &ShellContext) -> CommandResult {
    let key = &context.book.config().records_key;
    let entries = context.store.list_backups(key)?;
    let mut out = output::format_message(output::MessageKind::Section, "Backups");
    if entries.is_empty() {
        out.push_str("\n(no backups)");
    }
    for entry in entries {
        let created = entry
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".into());
        let _ = write!(out, "\n{:<40} {}", entry.name, created);
    }
    Ok(out)
}

fn restore(context: &ShellContext, args: &[&str]) -> CommandResult {
    let Some(name) = args.first() else {
        return Err(usage("restore <backup>"));
    };
    let key = &context.book.config().records_key;
    context.store.restore_backup(key, name)?;
    let count = context.book.stored()?.len();
    Ok(output::format_message(
        output::MessageKind::Success,
        format!("Restored `{name}` ({count} records)"),
    ))
}

fn version() -> String {
    let meta = build_info::current();
    format!(
        "kakeibo_cli {}\nbuilt {} for {}\n{}",
        meta.short(),
        meta.timestamp,
        meta.target,
        meta.rustc
    )
}

fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {text}"))
}

fn month_arg(context: &ShellContext, raw: Option<&str>) -> Result<YearMonth, CommandError> {
    match raw {
        Some(raw) => raw
            .parse::<YearMonth>()
            .map_err(|err| CommandError::InvalidArguments(err.to_string())),
        None => Ok(YearMonth::of(context.book.today())),
    }
}

fn parse_mode(raw: &str) -> Result<Mode, CommandError> {
    match raw.to_ascii_lowercase().as_str() {
        "expense" | "out" | "-" => Ok(Mode::Expense),
        "income" | "in" | "+" => Ok(Mode::Income),
        _ => Err(CommandError::InvalidArguments(format!(
            "mode must be `expense` or `income`, got `{raw}`"
        ))),
    }
}

/// Accepts `1500`, `1,500` and `1,500円`.
fn parse_amount_arg(raw: &str) -> Result<u64, CommandError> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('円')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned
        .parse::<u64>()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid amount `{raw}`")))
}

fn parse_date_arg(context: &ShellContext, raw: &str) -> Result<NaiveDate, CommandError> {
    parse_date_string(raw, context.book.today().year()).ok_or_else(|| {
        CommandError::InvalidArguments(format!("invalid date `{raw}` (use YYYY/M/D)"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::shell::CliMode;
    use tempfile::TempDir;

    fn context() -> (ShellContext, TempDir) {
        colored::control::set_override(false);
        let dir = TempDir::new().unwrap();
        let context = ShellContext::open(Some(dir.path().to_path_buf()), CliMode::Script).unwrap();
        (context, dir)
    }

    fn run(context: &mut ShellContext, line: &str) -> CommandResult {
        let tokens = crate::cli::shell::parse_command_line(line).unwrap();
        context.execute(&tokens).map(|(text, _)| text)
    }

    #[test]
    fn add_then_summarize_and_list() {
        let (mut ctx, _dir) = context();
        let added = run(&mut ctx, "add expense 1,500円 cafe 2024/3/5").unwrap();
        assert!(added.contains("-1,500円"));
        run(&mut ctx, "add income 10000 salary 2024/3/5").unwrap();
        run(&mut ctx, "add income 2000 bonus 2024/4/1").unwrap();

        let summary = run(&mut ctx, "summary 2024-03").unwrap();
        assert!(summary.contains("=== 2024-03 ==="));
        assert!(summary.contains("Income:  +10,000円"));
        assert!(summary.contains("Net:     +8,500円"));
        assert!(summary.contains("Balance: +10,500円"));

        let listed = run(&mut ctx, "list 2024/3/5").unwrap();
        assert_eq!(listed.lines().count(), 3);
        assert!(listed.contains("cafe"));
        assert!(!listed.contains("bonus"));
        assert!(run(&mut ctx, "list 2024/4/1").unwrap().contains("bonus"));
    }

    #[test]
    fn calendar_renders_six_weeks() {
        let (mut ctx, _dir) = context();
        let text = run(&mut ctx, "calendar 2024-12").unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], WEEKDAY_HEADER);
        assert_eq!(lines.len(), 2 + 6 + 1);
        assert!(lines[2].ends_with(" 1  2  3  4  5  6  7"));
    }

    #[test]
    fn invalid_input_is_reported() {
        let (mut ctx, _dir) = context();
        assert!(matches!(
            run(&mut ctx, "add expense 0"),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(matches!(
            run(&mut ctx, "add transfer 10"),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(matches!(
            run(&mut ctx, "summary 2024-13"),
            Err(CommandError::InvalidArguments(_))
        ));
        assert!(matches!(run(&mut ctx, "frobnicate"), Err(CommandError::UnknownCommand(_))));
    }

    #[test]
    fn remove_reports_unknown_ids() {
        let (mut ctx, _dir) = context();
        let text = run(&mut ctx, "remove nope").unwrap();
        assert!(text.contains("No record"));
    }

    #[test]
    fn backups_follow_overwrites() {
        let (mut ctx, _dir) = context();
        assert!(run(&mut ctx, "backups").unwrap().contains("(no backups)"));
        run(&mut ctx, "add expense 100 a 2024/3/1").unwrap();
        run(&mut ctx, "add expense 200 b 2024/3/1").unwrap();
        let text = run(&mut ctx, "backups").unwrap();
        let name = text.lines().nth(1).and_then(|line| line.split_whitespace().next()).unwrap().to_string();
        let restored = run(&mut ctx, &format!("restore {name}")).unwrap();
        assert!(restored.contains("(1 records)"));
    }

    #[test]
    fn amounts_accept_separators() {
        assert_eq!(parse_amount_arg("1,234,567円").unwrap(), 1_234_567);
        assert!(parse_amount_arg("-5").is_err());
    }
}
