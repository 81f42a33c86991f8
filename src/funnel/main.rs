use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use funnel::api::FunnelApi;
use funnel::commands::{CmdMessage, CmdResult, ContactPatch, MessageLevel, OpportunityPatch};
use funnel::config::FunnelConfig;
use funnel::error::{FunnelError, Result};
use funnel::filter::{ActivityFilter, ContactFilter, OpportunityFilter};
use funnel::forecast::{OwnerSummary, Period, PipelineSummary};
use funnel::model::{Contact, ContactStage, JobGrade, Opportunity, OpportunityStage};
use funnel::page::PageMeta;
use funnel::store::fs::FileStore;
use funnel::validate::{ContactDraft, FieldErrors, JobGradeDraft, OpportunityDraft};
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;

mod args;
use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: FunnelApi<FileStore>,
    config_dir: PathBuf,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut ctx = init_context()?;

    match cli.command {
        Some(Commands::List {
            search,
            stage,
            company,
            owner,
            tag,
            inactive,
            all,
            since,
            page,
        }) => handle_list(
            &ctx, search, stage, company, owner, tag, inactive, all, since, page,
        ),
        Some(Commands::Search { term }) => handle_search(&ctx, term),
        Some(Commands::AddContact {
            first_name,
            last_name,
            email,
            company,
            title,
            owner,
            tag,
        }) => handle_add_contact(&mut ctx, first_name, last_name, email, company, title, owner, tag),
        Some(Commands::EditContact {
            id,
            email,
            company,
            title,
            owner,
            stage,
            tag,
        }) => handle_edit_contact(&mut ctx, id, email, company, title, owner, stage, tag),
        Some(Commands::Archive { ids }) => handle_bulk(&mut ctx, "archive".into(), ids),
        Some(Commands::Restore { ids }) => handle_restore(&mut ctx, ids),
        Some(Commands::Bulk { action, ids }) => handle_bulk(&mut ctx, action, ids),
        Some(Commands::Deals {
            search,
            stage,
            owner,
            page,
        }) => handle_deals(&ctx, search, stage, owner, page),
        Some(Commands::AddDeal {
            name,
            amount,
            probability,
            account,
            owner,
            stage,
            close,
        }) => handle_add_deal(&mut ctx, name, amount, probability, account, owner, stage, close),
        Some(Commands::EditDeal {
            id,
            amount,
            probability,
            stage,
            owner,
            close,
            reason,
        }) => handle_edit_deal(&mut ctx, id, amount, probability, stage, owner, close, reason),
        Some(Commands::RemoveDeal { ids }) => handle_remove_deal(&mut ctx, ids),
        Some(Commands::Forecast { period, owner }) => handle_forecast(&ctx, period, owner),
        Some(Commands::Grades { all, search, page }) => handle_grades(&ctx, all, search, page),
        Some(Commands::AddGrade {
            key,
            title,
            level,
            min,
            max,
        }) => handle_add_grade(&mut ctx, key, title, level, min, max),
        Some(Commands::Export) => handle_export(&ctx),
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
        None => handle_list(
            &ctx, None, None, None, None, Vec::new(), false, false, None, 1,
        ),
    }
}

fn init_context() -> Result<AppContext> {
    let data_dir = match std::env::var_os("FUNNEL_DATA") {
        Some(dir) => PathBuf::from(dir),
        None => ProjectDirs::from("com", "funnel", "funnel")
            .ok_or_else(|| FunnelError::Store("Could not determine data dir".to_string()))?
            .data_dir()
            .to_path_buf(),
    };

    let config = FunnelConfig::load(&data_dir).unwrap_or_default();
    let store = FileStore::new(data_dir.clone());
    let api = FunnelApi::new(store, config);

    Ok(AppContext {
        api,
        config_dir: data_dir,
    })
}

#[allow(clippy::too_many_arguments)]
fn handle_list(
    ctx: &AppContext,
    search: Option<String>,
    stage: Option<String>,
    company: Option<String>,
    owner: Option<String>,
    tags: Vec<String>,
    inactive: bool,
    all: bool,
    since: Option<String>,
    page: usize,
) -> Result<()> {
    let activity = if all {
        ActivityFilter::All
    } else if inactive {
        ActivityFilter::Inactive
    } else {
        ActivityFilter::Active
    };

    let filter = ContactFilter {
        search_term: search.unwrap_or_default(),
        stage: parse_opt(stage)?,
        company,
        owner,
        tags: funnel::model::normalize_tags(tags),
        activity,
        created_within: parse_opt(since)?.unwrap_or_default(),
    };

    let result = ctx.api.list_contacts(&filter, page)?;
    print_contacts(&result.contacts);
    print_page(&result.page);
    print_messages(&result.messages);
    Ok(())
}

fn handle_search(ctx: &AppContext, term: String) -> Result<()> {
    let result = ctx.api.search_contacts(&term)?;
    print_contacts(&result.contacts);
    print_messages(&result.messages);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_add_contact(
    ctx: &mut AppContext,
    first_name: String,
    last_name: String,
    email: Option<String>,
    company: Option<String>,
    title: Option<String>,
    owner: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    let owner = owner.unwrap_or_else(|| ctx.api.config().default_owner.clone());
    let draft = ContactDraft {
        first_name,
        last_name,
        email: email.unwrap_or_default(),
        company: company.unwrap_or_default(),
        job_title: title.unwrap_or_default(),
        owner,
    };

    let result = ctx.api.create_contact(&draft, &tags)?;
    finish(result)
}

#[allow(clippy::too_many_arguments)]
fn handle_edit_contact(
    ctx: &mut AppContext,
    id: String,
    email: Option<String>,
    company: Option<String>,
    title: Option<String>,
    owner: Option<String>,
    stage: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    let patch = ContactPatch {
        id,
        email,
        company,
        job_title: title,
        owner,
        stage: parse_opt(stage)?,
        tags: if tags.is_empty() { None } else { Some(tags) },
    };

    let result = ctx.api.update_contacts(&[patch])?;
    finish(result)
}

fn handle_bulk(ctx: &mut AppContext, action: String, ids: Vec<String>) -> Result<()> {
    let result = ctx.api.bulk_contacts(&action, &ids)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_restore(ctx: &mut AppContext, ids: Vec<String>) -> Result<()> {
    let result = ctx.api.restore_contacts(&ids)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_deals(
    ctx: &AppContext,
    search: Option<String>,
    stage: Option<String>,
    owner: Option<String>,
    page: usize,
) -> Result<()> {
    let filter = OpportunityFilter {
        search_term: search.unwrap_or_default(),
        stage: parse_opt(stage)?,
        owner,
        ..Default::default()
    };

    let result = ctx.api.list_deals(&filter, page)?;
    print_deals(&result.opportunities);
    print_page(&result.page);
    print_messages(&result.messages);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_add_deal(
    ctx: &mut AppContext,
    name: String,
    amount: f64,
    probability: u8,
    account: Option<String>,
    owner: Option<String>,
    stage: Option<String>,
    close: Option<String>,
) -> Result<()> {
    let owner = owner.unwrap_or_else(|| ctx.api.config().default_owner.clone());
    let draft = OpportunityDraft {
        name,
        account: account.unwrap_or_default(),
        owner,
        stage: parse_opt(stage)?.unwrap_or_default(),
        amount,
        probability,
        lost_reason: None,
    };

    let result = ctx.api.create_deal(&draft)?;
    if result.rejected() {
        return finish(result);
    }

    // Close date lands as a follow-up patch so create stays form-shaped.
    if let Some(close) = close {
        let patch = OpportunityPatch {
            id: result.opportunities[0].id.clone(),
            expected_close_date: Some(parse_date(&close)?),
            ..Default::default()
        };
        let update = ctx.api.update_deals(&[patch])?;
        print_messages(&update.messages);
    }
    finish(result)
}

#[allow(clippy::too_many_arguments)]
fn handle_edit_deal(
    ctx: &mut AppContext,
    id: String,
    amount: Option<f64>,
    probability: Option<u8>,
    stage: Option<String>,
    owner: Option<String>,
    close: Option<String>,
    reason: Option<String>,
) -> Result<()> {
    let expected_close_date = match close {
        Some(s) => Some(parse_date(&s)?),
        None => None,
    };
    let patch = OpportunityPatch {
        id,
        amount,
        probability,
        stage: parse_opt(stage)?,
        owner,
        expected_close_date,
        lost_reason: reason,
    };

    let result = ctx.api.update_deals(&[patch])?;
    finish(result)
}

fn handle_remove_deal(ctx: &mut AppContext, ids: Vec<String>) -> Result<()> {
    let result = ctx.api.remove_deals(&ids)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_forecast(ctx: &AppContext, period: Option<String>, owner: Option<String>) -> Result<()> {
    let period: Option<Period> = parse_opt(period)?;
    let filter = OpportunityFilter {
        owner,
        ..Default::default()
    };

    let result = ctx.api.forecast(&filter, period)?;
    if let Some(summary) = &result.summary {
        print_summary(summary);
    }
    print_owners(&result.owners);
    if period.is_some() && !result.opportunities.is_empty() {
        println!("\n{}", console::style("Closing this period").bold());
        print_deals(&result.opportunities);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_grades(ctx: &AppContext, all: bool, search: Option<String>, page: usize) -> Result<()> {
    let result = ctx
        .api
        .list_grades(all, search.as_deref().unwrap_or(""), page)?;
    print_grades(&result.grades);
    print_page(&result.page);
    print_messages(&result.messages);
    Ok(())
}

fn handle_add_grade(
    ctx: &mut AppContext,
    key: String,
    title: String,
    level: u8,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<()> {
    let draft = JobGradeDraft {
        key,
        title,
        level,
        min_salary: min,
        max_salary: max,
    };
    let result = ctx.api.create_grade(&draft)?;
    finish(result)
}

fn handle_export(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.export()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let mut config = ctx.api.config().clone();
    match (key.as_deref(), value) {
        (None, _) => {
            println!("page-size = {}", config.page_size);
            println!("default-owner = {}", config.default_owner);
        }
        (Some("page-size"), None) => println!("page-size = {}", config.page_size),
        (Some("page-size"), Some(v)) => {
            let size = v
                .parse()
                .map_err(|_| FunnelError::Api(format!("Not a page size: {}", v)))?;
            config.set_page_size(size)?;
            config.save(&ctx.config_dir)?;
            println!("{}", "Config saved.".green());
        }
        (Some("default-owner"), None) => println!("default-owner = {}", config.default_owner),
        (Some("default-owner"), Some(v)) => {
            config.default_owner = v;
            config.save(&ctx.config_dir)?;
            println!("{}", "Config saved.".green());
        }
        (Some(other), _) => println!("Unknown config key: {}", other),
    }
    Ok(())
}

/// Prints validation errors (if any) and messages for a mutating command.
fn finish(result: CmdResult) -> Result<()> {
    print_field_errors(&result.field_errors);
    print_messages(&result.messages);
    Ok(())
}

fn parse_opt<T: std::str::FromStr<Err = FunnelError>>(value: Option<String>) -> Result<Option<T>> {
    value.map(|s| s.parse()).transpose()
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| FunnelError::Api(format!("Not a date (expected YYYY-MM-DD): {}", s)))
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

fn print_field_errors(errors: &FieldErrors) {
    if errors.is_empty() {
        return;
    }
    println!("{}", "Please fix:".red().bold());
    for (field, message) in errors {
        println!("  {}: {}", field.red(), message);
    }
}

fn print_page(page: &Option<PageMeta>) {
    if let Some(meta) = page {
        if meta.total_pages > 1 {
            println!(
                "{}",
                format!(
                    "Page {} of {} ({} records)",
                    meta.current_page, meta.total_pages, meta.total_items
                )
                .dimmed()
            );
        }
    }
}

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const ID_WIDTH: usize = 8;

fn print_contacts(contacts: &[Contact]) {
    if contacts.is_empty() {
        println!("No contacts found.");
        return;
    }

    for contact in contacts {
        let id = short(&contact.id);
        let mut text = contact.full_name();
        if !contact.company.is_empty() {
            text = format!("{} · {}", text, contact.company);
        }
        if !contact.tags.is_empty() {
            text = format!("{} [{}]", text, contact.tags.join(", "));
        }

        let stage = stage_cell(contact);
        let stage_width = 10;
        let fixed = ID_WIDTH + 2 + stage_width + 2 + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed);
        let text = truncate_to_width(&text, available);
        let padding = available.saturating_sub(text.width());

        println!(
            "{}  {}{}  {:<stage_width$}{}",
            id.dimmed(),
            text,
            " ".repeat(padding),
            stage,
            format_time_ago(contact.updated_at).dimmed(),
            stage_width = stage_width,
        );
    }
}

fn stage_cell(contact: &Contact) -> ColoredString {
    if !contact.is_active {
        return "Archived".red();
    }
    match contact.stage {
        ContactStage::Lead => contact.stage.label().normal(),
        ContactStage::Prospect => contact.stage.label().yellow(),
        ContactStage::Customer => contact.stage.label().green(),
        ContactStage::Partner => contact.stage.label().blue(),
    }
}

fn print_deals(deals: &[Opportunity]) {
    if deals.is_empty() {
        println!("No deals found.");
        return;
    }

    for deal in deals {
        let id = short(&deal.id);
        let mut text = deal.name.clone();
        if !deal.account.is_empty() {
            text = format!("{} · {}", text, deal.account);
        }

        let numbers = format!(
            "{} @ {:>3}% = {}",
            format_amount(deal.amount),
            deal.probability,
            format_amount(deal.weighted_amount())
        );
        let stage = match deal.stage {
            OpportunityStage::ClosedWon => deal.stage.label().green(),
            OpportunityStage::ClosedLost => deal.stage.label().red(),
            _ => deal.stage.label().normal(),
        };
        let close = match deal.expected_close_date {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => "—".to_string(),
        };

        let fixed = ID_WIDTH + 2 + numbers.width() + 2 + 14 + 2 + close.len();
        let available = LINE_WIDTH.saturating_sub(fixed);
        let text = truncate_to_width(&text, available);
        let padding = available.saturating_sub(text.width());

        println!(
            "{}  {}{}  {}  {:<14}{}",
            id.dimmed(),
            text,
            " ".repeat(padding),
            numbers,
            stage,
            close.dimmed(),
        );
    }
}

fn print_summary(summary: &PipelineSummary) {
    println!("{}", console::style("Pipeline").bold().underlined());
    println!(
        "  {} deals ({} open) · total {} · weighted {}",
        summary.deal_count,
        summary.open_count,
        format_amount(summary.total_amount),
        format_amount(summary.pipeline_value),
    );
    println!(
        "  win rate {:.0}% · commit {} · best case {} · pipeline {}",
        summary.win_rate, summary.commit_count, summary.best_case_count, summary.pipeline_count,
    );
}

fn print_owners(owners: &[OwnerSummary]) {
    if owners.is_empty() {
        return;
    }
    println!("\n{}", console::style("By owner").bold().underlined());
    for owner in owners {
        let name = if owner.owner.is_empty() {
            "(unassigned)".to_string()
        } else {
            owner.owner.clone()
        };
        println!(
            "  {:<16} {} deals · weighted {} · avg {:.0}% · win rate {:.0}%",
            name,
            owner.deal_count,
            format_amount(owner.weighted_amount),
            owner.avg_probability,
            owner.win_rate,
        );
    }
}

fn print_grades(grades: &[JobGrade]) {
    if grades.is_empty() {
        println!("No job grades found.");
        return;
    }
    for grade in grades {
        let band = match (grade.min_salary, grade.max_salary) {
            (Some(min), Some(max)) => {
                format!("{} – {}", format_amount(min), format_amount(max))
            }
            (Some(min), None) => format!("{} +", format_amount(min)),
            _ => "—".to_string(),
        };
        let status = if grade.is_active {
            "".normal()
        } else {
            " (retired)".red()
        };
        println!(
            "{}  {:<6} L{:<3} {:<28} {}{}",
            short(&grade.id).dimmed(),
            grade.key,
            grade.level,
            truncate_to_width(&grade.title, 28),
            band.dimmed(),
            status,
        );
    }
}

fn short(id: &str) -> &str {
    let end = id.len().min(ID_WIDTH);
    &id[..end]
}

fn format_amount(value: f64) -> String {
    let whole = value.round() as i64;
    let negative = whole < 0;
    let digits = whole.abs().to_string();

    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(timestamp);

    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
