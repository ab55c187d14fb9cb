use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::cache::Applied;
use crate::cli::args::{
    AreaCommand, BorrowArgs, BorrowingCommand, CliArgs, Command, InventoryArgs, SessionArgs,
};
use crate::cli::validation;
use crate::clock::{Clock, SystemClock};
use crate::config::{self, ConfigFile};
use crate::model::{Area, Borrowing, InventoryItem};
use crate::output::{infer_format_from_path, OutputFormat, PageReport};
use crate::pages::{
    borrowing, inventory, monitoring, AnalyticsPage, AreasPage, BorrowingPage, Completed,
    InventoryPage, PageError, Resource, TimeRange,
};
use crate::panel::{PanelEffect, PanelEvent, PanelState, SessionClock, SessionPanel, LANDING_PAGE};
use crate::remote::{
    ApiClient, ApiRequest, HttpOptions, HttpTransport, MemoryTransport, Transport, LOGOUT_PATH,
};

const LOGOUT_PROMPT: &str = "Are you sure you want to log out?";

fn tagged_line(tag: colored::ColoredString, message: &str) -> String {
    format!("{}{}{} {}", "[".bold().white(), tag, "]".bold().white(), message)
}

fn info(message: &str) {
    println!("{}", tagged_line("INF".bold().blue(), message));
}

fn warn(message: &str) {
    eprintln!("{}", tagged_line("WRN".bold().yellow(), message));
}

fn error(message: &str) {
    eprintln!("{}", tagged_line("ERR".bold().red(), message));
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<13}: {}", label, value);
}

#[derive(Clone, Debug)]
struct RunConfig {
    command: Command,
    http: HttpOptions,
    output: Option<String>,
    output_format: OutputFormat,
    no_color: bool,
    assume_yes: bool,
    landing_page: String,
    time_range: TimeRange,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    let base_url = args
        .base_url
        .or(cfg.base_url)
        .unwrap_or_else(|| HttpOptions::default().base_url);
    validation::validate_base_url(&base_url)?;
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);
    if timeout == 0 {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    let proxy = args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty());
    let header = args.header.or(cfg.header).filter(|h| !h.trim().is_empty());
    if let Some(raw) = header.as_deref() {
        crate::remote::http::parse_header(raw).map_err(|e| e.to_string())?;
    }
    let follow_redirects = args
        .follow_redirects
        .or(cfg.follow_redirects)
        .unwrap_or(true);

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text, json or html"))?,
        None => output
            .as_deref()
            .and_then(infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    let landing_page = match &args.command {
        Command::Session(SessionArgs {
            landing_page: Some(page),
            ..
        }) => page.clone(),
        _ => cfg
            .landing_page
            .unwrap_or_else(|| LANDING_PAGE.to_string()),
    };

    let range_raw = match &args.command {
        Command::Analytics(a) => a.range.clone(),
        _ => None,
    }
    .or(cfg.time_range);
    let time_range = match range_raw {
        Some(raw) => validation::validate_time_range(&raw)?,
        None => TimeRange::default(),
    };

    Ok(RunConfig {
        command: args.command,
        http: HttpOptions {
            base_url,
            timeout_seconds: timeout,
            proxy,
            header,
            follow_redirects,
            verbose: args.verbose,
        },
        output,
        output_format,
        no_color,
        assume_yes: args.yes,
        landing_page,
        time_range,
    })
}

fn build_client(run: &RunConfig) -> Result<ApiClient, String> {
    let transport = HttpTransport::new(&run.http).map_err(|e| e.to_string())?;
    Ok(ApiClient::new(Arc::new(transport)))
}

fn spinner(message: &str) -> Result<ProgressBar, String> {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::with_template(":: {spinner} {msg}")
            .map_err(|e| format!("failed to build spinner style: {e}"))?,
    );
    pb.set_message(message.to_string());
    Ok(pb)
}

async fn confirm(prompt: &str, assume_yes: bool) -> Result<bool, String> {
    if assume_yes {
        return Ok(true);
    }
    let prompt = prompt.to_string();
    tokio::task::spawn_blocking(move || {
        print!("{} {} ", prompt, "[y/N]".bold());
        io::stdout()
            .flush()
            .map_err(|e| format!("failed to write prompt: {e}"))?;
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| format!("failed to read answer: {e}"))?;
        Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
    })
    .await
    .map_err(|e| format!("prompt task failed: {e}"))?
}

fn report_load(label: &str, result: &Result<Applied, PageError>) {
    match result {
        Ok(Applied::Replaced { len, .. }) => info(&format!("loaded {len} {label}")),
        Ok(Applied::Stale { generation, latest }) => warn(&format!(
            "dropped stale {label} response (request {}, latest {})",
            generation.value(),
            latest.value()
        )),
        Err(e) => warn(&format!("failed to load {label}: {e}")),
    }
}

fn report_completed(done: &Completed, success: &str) {
    let detail = done.outcome.message.as_deref().unwrap_or("");
    if detail.is_empty() {
        info(success);
    } else {
        info(&format!("{success} ({detail})"));
    }
    if let Err(e) = &done.reload {
        warn(&format!("reload after write failed: {e}"));
    }
}

async fn emit(run: &RunConfig, report: &PageReport<'_>) -> Result<(), String> {
    for entry in report.summary_entries() {
        format_kv_line(entry.metric.label(), &entry.value.to_string());
    }
    let bytes = report.render(run.output_format);
    match run.output.as_deref() {
        Some(path) => {
            tokio::fs::write(path, &bytes)
                .await
                .map_err(|e| format!("failed to write output '{path}': {e}"))?;
            info(&format!("wrote {} to {}", report.title.to_lowercase(), path));
        }
        None => {
            println!();
            io::stdout()
                .write_all(&bytes)
                .map_err(|e| format!("failed to write output: {e}"))?;
        }
    }
    Ok(())
}

async fn run_inventory(run: &RunConfig, args: &InventoryArgs) -> Result<(), String> {
    let client = if args.offline {
        ApiClient::new(Arc::new(MemoryTransport::new()) as Arc<dyn Transport>)
    } else {
        build_client(run)?
    };
    let mut page = InventoryPage::new(client, Arc::new(SystemClock));

    if !args.offline {
        let pb = spinner("Loading inventory...")?;
        let loaded = page.load().await;
        pb.finish_and_clear();
        report_load("inventory items", &loaded);
    }

    for raw in &args.add {
        let (name, stock, alert, unit) = validation::split_item_spec(raw)?;
        page.open_create();
        let form = page.form_mut();
        form.name = name;
        form.stock = stock;
        form.alert = alert;
        form.unit = unit;
        match page.save() {
            Ok(id) => info(&format!("added item #{id}")),
            Err(e) => {
                page.close_modal();
                error(&e.to_string());
            }
        }
    }

    for id in &args.delete {
        if !confirm(inventory::DELETE_PROMPT, run.assume_yes).await? {
            continue;
        }
        match page.delete(*id) {
            Some(item) => info(&format!("removed item #{} ({})", item.id, item.name)),
            None => warn(&format!("no inventory item with id {id}")),
        }
    }

    let search = args.search.clone().unwrap_or_default();
    page.set_search(&search);
    emit(
        run,
        &PageReport {
            title: "Inventory",
            table: &InventoryItem::TABLE,
            body: page.body(),
            summary: page.summary(),
            slots: InventoryItem::slots(),
            search,
        },
    )
    .await
}

async fn load_borrowings(page: &mut BorrowingPage) -> Result<(), String> {
    let pb = spinner("Loading borrowings...")?;
    let loaded = page.load().await;
    pb.finish_and_clear();
    report_load("borrowings", &loaded.borrowings);
    report_load("inventory items", &loaded.inventory);
    Ok(())
}

async fn emit_borrowings(run: &RunConfig, page: &BorrowingPage, search: String) -> Result<(), String> {
    emit(
        run,
        &PageReport {
            title: "Borrowings",
            table: &Borrowing::TABLE,
            body: page.body(),
            summary: page.summary(),
            slots: Borrowing::slots(),
            search,
        },
    )
    .await
}

async fn run_borrowings(run: &RunConfig, action: &BorrowingCommand) -> Result<(), String> {
    let mut page = BorrowingPage::new(build_client(run)?, Arc::new(SystemClock));
    load_borrowings(&mut page).await?;

    match action {
        BorrowingCommand::List { search } => {
            let search = search.clone().unwrap_or_default();
            page.set_search(&search);
            emit_borrowings(run, &page, search).await
        }
        BorrowingCommand::Create(args) => {
            fill_borrow_form(&mut page, args);
            let done = page.save().await.map_err(|e| e.to_string())?;
            report_completed(&done, "Borrowing created");
            emit_borrowings(run, &page, String::new()).await
        }
        BorrowingCommand::Return { id } => {
            if !confirm(borrowing::RETURN_PROMPT, run.assume_yes).await? {
                return Ok(());
            }
            let done = page.mark_returned(*id).await.map_err(|e| e.to_string())?;
            report_completed(&done, "Marked as returned");
            emit_borrowings(run, &page, String::new()).await
        }
        BorrowingCommand::Delete { id } => {
            if !confirm(borrowing::DELETE_PROMPT, run.assume_yes).await? {
                return Ok(());
            }
            let done = page.delete(*id).await.map_err(|e| e.to_string())?;
            report_completed(&done, "Borrowing deleted");
            emit_borrowings(run, &page, String::new()).await
        }
        BorrowingCommand::Items => {
            if run.output_format == OutputFormat::Html {
                let html = page.item_options_html();
                return write_or_print(run, html.as_bytes()).await;
            }
            let choices = page.item_choices();
            if choices.is_empty() {
                warn("no items to borrow");
            }
            for (value, label) in choices {
                format_kv_line(&value, &label);
            }
            Ok(())
        }
    }
}

fn fill_borrow_form(page: &mut BorrowingPage, args: &BorrowArgs) {
    page.open_create();
    let form = page.form_mut();
    form.borrower_name = args.borrower.clone().unwrap_or_default();
    form.item_id = args.item.clone().unwrap_or_default();
    form.quantity = args.quantity.clone().unwrap_or_default();
    form.due_date = args.due.clone().unwrap_or_default();
    form.purpose = args.purpose.clone().unwrap_or_default();
}

async fn write_or_print(run: &RunConfig, bytes: &[u8]) -> Result<(), String> {
    match run.output.as_deref() {
        Some(path) => {
            tokio::fs::write(path, bytes)
                .await
                .map_err(|e| format!("failed to write output '{path}': {e}"))?;
            info(&format!("wrote {path}"));
            Ok(())
        }
        None => io::stdout()
            .write_all(bytes)
            .map_err(|e| format!("failed to write output: {e}")),
    }
}

async fn run_areas(run: &RunConfig, action: &AreaCommand) -> Result<(), String> {
    let mut page = AreasPage::new(build_client(run)?, Arc::new(SystemClock));
    let pb = spinner("Loading areas...")?;
    let loaded = page.load().await;
    pb.finish_and_clear();
    report_load("areas", &loaded);

    let search = match action {
        AreaCommand::List { search } => search.clone().unwrap_or_default(),
        AreaCommand::Add { name, building } => {
            page.open_create();
            let form = page.form_mut();
            form.name = name.clone().unwrap_or_default();
            form.building = building.clone().unwrap_or_default();
            let done = page.add().await.map_err(|e| e.to_string())?;
            report_completed(&done, monitoring::ADDED);
            String::new()
        }
        AreaCommand::Delete { id } => {
            if !confirm(monitoring::DELETE_PROMPT, run.assume_yes).await? {
                return Ok(());
            }
            let done = page.delete(*id).await.map_err(|e| e.to_string())?;
            report_completed(&done, monitoring::DELETED);
            String::new()
        }
    };

    page.set_search(&search);
    emit(
        run,
        &PageReport {
            title: "Monitoring",
            table: &Area::TABLE,
            body: page.body(),
            summary: page.summary(),
            slots: Area::slots(),
            search,
        },
    )
    .await
}

async fn run_analytics(run: &RunConfig) -> Result<(), String> {
    let mut page = AnalyticsPage::new(build_client(run)?, Arc::new(SystemClock));
    page.set_range(run.time_range);

    let pb = spinner("Refreshing...")?;
    let loaded = page.refresh().await;
    pb.finish_and_clear();
    report_load("borrowings", &loaded.borrowings);
    report_load("inventory items", &loaded.inventory);

    let stats = page.stats();
    format_kv_line("Range", &stats.range.to_string());
    format_kv_line("Most Used", &stats.most_used_label());
    format_kv_line("Low Stock", &stats.low_stock.to_string());
    format_kv_line("High Stock", &stats.high_stock.to_string());
    format_kv_line("Out of Stock", &stats.out_of_stock.to_string());

    if run.output.is_some() {
        let bytes = match run.output_format {
            OutputFormat::Json => serde_json::to_vec_pretty(&stats)
                .map_err(|e| format!("failed to encode analytics: {e}"))?,
            _ => format!(
                "range: {}\nmost_used: {}\nlow_stock: {}\nhigh_stock: {}\nout_of_stock: {}\n",
                stats.range,
                stats.most_used_label(),
                stats.low_stock,
                stats.high_stock,
                stats.out_of_stock
            )
            .into_bytes(),
        };
        write_or_print(run, &bytes).await?;
    }
    Ok(())
}

async fn run_session(run: &RunConfig, args: &SessionArgs) -> Result<(), String> {
    let client = build_client(run)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut session = SessionClock::start(clock);
    let mut panel = SessionPanel::new(run.landing_page.clone());

    let shown = session.display();
    format_kv_line("Login Time", &shown.login_time);
    info("press Ctrl-C to log out");

    let deadline = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline);

    let effect = loop {
        let pb = spinner("")?;
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        let timed_out = loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let d = session.display();
                    pb.set_message(format!(
                        "Session {} | Last activity: {}",
                        d.duration.bold(),
                        d.last_activity
                    ));
                }
                signal = tokio::signal::ctrl_c() => {
                    signal.map_err(|e| format!("failed to listen for Ctrl-C: {e}"))?;
                    break false;
                }
                _ = &mut deadline => break true,
            }
        };
        pb.finish_and_clear();

        if panel.state() == PanelState::Hidden {
            panel.handle(PanelEvent::Open);
        }
        panel.handle(PanelEvent::Confirm);
        if timed_out || confirm(LOGOUT_PROMPT, run.assume_yes).await? {
            break panel.handle(PanelEvent::ConfirmFinal);
        }
        panel.handle(PanelEvent::Cancel);
        session.record_activity();
    };

    let shown = session.display();
    format_kv_line("Duration", &shown.duration);
    if let PanelEffect::Redirect { to, after } = effect {
        info("Logging out...");
        tokio::time::sleep(after).await;
        if let Err(e) = client.exchange(ApiRequest::get(LOGOUT_PATH)).await {
            warn(&format!("logout request failed: {e}"));
        }
        info(&format!("Logged out, continue at {to}"));
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    match &run.command {
        Command::Inventory(args) => run_inventory(&run, args).await,
        Command::Borrowings { action } => run_borrowings(&run, action).await,
        Command::Areas { action } => run_areas(&run, action).await,
        Command::Analytics(_) => run_analytics(&run).await,
        Command::Session(args) => run_session(&run, args).await,
        Command::InitConfig => Ok(()),
    }
}

fn config_path(args: &CliArgs) -> Option<PathBuf> {
    args.config
        .as_deref()
        .map(config::expand_tilde)
        .or_else(config::default_config_path)
}

fn init_config(args: &CliArgs) -> Result<(), String> {
    let path = config_path(args).ok_or("could not determine home directory for config")?;
    if config::ensure_default_config_file(&path).map_err(|e| e.to_string())? {
        info(&format!("wrote default config to {}", path.display()));
    } else {
        warn(&format!("config already exists at {}", path.display()));
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                print!("{}", e.render());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    if matches!(args.command, Command::InitConfig) {
        return init_config(&args);
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false),
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true),
            None => Ok(ConfigFile::default()),
        },
    }
    .map_err(|e| e.to_string())?;

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
