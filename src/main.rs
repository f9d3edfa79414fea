use anyhow::{anyhow, Context, Result};
use crossterm::style::Stylize;
use reedline::{
    default_emacs_keybindings, ColumnarMenu, Emacs, FileBackedHistory, KeyCode, KeyModifiers,
    MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline,
    ReedlineEvent, ReedlineMenu, Signal,
};
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

mod completer;

use agrimeet_table::config::config::{Config, DisplayConfig};
use agrimeet_table::data::data_exporter::DataExporter;
use agrimeet_table::data::loaders::{load_csv_to_datatable, load_json_to_datatable};
use agrimeet_table::table_display::{render_pagination, render_table, NO_RESULTS};
use agrimeet_table::utils::app_paths::AppPaths;
use agrimeet_table::utils::logging::{init_tracing, LogRingBuffer};
use agrimeet_table::{ControlAction, DataTable, TableEngine, TableSnapshot};
use completer::ActionCompleter;

struct TablePrompt {
    table_name: String,
}

impl Prompt for TablePrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{} ", self.table_name))
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<'_, str> {
        match edit_mode {
            PromptEditMode::Default | PromptEditMode::Emacs => "> ".into(),
            PromptEditMode::Vi(vi_mode) => match vi_mode {
                reedline::PromptViMode::Normal => "N> ".into(),
                reedline::PromptViMode::Insert => "I> ".into(),
            },
            PromptEditMode::Custom(str) => format!("{str}> ").into(),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse search: {})",
            prefix, history_search.term
        ))
    }
}

fn print_help() {
    println!("{}", "agrimeet-table - filter, sort and page through a table".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  agrimeet-table [OPTIONS] FILE.csv|FILE.json");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}     - Use this config file", "--config <PATH>".green());
    println!("  {}     - Override rows per page", "--page-size <N>".green());
    println!(
        "  {} - Write a commented default config file",
        "--generate-config".green()
    );
    println!();
    println!("{}", "Actions:".yellow());
    println!("  {}           - Search every cell", "search:<text>".green());
    println!("  {} - Exact match on a select filter", "select:<column>=<value>".green());
    println!("  {}    - Date range start (empty clears)", "date-from:<date>".green());
    println!("  {}      - Date range end (empty clears)", "date-to:<date>".green());
    println!("  {}   - Click a column header", "sort:<index|name>".green());
    println!("  {} - Change page", "page:prev|next|<n>".green());
    println!("  {}                   - Clear all filters", "reset".green());
    println!();
    println!("{}", "Commands:".yellow());
    println!("  {}             - Show this help", ":help".green());
    println!("  {}         - Show recent log entries", ":logs [n]".green());
    println!("  {}  - Export filtered rows to .csv or .json", ":export <file>".green());
    println!("  {}            - Clear screen", ":clear".green());
    println!("  {}     - Exit", ":quit / Ctrl+D".green());
    println!();
}

fn print_snapshot(snapshot: &TableSnapshot, display: &DisplayConfig) {
    if snapshot.is_empty() {
        println!("{}", NO_RESULTS.yellow());
        return;
    }
    println!("{}", render_table(snapshot, display));
    if let Some(pagination) = render_pagination(&snapshot.page) {
        println!("{}", pagination.cyan());
    }
}

fn print_logs(buffer: &LogRingBuffer, args: &str) {
    let count = args.trim().parse::<usize>().unwrap_or(20);
    for entry in buffer.get_recent(count) {
        println!("{}", entry.format_for_display().dark_grey());
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|pos| args.get(pos + 1))
        .map(String::as_str)
}

fn load_table(path: &str, config: &Config) -> Result<DataTable> {
    let table_name = Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("table")
        .to_string();

    if path.to_ascii_lowercase().ends_with(".json") {
        load_json_to_datatable(path, &table_name, &config.columns)
    } else {
        load_csv_to_datatable(path, &table_name, &config.columns)
    }
}

fn generate_config(args: &[String]) -> Result<()> {
    let path = match flag_value(args, "--config") {
        Some(path) => path.into(),
        None => Config::get_config_path()?,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating config directory {:?}", parent))?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("Error writing config file {:?}", path))?;
    println!("Configuration file created at: {:?}", path);
    Ok(())
}

fn run(args: &[String], log_buffer: &LogRingBuffer) -> Result<()> {
    let mut config = match flag_value(args, "--config") {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(size) = flag_value(args, "--page-size") {
        config.table.rows_per_page = size
            .parse()
            .with_context(|| format!("Invalid --page-size '{}'", size))?;
    }

    let data_file = args
        .iter()
        .skip(1)
        .filter(|arg| !arg.starts_with("--"))
        .find(|arg| {
            let lower = arg.to_ascii_lowercase();
            lower.ends_with(".csv") || lower.ends_with(".json")
        })
        .ok_or_else(|| anyhow!("No CSV or JSON file given (see --help)"))?;

    let table = Arc::new(load_table(data_file, &config)?);
    let mut engine = TableEngine::new(Arc::clone(&table), config.engine_options())?;

    let history_file = AppPaths::history_file()?;
    let history = Box::new(
        FileBackedHistory::with_file(200, history_file)
            .map_err(|e| anyhow!("Error configuring history: {}", e))?,
    );

    let completer = Box::new(ActionCompleter::new(
        table.column_names(),
        engine.bindings().select_names(),
    ));
    let completion_menu = Box::new(
        ColumnarMenu::default()
            .with_name("action_completion")
            .with_columns(1)
            .with_column_width(None)
            .with_column_padding(2),
    );

    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Menu("action_completion".to_string()),
    );

    let mut line_editor = Reedline::create()
        .with_completer(completer)
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_history(history)
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let prompt = TablePrompt {
        table_name: table.name.clone(),
    };

    println!(
        "{}",
        format!(
            "Loaded '{}': {} rows, {} columns. Type :help for actions.",
            table.name,
            table.row_count(),
            table.column_count()
        )
        .cyan()
    );
    print_snapshot(&engine.render(), &config.display);

    loop {
        match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => {
                let line = buffer.trim();
                if line.is_empty() {
                    continue;
                }

                if let Some(command) = line.strip_prefix(':') {
                    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
                    match name {
                        "help" => print_help(),
                        "logs" => print_logs(log_buffer, rest),
                        "clear" => print!("{esc}[2J{esc}[1;1H", esc = 27 as char),
                        "quit" | "q" => break,
                        "export" if !rest.trim().is_empty() => {
                            match DataExporter::export_view(&engine.view(), rest.trim()) {
                                Ok(count) => println!(
                                    "{}",
                                    format!("Exported {} rows to {}", count, rest.trim()).green()
                                ),
                                Err(e) => eprintln!("{}", format!("Export error: {}", e).red()),
                            }
                        }
                        "export" => eprintln!("{}", "Usage: :export <file.csv|file.json>".red()),
                        other => eprintln!("{}", format!("Unknown command ':{}'", other).red()),
                    }
                    continue;
                }

                match line.parse::<ControlAction>() {
                    Ok(action) => print_snapshot(&engine.dispatch(action), &config.display),
                    Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                }
            }
            Signal::CtrlD | Signal::CtrlC => break,
        }
    }

    println!("\nGoodbye!");
    Ok(())
}

fn main() {
    let log_buffer = init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return;
    }

    let result = if args.iter().any(|arg| arg == "--generate-config") {
        generate_config(&args)
    } else {
        run(&args, &log_buffer)
    };

    if let Err(e) = result {
        error!(target: "main", "{:#}", e);
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
    info!(target: "main", "Session ended");
}
