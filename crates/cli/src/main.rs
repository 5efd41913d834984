use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::{Arg, ArgAction, ArgGroup, Command};
use console::style;
use readlog_config::{Config, ConfigManager, LoadedConfig};
use readlog_library::{LibraryConfig, LibraryManager};
use std::path::PathBuf;

mod commands;

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_name("BOOK_ID")
        .help("Book ID")
}

fn sort_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("sort")
                .short('s')
                .long("sort")
                .value_name("COLUMN")
                .help("Sort column: title, author, created_at, started_at or finished_at"),
        )
        .arg(
            Arg::new("order")
                .short('o')
                .long("order")
                .value_name("ORDER")
                .help("Sort direction: asc or desc"),
        )
}

fn book_field_args(command: Command, title_required: bool) -> Command {
    command
        .arg(
            Arg::new("title")
                .short('t')
                .long("title")
                .value_name("TITLE")
                .required(title_required)
                .help("Book title"),
        )
        .arg(Arg::new("author").short('a').long("author").value_name("AUTHOR").help("Author"))
        .arg(Arg::new("series").long("series").value_name("SERIES").help("Series name"))
        .arg(Arg::new("isbn").long("isbn").value_name("ISBN").help("ISBN"))
        .arg(Arg::new("comments").short('c').long("comments").value_name("TEXT").help("Comments"))
        .arg(Arg::new("started").long("started").value_name("YYYY-MM-DD").help("Date reading started"))
        .arg(Arg::new("finished").long("finished").value_name("YYYY-MM-DD").help("Date reading finished"))
}

fn group_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("filter")
                .short('f')
                .long("filter")
                .value_name("TEXT")
                .help("Only names containing TEXT (case-insensitive)"),
        )
        .arg(
            Arg::new("order")
                .short('o')
                .long("order")
                .value_name("ORDER")
                .default_value("asc")
                .help("Sort direction: asc or desc"),
        )
}

fn delimiter_arg() -> Arg {
    Arg::new("delimiter")
        .short('d')
        .long("delimiter")
        .value_name("CHAR")
        .help("Field delimiter (defaults to the configured import delimiter)")
}

pub(crate) fn build_cli() -> Command {
    let mut import = Command::new("import")
        .about("Import books from a delimited file")
        .arg(Arg::new("file").required(true).value_name("FILE").help("File to import"))
        .arg(delimiter_arg());
    for field in readlog_library::ImportField::ALL {
        import = import.arg(
            Arg::new(commands::field_arg_name(field))
                .long(commands::field_arg_name(field))
                .value_name("COLUMN")
                .help(format!("Column holding the {} field ('-' for none)", field)),
        );
    }

    Command::new("readlog")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Personal reading log: track books from to-read to read")
        .arg(
            Arg::new("database")
                .long("database")
                .value_name("PATH")
                .help("Path to the database file (overrides the config)")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Path to the config file")
                .global(true),
        )
        .subcommand(Command::new("init").about("Create the database and a default config file"))
        .subcommand(
            sort_args(
                Command::new("list")
                    .about("List books")
                    .arg(Arg::new("status").long("status").value_name("STATUS").help("to-read, reading or read"))
                    .arg(
                        Arg::new("year")
                            .long("year")
                            .value_name("YEAR")
                            .value_parser(clap::value_parser!(i32))
                            .help("Books finished in YEAR"),
                    )
                    .arg(Arg::new("author").long("author").value_name("NAME").help("Books by exactly this author"))
                    .arg(Arg::new("series").long("series").value_name("NAME").help("Books in exactly this series"))
                    .group(
                        ArgGroup::new("filter")
                            .args(["status", "year", "author", "series"])
                            .multiple(false),
                    ),
            ),
        )
        .subcommand(book_field_args(Command::new("add").about("Add a book"), true))
        .subcommand(
            book_field_args(Command::new("edit").about("Edit a book").arg(id_arg()), false)
                .arg(
                    Arg::new("clear-started")
                        .long("clear-started")
                        .help("Remove the start date")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("started"),
                )
                .arg(
                    Arg::new("clear-finished")
                        .long("clear-finished")
                        .help("Remove the finish date")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("finished"),
                ),
        )
        .subcommand(Command::new("info").about("Show a book").arg(id_arg()))
        .subcommand(
            Command::new("status")
                .about("Move a book to another status, dated today")
                .arg(id_arg())
                .arg(
                    Arg::new("status")
                        .required(true)
                        .value_parser(["to-read", "reading", "read"])
                        .help("New status"),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a book")
                .arg(id_arg())
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .help("Skip confirmation prompt")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(sort_args(
            Command::new("search")
                .about("Search titles and authors")
                .arg(Arg::new("keyword").value_name("KEYWORD").help("Text to look for (empty matches all)"))
                .arg(Arg::new("status").long("status").value_name("STATUS").help("to-read, reading or read")),
        ))
        .subcommand(Command::new("stats").about("Show reading statistics"))
        .subcommand(group_args(Command::new("authors").about("List authors with book counts")))
        .subcommand(
            group_args(Command::new("series").about("List series with book counts")).arg(
                Arg::new("names")
                    .long("names")
                    .help("Only list series names")
                    .action(ArgAction::SetTrue),
            ),
        )
        .subcommand(
            Command::new("rename-author")
                .about("Rename an author on every book")
                .arg(Arg::new("old").required(true).value_name("OLD"))
                .arg(Arg::new("new").required(true).value_name("NEW")),
        )
        .subcommand(
            Command::new("rename-series")
                .about("Rename a series on every book")
                .arg(Arg::new("old").required(true).value_name("OLD"))
                .arg(Arg::new("new").required(true).value_name("NEW")),
        )
        .subcommand(
            Command::new("columns")
                .about("Show the columns of a file to import")
                .arg(Arg::new("file").required(true).value_name("FILE"))
                .arg(delimiter_arg()),
        )
        .subcommand(import)
        .subcommand(
            Command::new("export")
                .about("Export all books")
                .arg(Arg::new("output").long("output").value_name("FILE").help("Output file path"))
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .value_name("FORMAT")
                        .help("Export format")
                        .value_parser(["csv", "json"])
                        .default_value("csv"),
                ),
        )
        .subcommand(
            Command::new("reset").about("Delete every book").arg(
                Arg::new("force")
                    .long("force")
                    .help("Required to confirm")
                    .action(ArgAction::SetTrue),
            ),
        )
}

fn config_manager(path: Option<&String>) -> Result<ConfigManager> {
    match path {
        Some(path) => ConfigManager::with_file(PathBuf::from(path)),
        None => ConfigManager::new(),
    }
    .context("Failed to locate config file")
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let config_manager = config_manager(matches.get_one::<String>("config"))?;
    let (loaded, config_error) = match config_manager.load_with_env_overrides() {
        Ok(loaded) => (loaded, None),
        Err(e) => {
            let loaded = LoadedConfig {
                config: Config::default(),
                warnings: Vec::new(),
            };
            (loaded, Some(e))
        }
    };
    let LoadedConfig { config, warnings } = loaded;

    // RUST_LOG still overrides the configured level
    env_logger::Builder::new()
        .filter_level(config.app.log_level.to_level_filter())
        .parse_default_env()
        .init();
    if let Some(e) = config_error {
        log::warn!("Failed to load config: {}, using defaults", e);
    }
    for warning in &warnings {
        log::warn!("{}", warning);
    }

    let db_path = matches
        .get_one::<String>("database")
        .cloned()
        .unwrap_or_else(|| config.app.database_path.to_string_lossy().into_owned());

    if let Some(("init", _)) = matches.subcommand() {
        if config_manager.initialize().context("Failed to write config file")? {
            println!("Config written to {}", config_manager.config_path().display());
        }
    }

    let library_config = LibraryConfig::new(&db_path).with_statement_logging(config.app.debug_mode);
    let manager = LibraryManager::new(library_config)
        .await
        .context("Failed to initialize database")?;
    let defaults = &config.library;

    let result = match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db_path);
            Ok(())
        }
        Some(("list", sub)) => commands::list_books(&manager, sub, defaults).await,
        Some(("add", sub)) => commands::add_book(&manager, sub).await,
        Some(("edit", sub)) => commands::edit_book(&manager, sub).await,
        Some(("info", sub)) => commands::show_book_info(&manager, sub).await,
        Some(("status", sub)) => {
            commands::change_status(&manager, sub, Local::now().date_naive()).await
        }
        Some(("delete", sub)) => commands::delete_book(&manager, sub).await,
        Some(("search", sub)) => commands::search_books(&manager, sub, defaults).await,
        Some(("stats", _)) => commands::show_stats(&manager, Local::now().year()).await,
        Some(("authors", sub)) => {
            commands::list_groups(&manager, sub, readlog_core::BookAttribute::Author).await
        }
        Some(("series", sub)) => {
            commands::list_groups(&manager, sub, readlog_core::BookAttribute::Series).await
        }
        Some(("rename-author", sub)) => {
            commands::rename(&manager, sub, readlog_core::BookAttribute::Author).await
        }
        Some(("rename-series", sub)) => {
            commands::rename(&manager, sub, readlog_core::BookAttribute::Series).await
        }
        Some(("columns", sub)) => commands::show_columns(sub, defaults),
        Some(("import", sub)) => commands::import_books(&manager, sub, defaults).await,
        Some(("export", sub)) => commands::export_library(&manager, sub).await,
        Some(("reset", sub)) => commands::reset_library(&manager, sub).await,
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    };

    manager.close().await;

    match result {
        Err(err) if commands::is_user_error(&err) => {
            log::debug!("Rejected: {:?}", err);
            eprintln!("{} {:#}", style("Error:").red().bold(), err);
            std::process::exit(1);
        }
        Err(err) => {
            log::error!("{:#}", err);
            Err(err)
        }
        Ok(()) => Ok(()),
    }
}
