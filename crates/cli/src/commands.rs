use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::ArgMatches;
use console::style;
use readlog_config::LibraryConfig as ListingDefaults;
use readlog_core::{
    AppError, Book, BookAttribute, BookId, ReadStatus, StatusCounts, YearRecord,
};
use readlog_library::{
    column_options, export_file_name, parse_delimiter, ColumnMapping, ImportField, ImportTable,
    LibraryError, LibraryManager, RowOutcome, UNMAPPED_COLUMN,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

const BAR_WIDTH: i64 = 40;

/// Name of the `import` flag that picks the source column for `field`
pub(crate) fn field_arg_name(field: ImportField) -> &'static str {
    match field {
        ImportField::Title => "title-column",
        ImportField::Author => "author-column",
        ImportField::Series => "series-column",
        ImportField::Isbn => "isbn-column",
        ImportField::Comments => "comments-column",
        ImportField::Started => "started-column",
        ImportField::Finished => "finished-column",
    }
}

/// True when `err` was caused by bad input rather than a failing store or file
pub(crate) fn is_user_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<LibraryError>()
            .is_some_and(LibraryError::is_user_error)
            || matches!(
                cause.downcast_ref::<AppError>(),
                Some(AppError::InvalidArgument { .. })
            )
            || cause.is::<chrono::ParseError>()
    })
}

fn arg<'a>(matches: &'a ArgMatches, name: &str) -> Option<&'a str> {
    matches.get_one::<String>(name).map(String::as_str)
}

fn sort_and_order<'a>(
    matches: &'a ArgMatches,
    default_sort: &'a str,
    defaults: &'a ListingDefaults,
) -> (&'a str, &'a str) {
    (
        arg(matches, "sort").unwrap_or(default_sort),
        arg(matches, "order").unwrap_or(&defaults.default_order),
    )
}

fn book_id(matches: &ArgMatches) -> Result<BookId> {
    let id = arg(matches, "id").ok_or_else(|| anyhow!("Book ID is required"))?;
    id.parse::<BookId>().context("Invalid book ID format")
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", value))
}

/// Copies the book fields given on the command line onto `book`
fn apply_fields(book: &mut Book, matches: &ArgMatches) -> Result<()> {
    if let Some(title) = arg(matches, "title") {
        book.title = title.trim().to_string();
    }
    if let Some(author) = arg(matches, "author") {
        book.author = author.trim().to_string();
    }
    if let Some(series) = arg(matches, "series") {
        book.series = series.trim().to_string();
    }
    if let Some(isbn) = arg(matches, "isbn") {
        book.isbn = isbn.trim().to_string();
    }
    if let Some(comments) = arg(matches, "comments") {
        book.comments = comments.to_string();
    }
    if let Some(started) = arg(matches, "started") {
        book.started_at = Some(parse_date(started)?);
    }
    if let Some(finished) = arg(matches, "finished") {
        book.finished_at = Some(parse_date(finished)?);
    }
    Ok(())
}

async fn fetch_book(manager: &LibraryManager, id: BookId) -> Result<Book> {
    manager
        .get_by_id(id)
        .await
        .context("Failed to get book")?
        .ok_or(LibraryError::NotFound(id))
        .with_context(|| format!("Book {}", id))
}

/// List books, optionally narrowed to one status, year, author or series
pub async fn list_books(
    manager: &LibraryManager,
    matches: &ArgMatches,
    defaults: &ListingDefaults,
) -> Result<()> {
    let (heading, books) = if let Some(year) = matches.get_one::<i32>("year") {
        let books = manager.get_by_year(*year).await;
        (format!("Finished in {}", year), books)
    } else if let Some(author) = arg(matches, "author") {
        (format!("By {}", author), manager.get_by_author(author).await)
    } else if let Some(series) = arg(matches, "series") {
        let (sort, order) = sort_and_order(matches, &defaults.series_sort, defaults);
        (
            format!("Series {}", series),
            manager.get_by_series(series, sort, order).await,
        )
    } else {
        let status = match arg(matches, "status") {
            Some(status) => Some(
                status
                    .parse::<ReadStatus>()
                    .context("Status must be to-read, reading or read")?,
            ),
            None => None,
        };
        let (sort, order) = sort_and_order(matches, &defaults.default_sort, defaults);
        let heading = status
            .map(|s| format!("Books ({})", s))
            .unwrap_or_else(|| "Books".to_string());
        let status = status.map(|s| s.as_str()).unwrap_or("");
        (heading, manager.search("", sort, order, status).await)
    };
    let books = books.context("Failed to list books")?;

    if books.is_empty() {
        println!("No books found. Use 'add' or 'import' to record some.");
        return Ok(());
    }

    println!("\n{} {}", style(books.len()).bold().cyan(), heading);
    println!("{}", "=".repeat(80));
    for book in &books {
        print_book_summary(book);
    }

    Ok(())
}

/// Add a new book
pub async fn add_book(manager: &LibraryManager, matches: &ArgMatches) -> Result<()> {
    let mut book = Book::default();
    apply_fields(&mut book, matches)?;

    let book = manager.create(book).await.context("Failed to add book")?;

    println!("{} Book added successfully!", style("✓").green().bold());
    println!("  ID: {}", book.id);
    println!("  Title: {}", book.title);
    println!("  Status: {}", book.status);

    Ok(())
}

/// Change the fields of an existing book
pub async fn edit_book(manager: &LibraryManager, matches: &ArgMatches) -> Result<()> {
    let id = book_id(matches)?;
    let mut book = fetch_book(manager, id).await?;

    apply_fields(&mut book, matches)?;
    if matches.get_flag("clear-started") {
        book.started_at = None;
    }
    if matches.get_flag("clear-finished") {
        book.finished_at = None;
    }

    let book = manager
        .update(id, book)
        .await
        .context("Failed to update book")?;

    println!("{} Book updated: {}", style("✓").green().bold(), book.title);
    println!("  Status: {}", book.status);

    Ok(())
}

/// Move a book to another status, dating the change `today`
pub async fn change_status(
    manager: &LibraryManager,
    matches: &ArgMatches,
    today: NaiveDate,
) -> Result<()> {
    let id = book_id(matches)?;
    let status = arg(matches, "status")
        .ok_or_else(|| anyhow!("Status is required"))?
        .parse::<ReadStatus>()
        .context("Status must be to-read, reading or read")?;

    let book = manager
        .change_status(id, status, today)
        .await
        .with_context(|| format!("Failed to mark book {} as {}", id, status))?;

    println!(
        "{} {} is now {}",
        style("✓").green().bold(),
        book.title,
        status_label(book.status)
    );
    if let Some(started) = book.started_at {
        println!("  Started: {}", started);
    }
    if let Some(finished) = book.finished_at {
        println!("  Finished: {}", finished);
    }

    Ok(())
}

/// Show every field of a book
pub async fn show_book_info(manager: &LibraryManager, matches: &ArgMatches) -> Result<()> {
    let book = fetch_book(manager, book_id(matches)?).await?;

    println!("\n{}", style("Book Information").bold().cyan());
    println!("{}", "=".repeat(80));
    println!("ID: {}", book.id);
    println!("Title: {}", style(&book.title).bold());
    if !book.author.is_empty() {
        println!("Author: {}", book.author);
    }
    if !book.series.is_empty() {
        println!("Series: {}", book.series);
    }
    if !book.isbn.is_empty() {
        println!("ISBN: {}", book.isbn);
    }
    println!("Status: {}", status_label(book.status));
    if let Some(started) = book.started_at {
        println!("Started: {}", started);
    }
    if let Some(finished) = book.finished_at {
        println!("Finished: {}", finished);
    }
    if !book.comments.is_empty() {
        println!("\nComments:\n{}", book.comments);
    }
    if let Some(created) = book.created_at.to_datetime() {
        println!("\nAdded: {}", created.format("%Y-%m-%d %H:%M"));
    }

    Ok(())
}

/// Delete a book, asking first unless `--force` is given
pub async fn delete_book(manager: &LibraryManager, matches: &ArgMatches) -> Result<()> {
    let id = book_id(matches)?;
    let book = fetch_book(manager, id).await?;

    if !matches.get_flag("force") {
        println!("Are you sure you want to delete '{}'? (y/N)", book.title);
        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .context("Failed to read input")?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    manager.delete(id).await.context("Failed to delete book")?;
    println!("{} Book deleted: {}", style("✓").green().bold(), book.title);

    Ok(())
}

/// Search titles and authors for a keyword
pub async fn search_books(
    manager: &LibraryManager,
    matches: &ArgMatches,
    defaults: &ListingDefaults,
) -> Result<()> {
    let keyword = arg(matches, "keyword").unwrap_or("");
    let status = arg(matches, "status").unwrap_or("");
    let (sort, order) = sort_and_order(matches, &defaults.default_sort, defaults);

    let results = manager
        .search(keyword, sort, order, status)
        .await
        .context("Failed to search books")?;

    if results.is_empty() {
        println!("No books found matching '{}'", keyword);
        return Ok(());
    }

    println!(
        "\n{} Search Results for '{}'",
        style(results.len()).bold().cyan(),
        keyword
    );
    println!("{}", "=".repeat(80));
    for book in &results {
        print_book_summary(book);
    }

    Ok(())
}

/// Show status counts and books finished per year
pub async fn show_stats(manager: &LibraryManager, this_year: i32) -> Result<()> {
    let counts = manager
        .count_by_status()
        .await
        .context("Failed to count books")?;
    let years = manager
        .count_finished_by_year()
        .await
        .context("Failed to count finished books")?;
    let reading = manager
        .get_by_status(ReadStatus::Reading)
        .await
        .context("Failed to list books in progress")?;

    println!("\n{}", style("Reading Statistics").bold().cyan());
    println!("{}", "=".repeat(80));
    print_status_counts(&counts);
    println!(
        "Finished in {}: {}",
        this_year,
        style(finished_in(&years, this_year)).bold()
    );

    if !reading.is_empty() {
        println!("\n{}", style("Currently reading").bold());
        for book in &reading {
            print_book_summary(book);
        }
    }

    if years.is_empty() {
        println!("\nNo finished books yet.");
        return Ok(());
    }

    println!("\n{}", style("Finished per year").bold());
    for record in &years {
        print_year(record);
    }

    Ok(())
}

/// List distinct authors or series with their book counts
pub async fn list_groups(
    manager: &LibraryManager,
    matches: &ArgMatches,
    attribute: BookAttribute,
) -> Result<()> {
    if matches.try_get_one::<bool>("names").ok().flatten() == Some(&true) {
        let names = manager
            .list_group_names(attribute)
            .await
            .with_context(|| format!("Failed to list {} names", attribute))?;
        for name in names {
            println!("{}", name);
        }
        return Ok(());
    }

    let filter = arg(matches, "filter").unwrap_or("");
    let order = arg(matches, "order").unwrap_or("asc");
    let groups = manager
        .list_groups(attribute, filter, order)
        .await
        .with_context(|| format!("Failed to list {} groups", attribute))?;

    if groups.is_empty() {
        println!("No {} found.", attribute);
        return Ok(());
    }

    println!("\n{} {} groups", style(groups.len()).bold().cyan(), attribute);
    println!("{}", "=".repeat(80));
    for group in groups {
        println!("  {:<60} {:>5}", group.name, style(group.count).bold());
    }

    Ok(())
}

/// Rename an author or series on every book carrying it
pub async fn rename(
    manager: &LibraryManager,
    matches: &ArgMatches,
    attribute: BookAttribute,
) -> Result<()> {
    let old = arg(matches, "old").unwrap_or("");
    let new = arg(matches, "new").unwrap_or("");

    let changed = manager
        .rename(attribute, old, new)
        .await
        .with_context(|| format!("Failed to rename {}", attribute))?;

    println!(
        "{} Renamed {} '{}' to '{}' on {} books",
        style("✓").green().bold(),
        attribute,
        old.trim(),
        new.trim(),
        changed
    );

    Ok(())
}

fn load_table(matches: &ArgMatches, defaults: &ListingDefaults) -> Result<ImportTable> {
    let file = arg(matches, "file").ok_or_else(|| anyhow!("File path is required"))?;
    let delimiter = arg(matches, "delimiter").unwrap_or(&defaults.import_delimiter);
    let delimiter = parse_delimiter(delimiter).context("Invalid delimiter")?;

    ImportTable::from_path(file, delimiter).with_context(|| format!("Failed to read {}", file))
}

/// Show the columns a file offers for import
pub fn show_columns(matches: &ArgMatches, defaults: &ListingDefaults) -> Result<()> {
    let table = load_table(matches, defaults)?;

    println!("\n{} rows, columns:", style(table.len()).bold().cyan());
    for option in column_options(table.headers()) {
        println!("  {}", option);
    }

    Ok(())
}

/// Builds the column mapping for an import
///
/// Fields without a flag map to the header whose name matches the field
/// label, ignoring case, when there is one.
fn column_mapping(matches: &ArgMatches, headers: &[String]) -> Result<ColumnMapping> {
    let mut mapping = ColumnMapping::new();

    for field in ImportField::ALL {
        match arg(matches, field_arg_name(field)) {
            Some(UNMAPPED_COLUMN) => {}
            Some(column) => {
                if !headers.iter().any(|h| h == column) {
                    bail!("Column '{}' for {} is not in the file", column, field);
                }
                mapping.set(field, column);
            }
            None => {
                if let Some(header) = headers
                    .iter()
                    .find(|h| h.trim().eq_ignore_ascii_case(field.label()))
                {
                    mapping.set(field, header.as_str());
                }
            }
        }
    }

    if mapping.column(ImportField::Title).is_none() {
        bail!("No column mapped to Title; use --title-column");
    }
    Ok(mapping)
}

/// Import books from a delimited file
pub async fn import_books(
    manager: &LibraryManager,
    matches: &ArgMatches,
    defaults: &ListingDefaults,
) -> Result<()> {
    let table = load_table(matches, defaults)?;
    let mapping = column_mapping(matches, table.headers())?;

    let report = manager.import_table(&table, &mapping).await;

    for (index, outcome) in report.outcomes.iter().enumerate() {
        // data rows start on line 2
        let line = index + 2;
        match outcome {
            RowOutcome::Imported(_) => {}
            RowOutcome::Rejected(errors) => {
                println!("  {} line {}: {}", style("✗").red(), line, errors.join(", "))
            }
            RowOutcome::StoreFailed(reason) => {
                println!("  {} line {}: {}", style("!").yellow(), line, reason)
            }
        }
    }

    println!(
        "{} Imported {} of {} rows ({} succeeded, {} failed)",
        style("✓").green().bold(),
        report.imported(),
        report.total,
        report.succeed,
        report.failed
    );

    Ok(())
}

/// Export every book as CSV or JSON
pub async fn export_library(manager: &LibraryManager, matches: &ArgMatches) -> Result<()> {
    let format = arg(matches, "format").unwrap_or("csv");
    let output = match arg(matches, "output") {
        Some(path) => PathBuf::from(path),
        None => {
            let name = PathBuf::from(export_file_name(Local::now().date_naive()));
            if format == "json" {
                name.with_extension("json")
            } else {
                name
            }
        }
    };

    let file = File::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);

    let count = match format {
        "csv" => manager.export_csv(&mut writer).await,
        "json" => manager.export_json(&mut writer).await,
        other => bail!("Unsupported format: {}", other),
    }
    .context("Failed to export books")?;
    writer.flush().context("Failed to write export file")?;

    println!(
        "{} Exported {} books to {}",
        style("✓").green().bold(),
        count,
        output.display()
    );

    Ok(())
}

/// Delete every book; refuses without `--force`
pub async fn reset_library(manager: &LibraryManager, matches: &ArgMatches) -> Result<()> {
    if !matches.get_flag("force") {
        bail!("Refusing to delete every book without --force");
    }

    let removed = manager.reset().await.context("Failed to reset library")?;
    println!("{} Removed {} books", style("✓").green().bold(), removed);

    Ok(())
}

fn status_label(status: ReadStatus) -> String {
    match status {
        ReadStatus::ToRead => style(status).dim().to_string(),
        ReadStatus::Reading => style(status).yellow().to_string(),
        ReadStatus::Read => style(status).green().to_string(),
    }
}

fn print_book_summary(book: &Book) {
    println!("\n{}", style(&book.title).bold());
    if !book.author.is_empty() {
        println!("  by {}", book.author);
    }
    let mut line = format!("  ID: {} | {}", book.id, status_label(book.status));
    if !book.series.is_empty() {
        line.push_str(&format!(" | Series: {}", book.series));
    }
    if let Some(finished) = book.finished_at {
        line.push_str(&format!(" | Finished: {}", finished));
    } else if let Some(started) = book.started_at {
        line.push_str(&format!(" | Started: {}", started));
    }
    println!("{}", line);
    if !book.comments.is_empty() {
        println!("  {}", truncate(&book.comments, 70));
    }
}

fn print_status_counts(counts: &StatusCounts) {
    println!("Total Books: {}", style(counts.total()).bold());
    println!("To read: {}", style(counts.to_read).bold());
    println!("Reading: {}", style(counts.reading).bold());
    println!(
        "Read: {} ({:.1}%)",
        style(counts.finished).bold(),
        counts.finished_percentage()
    );
}

fn finished_in(years: &[YearRecord], year: i32) -> i64 {
    years
        .iter()
        .find(|record| record.year == year)
        .map_or(0, |record| record.count)
}

fn print_year(record: &YearRecord) {
    println!(
        "  {} {:<width$} {:>4}",
        record.year,
        ratio_bar(record.ratio),
        record.count,
        width = BAR_WIDTH as usize
    );
}

/// Horizontal bar for a 0..=100 ratio
fn ratio_bar(ratio: i64) -> String {
    let filled = (ratio.clamp(0, 100) * BAR_WIDTH / 100) as usize;
    "█".repeat(filled)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
