//! Integration tests for table import and export

use readlog_core::{BookAttribute, ReadStatus};
use readlog_library::{
    ColumnMapping, ImportField, ImportTable, LibraryConfig, LibraryError, LibraryManager,
    RowOutcome, UNMAPPED_COLUMN,
};
use std::fs;
use tempfile::{NamedTempFile, TempDir};

type Result<T> = std::result::Result<T, LibraryError>;

async fn setup_manager() -> Result<(LibraryManager, NamedTempFile)> {
    let temp_file = NamedTempFile::new().map_err(LibraryError::Io)?;

    let db_path = temp_file
        .path()
        .to_str()
        .ok_or_else(|| LibraryError::ImportFailed("Invalid path".to_string()))?;

    let manager = LibraryManager::new(LibraryConfig::new(db_path)).await?;
    Ok((manager, temp_file))
}

fn full_mapping() -> ColumnMapping {
    ColumnMapping::new()
        .map(ImportField::Title, "Book")
        .map(ImportField::Author, "Writer")
        .map(ImportField::Series, "Saga")
        .map(ImportField::Isbn, UNMAPPED_COLUMN)
        .map(ImportField::Comments, "Notes")
        .map(ImportField::Started, "Begin")
        .map(ImportField::Finished, "End")
}

#[tokio::test]
async fn test_import_counts_and_skips_invalid_rows() -> Result<()> {
    let (manager, _temp) = setup_manager().await?;

    let data = "\
Book,Writer,Saga,Notes,Begin,End
Dune,Frank Herbert,Dune,,2024-01-01,2024-02-01T08:00:00Z
,Nobody,,blank title,,
Emma,Jane Austen,,,,
";
    let table = ImportTable::from_reader(data.as_bytes(), b',')?;
    let report = manager.import_table(&table, &full_mapping()).await;

    assert_eq!(report.total, 3);
    assert_eq!(report.succeed, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.imported(), 2);
    assert_eq!(
        report.outcomes[1],
        RowOutcome::Rejected(vec!["Title is required".to_string()])
    );

    let books = manager.get_all().await?;
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].title, "Dune");
    assert_eq!(books[0].status, ReadStatus::Read);
    assert_eq!(books[1].title, "Emma");
    assert_eq!(books[1].status, ReadStatus::ToRead);
    Ok(())
}

#[tokio::test]
async fn test_import_keeps_going_after_failures() -> Result<()> {
    let (manager, _temp) = setup_manager().await?;

    let data = "\
Book;Begin;End
;;
Backwards;2024-05-01;2024-04-01
Late;not a date;2024-04-01
";
    let table = ImportTable::from_reader(data.as_bytes(), b';')?;
    let report = manager.import_table(&table, &full_mapping()).await;

    assert_eq!(report.total, 3);
    assert_eq!(report.failed, 2);
    assert_eq!(report.succeed, 1);
    assert_eq!(
        report.outcomes[1],
        RowOutcome::Rejected(vec!["Date format is invalid".to_string()])
    );

    let books = manager.get_all().await?;
    assert_eq!(books.len(), 1);
    // unparseable start date is dropped, then backfilled from the finish date
    assert_eq!(books[0].started_at, books[0].finished_at);
    Ok(())
}

#[tokio::test]
async fn test_import_from_file_with_short_rows() -> Result<()> {
    let (manager, _temp) = setup_manager().await?;
    let dir = TempDir::new().map_err(LibraryError::Io)?;
    let path = dir.path().join("books.tsv");
    fs::write(&path, "Book\tWriter\tSaga\nDune\tFrank Herbert\tDune\nSolo\n")?;

    let table = ImportTable::from_path(&path, b'\t')?;
    let report = manager.import_table(&table, &full_mapping()).await;
    assert_eq!(report.succeed, 2);

    let series = manager.list_group_names(BookAttribute::Series).await?;
    assert_eq!(series, vec!["Dune"]);
    Ok(())
}

#[tokio::test]
async fn test_import_survives_invalid_utf8() -> Result<()> {
    let (manager, _temp) = setup_manager().await?;

    let data: &[u8] = b"Title\nGood One\nBad \xff Row\nGood Two\n";
    let table = ImportTable::from_reader(data, b',')?;
    assert_eq!(table.len(), 3);
    assert_eq!(table.rows()[1], vec!["Bad \u{FFFD} Row"]);

    let mapping = ColumnMapping::new().map(ImportField::Title, "Title");
    let report = manager.import_table(&table, &mapping).await;
    assert_eq!(report.failed, 0);

    let titles: Vec<String> = manager.get_all().await?.into_iter().map(|b| b.title).collect();
    assert!(titles.contains(&"Good One".to_string()));
    assert!(titles.contains(&"Good Two".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_import_missing_file() -> Result<()> {
    let result = ImportTable::from_path("/nonexistent/books.csv", b',');
    assert!(matches!(result, Err(LibraryError::Io(_))));
    Ok(())
}

#[tokio::test]
async fn test_export_csv_round_trips_through_import() -> Result<()> {
    let (manager, _temp) = setup_manager().await?;

    let data = "\
Book,Writer,Saga,Notes,Begin,End
Dune,Frank Herbert,Dune,\"great, again\",2024-01-01,2024-02-01
";
    let table = ImportTable::from_reader(data.as_bytes(), b',')?;
    manager.import_table(&table, &full_mapping()).await;

    let mut out = Vec::new();
    assert_eq!(manager.export_csv(&mut out).await?, 1);

    let exported = ImportTable::from_reader(out.as_slice(), b',')?;
    assert_eq!(
        exported.headers(),
        &["Title", "Author", "Series", "ISBN", "Comments", "Started", "Finished"]
    );
    assert_eq!(
        exported.rows()[0],
        vec![
            "Dune",
            "Frank Herbert",
            "Dune",
            "",
            "great, again",
            "2024-01-01T00:00:00Z",
            "2024-02-01T00:00:00Z"
        ]
    );

    let mapping = ImportField::ALL
        .iter()
        .fold(ColumnMapping::new(), |m, field| m.map(*field, field.label()));
    let (other, _other_temp) = setup_manager().await?;
    let report = other.import_table(&exported, &mapping).await;
    assert_eq!(report.imported(), 1);

    let original = &manager.get_all().await?[0];
    let copy = &other.get_all().await?[0];
    assert_eq!(copy.comments, original.comments);
    assert_eq!(copy.started_at, original.started_at);
    assert_eq!(copy.finished_at, original.finished_at);
    Ok(())
}

#[tokio::test]
async fn test_export_json() -> Result<()> {
    let (manager, _temp) = setup_manager().await?;
    manager
        .create(readlog_core::Book::new("Dune").with_author("Frank Herbert"))
        .await?;

    let mut out = Vec::new();
    assert_eq!(manager.export_json(&mut out).await?, 1);

    let text = String::from_utf8(out).map_err(|e| LibraryError::ExportFailed(e.to_string()))?;
    assert!(text.contains("\"author\": \"Frank Herbert\""));
    Ok(())
}
