//! End-to-end runs over temporary directories.

use std::fs;
use std::path::Path;

use pricebook_batch::{consolidate_directory, convert_directory, convert_file, FileStatus};
use pricebook_core::{Config, Error};
use tempfile::TempDir;

fn config_for(root: &Path) -> Config {
    let mut config = Config::default();
    config.input.dir = root.join("in");
    config.consolidate.output_file = root.join("out").join("consolidated.csv");
    config.convert.output_dir = root.join("txt");
    config
}

fn write_input(root: &Path, name: &str, contents: &str) {
    let dir = root.join("in");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn test_consolidate_two_assets() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_input(root, "AAPL.csv", "Date,Open,High,Low,Close,Volume\n2020-01-02,1,1,1,300.35,10\n2020-01-03,1,1,1,100,10\n");
    write_input(root, "MSFT.csv", "Date,Close\n2020-01-03 00:00:00-05:00,158.62\n2020-01-04 00:00:00-05:00,159.03\n");

    let config = config_for(root);
    let report = consolidate_directory(&config).unwrap();

    assert_eq!((report.rows, report.columns), (3, 2));
    assert_eq!(report.summary.converted(), 2);
    let text = fs::read_to_string(&config.consolidate.output_file).unwrap();
    assert_eq!(
        text,
        "Date,AAPL,MSFT\n2020-01-02,300.35,\n2020-01-03,100,158.62\n2020-01-04,,159.03\n"
    );
}

#[test]
fn test_consolidate_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_input(root, "B.csv", "Date,Close\n2021-06-01,2.5\n2021-06-03,2.75\n");
    write_input(root, "A.csv", "Date,Close\n2021-06-02,1.5\n");

    let config = config_for(root);
    consolidate_directory(&config).unwrap();
    let first = fs::read(&config.consolidate.output_file).unwrap();
    consolidate_directory(&config).unwrap();
    let second = fs::read(&config.consolidate.output_file).unwrap();

    assert_eq!(first, second);
    assert!(String::from_utf8(first).unwrap().starts_with("Date,A,B\n"));
}

#[test]
fn test_consolidate_skips_bad_files() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_input(root, "GOOD.csv", "Date,Close\n2020-01-02,1\n");
    write_input(root, "NOCLOSE.csv", "Date,Open\n2020-01-02,1\n");
    write_input(root, "NODATES.csv", "Date,Close\nyesterday,1\n");

    let config = config_for(root);
    let report = consolidate_directory(&config).unwrap();

    assert_eq!(report.summary.converted(), 1);
    assert_eq!(report.summary.skipped(), 2);
    assert_eq!(report.columns, 1);
}

#[test]
fn test_consolidate_duplicate_asset_fails_that_file() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_input(root, "AAPL.CSV", "Date,Close\n2020-01-02,1\n");
    write_input(root, "AAPL.csv", "Date,Close\n2020-01-03,2\n");

    let config = config_for(root);
    let report = consolidate_directory(&config).unwrap();

    assert_eq!(report.summary.converted(), 1);
    assert_eq!(report.summary.failed(), 1);
    assert_eq!(report.columns, 1);
}

#[test]
fn test_consolidate_keeps_dates_with_only_null_closes() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_input(root, "A.csv", "Date,Close\n2020-01-02,\n2020-01-03,1\n");
    write_input(root, "B.csv", "Date,Close\n2020-01-02,\n2020-01-03,2\n");
    write_input(root, "C.csv", "Date,Close\n2020-01-03,\n");

    let config = config_for(root);
    let report = consolidate_directory(&config).unwrap();

    assert_eq!((report.rows, report.columns), (2, 3));
    assert_eq!(
        fs::read_to_string(&config.consolidate.output_file).unwrap(),
        "Date,A,B,C\n2020-01-02,,,\n2020-01-03,1,2,\n"
    );
}

#[test]
fn test_consolidate_no_valid_series_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_input(root, "X.csv", "Open,High\n1,2\n");

    let config = config_for(root);
    let report = consolidate_directory(&config).unwrap();

    assert!(report.output.is_none());
    assert!(!config.consolidate.output_file.exists());
}

#[test]
fn test_empty_input_directory_creates_no_output() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::create_dir_all(root.join("in")).unwrap();

    let config = config_for(root);
    assert!(matches!(consolidate_directory(&config), Err(Error::NoInputFiles(_))));
    assert!(matches!(convert_directory(&config), Err(Error::NoInputFiles(_))));
    assert!(!config.consolidate.output_file.exists());
    assert!(!config.convert.output_dir.exists());
}

#[test]
fn test_missing_input_directory() {
    let tmp = TempDir::new().unwrap();
    let config = config_for(tmp.path());
    assert!(matches!(
        convert_directory(&config),
        Err(Error::MissingInputDirectory(_))
    ));
}

#[test]
fn test_convert_drops_row_missing_high() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_input(
        root,
        "XAGUSD.csv",
        "Date,Open,High,Low,Close,Volume\n\
         05.05.2003 00:00:00.000 GMT+0900,4.7,4.75,4.68,4.72,10\n\
         06.05.2003 00:00:00.000 GMT+0900,4.72,,4.69,4.74,10\n\
         07.05.2003 00:00:00 GMT+0900,4.74,4.8,4.73,4.79,10\n",
    );
    write_input(root, "BROKEN.csv", "Date,Close\n2020-01-02,1\n");

    let config = config_for(root);
    let summary = convert_directory(&config).unwrap();

    assert_eq!(summary.converted(), 1);
    assert_eq!(summary.skipped(), 1);
    let converted = summary
        .outcomes
        .iter()
        .find(|o| o.is_converted())
        .unwrap();
    assert_eq!(converted.status, FileStatus::Converted { rows: 2, dropped: 1 });

    let text = fs::read_to_string(config.convert.output_dir.join("XAGUSD.txt")).unwrap();
    assert_eq!(
        text,
        "20030505 4.700000 4.750000 4.680000 4.720000\n\
         20030507 4.740000 4.800000 4.730000 4.790000\n"
    );
    for line in text.lines() {
        assert_eq!(line.split_whitespace().count(), 5);
    }
    assert!(!config.convert.output_dir.join("BROKEN.txt").exists());
}

#[test]
fn test_convert_skipped_file_does_not_claim_asset() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_input(root, "AAPL.CSV", "Date,Close\n2020-01-02,1\n");
    write_input(root, "AAPL.csv", "Date,Open,High,Low,Close\n2020-01-02,1,2,0.5,1.5\n");

    let config = config_for(root);
    let summary = convert_directory(&config).unwrap();

    assert_eq!(summary.skipped(), 1);
    assert_eq!(summary.converted(), 1);
    assert_eq!(summary.failed(), 0);
    assert_eq!(
        fs::read_to_string(config.convert.output_dir.join("AAPL.txt")).unwrap(),
        "20200102 1.000000 2.000000 0.500000 1.500000\n"
    );
}

#[test]
fn test_convert_duplicate_asset_after_success_fails() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_input(root, "AAPL.CSV", "Date,Open,High,Low,Close\n2020-01-02,1,2,0.5,1.5\n");
    write_input(root, "AAPL.csv", "Date,Open,High,Low,Close\n2020-01-03,3,4,2.5,3.5\n");

    let config = config_for(root);
    let summary = convert_directory(&config).unwrap();

    assert_eq!(summary.converted(), 1);
    assert_eq!(summary.failed(), 1);
    let text = fs::read_to_string(config.convert.output_dir.join("AAPL.txt")).unwrap();
    assert!(text.starts_with("20200102 "));
}

#[test]
fn test_convert_file_local_time_export() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_input(
        root,
        "XAGUSD.csv",
        "Local time,Open,High,Low,Close,Volume\n\
         05.05.2003 00:00:00.000 GMT+0900,4.7,4.75,4.68,4.72,10\n\
         06.05.2003 00:00:00 GMT+0900,4.72,4.78,4.69,4.74,10\n",
    );

    let config = config_for(root);
    let output = root.join("XAGUSD.txt");
    let stats = convert_file(&root.join("in").join("XAGUSD.csv"), &output, &config).unwrap();

    assert_eq!(stats.rows_written, 2);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "20030505 4.700000 4.750000 4.680000 4.720000\n\
         20030506 4.720000 4.780000 4.690000 4.740000\n"
    );
}

#[test]
fn test_convert_file_utc_policy() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_input(root, "X.csv", "Date,Open,High,Low,Close\n05.05.2003 00:00:00.000 GMT+0900,1,2,0.5,1.5\n");

    let config = config_for(root).with_utc_everywhere();
    let output = root.join("X.txt");
    let stats = convert_file(&root.join("in").join("X.csv"), &output, &config).unwrap();

    assert_eq!(stats.rows_written, 1);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "20030504 1.000000 2.000000 0.500000 1.500000\n"
    );
}
