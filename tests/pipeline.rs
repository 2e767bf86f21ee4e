use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use lego_report::data::{self, JoinedTable};
use lego_report::fonts;
use lego_report::metrics::{licensing, releases, themes, MetricError};
use lego_report::{generate_report, metric_tables, Error, ReportConfig};
use sha2::{Digest, Sha256};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixtures() -> JoinedTable {
    data::load(fixture("lego_sets.csv"), fixture("parent_themes.csv")).expect("load fixtures")
}

fn config_in(dir: &Path) -> ReportConfig {
    let mut config = ReportConfig::default();
    config.input.sets = fixture("lego_sets.csv");
    config.input.themes = fixture("parent_themes.csv");
    config.output.pdf = dir.join("report.pdf");
    config.output.image_dir = dir.join("images");
    config
}

#[test]
fn sets_with_unknown_parent_theme_are_dropped() {
    let table = load_fixtures();
    assert_eq!(table.len(), 11);
    assert!(table.rows().iter().all(|row| row.parent_theme != "Mystery"));
}

#[test]
fn every_joined_row_references_a_known_theme() {
    let table = load_fixtures();
    let known: HashSet<&str> = ["Star Wars", "Harry Potter", "Town", "Technic", "Bionicle"]
        .into_iter()
        .collect();
    assert!(table
        .rows()
        .iter()
        .all(|row| known.contains(row.parent_theme.as_str())));
    assert!(table.has_column("name_ls"));
    assert!(table.has_column("name_pt"));
}

#[test]
fn focus_theme_share_and_peak_year() {
    let table = load_fixtures();
    let share = licensing::licensed_theme_share(&table, "Star Wars").expect("licensed rows");
    assert_eq!(share.percentage, 60.0);

    let peak = releases::peak_year(share.rows.iter().copied()).expect("star wars rows");
    assert_eq!(peak.year, 1999);
    assert_eq!(peak.count, 2);
}

#[test]
fn yearly_counts_cover_every_row() {
    let table = load_fixtures();
    let per_year = releases::sets_per_year(&table);
    let total: usize = per_year.iter().map(|entry| entry.count).sum();
    assert_eq!(total, table.len());
    assert!(per_year.windows(2).all(|pair| pair[0].year < pair[1].year));
}

#[test]
fn top_themes_respects_the_limit() {
    let table = load_fixtures();
    let ranking = themes::top_themes(&table, 2);
    assert_eq!(ranking.len(), 2);
    assert_eq!(ranking[0].theme, "Town");
    assert_eq!(ranking[0].sets, 4);

    assert_eq!(themes::top_themes(&table, 50).len(), 4);
}

#[test]
fn licensed_split_adds_up() {
    let table = load_fixtures();
    let split = licensing::licensed_split(&table).expect("non-empty table");
    assert_eq!(split.licensed, 5);
    assert_eq!(split.unlicensed, 6);
    assert_eq!(split.total(), table.len());
    assert_eq!(split.licensed_percent, 45);
}

#[test]
fn missing_part_counts_fail_before_any_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sets = dir.path().join("sets.csv");
    fs::write(
        &sets,
        "set_num,name,year,theme_name,parent_theme\n\
         7140-1,X-wing Fighter,1999,Star Wars Episode 4/5/6,Star Wars\n\
         6541-1,Intercoastal Seaport,2000,Classic Town,Town\n",
    )
    .expect("write sets");

    let mut config = config_in(dir.path());
    config.input.sets = sets;

    match generate_report(&config) {
        Err(Error::Metric(MetricError::Schema { column })) => assert_eq!(column, "num_parts"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("report without part counts should fail"),
    }
    assert!(!config.output.image_dir.exists());
    assert!(!config.output.pdf.exists());
}

#[test]
fn metric_tables_are_reproducible() {
    let config = ReportConfig::default();
    let digest = || {
        let table = load_fixtures();
        let mut hasher = Sha256::new();
        for named in metric_tables(&config, &table).expect("metrics") {
            hasher.update(named.name.as_bytes());
            hasher.update(named.table.to_csv().expect("csv"));
        }
        hasher.finalize()
    };
    assert_eq!(digest(), digest());
}

#[test]
fn metric_tables_cover_every_section() {
    let table = load_fixtures();
    let tables = metric_tables(&ReportConfig::default(), &table).expect("metrics");
    let names: HashSet<&str> = tables.iter().map(|named| named.name).collect();
    assert_eq!(names.len(), tables.len());
    for expected in ["sets_per_year", "top_themes", "licensed_split", "size_distribution"] {
        assert!(names.contains(expected), "missing table {expected}");
    }
}

#[test]
fn full_report_writes_pdf_images_and_tables() {
    if !fonts::default_fonts_available() {
        eprintln!(
            "Skipping full_report_writes_pdf_images_and_tables: no fonts found. Set LEGO_REPORT_FONTS_DIR or install DejaVu Sans."
        );
        return;
    }

    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config_in(dir.path());
    config.output.tables_dir = Some(dir.path().join("tables"));

    let summary = generate_report(&config).expect("report");
    assert_eq!(summary.rows, 11);
    assert_eq!(summary.sections, 13);
    assert_eq!(summary.images.len(), 12);
    assert!(summary.images.iter().all(|path| path.exists()));
    assert_eq!(summary.tables.len(), 13);

    let pdf = fs::read(&summary.pdf).expect("read pdf");
    assert!(pdf.starts_with(b"%PDF"));
    assert_eq!(pdf.len(), summary.bytes);
}
