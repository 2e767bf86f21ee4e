//! LEGO sets analysis: loads the sets catalog and the parent theme taxonomy, answers a
//! fixed list of questions about them, draws a chart per answer and assembles a PDF report.
//!
//! The pipeline is [`data::load`] → [`metrics`] → [`charts`] → [`builder::PdfBuilder`],
//! driven section by section by [`assembler::generate_report`].

pub mod assembler;
pub mod builder;
pub mod charts;
pub mod config;
pub mod data;
pub mod elements;
mod error;
pub mod fonts;
pub mod metrics;
pub mod model;
pub mod richtext;

pub use assembler::{generate_report, metric_tables, NamedTable, ReportSummary};
pub use config::{load_config, ReportConfig, SectionKind};
pub use error::Error;
