use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::builder::PdfBuildError;
use crate::charts::ChartError;
use crate::config::ConfigError;
use crate::data::DataSourceError;
use crate::metrics::MetricError;
use crate::richtext::MarkupError;

/// Any failure of the report pipeline. The first one aborts the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration")]
    Config(#[from] ConfigError),
    #[error("failed to load the input data")]
    Data(#[from] DataSourceError),
    #[error("metric computation failed")]
    Metric(#[from] MetricError),
    #[error("chart rendering failed")]
    Chart(#[from] ChartError),
    #[error("PDF generation failed")]
    Pdf(#[from] PdfBuildError),
    #[error("invalid report text")]
    Markup(#[from] MarkupError),
    #[error("failed to write metric table {}", path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
