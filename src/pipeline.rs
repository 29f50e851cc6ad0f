use std::path::PathBuf;

use chrono::NaiveDate;
use log::info;
use thiserror::Error;

use crate::analytics::{calculate_kpis, AggregateError, KpiSummary};
use crate::config::Config;
use crate::data::{self, CleaningReport, DataSourceError};
use crate::notify::{Delivery, Message, Notifier, NotifyError};
use crate::report::{export_workbook, ChartArtifact, ChartRenderError, ChartRenderer, ExportError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    DataSource(#[from] DataSourceError),
    #[error("{0}")]
    Aggregate(#[from] AggregateError),
    #[error("{0}")]
    ChartRender(#[from] ChartRenderError),
    #[error("{0}")]
    Export(#[from] ExportError),
    #[error("{0}")]
    Notify(#[from] NotifyError),
}

/// Everything a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub cleaning: CleaningReport,
    pub kpis: KpiSummary,
    pub charts: Vec<ChartArtifact>,
    pub workbook: PathBuf,
    pub delivery: Delivery,
}

/// Loads, cleans and summarises the configured orders, renders the charts,
/// writes the workbook dated `today` and notifies the recipients.
///
/// Nothing is read or written when there is no one to notify.
pub fn run<N: Notifier>(config: &Config, today: NaiveDate, notifier: &N) -> Result<RunOutcome, PipelineError> {
    if config.recipients.is_empty() {
        return Err(NotifyError::NoRecipients.into());
    }

    let raw = data::load_csv(&config.input_path)?;
    let (table, cleaning) = data::clean(raw);

    let kpis = calculate_kpis(&table)?;

    let renderer = ChartRenderer::new(config.top_products, config.chart_font.as_deref());
    let charts = renderer.render(&table, &config.charts_dir())?;
    let chart_paths: Vec<PathBuf> = charts.iter().map(|chart| chart.path.clone()).collect();

    let workbook = config.report_path(today);
    export_workbook(&kpis, &chart_paths, &workbook)?;

    let attachments = std::iter::once(workbook.clone()).chain(chart_paths).collect();
    let message = Message::weekly_report(&config.recipients, today, attachments);
    let delivery = notifier.send(&message)?;
    info!("report sent to {} recipients via {}", delivery.recipients.len(), delivery.channel);

    Ok(RunOutcome {
        cleaning,
        kpis,
        charts,
        workbook,
        delivery,
    })
}
