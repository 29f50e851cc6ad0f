use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Image, Workbook, XlsxError};
use thiserror::Error;

use crate::analytics::KpiSummary;

pub const SUMMARY_SHEET: &str = "Summary";
pub const METRIC_LABELS: [&str; 3] = ["Total Sales", "Average Order Value", "Number of Orders"];

/// Rows reserved for each chart. A 480px chart at 0.8 scale is 384px, under 20 rows of 20px.
pub const ROWS_PER_IMAGE: u32 = 20;
pub const IMAGE_SCALE: f64 = 0.8;

/// Blank rows between the metrics table and the first chart.
const IMAGE_SPACING: u32 = 1;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create report directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },
}

/// Zero based row each chart is anchored at, below the header and metric rows.
pub fn image_rows(count: usize) -> Vec<u32> {
    let first = 1 + METRIC_LABELS.len() as u32 + IMAGE_SPACING;
    (0..count as u32).map(|i| first + i * ROWS_PER_IMAGE).collect()
}

pub fn export_workbook(kpis: &KpiSummary, charts: &[PathBuf], output_file: &Path) -> Result<(), ExportError> {
    if let Some(dir) = output_file.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let workbook_error = |source: XlsxError| ExportError::Workbook {
        path: output_file.to_path_buf(),
        source,
    };

    let mut workbook = build_workbook(kpis, charts).map_err(workbook_error)?;
    workbook.save(output_file).map_err(workbook_error)?;

    info!("workbook report created at {}", output_file.display());

    Ok(())
}

fn build_workbook(kpis: &KpiSummary, charts: &[PathBuf]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SUMMARY_SHEET)?;

    let header_format = Format::new().set_bold();
    let money_format = Format::new().set_num_format("#,##0.00");
    let count_format = Format::new();

    worksheet.write_string_with_format(0, 0, "Metric", &header_format)?;
    worksheet.write_string_with_format(0, 1, "Value", &header_format)?;

    let values = [
        (kpis.total_sales().to_f64().unwrap_or_default(), &money_format),
        (kpis.avg_order_value().to_f64().unwrap_or_default(), &money_format),
        (kpis.num_orders() as f64, &count_format),
    ];
    for (row, (label, (value, format))) in METRIC_LABELS.iter().zip(values).enumerate() {
        let row = row as u32 + 1;
        worksheet.write_string(row, 0, *label)?;
        worksheet.write_number_with_format(row, 1, value, format)?;
    }
    worksheet.set_column_width(0, 22)?;
    worksheet.set_column_width(1, 16)?;

    for (path, row) in charts.iter().zip(image_rows(charts.len())) {
        let image = Image::new(path)?
            .set_scale_width(IMAGE_SCALE)
            .set_scale_height(IMAGE_SCALE);
        worksheet.insert_image(row, 0, &image)?;
    }

    Ok(workbook)
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Read;

    use anyhow::Result;
    use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::analytics::calculate_kpis;
    use crate::data::{Order, OrderTable};
    use crate::report::charts::ChartRenderer;

    fn table() -> OrderTable {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        OrderTable {
            orders: vec![
                Order {
                    order_id: "O1".to_string(),
                    order_date: day,
                    product: Some("Widget".to_string()),
                    sales: dec!(100),
                },
                Order {
                    order_id: "O2".to_string(),
                    order_date: day,
                    product: Some("Gadget".to_string()),
                    sales: dec!(50.5),
                },
            ],
        }
    }

    #[test]
    fn test_image_rows_do_not_overlap() {
        assert_eq!(image_rows(0), Vec::<u32>::new());
        assert_eq!(image_rows(2), vec![5, 25]);
        assert!(IMAGE_SCALE * 480.0 < f64::from(ROWS_PER_IMAGE) * 20.0);
    }

    #[test]
    fn test_export_writes_metrics_sheet() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let table = table();
        let kpis = calculate_kpis(&table)?;
        let charts: Vec<PathBuf> = ChartRenderer::new(10, None)
            .render(&table, &tmp.path().join("charts"))?
            .into_iter()
            .map(|artifact| artifact.path)
            .collect();
        let output = tmp.path().join("reports").join("weekly_report_20240107.xlsx");

        export_workbook(&kpis, &charts, &output)?;

        let mut workbook: Xlsx<_> = open_workbook(&output)?;
        let range = workbook.worksheet_range(SUMMARY_SHEET)?;

        assert_eq!(range.get_value((0, 0)), Some(&Data::String("Metric".to_string())));
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("Total Sales".to_string())));
        assert_eq!(range.get_value((1, 1)).and_then(DataType::as_f64), Some(150.5));
        assert_eq!(range.get_value((2, 0)), Some(&Data::String("Average Order Value".to_string())));
        assert_eq!(range.get_value((2, 1)).and_then(DataType::as_f64), Some(75.25));
        assert_eq!(range.get_value((3, 0)), Some(&Data::String("Number of Orders".to_string())));
        assert_eq!(range.get_value((3, 1)).and_then(DataType::as_f64), Some(2.0));
        assert_eq!(range.get_value((4, 0)), None);

        let mut archive = zip::ZipArchive::new(File::open(&output)?)?;
        let media = archive.file_names().filter(|name| name.starts_with("xl/media/")).count();
        assert_eq!(media, 2);

        let mut drawing = String::new();
        archive.by_name("xl/drawings/drawing1.xml")?.read_to_string(&mut drawing)?;
        assert!(drawing.contains("<xdr:row>5</xdr:row>"));
        assert!(drawing.contains("<xdr:row>25</xdr:row>"));

        Ok(())
    }

    #[test]
    fn test_export_without_charts() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let output = tmp.path().join("empty.xlsx");

        export_workbook(&calculate_kpis(&OrderTable::default())?, &[], &output)?;

        let bytes = fs::read(&output)?;
        assert_eq!(&bytes[0..2], b"PK");

        Ok(())
    }

    #[test]
    fn test_export_missing_chart_is_an_error() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let charts = vec![tmp.path().join("missing.png")];

        let result = export_workbook(&calculate_kpis(&table())?, &charts, &tmp.path().join("r.xlsx"));

        assert!(matches!(result, Err(ExportError::Workbook { .. })));

        Ok(())
    }

    #[test]
    fn test_export_unwritable_directory() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        let output = file.path().join("report.xlsx");

        let result = export_workbook(&calculate_kpis(&table())?, &[], &output);

        assert!(matches!(result, Err(ExportError::CreateDir { .. })));

        Ok(())
    }
}
