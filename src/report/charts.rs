use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use plotters::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use super::fonts::{ensure_chart_font, FONT_FAMILY};
use crate::analytics::{top_products, weekly_sales, AggregateError, ProductSales, WeeklyTotal};
use crate::data::OrderTable;

pub const CHART_WIDTH: u32 = 640;
pub const CHART_HEIGHT: u32 = 480;

#[derive(Debug, Error)]
pub enum ChartRenderError {
    #[error("failed to create chart directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render {path}: {message}")]
    Draw { path: PathBuf, message: String },
    #[error("{0}")]
    Aggregate(#[from] AggregateError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    WeeklySales,
    TopProducts,
}

impl ChartKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ChartKind::WeeklySales => "weekly_sales.png",
            ChartKind::TopProducts => "top_products.png",
        }
    }

    /// Chart caption; the ranking names how many products it shows.
    pub fn title(&self, top_n: usize) -> String {
        match self {
            ChartKind::WeeklySales => "Weekly Sales Over Time".to_string(),
            ChartKind::TopProducts => format!("Top {} Products by Revenue", top_n),
        }
    }

    fn axis_labels(&self) -> (&'static str, &'static str) {
        match self {
            ChartKind::WeeklySales => ("Week Ending", "Total Sales ($)"),
            ChartKind::TopProducts => ("Product Name", "Revenue ($)"),
        }
    }

    fn x_label_area(&self) -> u32 {
        match self {
            ChartKind::WeeklySales => 50,
            ChartKind::TopProducts => 60,
        }
    }

    /// Dates thin out past a dozen ticks; every product keeps its label.
    fn max_ticks(&self, len: usize) -> usize {
        match self {
            ChartKind::WeeklySales => len.clamp(1, 12),
            ChartKind::TopProducts => len.max(1),
        }
    }
}

/// The aggregate a chart was drawn from.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Weekly(Vec<WeeklyTotal>),
    Products(Vec<ProductSales>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartArtifact {
    pub path: PathBuf,
    pub data: ChartData,
}

impl ChartArtifact {
    pub fn kind(&self) -> ChartKind {
        match self.data {
            ChartData::Weekly(_) => ChartKind::WeeklySales,
            ChartData::Products(_) => ChartKind::TopProducts,
        }
    }
}

pub struct ChartRenderer {
    width: u32,
    height: u32,
    top_n: usize,
    draw_text: bool,
}

impl ChartRenderer {
    pub fn new(top_n: usize, font: Option<&Path>) -> ChartRenderer {
        ChartRenderer {
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
            top_n,
            draw_text: ensure_chart_font(font),
        }
    }

    /// Renders the weekly sales line chart and the top products bar chart into `dir`,
    /// creating it if needed. Artifacts come back in that order.
    pub fn render(&self, table: &OrderTable, dir: &Path) -> Result<Vec<ChartArtifact>, ChartRenderError> {
        fs::create_dir_all(dir).map_err(|source| ChartRenderError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let weekly = weekly_sales(table)?;
        let weekly_path = dir.join(ChartKind::WeeklySales.file_name());
        self.draw(
            &weekly_path,
            ChartKind::WeeklySales,
            &weekly.iter().map(|w| w.week_ending.format("%Y-%m-%d").to_string()).collect::<Vec<_>>(),
            &weekly.iter().map(|w| to_f64(w.sales)).collect::<Vec<_>>(),
        )?;

        let ranking = top_products(table, self.top_n)?;
        let ranking_path = dir.join(ChartKind::TopProducts.file_name());
        self.draw(
            &ranking_path,
            ChartKind::TopProducts,
            &ranking.iter().map(|p| p.label().to_string()).collect::<Vec<_>>(),
            &ranking.iter().map(|p| to_f64(p.sales)).collect::<Vec<_>>(),
        )?;

        info!("charts written to {}", dir.display());

        Ok(vec![
            ChartArtifact {
                path: weekly_path,
                data: ChartData::Weekly(weekly),
            },
            ChartArtifact {
                path: ranking_path,
                data: ChartData::Products(ranking),
            },
        ])
    }

    fn draw(&self, path: &Path, kind: ChartKind, labels: &[String], values: &[f64]) -> Result<(), ChartRenderError> {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error(path))?;

        let (x_range, y_range) = (index_range(values.len()), value_range(values));
        let (x_min, x_max, y_max) = (x_range.start, x_range.end, y_range.end);

        let mut builder = ChartBuilder::on(&root);
        builder.margin(20);
        if self.draw_text {
            builder
                .caption(kind.title(self.top_n), (FONT_FAMILY, 22).into_font())
                .x_label_area_size(kind.x_label_area())
                .y_label_area_size(70);
        }
        let mut chart = builder.build_cartesian_2d(x_range, y_range).map_err(draw_error(path))?;

        if self.draw_text {
            let (x_desc, y_desc) = kind.axis_labels();
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc(x_desc)
                .y_desc(y_desc)
                .x_labels(kind.max_ticks(labels.len()))
                .x_label_formatter(&|x| label_at(labels, *x))
                .draw()
                .map_err(draw_error(path))?;
        } else {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(x_min, y_max), (x_min, 0.0), (x_max, 0.0)],
                    BLACK,
                )))
                .map_err(draw_error(path))?;
        }

        let points = values.iter().enumerate().map(|(i, v)| (i as f64, *v));
        let drawn = match kind {
            ChartKind::WeeklySales => chart
                .draw_series(LineSeries::new(points, BLUE.stroke_width(2)).point_size(3))
                .map(|_| ()),
            ChartKind::TopProducts => chart
                .draw_series(points.map(|(x, v)| Rectangle::new([(x - 0.4, 0.0), (x + 0.4, v)], BLUE.filled())))
                .map(|_| ()),
        };
        drawn.map_err(draw_error(path))?;

        root.present().map_err(draw_error(path))?;

        Ok(())
    }
}

fn draw_error<E: Display>(path: &Path) -> impl Fn(E) -> ChartRenderError + '_ {
    move |err| ChartRenderError::Draw {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// One slot per item centred on its index; at least one slot so the axis is never empty.
fn index_range(len: usize) -> std::ops::Range<f64> {
    -0.5..(len.max(1) as f64 - 0.5)
}

fn value_range(values: &[f64]) -> std::ops::Range<f64> {
    let max = values.iter().copied().fold(0.0, f64::max);
    if max > 0.0 {
        0.0..max * 1.1
    } else {
        0.0..1.0
    }
}

/// Category label for a tick; ticks between categories stay blank.
fn label_at(labels: &[String], x: f64) -> String {
    let index = x.round();
    if (x - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }

    labels.get(index as usize).cloned().unwrap_or_default()
}
