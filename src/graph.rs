#![cfg(feature = "web")]
use plotters::prelude::*;

use crate::error::{DashboardError, Result};
use crate::trend::MonthlyTrendPoint;

/// Configuration options for the trend chart
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Label for the Y-axis
    pub y_label: String,

    /// Width of the chart in pixels
    pub width: u32,

    /// Height of the chart in pixels
    pub height: u32,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            title: "Monthly spend".to_string(),
            y_label: "Amount".to_string(),
            width: 800,
            height: 400,
        }
    }
}

/// Render the monthly trend as an SVG bar chart
///
/// One bar per month, oldest on the left, labelled with the point's
/// `Mon YYYY` label. An empty trend still renders the axes.
pub fn trend_chart_svg(points: &[MonthlyTrendPoint], options: &GraphOptions) -> Result<String> {
    let mut svg = String::new();
    draw_trend(points, options, &mut svg).map_err(|e| DashboardError::Chart(e.to_string()))?;
    Ok(svg)
}

fn draw_trend(
    points: &[MonthlyTrendPoint],
    options: &GraphOptions,
    svg: &mut String,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::with_string(svg, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_y = points
        .iter()
        .map(|p| p.total_amount)
        .fold(0.0_f64, f64::max);
    let y_top = if max_y > 0.0 { max_y * 1.1 } else { 1.0 };
    let bars = points.len().max(1) as u32;

    let mut chart = ChartBuilder::on(&root)
        .caption(&options.title, ("sans-serif", 24).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d((0..bars).into_segmented(), 0.0..y_top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc(&options.y_label)
        .x_labels(points.len().max(1))
        .x_label_formatter(&|segment| match segment {
            SegmentValue::CenterOf(idx) => points
                .get(*idx as usize)
                .map(|p| p.label.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.mix(0.7).filled())
            .margin(8)
            .data(
                points
                    .iter()
                    .enumerate()
                    .map(|(idx, p)| (idx as u32, p.total_amount)),
            ),
    )?;

    root.present()?;
    Ok(())
}
