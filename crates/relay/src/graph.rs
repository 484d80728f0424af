use charts_rs::{LineChart, Series};
use chrono::{DateTime, Utc};

use crate::metadata::SampleSet;
use crate::{Error, Result};

pub const CHART_WIDTH: f32 = 512.0;
pub const CHART_HEIGHT: f32 = 200.0;

/// Renders a sample set as a PNG line chart: time of day along the X axis,
/// raw metric value along the Y axis. Pure; all I/O stays with the caller.
pub fn render_samples(samples: &SampleSet) -> Result<Vec<u8>> {
    if samples.is_empty() {
        return Err(Error::Chart("no samples to render".to_string()));
    }
    let labels: Vec<String> = samples.timestamps.iter().map(axis_label).collect();
    let values: Vec<f32> = samples.values.iter().map(|v| *v as f32).collect();

    let mut chart = LineChart::new(vec![Series::new("Value".to_string(), values)], labels);
    chart.width = CHART_WIDTH;
    chart.height = CHART_HEIGHT;

    let svg = chart
        .svg()
        .map_err(|err| Error::Chart(format!("rendering chart: {}", err)))?;
    charts_rs::svg_to_png(&svg).map_err(|err| Error::Chart(format!("encoding png: {}", err)))
}

fn axis_label(stamp: &DateTime<Utc>) -> String {
    stamp.format("%H:%M:%S").to_string()
}
