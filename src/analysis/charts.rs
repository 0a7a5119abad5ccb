//! Chart payload assembly and boxplot PNG rendering.

use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::stats::{self, BoxStats};
use crate::data::clean::MovieRecord;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 200;
const MARGIN: u32 = 40;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const BOX_FILL: Rgb<u8> = Rgb([173, 203, 238]);
const BOX_EDGE: Rgb<u8> = Rgb([30, 58, 138]);
const MEDIAN: Rgb<u8> = Rgb([217, 119, 6]);

/// One scatter point, the shape the dashboard's scatter chart consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub title: String,
    pub rating: Option<f64>,
    pub metascore: Option<f64>,
    pub duration_min: Option<i64>,
    pub votes: Option<i64>,
}

/// Payload written to `movies_charts.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsPayload {
    pub scatter: Vec<ScatterPoint>,
    pub boxplot_rating: Option<BoxStats>,
    pub boxplot_metascore: Option<BoxStats>,
}

/// Assemble the chart payload from cleaned records.
pub fn build(records: &[MovieRecord]) -> ChartsPayload {
    let scatter = records
        .iter()
        .map(|r| ScatterPoint {
            title: r.title.clone(),
            rating: r.rating,
            metascore: r.metascore,
            duration_min: r.duration_min,
            votes: r.votes,
        })
        .collect();

    let ratings: Vec<f64> = records.iter().filter_map(|r| r.rating).collect();
    let metascores: Vec<f64> = records.iter().filter_map(|r| r.metascore).collect();

    ChartsPayload {
        scatter,
        boxplot_rating: stats::box_stats(&ratings),
        boxplot_metascore: stats::box_stats(&metascores),
    }
}

/// Render a horizontal box-and-whisker plot to a PNG file.
pub fn render_boxplot(stats: &BoxStats, path: &Path) -> Result<()> {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    let lo = stats.lower.min(stats.q1);
    let hi = stats.upper.max(stats.q3);
    let pad = ((hi - lo) * 0.1).max(0.5);
    let (lo, hi) = (lo - pad, hi + pad);
    let scale_x = |value: f64| -> u32 {
        let frac = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
        MARGIN + (frac * (WIDTH - 2 * MARGIN) as f64) as u32
    };

    let center_y = HEIGHT / 2;
    let box_top = center_y - 30;
    let box_bottom = center_y + 30;

    // baseline axis
    hline(&mut img, MARGIN, WIDTH - MARGIN, HEIGHT - 20, AXIS);

    let x_lower = scale_x(stats.lower);
    let x_q1 = scale_x(stats.q1);
    let x_median = scale_x(stats.median);
    let x_q3 = scale_x(stats.q3);
    let x_upper = scale_x(stats.upper);

    // whiskers and end caps
    hline(&mut img, x_lower, x_q1, center_y, AXIS);
    hline(&mut img, x_q3, x_upper, center_y, AXIS);
    vline(&mut img, x_lower, center_y - 10, center_y + 10, AXIS);
    vline(&mut img, x_upper, center_y - 10, center_y + 10, AXIS);

    // interquartile box with a heavier median line
    fill_rect(&mut img, x_q1, box_top, x_q3, box_bottom, BOX_FILL);
    hline(&mut img, x_q1, x_q3, box_top, BOX_EDGE);
    hline(&mut img, x_q1, x_q3, box_bottom, BOX_EDGE);
    vline(&mut img, x_q1, box_top, box_bottom, BOX_EDGE);
    vline(&mut img, x_q3, box_top, box_bottom, BOX_EDGE);
    vline(&mut img, x_median.saturating_sub(1), box_top, box_bottom, MEDIAN);
    vline(&mut img, x_median, box_top, box_bottom, MEDIAN);
    vline(&mut img, x_median + 1, box_top, box_bottom, MEDIAN);

    img.save(path)
        .with_context(|| format!("write boxplot {}", path.display()))?;
    info!(path = %path.display(), "wrote boxplot");
    Ok(())
}

fn hline(img: &mut RgbImage, x0: u32, x1: u32, y: u32, color: Rgb<u8>) {
    if y >= img.height() {
        return;
    }
    for x in x0.min(x1)..=x0.max(x1).min(img.width() - 1) {
        img.put_pixel(x, y, color);
    }
}

fn vline(img: &mut RgbImage, x: u32, y0: u32, y1: u32, color: Rgb<u8>) {
    if x >= img.width() {
        return;
    }
    for y in y0.min(y1)..=y0.max(y1).min(img.height() - 1) {
        img.put_pixel(x, y, color);
    }
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    for y in y0.min(y1)..=y0.max(y1).min(img.height() - 1) {
        hline(img, x0, x1, y, color);
    }
}
