use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::Path;
use tracing::warn;

use extract::ExtractionMode;

use crate::benchmark::BenchmarkResult;

#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    pub tokens: f64,
    pub seconds: f64,
    pub text_id: String,
}

/// Points sharing one legend entry: a model under one extraction mode
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub label: String,
    pub mode: ExtractionMode,
    /// Palette index, shared by every series of the same model
    pub color_idx: usize,
    pub points: Vec<PlotPoint>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotData {
    pub series: Vec<PlotSeries>,
    /// Results left out because they have no processing time
    pub skipped: usize,
}

impl PlotData {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }

    fn bounds(&self) -> (f64, f64) {
        let points = self.series.iter().flat_map(|s| s.points.iter());
        let (x_max, y_max) = points.fold((0.0f64, 0.0f64), |(x, y), p| {
            (x.max(p.tokens), y.max(p.seconds))
        });
        (x_max.max(1.0), if y_max > 0.0 { y_max } else { 1.0 })
    }
}

/// Group results into labelled series. Untimed results are skipped, never
/// given a made-up time.
pub fn plot_points(results: &[BenchmarkResult]) -> PlotData {
    let mut data = PlotData::default();
    let mut models: Vec<&str> = Vec::new();

    for result in results {
        let Some(seconds) = result.processing_time else {
            data.skipped += 1;
            continue;
        };

        let color_idx = match models.iter().position(|m| *m == result.model) {
            Some(idx) => idx,
            None => {
                models.push(&result.model);
                models.len() - 1
            }
        };

        let label = format!("{} ({})", result.model, result.extraction_type);
        let point = PlotPoint {
            tokens: result.num_tokens as f64,
            seconds,
            text_id: result.text_id.clone(),
        };

        match data.series.iter_mut().find(|s| s.label == label) {
            Some(series) => series.points.push(point),
            None => data.series.push(PlotSeries {
                label,
                mode: result.extraction_type,
                color_idx,
                points: vec![point],
            }),
        }
    }

    data
}

/// Render the token count vs. processing time scatter plot to a PNG.
/// Returns `false` when there was nothing to plot and no file was written.
pub fn plot_benchmark(results: &[BenchmarkResult], path: &Path) -> Result<bool> {
    let data = plot_points(results);

    if data.skipped > 0 {
        warn!(skipped = data.skipped, "Results without processing time left out of plot");
    }
    if data.is_empty() {
        warn!("No timed results to plot");
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {:?}", parent))?;
    }

    let (x_max, y_max) = data.bounds();

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Processing Time vs. Number of Tokens", ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..(x_max * 1.1), 0f64..(y_max * 1.2))?;

    chart.configure_mesh()
        .x_desc("Approx. Token Count")
        .y_desc("Processing Time (seconds)")
        .draw()?;

    for series in &data.series {
        let color = Palette99::pick(series.color_idx).to_rgba();
        let points = series.points.iter();

        // circle for default prompts, square for nuextract
        match series.mode {
            ExtractionMode::Default => {
                chart.draw_series(points.map(|p| {
                    EmptyElement::at((p.tokens, p.seconds))
                        + Circle::new((0, 0), 6, color.filled())
                        + Text::new(p.text_id.clone(), (8, -14), ("sans-serif", 12).into_font())
                }))?
                .label(series.label.clone())
                .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
            }
            ExtractionMode::NuExtract => {
                chart.draw_series(points.map(|p| {
                    EmptyElement::at((p.tokens, p.seconds))
                        + Rectangle::new([(-6, -6), (6, 6)], color.filled())
                        + Text::new(p.text_id.clone(), (8, -14), ("sans-serif", 12).into_font())
                }))?
                .label(series.label.clone())
                .legend(move |(x, y)| {
                    Rectangle::new([(x - 5, y - 5), (x + 5, y + 5)], color.filled())
                });
            }
        }
    }

    chart.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract::{FailureKind, RequestFailure, ResponseOutput};
    use serde_json::json;

    fn result(
        model: &str,
        mode: ExtractionMode,
        text_id: &str,
        time: Option<f64>,
    ) -> BenchmarkResult {
        BenchmarkResult {
            model: model.to_string(),
            extraction_type: mode,
            num_tokens: 400,
            processing_time: time,
            response_status: time.map(|_| 200),
            output: match time {
                Some(_) => ResponseOutput::Parsed(json!({})),
                None => ResponseOutput::Failed(RequestFailure {
                    kind: FailureKind::Network,
                    message: "timed out".to_string(),
                }),
            },
            server_timings: None,
            text_id: text_id.to_string(),
        }
    }

    #[test]
    fn test_series_dedup_by_label() {
        let results = vec![
            result("phi3", ExtractionMode::Default, "Article_1", Some(1.0)),
            result("nu", ExtractionMode::NuExtract, "Article_1", Some(0.5)),
            result("phi3", ExtractionMode::Default, "Article_2", Some(2.0)),
            result("phi3", ExtractionMode::NuExtract, "Article_1", Some(1.5)),
        ];

        let data = plot_points(&results);
        let labels: Vec<_> = data.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["phi3 (default)", "nu (nuextract)", "phi3 (nuextract)"]);
        assert_eq!(data.series[0].points.len(), 2);
        assert_eq!(data.series[0].points[1].text_id, "Article_2");

        // colour follows the model, marker follows the mode
        assert_eq!(data.series[0].color_idx, data.series[2].color_idx);
        assert_ne!(data.series[0].color_idx, data.series[1].color_idx);
        assert_eq!(data.series[2].mode, ExtractionMode::NuExtract);
    }

    #[test]
    fn test_untimed_results_skipped() {
        let results = vec![
            result("phi3", ExtractionMode::Default, "Article_1", None),
            result("phi3", ExtractionMode::Default, "Article_2", Some(2.0)),
        ];

        let data = plot_points(&results);
        assert_eq!(data.skipped, 1);
        assert_eq!(data.series[0].points.len(), 1);
        assert!(!data.is_empty());
    }

    #[test]
    fn test_nothing_plottable_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figs").join("out.png");
        let results = vec![result("phi3", ExtractionMode::Default, "Article_1", None)];

        assert!(!plot_benchmark(&results, &path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_renders_png_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figs").join("benchmark_results.png");
        let results = vec![
            result("phi3", ExtractionMode::Default, "Article_1", Some(1.2)),
            result("phi3", ExtractionMode::Default, "Article_2", None),
            result("nu", ExtractionMode::NuExtract, "Article_1", Some(0.4)),
        ];

        assert!(plot_benchmark(&results, &path).unwrap());

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
        // 800x600, big-endian width and height in the IHDR chunk
        assert_eq!(&bytes[16..24], &[0, 0, 3, 32, 0, 0, 2, 88]);
    }
}
