//! SVG charts, one per method
//!
//! A chart is a row of per-athlete marks (bars or points) on a shared value
//! axis, with optional whiskers, per-athlete bands and markers, and
//! horizontal reference lines for group thresholds. Rendering goes through
//! the plotters SVG backend into an in-memory string.

use crate::methods::{
    CvClass, CvReport, MethodReport, ModelDirection, ModelReport, SemClass, SemReport, SwcBand,
    SwcReport,
};
use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;

const CHART_SIZE: (u32, u32) = (960, 480);
const BAND_COLOR: RGBColor = RGBColor(223, 230, 238);
const SEM_COLOR: RGBColor = RGBColor(52, 73, 94);
const MDC_COLOR: RGBColor = RGBColor(142, 68, 173);

/// Colour role of a mark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
    Warning,
}

impl Tone {
    pub fn color(self) -> RGBColor {
        match self {
            Tone::Positive => RGBColor(46, 139, 87),
            Tone::Negative => RGBColor(192, 57, 43),
            Tone::Neutral => RGBColor(158, 158, 158),
            Tone::Warning => RGBColor(243, 156, 18),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Bar,
    Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    pub tone: Tone,
    /// Error bar as (low, high)
    pub whisker: Option<(f64, f64)>,
    /// Shaded per-athlete band as (low, high)
    pub band: Option<(f64, f64)>,
    /// Short horizontal tick at this value
    pub marker: Option<f64>,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: f64, tone: Tone) -> Self {
        Self {
            label: label.into(),
            value,
            tone,
            whisker: None,
            band: None,
            marker: None,
        }
    }
}

#[derive(Clone)]
pub struct ReferenceLine {
    pub value: f64,
    pub label: String,
    pub color: RGBColor,
}

#[derive(Clone)]
pub struct Chart {
    pub title: String,
    pub y_label: String,
    pub mark: Mark,
    pub points: Vec<ChartPoint>,
    pub lines: Vec<ReferenceLine>,
    pub legend: Vec<(Tone, &'static str)>,
}

impl Chart {
    /// Value range covering every mark, whisker, band, marker, line and zero
    pub fn value_range(&self) -> (f64, f64) {
        let mut values = vec![0.0];
        for p in &self.points {
            values.push(p.value);
            values.extend(p.whisker.iter().flat_map(|(lo, hi)| [*lo, *hi]));
            values.extend(p.band.iter().flat_map(|(lo, hi)| [*lo, *hi]));
            values.extend(p.marker);
        }
        values.extend(self.lines.iter().map(|l| l.value));

        let finite = values.iter().copied().filter(|v| v.is_finite());
        let min = finite.clone().fold(f64::INFINITY, f64::min);
        let max = finite.fold(f64::NEG_INFINITY, f64::max);

        let span = max - min;
        if span <= 0.0 {
            return (min - 1.0, max + 1.0);
        }
        (min - span * 0.08, max + span * 0.08)
    }

    /// Render a standalone SVG document
    pub fn to_svg(&self) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
            self.draw(&root)?;
            root.present()?;
        }
        Ok(svg)
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;

        let (lo, hi) = self.value_range();
        let slots = self.points.len().max(1);
        let (x_start, x_end) = (-0.5, slots as f64 - 0.5);
        let labels: Vec<&str> = self.points.iter().map(|p| p.label.as_str()).collect();

        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", 20))
            .margin(15)
            .set_label_area_size(LabelAreaPosition::Left, 70)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(x_start..x_end, lo..hi)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(slots)
            .x_label_formatter(&|v| {
                let i = v.round();
                if (v - i).abs() < 1e-6 && i >= 0.0 {
                    labels.get(i as usize).map(|l| l.to_string()).unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .y_label_formatter(&|v| format!("{:.1}", v))
            .x_desc("Athlete")
            .y_desc(self.y_label.as_str())
            .draw()?;

        // Bands sit behind everything else
        chart.draw_series(self.points.iter().enumerate().filter_map(|(i, p)| {
            let x = i as f64;
            p.band.map(|(b_lo, b_hi)| {
                Rectangle::new([(x - 0.4, b_lo), (x + 0.4, b_hi)], BAND_COLOR.filled())
            })
        }))?;

        chart.draw_series(LineSeries::new(
            [(x_start, 0.0), (x_end, 0.0)],
            BLACK.stroke_width(1),
        ))?;

        for line in &self.lines {
            let color = line.color;
            chart
                .draw_series(LineSeries::new(
                    [(x_start, line.value), (x_end, line.value)],
                    color.stroke_width(2),
                ))?
                .label(line.label.clone())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2))
                });
        }

        match self.mark {
            Mark::Bar => {
                chart.draw_series(self.points.iter().enumerate().map(|(i, p)| {
                    let x = i as f64;
                    Rectangle::new([(x - 0.3, 0.0), (x + 0.3, p.value)], p.tone.color().filled())
                }))?;
            }
            Mark::Point => {
                chart.draw_series(self.points.iter().enumerate().map(|(i, p)| {
                    Circle::new((i as f64, p.value), 5, p.tone.color().filled())
                }))?;
            }
        }

        chart.draw_series(self.points.iter().enumerate().filter_map(|(i, p)| {
            let x = i as f64;
            p.whisker.map(|(w_lo, w_hi)| {
                PathElement::new(
                    vec![
                        (x - 0.1, w_lo),
                        (x + 0.1, w_lo),
                        (x, w_lo),
                        (x, w_hi),
                        (x - 0.1, w_hi),
                        (x + 0.1, w_hi),
                    ],
                    BLACK.stroke_width(1),
                )
            })
        }))?;

        chart.draw_series(self.points.iter().enumerate().filter_map(|(i, p)| {
            let x = i as f64;
            p.marker
                .map(|m| PathElement::new(vec![(x - 0.4, m), (x + 0.4, m)], BLACK.stroke_width(3)))
        }))?;

        // Legend-only series, one per tone
        for (tone, label) in &self.legend {
            let color = tone.color();
            chart
                .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())?
                .label(*label)
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK)
            .draw()?;

        Ok(())
    }
}

/// The chart for one method's results
pub fn method_chart(report: &MethodReport) -> Chart {
    match report {
        MethodReport::SemMdc(r) => sem_chart(r),
        MethodReport::Cv(r) => cv_chart(r),
        MethodReport::Swc(r) => swc_chart(r),
        MethodReport::Model(r) => model_chart(r),
    }
}

fn sem_chart(report: &SemReport) -> Chart {
    let points = report
        .rows
        .iter()
        .map(|row| {
            let tone = match row.classification {
                SemClass::SignificantIncrease => Tone::Positive,
                SemClass::SignificantDecrease => Tone::Negative,
                SemClass::WithinNormalVariability => Tone::Neutral,
            };
            ChartPoint::new(row.athlete.to_string(), row.change_score, tone)
        })
        .collect();

    let line = |value: f64, label: String, color: RGBColor| ReferenceLine { value, label, color };
    Chart {
        title: "Change score vs group SEM".to_string(),
        y_label: "Change score".to_string(),
        mark: Mark::Bar,
        points,
        lines: vec![
            line(report.sem, "+SEM".to_string(), SEM_COLOR),
            line(-report.sem, "-SEM".to_string(), SEM_COLOR),
            line(report.mdc, format!("+{}", report.mdc_label), MDC_COLOR),
            line(-report.mdc, format!("-{}", report.mdc_label), MDC_COLOR),
        ],
        legend: vec![
            (Tone::Positive, SemClass::SignificantIncrease.label()),
            (Tone::Negative, SemClass::SignificantDecrease.label()),
            (Tone::Neutral, SemClass::WithinNormalVariability.label()),
        ],
    }
}

fn cv_chart(report: &CvReport) -> Chart {
    let points = report
        .rows
        .iter()
        .map(|row| {
            let tone = match row.classification {
                CvClass::BeyondNormalVariability => Tone::Positive,
                CvClass::WithinNormalVariability => Tone::Neutral,
            };
            ChartPoint {
                marker: Some(row.cv_percent),
                ..ChartPoint::new(row.athlete.to_string(), row.percent_change.abs(), tone)
            }
        })
        .collect();

    Chart {
        title: "|Percent change| vs athlete CV%".to_string(),
        y_label: "Percent".to_string(),
        mark: Mark::Bar,
        points,
        lines: Vec::new(),
        legend: vec![
            (Tone::Positive, CvClass::BeyondNormalVariability.label()),
            (Tone::Neutral, CvClass::WithinNormalVariability.label()),
        ],
    }
}

fn swc_chart(report: &SwcReport) -> Chart {
    let points = report
        .rows
        .iter()
        .map(|row| {
            let tone = match row.band {
                SwcBand::Clear => Tone::Positive,
                SwcBand::Unclear => Tone::Warning,
                SwcBand::Trivial => Tone::Neutral,
            };
            ChartPoint {
                whisker: Some((row.lower_range, row.upper_range)),
                band: Some((-row.swc, row.swc)),
                ..ChartPoint::new(row.athlete.to_string(), row.change_score, tone)
            }
        })
        .collect();

    Chart {
        title: format!(
            "Change score +/- typical error ({:.1}) vs athlete SWC",
            report.typical_error.value
        ),
        y_label: "Change score".to_string(),
        mark: Mark::Point,
        points,
        lines: Vec::new(),
        legend: vec![
            (Tone::Positive, SwcBand::Clear.label()),
            (Tone::Warning, SwcBand::Unclear.label()),
            (Tone::Neutral, SwcBand::Trivial.label()),
        ],
    }
}

fn model_chart(report: &ModelReport) -> Chart {
    let points = report
        .rows
        .iter()
        .map(|row| {
            let tone = match row.direction {
                ModelDirection::PositiveChange => Tone::Positive,
                ModelDirection::NegativeChange => Tone::Negative,
                ModelDirection::TrivialDifference => Tone::Neutral,
            };
            let sem = row.error_term.sem;
            ChartPoint {
                whisker: Some((row.mean_diff - sem, row.mean_diff + sem)),
                ..ChartPoint::new(row.athlete.to_string(), row.mean_diff, tone)
            }
        })
        .collect();

    Chart {
        title: "Mean difference +/- athlete SEM".to_string(),
        y_label: "Mean difference".to_string(),
        mark: Mark::Bar,
        points,
        lines: Vec::new(),
        legend: vec![
            (Tone::Positive, ModelDirection::PositiveChange.label()),
            (Tone::Negative, ModelDirection::NegativeChange.label()),
            (Tone::Neutral, ModelDirection::TrivialDifference.label()),
        ],
    }
}
