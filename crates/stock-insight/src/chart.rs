//! Minimal server-side SVG charts for the dashboard

use std::fmt::Write as _;

use crate::engine::AnalysisReport;

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 260.0;
const PAD: f64 = 32.0;

/// One plotted line; `None` points break the line
#[derive(Debug, Clone)]
pub struct Line {
    pub label: &'static str,
    pub color: &'static str,
    pub values: Vec<Option<f64>>,
}

impl Line {
    pub fn new(label: &'static str, color: &'static str, values: Vec<Option<f64>>) -> Self {
        Self { label, color, values }
    }
}

/// A line chart with optional histogram bars and horizontal guides
#[derive(Debug, Clone, Default)]
pub struct Chart {
    title: String,
    lines: Vec<Line>,
    bars: Vec<f64>,
    guides: Vec<f64>,
}

impl Chart {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    /// Zero-based bars, green above the axis and red below
    pub fn bars(mut self, values: Vec<f64>) -> Self {
        self.bars = values;
        self
    }

    pub fn guide(mut self, level: f64) -> Self {
        self.guides.push(level);
        self
    }

    fn points(&self) -> usize {
        self.lines
            .iter()
            .map(|l| l.values.len())
            .chain(std::iter::once(self.bars.len()))
            .max()
            .unwrap_or(0)
    }

    fn bounds(&self) -> Option<(f64, f64)> {
        let values = self
            .lines
            .iter()
            .flat_map(|l| l.values.iter().flatten().copied())
            .chain(self.bars.iter().copied())
            .chain(self.guides.iter().copied())
            .chain((!self.bars.is_empty()).then_some(0.0))
            .filter(|v| v.is_finite());

        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if min > max {
            return None;
        }
        if (max - min).abs() < f64::EPSILON {
            return Some((min - 1.0, max + 1.0));
        }
        Some((min, max))
    }

    /// Render as an inline `<svg>` element
    pub fn render(&self) -> String {
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" class="chart" role="img" aria-label="{}">"#,
            escape(&self.title)
        );
        let _ = write!(
            svg,
            r#"<text x="{PAD}" y="18" class="chart-title">{}</text>"#,
            escape(&self.title)
        );

        let n = self.points();
        let Some((min, max)) = self.bounds().filter(|_| n > 0) else {
            svg.push_str(r#"<text x="50%" y="50%" text-anchor="middle">no data</text></svg>"#);
            return svg;
        };

        let plot = Plot { n, min, max };

        for level in &self.guides {
            let y = plot.y(*level);
            let _ = write!(
                svg,
                r##"<line x1="{PAD}" x2="{:.1}" y1="{y:.1}" y2="{y:.1}" stroke="#bbb" stroke-dasharray="4 4"/>"##,
                WIDTH - PAD
            );
        }

        if !self.bars.is_empty() {
            let zero = plot.y(0.0);
            let width = (plot.step() * 0.8).max(0.5);
            for (i, value) in self.bars.iter().enumerate() {
                let y = plot.y(*value);
                let (top, height) = if y < zero { (y, zero - y) } else { (zero, y - zero) };
                let color = if *value >= 0.0 { "#2e7d32" } else { "#c62828" };
                let _ = write!(
                    svg,
                    r#"<rect x="{:.1}" y="{top:.1}" width="{width:.1}" height="{height:.1}" fill="{color}"/>"#,
                    plot.x(i) - width / 2.0
                );
            }
        }

        for line in &self.lines {
            for segment in segments(&line.values) {
                let coords: Vec<String> = segment
                    .iter()
                    .map(|&(i, v)| format!("{:.1},{:.1}", plot.x(i), plot.y(v)))
                    .collect();
                let _ = write!(
                    svg,
                    r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
                    line.color,
                    coords.join(" ")
                );
            }
        }

        let mut legend_x = PAD + 220.0;
        for line in &self.lines {
            let _ = write!(
                svg,
                r#"<text x="{legend_x:.0}" y="18" fill="{}">{}</text>"#,
                line.color,
                escape(line.label)
            );
            legend_x += 70.0;
        }

        let _ = write!(
            svg,
            r#"<text x="2" y="{:.1}" class="axis">{max:.2}</text><text x="2" y="{:.1}" class="axis">{min:.2}</text></svg>"#,
            PAD + 4.0,
            HEIGHT - PAD + 4.0
        );
        svg
    }
}

struct Plot {
    n: usize,
    min: f64,
    max: f64,
}

impl Plot {
    fn step(&self) -> f64 {
        (WIDTH - 2.0 * PAD) / self.n.max(2).saturating_sub(1) as f64
    }

    fn x(&self, i: usize) -> f64 {
        PAD + i as f64 * self.step()
    }

    fn y(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        HEIGHT - PAD - (value - self.min) / span * (HEIGHT - 2.0 * PAD)
    }
}

/// Split a series into runs of defined, finite values
fn segments(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match value.filter(|v| v.is_finite()) {
            Some(v) => current.push((i, v)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Close price chart
pub fn price_chart(report: &AnalysisReport) -> String {
    Chart::new(format!("{} close", report.symbol))
        .line(Line::new(
            "Close",
            "#1565c0",
            report.prices.closes().into_iter().map(Some).collect(),
        ))
        .render()
}

/// DIF/DEA lines over the MACD histogram
pub fn macd_chart(report: &AnalysisReport) -> String {
    let macd = &report.macd;
    Chart::new("MACD (12, 26, 9)")
        .bars(macd.iter().map(|p| p.values.histogram).collect())
        .line(Line::new("DIF", "#1565c0", macd.iter().map(|p| Some(p.values.dif)).collect()))
        .line(Line::new("DEA", "#ef6c00", macd.iter().map(|p| Some(p.values.dea)).collect()))
        .render()
}

/// K, D and J with 20/80 guides
pub fn kdj_chart(report: &AnalysisReport) -> String {
    let kdj = &report.kdj;
    Chart::new("KDJ (9, 3, 3)")
        .guide(20.0)
        .guide(80.0)
        .line(Line::new("K", "#1565c0", kdj.iter().map(|p| p.values.k).collect()))
        .line(Line::new("D", "#ef6c00", kdj.iter().map(|p| p.values.d).collect()))
        .line(Line::new("J", "#6a1b9a", kdj.iter().map(|p| p.values.j).collect()))
        .render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_break_on_none() {
        let runs = segments(&[None, Some(1.0), Some(2.0), None, Some(3.0), Some(f64::NAN)]);
        assert_eq!(runs, vec![vec![(1, 1.0), (2, 2.0)], vec![(4, 3.0)]]);
    }

    #[test]
    fn test_render_lines_and_bars() {
        let svg = Chart::new("Test <chart>")
            .bars(vec![1.0, -1.0, 0.5])
            .line(Line::new("A", "#000", vec![Some(1.0), None, Some(2.0)]))
            .guide(0.0)
            .render();

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Test &lt;chart&gt;"));
        assert_eq!(svg.matches("<rect").count(), 3);
        // the gap splits the line into two polylines
        assert_eq!(svg.matches("<polyline").count(), 2);
    }

    #[test]
    fn test_render_empty() {
        let svg = Chart::new("Empty").render();
        assert!(svg.contains("no data"));
    }

    #[test]
    fn test_flat_series_has_finite_coordinates() {
        let svg = Chart::new("Flat")
            .line(Line::new("A", "#000", vec![Some(5.0); 4]))
            .render();
        assert!(!svg.contains("NaN"));
        assert!(!svg.contains("inf"));
    }
}
