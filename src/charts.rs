use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::analysis::{CategoryTotal, MonthTotal};
use crate::error::{CleanError, Result};
use crate::fmt::money;

pub const CATEGORY_CHART: &str = "expenses_by_category.pdf";
pub const MONTHLY_CHART: &str = "monthly_expenses.pdf";

// 8 x 5 in landscape page (mm)
const PAGE_W: f32 = 203.2;
const PAGE_H: f32 = 127.0;
const PLOT_LEFT: f32 = 38.0;
const PLOT_RIGHT: f32 = PAGE_W - 12.0;
const PLOT_BOTTOM: f32 = 30.0;
const PLOT_TOP: f32 = PAGE_H - 22.0;
const TITLE_SIZE: f32 = 14.0;
const LABEL_SIZE: f32 = 8.0;
const TICKS: usize = 4;
const MARKER: f32 = 1.2;

fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.18
}

fn short_label(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}.")
}

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn pt(x: f32, y: f32) -> (Point, bool) {
    (Point::new(Mm(x), Mm(y)), false)
}

/// Single-page canvas in page coordinates (origin bottom-left).
struct ChartWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    layer: PdfLayerReference,
}

impl ChartWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Chart");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| CleanError::Chart(format!("{e:?}")))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| CleanError::Chart(format!("{e:?}")))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            font,
            font_bold,
            layer,
        })
    }

    fn text(&self, s: &str, x: f32, y: f32, size: f32, bold: bool) {
        let font = if bold { &self.font_bold } else { &self.font };
        self.layer.set_fill_color(rgb(0.0, 0.0, 0.0));
        self.layer.use_text(s, size, Mm(x), Mm(y), font);
    }

    fn text_centered(&self, s: &str, cx: f32, y: f32, size: f32, bold: bool) {
        self.text(s, cx - approx_text_width(s, size) / 2.0, y, size, bold);
    }

    fn line(&self, points: &[(f32, f32)], thickness: f32, color: Color) {
        self.layer.set_outline_color(color);
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: points.iter().map(|&(x, y)| pt(x, y)).collect(),
            is_closed: false,
        });
    }

    fn rect(&self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.layer.set_fill_color(color);
        self.layer.add_polygon(Polygon {
            rings: vec![vec![pt(x, y), pt(x + w, y), pt(x + w, y + h), pt(x, y + h)]],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    /// Title, axis titles, both axes and horizontal grid lines with value labels.
    fn frame(&self, title: &str, x_label: &str, y_label: &str, max: f32) {
        self.text_centered(title, PAGE_W / 2.0, PAGE_H - 12.0, TITLE_SIZE, true);
        self.text_centered(x_label, (PLOT_LEFT + PLOT_RIGHT) / 2.0, 6.0, LABEL_SIZE, true);
        self.text(y_label, 4.0, PLOT_TOP + 6.0, LABEL_SIZE, true);

        let grey = rgb(0.85, 0.85, 0.85);
        for i in 0..=TICKS {
            let frac = i as f32 / TICKS as f32;
            let y = PLOT_BOTTOM + frac * (PLOT_TOP - PLOT_BOTTOM);
            if i > 0 {
                self.line(&[(PLOT_LEFT, y), (PLOT_RIGHT, y)], 0.3, grey.clone());
            }
            let value = Decimal::from_f32_retain(max * frac).unwrap_or_default();
            let label = money(value);
            self.text(&label, PLOT_LEFT - 2.0 - approx_text_width(&label, LABEL_SIZE), y - 1.0, LABEL_SIZE, false);
        }

        let black = rgb(0.0, 0.0, 0.0);
        self.line(&[(PLOT_LEFT, PLOT_TOP), (PLOT_LEFT, PLOT_BOTTOM), (PLOT_RIGHT, PLOT_BOTTOM)], 0.6, black);
    }

    fn no_data(&self) {
        self.text_centered(
            "No expense data",
            (PLOT_LEFT + PLOT_RIGHT) / 2.0,
            (PLOT_BOTTOM + PLOT_TOP) / 2.0,
            LABEL_SIZE,
            false,
        );
    }

    fn to_bytes(self) -> Result<Vec<u8>> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| CleanError::Chart(format!("{e:?}")))?;
        buf.into_inner().map_err(|e| CleanError::Chart(e.to_string()))
    }
}

/// Top of the y axis: the largest value, or 1 so an all-zero chart still has a scale.
fn axis_max(values: impl Iterator<Item = Decimal>) -> f32 {
    let max = values
        .filter_map(|v| v.to_f32())
        .fold(0.0f32, f32::max);
    if max > 0.0 { max } else { 1.0 }
}

fn y_for(value: Decimal, max: f32) -> f32 {
    let v = value.to_f32().unwrap_or(0.0);
    PLOT_BOTTOM + (v / max) * (PLOT_TOP - PLOT_BOTTOM)
}

// ---------------------------------------------------------------------------
// Render functions
// ---------------------------------------------------------------------------

/// Bar chart of expense totals per category, in the order given.
pub fn render_category_chart(items: &[CategoryTotal]) -> Result<Vec<u8>> {
    let chart = ChartWriter::new("Expenses by Category")?;
    let max = axis_max(items.iter().map(|c| c.total));
    chart.frame("Expenses by Category", "Category", "Amount (R$)", max);

    if items.is_empty() {
        chart.no_data();
        return chart.to_bytes();
    }

    let slot = (PLOT_RIGHT - PLOT_LEFT) / items.len() as f32;
    let bar_w = slot * 0.6;
    let max_chars = ((slot / (LABEL_SIZE * 0.18)) as usize).max(3);
    for (i, item) in items.iter().enumerate() {
        let x = PLOT_LEFT + slot * i as f32 + (slot - bar_w) / 2.0;
        let h = y_for(item.total, max) - PLOT_BOTTOM;
        chart.rect(x, PLOT_BOTTOM, bar_w, h, rgb(0.12, 0.47, 0.71));
        let label = short_label(&item.category, max_chars);
        chart.text_centered(&label, x + bar_w / 2.0, PLOT_BOTTOM - 5.0, LABEL_SIZE, false);
    }
    chart.to_bytes()
}

/// Line chart with point markers of monthly expense totals.
pub fn render_monthly_chart(months: &[MonthTotal]) -> Result<Vec<u8>> {
    let chart = ChartWriter::new("Monthly Expenses")?;
    let max = axis_max(months.iter().map(|m| m.total));
    chart.frame("Monthly Expenses", "Month", "Amount (R$)", max);

    if months.is_empty() {
        chart.no_data();
        return chart.to_bytes();
    }

    let width = PLOT_RIGHT - PLOT_LEFT;
    let step = if months.len() > 1 {
        (width - 10.0) / (months.len() - 1) as f32
    } else {
        0.0
    };
    let points: Vec<(f32, f32)> = months
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let x = if months.len() > 1 {
                PLOT_LEFT + 5.0 + step * i as f32
            } else {
                PLOT_LEFT + width / 2.0
            };
            (x, y_for(m.total, max))
        })
        .collect();

    let blue = rgb(0.12, 0.47, 0.71);
    if points.len() > 1 {
        chart.line(&points, 1.0, blue.clone());
    }
    // Skip labels so they stay readable on long ranges.
    let every = (months.len() / 12).max(1);
    for (i, ((x, y), m)) in points.iter().zip(months).enumerate() {
        chart.rect(x - MARKER, y - MARKER, MARKER * 2.0, MARKER * 2.0, blue.clone());
        if i % every == 0 {
            chart.text_centered(&m.label(), *x, PLOT_BOTTOM - 5.0, LABEL_SIZE, false);
        }
    }
    chart.to_bytes()
}

fn write_chart(bytes: &[u8], path: &Path) -> Result<()> {
    std::fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), "chart written");
    Ok(())
}

/// Render both charts into `dir`, creating it first. Returns the written paths.
pub fn generate_charts(categories: &[CategoryTotal], months: &[MonthTotal], dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let category_path = dir.join(CATEGORY_CHART);
    write_chart(&render_category_chart(categories)?, &category_path)?;

    let monthly_path = dir.join(MONTHLY_CHART);
    write_chart(&render_monthly_chart(months)?, &monthly_path)?;

    Ok(vec![category_path, monthly_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn categories() -> Vec<CategoryTotal> {
        vec![
            CategoryTotal { category: "aluguel".into(), total: Decimal::new(120000, 2) },
            CategoryTotal { category: "supermercado e feira".into(), total: Decimal::new(45090, 2) },
        ]
    }

    fn months() -> Vec<MonthTotal> {
        (1..=3)
            .map(|m| MonthTotal {
                month: NaiveDate::from_ymd_opt(2024, m, 1).unwrap(),
                total: Decimal::from(100 * m),
            })
            .collect()
    }

    #[test]
    fn test_short_label() {
        assert_eq!(short_label("mercado", 10), "mercado");
        assert_eq!(short_label("supermercado", 6), "super.");
    }

    #[test]
    fn test_axis_max_never_zero() {
        assert_eq!(axis_max(std::iter::empty()), 1.0);
        assert_eq!(axis_max([Decimal::ZERO].into_iter()), 1.0);
        assert_eq!(axis_max([Decimal::from(5), Decimal::from(9)].into_iter()), 9.0);
    }

    #[test]
    fn test_render_category_chart_is_pdf() {
        let bytes = render_category_chart(&categories()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_monthly_chart_is_pdf() {
        let bytes = render_monthly_chart(&months()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        let single = render_monthly_chart(&months()[..1]).unwrap();
        assert!(single.starts_with(b"%PDF"));
    }

    #[test]
    fn test_empty_charts_still_render() {
        assert!(render_category_chart(&[]).unwrap().starts_with(b"%PDF"));
        assert!(render_monthly_chart(&[]).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn test_generate_charts_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports").join("charts");
        let paths = generate_charts(&categories(), &months(), &out).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(out.join(CATEGORY_CHART).exists());
        assert!(out.join(MONTHLY_CHART).exists());
    }
}
