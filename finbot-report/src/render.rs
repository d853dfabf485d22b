//! PNG rendering on plotters' bitmap backend.
//!
//! Text uses the bundled DejaVu Sans registered through `ab_glyph`, so
//! rendering needs no system fonts. Only the normal style is registered.

use anyhow::{Context, Result, anyhow};
use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontStyle, register_font};
use std::io::Cursor;
use std::sync::OnceLock;

use crate::charts::{Chart, ChartData, ChartKind};

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 720;

const FONT: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const LIGHT_CORAL: RGBColor = RGBColor(240, 128, 128);
const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const DARK_GREEN: RGBColor = RGBColor(0, 128, 0);

// Set3-like pastel cycle for pie slices.
const PALETTE: [RGBColor; 8] = [
    RGBColor(141, 211, 199),
    RGBColor(190, 186, 218),
    RGBColor(251, 128, 114),
    RGBColor(128, 177, 211),
    RGBColor(253, 180, 98),
    RGBColor(179, 222, 105),
    RGBColor(252, 205, 229),
    RGBColor(188, 128, 189),
];

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub kind: ChartKind,
    pub png: Vec<u8>,
}

fn register_fonts() -> Result<()> {
    static REGISTERED: OnceLock<std::result::Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            register_font(FONT, FontStyle::Normal, FONT_BYTES)
                .map_err(|_| "bundled DejaVu Sans could not be parsed".to_string())
        })
        .clone()
        .map_err(|e| anyhow!("bundled font rejected: {e}"))
}

pub fn render_png(chart: &Chart) -> Result<Vec<u8>> {
    register_fonts()?;

    let mut buf = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;

        let title = chart.kind.title();
        match &chart.data {
            ChartData::Bars { items, axis, money } => {
                let color = if *money { SKY_BLUE } else { LIGHT_CORAL };
                draw_bars(&root, title, axis, items, *money, color)?
            }
            ChartData::Pie { items } => draw_pie(&root, title, items)?,
            ChartData::Columns { items } => draw_columns(&root, title, items)?,
            ChartData::Line {
                points,
                axis,
                filled,
            } => draw_line(&root, title, axis, points, *filled)?,
            ChartData::Comparison { credits, debits } => {
                draw_comparison(&root, title, *credits, *debits)?
            }
        }

        root.present()?;
    }

    encode_png(buf).with_context(|| format!("encode {}", chart.kind.file_name()))
}

pub fn render_all(charts: &[Chart]) -> Result<Vec<RenderedChart>> {
    charts
        .iter()
        .map(|chart| {
            let png = render_png(chart)
                .with_context(|| format!("render {}", chart.kind.key()))?;
            tracing::debug!(chart = chart.kind.key(), bytes = png.len(), "rendered chart");
            Ok(RenderedChart {
                kind: chart.kind,
                png,
            })
        })
        .collect()
}

fn encode_png(buf: Vec<u8>) -> Result<Vec<u8>> {
    let image = image::RgbImage::from_raw(WIDTH, HEIGHT, buf)
        .context("bitmap buffer does not match image size")?;
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image).write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

fn money(v: f64) -> String {
    format!("R$ {v:.2}")
}

fn text(size: i32) -> TextStyle<'static> {
    TextStyle::from((FONT, size).into_font())
}

/// Upper bound for a value axis; never a zero-width range.
fn headroom(max: f64) -> f64 {
    if max > 0.0 { max * 1.15 } else { 1.0 }
}

fn max_value(items: &[(String, f64)]) -> f64 {
    items.iter().map(|(_, v)| *v).fold(0.0, f64::max)
}

/// Label for a category slot; blank between integer positions.
fn slot_label(items: &[(String, f64)], pos: f64) -> String {
    let idx = pos.round();
    if idx < 0.0 || (pos - idx).abs() > 1e-6 {
        return String::new();
    }
    items
        .get(idx as usize)
        .map(|(label, _)| label.clone())
        .unwrap_or_default()
}

fn label_area(items: &[(String, f64)]) -> u32 {
    let widest = items.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    (widest as u32 * 10 + 30).clamp(70, 320)
}

fn slots(n: usize) -> std::ops::Range<f64> {
    -0.5..(n as f64 - 0.5)
}

fn draw_bars(
    root: &Area,
    title: &str,
    axis: &str,
    items: &[(String, f64)],
    money_values: bool,
    color: RGBColor,
) -> Result<()> {
    let max = max_value(items);
    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 30))
        .margin(24)
        .x_label_area_size(50)
        .y_label_area_size(label_area(items))
        .build_cartesian_2d(0f64..headroom(max), slots(items.len()))?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(items.len())
        .y_label_formatter(&|y| slot_label(items, *y))
        .x_desc(axis)
        .label_style((FONT, 16))
        .axis_desc_style((FONT, 18))
        .draw()?;

    chart.draw_series(items.iter().enumerate().map(|(i, (_, v))| {
        let y = i as f64;
        Rectangle::new([(0.0, y - 0.35), (*v, y + 0.35)], color.filled())
    }))?;

    let style = text(16).pos(Pos::new(HPos::Left, VPos::Center));
    chart.draw_series(items.iter().enumerate().map(|(i, (_, v))| {
        let label = if money_values { money(*v) } else { format!("{v:.0}") };
        Text::new(label, (*v + max * 0.01, i as f64), style.clone())
    }))?;

    Ok(())
}

fn draw_columns(root: &Area, title: &str, items: &[(String, f64)]) -> Result<()> {
    let max = max_value(items);
    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 30))
        .margin(24)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d(slots(items.len()), 0f64..headroom(max))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(items.len())
        .x_label_formatter(&|x| slot_label(items, *x))
        .x_desc("Mês/Ano")
        .y_desc("Valor (R$)")
        .label_style((FONT, 16))
        .axis_desc_style((FONT, 18))
        .draw()?;

    chart.draw_series(items.iter().enumerate().map(|(i, (_, v))| {
        let x = i as f64;
        Rectangle::new([(x - 0.35, 0.0), (x + 0.35, *v)], LIGHT_GREEN.filled())
    }))?;

    let style = text(16).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(
        items
            .iter()
            .enumerate()
            .map(|(i, (_, v))| Text::new(money(*v), (i as f64, *v + max * 0.01), style.clone())),
    )?;

    Ok(())
}

fn draw_line(
    root: &Area,
    title: &str,
    axis: &str,
    points: &[(NaiveDate, f64)],
    filled: bool,
) -> Result<()> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Ok(());
    };
    let max = points.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let x_range = (first.0 - Duration::days(1))..(last.0 + Duration::days(1));

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 30))
        .margin(24)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d(x_range, 0f64..headroom(max))?;

    chart
        .configure_mesh()
        .x_labels(10)
        .x_label_formatter(&|d: &NaiveDate| d.format("%d/%m").to_string())
        .x_desc("Data")
        .y_desc(axis)
        .light_line_style(BLACK.mix(0.08))
        .label_style((FONT, 16))
        .axis_desc_style((FONT, 18))
        .draw()?;

    let color = if filled { RED } else { PURPLE };
    if filled {
        chart.draw_series(AreaSeries::new(points.iter().copied(), 0.0, RED.mix(0.25)))?;
    }
    chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(3)))?;
    chart.draw_series(points.iter().map(|&p| Circle::new(p, 5, color.filled())))?;

    Ok(())
}

fn draw_comparison(root: &Area, title: &str, credits: f64, debits: f64) -> Result<()> {
    let balance = credits - debits;
    let top = credits.max(debits).max(balance).max(0.0);
    let bottom = balance.min(0.0);
    let span = (top - bottom).max(1.0);
    let y_range = (bottom - if bottom < 0.0 { span * 0.1 } else { 0.0 })..(top + span * 0.15);

    let bars = [
        ("Créditos".to_string(), credits),
        ("Débitos".to_string(), debits),
    ];

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 30))
        .margin(24)
        .x_label_area_size(50)
        .y_label_area_size(100)
        .build_cartesian_2d(slots(bars.len()), y_range)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len())
        .x_label_formatter(&|x| slot_label(&bars, *x))
        .y_desc("Valor (R$)")
        .label_style((FONT, 16))
        .axis_desc_style((FONT, 18))
        .draw()?;

    let fills = [DARK_GREEN.mix(0.7), RED.mix(0.7)];
    chart.draw_series(bars.iter().zip(fills).enumerate().map(|(i, ((_, v), fill))| {
        let x = i as f64;
        Rectangle::new([(x - 0.3, 0.0), (x + 0.3, *v)], fill.filled())
    }))?;

    let style = text(16).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(
        bars.iter()
            .enumerate()
            .map(|(i, (_, v))| Text::new(money(*v), (i as f64, *v + span * 0.01), style.clone())),
    )?;

    chart.draw_series(LineSeries::new(
        [(-0.5, balance), (1.5, balance)],
        BLUE.mix(0.7).stroke_width(2),
    ))?;
    chart.draw_series(std::iter::once(Text::new(
        format!("Saldo: {}", money(balance)),
        (0.5, balance + span * 0.05),
        text(18).pos(Pos::new(HPos::Center, VPos::Bottom)).color(&BLUE),
    )))?;

    Ok(())
}

fn draw_pie(root: &Area, title: &str, items: &[(String, f64)]) -> Result<()> {
    let area = root.titled(title, (FONT, 30))?;
    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.38;

    let sizes: Vec<f64> = items.iter().map(|(_, v)| *v).collect();
    let labels: Vec<String> = items.iter().map(|(l, _)| l.clone()).collect();
    let colors: Vec<RGBColor> = (0..items.len())
        .map(|i| PALETTE[i % PALETTE.len()])
        .collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style((FONT, 18).into_font().color(&BLACK));
    pie.percentages((FONT, 16).into_font().color(&BLACK));
    area.draw(&pie)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(l, v)| (l.to_string(), *v)).collect()
    }

    #[test]
    fn test_font_registration_is_repeatable() {
        register_fonts().unwrap();
        register_fonts().unwrap();
    }

    #[test]
    fn test_slot_label() {
        let xs = items(&[("pix", 3.0), ("cartao", 1.0)]);
        assert_eq!(slot_label(&xs, 0.0), "pix");
        assert_eq!(slot_label(&xs, 1.0), "cartao");
        assert_eq!(slot_label(&xs, 0.5), "");
        assert_eq!(slot_label(&xs, -1.0), "");
        assert_eq!(slot_label(&xs, 2.0), "");
    }

    #[test]
    fn test_headroom_never_empty() {
        assert_eq!(headroom(0.0), 1.0);
        assert!(headroom(100.0) > 100.0);
    }

    #[test]
    fn test_label_area_bounds() {
        assert_eq!(label_area(&items(&[("a", 1.0)])), 70);
        let long = "x".repeat(200);
        assert_eq!(label_area(&items(&[(long.as_str(), 1.0)])), 320);
    }

    #[test]
    fn test_encode_png_signature() {
        let buf = vec![255u8; (WIDTH * HEIGHT * 3) as usize];
        let png = encode_png(buf).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_encode_png_rejects_short_buffer() {
        assert!(encode_png(vec![0u8; 10]).is_err());
    }
}
