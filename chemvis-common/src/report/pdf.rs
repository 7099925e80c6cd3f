//! PDF rendering for [`ReportContent`]
//!
//! Layout works in PDF points on a US Letter page and produces a list of
//! draw operations per page; painting then replays them through printpdf.
//! Coordinates have their origin at the bottom-left corner of the page.

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;

use super::ReportContent;
use crate::{Error, Result};

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN_SIDE: f32 = 72.0;
const MARGIN_TOP: f32 = 72.0;
const MARGIN_BOTTOM: f32 = 36.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_SIDE;

const ROW_HEIGHT: f32 = 22.0;
const CELL_FONT_SIZE: f32 = 9.0;
const HEADER_FONT_SIZE: f32 = 10.0;

// Builtin Helvetica has no metrics API; average glyph width is close to half the size.
const GLYPH_WIDTH_RATIO: f32 = 0.52;

type Rgb3 = (f32, f32, f32);

const SLATE_900: Rgb3 = (0.118, 0.161, 0.231);
const SLATE_700: Rgb3 = (0.200, 0.255, 0.333);
const SLATE_200: Rgb3 = (0.886, 0.910, 0.941);
const SLATE_50: Rgb3 = (0.973, 0.980, 0.988);
const BLUE_500: Rgb3 = (0.231, 0.510, 0.965);
const GRAY: Rgb3 = (0.5, 0.5, 0.5);
const WHITE: Rgb3 = (1.0, 1.0, 1.0);
const WHITESMOKE: Rgb3 = (0.961, 0.961, 0.961);

#[derive(Debug, Clone)]
enum Op {
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        color: Rgb3,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb3,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        thickness: f32,
        color: Rgb3,
    },
}

struct TableStyle {
    header_fill: Rgb3,
    body_fill: Option<Rgb3>,
    zebra: bool,
    grid: Rgb3,
}

/// Accumulates draw operations, breaking pages as the cursor runs out of room
struct Layout {
    pages: Vec<Vec<Op>>,
    /// Top of the free area on the current page
    cursor: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            cursor: PAGE_HEIGHT - MARGIN_TOP,
        }
    }

    fn push(&mut self, op: Op) {
        if let Some(page) = self.pages.last_mut() {
            page.push(op);
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor = PAGE_HEIGHT - MARGIN_TOP;
    }

    fn ensure(&mut self, height: f32) {
        if self.cursor - height < MARGIN_BOTTOM {
            self.new_page();
        }
    }

    fn space(&mut self, height: f32) {
        self.cursor -= height;
    }

    fn text(&mut self, text: &str, x: f32, y: f32, size: f32, bold: bool, color: Rgb3) {
        self.push(Op::Text {
            text: pdf_safe(text),
            x,
            y,
            size,
            bold,
            color,
        });
    }

    fn centered_text(&mut self, text: &str, size: f32, bold: bool, color: Rgb3) {
        self.ensure(size * 1.4);
        let x = (PAGE_WIDTH - text_width(text, size)) / 2.0;
        self.cursor -= size;
        let y = self.cursor;
        self.text(text, x, y, size, bold, color);
        self.cursor -= size * 0.4;
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb3) {
        self.push(Op::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), thickness: f32, color: Rgb3) {
        self.push(Op::Line {
            from,
            to,
            thickness,
            color,
        });
    }

    /// Section heading; keeps at least `keep_with` points of content on the same page
    fn heading(&mut self, text: &str, keep_with: f32) {
        self.ensure(20.0 + 14.0 + 12.0 + keep_with);
        self.space(20.0 + 14.0);
        let y = self.cursor;
        self.text(text, MARGIN_SIDE, y, 14.0, true, BLUE_500);
        self.space(12.0);
    }

    fn table(&mut self, widths: &[f32], header: &[&str], rows: &[Vec<String>], style: &TableStyle) {
        let total: f32 = widths.iter().sum();
        let left = MARGIN_SIDE + (CONTENT_WIDTH - total).max(0.0) / 2.0;

        self.ensure(ROW_HEIGHT * 2.0);
        self.table_row(left, widths, header, true, style.header_fill, style.grid);

        for (index, row) in rows.iter().enumerate() {
            if self.cursor - ROW_HEIGHT < MARGIN_BOTTOM {
                self.new_page();
                self.table_row(left, widths, header, true, style.header_fill, style.grid);
            }
            let fill = if style.zebra {
                if index % 2 == 0 {
                    WHITESMOKE
                } else {
                    WHITE
                }
            } else {
                style.body_fill.unwrap_or(WHITE)
            };
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            self.table_row(left, widths, &cells, false, fill, style.grid);
        }
    }

    fn table_row(&mut self, left: f32, widths: &[f32], cells: &[&str], header: bool, fill: Rgb3, grid: Rgb3) {
        let top = self.cursor;
        let bottom = top - ROW_HEIGHT;
        let total: f32 = widths.iter().sum();
        let (size, color) = if header {
            (HEADER_FONT_SIZE, WHITESMOKE)
        } else {
            (CELL_FONT_SIZE, SLATE_900)
        };

        self.fill_rect(left, bottom, total, ROW_HEIGHT, fill);
        self.line((left, top), (left + total, top), 0.5, grid);
        self.line((left, bottom), (left + total, bottom), 0.5, grid);

        let mut x = left;
        for (width, cell) in widths.iter().zip(cells) {
            let text = fit_to_width(cell, *width - 8.0, size);
            let text_x = x + (width - text_width(&text, size)) / 2.0;
            let text_y = bottom + (ROW_HEIGHT - size) / 2.0 + size * 0.2;
            self.text(&text, text_x, text_y, size, header, color);
            self.line((x, top), (x, bottom), 0.5, grid);
            x += width;
        }
        self.line((x, top), (x, bottom), 0.5, grid);

        self.cursor = bottom;
    }

    fn bar_chart(&mut self, labels: &[(&str, i64)], axis_max: i64) {
        const DRAWING_HEIGHT: f32 = 200.0;
        const CHART_X: f32 = 50.0;
        const CHART_Y: f32 = 50.0;
        const CHART_WIDTH: f32 = 300.0;
        const CHART_HEIGHT: f32 = 125.0;
        const LABEL_SIZE: f32 = 8.0;

        self.ensure(DRAWING_HEIGHT);
        let origin_x = MARGIN_SIDE + CHART_X;
        let origin_y = self.cursor - DRAWING_HEIGHT + CHART_Y;
        let axis_max = axis_max.max(1);

        // Value axis with integer ticks
        let step = ((axis_max as f32) / 10.0).ceil().max(1.0) as i64;
        let mut tick = 0;
        while tick <= axis_max {
            let y = origin_y + CHART_HEIGHT * tick as f32 / axis_max as f32;
            self.line((origin_x - 4.0, y), (origin_x, y), 0.5, SLATE_700);
            let label = tick.to_string();
            let x = origin_x - 8.0 - text_width(&label, LABEL_SIZE);
            self.text(&label, x, y - LABEL_SIZE * 0.35, LABEL_SIZE, false, SLATE_700);
            tick += step;
        }
        self.line((origin_x, origin_y), (origin_x, origin_y + CHART_HEIGHT), 0.75, SLATE_700);
        self.line((origin_x, origin_y), (origin_x + CHART_WIDTH, origin_y), 0.75, SLATE_700);

        if !labels.is_empty() {
            let band = CHART_WIDTH / labels.len() as f32;
            let bar_width = band * 0.6;
            for (index, (label, count)) in labels.iter().enumerate() {
                let band_left = origin_x + band * index as f32;
                let bar_left = band_left + (band - bar_width) / 2.0;
                let bar_height = CHART_HEIGHT * *count as f32 / axis_max as f32;
                self.fill_rect(bar_left, origin_y, bar_width, bar_height, BLUE_500);

                let value = count.to_string();
                let value_x = bar_left + (bar_width - text_width(&value, LABEL_SIZE)) / 2.0;
                self.text(&value, value_x, origin_y + bar_height + 3.0, LABEL_SIZE, false, SLATE_900);

                let name = fit_to_width(label, band - 2.0, LABEL_SIZE);
                let name_x = band_left + (band - text_width(&name, LABEL_SIZE)) / 2.0;
                self.text(&name, name_x, origin_y - 12.0, LABEL_SIZE, false, SLATE_700);
            }
        }

        self.space(DRAWING_HEIGHT);
    }
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_WIDTH_RATIO
}

/// Truncate with ".." so the text fits `width` points
fn fit_to_width(text: &str, width: f32, size: f32) -> String {
    let max_chars = (width / (size * GLYPH_WIDTH_RATIO)).floor().max(1.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(2);
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str("..");
    truncated
}

/// Builtin PDF fonts only cover Latin-1; replace anything else
fn pdf_safe(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect()
}

fn layout(content: &ReportContent) -> Vec<Vec<Op>> {
    let mut layout = Layout::new();

    // Title block
    layout.centered_text(&content.title, 20.0, true, SLATE_900);
    layout.space(20.0);
    layout.centered_text(&content.subtitle, 10.0, false, GRAY);
    layout.space(30.0);

    // I. Key metrics
    layout.heading("I. Global Summary Metrics", ROW_HEIGHT * 5.0);
    let metric_rows: Vec<Vec<String>> = content
        .metrics
        .iter()
        .map(|m| vec![m.label.to_string(), m.value.clone()])
        .collect();
    layout.table(
        &[200.0, 200.0],
        &["Metric", "Calculated Average / Total"],
        &metric_rows,
        &TableStyle {
            header_fill: SLATE_700,
            body_fill: Some(SLATE_50),
            zebra: false,
            grid: SLATE_200,
        },
    );
    layout.space(30.0);

    // II. Chart
    layout.heading("II. Equipment Distribution Analytics", 200.0);
    let bars: Vec<(&str, i64)> = content
        .distribution
        .iter()
        .map(|row| (row.equipment_type.as_str(), row.count))
        .collect();
    layout.bar_chart(&bars, content.chart_axis_max());
    layout.space(20.0);

    // III. Distribution table
    layout.heading("III. Tabular Distribution", ROW_HEIGHT * 2.0);
    let distribution_rows: Vec<Vec<String>> = content
        .distribution
        .iter()
        .map(|row| {
            vec![
                row.equipment_type.clone(),
                row.count.to_string(),
                format!("{:.1}%", row.percentage),
            ]
        })
        .collect();
    layout.table(
        &[150.0, 125.0, 125.0],
        &["Equipment Type", "Unit Count", "Percentage"],
        &distribution_rows,
        &TableStyle {
            header_fill: BLUE_500,
            body_fill: None,
            zebra: true,
            grid: GRAY,
        },
    );
    layout.space(30.0);

    // IV. Full listing
    layout.heading("IV. Equipment Inventory", ROW_HEIGHT * 2.0);
    let equipment_rows: Vec<Vec<String>> = content
        .equipment
        .iter()
        .map(|item| {
            vec![
                item.equipment_name.clone(),
                item.equipment_type.clone(),
                format!("{:.1}", item.flowrate),
                format!("{:.1}", item.pressure),
                format!("{:.1}", item.temperature),
            ]
        })
        .collect();
    layout.table(
        &[140.0, 108.0, 70.0, 70.0, 80.0],
        &["Name", "Type", "Flowrate", "Pressure", "Temperature"],
        &equipment_rows,
        &TableStyle {
            header_fill: SLATE_700,
            body_fill: None,
            zebra: true,
            grid: SLATE_200,
        },
    );

    layout.pages
}

/// Number of pages the report will occupy
pub(super) fn page_count_for(content: &ReportContent) -> usize {
    layout(content).len()
}

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

fn color((r, g, b): Rgb3) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn report_error(e: impl std::fmt::Display) -> Error {
    Error::Report(e.to_string())
}

fn paint(layer: &PdfLayerReference, op: &Op, regular: &IndirectFontRef, bold: &IndirectFontRef) {
    match op {
        Op::Text {
            text,
            x,
            y,
            size,
            bold: is_bold,
            color: rgb,
        } => {
            layer.set_fill_color(color(*rgb));
            let font = if *is_bold { bold } else { regular };
            layer.use_text(text.clone(), *size, mm(*x), mm(*y), font);
        }
        Op::FillRect {
            x,
            y,
            width,
            height,
            color: rgb,
        } => {
            let corners = [
                (*x, *y),
                (*x + *width, *y),
                (*x + *width, *y + *height),
                (*x, *y + *height),
            ];
            let ring = corners
                .iter()
                .map(|(px, py)| (Point::new(mm(*px), mm(*py)), false))
                .collect();
            layer.set_fill_color(color(*rgb));
            layer.add_polygon(Polygon {
                rings: vec![ring],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            });
        }
        Op::Line {
            from,
            to,
            thickness,
            color: rgb,
        } => {
            layer.set_outline_color(color(*rgb));
            layer.set_outline_thickness(*thickness);
            layer.add_line(Line {
                points: vec![
                    (Point::new(mm(from.0), mm(from.1)), false),
                    (Point::new(mm(to.0), mm(to.1)), false),
                ],
                is_closed: false,
            });
        }
    }
}

pub(super) fn render(content: &ReportContent) -> Result<Vec<u8>> {
    let pages = layout(content);

    let (doc, first_page, first_layer) = PdfDocument::new(
        content.title.as_str(),
        mm(PAGE_WIDTH),
        mm(PAGE_HEIGHT),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(report_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(report_error)?;

    {
        let mut layers = vec![doc.get_page(first_page).get_layer(first_layer)];
        for _ in 1..pages.len() {
            let (page, layer) = doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
            layers.push(doc.get_page(page).get_layer(layer));
        }

        for (layer, ops) in layers.iter().zip(&pages) {
            for op in ops {
                paint(layer, op, &regular, &bold);
            }
        }
    }

    doc.save_to_bytes().map_err(report_error)
}
