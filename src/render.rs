use crate::guillotine::Sheet;

/// Drawing units per sheet unit.
pub const DEFAULT_SCALE: f64 = 0.3;
const PADDING: f64 = 20.0;
const SHEET_MARGIN: f64 = 50.0;

pub fn render_svg(sheets: &[Sheet]) -> String {
    render_svg_scaled(sheets, DEFAULT_SCALE)
}

/// Draws the sheets stacked top to bottom: each sheet outlined and labeled,
/// placed parts filled and named, cuts dashed and numbered.
pub fn render_svg_scaled(sheets: &[Sheet], scale: f64) -> String {
    let mut max_width = 0.0f64;
    let mut total_height = PADDING;
    for sheet in sheets {
        let stock = sheet.stock();
        max_width = max_width.max(stock.w as f64 * scale + 2.0 * PADDING);
        total_height += stock.h as f64 * scale + SHEET_MARGIN;
    }

    let mut svg = vec![format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{max_width}" height="{total_height}" viewBox="0 0 {max_width} {total_height}">"#
    )];

    let mut current_y = PADDING;
    for (si, sheet) in sheets.iter().enumerate() {
        let sheet_x = PADDING;
        let sheet_y = current_y;
        let sheet_w = sheet.stock().w as f64 * scale;
        let sheet_h = sheet.stock().h as f64 * scale;

        svg.push(format!(
            r##"<rect x="{sheet_x}" y="{sheet_y}" width="{sheet_w}" height="{sheet_h}" fill="#f9f9f9" stroke="black" stroke-width="1"/>"##
        ));
        svg.push(format!(
            r#"<text x="{sheet_x}" y="{}" font-size="12" fill="black">Sheet {}</text>"#,
            sheet_y - 5.0,
            si + 1
        ));

        for p in &sheet.placements {
            let px = sheet_x + p.x as f64 * scale;
            let py = sheet_y + p.y as f64 * scale;
            let pw = p.rect.w as f64 * scale;
            let ph = p.rect.h as f64 * scale;
            svg.push(format!(
                r##"<rect x="{px}" y="{py}" width="{pw}" height="{ph}" fill="#b3cde0" stroke="blue" stroke-width="0.5"/>"##
            ));
            svg.push(format!(
                r#"<text x="{}" y="{}" font-size="10" fill="black">{}</text>"#,
                px + 2.0,
                py + 12.0,
                svg_escape(&p.part_name)
            ));
        }

        for cut in &sheet.cuts {
            let x1 = sheet_x + cut.x1 as f64 * scale;
            let y1 = sheet_y + cut.y1 as f64 * scale;
            let x2 = sheet_x + cut.x2 as f64 * scale;
            let y2 = sheet_y + cut.y2 as f64 * scale;
            svg.push(format!(
                r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="red" stroke-dasharray="4,2" stroke-width="0.8"/>"#
            ));
            svg.push(format!(
                r#"<text x="{}" y="{}" font-size="8" fill="red">{}</text>"#,
                (x1 + x2) / 2.0 + 3.0,
                (y1 + y2) / 2.0 - 3.0,
                cut.index
            ));
        }

        current_y += sheet_h + SHEET_MARGIN;
    }

    svg.push("</svg>".to_string());
    svg.concat()
}

fn svg_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
