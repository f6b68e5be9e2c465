//! Static table output for non-interactive runs (`--table`).

use unicode_width::UnicodeWidthStr;

use crate::item::Item;
use crate::text;

const NAME_WIDTH: usize = 30;
const BODY_WIDTH: usize = 80;
const HEADERS: [&str; 3] = ["User", "Text", "URL"];

pub fn render(items: &[Item]) -> String {
    let rows: Vec<[String; 3]> = items
        .iter()
        .map(|item| {
            [
                text::truncate_width(&item.display_name, NAME_WIDTH),
                text::truncate_width(
                    &text::decode_entities(&text::collapse_newlines(&item.body)),
                    BODY_WIDTH,
                ),
                item.url.clone(),
            ]
        })
        .collect();

    let mut widths = [
        UnicodeWidthStr::width(HEADERS[0]),
        UnicodeWidthStr::width(HEADERS[1]),
        UnicodeWidthStr::width(HEADERS[2]),
    ];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    let header = HEADERS.map(String::from);
    let mut out = String::new();
    push_rule(&mut out, &widths);
    push_row(&mut out, &header, &widths);
    push_rule(&mut out, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    push_rule(&mut out, &widths);
    out
}

fn push_rule(out: &mut String, widths: &[usize; 3]) {
    for width in widths {
        out.push('+');
        out.push_str(&"-".repeat(*width + 2));
    }
    out.push_str("+\n");
}

fn push_row(out: &mut String, cells: &[String; 3], widths: &[usize; 3]) {
    for (cell, width) in cells.iter().zip(widths.iter()) {
        let pad = width.saturating_sub(UnicodeWidthStr::width(cell.as_str()));
        out.push_str("| ");
        out.push_str(cell);
        out.push_str(&" ".repeat(pad));
        out.push(' ');
    }
    out.push_str("|\n");
}
