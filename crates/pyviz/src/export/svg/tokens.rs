//! SVG rendering for the token table.
//!
//! Two columns, token kind and token text, one row per token in stream order
//! under a bold header row.

use svg::{Document, node::element as svg_element};

use pyviz_core::{
    draw::{Drawable, LayeredOutput, RenderLayer, Text, TextDefinition},
    geometry::{Point, Size},
};
use pyviz_syntax::TokenStream;

use super::Svg;

const TABLE_MARGIN: f32 = 25.0;
const CELL_PADDING: f32 = 10.0;
const TABLE_ROW_HEIGHT: f32 = 24.0;
const MIN_COLUMN_WIDTH: f32 = 60.0;

const HEADERS: [&str; 2] = ["type", "token"];

fn width_of(style: &TextDefinition, content: &str) -> f32 {
    Text::new(style, content).size().width()
}

/// Shows whitespace tokens (`NEWLINE`, `INDENT`, ...) visibly.
fn visible(text: &str) -> String {
    text.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

impl<W> Svg<W> {
    /// Renders `tokens` as a standalone table document.
    pub(super) fn render_tokens(&self, tokens: &TokenStream) -> Document {
        let rows: Vec<[String; 2]> = tokens
            .rows()
            .map(|(kind, text)| [kind.to_string(), visible(text)])
            .collect();

        let text = self.theme.text();
        let header_style = self.theme.header_text();

        let mut columns = [0.0f32; 2];
        for (column, width) in columns.iter_mut().enumerate() {
            let widest = rows
                .iter()
                .map(|row| width_of(text, &row[column]))
                .fold(width_of(&header_style, HEADERS[column]), f32::max);
            *width = (widest + 2.0 * CELL_PADDING).max(MIN_COLUMN_WIDTH);
        }

        let table_width = columns[0] + columns[1];
        let table_height = TABLE_ROW_HEIGHT * (rows.len() + 1) as f32;
        let mut output = LayeredOutput::new();

        // Header and zebra stripes.
        for row in (0..=rows.len()).filter(|row| row % 2 == 0) {
            let stripe = svg_element::Rectangle::new()
                .set("x", TABLE_MARGIN)
                .set("y", TABLE_MARGIN + TABLE_ROW_HEIGHT * row as f32)
                .set("width", table_width)
                .set("height", TABLE_ROW_HEIGHT)
                .set("fill", self.theme.node_fill.to_string())
                .set("fill-opacity", self.theme.node_fill.alpha());
            output.add_to_layer(RenderLayer::Background, Box::new(stripe));
        }

        let frame = svg_element::Rectangle::new()
            .set("x", TABLE_MARGIN)
            .set("y", TABLE_MARGIN)
            .set("width", table_width)
            .set("height", table_height)
            .set("fill", "none")
            .set("stroke", self.theme.node_stroke.to_string());
        output.add_to_layer(RenderLayer::Node, Box::new(frame));

        let divider_x = TABLE_MARGIN + columns[0];
        let divider = svg_element::Line::new()
            .set("x1", divider_x)
            .set("y1", TABLE_MARGIN)
            .set("x2", divider_x)
            .set("y2", TABLE_MARGIN + table_height)
            .set("stroke", self.theme.node_stroke.to_string())
            .set("stroke-width", 0.5);
        output.add_to_layer(RenderLayer::Node, Box::new(divider));

        let column_x = [TABLE_MARGIN + CELL_PADDING, divider_x + CELL_PADDING];
        let row_y = |row: usize| TABLE_MARGIN + TABLE_ROW_HEIGHT * (row as f32 + 0.5);

        for (column, header) in HEADERS.iter().enumerate() {
            output.merge(
                Text::new(&header_style, header)
                    .render_to_layers(Point::new(column_x[column], row_y(0))),
            );
        }
        for (index, row) in rows.iter().enumerate() {
            for (column, cell) in row.iter().enumerate() {
                let position = Point::new(column_x[column], row_y(index + 1));
                output.merge(Text::new(text, cell).render_to_layers(position));
            }
        }

        let size = Size::new(
            table_width + 2.0 * TABLE_MARGIN,
            table_height + 2.0 * TABLE_MARGIN,
        );
        output
            .render()
            .into_iter()
            .fold(self.document(size), |doc, group| doc.add(group))
    }
}
