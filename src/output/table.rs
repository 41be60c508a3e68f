// SPDX-License-Identifier: Apache-2.0
use std::io::Write;
use comfy_table::{presets, ColumnConstraint, ContentArrangement, Table, Width};
use crate::models::descriptor::Descriptor;

const HEADERS: [&str; 4] = ["Name", "Digest", "Size", "MediaType"];

// Names are padded to at least this width
const NAME_MIN_WIDTH: u16 = 40;

// Spaces after every column but the last
const PADDING: u16 = 2;

/// Borderless table with the descriptor headers, columns separated by their right padding only
fn new_table(descriptors: &[Descriptor]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_content_arrangement(ContentArrangement::Disabled);
    table.set_header(HEADERS);

    let last = HEADERS.len() - 1;
    for (index, column) in table.column_iter_mut().enumerate() {
        column.set_padding((0, if index == last { 0 } else { PADDING }));
    }

    // The boundary counts the padding as well
    let longest_name = descriptors.iter().map(|d| d.name.chars().count()).max().unwrap_or(0);
    if longest_name < NAME_MIN_WIDTH as usize {
        if let Some(column) = table.column_mut(0) {
            column.set_constraint(ColumnConstraint::LowerBoundary(Width::Fixed(NAME_MIN_WIDTH + PADDING)));
        }
    }

    table
}

/// Writes the descriptors as left aligned columns: Name, Digest, Size, MediaType.
/// The header is always written, even without rows.
pub fn write_descriptors<W: Write>(out: &mut W, descriptors: &[Descriptor]) -> std::io::Result<()> {
    let mut table = new_table(descriptors);
    for d in descriptors {
        table.add_row(vec![d.name.clone(), d.digest.to_string(), d.size.to_string(), d.media_type.clone()]);
    }

    writeln!(out, "{}", table.trim_fmt())
}
