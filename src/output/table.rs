use comfy_table::{ContentArrangement, Table, presets::NOTHING};

use super::{RenderOptions, Renderer};
use crate::error::ListError;
use crate::model::ViewRecord;

const HEADERS: [&str; 4] = ["NAME", "NAMESPACE", "UPDATED", "STATUS"];

/// Space between columns.
const COLUMN_GAP: u16 = 1;

pub struct TableRenderer;

impl Renderer for TableRenderer {
    fn render(rows: &[ViewRecord], options: &RenderOptions) -> Result<String, ListError> {
        if rows.is_empty() && options.no_headers {
            return Ok(String::new());
        }

        let mut table = Table::new();
        table
            .load_preset(NOTHING)
            .set_content_arrangement(ContentArrangement::Disabled);

        if !options.no_headers {
            table.set_header(HEADERS);
        }
        for row in rows {
            table.add_row([
                row.name.as_str(),
                row.namespace.as_str(),
                row.updated.as_str(),
                row.status.as_str(),
            ]);
        }
        for column in table.column_iter_mut() {
            column.set_padding((0, COLUMN_GAP));
        }

        let mut rendered = table
            .lines()
            .map(|line| line.trim_end().to_string())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        rendered.push('\n');
        Ok(rendered)
    }
}
