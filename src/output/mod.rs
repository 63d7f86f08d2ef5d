mod json;
mod table;
mod yaml;

pub use json::JsonRenderer;
pub use table::TableRenderer;
pub use yaml::YamlRenderer;

use clap::ValueEnum;
use serde::Deserialize;
use std::io::Write;

use crate::error::ListError;
use crate::model::ViewRecord;

#[derive(ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub no_headers: bool,
}

/// Encodes a whole listing into one buffer.
pub trait Renderer {
    fn render(rows: &[ViewRecord], options: &RenderOptions) -> Result<String, ListError>;
}

impl OutputFormat {
    pub fn render(self, rows: &[ViewRecord], options: &RenderOptions) -> Result<String, ListError> {
        match self {
            Self::Table => TableRenderer::render(rows, options),
            Self::Json => JsonRenderer::render(rows, options),
            Self::Yaml => YamlRenderer::render(rows, options),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// Renders fully before touching the sink, then writes the buffer once.
pub fn emit<W>(
    sink: &mut W,
    format: OutputFormat,
    rows: &[ViewRecord],
    options: &RenderOptions,
) -> Result<(), ListError>
where
    W: Write,
{
    let buffer = format.render(rows, options)?;
    sink.write_all(buffer.as_bytes())
        .and_then(|()| sink.flush())
        .map_err(|error| ListError::Encoding {
            format: format.label(),
            message: error.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::{OutputFormat, RenderOptions, emit};
    use crate::model::ViewRecord;

    fn rows() -> Vec<ViewRecord> {
        vec![ViewRecord {
            name: "web".to_string(),
            namespace: "shop".to_string(),
            updated: "23 Aug 23 16:18 +0200".to_string(),
            status: "deployed".to_string(),
        }]
    }

    #[test]
    fn emit_writes_the_rendered_buffer() {
        let mut sink = Vec::new();
        emit(&mut sink, OutputFormat::Json, &rows(), &RenderOptions::default()).unwrap();
        let written = String::from_utf8(sink).unwrap();
        assert_eq!(
            written,
            OutputFormat::Json
                .render(&rows(), &RenderOptions::default())
                .unwrap()
        );
    }

    #[test]
    fn empty_listings_keep_their_container_shape() {
        let options = RenderOptions::default();
        assert_eq!(OutputFormat::Json.render(&[], &options).unwrap().trim(), "[]");
        assert_eq!(OutputFormat::Yaml.render(&[], &options).unwrap().trim(), "[]");

        let table = OutputFormat::Table.render(&[], &options).unwrap();
        let words = table.split_whitespace().collect::<Vec<_>>();
        assert_eq!(words, vec!["NAME", "NAMESPACE", "UPDATED", "STATUS"]);

        let bare = OutputFormat::Table
            .render(&[], &RenderOptions { no_headers: true })
            .unwrap();
        assert!(bare.is_empty());
    }
}
