use super::{RenderOptions, Renderer};
use crate::error::ListError;
use crate::model::ViewRecord;

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(rows: &[ViewRecord], _options: &RenderOptions) -> Result<String, ListError> {
        let mut encoded = serde_json::to_string_pretty(rows).map_err(|error| ListError::Encoding {
            format: "json",
            message: error.to_string(),
        })?;
        encoded.push('\n');
        Ok(encoded)
    }
}
