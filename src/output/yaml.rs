use super::{RenderOptions, Renderer};
use crate::error::ListError;
use crate::model::ViewRecord;

pub struct YamlRenderer;

impl Renderer for YamlRenderer {
    fn render(rows: &[ViewRecord], _options: &RenderOptions) -> Result<String, ListError> {
        serde_yaml::to_string(rows).map_err(|error| ListError::Encoding {
            format: "yaml",
            message: error.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::YamlRenderer;
    use crate::model::ViewRecord;
    use crate::output::{RenderOptions, Renderer};

    #[test]
    fn renders_a_sequence_of_mappings() {
        let rows = vec![
            ViewRecord {
                name: "db".to_string(),
                namespace: "shop".to_string(),
                updated: "20 Aug 23 10:00 +0200".to_string(),
                status: "failed".to_string(),
            },
            ViewRecord {
                name: "web".to_string(),
                namespace: "shop".to_string(),
                updated: "-".to_string(),
                status: "deployed".to_string(),
            },
        ];

        let rendered = YamlRenderer::render(&rows, &RenderOptions::default()).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&rendered).unwrap();
        let sequence = parsed.as_sequence().expect("top level is a sequence");
        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence[0]["name"].as_str(), Some("db"));
        assert_eq!(sequence[1]["updated"].as_str(), Some("-"));
    }

    #[test]
    fn empty_input_is_an_empty_sequence() {
        let rendered = YamlRenderer::render(&[], &RenderOptions::default()).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(parsed.as_sequence().map(Vec::len), Some(0));
    }
}
