use crate::error::SelectorError;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Eq, PartialEq)]
enum Requirement {
    Equals { key: String, value: String },
    NotEquals { key: String, value: String },
}

/// Equality-based label selector: `k=v`, `k==v` and `k!=v` joined by commas.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct LabelSelector {
    requirements: Vec<Requirement>,
}

impl LabelSelector {
    pub fn parse(raw: &str) -> Result<Self, SelectorError> {
        let requirements = raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(parse_requirement)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { requirements })
    }

    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements.iter().all(|requirement| match requirement {
            Requirement::Equals { key, value } => labels.get(key) == Some(value),
            // a missing key satisfies `!=`, same as the API server
            Requirement::NotEquals { key, value } => labels.get(key) != Some(value),
        })
    }
}

fn parse_requirement(part: &str) -> Result<Requirement, SelectorError> {
    let (key, value, negated) = if let Some((key, value)) = part.split_once("!=") {
        (key, value, true)
    } else if let Some((key, value)) = part.split_once("==") {
        (key, value, false)
    } else if let Some((key, value)) = part.split_once('=') {
        (key, value, false)
    } else {
        return Err(SelectorError::MissingOperator(part.to_string()));
    };

    let key = key.trim();
    if key.is_empty() {
        return Err(SelectorError::EmptyKey(part.to_string()));
    }
    let key = key.to_string();
    let value = value.trim().to_string();

    Ok(if negated {
        Requirement::NotEquals { key, value }
    } else {
        Requirement::Equals { key, value }
    })
}
