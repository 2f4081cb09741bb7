use crate::domain::model::Model;
use crate::utils::error::{DevsError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DIAGRAMMER_URL: &str = "https://colonelpringles.github.io/DEVSDiagrammer/basic.html";

/// Rendering flags understood by the diagram page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    pub squared_models: bool,
    pub show_message_type: bool,
    pub show_port_name: bool,
    pub compress_in_left: bool,
    pub sort_ports_by_name: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            squared_models: false,
            show_message_type: true,
            show_port_name: true,
            compress_in_left: false,
            sort_ports_by_name: true,
        }
    }
}

impl DisplayOptions {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// URL of the diagram page with `options` and `structure` query parameters.
pub fn diagram_url(model: &Model, options: &DisplayOptions) -> Result<Url> {
    diagram_url_with_base(DIAGRAMMER_URL, model, options)
}

pub fn diagram_url_with_base(base: &str, model: &Model, options: &DisplayOptions) -> Result<Url> {
    let structure = model.to_json()?;
    let options = options.to_json()?;
    Url::parse_with_params(base, &[("options", options), ("structure", structure)]).map_err(|e| {
        DevsError::InvalidConfigValueError {
            field: "display.base_url".to_string(),
            value: base.to_string(),
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Coupled;

    #[test]
    fn test_default_options_json() {
        assert_eq!(
            DisplayOptions::default().to_json().unwrap(),
            r#"{"squared_models":false,"show_message_type":true,"show_port_name":true,"compress_in_left":false,"sort_ports_by_name":true}"#
        );
    }

    #[test]
    fn test_diagram_url_round_trips_structure() {
        let model: Model = Coupled::new("top", vec![]).into();
        let url = diagram_url(&model, &DisplayOptions::default()).unwrap();
        assert!(url.as_str().starts_with(DIAGRAMMER_URL));

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0].0, "options");
        assert_eq!(pairs[1].0, "structure");
        let structure: serde_json::Value = serde_json::from_str(&pairs[1].1).unwrap();
        assert_eq!(structure["id"], "top");
    }

    #[test]
    fn test_bad_base_url() {
        let model: Model = Coupled::new("top", vec![]).into();
        assert!(diagram_url_with_base("not a url", &model, &DisplayOptions::default()).is_err());
    }
}
