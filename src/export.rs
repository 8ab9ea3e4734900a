/*!
Document assembly and export.

A populated registry is the output boundary of the synthesis engine. This
module gives it a concrete face: a `components.schemas`-shaped document that
serializes to JSON or YAML and saves to disk with the format chosen by file
extension. The document-assembly collaborator owns everything beyond that
(paths, operations, info blocks).
*/

use crate::{error::SchemaResult, registry::SchemaRegistry, specification::Schema};
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Output format for a serialized schema document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// The `components` section carrying the named schemas
#[derive(Debug, Clone, Default, Serialize)]
pub struct Components {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,
}

impl Components {
    /// Snapshot a registry's entries in insertion order
    pub fn from_registry(registry: &SchemaRegistry) -> Self {
        Self {
            schemas: registry
                .iter()
                .map(|(name, schema)| (name.to_string(), schema.clone()))
                .collect(),
        }
    }
}

/// Document wrapper around the components section
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaDocument {
    pub components: Components,
}

impl SchemaDocument {
    pub fn from_registry(registry: &SchemaRegistry) -> Self {
        Self {
            components: Components::from_registry(registry),
        }
    }

    /// Export the document as JSON
    pub fn export_json(&self, pretty: bool) -> SchemaResult<String> {
        if pretty {
            Ok(serde_json::to_string_pretty(self)?)
        } else {
            Ok(serde_json::to_string(self)?)
        }
    }

    /// Export the document as YAML
    pub fn export_yaml(&self) -> SchemaResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Save to a file, format chosen by extension
    ///
    /// `.yaml`/`.yml` write YAML; everything else writes pretty JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> SchemaResult<()> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let format = match extension.as_deref() {
            Some("yaml") | Some("yml") => OutputFormat::Yaml,
            _ => OutputFormat::Json,
        };
        self.save_with_format(path, format, true)
    }

    /// Save to a file in an explicit format
    pub fn save_with_format<P: AsRef<Path>>(
        &self,
        path: P,
        format: OutputFormat,
        pretty: bool,
    ) -> SchemaResult<()> {
        let content = match format {
            OutputFormat::Json => self.export_json(pretty)?,
            OutputFormat::Yaml => self.export_yaml()?,
        };
        fs::write(path.as_ref(), content)?;
        Ok(())
    }
}
