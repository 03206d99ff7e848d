//! Node model for dbt project resources.
//!
//! A [`DbtNode`] is the validated form of one entry from the manifest's
//! `nodes` or `sources` collections. Raw entries are loosely typed, so all
//! validation and defaulting happens in the single constructor
//! [`DbtNode::from_record`]; downstream code only ever sees fully-formed
//! nodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Resource type of a manifest node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Model,
    Seed,
    Snapshot,
    Test,
    Source,
    Analysis,
    Operation,

    /// Anything the manifest declares that we do not model explicitly.
    Other,
}

impl ResourceType {
    /// Parse a manifest `resource_type` string.
    ///
    /// Unrecognized values map to [`ResourceType::Other`] rather than
    /// failing, so newer dbt versions with new resource kinds still load.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "model" => Self::Model,
            "seed" => Self::Seed,
            "snapshot" => Self::Snapshot,
            "test" => Self::Test,
            "source" => Self::Source,
            "analysis" => Self::Analysis,
            "operation" => Self::Operation,
            _ => Self::Other,
        }
    }

    /// Get the resource type as its manifest string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Seed => "seed",
            Self::Snapshot => "snapshot",
            Self::Test => "test",
            Self::Source => "source",
            Self::Analysis => "analysis",
            Self::Operation => "operation",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One resource in the project graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbtNode {
    /// Unique identifier (e.g., "model.jaffle_shop.customers")
    pub unique_id: String,

    /// Resource type (model, seed, test, etc.)
    pub resource_type: ResourceType,

    /// Package that declares the node
    pub package_name: String,

    /// Relative path to the defining source file
    pub file_path: String,

    /// Unique ids this node consumes, in manifest order
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Tags applied to the node
    #[serde(default)]
    pub tags: Vec<String>,

    /// Node configuration (materialization strategy, etc.), structurally untyped
    #[serde(default)]
    pub config: serde_json::Map<String, Value>,
}

impl DbtNode {
    /// Build a node from a raw manifest entry.
    ///
    /// Returns `None` when the entry has no non-empty `original_file_path`:
    /// such entries originate from external references (e.g. dbt-loom
    /// injected models) and are not first-class project nodes. Missing
    /// `depends_on`, `tags`, and `config` default to empty.
    pub fn from_record(unique_id: &str, record: &Value) -> Option<Self> {
        let file_path = record
            .get("original_file_path")
            .and_then(Value::as_str)
            .unwrap_or("");
        if file_path.is_empty() {
            return None;
        }

        let resource_type = record
            .get("resource_type")
            .and_then(Value::as_str)
            .map(ResourceType::parse)
            .unwrap_or(ResourceType::Other);

        let package_name = record
            .get("package_name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_owned();

        // depends_on.nodes keeps manifest order; duplicates stay as given.
        let depends_on = record
            .pointer("/depends_on/nodes")
            .and_then(Value::as_array)
            .map(|items| string_items(items))
            .unwrap_or_default();

        let tags = record
            .get("tags")
            .and_then(Value::as_array)
            .map(|items| string_items(items))
            .unwrap_or_default();

        let config = record
            .get("config")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Some(Self {
            unique_id: unique_id.to_owned(),
            resource_type,
            package_name,
            file_path: file_path.to_owned(),
            depends_on,
            tags,
            config,
        })
    }

    /// Short name of the node: the last dot-segment of its unique id.
    pub fn name(&self) -> &str {
        self.unique_id
            .rsplit('.')
            .next()
            .unwrap_or(&self.unique_id)
    }
}

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn build_node_from_record() {
        let record = json!({
            "resource_type": "model",
            "package_name": "jaffle_shop",
            "original_file_path": "models/customers.sql",
            "depends_on": {"nodes": ["model.jaffle_shop.stg_customers"]},
            "tags": ["daily"],
            "config": {"materialized": "table"},
        });

        let node = DbtNode::from_record("model.jaffle_shop.customers", &record).unwrap();

        assert_eq!(node.unique_id, "model.jaffle_shop.customers");
        assert_eq!(node.resource_type, ResourceType::Model);
        assert_eq!(node.package_name, "jaffle_shop");
        assert_eq!(node.file_path, "models/customers.sql");
        assert_eq!(node.depends_on, vec!["model.jaffle_shop.stg_customers"]);
        assert_eq!(node.tags, vec!["daily"]);
        assert_eq!(node.config["materialized"], json!("table"));
    }

    #[test]
    fn record_without_file_path_is_excluded() {
        let record = json!({
            "resource_type": "model",
            "package_name": "external_package",
            "depends_on": {"nodes": []},
        });

        assert!(DbtNode::from_record("model.external_package.ext", &record).is_none());
    }

    #[test]
    fn record_with_empty_file_path_is_excluded() {
        let record = json!({
            "resource_type": "model",
            "package_name": "test",
            "original_file_path": "",
        });

        assert!(DbtNode::from_record("model.test.empty_path", &record).is_none());
    }

    #[test]
    fn unknown_resource_type_maps_to_other() {
        let record = json!({
            "resource_type": "exposure",
            "original_file_path": "models/exposures.yml",
        });

        let node = DbtNode::from_record("exposure.pkg.dashboard", &record).unwrap();
        assert_eq!(node.resource_type, ResourceType::Other);
    }

    #[test]
    fn missing_optional_fields_default_to_empty() {
        let record = json!({"original_file_path": "seeds/countries.csv"});

        let node = DbtNode::from_record("seed.pkg.countries", &record).unwrap();
        assert_eq!(node.resource_type, ResourceType::Other);
        assert_eq!(node.package_name, "");
        assert!(node.depends_on.is_empty());
        assert!(node.tags.is_empty());
        assert!(node.config.is_empty());
    }

    #[test]
    fn duplicate_dependencies_are_preserved_in_order() {
        let record = json!({
            "original_file_path": "models/orders.sql",
            "depends_on": {"nodes": ["model.pkg.a", "model.pkg.b", "model.pkg.a"]},
        });

        let node = DbtNode::from_record("model.pkg.orders", &record).unwrap();
        assert_eq!(
            node.depends_on,
            vec!["model.pkg.a", "model.pkg.b", "model.pkg.a"]
        );
    }

    #[test]
    fn node_short_name() {
        let record = json!({"original_file_path": "models/customers.sql"});
        let node = DbtNode::from_record("model.jaffle_shop.customers", &record).unwrap();
        assert_eq!(node.name(), "customers");
    }
}
