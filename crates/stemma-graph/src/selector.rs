//! Named selector resolution
//!
//! Manifests can carry the project's selectors.yml as a compiled
//! `selectors` table: named, declarative node-set definitions. This module
//! resolves a requested name to the concrete set of unique ids it selects.
//! The selector DSL itself is an external grammar; the resolver only needs
//! a narrow evaluation seam ([`SelectorEvaluator`]), with a default
//! implementation covering what named-set resolution uses in practice.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use stemma_core::{DbtNode, GraphError};

/// A named selector definition as declared in the manifest's `selectors`
/// collection. Read-only input; never mutated by resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectorDefinition {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Whether dbt treats this selector as the project default
    #[serde(default)]
    pub default: bool,

    /// The compiled selector expression, kept structurally untyped
    #[serde(default)]
    pub definition: Value,
}

/// Evaluation seam for the selector DSL.
///
/// Given a compiled definition and the full node mapping, produce the set
/// of unique ids the definition selects. Implementations must be read-only
/// with respect to both inputs.
pub trait SelectorEvaluator {
    fn evaluate(&self, definition: &Value, nodes: &HashMap<String, DbtNode>) -> HashSet<String>;
}

/// Resolve a named selector against the manifest's selector definitions.
///
/// Fails with [`GraphError::SelectorNotFound`] (naming the requested
/// selector) when no definition exists for `name`.
pub fn resolve_selector(
    nodes: &HashMap<String, DbtNode>,
    selectors: &HashMap<String, SelectorDefinition>,
    name: &str,
    evaluator: &dyn SelectorEvaluator,
) -> Result<HashSet<String>, GraphError> {
    let selector = selectors
        .get(name)
        .ok_or_else(|| GraphError::SelectorNotFound(name.to_owned()))?;

    Ok(evaluator.evaluate(&selector.definition, nodes))
}

/// Default evaluator.
///
/// Supports `method`/`value` criteria (`tag`, `fqn`, `package`, `path`,
/// `resource_type`, `config.<key>`), `"method:value"` shorthand strings,
/// and `union` / `intersection` composition with nested `exclude` blocks.
/// Criteria outside this subset select nothing rather than erroring; the
/// full grammar lives in dbt, not here.
pub struct DefaultSelectorEvaluator;

impl SelectorEvaluator for DefaultSelectorEvaluator {
    fn evaluate(&self, definition: &Value, nodes: &HashMap<String, DbtNode>) -> HashSet<String> {
        match definition {
            Value::String(criterion) => self.match_criterion_str(criterion, nodes),
            Value::Array(parts) => self.compose(parts, nodes, false),
            Value::Object(spec) => {
                if let Some(parts) = spec.get("union").and_then(Value::as_array) {
                    self.compose(parts, nodes, false)
                } else if let Some(parts) = spec.get("intersection").and_then(Value::as_array) {
                    self.compose(parts, nodes, true)
                } else if let (Some(method), Some(value)) = (
                    spec.get("method").and_then(Value::as_str),
                    spec.get("value").and_then(Value::as_str),
                ) {
                    self.match_method(method, value, nodes)
                } else {
                    HashSet::new()
                }
            }
            _ => HashSet::new(),
        }
    }
}

impl DefaultSelectorEvaluator {
    /// Combine a list of sub-definitions. `{"exclude": [...]}` entries are
    /// collected and subtracted from whatever the remaining entries select.
    fn compose(
        &self,
        parts: &[Value],
        nodes: &HashMap<String, DbtNode>,
        intersect: bool,
    ) -> HashSet<String> {
        let mut selected: Option<HashSet<String>> = None;
        let mut excluded: HashSet<String> = HashSet::new();

        for part in parts {
            if let Some(exclusions) = part.get("exclude").and_then(Value::as_array) {
                excluded.extend(self.compose(exclusions, nodes, false));
                continue;
            }

            let set = self.evaluate(part, nodes);
            selected = Some(match selected {
                None => set,
                Some(acc) if intersect => acc.intersection(&set).cloned().collect(),
                Some(mut acc) => {
                    acc.extend(set);
                    acc
                }
            });
        }

        let mut result = selected.unwrap_or_default();
        result.retain(|id| !excluded.contains(id));
        result
    }

    /// `"tag:daily"` style shorthand; a bare string matches by fqn.
    fn match_criterion_str(
        &self,
        criterion: &str,
        nodes: &HashMap<String, DbtNode>,
    ) -> HashSet<String> {
        match criterion.split_once(':') {
            Some((method, value)) => self.match_method(method, value, nodes),
            None => self.match_method("fqn", criterion, nodes),
        }
    }

    fn match_method(
        &self,
        method: &str,
        value: &str,
        nodes: &HashMap<String, DbtNode>,
    ) -> HashSet<String> {
        nodes
            .iter()
            .filter(|(_, node)| node_matches(node, method, value))
            .map(|(unique_id, _)| unique_id.clone())
            .collect()
    }
}

fn node_matches(node: &DbtNode, method: &str, value: &str) -> bool {
    match method {
        "tag" => node.tags.iter().any(|tag| tag == value),
        "fqn" => node.name() == value || node.unique_id == value,
        "package" => node.package_name == value,
        "path" => {
            node.file_path == value || Path::new(&node.file_path).starts_with(value)
        }
        "resource_type" => node.resource_type.as_str() == value,
        _ => match method.strip_prefix("config.") {
            Some(key) => node
                .config
                .get(key)
                .map(|v| match v {
                    Value::String(s) => s == value,
                    other => other.to_string() == value,
                })
                .unwrap_or(false),
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(unique_id: &str, record: Value) -> (String, DbtNode) {
        let node = DbtNode::from_record(unique_id, &record).unwrap();
        (unique_id.to_owned(), node)
    }

    fn sample_nodes() -> HashMap<String, DbtNode> {
        HashMap::from([
            node(
                "model.jaffle_shop.customers",
                json!({
                    "resource_type": "model",
                    "package_name": "jaffle_shop",
                    "original_file_path": "models/marts/customers.sql",
                    "tags": ["daily"],
                    "config": {"materialized": "table"},
                }),
            ),
            node(
                "model.jaffle_shop.stg_customers",
                json!({
                    "resource_type": "model",
                    "package_name": "jaffle_shop",
                    "original_file_path": "models/staging/stg_customers.sql",
                    "tags": ["daily", "staging"],
                    "config": {"materialized": "view"},
                }),
            ),
            node(
                "seed.jaffle_shop.raw_customers",
                json!({
                    "resource_type": "seed",
                    "package_name": "jaffle_shop",
                    "original_file_path": "seeds/raw_customers.csv",
                }),
            ),
        ])
    }

    fn selectors(name: &str, definition: Value) -> HashMap<String, SelectorDefinition> {
        HashMap::from([(
            name.to_owned(),
            SelectorDefinition {
                name: name.to_owned(),
                definition,
                ..SelectorDefinition::default()
            },
        )])
    }

    fn resolve(name: &str, table: &HashMap<String, SelectorDefinition>) -> HashSet<String> {
        resolve_selector(&sample_nodes(), table, name, &DefaultSelectorEvaluator).unwrap()
    }

    #[test]
    fn unknown_selector_fails_with_its_name() {
        let err = resolve_selector(
            &sample_nodes(),
            &HashMap::new(),
            "nonexistent_selector",
            &DefaultSelectorEvaluator,
        )
        .unwrap_err();

        assert!(matches!(err, GraphError::SelectorNotFound(_)));
        assert!(err.to_string().contains("nonexistent_selector"));
    }

    #[test]
    fn method_criterion_selects_by_tag() {
        let table = selectors("daily", json!({"method": "tag", "value": "daily"}));
        let ids = resolve("daily", &table);

        assert_eq!(ids.len(), 2);
        assert!(ids.contains("model.jaffle_shop.customers"));
        assert!(ids.contains("model.jaffle_shop.stg_customers"));
    }

    #[test]
    fn fqn_criterion_matches_node_name() {
        let table = selectors("fqn_customers", json!({"method": "fqn", "value": "customers"}));
        let ids = resolve("fqn_customers", &table);

        assert_eq!(ids, HashSet::from(["model.jaffle_shop.customers".to_owned()]));
    }

    #[test]
    fn shorthand_string_criterion() {
        let table = selectors("staged", json!("tag:staging"));
        let ids = resolve("staged", &table);

        assert_eq!(
            ids,
            HashSet::from(["model.jaffle_shop.stg_customers".to_owned()])
        );
    }

    #[test]
    fn bare_string_matches_by_name() {
        let table = selectors("one_seed", json!("raw_customers"));
        let ids = resolve("one_seed", &table);

        assert_eq!(
            ids,
            HashSet::from(["seed.jaffle_shop.raw_customers".to_owned()])
        );
    }

    #[test]
    fn union_with_exclude() {
        let table = selectors(
            "daily_without_staging",
            json!({"union": [
                {"method": "tag", "value": "daily"},
                {"exclude": [{"method": "tag", "value": "staging"}]},
            ]}),
        );
        let ids = resolve("daily_without_staging", &table);

        assert_eq!(ids, HashSet::from(["model.jaffle_shop.customers".to_owned()]));
    }

    #[test]
    fn intersection_of_criteria() {
        let table = selectors(
            "daily_views",
            json!({"intersection": [
                {"method": "tag", "value": "daily"},
                {"method": "config.materialized", "value": "view"},
            ]}),
        );
        let ids = resolve("daily_views", &table);

        assert_eq!(
            ids,
            HashSet::from(["model.jaffle_shop.stg_customers".to_owned()])
        );
    }

    #[test]
    fn path_criterion_matches_by_prefix() {
        let table = selectors("staging_dir", json!({"method": "path", "value": "models/staging"}));
        let ids = resolve("staging_dir", &table);

        assert_eq!(
            ids,
            HashSet::from(["model.jaffle_shop.stg_customers".to_owned()])
        );
    }

    #[test]
    fn resource_type_criterion() {
        let table = selectors("seeds", json!({"method": "resource_type", "value": "seed"}));
        let ids = resolve("seeds", &table);

        assert_eq!(
            ids,
            HashSet::from(["seed.jaffle_shop.raw_customers".to_owned()])
        );
    }

    #[test]
    fn unsupported_criterion_selects_nothing() {
        let table = selectors("weird", json!({"method": "state", "value": "modified"}));
        assert!(resolve("weird", &table).is_empty());
    }
}
