//! Raw, schema-level view of a declaration document
//!
//! These types mirror the YAML keys one-to-one. Every field is optional here;
//! defaults and validation are applied when the raw document is turned into an
//! [`EnvironmentDeclaration`](crate::EnvironmentDeclaration).

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::FieldIssue;

/// A scalar that may be written as a string, number or boolean in YAML.
///
/// Environment variable values like `PORT: 8080` are common in declarations,
/// so scalars are accepted and converted to text. Numbers are converted from
/// their parsed value, not their written form: `1.10` becomes `"1.1"` and a
/// long run of digits may come back in exponent notation. Values whose exact
/// spelling matters must be quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarString(pub String);

impl<'de> Deserialize<'de> for ScalarString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Self(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            Value::Bool(b) => Ok(Self(b.to_string())),
            Value::Null => Ok(Self(String::new())),
            other => Err(de::Error::custom(format!(
                "expected a scalar value, found {}",
                value_kind(&other)
            ))),
        }
    }
}

impl From<ScalarString> for String {
    fn from(value: ScalarString) -> Self {
        value.0
    }
}

/// Environment description: either one string or a list of lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Text(String),
    Lines(Vec<String>),
}

impl Default for Description {
    fn default() -> Self {
        Description::Text(String::new())
    }
}

/// One `environmentVariables` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    #[serde(default, deserialize_with = "scalar_or_empty")]
    pub value: String,
}

/// Top-level keys recognized in `environment.yaml`. Unknown keys are ignored.
#[derive(Debug, Default)]
pub(crate) struct RawDeclaration {
    pub name: Option<ScalarString>,
    pub image: Option<String>,
    pub dockerfile_instructions: Option<String>,
    pub environment_variables: Option<Vec<EnvironmentVariable>>,
    pub pre_setup_script: Option<String>,
    pub post_setup_script: Option<String>,
    pub pre_run_script: Option<String>,
    pub post_run_script: Option<String>,
    pub skip_cache: Option<bool>,
    pub summary: Option<String>,
    pub tags: Option<Vec<ScalarString>>,
    pub use_vpn: Option<bool>,
    pub description: Option<Description>,
    pub is_restricted: Option<bool>,
    pub organization_owner_id: Option<ScalarString>,
    pub visibility: Option<String>,
    pub supported_clusters: Option<Vec<ScalarString>>,
    pub pluggable_workspace_tools: Option<Mapping>,
}

impl RawDeclaration {
    /// Read every recognized key of a top-level mapping.
    ///
    /// Keys are read one at a time: a wrongly typed value becomes an issue
    /// against its own key and the rest of the document is still read.
    pub(crate) fn from_mapping(map: &Mapping, issues: &mut Vec<FieldIssue>) -> Self {
        Self {
            name: field(map, "name", issues),
            image: field(map, "image", issues),
            dockerfile_instructions: field(map, "dockerfileInstructions", issues),
            environment_variables: field(map, "environmentVariables", issues),
            pre_setup_script: field(map, "preSetupScript", issues),
            post_setup_script: field(map, "postSetupScript", issues),
            pre_run_script: field(map, "preRunScript", issues),
            post_run_script: field(map, "postRunScript", issues),
            skip_cache: field(map, "skipCache", issues),
            summary: field(map, "summary", issues),
            tags: field(map, "tags", issues),
            use_vpn: field(map, "useVpn", issues),
            description: field(map, "description", issues),
            is_restricted: field(map, "isRestricted", issues),
            organization_owner_id: owner_id(map, issues),
            visibility: field(map, "visibility", issues),
            supported_clusters: field(map, "supportedClusters", issues),
            pluggable_workspace_tools: field(map, "pluggableWorkspaceTools", issues),
        }
    }
}

/// Deserialize one key of `map`. Absent and null keys are `None`.
fn field<T: DeserializeOwned>(
    map: &Mapping,
    key: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<T> {
    let value = map.get(key)?;
    match serde_yaml::from_value::<Option<T>>(value.clone()) {
        Ok(parsed) => parsed,
        Err(e) => {
            issues.push(FieldIssue::new(key, e.to_string()));
            None
        }
    }
}

// An unquoted all-digit id is read as a number and loses its written form
fn owner_id(map: &Mapping, issues: &mut Vec<FieldIssue>) -> Option<ScalarString> {
    if let Some(Value::Number(n)) = map.get("organizationOwnerId") {
        issues.push(FieldIssue::new(
            "organizationOwnerId",
            format!("was read as the number {n}; quote the id so it is read as text"),
        ));
        return None;
    }
    field(map, "organizationOwnerId", issues)
}

/// One entry of `pluggableWorkspaceTools`.
///
/// `title`, `iconUrl` and `start` distinguish "key absent" (outer `None`) from
/// "key present but null" (`Some(None)`); only the former is an error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTool {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub icon_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub start: Option<Option<Vec<String>>>,
    pub supported_file_extensions: Option<Vec<String>>,
    pub http_proxy: Option<RawProxy>,
}

/// `httpProxy` block of a workspace tool
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawProxy {
    pub port: Option<u16>,
    pub internal_path: Option<String>,
    pub require_subdomain: Option<bool>,
    pub rewrite: Option<bool>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn scalar_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    ScalarString::deserialize(deserializer).map(String::from)
}

/// Name of a YAML value's kind, for error messages
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn read(yaml: &str) -> (RawDeclaration, Vec<FieldIssue>) {
        let map: Mapping = serde_yaml::from_str(yaml).unwrap();
        let mut issues = Vec::new();
        let raw = RawDeclaration::from_mapping(&map, &mut issues);
        (raw, issues)
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let (raw, issues) = read("name: demo\nsomethingElse: 42\n");
        assert_eq!(raw.name, Some(ScalarString("demo".into())));
        assert!(issues.is_empty());
    }

    #[test]
    fn numeric_variable_values_are_stringified() {
        let (raw, _) = read(
            "environmentVariables:\n\
             \x20 - name: PORT\n    value: 8080\n\
             \x20 - name: DEBUG\n    value: true\n",
        );
        let vars = raw.environment_variables.unwrap();
        assert_eq!(vars[0].value, "8080");
        assert_eq!(vars[1].value, "true");
    }

    #[test]
    fn description_accepts_text_or_lines() {
        let (text, _) = read("description: one line\n");
        assert_eq!(text.description, Some(Description::Text("one line".into())));

        let (lines, _) = read("description:\n  - first\n  - second\n");
        assert_eq!(
            lines.description,
            Some(Description::Lines(vec!["first".into(), "second".into()]))
        );
    }

    #[test]
    fn null_keys_read_as_absent() {
        let (raw, issues) = read("name: ~\ntags: ~\nskipCache: ~\n");
        assert!(raw.name.is_none());
        assert!(raw.tags.is_none());
        assert!(raw.skip_cache.is_none());
        assert!(issues.is_empty());
    }

    #[test]
    fn tool_distinguishes_absent_and_null_title() {
        let absent: RawTool = serde_yaml::from_str("iconUrl: x\nstart: [a]\n").unwrap();
        assert!(absent.title.is_none());

        let null: RawTool = serde_yaml::from_str("title: ~\niconUrl: x\nstart: [a]\n").unwrap();
        assert_eq!(null.title, Some(None));
    }

    #[test]
    fn wrongly_typed_keys_are_reported_by_name() {
        let (raw, issues) = read("name:\n  nested: true\nskipCache: maybe\nimage: ubuntu\n");

        assert_eq!(raw.image.as_deref(), Some("ubuntu"));
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "skipCache"]);
        assert!(issues[0].message.contains("expected a scalar value"));
        assert!(issues[1].message.contains("expected a boolean"));
    }

    #[test]
    fn numeric_owner_id_asks_for_quotes() {
        let (raw, issues) = read("organizationOwnerId: 123456789012345678901234\n");
        assert!(raw.organization_owner_id.is_none());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "organizationOwnerId");
        assert!(issues[0].message.contains("quote the id"));

        let (quoted, issues) = read("organizationOwnerId: \"123456789012345678901234\"\n");
        assert_eq!(
            quoted.organization_owner_id,
            Some(ScalarString("123456789012345678901234".into()))
        );
        assert!(issues.is_empty());
    }
}
