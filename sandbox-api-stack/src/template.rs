//! Minimal CloudFormation template model.
//!
//! Resource properties stay as [`serde_json::Value`] since CloudFormation mixes literals with
//! intrinsic functions (`Ref`, `Fn::GetAtt`, `Fn::Sub`) in nearly every field.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Value, json};

use crate::error::StackError;

const FORMAT_VERSION: &str = "2010-09-09";

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    format_version: &'static str,
    pub description: String,
    pub resources: BTreeMap<String, Resource>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

impl Template {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            description: description.into(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    /// Adds a resource under `logical_id`, refusing ids CloudFormation would reject or that are taken.
    pub fn add_resource(
        &mut self,
        logical_id: impl Into<String>,
        resource: Resource,
    ) -> Result<(), StackError> {
        let logical_id = validate_logical_id(logical_id.into())?;
        if self.resources.contains_key(&logical_id) {
            return Err(StackError::DuplicateLogicalId(logical_id));
        }
        self.resources.insert(logical_id, resource);
        Ok(())
    }

    pub fn add_output(&mut self, logical_id: impl Into<String>, output: Output) -> Result<(), StackError> {
        let logical_id = validate_logical_id(logical_id.into())?;
        self.outputs.insert(logical_id, output);
        Ok(())
    }

    /// Iterates resources of one CloudFormation type, e.g. `AWS::ApiGateway::Method`.
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Resource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, resource)| resource.resource_type == resource_type)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, StackError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub properties: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, properties: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties,
            depends_on: Vec::new(),
        }
    }

    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Sets one top-level property.
    pub fn set_property(&mut self, key: &str, value: Value) {
        if let Value::Object(properties) = &mut self.properties {
            properties.insert(key.to_owned(), value);
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

pub fn sub(template: impl Into<String>) -> Value {
    json!({ "Fn::Sub": template.into() })
}

fn validate_logical_id(logical_id: String) -> Result<String, StackError> {
    let valid = !logical_id.is_empty()
        && logical_id.len() <= 255
        && logical_id.chars().all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(logical_id)
    } else {
        Err(StackError::InvalidLogicalId(logical_id))
    }
}
