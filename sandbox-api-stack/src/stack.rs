use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::error::StackError;
use crate::function::FunctionProps;
use crate::gateway::{CorsOptions, LambdaRestApiProps};
use crate::template::Template;

/// Resource types that accept a `Tags` list of `{Key, Value}` pairs.
const TAGGABLE_TYPES: [&str; 4] = [
    "AWS::IAM::Role",
    "AWS::Lambda::Function",
    "AWS::ApiGateway::RestApi",
    "AWS::ApiGateway::Stage",
];

const FUNCTION_ID: &str = "Lambda";
const API_ID: &str = "SandboxApi";

/// The whole deployment: one function behind one REST API, with stack-wide tags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiStack {
    pub description: String,
    pub tags: BTreeMap<String, String>,
    pub function: FunctionProps,
    pub api: LambdaRestApiProps,
}

impl ApiStack {
    /// The sandbox deployment: stage `dev`, permissive CORS, ownership tags.
    pub fn sandbox() -> Self {
        let tags = [("Application", "sandbox-api"), ("ManagedBy", "IaC")]
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect();

        Self {
            description: "sandbox-api: Lambda function behind an API Gateway REST API".to_owned(),
            tags,
            function: FunctionProps::default(),
            api: LambdaRestApiProps {
                name: "sandbox-api".to_owned(),
                stage_name: "dev".to_owned(),
                cors: Some(CorsOptions::permissive()),
            },
        }
    }

    /// Adds a tag applied to every taggable resource in the stack.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Renders the stack as a CloudFormation template.
    pub fn synthesize(&self) -> Result<Template, StackError> {
        let mut template = Template::new(self.description.as_str());

        self.function.declare(&mut template, FUNCTION_ID)?;
        self.api.declare(&mut template, API_ID, FUNCTION_ID)?;
        self.apply_tags(&mut template);

        tracing::debug!(
            resources = template.resources.len(),
            stage = %self.api.stage_name,
            "synthesized stack"
        );
        Ok(template)
    }

    fn apply_tags(&self, template: &mut Template) {
        if self.tags.is_empty() {
            return;
        }

        let tags: Vec<Value> = self
            .tags
            .iter()
            .map(|(key, value)| json!({ "Key": key, "Value": value }))
            .collect();

        for resource in template.resources.values_mut() {
            if TAGGABLE_TYPES.contains(&resource.resource_type.as_str()) {
                resource.set_property("Tags", Value::Array(tags.clone()));
            }
        }
    }
}

impl Default for ApiStack {
    fn default() -> Self {
        Self::sandbox()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> Template {
        ApiStack::sandbox().synthesize().expect("synthesize")
    }

    #[test]
    fn declares_one_function_and_one_api() {
        let template = template();
        assert_eq!(template.resources_of_type("AWS::Lambda::Function").count(), 1);
        assert_eq!(template.resources_of_type("AWS::ApiGateway::RestApi").count(), 1);

        let (_, function) = template.resources_of_type("AWS::Lambda::Function").next().unwrap();
        assert_eq!(function.properties["Runtime"], "provided.al2023");
        assert_eq!(function.properties["Handler"], "bootstrap");
        assert_eq!(function.properties["Code"], "target/lambda/bootstrap");
    }

    #[test]
    fn function_routes_without_stage_in_path() {
        let template = template();
        let (_, function) = template.resources_of_type("AWS::Lambda::Function").next().unwrap();
        assert_eq!(
            function.properties["Environment"]["Variables"]["AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH"],
            "true"
        );
    }

    #[test]
    fn empty_environment_is_omitted() {
        let mut stack = ApiStack::sandbox();
        stack.function.environment.clear();
        let template = stack.synthesize().expect("synthesize");
        let (_, function) = template.resources_of_type("AWS::Lambda::Function").next().unwrap();
        assert!(function.properties.get("Environment").is_none());
    }

    #[test]
    fn proxies_every_path_and_method() {
        let template = template();
        let any_methods: Vec<_> = template
            .resources_of_type("AWS::ApiGateway::Method")
            .filter(|(_, method)| method.properties["HttpMethod"] == "ANY")
            .collect();
        assert_eq!(any_methods.len(), 2);
        for (_, method) in any_methods {
            assert_eq!(method.properties["Integration"]["Type"], "AWS_PROXY");
        }

        let (_, proxy) = template
            .resources_of_type("AWS::ApiGateway::Resource")
            .next()
            .unwrap();
        assert_eq!(proxy.properties["PathPart"], "{proxy+}");
    }

    #[test]
    fn deploys_to_dev_stage() {
        let template = template();
        let (_, stage) = template.resources_of_type("AWS::ApiGateway::Stage").next().unwrap();
        assert_eq!(stage.properties["StageName"], "dev");

        let (_, deployment) = template
            .resources_of_type("AWS::ApiGateway::Deployment")
            .next()
            .unwrap();
        assert_eq!(deployment.depends_on.len(), 5);
    }

    #[test]
    fn preflight_allows_everything() {
        let template = template();
        let options: Vec<_> = template
            .resources_of_type("AWS::ApiGateway::Method")
            .filter(|(_, method)| method.properties["HttpMethod"] == "OPTIONS")
            .collect();
        assert_eq!(options.len(), 2);

        let params = &options[0].1.properties["Integration"]["IntegrationResponses"][0]
            ["ResponseParameters"];
        assert_eq!(params["method.response.header.Access-Control-Allow-Origin"], "'*'");
        assert_eq!(
            params["method.response.header.Access-Control-Allow-Methods"],
            "'OPTIONS,GET,PUT,POST,DELETE,PATCH,HEAD'"
        );
    }

    #[test]
    fn tags_every_taggable_resource() {
        let template = template();
        let mut tagged = 0;
        for resource in template.resources.values() {
            if TAGGABLE_TYPES.contains(&resource.resource_type.as_str()) {
                assert_eq!(
                    resource.properties["Tags"],
                    json!([
                        { "Key": "Application", "Value": "sandbox-api" },
                        { "Key": "ManagedBy", "Value": "IaC" },
                    ]),
                    "{}",
                    resource.resource_type
                );
                tagged += 1;
            } else {
                assert!(resource.properties.get("Tags").is_none());
            }
        }
        assert_eq!(tagged, 4);
    }

    #[test]
    fn invalid_stage_fails_synthesis() {
        let mut stack = ApiStack::sandbox();
        stack.api.stage_name = "dev stage".to_owned();
        assert!(matches!(
            stack.synthesize(),
            Err(StackError::InvalidStageName(_))
        ));
    }

    #[test]
    fn outputs_stage_endpoint() {
        let value: Value =
            serde_json::from_str(&template().to_json(true).unwrap()).unwrap();
        assert_eq!(
            value["Outputs"]["SandboxApiEndpoint"]["Value"]["Fn::Sub"],
            "https://${SandboxApi}.execute-api.${AWS::Region}.${AWS::URLSuffix}/dev/"
        );
    }
}
