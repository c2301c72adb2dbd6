use serde_json::{Map, Value, json};

use crate::error::StackError;
use crate::template::{Output, Resource, Template, get_att, reference, sub};

pub const ALL_ORIGINS: [&str; 1] = ["*"];
pub const ALL_METHODS: [&str; 7] = ["OPTIONS", "GET", "PUT", "POST", "DELETE", "PATCH", "HEAD"];
pub const DEFAULT_HEADERS: [&str; 6] = [
    "Content-Type",
    "X-Amz-Date",
    "Authorization",
    "X-Api-Key",
    "X-Amz-Security-Token",
    "X-Amz-User-Agent",
];

/// CORS preflight answered by the gateway itself through a mock integration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsOptions {
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub status_code: u16,
}

impl CorsOptions {
    /// Any origin, any method, the default header set.
    pub fn permissive() -> Self {
        Self {
            allow_origins: ALL_ORIGINS.map(str::to_owned).to_vec(),
            allow_methods: ALL_METHODS.map(str::to_owned).to_vec(),
            allow_headers: DEFAULT_HEADERS.map(str::to_owned).to_vec(),
            status_code: 204,
        }
    }

    /// `Access-Control-*` header name to quoted static value, as integration responses expect.
    pub fn response_headers(&self) -> Vec<(&'static str, String)> {
        // A mock integration can only return one static origin.
        let origin = self
            .allow_origins
            .first()
            .map(String::as_str)
            .unwrap_or("*");
        vec![
            (
                "Access-Control-Allow-Headers",
                format!("'{}'", self.allow_headers.join(",")),
            ),
            ("Access-Control-Allow-Origin", format!("'{origin}'")),
            (
                "Access-Control-Allow-Methods",
                format!("'{}'", self.allow_methods.join(",")),
            ),
        ]
    }

    fn options_method(&self, rest_api_id: &str, resource_id: Value) -> Resource {
        let mut integration_params = Map::new();
        let mut method_params = Map::new();
        for (header, value) in self.response_headers() {
            let key = format!("method.response.header.{header}");
            integration_params.insert(key.clone(), Value::String(value));
            method_params.insert(key, Value::Bool(true));
        }
        let status = self.status_code.to_string();

        Resource::new(
            "AWS::ApiGateway::Method",
            json!({
                "HttpMethod": "OPTIONS",
                "ResourceId": resource_id,
                "RestApiId": reference(rest_api_id),
                "AuthorizationType": "NONE",
                "Integration": {
                    "Type": "MOCK",
                    "RequestTemplates": { "application/json": "{ statusCode: 200 }" },
                    "IntegrationResponses": [{
                        "StatusCode": status,
                        "ResponseParameters": integration_params,
                    }],
                },
                "MethodResponses": [{
                    "StatusCode": status,
                    "ResponseParameters": method_params,
                }],
            }),
        )
    }
}

/// REST API that proxies every path and method to one Lambda function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LambdaRestApiProps {
    pub name: String,
    pub stage_name: String,
    pub cors: Option<CorsOptions>,
}

impl LambdaRestApiProps {
    /// Adds the API, its proxy resource, methods, deployment, stage, invoke permission, and
    /// endpoint output. `function_id` must already be declared.
    pub fn declare(
        &self,
        template: &mut Template,
        logical_id: &str,
        function_id: &str,
    ) -> Result<(), StackError> {
        validate_stage_name(&self.stage_name)?;

        let root = get_att(logical_id, "RootResourceId");
        let proxy_id = format!("{logical_id}Proxy");

        template.add_resource(
            logical_id,
            Resource::new("AWS::ApiGateway::RestApi", json!({ "Name": self.name })),
        )?;
        template.add_resource(
            proxy_id.as_str(),
            Resource::new(
                "AWS::ApiGateway::Resource",
                json!({
                    "ParentId": root,
                    "PathPart": "{proxy+}",
                    "RestApiId": reference(logical_id),
                }),
            ),
        )?;

        let mut method_ids = Vec::new();
        for (suffix, resource_id) in [("Root", root.clone()), ("Proxy", reference(&proxy_id))] {
            let any_id = format!("{logical_id}{suffix}Any");
            template.add_resource(
                any_id.as_str(),
                proxy_method(logical_id, resource_id.clone(), function_id),
            )?;
            method_ids.push(any_id);

            if let Some(cors) = &self.cors {
                let options_id = format!("{logical_id}{suffix}Options");
                template.add_resource(options_id.as_str(), cors.options_method(logical_id, resource_id))?;
                method_ids.push(options_id);
            }
        }

        template.add_resource(
            format!("{logical_id}Invoke"),
            Resource::new(
                "AWS::Lambda::Permission",
                json!({
                    "Action": "lambda:InvokeFunction",
                    "FunctionName": get_att(function_id, "Arn"),
                    "Principal": "apigateway.amazonaws.com",
                    "SourceArn": sub(format!(
                        "arn:${{AWS::Partition}}:execute-api:${{AWS::Region}}:${{AWS::AccountId}}:${{{logical_id}}}/*"
                    )),
                }),
            ),
        )?;

        let deployment_id = format!("{logical_id}Deployment");
        template.add_resource(
            deployment_id.as_str(),
            Resource::new(
                "AWS::ApiGateway::Deployment",
                json!({
                    "RestApiId": reference(logical_id),
                    "Description": "Automatically created by the RestApi construct",
                }),
            )
            .depends_on(method_ids.iter().map(String::as_str).chain([proxy_id.as_str()])),
        )?;

        template.add_resource(
            format!("{logical_id}Stage"),
            Resource::new(
                "AWS::ApiGateway::Stage",
                json!({
                    "RestApiId": reference(logical_id),
                    "DeploymentId": reference(&deployment_id),
                    "StageName": self.stage_name,
                }),
            ),
        )?;

        template.add_output(
            format!("{logical_id}Endpoint"),
            Output {
                value: sub(format!(
                    "https://${{{logical_id}}}.execute-api.${{AWS::Region}}.${{AWS::URLSuffix}}/{}/",
                    self.stage_name
                )),
                description: Some("Invoke URL of the deployed stage".to_owned()),
            },
        )
    }
}

fn proxy_method(rest_api_id: &str, resource_id: Value, function_id: &str) -> Resource {
    Resource::new(
        "AWS::ApiGateway::Method",
        json!({
            "HttpMethod": "ANY",
            "ResourceId": resource_id,
            "RestApiId": reference(rest_api_id),
            "AuthorizationType": "NONE",
            "Integration": {
                "Type": "AWS_PROXY",
                "IntegrationHttpMethod": "POST",
                "Uri": sub(format!(
                    "arn:${{AWS::Partition}}:apigateway:${{AWS::Region}}:lambda:path/2015-03-31/functions/${{{function_id}.Arn}}/invocations"
                )),
            },
        }),
    )
}

fn validate_stage_name(stage_name: &str) -> Result<(), StackError> {
    let valid = !stage_name.is_empty()
        && stage_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StackError::InvalidStageName(stage_name.to_owned()))
    }
}
