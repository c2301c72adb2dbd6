use std::collections::BTreeMap;

use serde_json::json;

use crate::error::StackError;
use crate::template::{Resource, Template, get_att, sub};

/// Where `cargo lambda build --release` leaves the `bootstrap` binary.
pub const DEFAULT_CODE_ASSET: &str = "target/lambda/bootstrap";

/// Keeps lambda_http from prefixing REST API request paths with the stage name, so the
/// function routes `/`, `/openapi`, and `/ui` under any stage.
pub const IGNORE_STAGE_IN_PATH_ENV: &str = "AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Runtime {
    #[default]
    ProvidedAl2023,
    ProvidedAl2,
}

impl Runtime {
    pub fn name(self) -> &'static str {
        match self {
            Runtime::ProvidedAl2023 => "provided.al2023",
            Runtime::ProvidedAl2 => "provided.al2",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Architecture {
    #[default]
    X86_64,
    Arm64,
}

impl Architecture {
    pub fn name(self) -> &'static str {
        match self {
            Architecture::X86_64 => "x86_64",
            Architecture::Arm64 => "arm64",
        }
    }
}

/// Lambda function declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionProps {
    /// Local path packaged by `aws cloudformation package` or `sam`.
    pub code: String,
    pub handler: String,
    pub runtime: Runtime,
    pub architecture: Architecture,
    pub memory_mb: u32,
    pub timeout_secs: u32,
    pub environment: BTreeMap<String, String>,
}

impl Default for FunctionProps {
    fn default() -> Self {
        Self {
            code: DEFAULT_CODE_ASSET.to_owned(),
            handler: "bootstrap".to_owned(),
            runtime: Runtime::default(),
            architecture: Architecture::default(),
            memory_mb: 128,
            timeout_secs: 3,
            environment: BTreeMap::from([(IGNORE_STAGE_IN_PATH_ENV.to_owned(), "true".to_owned())]),
        }
    }
}

impl FunctionProps {
    /// Adds the execution role and the function under `logical_id`.
    pub fn declare(&self, template: &mut Template, logical_id: &str) -> Result<(), StackError> {
        let role_id = format!("{logical_id}ServiceRole");

        template.add_resource(
            role_id.as_str(),
            Resource::new(
                "AWS::IAM::Role",
                json!({
                    "AssumeRolePolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": [{
                            "Action": "sts:AssumeRole",
                            "Effect": "Allow",
                            "Principal": { "Service": "lambda.amazonaws.com" },
                        }],
                    },
                    "ManagedPolicyArns": [
                        sub("arn:${AWS::Partition}:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole"),
                    ],
                }),
            ),
        )?;

        let mut function = Resource::new(
            "AWS::Lambda::Function",
            json!({
                "Code": self.code,
                "Handler": self.handler,
                "Runtime": self.runtime.name(),
                "Architectures": [self.architecture.name()],
                "MemorySize": self.memory_mb,
                "Timeout": self.timeout_secs,
                "Role": get_att(&role_id, "Arn"),
            }),
        )
        .depends_on([role_id.as_str()]);
        if !self.environment.is_empty() {
            function.set_property("Environment", json!({ "Variables": self.environment }));
        }

        template.add_resource(logical_id, function)
    }
}
