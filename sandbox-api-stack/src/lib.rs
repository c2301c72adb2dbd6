//! Infrastructure declaration for sandbox-api.
//!
//! Declares the Lambda function running the `bootstrap` binary and the API Gateway REST API in
//! front of it, and synthesizes both into a CloudFormation template that `sam deploy` or
//! `aws cloudformation package`/`deploy` can consume.

pub mod error;
pub mod function;
pub mod gateway;
pub mod stack;
pub mod template;

pub use crate::error::StackError;
pub use crate::function::{Architecture, FunctionProps, Runtime};
pub use crate::gateway::{CorsOptions, LambdaRestApiProps};
pub use crate::stack::ApiStack;
pub use crate::template::{Output, Resource, Template};
