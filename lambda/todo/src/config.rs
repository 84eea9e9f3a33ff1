//! Start-up configuration read from the Lambda environment.
//!
//! `TODO_TABLE` names the table (default `todos`). When the function runs under
//! `sam local` (`AWS_SAM_LOCAL=true`) the client targets a DynamoDB Local
//! container instead of the managed service; `DYNAMODB_ENDPOINT` pins the
//! endpoint explicitly in either case.

use aws_sdk_dynamodb::Client;

const DEFAULT_TABLE: &str = "todos";
const LOCAL_ENDPOINT: &str = "http://dynamodb-local:8000";
const LOCAL_REGION: &str = "us-east-1";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Config {
    pub table_name: String,
    /// Custom endpoint URL. `None` means the regular regional endpoint.
    pub endpoint: Option<String>,
    pub region: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let table_name = var("TODO_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string());
        let sam_local = var("AWS_SAM_LOCAL").is_some_and(|v| v.eq_ignore_ascii_case("true"));
        let endpoint = match var("DYNAMODB_ENDPOINT") {
            Some(endpoint) => Some(endpoint),
            None if sam_local => Some(LOCAL_ENDPOINT.to_string()),
            None => None,
        };
        let region = var("AWS_REGION").unwrap_or_else(|| LOCAL_REGION.to_string());

        Self {
            table_name,
            endpoint,
            region,
        }
    }

    /// Builds the DynamoDB client once per execution environment.
    pub async fn dynamodb_client(&self) -> Client {
        let Some(endpoint) = &self.endpoint else {
            let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            return Client::new(&config);
        };

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .endpoint_url(endpoint)
            .region(aws_config::Region::new(self.region.clone()))
            // DynamoDB Local ignores credentials but the SDK still needs a provider
            .credentials_provider(aws_sdk_dynamodb::config::Credentials::new(
                "local", "local", None, None, "local",
            ))
            .load()
            .await;

        Client::new(&config)
    }
}
