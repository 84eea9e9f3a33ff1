use lambda_http::{run, service_fn, tracing, Error};
mod config;
mod http_handler;
mod response;
mod store;
mod todo;
use config::Config;
use http_handler::function_handler;
use store::DynamoDbStore;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = Config::from_env();
    let client = config.dynamodb_client().await;
    tracing::info!(
        table = %config.table_name,
        endpoint = config.endpoint.as_deref().unwrap_or("default"),
        "todo api ready"
    );
    let store = DynamoDbStore::new(client, config.table_name);

    run(service_fn(|event| function_handler(&store, event))).await
}
