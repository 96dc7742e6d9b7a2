use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region};
use clap::{Parser, Subcommand};
use lambda_runtime::{run, service_fn, tracing, Error};

mod config;
mod error;
mod event_handler;
mod local;
mod store;

use config::Config;
use event_handler::function_handler;
use store::DynamoDbStore;

/// Record CRUD Lambda. Runs the Lambda runtime loop unless a command is given.
#[derive(Parser, Debug)]
#[command(name = "crud")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one canned request against the configured table
    Test {
        #[arg(value_enum, default_value_t = local::Mode::Read)]
        mode: local::Mode,
    },
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let region =
        RegionProviderChain::default_provider().or_else(Region::new(config.region.clone()));
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(region)
        .load()
        .await;
    let store = DynamoDbStore::new(aws_sdk_dynamodb::Client::new(&sdk_config), &config);

    match cli.command {
        Some(Command::Test { mode }) => local::run(&store, &config, mode).await,
        None => run(service_fn(|event| function_handler(&store, &config, event))).await,
    }
}
