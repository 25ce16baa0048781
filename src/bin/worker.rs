// Lambda entry point for the Worker function (schedule rule or SQS trigger)

pub use laughgen::worker::handler;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    laughgen::setup_logging();
    lambda_runtime::run(lambda_runtime::service_fn(handler)).await
}
