use anyhow::Result;
use planx_claimer::{PlanxClient, PlanxConfig, Runner, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = PlanxConfig::from_env();
    logging::init(&config.log_file)?;

    let client = PlanxClient::new(&config)?;
    let runner = Runner::new(client, config.task_ids, config.delays);
    runner.run_from_file(&config.token_file).await;

    Ok(())
}
