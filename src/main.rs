use std::process::ExitCode;

use llama_poc::{
    error::report,
    utils::{setup_logging, LogConfig},
    EngineBuilder, EngineConfig, EngineError, ErrorExt, HubLoader,
};
use tracing::debug;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<EngineError>() {
                Some(engine_err) => {
                    eprintln!("Error: {}", report(engine_err));
                    ExitCode::from(engine_err.exit_code())
                }
                None => {
                    eprintln!("Error: {e}");
                    ExitCode::from(1)
                }
            }
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = EngineConfig::from_env();

    setup_logging(LogConfig {
        level: config.monitoring.log_level.into(),
        ..Default::default()
    })
    .map_err(anyhow::Error::msg)?;
    debug!(version = llama_poc::VERSION, "{}", llama_poc::Features::detect());

    // The device is picked inside the loader, after the credential check.
    let provider = HubLoader::new();

    let mut engine = EngineBuilder::new().with_config(config).build(&provider)?;
    let output = engine.run()?;

    println!("{}", output.text);
    Ok(())
}
