use crate::error::CliError;
use engine_core::state::ImportResult;

pub async fn write_result(result: &ImportResult, path: &str) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(result)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

pub fn print_result(result: &ImportResult) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// Prints statements as a runnable script.
pub fn print_statements(statements: &[String]) {
    for statement in statements {
        println!("{statement};");
    }
}
