use std::io::Read;
use std::panic;

use tracing_subscriber::EnvFilter;

use codexec::CodeExecutionTool;

#[tokio::main]
#[tracing::instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    set_panic_hook();

    // Request comes from the first argument, or stdin when none is given.
    // Either a JSON request object or a bare snippet of code works.
    let input = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let tool = CodeExecutionTool::with_defaults();
    let report = tool.call(&input).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn set_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        tracing::error!(
            message = "panic occurred",
            panic = %panic_info
        );
    }));
}
