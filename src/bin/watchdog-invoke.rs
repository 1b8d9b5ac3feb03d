use std::io::{Read, Write};
use std::process::ExitCode;

use clap::Parser;
use reqwest::header::CONTENT_TYPE;

#[derive(Parser)]
#[command(name = "watchdog-invoke")]
#[command(about = "Send stdin to a watchdog and print the function's output", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Content-Type to send. Any value makes the watchdog answer as JSON.
    #[arg(short = 't', long)]
    content_type: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut input = Vec::new();
    std::io::stdin().read_to_end(&mut input)?;

    let client = reqwest::Client::new();
    let mut request = client.post(&cli.url).body(input);
    if let Some(content_type) = &cli.content_type {
        request = request.header(CONTENT_TYPE, content_type);
    }

    let res = request.send().await?;
    let status = res.status();
    let body = res.bytes().await?;

    if !status.is_success() {
        eprintln!("Error: watchdog returned status {}", status);
        if !body.is_empty() {
            eprintln!("Response: {}", String::from_utf8_lossy(&body));
        }
        return Ok(ExitCode::FAILURE);
    }

    std::io::stdout().write_all(&body)?;
    Ok(ExitCode::SUCCESS)
}
