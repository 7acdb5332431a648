use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "portal-cli")]
#[command(about = "Operator CLI for the Zerolight Portal Gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000", env = "PORTAL_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show gateway service info
    Health,
    /// List domains currently online
    Allowed,
    /// Re-evaluate every domain against today's anomalies
    Recalc,
    /// Ask the gate about a domain without following the redirect
    Go {
        domain: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base = cli.url.trim_end_matches('/');
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Allowed => {
            let res = client.get(format!("{}/allowed", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Recalc => {
            let res = client.post(format!("{}/admin/recalc", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Go { domain } => {
            let res = client.get(format!("{}/go/{}", base, domain)).send().await?;
            if res.status().is_redirection() {
                let location = res
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("<missing>");
                println!("{} → {}", res.status(), location);
            } else {
                print_response(res).await?;
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
