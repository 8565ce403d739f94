use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "realm-cli")]
#[command(about = "Operator CLI for the realm server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:24000")]
    url: String,

    #[arg(short, long, env = "REALM_ADMIN_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show realm status
    Status,
    /// List connected sessions
    Sessions,
    /// Set the message of the day and broadcast it
    Motd {
        /// Message text; joined with spaces
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Begin a realm shutdown countdown
    Shutdown {
        /// Seconds until sessions are disconnected
        seconds: u64,
    },
    /// Show the current shutdown countdown
    Countdown,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = match cli.command {
        Commands::Status => {
            client
                .get(format!("{}/admin/status", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Sessions => {
            client
                .get(format!("{}/admin/sessions", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Motd { message } => {
            client
                .post(format!("{}/admin/realm/motd", cli.url))
                .headers(headers)
                .json(&json!({ "message": message.join(" ") }))
                .send()
                .await?
        }
        Commands::Shutdown { seconds } => {
            client
                .post(format!("{}/admin/realm/shutdown", cli.url))
                .headers(headers)
                .json(&json!({ "seconds": seconds }))
                .send()
                .await?
        }
        Commands::Countdown => {
            client
                .get(format!("{}/admin/realm/shutdown", cli.url))
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
