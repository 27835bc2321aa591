use std::env;
use std::time::Duration;

use uwg4_cloud::{RefreshOutcome, Uwg4Client};

#[tokio::main]
async fn main() -> uwg4_cloud::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let usage = "usage: monitor <email> <password> [--mirror <path>]";
    let email = args.get(1).expect(usage).clone();
    let password = args.get(2).expect(usage).clone();
    let mirror = args
        .iter()
        .position(|a| a == "--mirror")
        .and_then(|i| args.get(i + 1))
        .cloned();

    let mut builder = Uwg4Client::builder(email, password);
    if let Some(path) = mirror {
        println!("Mirroring snapshots to {path}");
        builder = builder.snapshot_file(path);
    }
    let mut client = builder.build();

    println!("Polling mythermostat.info...");
    loop {
        match client.refresh().await {
            Ok(RefreshOutcome::Fetched) => {
                for view in client.views() {
                    println!(
                        "[{}] {:.1}\u{00b0}C / {:.1}\u{00b0}F -> {} | mode: {:?} | {:?}",
                        view.room,
                        view.temperature.celsius(),
                        view.temperature.fahrenheit(),
                        view.target,
                        view.hvac_mode(),
                        view.action(),
                    );
                }
            }
            Ok(RefreshOutcome::Skipped) => {}
            Err(e) => eprintln!("Refresh error: {e}"),
        }
        tokio::time::sleep(Duration::from_secs(60)).await;
    }
}
