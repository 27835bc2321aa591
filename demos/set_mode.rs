use std::env;

use uwg4_cloud::{RegulationMode, Temperature, Uwg4Client};

const USAGE: &str = "usage: set_mode <email> <password> <serial> <auto|comfort|manual|vacation> [temp_c]";

#[tokio::main]
async fn main() -> uwg4_cloud::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let email = args.get(1).expect(USAGE).clone();
    let password = args.get(2).expect(USAGE).clone();
    let serial = args.get(3).expect(USAGE).clone();
    let mode = match args.get(4).expect(USAGE).as_str() {
        "auto" => RegulationMode::Auto,
        "comfort" => RegulationMode::Comfort,
        "manual" => RegulationMode::Manual,
        "vacation" => RegulationMode::Vacation,
        other => panic!("unknown mode {other:?}\n{USAGE}"),
    };
    let temp = args
        .get(5)
        .map(|t| Temperature::from_celsius(t.parse().expect("temp_c must be a number")));

    let mut client = Uwg4Client::builder(email, password).build();
    client.refresh().await?;

    let view = client.view(&serial).expect("serial not found in account");
    println!(
        "{}: {} -> {} [{:?}]",
        view.room, view.temperature, view.target, view.regulation_mode
    );
    let target = temp.unwrap_or(view.target);

    client.set_regulation_mode(&serial, mode, target).await?;
    println!("Sent {mode:?} @ {target}");

    // The command buys this refresh a pass through the rate gate.
    client.refresh().await?;
    if let Some(view) = client.view(&serial) {
        println!(
            "{}: {} -> {} [{:?}]",
            view.room, view.temperature, view.target, view.regulation_mode
        );
    }
    Ok(())
}
