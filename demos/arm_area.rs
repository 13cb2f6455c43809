//! Example: Arm area 1 in stay mode, wait for the panel to report it, then disarm.

use std::time::Duration;

use elk_m1_client::{
    ArmingLevel, ArmingStatus, Client, ClientOptions, ConnectionOptions, ElkMessage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let code = std::env::var("ELK_CODE").unwrap_or_else(|_| "1234".to_string());
    let options = ClientOptions::builder()
        .connection(ConnectionOptions::builder().host("192.168.0.251").build())
        .build();

    let client = Client::new(options);
    client.connect().await?;

    let areas = client.get_valid_user_code_areas(&code).await?;
    if !areas.areas.contains(&1) {
        anyhow::bail!("code is not valid in area 1");
    }

    // Arming has no direct reply; the panel broadcasts the new arming status.
    let armed = client.wait_for_response(
        |message| match message {
            ElkMessage::ArmingStatus(report) => report
                .area(1)
                .is_some_and(|area| area.arming_status == ArmingStatus::ArmedStay),
            _ => false,
        },
        Duration::from_secs(10),
    );
    let (armed, sent) = tokio::join!(armed, client.arm(1, ArmingLevel::ArmedStay, &code));
    sent?;
    armed?;
    println!("Area 1 armed (stay)");

    tokio::time::sleep(Duration::from_secs(5)).await;

    client.disarm(1, &code).await?;
    println!("Disarm sent");

    client.disconnect().await;
    Ok(())
}
