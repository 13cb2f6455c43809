//! Example: Connect to an Elk M1 panel and print its versions, areas and zone names.

use elk_m1_client::{Client, ClientOptions, ConnectionOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let options = ClientOptions::builder()
        .connection(
            ConnectionOptions::builder()
                .host("192.168.0.251")
                .secure(true)
                .build(),
        )
        .username("someone")
        .password("supersecret")
        .build();

    println!("Connecting to panel...");
    let client = Client::new(options);
    client.connect().await?;
    println!("Connected (authenticated={})", client.authenticated());

    let version = client.get_version_number().await?;
    println!("M1 {} / M1XEP {}", version.m1_version, version.xep_version);

    // Print areas
    let arming = client.get_arming_status().await?;
    println!("\n--- Areas ---");
    for area in &arming.areas {
        println!(
            "  Area {}: {:?} ({:?})",
            area.area, area.arming_status, area.arm_up_state
        );
    }

    // Print named zones. Description type 0 is zone names; the panel skips
    // ahead to the next named zone, so follow the address it answers with.
    println!("\n--- Zones ---");
    let mut address = 1;
    while address <= 208 {
        let description = client.get_description(0, address).await?;
        if description.address < address {
            break;
        }
        println!("  Zone {:3}: {}", description.address, description.text);
        address = description.address + 1;
    }

    client.disconnect().await;
    Ok(())
}
