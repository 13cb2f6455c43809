//! Example: Print zone changes as they happen until Ctrl-C.

use elk_m1_client::{Client, ClientEvent, ClientOptions, ConnectionOptions, ElkMessage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let options = ClientOptions::builder()
        .connection(ConnectionOptions::builder().host("192.168.0.251").build())
        .build();

    let client = Client::new(options);
    let mut events = client.subscribe();
    client.connect().await?;

    let zones = client.get_zone_status().await?;
    println!("Currently violated: {:?}", zones.violated_zones());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Ok(ClientEvent::Message(ElkMessage::ZoneChange(change))) => {
                    println!(
                        "Zone {:3}: {:?} / {:?}",
                        change.zone, change.status.physical, change.status.logical
                    );
                }
                Ok(ClientEvent::Disconnected) => {
                    println!("Panel disconnected");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    println!("Event stream ended: {e}");
                    break;
                }
            },
        }
    }

    client.disconnect().await;
    Ok(())
}
