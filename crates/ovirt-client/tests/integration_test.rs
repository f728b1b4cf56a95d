//! Integration tests for the oVirt client
//!
//! These tests require a running oVirt engine.
//! Set OVIRT_URL, OVIRT_USERNAME and OVIRT_PASSWORD environment variables to run.
//! DEBUG_TRANSPORT=1 logs every request and response.

use ovirt_client::{DataCenter, OvirtClient, Resource};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test]
#[ignore] // Requires running oVirt engine
async fn test_client_connection() {
    init_tracing();
    let client = OvirtClient::from_env().await.expect("Failed to connect");

    client.validate_connection().await.expect("Connection check failed");
    if let Some(version) = client.product_info().and_then(|p| p.version.as_ref()) {
        println!("Engine version {:?}", version.full_version);
    }
}

#[tokio::test]
#[ignore]
async fn test_list_data_centers() {
    init_tracing();
    let client = OvirtClient::from_env().await.expect("Failed to connect");

    let data_centers = DataCenter::list(&client).await.expect("Failed to list data centers");
    println!("Found {} data centers", data_centers.len());
}

#[tokio::test]
#[ignore]
async fn test_data_center_round_trip() {
    init_tracing();
    let client = OvirtClient::from_env().await.expect("Failed to connect");

    let name = format!("test-dc-{}", unique_suffix());
    let mut dc = DataCenter::new(name.clone());
    dc.local = Some(false);
    dc.save(&client).await.expect("Failed to create data center");
    let id = dc.id().expect("created data center has an id").to_string();
    println!("Created data center {} ({})", name, id);

    let retrieved = DataCenter::get(&client, &id).await.expect("Failed to get data center");
    assert_eq!(retrieved.name.as_deref(), Some(name.as_str()));

    dc.description = Some("updated by integration test".to_string());
    dc.save(&client).await.expect("Failed to update data center");
    let retrieved = DataCenter::get(&client, &id).await.expect("Failed to get data center");
    assert_eq!(retrieved.description.as_deref(), Some("updated by integration test"));

    dc.delete(&client).await.expect("Failed to delete data center");
    let err = DataCenter::get(&client, &id).await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err:?}");
}

fn unique_suffix() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis().to_string())
        .unwrap_or_default()
}
