//! oVirt inventory
//!
//! Connects to an engine and prints its data centers, clusters, hosts,
//! storage domains and virtual machines.
//!
//! Configuration comes from a YAML file given as the first argument, or from
//! the `OVIRT_*` environment variables otherwise.

use anyhow::Context;
use ovirt_client::{Cluster, DataCenter, Host, OvirtClient, OvirtConfig, Resource, StorageDomain, Vm};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => OvirtConfig::from_yaml_file(&path).with_context(|| format!("loading config from {}", path))?,
        None => OvirtConfig::from_env().context("loading config from the environment")?,
    };
    info!("Connecting to {}", config.url);
    let client = OvirtClient::connect(config).await.context("connecting to the engine")?;

    let data_centers = DataCenter::list(&client).await.context("listing data centers")?;
    println!("Data centers ({})", data_centers.len());
    for dc in &data_centers {
        println!("  {:<32} {:?}", or_dash(dc.name.as_deref()), dc.status);
    }

    let clusters = Cluster::list(&client).await.context("listing clusters")?;
    println!("Clusters ({})", clusters.len());
    for cluster in &clusters {
        println!("  {}", or_dash(cluster.name.as_deref()));
    }

    let hosts = Host::list(&client).await.context("listing hosts")?;
    println!("Hosts ({})", hosts.len());
    for host in &hosts {
        println!(
            "  {:<32} {:<24} {:?}",
            or_dash(host.name.as_deref()),
            or_dash(host.address.as_deref()),
            host.status
        );
    }

    let domains = StorageDomain::list(&client).await.context("listing storage domains")?;
    println!("Storage domains ({})", domains.len());
    for sd in &domains {
        let available = sd.available_gib().map_or_else(|| "-".to_string(), |gib| format!("{} GiB free", gib));
        println!("  {:<32} {:<16} {:?}", or_dash(sd.name.as_deref()), available, sd.status);
    }

    let vms = Vm::list(&client).await.context("listing VMs")?;
    println!("VMs ({})", vms.len());
    for vm in &vms {
        let memory = vm.memory.map_or_else(|| "-".to_string(), |bytes| format!("{} MiB", bytes >> 20));
        println!("  {:<32} {:<12} {:?}", or_dash(vm.name.as_deref()), memory, vm.status);
    }

    Ok(())
}
