//! `tagctl`: GIAI-96 capacity, encoding and filter tooling for a provisioning station,
//! plus a dry run of the provisioning sequences against the simulated reader.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use epc_codec::{
    decode_hex_epc, encode_epc_hex_from_giai, encode_giai_from_individual_asset_reference,
    encode_individual_asset_reference, get_collection_reference_digits, get_epc_filter_spec,
    get_item_reference_digits, get_max_iar_prefix, get_max_ns_iar_prefix, get_usable_iar_digits,
};
use epc_config::{expand_config_path, AssetDeployment, DeploymentConfig};
use epc_types::AccessPassword;
use serde::Serialize;
use tag_provisioning::{
    Provisioner, RadioDevice, Reader, ScanOptions, SimulatedRadio, SimulatedTag,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// EPC a blank tag ships with in `simulate`
const FACTORY_EPC: &str = "e20000000000000000000001";
const FACTORY_TID: &str = "e2801160";

#[derive(Parser, Debug)]
#[command(name = "tagctl")]
#[command(author, version, about = "GIAI-96 tag encoding and provisioning tool", long_about = None)]
struct Cli {
    /// Deployment config file (TOML); `~` and `$VAR` are expanded
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show how many digits each asset reference field may use
    Capacity(DeploymentArgs),
    /// Encode an asset reference into a GIAI URI and EPC hex
    Encode(EncodeArgs),
    /// Decode EPC hex into its GIAI URI and fields
    Decode {
        /// 24 hex characters
        epc: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Derive the EPC filter shared by every tag of a deployment
    Filter(DeploymentArgs),
    /// Print the effective configuration after file and environment overrides
    Config,
    /// Provision and reset one tag on the simulated reader
    Simulate {
        #[command(flatten)]
        asset: EncodeArgs,
        /// Access password to lock the tag with (8 hex characters)
        #[arg(long, default_value = "1a2b3c4d")]
        password: String,
    },
}

/// Overrides for the configured `[deployment]` section
#[derive(Args, Debug)]
struct DeploymentArgs {
    /// GS1 company prefix (6-12 digits)
    #[arg(long)]
    company_prefix: Option<String>,
    #[arg(long)]
    iar_prefix: Option<String>,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    #[command(flatten)]
    deployment: DeploymentArgs,
    #[arg(long)]
    collection: String,
    #[arg(long)]
    item: String,
    #[arg(long)]
    serial: i64,
}

#[derive(Serialize)]
struct DecodedEpc {
    epc: String,
    giai: String,
    filter: u8,
    partition: u8,
    company_prefix: String,
    asset_reference: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = cli.config.as_deref().map(expand_config_path).transpose()?;
    let config = DeploymentConfig::load(path.as_deref())?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid logging.level")?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?config, "Configuration loaded");
    run(cli.command, &config).await
}

/// Dispatch one subcommand. Only subcommands that use the deployment or the reader
/// validate those sections.
async fn run(command: Commands, config: &DeploymentConfig) -> Result<()> {
    match command {
        Commands::Capacity(args) => capacity(&resolve(config, &args)?),
        Commands::Encode(args) => {
            let (giai, epc) = encode(config, &args)?;
            println!("GIAI: {}", giai);
            println!("EPC:  {}", epc);
            Ok(())
        }
        Commands::Decode { epc, json } => decode(&epc, json),
        Commands::Filter(args) => print_filter(&resolve(config, &args)?),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Commands::Simulate { asset, password } => {
            config.validate().context("Invalid deployment configuration")?;
            simulate(config, &asset, &password).await
        }
    }
}

/// Command-line values win over the config file
fn resolve(config: &DeploymentConfig, args: &DeploymentArgs) -> Result<AssetDeployment> {
    let configured = config.deployment.as_ref();
    let company_prefix = args
        .company_prefix
        .clone()
        .or_else(|| configured.map(|d| d.company_prefix.clone()))
        .context("--company-prefix not given and no [deployment] section configured")?;
    let iar_prefix = args
        .iar_prefix
        .clone()
        .or_else(|| configured.map(|d| d.iar_prefix.clone()))
        .context("--iar-prefix not given and no [deployment] section configured")?;

    let deployment = AssetDeployment::new(company_prefix, iar_prefix);
    deployment.validate()?;
    Ok(deployment)
}

fn capacity(deployment: &AssetDeployment) -> Result<()> {
    let (cp, iar) = (&deployment.company_prefix, &deployment.iar_prefix);
    println!("Company prefix:       {} ({} digits)", cp, cp.len());
    println!("Max IAR prefix:       {}", get_max_iar_prefix(cp));
    println!("Max NS IAR prefix:    {}", get_max_ns_iar_prefix(cp));
    println!("IAR prefix:           {}", iar);
    println!("Usable digits:        {}", get_usable_iar_digits(iar, cp));
    println!("Collection reference: {} digits", get_collection_reference_digits(iar, cp));
    println!("Item reference:       up to {} digits", get_item_reference_digits(iar, cp));
    Ok(())
}

fn encode(config: &DeploymentConfig, args: &EncodeArgs) -> Result<(String, String)> {
    let deployment = resolve(config, &args.deployment)?;
    let iar = encode_individual_asset_reference(
        &deployment.company_prefix,
        &deployment.iar_prefix,
        &args.collection,
        &args.item,
        args.serial,
    )
    .context("Invalid asset reference")?;
    let giai =
        encode_giai_from_individual_asset_reference(&iar, &deployment.iar_prefix, &deployment.company_prefix)?;
    let epc = encode_epc_hex_from_giai(&giai)?;
    info!(%iar, %giai, %epc, "Encoded asset reference");
    Ok((giai, epc))
}

fn decode(epc: &str, json: bool) -> Result<()> {
    let (giai, parts) = decode_hex_epc(epc).with_context(|| format!("Cannot decode {:?}", epc))?;
    let decoded = DecodedEpc {
        epc: epc.to_ascii_lowercase(),
        giai,
        filter: parts.filter,
        partition: parts.partition,
        company_prefix: parts.company_prefix,
        asset_reference: parts.asset_reference.to_string(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
    } else {
        println!("GIAI:            {}", decoded.giai);
        println!("Filter:          {}", decoded.filter);
        println!("Partition:       {}", decoded.partition);
        println!("Company prefix:  {}", decoded.company_prefix);
        println!("Asset reference: {}", decoded.asset_reference);
    }
    Ok(())
}

fn print_filter(deployment: &AssetDeployment) -> Result<()> {
    let spec = get_epc_filter_spec(&deployment.iar_prefix, &deployment.company_prefix)?;
    println!("Filter:  {}", spec.data);
    println!("Bank:    {}", spec.memory_bank);
    println!("Offset:  {} bits", spec.bit_offset);
    println!("Length:  {} bits", spec.bit_count);
    Ok(())
}

async fn simulate(config: &DeploymentConfig, asset: &EncodeArgs, password: &str) -> Result<()> {
    let password = AccessPassword::new(password).context("Invalid --password")?;
    let deployment = resolve(config, &asset.deployment)?;
    let (giai, epc) = encode(config, asset)?;
    println!("Provisioning {} as {}", giai, epc);

    let reader = Reader::new(SimulatedRadio::new());
    reader.init().await?;
    reader.device().add_tag(SimulatedTag::new(FACTORY_TID, FACTORY_EPC));
    let power = reader.device().set_power(config.reader.power).await?;

    let provisioner = Provisioner::new(reader.device(), power)
        .sound_enabled(config.reader.sound_enabled)
        .on_status(|status| println!("  {}", status));

    provisioner
        .write_epc_and_lock(&epc, &password, &AccessPassword::default(), None)
        .await?;

    // The deployment filter must find the tag just written
    let deployment_filter = get_epc_filter_spec(&deployment.iar_prefix, &deployment.company_prefix)?;
    let options = ScanOptions {
        power,
        filter: None,
        scan_rate: config.reader.scan_rate,
        event_rate: config.reader.event_rate,
        sound_enabled: false,
    }
    .with_filter(deployment_filter.clone());
    let mut scan = reader.start_scan(&options).await?;
    reader.device().emit_inventory();
    for observation in scan.try_next_batch().unwrap_or_default() {
        println!("Scanned {} (rssi {})", observation.epc, observation.rssi);
    }
    reader.stop_scan(scan).await?;

    println!("Resetting");
    let outcome = provisioner
        .unlock_and_reset(&password, Some(&deployment_filter))
        .await?;
    println!("Reset complete (was locked: {}, marker {})", outcome.was_locked, outcome.nonce);

    reader.free().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> Commands {
        let mut argv = vec!["tagctl"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    fn broken_deployment() -> DeploymentConfig {
        DeploymentConfig {
            deployment: Some(AssetDeployment::new("123", "1")),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_filter_subcommand() {
        let filter = command(&["filter", "--company-prefix", "0000000", "--iar-prefix", "1"]);
        run(filter, &DeploymentConfig::default()).await.unwrap();

        // Nothing configured and no flags given
        assert!(run(command(&["filter"]), &DeploymentConfig::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_deployment_only_blocks_commands_using_it() {
        let config = broken_deployment();

        run(command(&["decode", "3414000000005b0a59ad7320"]), &config).await.unwrap();
        run(command(&["decode", "--json", "3414000000005b0a59ad7320"]), &config).await.unwrap();
        run(command(&["config"]), &config).await.unwrap();

        assert!(run(command(&["capacity"]), &config).await.is_err());
        let overridden = command(&["capacity", "--company-prefix", "0000000", "--iar-prefix", "1"]);
        run(overridden, &config).await.unwrap();
    }

    #[tokio::test]
    async fn test_simulate_provisions_and_resets() {
        let config = DeploymentConfig {
            deployment: Some(AssetDeployment::new("0000000", "1")),
            ..Default::default()
        };
        let simulate = command(&["simulate", "--collection", "0010", "--item", "1234", "--serial", "0"]);
        run(simulate, &config).await.unwrap();

        let bad_serial = command(&["simulate", "--collection", "0010", "--item", "1234", "--serial", "10000"]);
        assert!(run(bad_serial, &config).await.is_err());
        assert!(run(command(&["simulate", "--collection", "0010", "--item", "1", "--serial", "0"]), &broken_deployment())
            .await
            .is_err());
    }

    #[test]
    fn test_encode_matches_known_vector() {
        let config = DeploymentConfig {
            deployment: Some(AssetDeployment::new("0000000", "1")),
            ..Default::default()
        };
        let Commands::Encode(args) = command(&["encode", "--collection", "0010", "--item", "1234", "--serial", "0"]) else {
            panic!("expected encode");
        };
        let (giai, epc) = encode(&config, &args).unwrap();
        assert_eq!(giai, "urn:epc:tag:giai-96:0.0000000.100100012340000");
        assert_eq!(epc, "3414000000005b0a59ad7320");
    }
}
