//! Steam client frame and identifier inspector
//!
//! Usage:
//!   steam-inspect packet 2703000024020...
//!   steam-inspect steamid "[U:1:8983980]"
//!   steam-inspect jobid 18446744073709551615
//!   steam-inspect gameid 440
//!   steam-inspect --config ~/.steam/net.toml config

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use serde_json::json;
use steam_codec::{AnyPacketMsg, PacketDecoder, PacketMessage};
use steam_config::{init_logging, NetConfig};
use steam_types::{GameId, JobId, SteamId};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "steam-inspect")]
#[command(about = "Decode Steam client frames and identifiers")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode the header of a hex-encoded frame and show how it routes
    Packet {
        /// Frame bytes as hex; whitespace is ignored
        hex: String,
    },
    /// Show every form of a SteamID given as text or a decimal u64
    Steamid { value: String },
    /// Break a job id into its GlobalID fields
    Jobid { value: u64 },
    /// Break a game id into app id, type and mod id
    Gameid { value: u64 },
    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = NetConfig::load(args.config.as_deref())?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
        config.logging.filter = None;
    }
    if args.json_logs {
        config.logging.json = true;
    }
    init_logging(&config.logging)?;
    debug!(?config, "Configuration loaded");

    match &args.command {
        Command::Packet { hex } => inspect_packet(&config, hex, args.json),
        Command::Steamid { value } => inspect_steam_id(value, args.json),
        Command::Jobid { value } => inspect_job_id(JobId::from_u64(*value), args.json),
        Command::Gameid { value } => inspect_game_id(GameId::from_u64(*value), args.json),
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn inspect_packet(config: &NetConfig, text: &str, as_json: bool) -> Result<()> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let data = hex::decode(&cleaned).context("Frame is not valid hex")?;
    info!(len = data.len(), "Decoding frame");

    let decoder = PacketDecoder::new(config.codec.clone());
    let packet = decoder.decode(Bytes::from(data))?;
    let header = packet.header();

    let steam_id = header.steam_id();
    let session_id = header.session_id();
    let variant = match &packet {
        AnyPacketMsg::Basic(_) => "PacketMsg",
        AnyPacketMsg::Extended(_) => "PacketClientMsg",
        AnyPacketMsg::Protobuf(_) => "PacketClientMsgProtobuf",
    };

    if as_json {
        let mut value = json!({
            "packet": variant,
            "header": packet.header_kind().name(),
            "msg_type": packet.msg_type().value(),
            "msg_name": packet.msg_type().name(),
            "is_proto": packet.is_proto(),
            "target_job_id": packet.target_job_id().to_u64(),
            "source_job_id": packet.source_job_id().to_u64(),
            "steam_id": steam_id.map(SteamId::to_u64),
            "session_id": session_id,
            "len": packet.data().len(),
        });
        if let AnyPacketMsg::Protobuf(view) = &packet {
            let proto = view.proto_header();
            value["routing_appid"] = json!(proto.routing_appid);
            value["eresult"] = json!(proto.eresult());
            value["error_message"] = json!(proto.error_message);
            value["target_job_name"] = json!(proto.target_job_name);
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("packet:        {variant}");
    println!("header:        {}", packet.header_kind());
    println!("msg type:      {}", packet.msg_type());
    println!("protobuf:      {}", packet.is_proto());
    println!("target job:    {}", describe_job(packet.target_job_id()));
    println!("source job:    {}", describe_job(packet.source_job_id()));
    if let Some(steam_id) = steam_id {
        println!("steam id:      {} {}", steam_id.to_u64(), steam_id.render(true));
    }
    if let Some(session_id) = session_id {
        println!("session id:    {session_id}");
    }
    if let AnyPacketMsg::Protobuf(view) = &packet {
        let proto = view.proto_header();
        println!("eresult:       {}", proto.eresult());
        if let Some(app_id) = proto.routing_appid {
            println!("routing app:   {app_id}");
        }
        if let Some(name) = &proto.target_job_name {
            println!("target name:   {name}");
        }
        if let Some(message) = &proto.error_message {
            println!("error message: {message}");
        }
    }
    println!("frame length:  {}", packet.data().len());
    Ok(())
}

fn describe_job(job_id: JobId) -> String {
    if job_id.is_valid() {
        format!("{job_id} (seq {}, started {})", job_id.sequential_count(), job_id.start_time())
    } else {
        "none".to_string()
    }
}

fn parse_steam_id(value: &str) -> Result<SteamId> {
    if let Ok(raw) = value.parse::<u64>() {
        return Ok(SteamId::from_u64(raw));
    }
    match value.parse::<SteamId>() {
        Ok(steam_id) => Ok(steam_id),
        Err(e) => bail!("Could not parse {value:?} as a SteamID: {e}"),
    }
}

fn inspect_steam_id(value: &str, as_json: bool) -> Result<()> {
    let steam_id = parse_steam_id(value)?;

    if as_json {
        let value = json!({
            "steam_id": steam_id.to_u64(),
            "steam2": steam_id.render(false),
            "steam3": steam_id.render(true),
            "account_id": steam_id.account_id(),
            "instance": steam_id.account_instance(),
            "account_type": format!("{:?}", steam_id.account_type()),
            "universe": format!("{:?}", steam_id.account_universe()),
            "valid": steam_id.is_valid(),
            "static_account_key": steam_id.static_account_key(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("steam id:      {}", steam_id.to_u64());
    println!("steam2:        {}", steam_id.render(false));
    println!("steam3:        {}", steam_id.render(true));
    println!("account id:    {}", steam_id.account_id());
    println!("instance:      {}", steam_id.account_instance());
    println!("account type:  {:?} ({})", steam_id.account_type(), steam_id.account_type_raw());
    println!("universe:      {:?} ({})", steam_id.account_universe(), steam_id.account_universe_raw());
    println!("valid:         {}", steam_id.is_valid());
    println!("static key:    {}", steam_id.static_account_key());
    if let Some(clan) = steam_id.try_get_clan_id() {
        println!("clan id:       {}", clan.render(true));
    }
    Ok(())
}

fn inspect_job_id(job_id: JobId, as_json: bool) -> Result<()> {
    if as_json {
        let value = json!({
            "job_id": job_id.to_u64(),
            "valid": job_id.is_valid(),
            "sequential_count": job_id.sequential_count(),
            "start_time": job_id.start_time().to_rfc3339(),
            "process_id": job_id.process_id(),
            "box_id": job_id.box_id(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("job id:        {job_id}");
    println!("valid:         {}", job_id.is_valid());
    println!("sequence:      {}", job_id.sequential_count());
    println!("start time:    {}", job_id.start_time());
    println!("process id:    {}", job_id.process_id());
    println!("box id:        {}", job_id.box_id());
    Ok(())
}

fn inspect_game_id(game_id: GameId, as_json: bool) -> Result<()> {
    let app_type = match game_id.app_type() {
        Some(app_type) => format!("{app_type:?}"),
        None => format!("Unknown({})", game_id.app_type_raw()),
    };

    if as_json {
        let value = json!({
            "game_id": game_id.to_u64(),
            "app_id": game_id.app_id(),
            "app_type": app_type,
            "mod_id": game_id.mod_id(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("game id:       {game_id}");
    println!("app id:        {}", game_id.app_id());
    println!("app type:      {app_type}");
    println!("mod id:        {:#010x}", game_id.mod_id());
    Ok(())
}
