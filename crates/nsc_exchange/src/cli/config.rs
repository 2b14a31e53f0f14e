//! Config command - Show the resolved configuration
//!
//! The password is always masked; this output ends up in terminals and
//! support bundles.

use nsc_exchange::ExchangeConfig;

pub struct ConfigArgs {
    pub json: bool,
}

const MASK: &str = "********";

pub fn run(config: &ExchangeConfig, args: ConfigArgs) -> anyhow::Result<()> {
    if args.json {
        let output = serde_json::json!({
            "ftp": {
                "host": config.ftp.host,
                "port": config.ftp.port,
                "username": config.ftp.username,
                "password": MASK,
                "protocol": config.ftp.protocol,
                "receive_path": config.ftp.receive_path,
                "send_path": config.ftp.send_path,
            },
            "local": {
                "receive_path": config.local.receive_path,
                "send_path": config.local.send_path,
                "archive_path": config.local.archive_path,
                "log_file": config.local.log_file,
                "file_path": config.local.file_path,
            },
            "rules": config.rules.rules().iter().map(|r| r.name.clone()).collect::<Vec<_>>(),
            "import": config.import.as_ref().map(|i| {
                serde_json::json!({ "type": i.report_type.as_str(), "cmd": i.cmd })
            }),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("ENDPOINT");
    println!("  Host:      {}:{}", config.ftp.host, config.ftp.port);
    println!("  User:      {}", config.ftp.username);
    println!("  Password:  {MASK}");
    println!("  Protocol:  {}", config.ftp.protocol);
    println!("  Receive:   {}", config.ftp.receive_path);
    println!("  Send:      {}", config.ftp.send_path);
    println!();
    println!("LOCAL");
    println!("  Receive:   {}", config.local.receive_path.display());
    println!("  Send:      {}", config.local.send_path.display());
    println!("  Archive:   {}", config.local.archive_path.display());
    println!("  Staging:   {}", config.local.file_path.display());
    println!("  Journal:   {}", config.local.log_file.display());
    println!();
    println!("RULES: {}", config.rules.len());
    match &config.import {
        Some(import) => println!("IMPORT: {} -> {}", import.report_type.as_str(), import.cmd),
        None => println!("IMPORT: disabled"),
    }

    Ok(())
}
