//! Send command - Upload and archive outbound files

use nsc_exchange::{open_transport, send_files, ExchangeConfig, Journal};

pub struct SendArgs {
    pub json: bool,
}

pub fn run(config: &ExchangeConfig, args: SendArgs) -> anyhow::Result<()> {
    let mut transport = open_transport(&config.ftp, &config.ftp.send_path)?;
    let journal = Journal::open(&config.local.log_file)?;

    let report = send_files(config, transport.as_mut(), &journal)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.listed == 0 {
        println!("No files to send");
        return Ok(());
    }
    println!("{} files uploaded and archived", report.sent);
    if report.upload_failed > 0 {
        println!("{} uploads failed (files left in the send directory)", report.upload_failed);
    }

    Ok(())
}
