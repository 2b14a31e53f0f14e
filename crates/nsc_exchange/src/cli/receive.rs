//! Receive command - Retrieve, classify, and place incoming files

use nsc_exchange::{open_transport, receive_files, ExchangeConfig, Journal, ReceiveOptions};

pub struct ReceiveArgs {
    pub dry_run: bool,
    pub json: bool,
}

pub fn run(config: &ExchangeConfig, args: ReceiveArgs) -> anyhow::Result<()> {
    let mut transport = open_transport(&config.ftp, &config.ftp.receive_path)?;
    let journal = Journal::open(&config.local.log_file)?;

    let report = receive_files(
        config,
        transport.as_mut(),
        &journal,
        &ReceiveOptions {
            dry_run: args.dry_run,
        },
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.dry_run {
        println!("DRY RUN (nothing fetched, moved, or imported)");
    }
    println!("{} remote entries, {} skipped as already seen", report.listed, report.skipped_older);
    println!("  received:      {}", report.received);
    println!("  imported:      {}", report.imported);
    println!("  unmatched:     {}", report.unmatched);
    println!("  unparsed:      {}", report.unparsed);
    if report.import_failed > 0 {
        println!("  import failed: {}", report.import_failed);
    }
    if report.render_failed > 0 {
        println!("  render failed: {}", report.render_failed);
    }
    if report.ack_failed > 0 {
        println!("  ack failed:    {}", report.ack_failed);
    }
    if report.fetch_failed > 0 {
        println!("  fetch failed:  {}", report.fetch_failed);
    }

    Ok(())
}
