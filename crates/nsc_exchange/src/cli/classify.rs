//! Classify command - Preview the outcome for one filename
//!
//! Runs the full parse -> classify -> render -> dispatch chain without
//! touching the filesystem, so a rule author can check what a delivery
//! would do before it arrives.

use nsc_engine::{build_invocation, classify, should_import, ConventionFields};
use nsc_exchange::ExchangeConfig;

pub struct ClassifyArgs {
    pub filename: String,
    pub json: bool,
}

pub fn run(config: &ExchangeConfig, args: ClassifyArgs) -> anyhow::Result<()> {
    let fields = match ConventionFields::parse(&args.filename) {
        Ok(fields) => fields,
        Err(err) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "filename": args.filename,
                        "outcome": "unparsed",
                        "error": err.to_string(),
                    }))?
                );
            } else {
                println!("UNPARSED: {}", args.filename);
                println!("  {err}");
            }
            return Ok(());
        }
    };

    let result = match classify(&fields.submitted, &config.rules) {
        Some(result) => result,
        None => {
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "filename": args.filename,
                        "outcome": "unmatched",
                        "fields": fields,
                    }))?
                );
            } else {
                println!("NO MATCH: '{}' matches no configured rule", fields.submitted);
            }
            return Ok(());
        }
    };

    let rendered = result.render(&fields)?;

    let import = config.import.as_ref().and_then(|settings| {
        if !should_import(result.rule, &fields, settings.report_type) {
            return None;
        }
        let entry = config.local.receive_path.join(&rendered);
        build_invocation(&settings.cmd, &entry.display().to_string(), &fields).ok()
    });

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "filename": args.filename,
                "outcome": "matched",
                "rule": result.rule.name,
                "captures": result.captures,
                "fields": fields,
                "rendered": rendered,
                "import": import,
            }))?
        );
        return Ok(());
    }

    println!("MATCH: {}", result.rule.name);
    println!();
    println!("  Submitted: {}", fields.submitted);
    println!("  Type:      {}", fields.nsctype.as_str());
    println!("  Mode:      {}", fields.nscmode.as_str());
    println!("  Rendered:  {rendered}");
    if !result.captures.is_empty() {
        println!();
        println!("CAPTURES:");
        for (name, value) in &result.captures {
            println!("  {name} = {value}");
        }
    }
    match import {
        Some(invocation) => {
            println!();
            println!(
                "IMPORT: {} {}",
                invocation.program,
                invocation.args.join(" ")
            );
        }
        None => {
            println!();
            println!("IMPORT: no");
        }
    }

    Ok(())
}
