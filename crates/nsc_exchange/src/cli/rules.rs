//! Rules command - Inspect configured classification rules

use crate::cli::output::{print_table, yes_no};
use clap::Subcommand;
use nsc_engine::classify;
use nsc_exchange::ExchangeConfig;

/// Subcommands for rule inspection
#[derive(Subcommand, Debug, Clone)]
pub enum RulesAction {
    /// List rules in precedence order
    List {
        #[arg(long)]
        json: bool,
    },
    /// Test a submitted-name fragment against the rule set
    Test {
        /// Submitted-name fragment (the part after the convention prefix)
        fragment: String,
    },
}

pub fn run(config: &ExchangeConfig, action: RulesAction) -> anyhow::Result<()> {
    match action {
        RulesAction::List { json } => list_rules(config, json),
        RulesAction::Test { fragment } => test_fragment(config, &fragment),
    }
}

fn list_rules(config: &ExchangeConfig, json: bool) -> anyhow::Result<()> {
    let rules = config.rules.rules();

    if rules.is_empty() {
        println!("No rename rules configured.");
        return Ok(());
    }

    if json {
        let output: Vec<_> = rules
            .iter()
            .map(|rule| {
                serde_json::json!({
                    "name": rule.name,
                    "mode": rule.mode.as_str(),
                    "pattern": rule.pattern,
                    "replace": rule.replace,
                    "import": rule.import,
                    "desc": rule.desc,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("RULES (applied in configuration order, first match wins)");

    let rows = rules
        .iter()
        .map(|rule| {
            vec![
                rule.name.clone(),
                rule.mode.as_str().to_string(),
                rule.pattern.clone(),
                rule.replace.clone(),
                yes_no(rule.import),
            ]
        })
        .collect();
    print_table(&["NAME", "MODE", "PATTERN", "REPLACE", "IMPORT"], rows);
    println!();
    println!("{} rules", rules.len());

    Ok(())
}

fn test_fragment(config: &ExchangeConfig, fragment: &str) -> anyhow::Result<()> {
    match classify(fragment, &config.rules) {
        Some(result) => {
            println!(
                "MATCH: '{}' matches rule '{}' (pattern '{}')",
                fragment, result.rule.name, result.rule.pattern
            );
            for (name, value) in &result.captures {
                println!("  {name} = {value}");
            }
        }
        None => {
            println!("NO MATCH: '{fragment}' matches no configured rule");
            println!();
            println!("Patterns are tried in this order:");
            for rule in config.rules.rules() {
                println!("  {}: {}", rule.name, rule.pattern);
            }
        }
    }
    Ok(())
}
