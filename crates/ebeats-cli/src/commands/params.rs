//! Parameter listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use anyhow::Result;
use clap::Args;
use ebeats_core::{ParamDescriptor, ParamKind};
use ebeats_synth::{PARAMS, descriptor};

#[derive(Args)]
pub struct ParamsArgs {
    /// Show details for one parameter
    #[arg(value_name = "PARAM")]
    param: Option<String>,
}

pub fn run(args: ParamsArgs) -> Result<()> {
    if let Some(name) = &args.param {
        let desc = descriptor(name).ok_or_else(|| anyhow::anyhow!("Unknown parameter: {name}"))?;
        print_details(desc);
        return Ok(());
    }

    println!("EBeats Parameters");
    println!("=================");
    println!();
    println!("  {:16}  {:20}  {:10}  {}", "Name", "Label", "Default", "Range");
    println!("  {:16}  {:20}  {:10}  {}", "----", "-----", "-------", "-----");
    for desc in &PARAMS {
        println!(
            "  {:16}  {:20}  {:10}  {}",
            desc.name,
            desc.label,
            default_text(desc),
            range_text(desc)
        );
    }
    println!();
    println!("Set with: ebeats render out.wav --set NAME=VALUE");
    Ok(())
}

fn print_details(desc: &ParamDescriptor) {
    println!("{} ({})", desc.name, desc.label);
    println!("{}", "=".repeat(desc.name.len() + desc.label.len() + 3));
    println!();
    println!("  Kind:    {:?}", desc.kind());
    println!("  Default: {}", default_text(desc));
    println!("  Range:   {}", range_text(desc));
    if desc.kind() == ParamKind::Trigger {
        println!();
        println!("  Writing a non-zero value fires a note; it cannot be read back.");
    }
    if !desc.choices.is_empty() {
        println!();
        println!("  Choices:");
        for (i, nick) in desc.choices.iter().enumerate() {
            println!("    {i:2}  {nick}");
        }
    }
}

fn default_text(desc: &ParamDescriptor) -> String {
    match desc.kind() {
        ParamKind::Choice => desc.choice_nick(desc.default).unwrap_or("?").to_string(),
        ParamKind::Trigger => "-".to_string(),
        _ => format!("{}{}", desc.default, desc.unit.suffix()),
    }
}

fn range_text(desc: &ParamDescriptor) -> String {
    match desc.kind() {
        ParamKind::Choice => desc.choices.join(" | "),
        _ => format!(
            "{}..{}{}",
            desc.min,
            desc.max,
            desc.unit.suffix()
        ),
    }
}
