use super::{management_client, non_empty, report_outcome, CliConfirmer};
use crate::output::{format_time, print_json, print_table};
use anyhow::Context;
use azops_core::config::Config;
use azops_core::confirm::{ActionRequest, ExecutionOutcome, Impact};
use azops_core::keyvault::{DeletedCertificate, KeyVaultClient};
use azops_core::paths;
use clap::Subcommand;

// ---------------------------------------------------------------------------
// Subcommand tree
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum KeyvaultSubcommand {
    /// Manage certificates
    Certificate {
        #[command(subcommand)]
        subcommand: CertificateSubcommand,
    },
}

#[derive(Subcommand)]
pub enum CertificateSubcommand {
    /// Delete a certificate, or purge one that is already deleted
    Remove {
        /// Name of the vault holding the certificate
        #[arg(long, value_parser = non_empty)]
        vault_name: String,
        /// Certificate name
        #[arg(long, value_parser = non_empty)]
        name: String,
        /// Do not ask for confirmation
        #[arg(long)]
        force: bool,
        /// Permanently remove the previously deleted certificate
        #[arg(long)]
        in_removed_state: bool,
        /// Print the deleted certificate
        #[arg(long)]
        pass_thru: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(
    config: &Config,
    confirmer: &mut CliConfirmer,
    subcommand: KeyvaultSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    match subcommand {
        KeyvaultSubcommand::Certificate { subcommand } => match subcommand {
            CertificateSubcommand::Remove {
                vault_name,
                name,
                force,
                in_removed_state,
                pass_thru,
            } => {
                paths::validate_vault_name(&vault_name)?;
                paths::validate_object_name(&name)?;
                if in_removed_state {
                    purge(config, confirmer, &vault_name, &name, force, json)
                } else {
                    remove(config, confirmer, &vault_name, &name, force, pass_thru, json)
                }
            }
        },
    }
}

fn keyvault_client(config: &Config) -> anyhow::Result<KeyVaultClient> {
    Ok(KeyVaultClient::new(management_client(config)?, config))
}

// ---------------------------------------------------------------------------
// remove (soft-delete)
// ---------------------------------------------------------------------------

fn remove(
    config: &Config,
    confirmer: &mut CliConfirmer,
    vault_name: &str,
    name: &str,
    force: bool,
    pass_thru: bool,
    json: bool,
) -> anyhow::Result<()> {
    let request = ActionRequest::new(name, || -> anyhow::Result<DeletedCertificate> {
        Ok(keyvault_client(config)?.delete_certificate(vault_name, name)?)
    })
    .confirm_message(format!("Are you sure you want to remove certificate '{name}'?"))
    .preview_message(format!("Remove certificate '{name}'"))
    .force(force)
    .impact(Impact::High);

    let outcome = confirmer
        .execute(request)
        .with_context(|| format!("failed to remove certificate '{name}' from vault '{vault_name}'"))?;

    match outcome {
        ExecutionOutcome::Executed(cert) if pass_thru => print_certificate(&cert, json),
        ExecutionOutcome::Executed(_) if !json => {
            println!("Removed certificate '{name}' from vault '{vault_name}'.");
            Ok(())
        }
        other => report_outcome(name, &other, json),
    }
}

fn print_certificate(cert: &DeletedCertificate, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(cert);
    }
    print_table(
        &["NAME", "VAULT", "DELETED", "SCHEDULED PURGE", "RECOVERY ID"],
        &[vec![
            cert.name.clone(),
            cert.vault_name.clone(),
            format_time(cert.deleted_date),
            format_time(cert.scheduled_purge_date),
            cert.recovery_id.clone().unwrap_or_default(),
        ]],
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// purge (in removed state)
// ---------------------------------------------------------------------------

fn purge(
    config: &Config,
    confirmer: &mut CliConfirmer,
    vault_name: &str,
    name: &str,
    force: bool,
    json: bool,
) -> anyhow::Result<()> {
    let request = ActionRequest::new(name, || -> anyhow::Result<()> {
        keyvault_client(config)?.purge_certificate(vault_name, name)?;
        Ok(())
    })
    .confirm_message(format!(
        "Are you sure you want to permanently remove the deleted certificate '{name}'? This cannot be undone."
    ))
    .preview_message(format!("Permanently remove deleted certificate '{name}'"))
    .force(force)
    .impact(Impact::High);

    let outcome = confirmer
        .execute(request)
        .with_context(|| format!("failed to purge certificate '{name}' from vault '{vault_name}'"))?;

    if outcome.is_executed() && !json {
        println!("Purged certificate '{name}' from vault '{vault_name}'.");
        return Ok(());
    }
    report_outcome(name, &outcome, json)
}
