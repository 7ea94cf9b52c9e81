use super::{management_client, non_empty, report_outcome, CliConfirmer};
use crate::output::{format_time, print_json, print_table};
use anyhow::Context;
use azops_core::automation::{AutomationClient, NewVariable, Variable};
use azops_core::config::Config;
use azops_core::confirm::{ActionRequest, ExecutionOutcome, Impact};
use azops_core::paths;
use clap::{Args, Subcommand};

// ---------------------------------------------------------------------------
// Subcommand tree
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum AutomationSubcommand {
    /// Manage automation account variables
    Variable {
        #[command(subcommand)]
        subcommand: VariableSubcommand,
    },
}

/// Account scope shared by every variable command.
#[derive(Args)]
pub struct AccountScope {
    /// Automation account name (default: defaults.automation_account)
    #[arg(long)]
    account: Option<String>,
    /// Resource group of the account (default: defaults.resource_group)
    #[arg(long)]
    resource_group: Option<String>,
}

#[derive(Subcommand)]
pub enum VariableSubcommand {
    /// Create a variable
    New {
        #[command(flatten)]
        scope: AccountScope,
        /// Variable name
        #[arg(long, value_parser = non_empty)]
        name: String,
        /// Store the value encrypted
        #[arg(long)]
        encrypted: bool,
        /// Description of the variable
        #[arg(long)]
        description: Option<String>,
        /// Value of the variable
        #[arg(long)]
        value: Option<String>,
    },
    /// Remove a variable
    Remove {
        #[command(flatten)]
        scope: AccountScope,
        /// Variable name
        #[arg(long, value_parser = non_empty)]
        name: String,
        /// Do not ask for confirmation
        #[arg(long)]
        force: bool,
        /// Print the removed variable's identity
        #[arg(long)]
        pass_thru: bool,
    },
}

/// Fully resolved and validated target of a variable command.
struct Target {
    subscription: String,
    resource_group: String,
    account: String,
}

impl Target {
    fn resolve(config: &Config, subscription: Option<&str>, scope: &AccountScope) -> anyhow::Result<Self> {
        let target = Self {
            subscription: config.subscription(subscription)?,
            resource_group: config.resource_group(scope.resource_group.as_deref())?,
            account: config.automation_account(scope.account.as_deref())?,
        };
        paths::validate_subscription_id(&target.subscription)?;
        paths::validate_resource_group(&target.resource_group)?;
        paths::validate_account_name(&target.account)?;
        Ok(target)
    }

    fn client(&self, config: &Config) -> anyhow::Result<AutomationClient> {
        Ok(AutomationClient::new(
            management_client(config)?,
            config,
            self.subscription.as_str(),
        ))
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(
    config: &Config,
    confirmer: &mut CliConfirmer,
    subscription: Option<&str>,
    subcommand: AutomationSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    let AutomationSubcommand::Variable { subcommand } = subcommand;
    match subcommand {
        VariableSubcommand::New {
            scope,
            name,
            encrypted,
            description,
            value,
        } => {
            paths::validate_variable_name(&name)?;
            let target = Target::resolve(config, subscription, &scope)?;
            let variable = NewVariable {
                name,
                value,
                description,
                encrypted,
            };
            new_variable(config, confirmer, &target, &variable, json)
        }
        VariableSubcommand::Remove {
            scope,
            name,
            force,
            pass_thru,
        } => {
            paths::validate_variable_name(&name)?;
            let target = Target::resolve(config, subscription, &scope)?;
            remove_variable(config, confirmer, &target, &name, force, pass_thru, json)
        }
    }
}

// ---------------------------------------------------------------------------
// new
// ---------------------------------------------------------------------------

fn new_variable(
    config: &Config,
    confirmer: &mut CliConfirmer,
    target: &Target,
    variable: &NewVariable,
    json: bool,
) -> anyhow::Result<()> {
    let name = variable.name.as_str();
    let request = ActionRequest::new(name, || -> anyhow::Result<Variable> {
        Ok(target
            .client(config)?
            .create_variable(&target.resource_group, &target.account, variable)?)
    })
    .confirm_message(format!(
        "Are you sure you want to create variable '{name}' in automation account '{}'?",
        target.account
    ))
    .preview_message(format!(
        "Create variable '{name}' in automation account '{}'",
        target.account
    ))
    .impact(Impact::Medium);

    let outcome = confirmer
        .execute(request)
        .with_context(|| format!("failed to create variable '{name}'"))?;

    match outcome {
        ExecutionOutcome::Executed(var) => print_variable(&var, json),
        other => report_outcome(name, &other, json),
    }
}

fn print_variable(var: &Variable, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(var);
    }
    print_table(
        &["NAME", "ACCOUNT", "ENCRYPTED", "VALUE", "CREATED", "DESCRIPTION"],
        &[vec![
            var.name.clone(),
            var.automation_account_name.clone(),
            var.encrypted.to_string(),
            var.display_value(),
            format_time(var.creation_time),
            var.description.clone().unwrap_or_default(),
        ]],
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// remove
// ---------------------------------------------------------------------------

fn remove_variable(
    config: &Config,
    confirmer: &mut CliConfirmer,
    target: &Target,
    name: &str,
    force: bool,
    pass_thru: bool,
    json: bool,
) -> anyhow::Result<()> {
    let request = ActionRequest::new(name, || -> anyhow::Result<()> {
        target
            .client(config)?
            .delete_variable(&target.resource_group, &target.account, name)?;
        Ok(())
    })
    .confirm_message(format!("Are you sure you want to remove variable '{name}'?"))
    .preview_message(format!("Remove variable '{name}'"))
    .force(force)
    .impact(Impact::High);

    let outcome = confirmer
        .execute(request)
        .with_context(|| format!("failed to remove variable '{name}'"))?;

    match outcome {
        ExecutionOutcome::Executed(()) if pass_thru => {
            let removed = serde_json::json!({
                "name": name,
                "automation_account_name": target.account,
                "removed": true,
            });
            if json {
                print_json(&removed)
            } else {
                print_table(
                    &["NAME", "ACCOUNT", "REMOVED"],
                    &[vec![name.to_string(), target.account.clone(), "true".to_string()]],
                );
                Ok(())
            }
        }
        ExecutionOutcome::Executed(()) if !json => {
            println!("Removed variable '{name}' from automation account '{}'.", target.account);
            Ok(())
        }
        other => report_outcome(name, &other, json),
    }
}
