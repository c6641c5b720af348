//! Offline policy evaluation.
//!
//! Runs the same rule table the server enforces, without an HTTP stack:
//! useful for answering "would this request be permitted?" before wiring up
//! tokens.

use anyhow::{bail, Result};
use clap::Args;
use colored::*;
use http::Method;

use artifact_core::auth::{Caller, Decision, DenyReason, PolicyEngine, Role};

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct CheckArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE, ...)
    method: String,

    /// Request path (e.g. /api/artifacts/5)
    path: String,

    /// Canonical roles of the caller (admin,user,readonly)
    #[arg(short, long, value_delimiter = ',')]
    roles: Vec<String>,

    /// Evaluate as an unauthenticated caller
    #[arg(long)]
    anonymous: bool,
}

fn parse_role(s: &str) -> Result<Role> {
    match s {
        "admin" => Ok(Role::Admin),
        "user" => Ok(Role::User),
        "readonly" => Ok(Role::ReadOnly),
        other => bail!(
            "unknown role '{}', expected one of: admin, user, readonly",
            other
        ),
    }
}

pub fn execute(args: CheckArgs, format: OutputFormat) -> Result<()> {
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .map_err(|_| anyhow::anyhow!("invalid HTTP method '{}'", args.method))?;

    let caller = if args.anonymous {
        Caller::anonymous()
    } else {
        let roles = args
            .roles
            .iter()
            .map(|s| parse_role(s))
            .collect::<Result<Vec<Role>>>()?;
        Caller::with_roles(roles.into_iter().collect())
    };

    let engine = PolicyEngine::new();
    let decision = engine.evaluate(&method, &args.path, &caller);
    let rule = engine.matching_rule(&method, &args.path);

    match format {
        OutputFormat::Table => {
            output::print_header("Policy Decision");
            output::print_detail("Request", &format!("{} {}", method, args.path));
            output::print_detail(
                "Caller",
                &match &caller {
                    Caller::Anonymous => "anonymous".to_string(),
                    Caller::Authenticated(roles) => format!("authenticated {}", roles),
                },
            );
            if let Some(rule) = rule {
                output::print_detail("Matched rule", rule.name);
            }
            println!();
            match decision {
                Decision::Permit => println!("{}", "PERMIT".green().bold()),
                Decision::Deny(DenyReason::Unauthenticated) => {
                    println!("{} {}", "DENY".red().bold(), "(unauthenticated, HTTP 401)")
                }
                Decision::Deny(DenyReason::InsufficientRole) => {
                    println!("{} {}", "DENY".red().bold(), "(insufficient role, HTTP 403)")
                }
            }
        }
        OutputFormat::Json => {
            output::print_item(
                &serde_json::json!({
                    "method": method.as_str(),
                    "path": args.path,
                    "anonymous": args.anonymous,
                    "matched_rule": rule.map(|r| r.name),
                    "decision": match decision {
                        Decision::Permit => "permit",
                        Decision::Deny(_) => "deny",
                    },
                    "deny_reason": match decision {
                        Decision::Permit => None,
                        Decision::Deny(DenyReason::Unauthenticated) => Some("unauthenticated"),
                        Decision::Deny(DenyReason::InsufficientRole) => Some("insufficient_role"),
                    },
                }),
                format,
            );
        }
    }

    Ok(())
}
