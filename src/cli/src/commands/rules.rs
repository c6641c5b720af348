//! Route-rule table listing.

use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;

use artifact_core::auth::{Access, MethodPattern, PathPattern, PolicyEngine};

use crate::output::{self, OutputFormat};

#[derive(Tabled, Serialize)]
struct RuleRow {
    #[tabled(rename = "Rule")]
    rule: String,
    #[tabled(rename = "Methods")]
    methods: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Access")]
    access: String,
}

pub fn execute(format: OutputFormat) -> Result<()> {
    let engine = PolicyEngine::new();

    let rows: Vec<RuleRow> = engine
        .rules()
        .iter()
        .map(|rule| RuleRow {
            rule: rule.name.to_string(),
            methods: match &rule.methods {
                MethodPattern::Any => "*".to_string(),
                MethodPattern::Only(methods) => methods
                    .iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join("|"),
            },
            path: match &rule.path {
                PathPattern::Any => "/**".to_string(),
                PathPattern::Exact(p) => p.to_string(),
                PathPattern::Prefix(p) => format!("{}/**", p),
            },
            access: match &rule.access {
                Access::Public => "public".to_string(),
                Access::Authenticated => "authenticated".to_string(),
                Access::AnyOf(roles) => format!(
                    "any of: {}",
                    roles
                        .iter()
                        .map(|r| r.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            },
        })
        .collect();

    output::print_list(&rows, format);
    Ok(())
}
