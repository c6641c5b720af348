//! Development token minting.
//!
//! Signs an HS256 token carrying provider-shaped role claims, for local
//! testing against a server configured with the same secret. Production
//! tokens come from the identity provider, never from here.

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Args;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use artifact_core::auth::{Claims, IdpType};

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct TokenArgs {
    /// Token subject
    #[arg(short, long, default_value = "dev-user")]
    subject: String,

    /// Raw role tags to embed (e.g. artifact-admin,artifact-user)
    #[arg(short, long, value_delimiter = ',')]
    roles: Vec<String>,

    /// Identity-provider claim shape to mimic (azure or keycloak)
    #[arg(long, default_value = "keycloak")]
    idp: IdpType,

    /// HS256 signing secret; must match the server's auth.hs256_secret
    #[arg(long, env = "ARTIFACT__AUTH__HS256_SECRET", default_value = "dev-secret")]
    secret: String,

    /// Token lifetime in minutes
    #[arg(long, default_value_t = 60)]
    ttl_minutes: i64,
}

pub fn execute(args: TokenArgs, format: OutputFormat) -> Result<()> {
    let builder =
        Claims::builder(args.subject.as_str()).expires_in(Duration::minutes(args.ttl_minutes));

    let claims = match args.idp {
        IdpType::Keycloak => builder.realm_roles(args.roles.clone()).build(),
        IdpType::Azure => builder.roles(args.roles.clone()).build(),
    };

    let normalized = args.idp.normalize(&claims);

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(args.secret.as_bytes()),
    )
    .context("Failed to sign token")?;

    match format {
        OutputFormat::Table => {
            output::print_header("Development Token");
            output::print_detail("Subject", &args.subject);
            output::print_detail("IdP shape", args.idp.as_str());
            output::print_detail("Raw roles", &args.roles.join(", "));
            output::print_detail("Normalized", &normalized.to_string());
            output::print_detail("Expires", &claims.expires_at().to_rfc3339());
            println!();
            println!("{}", token);

            if normalized.is_empty() && !args.roles.is_empty() {
                output::print_error(
                    "None of the given tags normalize to a canonical role; \
the token will fail every role-gated route",
                );
            }
        }
        OutputFormat::Json => {
            output::print_item(
                &serde_json::json!({
                    "token": token,
                    "subject": args.subject,
                    "idp": args.idp.as_str(),
                    "raw_roles": args.roles,
                    "normalized_roles": normalized,
                    "expires_at": claims.expires_at().to_rfc3339(),
                }),
                format,
            );
        }
    }

    Ok(())
}
