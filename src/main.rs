//! Zentinel Shibboleth check
//!
//! Runs one reconciliation against a simulated request and prints the
//! outcome, the resulting session token and the login/logout URLs as JSON.
//! Useful for verifying an attribute map against what the SP agent exports.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use zentinel_agent_shibboleth::{
    MemorySession, ReconciliationEngine, RequestContext, ResolverHandle, SessionStore,
    ShibbolethConfig, ShibbolethConfigJson, StaticResolver, TracingEventSink,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "zentinel-shib-check")]
#[command(about = "Reconcile a simulated Shibboleth request and print the result")]
struct Args {
    /// Path to JSON configuration file
    #[arg(long, env = "SHIB_CONFIG")]
    config: Option<PathBuf>,

    /// Inline JSON overrides (kebab-case keys) applied after the file
    #[arg(long, env = "SHIB_CONFIG_JSON")]
    overrides: Option<String>,

    /// Request header as "Name: value" (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Server variable as "NAME=value" (repeatable)
    #[arg(long = "server-var")]
    server_vars: Vec<String>,

    /// Request host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Request path and query
    #[arg(long, default_value = "/")]
    uri: String,

    /// Request scheme
    #[arg(long, default_value = "https")]
    scheme: String,

    /// Known account as "name" or "name:ROLE1,ROLE2" (repeatable)
    #[arg(long = "user")]
    users: Vec<String>,

    /// Synthesize transient principals for unknown names
    #[arg(long, env = "SHIB_SYNTHESIZE")]
    synthesize: bool,

    /// Role granted to synthesized principals (repeatable)
    #[arg(long = "transient-role")]
    transient_roles: Vec<String>,

    /// Log out after reconciling
    #[arg(long)]
    logout: bool,

    /// Enable verbose logging
    #[arg(short, long, env = "SHIB_VERBOSE")]
    verbose: bool,
}

/// Parse a `Name: value` header argument.
fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("Invalid header '{}', expected 'Name: value'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("Invalid header '{}', empty name", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Parse a `NAME=value` server variable argument.
fn parse_server_var(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid server variable '{}', expected 'NAME=value'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("Invalid server variable '{}', empty name", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

fn load_config(args: &Args) -> Result<ShibbolethConfig> {
    let mut config = match &args.config {
        Some(path) => ShibbolethConfig::from_file(path)?,
        None => ShibbolethConfig::default(),
    };

    if let Some(raw) = &args.overrides {
        let overlay: ShibbolethConfigJson =
            serde_json::from_str(raw).context("Failed to parse config overrides")?;
        overlay.apply_to(&mut config);
    }

    config.validate().map_err(|e| anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

fn build_request(args: &Args) -> Result<RequestContext> {
    let mut request = RequestContext::new(&args.host, &args.uri).with_scheme(&args.scheme);
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        request = request.with_header(name, value);
    }
    for raw in &args.server_vars {
        let (name, value) = parse_server_var(raw)?;
        request = request.with_server_var(name, value);
    }
    Ok(request)
}

fn build_resolver(args: &Args) -> Result<ResolverHandle> {
    let users = args
        .users
        .iter()
        .map(|raw| {
            StaticResolver::parse_user(raw).ok_or_else(|| anyhow!("Invalid user '{}'", raw))
        })
        .collect::<Result<Vec<_>>>()?;

    let resolver = StaticResolver::new(users).with_transient_roles(args.transient_roles.clone());
    debug!(users = resolver.len(), synthesize = args.synthesize, "Resolver built");

    Ok(if args.synthesize {
        ResolverHandle::with_synthesis(Arc::new(resolver))
    } else {
        ResolverHandle::new(Arc::new(resolver))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays machine-readable
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "zentinel_agent_shibboleth={},{}={}",
            log_level,
            env!("CARGO_CRATE_NAME"),
            log_level
        ))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = load_config(&args)?;
    info!(
        handler_path = %config.handler_path,
        use_headers = config.use_headers,
        custom_attributes = config.attribute_definitions.len(),
        "Configuration loaded"
    );

    let request = build_request(&args)?;
    let engine = ReconciliationEngine::from_config(&config, build_resolver(&args)?)?
        .with_event_sink(Arc::new(TracingEventSink));

    let mut session = MemorySession::new();
    let result = engine.reconcile(&request, &mut session).await;

    let logout_handler = engine.logout_handler();
    let logout_url = logout_handler.logout_redirect(&request);
    let logged_out = args.logout && logout_handler.logout(&mut session);

    let report = serde_json::json!({
        "result": result,
        "session": session.current_token(),
        "login_url": engine.entry_point(&request),
        "logout_url": logout_url,
        "logged_out": logged_out,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize report")?
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["zentinel-shib-check"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Shib-Person-Uid: alice").unwrap(),
            ("Shib-Person-Uid".to_string(), "alice".to_string())
        );
        assert_eq!(
            parse_header("Shib-LogoutURL: https://idp/logout").unwrap().1,
            "https://idp/logout"
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn test_parse_server_var() {
        assert_eq!(
            parse_server_var("Shib-Person-Mail=a@x;b@x").unwrap(),
            ("Shib-Person-Mail".to_string(), "a@x;b@x".to_string())
        );
        assert!(parse_server_var("novalue").is_err());
    }

    #[test]
    fn test_load_config_with_overrides() {
        let args = args(&["--overrides", r#"{"use-headers": false, "default-role": "MEMBER"}"#]);
        let config = load_config(&args).unwrap();
        assert!(!config.use_headers);
        assert_eq!(config.default_role, "MEMBER");
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let args = args(&["--overrides", r#"{"handler-path": "Shibboleth.sso"}"#]);
        assert!(load_config(&args).is_err());
    }

    #[tokio::test]
    async fn test_end_to_end() {
        let args = args(&[
            "--host",
            "example.org",
            "--uri",
            "/app",
            "-H",
            "Shib-Identity-Provider: https://idp",
            "-H",
            "Shib-Person-Uid: alice",
            "--user",
            "alice:ADMIN",
        ]);
        let config = load_config(&args).unwrap();
        let engine =
            ReconciliationEngine::from_config(&config, build_resolver(&args).unwrap()).unwrap();
        let request = build_request(&args).unwrap();

        let mut session = MemorySession::new();
        engine.reconcile(&request, &mut session).await;

        let token = session.current_token().unwrap();
        assert_eq!(token.name(), "alice");
        assert!(token.has_role("ADMIN"));
        assert!(token.has_role("USER"));
    }

    #[test]
    fn test_invalid_user_rejected() {
        let args = args(&["--user", ":ADMIN"]);
        assert!(build_resolver(&args).is_err());
    }
}
