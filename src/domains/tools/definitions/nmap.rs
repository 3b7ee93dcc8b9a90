//! Network port scan tool definition.
//!
//! Wraps the external `nmap` command line scanner. Only a single host may be
//! scanned per call; ranges, CIDR blocks, wildcards and lists are refused
//! before anything is executed. The process is started directly (no shell)
//! and is killed if the invocation times out or is cancelled.

use regex::{Regex, RegexSet};
use std::net::IpAddr;
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::process::Command;
use tracing::{error, info, instrument};

use crate::core::config::Config;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::handlers::{ToolHandler, ToolModule};
use crate::domains::tools::registry::{ToolDescriptor, ToolRegistry};
use crate::domains::tools::schema::{ParamSpec, ParamType, ToolArgs};

// ============================================================================
// Configuration & Constants
// ============================================================================

const SCAN_TIMEOUT_SECS: u64 = 60;
const RESOLVE_TIMEOUT_SECS: u64 = 10;

static MULTI_TARGET_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"\d+\.\d+\.\d+\.\d+/\d+", // CIDR
        r"\d+\.\d+\.\d+\.\d+-\d+", // range
        r"\d+\.\d+\.\d+\.\*",      // wildcard
        r",",                      // list
        r"\s+",                    // list
    ])
    .expect("target patterns are valid")
});

static PORT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d,-]+$").expect("port pattern is valid"));

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the scan tool, after validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NmapScanParams {
    /// IP address or hostname to scan.
    pub ip: String,
    /// Caller name, for logging.
    pub full_name: String,
    /// Port specification ("80", "80,443", "1-1000").
    pub port: Option<String>,
    /// Scan type flag, e.g. "-sS" or "-sU".
    pub scan_type: Option<String>,
    /// Adds "-O".
    pub os_detection: bool,
    /// Adds "-sV".
    pub service_version: bool,
    /// Further nmap arguments, split on whitespace.
    pub extra_args: Option<String>,
}

impl NmapScanParams {
    fn from_args(args: &ToolArgs) -> Result<Self, ToolError> {
        Ok(Self {
            ip: args.string("ip")?,
            full_name: args.string("full_name")?,
            port: args.opt_string("port")?,
            scan_type: args.opt_string("scan_type")?,
            os_detection: args.flag("os_detection")?,
            service_version: args.flag("service_version")?,
            extra_args: args.opt_string("extra_args")?,
        })
    }

    fn schema() -> Vec<ParamSpec> {
        vec![
            ParamSpec::required(
                "ip",
                ParamType::String,
                "IP or hostname to scan (e.g. \"192.168.1.1\" or \"example.com\")",
            ),
            ParamSpec::required("full_name", ParamType::String, "Full name for logging"),
            ParamSpec::optional(
                "port",
                ParamType::String,
                "Port specification (\"80\", \"80,443\", \"1-1000\")",
            ),
            ParamSpec::optional(
                "scan_type",
                ParamType::String,
                "Scan type (e.g. \"-sS\" for SYN, \"-sU\" for UDP)",
            ),
            ParamSpec::optional("os_detection", ParamType::Boolean, "Enable OS detection (-O)")
                .with_default(serde_json::json!(false)),
            ParamSpec::optional(
                "service_version",
                ParamType::Boolean,
                "Enable service version detection (-sV)",
            )
            .with_default(serde_json::json!(false)),
            ParamSpec::optional(
                "extra_args",
                ParamType::String,
                "Other nmap arguments, split on whitespace",
            ),
        ]
    }
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Port scanner module.
pub struct NmapModule;

impl NmapModule {
    /// Module name as matched by discovery.
    pub const MODULE: &'static str = "nmap";

    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "nmap_scan";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Run an nmap scan against a single IP address or hostname, with optional port selection, scan type, OS detection and service version detection.";
}

impl ToolModule for NmapModule {
    fn name(&self) -> &'static str {
        Self::MODULE
    }

    fn register(&self, registry: &mut ToolRegistry, config: &Config) -> Result<(), ToolError> {
        let scanner = NmapScanner::new(config.tools.nmap_path.clone());
        registry.register(
            ToolDescriptor::new(Self::NAME, Self::DESCRIPTION, scanner)
                .params(NmapScanParams::schema())
                // Leave room for resolution so the scan's own timeout reports first.
                .timeout(Duration::from_secs(SCAN_TIMEOUT_SECS + RESOLVE_TIMEOUT_SECS + 5)),
        )
    }
}

/// Runs the scanner binary.
pub struct NmapScanner {
    binary: String,
}

impl NmapScanner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Execute the tool logic.
    #[instrument(skip_all, fields(ip = %params.ip))]
    pub async fn execute(&self, params: &NmapScanParams) -> Result<String, ToolError> {
        info!(
            "🔧 Tool called: nmap_scan(ip='{}', port={:?}, scan_type={:?}, os_detection={}, service_version={}, extra_args={:?}) by {}",
            params.ip,
            params.port,
            params.scan_type,
            params.os_detection,
            params.service_version,
            params.extra_args,
            params.full_name
        );

        let target = params.ip.trim();
        check_single_target(target)?;
        let target = resolve_target(target).await?;
        let args = build_scan_args(params, &target)?;

        info!("Executing nmap command: {} {}", self.binary, args.join(" "));

        let output = tokio::time::timeout(
            Duration::from_secs(SCAN_TIMEOUT_SECS),
            Command::new(&self.binary)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| {
            error!("Nmap scan timed out");
            ToolError::timeout(format!(
                "Nmap scan timed out after {} seconds.",
                SCAN_TIMEOUT_SECS
            ))
        })?
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                error!("Nmap not found on system");
                ToolError::execution("nmap is not installed or not found in PATH.")
            } else {
                ToolError::execution(format!("Failed to run nmap: {}", e))
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => "Unknown error",
                s => s,
            };
            error!("Nmap scan failed: {}", message);
            return Err(ToolError::execution(format!("Nmap scan failed: {}", message)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if stdout.is_empty() {
            return Ok("Nmap completed but returned no output.".to_string());
        }

        info!("Nmap scan completed successfully for {}", target);
        Ok(format!("Nmap scan results for {}:\n\n{}", target, stdout))
    }
}

#[async_trait::async_trait]
impl ToolHandler for NmapScanner {
    async fn call(&self, args: ToolArgs) -> Result<String, ToolError> {
        let params = NmapScanParams::from_args(&args)?;
        self.execute(&params).await
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Refuse anything other than a single host.
fn check_single_target(target: &str) -> Result<(), ToolError> {
    if target.is_empty() {
        return Err(ToolError::execution("Target must not be empty."));
    }
    if MULTI_TARGET_PATTERNS.is_match(target) {
        return Err(ToolError::execution(
            "Only single IP addresses or hostnames are allowed. No ranges, CIDR, or multiple IPs.",
        ));
    }
    if target.starts_with('-') {
        return Err(ToolError::execution("Target must not start with '-'."));
    }
    Ok(())
}

/// IP literals pass through; hostnames must resolve.
async fn resolve_target(target: &str) -> Result<String, ToolError> {
    if target.parse::<IpAddr>().is_ok() {
        return Ok(target.to_string());
    }

    let lookup = tokio::time::timeout(
        Duration::from_secs(RESOLVE_TIMEOUT_SECS),
        tokio::net::lookup_host((target, 0)),
    )
    .await
    .map_err(|_| ToolError::timeout(format!("Resolving '{}' timed out", target)))?;

    let resolved = lookup.map(|mut addrs| addrs.next().is_some()).unwrap_or(false);
    if !resolved {
        return Err(ToolError::execution(format!(
            "Cannot resolve hostname '{}'",
            target
        )));
    }
    Ok(target.to_string())
}

/// Build the argument vector: flags, ports, extras, then timing and target.
fn build_scan_args(params: &NmapScanParams, target: &str) -> Result<Vec<String>, ToolError> {
    let mut args = Vec::new();

    if let Some(scan_type) = params.scan_type.as_deref().map(str::trim) {
        if !scan_type.is_empty() {
            args.push(scan_type.to_string());
        }
    }
    if params.os_detection {
        args.push("-O".to_string());
    }
    if params.service_version {
        args.push("-sV".to_string());
    }
    if let Some(port) = params
        .port
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        if !PORT_PATTERN.is_match(port) {
            return Err(ToolError::execution(
                "Invalid port format. Use single port (80), multiple ports (80,443), or range (1-1000).",
            ));
        }
        args.push("-p".to_string());
        args.push(port.to_string());
    }
    if let Some(extra) = &params.extra_args {
        args.extend(extra.split_whitespace().map(str::to_string));
    }

    args.extend(["-T4".to_string(), "--open".to_string(), target.to_string()]);
    Ok(args)
}

// ============================================================================
// Tests
// ============================================================================
