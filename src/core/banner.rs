//! Startup banner.
//!
//! Printed once, after discovery and before the transport binds. It goes to
//! stderr because the STDIO transport owns stdout.

use super::config::Config;
use crate::domains::tools::DiscoveryReport;

const ASCII_BANNER: &str = r"
      _____             _        __  __  _____ _____
     / ____|           | |      |  \/  |/ ____|  __ \
    | (___   __ _ _ __ | |_ ___ | \  / | |    | |__) |
     \___ \ / _` | '_ \| __/ _ \| |\/| | |    |  ___/
     ____) | (_| | | | | || (_) | |  | | |____| |
    |_____/ \__,_|_| |_|\__\___/|_|  |_|\_____|_|
";

/// Render the banner text.
pub fn render_banner(config: &Config, report: &DiscoveryReport, tool_count: usize) -> String {
    let mut lines = vec![
        ASCII_BANNER.to_string(),
        format!("                                           Server v{}", config.server.version),
        String::new(),
        format!("\t🖥️  Server Name  : {}", config.server.name),
        format!("\t📦 Transport    : {}", config.transport.description()),
    ];
    if let Some(url) = config.transport.url() {
        lines.push(format!("\t🔗 Server URL   : {}", url));
    }
    lines.push(String::new());

    let mut modules = report.loaded_modules();
    modules.sort_unstable();
    if modules.is_empty() {
        lines.push("\t⚠️  No tool modules loaded".to_string());
    } else {
        lines.push("\t🔧 Loaded Modules:".to_string());
        for module in &modules {
            lines.push(format!("\t\t• {}", module));
        }
        lines.push(String::new());
        lines.push(format!("\t📊 Total Modules : {}", modules.len()));
    }
    lines.push(format!("\t🧰 Total Tools   : {}", tool_count));
    lines.push(String::new());

    lines.join("\n")
}

/// Print the banner to stderr.
pub fn print_banner(config: &Config, report: &DiscoveryReport, tool_count: usize) {
    eprintln!("{}", render_banner(config, report, tool_count));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::{LoadOutcome, ModuleLoadResult};

    fn report(modules: &[(&str, LoadOutcome)]) -> DiscoveryReport {
        DiscoveryReport {
            results: modules
                .iter()
                .map(|(name, outcome)| ModuleLoadResult {
                    module: name.to_string(),
                    outcome: outcome.clone(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_banner_lists_loaded_modules_only() {
        let report = report(&[
            ("nmap", LoadOutcome::Loaded { tools: 1 }),
            ("broken", LoadOutcome::Failed("boom".into())),
            ("hellomcp", LoadOutcome::Loaded { tools: 1 }),
        ]);
        let banner = render_banner(&Config::default(), &report, 2);

        assert!(banner.contains("Santo MCP Server"));
        assert!(banner.contains("• hellomcp"));
        assert!(banner.contains("• nmap"));
        assert!(!banner.contains("broken"));
        assert!(banner.contains("Total Modules : 2"));
        assert!(banner.find("hellomcp").unwrap() < banner.find("• nmap").unwrap());
    }

    #[test]
    fn test_banner_without_modules() {
        let banner = render_banner(&Config::default(), &DiscoveryReport::default(), 0);
        assert!(banner.contains("No tool modules loaded"));
        assert!(banner.contains("Total Tools   : 0"));
    }
}
