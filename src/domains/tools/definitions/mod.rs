//! Tool definitions module.
//!
//! Each tool module is defined in its own file and implements
//! [`ToolModule`]. [`catalog`] lists every module compiled into the server;
//! discovery decides at startup which of them are enabled.
//!
//! ## Adding a New Tool Module
//!
//! 1. Create a new file (e.g., `my_tool.rs`) implementing `ToolModule`
//! 2. Export it here and add it to `catalog()`
//! 3. Enable it (tools directory entry, `MCP_TOOLS_ENABLED`, or default all)
//!
//! **No need to modify the dispatcher or the server!**

pub mod hello;
pub mod nmap;
pub mod url_shortener;

pub use hello::HelloModule;
pub use nmap::{NmapModule, NmapScanner};
pub use url_shortener::{UrlShortener, UrlShortenerModule};

use super::handlers::ToolModule;

/// Every built-in tool module.
pub fn catalog() -> Vec<Box<dyn ToolModule>> {
    vec![
        Box::new(HelloModule),
        Box::new(NmapModule),
        Box::new(UrlShortenerModule),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::domains::tools::discovery::{DiscoverySource, ModuleDiscoverer};

    #[test]
    fn test_catalog_names_are_unique() {
        let modules = catalog();
        let mut names: Vec<_> = modules.iter().map(|m| m.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), modules.len());
    }

    #[test]
    fn test_catalog_loads_cleanly() {
        let discoverer = ModuleDiscoverer::new(catalog(), DiscoverySource::All);
        let (registry, report) = discoverer.discover(&Config::default());

        assert_eq!(report.loaded_modules(), vec!["hellomcp", "nmap", "urlshortener"]);
        assert_eq!(
            registry.tool_names(),
            vec!["hellomcp", "nmap_scan", "urlshortener"]
        );
    }
}
