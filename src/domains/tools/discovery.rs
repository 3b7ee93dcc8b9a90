//! Module discovery.
//!
//! Tool modules are compiled in (see `definitions::catalog`). Which of them
//! load is decided at startup by a [`DiscoverySource`]:
//!
//! - a directory whose entries name the enabled modules (`nmap`, `nmap.tool`
//!   or a symlink `nmap.enabled` all enable `nmap`),
//! - an explicit list of module names,
//! - or every module in the catalog.
//!
//! Modules load in lexical order. Each one registers into a scratch registry
//! that is merged only if its entry point succeeds, so a broken module leaves
//! no partial registrations behind and never stops the others from loading.

use std::collections::BTreeSet;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::error::ToolError;
use super::handlers::ToolModule;
use super::registry::ToolRegistry;
use crate::core::config::{Config, ToolsConfig};

/// Where the set of enabled modules comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoverySource {
    /// Every module in the catalog.
    All,
    /// Module names given explicitly.
    Names(Vec<String>),
    /// A directory whose entries name the modules to load.
    Directory(PathBuf),
}

impl DiscoverySource {
    /// Pick the source from tools configuration: directory, then list, then all.
    pub fn from_config(config: &ToolsConfig) -> Self {
        if let Some(dir) = &config.enabled_dir {
            Self::Directory(dir.clone())
        } else if let Some(names) = &config.enabled {
            Self::Names(names.clone())
        } else {
            Self::All
        }
    }
}

/// Outcome of loading one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Entry point ran; this many tools were registered.
    Loaded { tools: usize },
    /// Entry point failed, panicked or collided with existing tools.
    Failed(String),
    /// No such module in the catalog.
    Skipped(String),
}

/// Startup record for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLoadResult {
    pub module: String,
    pub outcome: LoadOutcome,
}

/// Ordered load results for one discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub results: Vec<ModuleLoadResult>,
}

impl DiscoveryReport {
    /// Names of successfully loaded modules, in load order.
    pub fn loaded_modules(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, LoadOutcome::Loaded { .. }))
            .map(|r| r.module.as_str())
            .collect()
    }

    /// Names of modules whose entry point failed.
    pub fn failed_modules(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, LoadOutcome::Failed(_)))
            .map(|r| r.module.as_str())
            .collect()
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded_modules().len()
    }

    fn record(&mut self, module: &str, outcome: LoadOutcome) {
        self.results.push(ModuleLoadResult {
            module: module.to_string(),
            outcome,
        });
    }
}

/// Module discoverer - loads enabled modules from a catalog.
pub struct ModuleDiscoverer {
    catalog: Vec<Box<dyn ToolModule>>,
    source: DiscoverySource,
}

impl ModuleDiscoverer {
    /// Create a discoverer over the given catalog.
    pub fn new(catalog: Vec<Box<dyn ToolModule>>, source: DiscoverySource) -> Self {
        Self { catalog, source }
    }

    /// Run discovery, returning the populated registry and the load report.
    pub fn discover(&self, config: &Config) -> (ToolRegistry, DiscoveryReport) {
        let mut registry = ToolRegistry::new();
        let mut report = DiscoveryReport::default();

        let names = match self.enabled_names() {
            Ok(names) => names,
            Err(e) => {
                error!("❌ Failed to enumerate tool modules: {}", e);
                info!("Discovery finished: 0 module(s) loaded, 0 tool(s) registered");
                return (registry, report);
            }
        };

        for name in &names {
            let Some(module) = self.catalog.iter().find(|m| m.name() == name) else {
                warn!("Skipping tool module '{}': no such module", name);
                report.record(name, LoadOutcome::Skipped("no such module".to_string()));
                continue;
            };

            match load_module(module.as_ref(), config, &mut registry) {
                Ok(tools) => {
                    info!("Loaded tool module '{}' ({} tool(s))", name, tools);
                    report.record(name, LoadOutcome::Loaded { tools });
                }
                Err(e) => {
                    error!("❌ Failed to load module {}: {}", name, e);
                    report.record(name, LoadOutcome::Failed(e));
                }
            }
        }

        info!(
            "Discovery finished: {} module(s) loaded, {} failed, {} tool(s) registered",
            report.loaded_count(),
            report.failed_modules().len(),
            registry.len()
        );

        (registry, report)
    }

    /// Enabled module names, sorted and deduplicated.
    fn enabled_names(&self) -> std::io::Result<Vec<String>> {
        let names: BTreeSet<String> = match &self.source {
            DiscoverySource::All => self.catalog.iter().map(|m| m.name().to_string()).collect(),
            DiscoverySource::Names(names) => names
                .iter()
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect(),
            DiscoverySource::Directory(dir) => scan_directory(dir)?,
        };
        Ok(names.into_iter().collect())
    }
}

/// Run one module's entry point against a scratch registry and merge it.
fn load_module(
    module: &dyn ToolModule,
    config: &Config,
    registry: &mut ToolRegistry,
) -> Result<usize, String> {
    let mut staged = ToolRegistry::new();

    let outcome = catch_unwind(AssertUnwindSafe(|| module.register(&mut staged, config)));
    match outcome {
        Ok(Ok(())) => registry.absorb(staged).map_err(|e| e.to_string()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ToolError::internal(format!("entry point panicked: {}", detail)).to_string())
        }
    }
}

/// Module names named by the entries of `dir`.
fn scan_directory(dir: &Path) -> std::io::Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();

        // Hidden and underscore-prefixed entries are not modules.
        if file_name.starts_with('.') || file_name.starts_with('_') {
            continue;
        }

        let stem = Path::new(file_name.as_ref())
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !stem.is_empty() {
            names.insert(stem);
        }
    }
    Ok(names)
}
