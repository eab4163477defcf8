//! `adl adapters` – list the built-in scrape adapters.

use adl_core::adapter::AdapterRegistry;
use adl_core::config::AdlConfig;

pub fn run_adapters(cfg: &AdlConfig) {
    let registry = AdapterRegistry::with_builtin(&cfg.fetch);
    println!("{:<14} {:<20} {}", "TAG", "NAME", "DESCRIPTION");
    for info in registry.infos() {
        println!("{:<14} {:<20} {}", info.tag, info.name, info.description);
    }
}
