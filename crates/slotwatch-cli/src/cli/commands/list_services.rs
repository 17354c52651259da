//! `slotwatch --list-services` – print the configured services.

use slotwatch_core::config::SlotwatchConfig;

pub fn run_list_services(cfg: &SlotwatchConfig) {
    let width = cfg.services.keys().map(String::len).max().unwrap_or(0);
    for (name, code) in &cfg.services {
        let marker = if *name == cfg.default_service {
            "  (default)"
        } else {
            ""
        };
        println!("  {:<width$}  {}{}", name, code, marker, width = width);
    }
}
