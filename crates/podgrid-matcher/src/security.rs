//! Trusted-module and TXT posture checks.

use podgrid_inventory::ComputerSystem;

use crate::request::RequestedSecurity;

pub struct ComputerSystemSecurityAttributesMatcher;

impl ComputerSystemSecurityAttributesMatcher {
    pub fn matches(&self, security: Option<&RequestedSecurity>, system: &ComputerSystem) -> bool {
        let Some(security) = security else {
            return true;
        };
        tpm_matches(security, system) && txt_matches(security.txt_enabled, system.txt_enabled)
    }
}

fn tpm_matches(security: &RequestedSecurity, system: &ComputerSystem) -> bool {
    let modules = &system.trusted_modules;
    let presence = match security.tpm_present {
        None => true,
        Some(true) => !modules.is_empty(),
        Some(false) => modules.is_empty(),
    };
    let interface = match security.tpm_interface_type {
        None => true,
        Some(wanted) => modules.iter().any(|m| m.interface_type == Some(wanted)),
    };
    presence && interface
}

/// A request for TXT disabled also accepts a system that does not report TXT.
fn txt_matches(requested: Option<bool>, available: Option<bool>) -> bool {
    match requested {
        None => true,
        Some(true) => available == Some(true),
        Some(false) => available != Some(true),
    }
}
