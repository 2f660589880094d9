//! Platform file loading and validation.

use crate::constraint::{Connector, Subsignal};
use crate::error::BuildError;
use crate::platform::{BoardPlatform, ClockConstraint, Resource};
use crate::types::PlatformConfig;
use std::collections::BTreeSet;
use std::path::Path;
use strata_common::Frequency;

/// Loads and validates a platform description from a TOML file.
pub fn load_platform(path: &Path) -> Result<BoardPlatform, BuildError> {
    let content = std::fs::read_to_string(path)?;
    load_platform_from_str(&content)
}

/// Parses and validates a platform description from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_platform_from_str(content: &str) -> Result<BoardPlatform, BuildError> {
    let config: PlatformConfig = toml::from_str(content).map_err(|e| BuildError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    build_platform(config)
}

/// Checks names, pin lists, and resource uniqueness.
fn validate_config(config: &PlatformConfig) -> Result<(), BuildError> {
    if config.name.trim().is_empty() {
        return Err(BuildError::MissingField("name".to_string()));
    }
    let mut seen = BTreeSet::new();
    for resource in &config.resources {
        if resource.name.is_empty() {
            return Err(BuildError::MissingField("resources.name".to_string()));
        }
        let id = format!("{}#{}", resource.name, resource.number);
        if !seen.insert((resource.name.as_str(), resource.number)) {
            return Err(BuildError::ValidationError(format!("duplicate resource {id}")));
        }
        let has_pins = resource
            .constraints
            .pins
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty());
        if has_pins == !resource.subsignals.is_empty() {
            return Err(BuildError::ValidationError(format!(
                "resource {id} must have either pins or subsignals"
            )));
        }
        for (name, sub) in &resource.subsignals {
            if sub.pins.as_deref().map_or(true, |p| p.trim().is_empty()) {
                return Err(BuildError::ValidationError(format!("subsignal {id}.{name} has no pins")));
            }
        }
    }
    for clock in &config.clocks {
        if !seen.contains(&(clock.resource.as_str(), clock.number)) {
            return Err(BuildError::UnknownResource {
                name: clock.resource.clone(),
                number: clock.number,
            });
        }
    }
    Ok(())
}

fn build_platform(config: PlatformConfig) -> Result<BoardPlatform, BuildError> {
    let mut platform = BoardPlatform::new(&config.name);
    if let Some(family) = config.family {
        platform = platform.with_family(family);
    }
    if let Some(device) = config.device {
        platform = platform.with_device(device);
    }
    for def in &config.resources {
        platform.add_resource(Resource {
            name: def.name.clone(),
            number: def.number,
            constraints: def.constraints.to_constraints(),
            subsignals: def
                .subsignals
                .iter()
                .map(|(name, sub)| Subsignal::new(name.as_str(), sub.to_constraints()))
                .collect(),
        });
    }
    for (name, pins) in config.connectors {
        platform.add_connector(Connector::make(name, pins));
    }
    for clock in config.clocks {
        let frequency: Frequency = clock.frequency.parse()?;
        platform.add_clock(ClockConstraint {
            resource: clock.resource,
            number: clock.number,
            frequency,
        });
    }
    log::debug!(
        "loaded platform {} with {} resources",
        strata_hdl::Platform::name(&platform),
        platform.resources().len()
    );
    Ok(platform)
}
