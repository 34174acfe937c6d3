//! Named generator presets.

use crate::generator::GeneratorConfig;

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// 50 vehicles × 120 steps with the default fault rates
    Baseline,

    /// 5 vehicles: most lane groups hold a single vehicle
    Sparse,

    /// 200 vehicles: crowded lane groups, short headways
    Dense,

    /// 5% speed anomalies and 5% GPS dropouts
    FaultySensors,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Baseline,
            ScenarioId::Sparse,
            ScenarioId::Dense,
            ScenarioId::FaultySensors,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Baseline => "baseline",
            ScenarioId::Sparse => "sparse",
            ScenarioId::Dense => "dense",
            ScenarioId::FaultySensors => "faulty_sensors",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Baseline => "50 vehicles, 120 steps at 5 s, 1% anomalies, 0.5% dropouts",
            ScenarioId::Sparse => "5 vehicles, 120 steps: few vehicles share a lane group",
            ScenarioId::Dense => "200 vehicles, 120 steps: crowded lane groups",
            ScenarioId::FaultySensors => "50 vehicles, 5% speed anomalies, 5% GPS dropouts",
        }
    }

    /// Returns the generator configuration for this scenario.
    pub fn generator_config(&self) -> GeneratorConfig {
        let base = GeneratorConfig::default();

        match self {
            ScenarioId::Baseline => base,
            ScenarioId::Sparse => GeneratorConfig {
                num_vehicles: 5,
                ..base
            },
            ScenarioId::Dense => GeneratorConfig {
                num_vehicles: 200,
                ..base
            },
            ScenarioId::FaultySensors => GeneratorConfig {
                anomaly_fraction: 0.05,
                missing_fraction: 0.05,
                ..base
            },
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "baseline" | "default" => Ok(ScenarioId::Baseline),
            "sparse" => Ok(ScenarioId::Sparse),
            "dense" => Ok(ScenarioId::Dense),
            "faulty_sensors" | "faultysensors" | "faulty" => Ok(ScenarioId::FaultySensors),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>().unwrap(), scenario);
        }
    }

    #[test]
    fn test_unknown_scenario() {
        assert!("rush_hour".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_presets_are_valid() {
        for scenario in ScenarioId::all() {
            assert!(scenario.generator_config().validate().is_ok(), "{}", scenario);
        }
        assert_eq!(ScenarioId::Dense.generator_config().num_vehicles, 200);
    }
}
