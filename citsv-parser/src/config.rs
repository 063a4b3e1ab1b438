//! Agency configuration: rule tables and presentation constants.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::{StopIdEncoder, SuffixTable, ZoneTable};
use crate::headsign::{HeadsignMerger, HeadsignRules};

/// Environment variable naming a JSON file of stop-code overrides.
pub const STOP_CODE_OVERRIDES_ENV: &str = "CITSV_STOP_CODE_OVERRIDES";

/// GTFS route type for buses.
pub const ROUTE_TYPE_BUS: u16 = 3;

/// Dark gray, from the GTFS.
const AGENCY_COLOR: &str = "1F1F1F";

/// Errors loading configuration files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Override file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Override file is not a JSON object of strings
    #[error("invalid stop code overrides in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Everything agency-specific the conversion needs.
#[derive(Debug, Clone)]
pub struct AgencyConfig {
    /// Colour shipped for the agency, hex without `#`.
    pub agency_color: String,

    /// Routes with a different `route_type` are dropped.
    pub route_type: u16,

    pub zones: ZoneTable,

    pub suffixes: SuffixTable,

    /// stop_id → stop code, for stops published with the "0" code.
    pub stop_code_overrides: HashMap<String, String>,

    pub headsign_rules: HeadsignRules,
}

impl AgencyConfig {
    /// Replace the stop-code overrides.
    pub fn with_stop_code_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.stop_code_overrides = overrides;
        self
    }

    pub fn stop_id_encoder(&self) -> StopIdEncoder {
        StopIdEncoder::new(self.zones.clone(), self.suffixes.clone())
            .with_code_overrides(self.stop_code_overrides.clone())
    }

    pub fn headsign_merger(&self) -> HeadsignMerger {
        HeadsignMerger::new(self.headsign_rules.clone())
    }

    /// Default configuration plus overrides from [`STOP_CODE_OVERRIDES_ENV`], if set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::default();
        match std::env::var_os(STOP_CODE_OVERRIDES_ENV) {
            Some(path) => {
                let overrides = load_stop_code_overrides(Path::new(&path))?;
                Ok(config.with_stop_code_overrides(overrides))
            }
            None => Ok(config),
        }
    }
}

/// Read a `{ "stop_id": "code" }` JSON object.
pub fn load_stop_code_overrides(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn default_zones() -> ZoneTable {
    ZoneTable::new()
        .with_zone("BOU", 100_000) // Boucherville
        .with_zone("LON", 200_000) // Longueuil
        .with_zone("VAR", 300_000) // Varennes
        .with_zone("SAM", 400_000) // Saint-Amable
        .with_zone("VCH", 500_000) // Verchères
        .with_zone("CON", 600_000) // Contrecoeur
}

fn default_suffixes() -> SuffixTable {
    SuffixTable::new()
        .with_suffix('A', 1_000)
        .with_suffix('B', 2_000)
        .with_suffix('C', 3_000)
        .with_suffix('D', 4_000)
}

fn default_headsign_rules() -> HeadsignRules {
    let mut rules = HeadsignRules::new()
        .with_rule(370, &["St-Amable", "Ste-Julie", "Nord"], "Nord")
        .with_rule(700, &["Longueuil", "Sorel-Tracy"], "Sorel-Tracy");
    for route in [720, 721, 722, 724] {
        rules = rules
            .with_rule(route, &["Varennes", "Nord"], "Nord")
            .with_rule(route, &["Longueuil", "Sud"], "Sud");
    }
    rules
        .with_rule(723, &["Varennes (IREQ)", "Nord"], "Nord")
        .with_rule(723, &["Longueuil", "Sud"], "Sud")
        .with_rule(731, &["Longueuil", "Sud"], "Sud")
}

impl Default for AgencyConfig {
    fn default() -> Self {
        Self {
            agency_color: AGENCY_COLOR.to_string(),
            route_type: ROUTE_TYPE_BUS,
            zones: default_zones(),
            suffixes: default_suffixes(),
            stop_code_overrides: HashMap::new(),
            headsign_rules: default_headsign_rules(),
        }
    }
}
