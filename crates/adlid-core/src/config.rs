use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where root-level files land relative to the top-level folder blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RootPosition {
    #[default]
    Top,
    Bottom,
}

/// How per-file tables are combined into one folder table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    #[default]
    Union,
    Intersection,
}

/// Which sheets of a workbook are parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetStrategy {
    #[default]
    AllSheets,
    FirstSheet,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColumnNames {
    pub item: String,
    pub price: String,
    pub start_date: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            item: "Item".to_string(),
            price: "Ad Lid Price".to_string(),
            start_date: "Loading Start Date".to_string(),
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GraphConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub graph_base: String,
    pub authority_base: String,
    pub owner_upn: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            scope: "https://graph.microsoft.com/.default".to_string(),
            graph_base: "https://graph.microsoft.com/v1.0".to_string(),
            authority_base: "https://login.microsoftonline.com".to_string(),
            owner_upn: String::new(),
        }
    }
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = if self.client_secret.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("GraphConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &secret)
            .field("scope", &self.scope)
            .field("graph_base", &self.graph_base)
            .field("authority_base", &self.authority_base)
            .field("owner_upn", &self.owner_upn)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_root: String,
    pub horizon: u32,
    pub week: Option<u32>,
    pub root_position: RootPosition,
    pub merge_mode: MergeMode,
    pub sheet_strategy: SheetStrategy,
    pub columns: ColumnNames,
    pub output_dir: String,
    pub inventory_csv: Option<String>,
    pub upload: bool,
    pub graph: GraphConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_root: "Ad Lids".to_string(),
            horizon: 3,
            week: None,
            root_position: RootPosition::default(),
            merge_mode: MergeMode::default(),
            sheet_strategy: SheetStrategy::default(),
            columns: ColumnNames::default(),
            output_dir: "assets/summaries".to_string(),
            inventory_csv: Some("assets/ad_lids_inventory.csv".to_string()),
            upload: false,
            graph: GraphConfig::default(),
        }
    }
}

impl AppConfig {
    /// Base root without surrounding separators, as used for path stripping.
    pub fn base_root(&self) -> &str {
        self.base_root.trim_matches('/')
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_root().is_empty() {
            return Err(ConfigError::Message("base_root must not be empty".to_string()));
        }
        if self.horizon == 0 {
            return Err(ConfigError::Message("horizon must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Load `Config.toml` (optional) overlaid by `ADLID_*` environment variables.
/// Nested keys use `__`, e.g. `ADLID_GRAPH__CLIENT_SECRET`.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("ADLID")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    let config = builder.try_deserialize::<AppConfig>()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.horizon, 3);
        assert_eq!(config.root_position, RootPosition::Top);
        assert_eq!(config.merge_mode, MergeMode::Union);
        assert_eq!(config.sheet_strategy, SheetStrategy::AllSheets);
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let config = AppConfig {
            horizon: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_root_trimmed() {
        let config = AppConfig {
            base_root: "/Ad Lids/".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.base_root(), "Ad Lids");

        let blank = AppConfig {
            base_root: "/".to_string(),
            ..AppConfig::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_partial_source_uses_defaults() {
        let config: AppConfig = Config::builder()
            .set_override("horizon", 5)
            .unwrap()
            .set_override("merge_mode", "intersection")
            .unwrap()
            .set_override("columns.price", "Price")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.horizon, 5);
        assert_eq!(config.merge_mode, MergeMode::Intersection);
        assert_eq!(config.columns.price, "Price");
        assert_eq!(config.columns.item, "Item");
        assert_eq!(config.base_root, "Ad Lids");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let graph = GraphConfig {
            client_secret: "hunter2".to_string(),
            ..GraphConfig::default()
        };
        let printed = format!("{:?}", graph);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }
}
