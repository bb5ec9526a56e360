//! Configuration system
//!
//! Engine configuration is plain serde data loaded from TOML or RON files,
//! selected by file extension.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        if !path.ends_with(".toml") && !path.ends_with(".ron") {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }
    
    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };
        
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
    
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
    
    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// # Level Engine Configuration
///
/// Everything a frame-loop driver needs to locate a level document, pick the
/// backend-specific controllers, and run the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelEngineConfig {
    /// Backend qualifier used during controller resolution.
    ///
    /// `None` means "use the render backend's own name".
    pub backend: Option<String>,
    /// Directories searched, in order, when resolving asset names
    pub asset_search_paths: Vec<String>,
    /// Asset name of the level document
    pub level: String,
    /// Number of Render + Update iterations to run
    pub frames: u64,
    /// Camera identity to activate once the level is loaded
    pub active_camera: Option<u32>,
    /// Default log filter (overridden by `RUST_LOG`)
    pub log_filter: String,
}

impl Default for LevelEngineConfig {
    fn default() -> Self {
        Self {
            backend: None,
            asset_search_paths: vec!["resources".to_string()],
            level: "levels/demo_level.xml".to_string(),
            frames: 60,
            active_camera: None,
            log_filter: "info".to_string(),
        }
    }
}

impl LevelEngineConfig {
    /// Pick the backend qualifier, falling back to the backend's own name
    pub fn backend_qualifier<'a>(&'a self, backend_name: &'a str) -> &'a str {
        self.backend.as_deref().unwrap_or(backend_name)
    }
}

impl Config for LevelEngineConfig {}
