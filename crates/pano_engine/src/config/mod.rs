//! Configuration system

pub use serde::{Serialize, Deserialize};

use std::path::Path;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        let format = ConfigFormat::from_path(path)?;
        Self::from_str_as(&contents, format)
    }

    /// Parse configuration text in the given format
    fn from_str_as(contents: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        format.parse(contents)
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Supported document formats, selected by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Pick a format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            Some("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Deserialize `contents` in this format
    pub fn parse<T: for<'de> Deserialize<'de>>(self, contents: &str) -> Result<T, ConfigError> {
        match self {
            Self::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Self::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Self::Json => serde_json::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }
}

/// Configuration errors
///
/// All of these are fatal at startup and are shown to the user verbatim,
/// so messages say what to fix.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("configuration is malformed: {0}")]
    Parse(String),

    /// Serialization error
    #[error("could not serialize configuration: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("unsupported configuration format '{0}' (expected .json, .toml or .ron)")]
    UnsupportedFormat(String),

    /// The tour document lists no scenes
    #[error("tour document contains no scenes; add at least one entry to \"scenes\"")]
    Empty,

    /// Two scenes share an id
    #[error("scene id '{0}' is defined more than once; scene ids must be unique")]
    DuplicateScene(String),

    /// A setting is out of range
    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    impl Config for Sample {}

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("a/tour.json")).unwrap(), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("settings.toml")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("settings.ron")).unwrap(), ConfigFormat::Ron);
        assert!(matches!(
            ConfigFormat::from_path(Path::new("settings.yaml")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_parse_each_format() {
        let expected = Sample { name: "lobby".to_string(), count: 3 };

        let toml: Sample = Sample::from_str_as("name = \"lobby\"\ncount = 3\n", ConfigFormat::Toml).unwrap();
        let ron: Sample = Sample::from_str_as("(name: \"lobby\", count: 3)", ConfigFormat::Ron).unwrap();
        let json: Sample = Sample::from_str_as(r#"{"name":"lobby","count":3}"#, ConfigFormat::Json).unwrap();

        assert_eq!(toml, expected);
        assert_eq!(ron, expected);
        assert_eq!(json, expected);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = Sample::from_str_as("{ not json", ConfigFormat::Json);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Sample::load_from_file("does/not/exist.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
