//! Settings read from the process environment at startup.
//!
//! Everything is read once and injected into the components at
//! construction, nothing looks at the environment afterwards.

use std::fmt::{self, Display};

use geochat_gemini_model::{GeminiConfig, GeminiConfigBuilder};
use geochat_model::Coordinates;

/// Variable holding the API key. Required.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Variable overriding the model name.
pub const MODEL_VAR: &str = "GEMINI_MODEL";
/// Variable overriding the API base URL.
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
/// Variable holding the caller's position as `"lat,lng"`.
pub const LOCATION_VAR: &str = "GEOCHAT_LOCATION";

/// Error while reading the settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    Missing(&'static str),
    /// A variable is set but cannot be parsed.
    Invalid {
        /// Name of the variable.
        var: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(var) => {
                write!(f, "{var} environment variable is not set")
            }
            ConfigError::Invalid { var, reason } => {
                write!(f, "{var} is invalid: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Startup settings of the terminal front-end.
#[derive(Clone, PartialEq)]
pub struct Settings {
    api_key: String,
    model: Option<String>,
    base_url: Option<String>,
    location: Option<Coordinates>,
}

impl Settings {
    /// Reads the settings through `var`, which returns the value of a
    /// variable if it is set.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty =
            |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(API_KEY_VAR)
            .ok_or(ConfigError::Missing(API_KEY_VAR))?;
        let location = non_empty(LOCATION_VAR)
            .map(|v| parse_location(&v))
            .transpose()
            .map_err(|reason| ConfigError::Invalid {
                var: LOCATION_VAR,
                reason,
            })?;

        Ok(Self {
            api_key,
            model: non_empty(MODEL_VAR),
            base_url: non_empty(BASE_URL_VAR),
            location,
        })
    }

    /// Builds the provider configuration.
    pub fn gemini_config(&self) -> GeminiConfig {
        let mut builder = GeminiConfigBuilder::with_api_key(&self.api_key);
        if let Some(model) = &self.model {
            builder = builder.with_model(model);
        }
        if let Some(base_url) = &self.base_url {
            builder = builder.with_base_url(base_url);
        }
        builder.build()
    }

    /// Returns the configured position, if any.
    #[inline]
    pub fn location(&self) -> Option<Coordinates> {
        self.location
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("location", &self.location)
            .finish()
    }
}

/// Parses `"lat,lng"` in degrees.
pub fn parse_location(value: &str) -> Result<Coordinates, String> {
    let Some((lat, lng)) = value.split_once(',') else {
        return Err(format!("expected `lat,lng`, got `{value}`"));
    };
    let latitude: f64 = lat
        .trim()
        .parse()
        .map_err(|err| format!("bad latitude `{}`: {err}", lat.trim()))?;
    let longitude: f64 = lng
        .trim()
        .parse()
        .map_err(|err| format!("bad longitude `{}`: {err}", lng.trim()))?;
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("latitude {latitude} is out of range"));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("longitude {longitude} is out of range"));
    }
    Ok(Coordinates::new(latitude, longitude))
}
