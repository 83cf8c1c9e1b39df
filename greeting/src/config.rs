use anyhow::Context;
use std::env::VarError;

pub(crate) const GREETING_VAR: &str = "GREETING";

/// Settings read once at cold start and shared by every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    greeting: String,
}

impl Config {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key))
    }

    /// Reads the settings through `lookup`, which has the same contract as
    /// [`std::env::var`]. There is no default greeting.
    pub(crate) fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: FnOnce(&str) -> Result<String, VarError>,
    {
        let greeting = match lookup(GREETING_VAR) {
            Ok(greeting) => greeting,
            Err(err @ VarError::NotPresent) => {
                return Err(err)
                    .context(format!("missing required environment variable {GREETING_VAR}"))
            }
            Err(err @ VarError::NotUnicode(_)) => {
                return Err(err)
                    .context(format!("environment variable {GREETING_VAR} is not valid UTF-8"))
            }
        };

        Ok(Config { greeting })
    }

    pub(crate) fn response(&self) -> String {
        format!("{} from Lambda!", self.greeting)
    }
}
