//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{ClinicConfig, DatabaseTarget, Environment, PostgreSQLConfig};
use super::secret::secret_string;
use crate::domain::context::ResultExt;
use crate::domain::errors::ClinicError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ClinicConfig
/// 4. Applies environment variable overrides (FRONTDESK_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`ClinicError::Configuration`] if the file is missing or does not
/// parse, a referenced variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use frontdesk::config::load_config;
///
/// # fn main() -> frontdesk::domain::Result<()> {
/// let config = load_config("frontdesk.toml")?;
/// println!("Store: {:?}", config.database_target);
/// # Ok(())
/// # }
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ClinicConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ClinicError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: ClinicConfig = toml::from_str(&contents)
        .map_err(|e| ClinicError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ClinicError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left alone.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ClinicError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(ClinicError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        ClinicError::Configuration(format!("Invalid value for {name}: '{value}'"))
    })
}

/// Applies environment variable overrides using the FRONTDESK_* prefix
///
/// Variables follow the pattern FRONTDESK_<SECTION>_<KEY>, for example
/// FRONTDESK_POSTGRESQL_CONNECTION_STRING or FRONTDESK_CLINIC_UTC_OFFSET_MINUTES.
/// A malformed numeric or boolean value is an error rather than being ignored.
fn apply_env_overrides(config: &mut ClinicConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    if let Some(val) = var("FRONTDESK_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("FRONTDESK_ENVIRONMENT") {
        config.environment = match val.to_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            _ => {
                return Err(ClinicError::Configuration(format!(
                    "Invalid value for FRONTDESK_ENVIRONMENT: '{val}'"
                )))
            }
        };
    }
    if let Some(val) = var("FRONTDESK_DATABASE_TARGET") {
        config.database_target = match val.to_lowercase().as_str() {
            "postgresql" => DatabaseTarget::PostgreSQL,
            "memory" => DatabaseTarget::Memory,
            _ => {
                return Err(ClinicError::Configuration(format!(
                    "Invalid value for FRONTDESK_DATABASE_TARGET: '{val}'"
                )))
            }
        };
    }

    // A connection string from the environment is enough to create the section
    if let Some(val) = var("FRONTDESK_POSTGRESQL_CONNECTION_STRING") {
        match config.postgresql {
            Some(ref mut pg) => pg.connection_string = secret_string(val),
            None => {
                let section = format!("connection_string = {}", toml_string(&val));
                let pg: PostgreSQLConfig = toml::from_str(&section)?;
                config.postgresql = Some(pg);
            }
        }
    }
    if let Some(ref mut pg) = config.postgresql {
        if let Some(val) = var("FRONTDESK_POSTGRESQL_MAX_CONNECTIONS") {
            pg.max_connections = parse_override("FRONTDESK_POSTGRESQL_MAX_CONNECTIONS", &val)?;
        }
        if let Some(val) = var("FRONTDESK_POSTGRESQL_CONNECTION_TIMEOUT_SECONDS") {
            pg.connection_timeout_seconds =
                parse_override("FRONTDESK_POSTGRESQL_CONNECTION_TIMEOUT_SECONDS", &val)?;
        }
        if let Some(val) = var("FRONTDESK_POSTGRESQL_STATEMENT_TIMEOUT_SECONDS") {
            pg.statement_timeout_seconds =
                parse_override("FRONTDESK_POSTGRESQL_STATEMENT_TIMEOUT_SECONDS", &val)?;
        }
        if let Some(val) = var("FRONTDESK_POSTGRESQL_SSL_MODE") {
            pg.ssl_mode = val;
        }
    }

    if let Some(val) = var("FRONTDESK_CLINIC_UTC_OFFSET_MINUTES") {
        config.clinic.utc_offset_minutes =
            parse_override("FRONTDESK_CLINIC_UTC_OFFSET_MINUTES", &val)?;
    }
    if let Some(val) = var("FRONTDESK_CLINIC_DEFAULT_PURPOSE") {
        config.clinic.default_purpose = val;
    }

    if let Some(val) = var("FRONTDESK_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("FRONTDESK_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("FRONTDESK_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = var("FRONTDESK_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

/// Quote a value as a TOML basic string
fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("FRONTDESK_TEST_SUBST_PW", "s3cret");
        let input = "connection_string = \"postgresql://clinic:${FRONTDESK_TEST_SUBST_PW}@db/clinic\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(
            result,
            "connection_string = \"postgresql://clinic:s3cret@db/clinic\""
        );
        std::env::remove_var("FRONTDESK_TEST_SUBST_PW");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("FRONTDESK_TEST_MISSING_VAR");
        let input = "password = \"${FRONTDESK_TEST_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("FRONTDESK_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("FRONTDESK_TEST_COMMENTED");
        let input = "# connection_string = \"${FRONTDESK_TEST_COMMENTED}\"\nkey = 1";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${FRONTDESK_TEST_COMMENTED}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("nonexistent-frontdesk.toml").unwrap_err();
        assert!(matches!(err, ClinicError::Configuration(_)));
    }

    #[test]
    fn test_load_config_valid() {
        let temp_file = write_config(
            r#"
environment = "staging"
database_target = "postgresql"

[application]
log_level = "debug"

[postgresql]
connection_string = "postgresql://clinic:pw@localhost:5432/clinic"
max_connections = 5

[clinic]
utc_offset_minutes = 60

[logging]
local_enabled = false
"#,
        );

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.database_target, DatabaseTarget::PostgreSQL);
        let pg = config.postgresql.unwrap();
        assert_eq!(pg.max_connections, 5);
        assert_eq!(pg.statement_timeout_seconds, 60);
        assert!(pg.connection_string.expose_secret().as_ref().contains("localhost:5432"));
        assert_eq!(config.clinic.utc_offset_minutes, 60);
        assert_eq!(config.clinic.default_purpose, "General consultation");
    }

    #[test]
    fn test_load_config_validation_failure() {
        let temp_file = write_config(
            r#"
database_target = "memory"

[clinic]
utc_offset_minutes = 5000
"#,
        );

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("utc_offset_minutes"));
    }

    #[test]
    fn test_toml_string_escapes_quotes() {
        assert_eq!(toml_string("a\"b"), "\"a\\\"b\"");
    }
}
