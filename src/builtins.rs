//! Built-in variables registered by every engine with builtins enabled
//!
//! | Variable       | Value                                 | Cached |
//! |----------------|---------------------------------------|--------|
//! | `hostname`     | host name                             | yes    |
//! | `pid`          | process id                            | yes    |
//! | `pwd`          | current working directory             | no     |
//! | `time_local`   | local time, `%d/%b/%Y:%H:%M:%S %z`    | no     |
//! | `year` .. `second` | single local time field           | no     |
//! | `week`         | abbreviated weekday (`Mon`)           | no     |
//! | `zone`         | UTC offset (`+02:00`)                 | no     |
//! | `env_*`        | environment variable `*`              | no     |
//!
//! All of them except the environment prefix are changeable.

use std::fmt::Write;

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Weekday};

use crate::config::EngineConfig;
use crate::variable::{Provider, ProviderError, Variable, VariableFlags, VariableValue};

/// Names of the per-field time variables
pub const TIME_FIELDS: &[&str] = &[
    "year", "month", "week", "day", "hour", "minute", "second", "zone",
];

/// Host name of the machine
#[derive(Debug, Clone, Copy, Default)]
pub struct Hostname;

impl<C: ?Sized> Provider<C> for Hostname {
    fn provide(&self, _ctx: &C, _suffix: &str) -> Result<VariableValue, ProviderError> {
        Ok(VariableValue::found(read_hostname()?))
    }
}

fn read_hostname() -> Result<String, ProviderError> {
    if let Ok(name) = std::fs::read_to_string("/proc/sys/kernel/hostname") {
        let name = name.trim();
        if !name.is_empty() {
            return Ok(name.to_string());
        }
    }
    for key in ["HOSTNAME", "COMPUTERNAME"] {
        if let Ok(name) = std::env::var(key) {
            if !name.is_empty() {
                return Ok(name);
            }
        }
    }
    Err("unable to determine hostname".into())
}

/// Id of the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct Pid;

impl<C: ?Sized> Provider<C> for Pid {
    fn provide(&self, _ctx: &C, _suffix: &str) -> Result<VariableValue, ProviderError> {
        Ok(VariableValue::found(std::process::id().to_string()))
    }
}

/// Current working directory
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkingDir;

impl<C: ?Sized> Provider<C> for WorkingDir {
    fn provide(&self, _ctx: &C, _suffix: &str) -> Result<VariableValue, ProviderError> {
        let dir = std::env::current_dir()?;
        Ok(VariableValue::found(dir.display().to_string()).volatile())
    }
}

/// Local time rendered with a strftime-style format
#[derive(Debug, Clone)]
pub struct LocalTime {
    format: String,
}

impl LocalTime {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl<C: ?Sized> Provider<C> for LocalTime {
    fn provide(&self, _ctx: &C, _suffix: &str) -> Result<VariableValue, ProviderError> {
        // An invalid format specifier surfaces as fmt::Error instead of a panic
        let mut rendered = String::new();
        write!(rendered, "{}", Local::now().format(&self.format))
            .map_err(|_| format!("invalid time format \"{}\"", self.format))?;
        Ok(VariableValue::found(rendered).volatile())
    }
}

/// One field of the local time, selected by the variable name
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeField;

impl<C: ?Sized> Provider<C> for TimeField {
    fn provide(&self, _ctx: &C, field: &str) -> Result<VariableValue, ProviderError> {
        Ok(time_field(&Local::now(), field))
    }
}

fn time_field<Tz: TimeZone>(now: &DateTime<Tz>, field: &str) -> VariableValue
where
    Tz::Offset: std::fmt::Display,
{
    let value = match field {
        "year" => now.year().to_string(),
        "month" => now.month().to_string(),
        "week" => weekday_name(now.weekday()).to_string(),
        "day" => now.day().to_string(),
        "hour" => now.hour().to_string(),
        "minute" => now.minute().to_string(),
        "second" => now.second().to_string(),
        "zone" => now.format("%:z").to_string(),
        _ => return VariableValue::not_found(),
    };
    VariableValue::found(value).volatile()
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thur",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// Process environment, keyed by the reference suffix.
///
/// Unset and empty variables both count as "not found".
#[derive(Debug, Clone, Copy, Default)]
pub struct Environment;

impl<C: ?Sized> Provider<C> for Environment {
    fn provide(&self, _ctx: &C, key: &str) -> Result<VariableValue, ProviderError> {
        match std::env::var(key) {
            Ok(value) if !value.is_empty() => Ok(VariableValue::found(value).volatile()),
            _ => Ok(VariableValue::not_found().volatile()),
        }
    }
}

/// Build the built-in variable set for `config`
pub fn variables<C: ?Sized>(config: &EngineConfig) -> Vec<Variable<C>> {
    let changeable = VariableFlags::new().changeable();

    let mut vars = vec![
        Variable::new("hostname", Hostname).with_flags(changeable),
        Variable::new("time_local", LocalTime::new(config.time_format.clone()))
            .with_flags(changeable),
        Variable::new("pid", Pid).with_flags(changeable),
        Variable::new("pwd", WorkingDir).with_flags(changeable),
    ];
    vars.extend(
        TIME_FIELDS
            .iter()
            .map(|field| Variable::new(*field, TimeField).with_flags(changeable)),
    );
    if let Some(prefix) = &config.env_prefix {
        vars.push(Variable::prefix(prefix.clone(), Environment));
    }
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};

    fn fixed_time() -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let naive = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 3)
            .unwrap();
        offset.from_local_datetime(&naive).unwrap()
    }

    #[test]
    fn test_time_fields() {
        let now = fixed_time();
        let field = |name| time_field(&now, name).value;
        assert_eq!(field("year"), "2024");
        assert_eq!(field("month"), "3");
        assert_eq!(field("day"), "7");
        assert_eq!(field("hour"), "9");
        assert_eq!(field("minute"), "5");
        assert_eq!(field("second"), "3");
        assert_eq!(field("week"), "Thur");
        assert_eq!(field("zone"), "+02:00");
    }

    #[test]
    fn test_weekday_names() {
        let names: Vec<_> = (0..7)
            .map(|offset| {
                let day = fixed_time() + chrono::Duration::days(offset);
                time_field(&day, "week").value
            })
            .collect();
        assert_eq!(
            names,
            vec!["Thur", "Fri", "Sat", "Sun", "Mon", "Tue", "Wed"]
        );
    }

    #[test]
    fn test_time_fields_are_volatile() {
        assert!(!time_field(&fixed_time(), "year").cacheable);
    }

    #[test]
    fn test_unknown_time_field_is_not_found() {
        let value = time_field(&fixed_time(), "fortnight");
        assert!(value.not_found);
        assert!(value.cacheable);
    }

    #[test]
    fn test_local_time_format() {
        let rendered = fixed_time()
            .format(&EngineConfig::default().time_format)
            .to_string();
        assert_eq!(rendered, "07/Mar/2024:09:05:03 +0200");
    }

    #[test]
    fn test_invalid_time_format_is_provider_error() {
        let err = Provider::<()>::provide(&LocalTime::new("%Q%"), &(), "time_local").unwrap_err();
        assert!(err.to_string().contains("invalid time format"));
    }

    #[test]
    fn test_pid_matches_process() {
        let value = Provider::<()>::provide(&Pid, &(), "pid").unwrap();
        assert_eq!(value.value, std::process::id().to_string());
        assert!(value.cacheable);
    }

    #[test]
    fn test_pwd_is_volatile() {
        let value = Provider::<()>::provide(&WorkingDir, &(), "pwd").unwrap();
        assert!(!value.cacheable);
        assert!(!value.value.is_empty());
    }

    #[test]
    fn test_environment_missing_is_not_found() {
        let value = Provider::<()>::provide(&Environment, &(), "VARPLATE_SURELY_UNSET_42").unwrap();
        assert!(value.not_found);
    }

    #[test]
    fn test_default_set() {
        let vars: Vec<Variable> = variables(&EngineConfig::default());
        let names: Vec<_> = vars.iter().map(|v| v.name()).collect();
        assert!(names.contains(&"hostname"));
        assert!(names.contains(&"zone"));
        let env = vars.iter().find(|v| v.name() == "env_").unwrap();
        assert!(env.is_prefix());
        assert!(!env.flags().changeable);
        assert!(vars.iter().filter(|v| !v.is_prefix()).all(|v| v.flags().changeable));
    }

    #[test]
    fn test_env_prefix_disabled() {
        let config = EngineConfig::default().without_env_prefix();
        let vars: Vec<Variable> = variables(&config);
        assert!(vars.iter().all(|v| !v.is_prefix()));
    }
}
