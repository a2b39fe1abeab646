use std::borrow::Cow;
use std::path::Path;

use promptmock_core::Temperature;
use regex::Regex;

use crate::FixtureError;

/// Output file names carry their temperature as `D_D` around the last
/// underscore: `output_0_7.txt` is sampled at 0.7.
#[derive(Debug, Clone)]
pub(crate) struct TemperatureGrammar {
    pattern: Regex,
}

impl TemperatureGrammar {
    const PATTERN: &'static str = r"(.)_([^_])[^_]*$";

    pub(crate) fn new() -> Result<Self, FixtureError> {
        let pattern =
            Regex::new(Self::PATTERN).map_err(|e| FixtureError::InvalidConfig(e.to_string()))?;
        Ok(Self { pattern })
    }

    pub(crate) fn temperature(&self, path: &Path) -> Result<Temperature, FixtureError> {
        let name = entry_name(path);
        let captures =
            self.pattern
                .captures(&name)
                .ok_or_else(|| FixtureError::MissingTemperature {
                    path: path.to_path_buf(),
                })?;
        let value = format!("{}.{}", &captures[1], &captures[2]);
        value
            .parse()
            .map_err(|_| FixtureError::InvalidTemperature {
                path: path.to_path_buf(),
                value,
            })
    }
}

pub(crate) fn entry_name(path: &Path) -> Cow<'_, str> {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> TemperatureGrammar {
        TemperatureGrammar::new().expect("grammar")
    }

    #[test]
    fn reads_digits_around_last_underscore() {
        let g = grammar();
        assert_eq!(
            g.temperature(Path::new("fixtures/output_0_7.txt")).unwrap().to_string(),
            "0.7"
        );
        assert_eq!(
            g.temperature(Path::new("davinci_output_1_0.md")).unwrap().to_string(),
            "1.0"
        );
        assert_eq!(
            g.temperature(Path::new("run_output_0_3")).unwrap().to_string(),
            "0.3"
        );
    }

    #[test]
    fn missing_when_nothing_follows_last_underscore() {
        let err = grammar()
            .temperature(Path::new("output_"))
            .expect_err("no digit after underscore");
        assert!(matches!(err, FixtureError::MissingTemperature { .. }));
    }

    #[test]
    fn invalid_when_window_is_not_digits() {
        let err = grammar()
            .temperature(Path::new("output_1.txt"))
            .expect_err("window is t_1");
        match err {
            FixtureError::InvalidTemperature { value, .. } => assert_eq!(value, "t.1"),
            other => panic!("unexpected error: {other}"),
        }

        let err = grammar()
            .temperature(Path::new("output_0_7_final.txt"))
            .expect_err("window is 7_f");
        assert!(matches!(err, FixtureError::InvalidTemperature { .. }));
    }

    #[test]
    fn only_the_file_name_is_considered() {
        let t = grammar()
            .temperature(Path::new("runs_2_5/output_0_9.txt"))
            .unwrap();
        assert_eq!(t.to_string(), "0.9");
    }
}
