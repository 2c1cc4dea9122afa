//! Pre-publish checks run by `phub pack` and `phub publish`.

use hub_core::ids::is_valid_plugin_name;

use crate::manifest::PluginManifest;

/// Problems found in a plugin before packaging, grouped by input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub name_errors: Vec<String>,
    pub code_errors: Vec<String>,
    pub config_errors: Vec<String>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.name_errors.is_empty() && self.code_errors.is_empty() && self.config_errors.is_empty()
    }

    /// All messages, prefixed with the input they concern.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        let tagged = |tag: &str, errors: &[String]| {
            errors
                .iter()
                .map(|e| format!("{tag}: {e}"))
                .collect::<Vec<_>>()
        };
        let mut all = tagged("name", &self.name_errors);
        all.extend(tagged("code", &self.code_errors));
        all.extend(tagged("config", &self.config_errors));
        all
    }
}

#[must_use]
pub fn validate(name: &str, source: &str, manifest: &str) -> ValidationReport {
    let mut report = ValidationReport::default();

    if name.is_empty() {
        report.name_errors.push(String::from("plugin name is empty"));
    } else if !is_valid_plugin_name(name) {
        report.name_errors.push(String::from(
            "plugin name may only contain letters, digits, '_' and '-'",
        ));
    }

    if !defines_plugin_class(source) {
        report
            .code_errors
            .push(String::from("source must define a class deriving from Plugin"));
    }
    if !source.contains("def __init__") {
        report
            .code_errors
            .push(String::from("plugin class must define __init__"));
    }

    match PluginManifest::parse(manifest) {
        Ok(parsed) => {
            for key in parsed.missing_keys() {
                report.config_errors.push(format!("missing key '{key}'"));
            }
            if let Some(declared) = parsed.plugin_name() {
                if declared != name {
                    report.config_errors.push(format!(
                        "plugin_name '{declared}' does not match plugin name '{name}'"
                    ));
                }
            }
        }
        Err(e) => report.config_errors.push(e.to_string()),
    }

    report
}

fn defines_plugin_class(source: &str) -> bool {
    source.lines().any(|line| {
        let line = line.trim_start();
        line.starts_with("class ")
            && line
                .split_once('(')
                .and_then(|(_, bases)| bases.split_once(')'))
                .is_some_and(|(bases, _)| bases.split(',').any(|b| b.trim() == "Plugin"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const SOURCE: &str = "class Echo(Plugin):\n    def __init__(self, bot):\n        self.bot = bot\n";
    const MANIFEST: &str = "plugin_name: Echo\nversion: 1.0.0\nauthor: Bob\ndescription: echoes\n";

    #[test]
    fn complete_plugin_is_valid() {
        let report = validate("Echo", SOURCE, MANIFEST);
        assert!(report.is_valid(), "{:?}", report.messages());
    }

    #[rstest]
    #[case("class Echo:\n    def __init__(self): pass\n")]
    #[case("class Echo(BasePlugin):\n    def __init__(self): pass\n")]
    #[case("def Echo(Plugin): pass\n")]
    fn requires_plugin_subclass(#[case] source: &str) {
        let report = validate("Echo", source, MANIFEST);
        assert_eq!(report.code_errors.len(), 1);
    }

    #[test]
    fn accepts_multiple_bases() {
        let source = "class Echo(Mixin, Plugin):\n    def __init__(self): pass\n";
        assert!(validate("Echo", source, MANIFEST).is_valid());
    }

    #[test]
    fn reports_every_category() {
        let report = validate("bad name", "print('hi')", "plugin_name: Other\n");
        assert_eq!(report.name_errors.len(), 1);
        assert_eq!(report.code_errors.len(), 2);
        assert!(report.config_errors.iter().any(|e| e.contains("version")));
        assert!(report.config_errors.iter().any(|e| e.contains("does not match")));
        assert!(!report.is_valid());
        assert!(report.messages()[0].starts_with("name: "));
    }

    #[test]
    fn unparseable_manifest_is_config_error() {
        let report = validate("Echo", SOURCE, "- just\n- a list\n");
        assert_eq!(report.config_errors.len(), 1);
        assert!(report.name_errors.is_empty());
    }
}
