// Options carried by well-known pragmas

use crate::pragma_recorder::PragmaList;

/// Reflection options read from the recorded pragmas
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PragmaOptions {
    /// `#pragma java_package_name(...)`
    pub java_package_name: Option<String>,
    /// `#pragma version(...)`
    pub version: Option<u32>,
    /// `#pragma set_reflect_license(...)`
    pub reflect_license: Option<String>,
}

impl PragmaOptions {
    /// Interprets the pragmas in order; a later pragma overrides an earlier
    /// one of the same name and unknown names are ignored.
    pub fn from_pragmas(pragmas: &PragmaList) -> Self {
        let mut options = Self::default();

        for entry in pragmas {
            let value = unquote(&entry.value);
            match unquote(&entry.name) {
                "java_package_name" => options.java_package_name = non_empty(value),
                "set_reflect_license" => options.reflect_license = non_empty(value),
                "version" => match value.parse::<u32>() {
                    Ok(version) => options.version = Some(version),
                    Err(_) => log::warn!("ignoring invalid pragma version '{}'", value),
                },
                other => log::trace!("pragma '{}' carries no reflection option", other),
            }
        }

        options
    }
}

/// Package name that applies to the generated bindings: an explicitly
/// configured name wins over `#pragma java_package_name`.
pub fn resolve_package_name(explicit: Option<&str>, options: &PragmaOptions) -> Option<String> {
    explicit
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .or_else(|| options.java_package_name.clone())
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(text)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: &[(&str, &str)]) -> PragmaList {
        let mut pragmas = PragmaList::new();
        for (name, value) in entries {
            pragmas.push(name.to_string(), value.to_string());
        }
        pragmas
    }

    #[test]
    fn test_known_options() {
        let options = PragmaOptions::from_pragmas(&list(&[
            ("version", "1"),
            ("java_package_name", "\"com.example.first\""),
            ("stateVertex", "parent"),
            ("java_package_name", "\"com.example.second\""),
            ("set_reflect_license", "\"Apache-2.0\""),
        ]));

        assert_eq!(options.version, Some(1));
        assert_eq!(options.java_package_name.as_deref(), Some("com.example.second"));
        assert_eq!(options.reflect_license.as_deref(), Some("Apache-2.0"));
    }

    #[test]
    fn test_invalid_version_is_ignored() {
        let options = PragmaOptions::from_pragmas(&list(&[("version", "1"), ("version", "two")]));
        assert_eq!(options.version, Some(1));
    }

    #[test]
    fn test_explicit_package_name_wins() {
        let options = PragmaOptions {
            java_package_name: Some("com.example.pragma".to_string()),
            ..PragmaOptions::default()
        };

        assert_eq!(
            resolve_package_name(Some("com.example.cli"), &options).as_deref(),
            Some("com.example.cli")
        );
        assert_eq!(
            resolve_package_name(None, &options).as_deref(),
            Some("com.example.pragma")
        );
        assert_eq!(resolve_package_name(Some(""), &PragmaOptions::default()), None);
    }
}
