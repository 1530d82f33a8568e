// Environment capture rules (pure logic, no process handling)

use super::job::EnvMap;

/// Marker set in the setup script's environment so the script can tell it
/// runs under the job runner
pub const RUNTIME_MARKER_VAR: &str = "_STEPEXEC";

/// Variables owned by the invoking shell/runtime; never imported from a setup script
pub const EXCLUDED_VARIABLES: [&str; 6] = ["_", "PWD", "SHLVL", "TMPDIR", "HOME", RUNTIME_MARKER_VAR];

/// Sanitized variables reported by a setup script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentDiff {
    vars: EnvMap,
}

impl EnvironmentDiff {
    /// Parse `KEY=value` records, one per line or NUL-terminated (`env -0`)
    ///
    /// Records without `=` and excluded names are dropped. The value keeps
    /// everything after the first `=`.
    pub fn parse(data: &str) -> Self {
        let separator = if data.contains('\0') { '\0' } else { '\n' };

        let vars = data
            .split(separator)
            .filter_map(|record| record.split_once('='))
            .filter(|(key, _)| !key.is_empty() && !Self::is_excluded(key))
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        Self { vars }
    }

    pub fn is_excluded(key: &str) -> bool {
        EXCLUDED_VARIABLES.contains(&key)
    }

    /// Merge into a copy of `base`; script values win over existing ones
    pub fn merge_into(&self, base: &EnvMap) -> EnvMap {
        let mut merged = base.clone();
        merged.extend(self.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        let diff = EnvironmentDiff::parse("FOO=bar\nEMPTY=\nURL=a=b\n");

        assert_eq!(diff.get("FOO"), Some("bar"));
        assert_eq!(diff.get("EMPTY"), Some(""));
        assert_eq!(diff.get("URL"), Some("a=b"));
        assert_eq!(diff.len(), 3);
    }

    #[test]
    fn test_parse_nul_separated() {
        let diff = EnvironmentDiff::parse("FOO=line1\nline2\0BAR=x\0");

        assert_eq!(diff.get("FOO"), Some("line1\nline2"));
        assert_eq!(diff.get("BAR"), Some("x"));
    }

    #[test]
    fn test_excluded_names_dropped() {
        let data = "_=/usr/bin/env\nPWD=/x\nSHLVL=3\nTMPDIR=/t\nHOME=/h\n_STEPEXEC=1\nKEEP=yes\n";
        let diff = EnvironmentDiff::parse(data);

        for name in EXCLUDED_VARIABLES {
            assert!(diff.get(name).is_none(), "{} leaked", name);
        }
        assert_eq!(diff.get("KEEP"), Some("yes"));
        assert_eq!(diff.len(), 1);
    }

    #[test]
    fn test_garbage_lines_ignored() {
        let diff = EnvironmentDiff::parse("no equals here\n=novalue\n\nOK=1");
        assert_eq!(diff.len(), 1);
        assert_eq!(diff.get("OK"), Some("1"));
    }

    #[test]
    fn test_merge_produces_new_map() {
        let mut base = EnvMap::new();
        base.insert("A".to_string(), "old".to_string());
        base.insert("HOME".to_string(), "/runtime/home".to_string());

        let diff = EnvironmentDiff::parse("A=new\nB=added\nHOME=/script/home\n");
        let merged = diff.merge_into(&base);

        assert_eq!(merged.get("A").map(String::as_str), Some("new"));
        assert_eq!(merged.get("B").map(String::as_str), Some("added"));
        assert_eq!(merged.get("HOME").map(String::as_str), Some("/runtime/home"));
        assert_eq!(base.get("A").map(String::as_str), Some("old"));
        assert!(!base.contains_key("B"));
    }
}
