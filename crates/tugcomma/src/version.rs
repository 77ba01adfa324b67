//! Minimum-language-version policy.
//!
//! The grammar only recently allowed a trailing comma after starred
//! arguments: calls got it in 3.5, function definitions in 3.6. The target
//! floor is the one knob the rewriter exposes — everything else it does is
//! structural.

/// An ordered `(major, minor)` language version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(pub u8, pub u8);

impl Version {
    /// The default floor: no trailing commas after starred arguments
    /// anywhere.
    pub const PY27: Version = Version(2, 7);

    /// Calls may carry a trailing comma after `*args` / `**kwargs`.
    pub const PY35: Version = Version(3, 5);

    /// Function definitions may carry a trailing comma after starred or
    /// keyword-only parameters.
    pub const PY36: Version = Version(3, 6);
}

/// Rewrite policy consumed by the fix dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub min_version: Version,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            min_version: Version::PY27,
        }
    }
}

impl Settings {
    /// Whether a call whose arguments include `*` / `**` gets a trailing
    /// comma.
    #[must_use]
    pub fn star_call_commas(&self) -> bool {
        self.min_version >= Version::PY35
    }

    /// Whether a function definition with starred or keyword-only
    /// parameters gets a trailing comma.
    #[must_use]
    pub fn star_def_commas(&self) -> bool {
        self.min_version >= Version::PY36
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_ordering() {
        assert!(Version::PY27 < Version::PY35);
        assert!(Version::PY35 < Version::PY36);
        assert!(Version(3, 10) > Version(3, 9));
    }

    #[test]
    fn default_settings_gate_everything() {
        let settings = Settings::default();
        assert!(!settings.star_call_commas());
        assert!(!settings.star_def_commas());
    }

    #[test]
    fn py35_allows_call_commas_only() {
        let settings = Settings {
            min_version: Version::PY35,
        };
        assert!(settings.star_call_commas());
        assert!(!settings.star_def_commas());
    }
}
