use std::str::FromStr;

/// Coordinates did not split into 3 or 4 `/`-delimited segments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid coordinates: {0}")]
pub struct InvalidCoordinates(pub String);

/// Library coordinates in `group/module/version[/classifier]` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub group: String,
    pub module: String,
    pub version: String,
    /// Empty when the coordinates carry no classifier.
    pub classifier: String,
}

impl Coordinates {
    /// Parses `group/module/version[/classifier]`. Segment contents are
    /// taken as-is.
    pub fn parse(raw: &str) -> Result<Self, InvalidCoordinates> {
        let parts: Vec<&str> = raw.split('/').collect();
        match parts.as_slice() {
            [group, module, version] => Ok(Self::new(group, module, version, "")),
            [group, module, version, classifier] => {
                Ok(Self::new(group, module, version, classifier))
            }
            _ => Err(InvalidCoordinates(raw.to_string())),
        }
    }

    fn new(group: &str, module: &str, version: &str, classifier: &str) -> Self {
        Self {
            group: group.to_string(),
            module: module.to_string(),
            version: version.to_string(),
            classifier: classifier.to_string(),
        }
    }

    /// Path of the jar in the Maven 2 repository layout, e.g.
    /// `org/acme/lib/1.2.3/lib-1.2.3-tests.jar`.
    pub fn repository_path(&self) -> String {
        let mut file = format!("{}-{}", self.module, self.version);
        if !self.classifier.is_empty() {
            file.push('-');
            file.push_str(&self.classifier);
        }
        format!(
            "{}/{}/{}/{file}.jar",
            self.group.replace('.', "/"),
            self.module,
            self.version
        )
    }
}

impl FromStr for Coordinates {
    type Err = InvalidCoordinates;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
