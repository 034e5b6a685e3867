use thiserror::Error;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Unknown base slug: {0}")]
    UnknownBase(String),
    #[error("Placeholder %{placeholder} exceeds the {groups} capture group(s) of rule '{rule}'")]
    DanglingBackreference {
        rule: String,
        placeholder: usize,
        groups: usize,
    },
    #[error("Invalid rule kind: {0}")]
    InvalidRuleKind(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type RewriteResult<T> = Result<T, RewriteError>;
