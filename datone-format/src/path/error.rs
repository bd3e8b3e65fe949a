use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntoDatPathError {
    UnrepresentableStr,
    RelativeComponent,
    EmptyPath,
}

impl std::error::Error for IntoDatPathError {}

impl fmt::Display for IntoDatPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl IntoDatPathError {
    pub fn as_str(&self) -> &str {
        match self {
            IntoDatPathError::UnrepresentableStr => "unrepresentable string found in path",
            IntoDatPathError::RelativeComponent => "`.` and `..` are not valid archive names",
            IntoDatPathError::EmptyPath => "no path provided",
        }
    }
}
