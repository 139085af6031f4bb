/// The recoverable failures of the in-memory spawnable container.
#[derive(Debug, Clone, PartialEq, Eq, Fail)]
pub enum ContainerError {
    #[fail(display = "{}", _0)]
    NotActivated(String),
    #[fail(display = "{}", _0)]
    DuplicateName(String),
    #[fail(display = "{}", _0)]
    TemplateNotFound(String),
    #[fail(display = "{}", _0)]
    ConversionFailed(String),
    #[fail(display = "{}", _0)]
    RootNotProduced(String),
    #[fail(display = "{}", _0)]
    NotFound(String),
}

impl ContainerError {
    /// Gets the human-readable description of this failure.
    pub fn message(&self) -> &str {
        match *self {
            ContainerError::NotActivated(ref v)
            | ContainerError::DuplicateName(ref v)
            | ContainerError::TemplateNotFound(ref v)
            | ContainerError::ConversionFailed(ref v)
            | ContainerError::RootNotProduced(ref v)
            | ContainerError::NotFound(ref v) => v.as_str(),
        }
    }
}

pub type ContainerResult<T> = ::std::result::Result<T, ContainerError>;
