use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Vd2SvgError {
    Xml { path: Option<PathBuf>, message: String },
    UnresolvedReference(String),
    CyclicReference(String),
    MissingAttribute { element: String, attribute: String },
    NoConverter(String),
    UnsupportedGradient(String),
    MissingDrawable(String),
    InvalidInput(String),
    Io(std::io::Error),
}

impl fmt::Display for Vd2SvgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vd2SvgError::Xml { path, message } => match path {
                Some(path) => write!(f, "malformed xml in {}: {}", path.display(), message),
                None => write!(f, "malformed xml: {}", message),
            },
            Vd2SvgError::UnresolvedReference(reference) => {
                write!(f, "unresolvable reference: {}", reference)
            }
            Vd2SvgError::CyclicReference(reference) => {
                write!(f, "cyclic reference: {}", reference)
            }
            Vd2SvgError::MissingAttribute { element, attribute } => {
                write!(f, "element <{}> is missing attribute {}", element, attribute)
            }
            Vd2SvgError::NoConverter(element) => {
                write!(f, "no converter registered for element <{}>", element)
            }
            Vd2SvgError::UnsupportedGradient(kind) => {
                write!(f, "unsupported gradient type: {}", kind)
            }
            Vd2SvgError::MissingDrawable(reference) => {
                write!(f, "drawable not found on resource path: {}", reference)
            }
            Vd2SvgError::InvalidInput(message) => write!(f, "invalid input: {}", message),
            Vd2SvgError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for Vd2SvgError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Vd2SvgError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Vd2SvgError {
    fn from(value: std::io::Error) -> Self {
        Vd2SvgError::Io(value)
    }
}
