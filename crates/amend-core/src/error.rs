use thiserror::Error;

#[derive(Error, Debug)]
pub enum AmendError {
    #[error("malformed document at {location}: {message}")]
    MalformedDocument { message: String, location: String },

    #[error("fragment is not well-formed XML: {0}")]
    FragmentParse(String),

    #[error("anchor element '{0}' not found")]
    AnchorNotFound(String),

    #[error("element '{id}' ({tag}) not found")]
    ElementNotFound { tag: String, id: String },

    #[error("no unique id with prefix '{prefix}' after {attempts} attempts")]
    IdCollisionExhausted { prefix: String, attempts: u32 },

    #[error("XML serialization error: {0}")]
    XmlWrite(String),
}

pub type Result<T> = std::result::Result<T, AmendError>;
