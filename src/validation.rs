use thiserror::Error;
use validator::Validate;

/// Why a request body was refused before reaching the database.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("The {0} field is required.")]
    Required(&'static str),
    #[error("The {field} field {reason}.")]
    Invalid { field: &'static str, reason: String },
    #[error("{0}")]
    Rules(String),
}

impl ValidationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.keys().collect();
        fields.sort();

        let messages: Vec<String> = fields
            .into_iter()
            .flat_map(|field| {
                field_errors[field].iter().map(move |error| {
                    error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| format!("The {} field is invalid.", field))
                })
            })
            .collect();

        ValidationError::Rules(messages.join(" "))
    }
}

/// Runs the `validator` rules of an input struct and hands it back on success.
pub fn validated<T: Validate>(input: T) -> Result<T, ValidationError> {
    input.validate()?;
    Ok(input)
}
