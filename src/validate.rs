use validator::{Validate, ValidationErrors};

/// Draft comment text as entered in the compose form. Rules hang off the
/// field name; callers only surface the returned message.
#[derive(Debug, Validate)]
struct CommentDraft {
    #[validate(length(min = 1, max = 500, message = "Comment must be between 1 and 500 characters"))]
    comment: String,
}

/// Validates draft comment text, returning the message to display when the
/// draft is rejected. Leading/trailing whitespace does not count as content.
pub fn validate_comment(text: &str) -> Option<String> {
    let draft = CommentDraft {
        comment: text.trim().to_string(),
    };
    match draft.validate() {
        Ok(()) => None,
        Err(errors) => first_message(&errors, "comment"),
    }
}

fn first_message(errors: &ValidationErrors, field: &'static str) -> Option<String> {
    errors
        .field_errors()
        .get(field)
        .and_then(|list| list.first())
        .map(|error| match &error.message {
            Some(message) => message.to_string(),
            None => format!("Invalid value for {field}"),
        })
}
