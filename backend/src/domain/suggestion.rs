//! Improvement suggestions proposed by citizens.

use chrono::{DateTime, Utc};

use super::content::{ContentStatus, ContentValidationError, Jurisdiction, validate_text};
use super::report::{DESCRIPTION_MAX, TITLE_MAX, TITLE_MIN};
use super::{SuggestionId, UserId};

/// Maximum category length in characters.
pub const CATEGORY_MAX: usize = 50;

/// Validated input for a new suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSuggestion {
    title: String,
    description: String,
    category: String,
    jurisdiction: Jurisdiction,
}

impl NewSuggestion {
    pub fn new(
        title: &str,
        description: &str,
        category: &str,
        jurisdiction: Jurisdiction,
    ) -> Result<Self, ContentValidationError> {
        Ok(Self {
            title: validate_text("title", title, TITLE_MIN, TITLE_MAX)?,
            description: validate_text("description", description, 1, DESCRIPTION_MAX)?,
            category: validate_text("category", category, 1, CATEGORY_MAX)?,
            jurisdiction,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn jurisdiction(&self) -> &Jurisdiction {
        &self.jurisdiction
    }
}

/// Stored suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub id: SuggestionId,
    pub author: UserId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub jurisdiction: Jurisdiction,
    pub status: ContentStatus,
    pub upvote_count: u32,
    pub comment_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Suggestion {
    pub fn submit(
        id: SuggestionId,
        author: UserId,
        input: NewSuggestion,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author,
            title: input.title,
            description: input.description,
            category: input.category,
            jurisdiction: input.jurisdiction,
            status: ContentStatus::Pending,
            upvote_count: 0,
            comment_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Suggestion plus the caller's upvote state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionDetail {
    pub suggestion: Suggestion,
    pub has_user_upvoted: bool,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn jurisdiction() -> Jurisdiction {
        Jurisdiction::new("Pokhara", "6").expect("jurisdiction")
    }

    #[rstest]
    #[case("", ContentValidationError::Empty { field: "category" })]
    #[case(&"x".repeat(CATEGORY_MAX + 1), ContentValidationError::TooLong { field: "category", max: CATEGORY_MAX })]
    fn category_is_validated(#[case] category: &str, #[case] expected: ContentValidationError) {
        let err = NewSuggestion::new("Bike lanes", "Add lanes", category, jurisdiction())
            .expect_err("invalid category");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn submitted_suggestions_start_without_counts() {
        let input = NewSuggestion::new("Bike lanes", "Add lanes", "transport", jurisdiction())
            .expect("valid suggestion");
        let suggestion =
            Suggestion::submit(SuggestionId::random(), UserId::random(), input, Utc::now());
        assert_eq!(suggestion.status, ContentStatus::Pending);
        assert_eq!((suggestion.upvote_count, suggestion.comment_count), (0, 0));
        assert_eq!(suggestion.category, "transport");
    }
}
