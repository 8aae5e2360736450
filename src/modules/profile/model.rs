use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::modules::user::model::PublicUserResponse;

pub const MIN_QUESTIONS: usize = 2;
pub const MAX_QUESTIONS: usize = 7;
pub const MAX_QUESTION_LEN: usize = 120;

#[derive(Deserialize, Validate)]
pub struct PublishQuestionsModel {
    #[validate(
        length(min = 2, max = 7, message = "A profile has 2 to 7 questions"),
        custom(function = validate_questions)
    )]
    pub questions: Vec<String>,
}

fn validate_questions(questions: &[String]) -> Result<(), ValidationError> {
    for question in questions {
        let trimmed = question.trim();
        if trimmed.is_empty() {
            let mut err = ValidationError::new("question_empty");
            err.message = Some("Questions cannot be empty".into());
            return Err(err);
        }
        if trimmed.chars().count() > MAX_QUESTION_LEN {
            let mut err = ValidationError::new("question_too_long");
            err.message = Some("Questions are capped at 120 characters".into());
            return Err(err);
        }
    }
    Ok(())
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub questions: Vec<String>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A creator's page as a visitor sees it: public card plus prompts.
#[derive(Serialize)]
pub struct PublicProfileView {
    pub user: PublicUserResponse,
    pub questions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(questions: &[&str]) -> PublishQuestionsModel {
        PublishQuestionsModel { questions: questions.iter().map(|q| q.to_string()).collect() }
    }

    #[test]
    fn accepts_two_to_seven_questions() {
        assert!(model(&["What's your ideal lazy day?", "Two truths and a lie?"])
            .validate()
            .is_ok());
        assert!(model(&["a?", "b?", "c?", "d?", "e?", "f?", "g?"]).validate().is_ok());
    }

    #[test]
    fn rejects_too_few_or_too_many() {
        assert!(model(&["only one?"]).validate().is_err());
        assert!(model(&["a?", "b?", "c?", "d?", "e?", "f?", "g?", "h?"]).validate().is_err());
    }

    #[test]
    fn rejects_blank_and_overlong_questions() {
        assert!(model(&["fine?", "   "]).validate().is_err());
        let long = "x".repeat(MAX_QUESTION_LEN + 1);
        assert!(model(&["fine?", &long]).validate().is_err());
        let at_cap = "x".repeat(MAX_QUESTION_LEN);
        assert!(model(&["fine?", &at_cap]).validate().is_ok());
    }
}
