//! Caller-side validation
//!
//! The store accepts whatever it is given. These checks run in the
//! calling layer, before a store call, and block blank titles and names,
//! unusable questions and incomplete answers.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::{Book, NewQuestion, Question, QuestionType};

/// Message used for a required question left blank
pub const REQUIRED_MESSAGE: &str = "This question is required";

/// Minimum number of options a choice question needs to be answerable
pub const MIN_CHOICE_OPTIONS: usize = 2;

/// Highest value of a rating question (lowest is 1)
pub const MAX_RATING: u8 = 5;

pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::validation("title", "Title is required"));
    }
    Ok(())
}

pub fn validate_responder_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation("responderName", "Please enter your name"));
    }
    Ok(())
}

/// Check a question before it is added or saved
pub fn validate_question(question: &NewQuestion) -> Result<()> {
    if question.question.trim().is_empty() {
        return Err(Error::validation("question", "Question text is required"));
    }

    if question.question_type == Some(QuestionType::Choice) {
        let usable = question
            .options
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .filter(|o| !o.trim().is_empty())
            .count();
        if usable < MIN_CHOICE_OPTIONS {
            return Err(Error::validation(
                "options",
                format!(
                    "Multiple choice questions need at least {} options",
                    MIN_CHOICE_OPTIONS
                ),
            ));
        }
    }

    Ok(())
}

/// Check a set of answers against the book's questions
///
/// Every failing question is reported at once, keyed by question ID.
/// Answers for IDs the book doesn't know are left alone.
pub fn validate_answers(book: &Book, answers: &BTreeMap<String, String>) -> Result<()> {
    let mut errors = BTreeMap::new();

    for question in book.questions() {
        let answer = answers
            .get(&question.id)
            .map(|a| a.trim())
            .unwrap_or("");

        if answer.is_empty() {
            if question.required {
                errors.insert(question.id.clone(), REQUIRED_MESSAGE.to_string());
            }
            continue;
        }

        if let Some(message) = check_answer(question, answer) {
            errors.insert(question.id.clone(), message);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidAnswers(errors))
    }
}

fn check_answer(question: &Question, answer: &str) -> Option<String> {
    match question.question_type {
        QuestionType::Rating => match answer.parse::<u8>() {
            Ok(value) if (1..=MAX_RATING).contains(&value) => None,
            _ => Some(format!("Rating must be between 1 and {}", MAX_RATING)),
        },
        QuestionType::Choice => {
            if question.options().iter().any(|o| o == answer) {
                None
            } else {
                Some(format!("'{}' is not one of the options", answer))
            }
        }
        QuestionType::Text | QuestionType::Textarea => None,
    }
}
