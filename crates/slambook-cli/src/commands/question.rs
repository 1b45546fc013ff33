//! Question command handlers

use anyhow::{bail, Context, Result};

use slambook_core::validation::validate_question;
use slambook_core::{Error, NewQuestion, Question, QuestionPatch, QuestionType, Store};

use crate::output::Output;

use super::{find_book, find_page, find_question};

/// Add a question to a page
#[allow(clippy::too_many_arguments)]
pub fn add(
    store: &mut Store,
    book_id: String,
    page_id: String,
    text: String,
    question_type: QuestionType,
    required: bool,
    options: Vec<String>,
    output: &Output,
) -> Result<()> {
    let mut input = NewQuestion::new(text)
        .with_type(question_type)
        .required(required);
    if !options.is_empty() {
        input = input.with_options(options);
    }
    validate_question(&input)?;

    let book = find_book(store, &book_id)?;
    let page = find_page(&book, &page_id)?;
    let question = store
        .add_question(&book.id, &page.id, input)
        .context("Failed to add question")?
        .ok_or_else(|| Error::not_found("Page", &page.id))?;

    output.success(&format!("Added question: {}", question.id));
    output.print_question(&question);
    Ok(())
}

/// Change a question's text, type, required flag or options
#[allow(clippy::too_many_arguments)]
pub fn edit(
    store: &mut Store,
    book_id: String,
    page_id: String,
    question_id: String,
    text: Option<String>,
    question_type: Option<QuestionType>,
    required: Option<bool>,
    options: Vec<String>,
    output: &Output,
) -> Result<()> {
    let patch = QuestionPatch {
        question_type,
        question: text,
        required,
        options: if options.is_empty() {
            None
        } else {
            Some(options)
        },
    };
    if patch == QuestionPatch::default() {
        bail!("Nothing to change. Use --text, --type, --required or --option.");
    }

    let book = find_book(store, &book_id)?;
    let page = find_page(&book, &page_id)?;
    let current = find_question(page, &question_id)?;

    // Check the question as it will look after the change
    let mut preview = current.clone();
    preview.apply(patch.clone());
    validate_question(&as_input(&preview))?;

    let question = store
        .update_question(&book.id, &page.id, &current.id, patch)
        .context("Failed to update question")?
        .ok_or_else(|| Error::not_found("Question", &current.id))?;

    output.success("Question updated");
    output.print_question(&question);
    Ok(())
}

/// Delete a question; answers already given to it are kept
pub fn delete(
    store: &mut Store,
    book_id: String,
    page_id: String,
    question_id: String,
    output: &Output,
) -> Result<()> {
    let book = find_book(store, &book_id)?;
    let page = find_page(&book, &page_id)?;
    let question = find_question(page, &question_id)?;

    let page = store
        .delete_question(&book.id, &page.id, &question.id)
        .context("Failed to delete question")?
        .ok_or_else(|| Error::not_found("Question", &question.id))?;

    output.success(&format!(
        "Deleted question, {} left on page {}",
        page.questions.len(),
        page.order + 1
    ));
    Ok(())
}

fn as_input(question: &Question) -> NewQuestion {
    NewQuestion {
        question_type: Some(question.question_type),
        question: question.question.clone(),
        required: Some(question.required),
        options: question.options.clone(),
    }
}
