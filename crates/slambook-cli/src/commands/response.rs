//! Response command handlers

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};

use slambook_core::id::short;
use slambook_core::validation::{validate_answers, validate_responder_name};
use slambook_core::{Book, Error, NewResponse, Question, QuestionType, Store};

use crate::output::Output;
use crate::prompt::{confirm, is_interactive, prompt_line};

use super::{find_book, find_response, resolve};

/// Fill in a book
///
/// Answers come from `--answer QID=VALUE`. With none given on an
/// interactive terminal, each question is asked in turn.
pub fn add(
    store: &mut Store,
    book_id: String,
    name: String,
    answers: Vec<String>,
    output: &Output,
) -> Result<()> {
    validate_responder_name(&name)?;
    let book = find_book(store, &book_id)?;

    let answers = if answers.is_empty() && output.should_prompt() && is_interactive() {
        output.message(&format!(
            "Filling in \"{}\" as {}. Press Enter to skip a question.\n",
            book.title, name
        ));
        ask_questions(&book)?
    } else {
        parse_answers(&book, &answers)?
    };

    if let Err(e) = validate_answers(&book, &answers) {
        report_invalid_answers(&book, &e);
        return Err(e.into());
    }

    let mut input = NewResponse::new(name);
    input.answers = answers;
    let response = store
        .add_response(&book.id, input)
        .context("Failed to save response")?
        .ok_or_else(|| Error::not_found("Book", &book.id))?;

    output.success(&format!(
        "Thanks, {}! Response saved: {}",
        response.responder_name, response.id
    ));
    Ok(())
}

/// List the responses to a book
pub fn list(store: &Store, book_id: String, output: &Output) -> Result<()> {
    let book = find_book(store, &book_id)?;
    let responses = store.get_book_responses(&book.id)?;
    output.print_responses(&book, &responses);
    Ok(())
}

/// Show one response with its answers
pub fn show(store: &Store, book_id: String, response_id: String, output: &Output) -> Result<()> {
    let book = find_book(store, &book_id)?;
    let response = find_response(&book, &response_id)?;
    output.print_response(&book, response);
    Ok(())
}

/// Delete a response
pub fn delete(
    store: &mut Store,
    book_id: String,
    response_id: String,
    yes: bool,
    output: &Output,
) -> Result<()> {
    let book = find_book(store, &book_id)?;
    let response = find_response(&book, &response_id)?;

    if output.should_prompt() && !yes {
        println!(
            "Delete response: {} from {}",
            short(&response.id),
            response.responder_name
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store
        .delete_response(&book.id, &response.id)
        .context("Failed to delete response")?;

    output.success(&format!("Deleted response: {}", response.id));
    Ok(())
}

/// Parse `QID=VALUE` pairs, resolving question ID prefixes against the book
fn parse_answers(book: &Book, pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let questions: Vec<&Question> = book.questions().collect();
    let mut answers = BTreeMap::new();

    for pair in pairs {
        let Some((id, value)) = pair.split_once('=') else {
            bail!("Invalid answer '{}'. Expected QUESTION_ID=VALUE.", pair);
        };
        let question = resolve(
            "Question",
            id.trim(),
            &questions,
            |q| q.id.as_str(),
            |q| q.question.clone(),
        )?;
        answers.insert(question.id.clone(), value.trim().to_string());
    }

    Ok(answers)
}

/// Ask every question on the terminal
fn ask_questions(book: &Book) -> Result<BTreeMap<String, String>> {
    let mut answers = BTreeMap::new();

    for (index, page) in book.pages.iter().enumerate() {
        if page.questions.is_empty() {
            continue;
        }
        println!("── Page {} ──", index + 1);
        for question in &page.questions {
            if let Some(answer) = prompt_line(&question_prompt(question))? {
                answers.insert(question.id.clone(), answer);
            }
        }
        println!();
    }

    Ok(answers)
}

fn question_prompt(question: &Question) -> String {
    let mut prompt = question.question.clone();
    if question.required {
        prompt.push_str(" *");
    }
    match question.question_type {
        QuestionType::Rating => prompt.push_str(" (1-5)"),
        QuestionType::Choice => {
            prompt.push_str(&format!(" [{}]", question.options().join(" / ")));
        }
        QuestionType::Text | QuestionType::Textarea => {}
    }
    prompt
}

fn report_invalid_answers(book: &Book, error: &Error) {
    if let Error::InvalidAnswers(errors) = error {
        for (question_id, message) in errors {
            let label = book
                .find_question(question_id)
                .map(|q| q.question.as_str())
                .unwrap_or(question_id.as_str());
            eprintln!("  {}: {}", label, message);
        }
    }
}
