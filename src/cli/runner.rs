//! Walks a [`FormController`] through one terminal session.

use crate::cli::interaction::{Answer, FieldPrompt, FormInteraction};
use crate::cli::output;
use crate::errors::FormError;
use crate::form::{FieldErrors, FormController, FormFlow, SubmitReport};

/// How a terminal form session ended.
#[derive(Debug)]
pub enum RunOutcome<T> {
    Submitted(T),
    Cancelled,
}

enum Step {
    Next,
    Cancelled,
}

/// Prompts every field, submits, and re-prompts only the fields that failed.
pub struct FormRunner<'i, I: ?Sized> {
    interaction: &'i mut I,
}

impl<'i, I: FormInteraction + ?Sized> FormRunner<'i, I> {
    pub fn new(interaction: &'i mut I) -> Self {
        Self { interaction }
    }

    pub fn run<F: FormFlow>(
        &mut self,
        controller: &mut FormController,
        flow: &mut F,
    ) -> Result<RunOutcome<F::Output>, FormError> {
        print_chrome(controller);
        if let Step::Cancelled = self.prompt_all(controller)? {
            return Ok(RunOutcome::Cancelled);
        }

        loop {
            if !self.interaction.confirm_submit(controller.definition())? {
                return Ok(RunOutcome::Cancelled);
            }
            match controller.submit(flow) {
                SubmitReport::Succeeded(output) => return Ok(RunOutcome::Submitted(output)),
                SubmitReport::Invalid(errors) => {
                    output::warning(format!(
                        "Please fix {} field(s) before submitting.",
                        errors.len()
                    ));
                    if let Step::Cancelled = self.prompt_failing(controller, &errors)? {
                        return Ok(RunOutcome::Cancelled);
                    }
                }
                SubmitReport::Failed(_) => {
                    if let Some(message) = controller.last_failure() {
                        output::error(message);
                    }
                    if !self.interaction.retry()? {
                        return Ok(RunOutcome::Cancelled);
                    }
                }
                SubmitReport::Busy => output::warning("A submission is already in progress."),
            }
        }
    }

    fn prompt_all(&mut self, controller: &mut FormController) -> Result<Step, FormError> {
        let sections: Vec<(Option<String>, Vec<String>)> = controller
            .definition()
            .sections
            .iter()
            .map(|section| {
                let names = section.fields.iter().map(|field| field.name.clone()).collect();
                (section.title.clone(), names)
            })
            .collect();
        for (title, names) in sections {
            if let Some(title) = title {
                output::section(title);
            }
            for name in names {
                if let Step::Cancelled = self.prompt_field(controller, &name)? {
                    return Ok(Step::Cancelled);
                }
            }
        }
        Ok(Step::Next)
    }

    fn prompt_failing(
        &mut self,
        controller: &mut FormController,
        errors: &FieldErrors,
    ) -> Result<Step, FormError> {
        let failing: Vec<String> = errors.fields().map(str::to_string).collect();
        for name in failing {
            if let Step::Cancelled = self.prompt_field(controller, &name)? {
                return Ok(Step::Cancelled);
            }
        }
        Ok(Step::Next)
    }

    fn prompt_field(
        &mut self,
        controller: &mut FormController,
        name: &str,
    ) -> Result<Step, FormError> {
        loop {
            let answer = {
                let mut widget = controller.render(name)?;
                let title = controller
                    .definition()
                    .field(name)
                    .map(|field| field.display_label())
                    .unwrap_or(name);
                let prompt = FieldPrompt {
                    name,
                    title,
                    widget: widget.kind.name(),
                    lines: widget.lines(),
                    error: controller.error(name),
                };
                let answer = self.interaction.prompt(&prompt)?;
                match answer {
                    Answer::Value(raw) => match widget.input(&raw) {
                        Ok(()) => Answer::Keep,
                        Err(problem) => {
                            output::field_error(problem);
                            continue;
                        }
                    },
                    other => other,
                }
            };
            if answer == Answer::Cancel {
                return Ok(Step::Cancelled);
            }
            if let Some(message) = controller.blur(name) {
                output::field_error(message);
            }
            return Ok(Step::Next);
        }
    }
}

fn print_chrome(controller: &FormController) {
    let definition = controller.definition();
    output::section(&definition.header);
    if let Some(subtitle) = &definition.subtitle {
        output::info(subtitle);
    }
}
