use std::thread;

use chrono::Utc;

use crate::cli::commands::Session;
use crate::cli::output;
use crate::cli::runner::{FormRunner, RunOutcome};
use crate::errors::{FormError, SubmissionError};
use crate::form::ValueMap;
use crate::intake::{
    defaults, open, FormMode, IntakeSubmission, Navigation, RegistrationContext,
    SubmissionContext, SubmissionPolicy, Submitted,
};

pub(crate) fn cmd_onboard(session: &mut Session, _args: &[String]) -> Result<(), FormError> {
    onboard(session).map(|_| ())
}

/// Signs a patient up, registers them and books their first appointment.
///
/// Returns `false` when any form was abandoned.
pub fn onboard(session: &mut Session) -> Result<bool, FormError> {
    output::section(format!("{} patient intake", session.config.brand));

    let now = Utc::now();
    let Some(signup) = run_form(
        session,
        FormMode::CreatePatient,
        defaults(FormMode::CreatePatient, now),
        &SubmissionContext::new(),
    )?
    else {
        return Ok(false);
    };
    let user_id = signup.record.id().to_string();

    let registration = RegistrationContext::load(&mut session.backend, &user_id)
        .map_err(SubmissionError::from)?;
    let Some(registered) = run_form(
        session,
        FormMode::RegisterPatient,
        registration.defaults,
        &registration.context,
    )?
    else {
        return Ok(false);
    };

    let context = SubmissionContext::new()
        .with_user(user_id)
        .with_patient(registered.record.id());
    let Some(_booked) = run_form(
        session,
        FormMode::CreateAppointment,
        defaults(FormMode::CreateAppointment, Utc::now()),
        &context,
    )?
    else {
        return Ok(false);
    };

    output::success("Onboarding complete.");
    Ok(true)
}

fn run_form(
    session: &mut Session,
    mode: FormMode,
    defaults: ValueMap,
    context: &SubmissionContext,
) -> Result<Option<Submitted>, FormError> {
    let mut controller = open(mode, &session.config, defaults)?;
    let policy = SubmissionPolicy::new(mode, context, &session.config)?;
    let mut navigations: Vec<Navigation> = Vec::new();
    let outcome = {
        let mut flow = IntakeSubmission::new(policy, &mut session.backend, &mut navigations);
        FormRunner::new(&mut *session.interaction).run(&mut controller, &mut flow)?
    };

    match outcome {
        RunOutcome::Submitted(submitted) => {
            for navigation in &navigations {
                follow(navigation);
            }
            Ok(Some(submitted))
        }
        RunOutcome::Cancelled => {
            output::warning(format!("{mode} cancelled."));
            Ok(None)
        }
    }
}

fn follow(navigation: &Navigation) {
    if !navigation.delay.is_zero() {
        thread::sleep(navigation.delay);
    }
    output::success(format!("Navigating to {}", navigation.path));
}
