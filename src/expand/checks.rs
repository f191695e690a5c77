// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Checks on the closed model.
//!
//! Run once the macro fixed point is reached, in this order:
//!
//! 1. key conflicts between kinds
//! 2. initializations still pending
//! 3. references to missing concepts
//! 4. error concepts left in the model
//! 5. semantic validation

use crate::{
    concept::Initialization,
    config::ErrorPolicy,
    error::{AuthoringError, CompileError},
    model::ConceptModel
};

struct Collector {
    policy: ErrorPolicy,
    errors: Vec<AuthoringError>
}

impl Collector {
    fn push(&mut self, error: AuthoringError) -> Result<(), CompileError> {
        self.errors.push(error);
        match self.policy {
            ErrorPolicy::FailFast => Err(CompileError::Authoring(std::mem::take(&mut self.errors))),
            ErrorPolicy::CollectAll => Ok(())
        }
    }
}

/// Report every authoring error in the closed model.
///
/// # Errors
///
/// [`CompileError::Authoring`] with one or (under
/// [`ErrorPolicy::CollectAll`]) all errors found.
pub fn check_model(model: &ConceptModel, policy: ErrorPolicy) -> Result<(), CompileError> {
    let mut collector = Collector {
        policy,
        errors: Vec::new()
    };

    for conflict in model.conflicts() {
        collector.push(conflict.clone())?;
    }

    for key in model.pending_keys() {
        let Some(concept) = model.get_raw(&key) else {
            continue;
        };
        let mut copy = concept.clone_concept();
        let reason = match copy.as_initializer().map(|init| init.initialize(model)) {
            Some(Ok(Initialization::Pending(reason))) => reason,
            Some(Ok(Initialization::Done(_))) => "initialization completed too late".to_string(),
            Some(Err(err)) => err.message,
            None => "concept is not initializable".to_string()
        };
        collector.push(AuthoringError::new(
            concept.description(),
            format!("initialization did not complete: {reason}")
        ))?;
    }

    for concept in model.iter() {
        for reference in concept.references() {
            if !model.contains(reference.target.key()) {
                collector.push(AuthoringError::new(
                    concept.description(),
                    format!(
                        "field `{}` references {}, which does not exist",
                        reference.field, reference.target
                    )
                ))?;
            }
        }
    }

    for concept in model.iter() {
        if let Some(error) = concept.as_error() {
            collector.push(AuthoringError::new(concept.description(), error.error_message()))?;
        }
    }

    for concept in model.iter() {
        if let Some(validated) = concept.as_validated()
            && let Err(message) = validated.check_semantics(model)
        {
            collector.push(AuthoringError::new(concept.description(), message))?;
        }
    }

    if collector.errors.is_empty() {
        Ok(())
    } else {
        Err(CompileError::Authoring(collector.errors))
    }
}
