// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Macro expansion to a fixed point.
//!
//! # Pass structure
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ initialization sweep (repeat until no progress)          │
//! │   pending concept → initialize → Done: expose + merge    │
//! ├──────────────────────────────────────────────────────────┤
//! │ macro pass                                               │
//! │   every visible macro concept → create_new_concepts      │
//! │   (all read the same model snapshot)                     │
//! ├──────────────────────────────────────────────────────────┤
//! │ merge produced concepts (duplicate keys ignored)         │
//! └──────────────────────────────────────────────────────────┘
//!   repeat while anything was created or initialized
//! ```
//!
//! Every macro in a pass sees the model as it was when the pass started, so
//! the order macros run in within a pass cannot change the result.

mod checks;
mod context;

use std::fmt;

use tracing::{debug, info};

pub use self::{checks::check_model, context::MacroContext};
use crate::{
    concept::{Concept, ConceptKey, Initialization},
    config::CompilerOptions,
    error::CompileError,
    model::ConceptModel,
    sql::SqlObjectCache
};

/// Hook reordering the macro concepts of one pass.
pub type PassOrderFn = dyn Fn(&mut [ConceptKey], usize) + Send + Sync;

/// Order in which macro concepts run within a pass.
#[derive(Default)]
pub enum PassOrder {
    /// Model insertion order.
    #[default]
    Insertion,

    /// Custom permutation of the insertion order; receives the pass number.
    Custom(Box<PassOrderFn>)
}

impl fmt::Debug for PassOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insertion => f.write_str("Insertion"),
            Self::Custom(_) => f.write_str("Custom")
        }
    }
}

/// Statistics of a finished expansion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionReport {
    /// Passes that produced something.
    pub passes: usize,

    /// Concepts merged by macros and initializers.
    pub created: usize,

    /// Concepts whose initialization completed.
    pub initialized: usize
}

/// Drives macro expansion and the closed-model checks.
#[derive(Debug, Default)]
pub struct MacroExpander {
    options: CompilerOptions,
    order:   PassOrder
}

impl MacroExpander {
    #[must_use]
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            order: PassOrder::Insertion
        }
    }

    #[must_use]
    pub fn with_order(mut self, order: PassOrder) -> Self {
        self.order = order;
        self
    }

    /// Expand `model` until no pass adds anything.
    ///
    /// # Errors
    ///
    /// - [`CompileError::Macro`] when a macro or initializer fails
    /// - [`CompileError::NonConvergence`] when the pass budget runs out
    pub fn expand(
        &self,
        model: &mut ConceptModel,
        cache: &mut SqlObjectCache
    ) -> Result<ExpansionReport, CompileError> {
        let mut report = ExpansionReport::default();

        loop {
            let (initialized, from_init) = self.initialize(model)?;
            report.initialized += initialized;
            report.created += from_init;

            let mut keys: Vec<ConceptKey> = model
                .iter()
                .filter(|concept| concept.as_macro().is_some())
                .map(|concept| concept.key())
                .collect();
            if let PassOrder::Custom(reorder) = &self.order {
                reorder(&mut keys, report.passes);
            }

            let (produced, churning) = run_pass(model, cache, &keys)?;

            let mut created = 0;
            for concept in produced {
                if model.insert(concept) {
                    created += 1;
                }
            }
            report.created += created;

            debug!(
                pass = report.passes,
                macros = keys.len(),
                created,
                initialized,
                "macro expansion pass"
            );

            if created == 0 && initialized == 0 && from_init == 0 {
                break;
            }

            if report.passes >= self.options.max_macro_iterations {
                return Err(CompileError::NonConvergence {
                    iterations: report.passes,
                    churning
                });
            }
            report.passes += 1;
        }

        info!(
            passes = report.passes,
            created = report.created,
            concepts = model.len(),
            "macro expansion reached a fixed point"
        );
        Ok(report)
    }

    /// Expand, then run the closed-model checks.
    ///
    /// # Errors
    ///
    /// Everything [`expand`](Self::expand) and [`check_model`] report.
    pub fn expand_and_check(
        &self,
        model: &mut ConceptModel,
        cache: &mut SqlObjectCache
    ) -> Result<ExpansionReport, CompileError> {
        let report = self.expand(model, cache)?;
        check_model(model, self.options.error_policy)?;
        Ok(report)
    }

    /// Initialization sweep; returns (initialized, auxiliary concepts merged).
    fn initialize(&self, model: &mut ConceptModel) -> Result<(usize, usize), CompileError> {
        let mut initialized = 0;
        let mut merged = 0;

        for _ in 0..self.options.max_macro_iterations {
            let pending = model.pending_keys();
            if pending.is_empty() {
                break;
            }

            let mut progress = false;
            let mut auxiliary = Vec::new();
            for key in pending {
                let Some(concept) = model.get_raw(&key) else {
                    continue;
                };
                let mut copy = concept.clone_concept();
                let Some(init) = copy.as_initializer() else {
                    return Err(CompileError::Internal(format!(
                        "{} was stored as pending but is not initializable",
                        concept.description()
                    )));
                };
                if let Initialization::Done(extra) = init.initialize(model)? {
                    model.complete_initialization(copy);
                    auxiliary.extend(extra);
                    initialized += 1;
                    progress = true;
                }
            }

            for concept in auxiliary {
                if model.insert(concept) {
                    merged += 1;
                }
            }

            if !progress {
                break;
            }
        }

        Ok((initialized, merged))
    }
}

/// Run every macro in `keys` against the same model state.
///
/// Returns the produced concepts and the descriptions of the macros that
/// produced keys not yet in the model.
fn run_pass(
    model: &ConceptModel,
    cache: &mut SqlObjectCache,
    keys: &[ConceptKey]
) -> Result<(Vec<Box<dyn Concept>>, Vec<String>), CompileError> {
    let mut ctx = MacroContext::new(model, cache);
    let mut produced = Vec::new();
    let mut churning = Vec::new();

    for key in keys {
        let Some(concept) = model.get(key) else {
            continue;
        };
        let Some(expandable) = concept.as_macro() else {
            continue;
        };
        let created = expandable.create_new_concepts(&mut ctx)?;
        if created
            .iter()
            .any(|new| model.get_raw(&new.key()).is_none())
        {
            churning.push(concept.description());
        }
        produced.extend(created);
    }

    Ok((produced, churning))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        concept::{
            AlternativeInitialization, ConceptRef, ErrorConcept, MacroConcept, ValidatedConcept
        },
        config::ErrorPolicy,
        error::MacroError
    };

    #[derive(Debug, Clone, crate::Concept)]
    struct ItemInfo {
        #[concept(key)]
        name: String
    }

    /// Creates items `prefix0..prefix{count}` one per pass.
    #[derive(Debug, Clone, crate::Concept)]
    #[concept(expand)]
    struct ChainInfo {
        #[concept(key)]
        prefix: String,
        count:  usize
    }

    impl MacroConcept for ChainInfo {
        fn create_new_concepts(
            &self,
            ctx: &mut MacroContext<'_>
        ) -> Result<Vec<Box<dyn Concept>>, MacroError> {
            let model = ctx.model();
            for index in 0..self.count {
                let name = format!("{}{index}", self.prefix);
                let key = ConceptRef::from_values("Item", [name.as_str()]);
                if !model.contains(key.key()) {
                    return Ok(vec![Box::new(ItemInfo { name })]);
                }
            }
            Ok(Vec::new())
        }
    }

    /// Never stops producing.
    #[derive(Debug, Clone, crate::Concept)]
    #[concept(expand)]
    struct RunawayInfo {
        #[concept(key)]
        name: String
    }

    impl MacroConcept for RunawayInfo {
        fn create_new_concepts(
            &self,
            ctx: &mut MacroContext<'_>
        ) -> Result<Vec<Box<dyn Concept>>, MacroError> {
            let next = ctx.model().find_by_type::<ItemInfo>().len();
            Ok(vec![Box::new(ItemInfo {
                name: format!("{}{next}", self.name)
            })])
        }
    }

    #[derive(Debug, Clone, crate::Concept)]
    #[concept(expand)]
    struct FailingInfo {
        #[concept(key)]
        name: String
    }

    impl MacroConcept for FailingInfo {
        fn create_new_concepts(
            &self,
            _ctx: &mut MacroContext<'_>
        ) -> Result<Vec<Box<dyn Concept>>, MacroError> {
            Err(MacroError::new(self.description(), "broken"))
        }
    }

    /// Waits for an item to exist, then records it.
    #[derive(Debug, Clone, crate::Concept)]
    #[concept(initialize)]
    struct WaitInfo {
        #[concept(key)]
        target: String,
        seen:   Option<ConceptRef>
    }

    impl AlternativeInitialization for WaitInfo {
        fn initialize(&mut self, model: &ConceptModel) -> Result<Initialization, MacroError> {
            let target = ConceptRef::from_values("Item", [self.target.as_str()]);
            if !model.contains(target.key()) {
                return Ok(Initialization::Pending(format!("{target} does not exist")));
            }
            self.seen = Some(target);
            Ok(Initialization::done())
        }
    }

    #[derive(Debug, Clone, crate::Concept)]
    #[concept(validate)]
    struct RuleInfo {
        #[concept(key)]
        name: String,
        ok:   bool
    }

    impl ValidatedConcept for RuleInfo {
        fn check_semantics(&self, _model: &ConceptModel) -> Result<(), String> {
            if self.ok { Ok(()) } else { Err("rule is broken".into()) }
        }
    }

    #[derive(Debug, Clone, crate::Concept)]
    #[concept(error)]
    struct ProblemInfo {
        #[concept(key)]
        name: String
    }

    impl ErrorConcept for ProblemInfo {
        fn error_message(&self) -> String {
            format!("problem with {}", self.name)
        }
    }

    #[derive(Debug, Clone, crate::Concept)]
    struct LinkInfo {
        #[concept(key)]
        target: ConceptRef
    }

    fn expand(model: &mut ConceptModel) -> Result<ExpansionReport, CompileError> {
        MacroExpander::new(CompilerOptions::default()).expand(model, &mut SqlObjectCache::new())
    }

    #[test]
    fn reaches_fixed_point() {
        let mut model = ConceptModel::new();
        model.insert(Box::new(ChainInfo {
            prefix: "a".into(),
            count:  3
        }));

        let report = expand(&mut model).unwrap();
        assert_eq!(report.passes, 3);
        assert_eq!(report.created, 3);
        assert_eq!(model.find_by_type::<ItemInfo>().len(), 3);
    }

    #[test]
    fn pass_budget_admits_exactly_that_many_productive_passes() {
        let mut model = ConceptModel::new();
        model.insert(Box::new(ChainInfo {
            prefix: "a".into(),
            count:  3
        }));

        let expander =
            MacroExpander::new(CompilerOptions::default().with_max_macro_iterations(3));
        let report = expander
            .expand(&mut model, &mut SqlObjectCache::new())
            .unwrap();
        assert_eq!(report.passes, 3);
        assert_eq!(model.find_by_type::<ItemInfo>().len(), 3);
    }

    #[test]
    fn runaway_macro_does_not_converge() {
        let mut model = ConceptModel::new();
        model.insert(Box::new(RunawayInfo { name: "x".into() }));

        let expander =
            MacroExpander::new(CompilerOptions::default().with_max_macro_iterations(5));
        let err = expander
            .expand(&mut model, &mut SqlObjectCache::new())
            .unwrap_err();
        match err {
            CompileError::NonConvergence {
                iterations,
                churning
            } => {
                assert_eq!(iterations, 5);
                assert_eq!(churning, vec!["Runaway x".to_string()]);
            }
            other => panic!("unexpected error: {other}")
        }
    }

    #[test]
    fn macro_failure_is_fatal() {
        let mut model = ConceptModel::new();
        model.insert(Box::new(FailingInfo { name: "f".into() }));
        assert!(matches!(expand(&mut model), Err(CompileError::Macro(_))));
    }

    #[test]
    fn initialization_waits_for_macro_output() {
        let mut model = ConceptModel::new();
        model.insert(Box::new(WaitInfo {
            target: "a1".into(),
            seen:   None
        }));
        model.insert(Box::new(ChainInfo {
            prefix: "a".into(),
            count:  2
        }));

        let report = expand(&mut model).unwrap();
        assert_eq!(report.initialized, 1);
        let wait = model.find_by_type::<WaitInfo>();
        assert_eq!(wait.len(), 1);
        assert!(wait[0].seen.is_some());
        check_model(&model, ErrorPolicy::CollectAll).unwrap();
    }

    #[test]
    fn pending_initialization_is_reported() {
        let mut model = ConceptModel::new();
        model.insert(Box::new(WaitInfo {
            target: "missing".into(),
            seen:   None
        }));
        expand(&mut model).unwrap();

        let Err(CompileError::Authoring(errors)) = check_model(&model, ErrorPolicy::CollectAll)
        else {
            panic!("expected authoring errors");
        };
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Item missing does not exist"));
    }

    #[test]
    fn collects_all_authoring_errors() {
        let mut model = ConceptModel::new();
        model.insert(Box::new(RuleInfo {
            name: "r".into(),
            ok:   false
        }));
        model.insert(Box::new(ProblemInfo { name: "p".into() }));
        model.insert(Box::new(LinkInfo {
            target: ConceptRef::from_values("Item", ["ghost"])
        }));
        expand(&mut model).unwrap();

        let Err(CompileError::Authoring(errors)) = check_model(&model, ErrorPolicy::CollectAll)
        else {
            panic!("expected authoring errors");
        };
        let concepts: Vec<_> = errors.iter().map(|e| e.concept.as_str()).collect();
        assert_eq!(concepts, vec!["Link ghost", "Problem p", "Rule r"]);
        assert_eq!(errors[1].message, "problem with p");
    }

    #[test]
    fn fail_fast_stops_at_first_error() {
        let mut model = ConceptModel::new();
        model.insert(Box::new(RuleInfo {
            name: "r".into(),
            ok:   false
        }));
        model.insert(Box::new(ProblemInfo { name: "p".into() }));

        let Err(CompileError::Authoring(errors)) = check_model(&model, ErrorPolicy::FailFast)
        else {
            panic!("expected authoring errors");
        };
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn custom_pass_order_gives_same_model() {
        let build = |order: PassOrder| {
            let mut model = ConceptModel::new();
            for prefix in ["a", "b", "c"] {
                model.insert(Box::new(ChainInfo {
                    prefix: prefix.into(),
                    count:  2
                }));
            }
            MacroExpander::new(CompilerOptions::default())
                .with_order(order)
                .expand(&mut model, &mut SqlObjectCache::new())
                .unwrap();
            let mut keys: Vec<_> = model.keys().cloned().collect();
            keys.sort();
            keys
        };

        let reversed = build(PassOrder::Custom(Box::new(|keys, _| keys.reverse())));
        assert_eq!(build(PassOrder::Insertion), reversed);
    }
}
