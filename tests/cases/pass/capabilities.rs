// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use concept_forge::{
    Concept, ConceptRef, ErrorConcept, ValidatedConcept, model::ConceptModel,
};

#[derive(Debug, Clone, Concept)]
#[concept(validate)]
pub struct RuleInfo {
    #[concept(key)]
    pub name: String,

    pub targets: Vec<ConceptRef>,
}

impl ValidatedConcept for RuleInfo {
    fn check_semantics(&self, _model: &ConceptModel) -> Result<(), String> {
        if self.targets.is_empty() {
            return Err("a rule needs targets".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Concept)]
#[concept(keyword = "Problem", error)]
pub struct ProblemInfo {
    #[concept(key)]
    pub origin: ConceptRef,

    pub message: String,
}

impl ErrorConcept for ProblemInfo {
    fn error_message(&self) -> String {
        self.message.clone()
    }
}

fn main() {
    let rule = RuleInfo {
        name: "r1".to_string(),
        targets: Vec::new(),
    };
    let concept: &dyn Concept = &rule;
    assert!(concept.as_validated().is_some());
    assert!(concept.as_macro().is_none());
    assert!(concept.as_validated().unwrap().check_semantics(&ConceptModel::new()).is_err());

    let problem = ProblemInfo {
        origin: ConceptRef::new(rule.key()),
        message: "broken".to_string(),
    };
    let concept: &dyn Concept = &problem;
    assert_eq!(concept.as_error().unwrap().error_message(), "broken");
    assert_eq!(concept.key().as_str(), "Problem r1");
}
