// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use concept_forge::{Concept, ConceptKind, ConceptRef};

#[derive(Debug, Clone, Concept)]
pub struct ModuleInfo {
    #[concept(key)]
    pub name: String,
}

#[derive(Debug, Clone, Concept)]
#[concept(keyword = "Entity", family = "DataStructure")]
pub struct TableInfo {
    #[concept(key)]
    pub module: ConceptRef,

    #[concept(key)]
    pub name: String,

    pub comment: Option<String>,
}

fn main() {
    let module = ModuleInfo {
        name: "Sales".to_string(),
    };
    let table = TableInfo {
        module: ConceptRef::new(module.key()),
        name: "Order Line".to_string(),
        comment: None,
    };

    assert_eq!(ModuleInfo::KEYWORD, "Module");
    assert_eq!(TableInfo::FAMILY, "DataStructure");
    assert_eq!(TableInfo::KEY_FIELDS, &["Module", "Name"]);
    assert_eq!(table.key().as_str(), "DataStructure Sales.'Order Line'");
    assert_eq!(table.description(), "Entity Sales.'Order Line'");
    assert_eq!(table.references().len(), 1);
}
