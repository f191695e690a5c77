// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Sales model shared by the integration tests.

#![allow(dead_code)]

use concept_forge::{
    Concept,
    dom::{
        AutoCodeInfo, CascadeDeleteInfo, EntityInfo, IsSubtypeOfInfo, LoggingInfo, ModuleInfo,
        PolymorphicInfo, PropertyInfo, PropertyType, SqlViewInfo
    }
};

pub fn demo() -> ModuleInfo {
    ModuleInfo::new("Demo")
}

pub fn invoice() -> EntityInfo {
    EntityInfo::new(&demo().reference(), "Invoice")
}

pub fn customer() -> EntityInfo {
    EntityInfo::new(&demo().reference(), "Customer")
}

pub fn sales_model() -> Vec<Box<dyn Concept>> {
    let module = demo().reference();
    let invoice = invoice().reference();
    let customer = customer().reference();
    let document = PolymorphicInfo::new(&module, "Document");

    vec![
        Box::new(demo()),
        Box::new(self::invoice()),
        Box::new(self::customer()),
        Box::new(PropertyInfo::new(&invoice, "Code", PropertyType::ShortString)),
        Box::new(PropertyInfo::reference_to(&invoice, "Customer", &customer)),
        Box::new(AutoCodeInfo {
            property: PropertyInfo::key_for(&invoice, "Code")
        }),
        Box::new(CascadeDeleteInfo {
            property: PropertyInfo::key_for(&invoice, "Customer")
        }),
        Box::new(LoggingInfo::new(&invoice)),
        Box::new(SqlViewInfo::new(
            &module,
            "InvoiceList",
            "SELECT i.\"ID\", i.\"Code\" FROM Demo.Invoice i"
        )),
        Box::new(IsSubtypeOfInfo::new(&invoice, &document.reference())),
        Box::new(document),
    ]
}
