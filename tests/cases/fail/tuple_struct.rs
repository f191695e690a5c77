// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![allow(dead_code)]

use concept_forge::Concept;

#[derive(Concept)]
pub struct Pair(String, String);

fn main() {}
