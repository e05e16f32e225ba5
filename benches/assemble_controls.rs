//! This bench parses and assembles a large batch of controls, then groups them
//! into a catalog.

#![allow(missing_docs)]

use std::hint::black_box;

use compliance_io::{CatalogBuilder, Config, ControlRow, build, parse, to_statement_id};
use criterion::{Criterion, criterion_group, criterion_main};

const FAMILIES: [(&str, &str); 4] = [
    ("AC", "Access Control"),
    ("AU", "Audit and Accountability"),
    ("CM", "Configuration Management"),
    ("SI", "System and Information Integrity"),
];

const PROSE: &str = "\
The organization:
(a) Develops, documents, and disseminates:
  1. A policy that addresses purpose and scope;
  2. Procedures to facilitate implementation:
    a. of the policy; and
    b. of the associated controls;
(b) Designates an official to manage the policy; and
(c) Reviews and updates the policy:
  1. Annually; and
  2. Following significant changes.";

/// Generates rows for every family, with enhancements on every control.
fn rows(controls_per_family: usize) -> Vec<ControlRow> {
    FAMILIES
        .iter()
        .flat_map(|(prefix, family)| {
            (1..=controls_per_family).flat_map(move |n| {
                ["", "(1)"].map(|suffix| ControlRow {
                    family: Some((*family).to_string()),
                    control_id: Some(format!("{prefix}-{n:02}{suffix}")),
                    name: Some(format!("{family} {n}")),
                    control_text: Some(PROSE.to_string()),
                    implementation: Some("Implemented by the platform team.".to_string()),
                    related: Some(format!("{prefix}-1, {prefix}-2, redacted")),
                    baseline: Some("Moderate".to_string()),
                    ..ControlRow::default()
                })
            })
        })
        .collect()
}

fn parse_prose(c: &mut Criterion) {
    let id = to_statement_id("AC-2(1)");
    c.bench_function("parse and build statement", |b| {
        b.iter(|| build(parse(black_box(PROSE), id.as_str())));
    });
}

fn assemble_catalog(c: &mut Criterion) {
    let rows = rows(250);
    let builder = CatalogBuilder::new("Bench", Config::default());
    c.bench_function("assemble 2000 controls", |b| {
        b.iter(|| builder.build(black_box(&rows)));
    });
}

criterion_group!(benches, parse_prose, assemble_catalog);
criterion_main!(benches);
