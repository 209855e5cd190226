//! Candidate filename generation for quantized repositories.
//!
//! Repositories publishing quantized weights name their files in a handful of
//! ways. The table below lists them from most to least specific; the resolver
//! tries them in this order and stops at the first hit.

/// Suffix that collection repositories append to the model name.
const COLLECTION_SUFFIX: &str = "-GGUF";

/// One piece of a filename template.
#[derive(Clone, Copy)]
enum Part {
    Base,
    Variant,
    Ext,
    Lit(&'static str),
}

use Part::{Base, Ext, Lit, Variant};

/// Filename templates, assembled piece by piece so substituted text is never
/// re-expanded.
const CANDIDATE_PATTERNS: &[&[Part]] = &[
    &[Base, Lit("-"), Variant, Ext],
    &[Base, Lit("_"), Variant, Ext],
    &[Base, Lit("."), Variant, Ext],
    &[Variant, Ext],
    &[Variant],
];

/// Model name derived from the last segment of a repository id, with a
/// trailing `-GGUF` removed once.
pub fn base_name(repo_id: &str) -> &str {
    let last = repo_id.rsplit('/').next().unwrap_or(repo_id);
    last.strip_suffix(COLLECTION_SUFFIX).unwrap_or(last)
}

/// Ordered, duplicate-free, non-empty filenames to try for `variant` in
/// `repo_id`.
pub fn candidate_filenames(repo_id: &str, variant: &str, extension: &str) -> Vec<String> {
    let base = base_name(repo_id);
    let mut candidates: Vec<String> = Vec::with_capacity(CANDIDATE_PATTERNS.len());

    for pattern in CANDIDATE_PATTERNS {
        let name: String = pattern
            .iter()
            .map(|part| match part {
                Base => base,
                Variant => variant,
                Ext => extension,
                Lit(text) => text,
            })
            .collect();
        if !name.is_empty() && !candidates.contains(&name) {
            candidates.push(name);
        }
    }

    candidates
}
