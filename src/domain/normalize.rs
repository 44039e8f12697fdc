//! Folding of free-form editorial labels into the closed vocabularies.
//!
//! Labels arrive from legacy rows, admin forms and API clients in every
//! spelling imaginable ("Super Manchete", "destaque_secundário", "DESTAQUE").
//! Both normalizers fold the input the same way slugs are derived (ASCII
//! transliteration via the `slug` crate, lower-case, runs of whitespace or
//! punctuation collapsed into single hyphens) and then resolve it against a
//! fixed table. They are total: unknown input resolves to `general`.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use slug::slugify;

use super::types::{Category, Position};

/// Public editorial sections, in folded form.
pub const PUBLIC_SECTIONS: &[&str] = &[
    "politica",
    "economia",
    "esportes",
    "cultura",
    "saude",
    "educacao",
    "seguranca",
    "policia",
    "tecnologia",
    "meio-ambiente",
    "turismo",
    "opiniao",
    "brasil",
    "mundo",
    "entretenimento",
];

/// Municipalities in the coverage area, in folded form.
pub const MUNICIPALITIES: &[&str] = &[
    "natal",
    "mossoro",
    "parnamirim",
    "sao-goncalo-do-amarante",
    "macaiba",
    "ceara-mirim",
    "caico",
    "assu",
    "currais-novos",
    "santa-cruz",
    "pau-dos-ferros",
    "joao-camara",
];

static CATEGORY_TABLE: Lazy<HashMap<&'static str, Category>> = Lazy::new(|| {
    let sections = PUBLIC_SECTIONS
        .iter()
        .map(|slug| (*slug, Category::section(slug)));
    let municipalities = MUNICIPALITIES
        .iter()
        .map(|slug| (*slug, Category::municipality(slug)));
    sections.chain(municipalities).collect()
});

/// Apply the shared label fold.
pub fn fold_label(raw: &str) -> String {
    slugify(raw)
}

/// Resolve any label to a canonical position. Never fails.
pub fn normalize_position(raw: &str) -> Position {
    if let Some(position) = Position::from_canonical(raw) {
        return position;
    }

    match fold_label(raw).as_str() {
        "top-headline" | "topheadline" | "supermanchete" | "super-manchete"
        | "manchete-principal" | "manchete-super" => Position::TopHeadline,
        "featured" | "destaque" | "destaques" | "destaque-principal" | "destaque-secundario"
        | "em-destaque" | "manchete-secundaria" => Position::Featured,
        "municipalities" | "municipios" | "municipio" | "cidades" | "interior" => {
            Position::Municipalities
        }
        _ => Position::General,
    }
}

/// [`normalize_position`] for optional input; `None` is `general`.
pub fn normalize_position_opt(raw: Option<&str>) -> Position {
    raw.map(normalize_position).unwrap_or_default()
}

/// Resolve any label to a public category. Internal desk labels and anything
/// outside the public section or municipality sets collapse to `general`.
pub fn normalize_category(raw: &str) -> Category {
    let folded = fold_label(raw);
    CATEGORY_TABLE
        .get(folded.as_str())
        .copied()
        .unwrap_or(Category::GENERAL)
}

/// [`normalize_category`] for optional input; `None` is `general`.
pub fn normalize_category_opt(raw: Option<&str>) -> Category {
    raw.map(normalize_category).unwrap_or_default()
}
