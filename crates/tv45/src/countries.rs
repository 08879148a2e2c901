//! Country selector for the prayer request form.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::dom::html_escape;

/// Prompt shown before a country is chosen.
pub const SELECT_PROMPT: &str = "Selecciona tu país";

/// One entry of the country list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Display name, also the submitted value.
    pub name: String,
    /// Flag emoji.
    pub flag: String,
}

/// Fold a name to a comparison key: lowercase with Latin diacritics removed.
fn collation_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Compare two names the way a reader expects them alphabetized.
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Sort countries alphabetically by name.
pub fn sort_countries(countries: &mut [Country]) {
    countries.sort_by(|a, b| compare_names(&a.name, &b.name));
}

/// Render the selector's options: the disabled prompt, then one option per
/// country in the given order.
#[must_use]
pub fn render_options(countries: &[Country]) -> String {
    let mut html = format!(r#"<option value="" disabled selected>{SELECT_PROMPT}</option>"#);
    for country in countries {
        let name = html_escape(&country.name);
        html.push_str(&format!(
            r#"<option value="{name}">{name} {}</option>"#,
            html_escape(&country.flag)
        ));
    }
    html
}
