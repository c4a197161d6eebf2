//! Symptom form → multi-hot vector over the disease model's feature list.

use super::FeatureVector;

/// Frontend form keys that differ from the training column names.
const SYMPTOM_ALIASES: &[(&str, &str)] = &[
    ("shortnessofbreath", "shortness_of_breath"),
    ("painchest", "pain_chest"),
    ("fatigue", "asthenia"),
    ("chills", "chill"),
    ("soretotouch", "sore_to_touch"),
];

/// Training column name for a submitted symptom key. Keys without an alias
/// pass through unchanged.
pub fn canonical_symptom(key: &str) -> &str {
    SYMPTOM_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(key)
}

/// Set a 1.0 for each submitted symptom present in `top_features`.
///
/// Unrecognized symptoms are logged and ignored; the vector always has
/// exactly `top_features.len()` entries.
pub fn symptom_vector<S: AsRef<str>>(submitted: &[S], top_features: &[String]) -> FeatureVector {
    let mut values = vec![0.0f32; top_features.len()];

    for key in submitted {
        let key = key.as_ref();
        let canonical = canonical_symptom(key);
        match top_features.iter().position(|f| f == canonical) {
            Some(i) => values[i] = 1.0,
            None => tracing::warn!(symptom = key, "Symptom not in model features, ignoring"),
        }
    }

    FeatureVector {
        columns: top_features.to_vec(),
        values,
    }
}
