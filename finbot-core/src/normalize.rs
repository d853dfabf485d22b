/// Normalize a classification label (payment method, category, payer):
/// lower-case it and drop every ASCII space. Other whitespace and
/// punctuation are kept.
pub fn normalize_label(text: &str) -> String {
    text.to_lowercase().replace(' ', "")
}
