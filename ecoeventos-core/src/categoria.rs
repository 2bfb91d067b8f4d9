//! Event categories.

/// Category used when the input is blank or not in [`CATEGORIAS`].
pub const DEFAULT_CATEGORIA: &str = "Otro";

/// Known categories, in their canonical spelling.
pub const CATEGORIAS: [&str; 7] = [
    "Minga",
    "Sembratón",
    "Charla",
    "Taller",
    "Reciclaje",
    "Reforestación",
    "Otro",
];

/// Map user input onto the canonical spelling of a known category.
/// Matching ignores case and surrounding whitespace; anything else becomes
/// [`DEFAULT_CATEGORIA`].
pub fn normalize_categoria(input: &str) -> &'static str {
    let wanted = input.trim().to_lowercase();

    CATEGORIAS
        .iter()
        .find(|c| c.to_lowercase() == wanted)
        .copied()
        .unwrap_or(DEFAULT_CATEGORIA)
}
