//! Name normalization for flake identifiers.
//!
//! The master flake references every node twice: by a sanitized identifier
//! (`safe_name`, valid in Nix attribute position) and by a capitalized
//! symbol used to build getter bindings (`getMySensor`). Both functions are
//! total over arbitrary Unicode input and never fail.

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
///
/// Output has the same number of characters as the input.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|ch| match ch {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '_' | '-' => ch,
            _ => '_',
        })
        .collect()
}

/// Build a capitalized-concatenation symbol from a sanitized name.
///
/// Splits on `_` and `-`, capitalizes each non-empty piece, and joins with
/// no separator: `my_sensor-2` becomes `MySensor2`.
pub fn symbolize(safe: &str) -> String {
    safe.split(['_', '-'])
        .filter(|piece| !piece.is_empty())
        .map(capitalize)
        .collect()
}

fn capitalize(piece: &str) -> String {
    let mut chars = piece.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => {
            first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
        }
    }
}
