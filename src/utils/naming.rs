use rand::Rng;

/// Length of the random part of a generated filename, in bytes before
/// hex encoding. 8 bytes gives 16 hex characters.
pub const TOKEN_BYTES: usize = 8;

/// Extracts the extension of `name`, including the leading dot, verbatim
/// and case-preserved. A name without a dot, or whose only dot starts the
/// final component (a hidden file), yields the empty string.
pub fn extension_of(name: &str) -> &str {
    let basename = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    match basename.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &basename[idx..],
    }
}

/// Generates a storage filename: 16 hex characters from a CSPRNG plus the
/// given extension. Every call produces a fresh value; callers accept the
/// negligible collision probability.
pub fn random_name(extension: &str) -> String {
    let token: [u8; TOKEN_BYTES] = rand::thread_rng().r#gen();
    format!("{}{}", hex::encode(token), extension)
}

/// Returns true when `filename` matches the generated naming pattern.
pub fn is_generated_name(filename: &str) -> bool {
    let token = match filename.find('.') {
        Some(idx) => &filename[..idx],
        None => filename,
    };
    token.len() == TOKEN_BYTES * 2 && token.chars().all(|c| c.is_ascii_hexdigit())
}
