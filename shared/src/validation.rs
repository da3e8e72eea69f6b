//! Upload acceptance rules shared by the store and its clients

/// Archive formats accepted for submissions
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[".zip", ".tar.gz"];

/// 10 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Find the allow-listed extension `file_name` ends with (case-insensitive).
///
/// Multi-part extensions such as `.tar.gz` are matched as a whole; when
/// several entries match, the longest wins. A name consisting only of the
/// extension does not match.
pub fn matched_extension<'a, S: AsRef<str>>(file_name: &str, allowed: &'a [S]) -> Option<&'a str> {
    let lowered = file_name.to_lowercase();
    allowed
        .iter()
        .map(|ext| ext.as_ref())
        .filter(|ext| {
            let ext = ext.to_lowercase();
            lowered.len() > ext.len() && lowered.ends_with(&ext)
        })
        .max_by_key(|ext| ext.len())
}

/// Strip any directory components a client may have sent with the file name
pub fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim()
}

/// Human-readable list for error messages: ".zip or .tar.gz"
pub fn describe_extensions<S: AsRef<str>>(allowed: &[S]) -> String {
    allowed.iter().map(|ext| ext.as_ref()).collect::<Vec<&str>>().join(" or ")
}
