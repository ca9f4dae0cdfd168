//! Go module path escaping.

/// Escapes a module path for use in proxy.golang.org URLs.
///
/// The Go module proxy protocol encodes uppercase letters as `!` plus
/// the lowercase letter; other characters outside the unreserved set are
/// percent-encoded per byte.
///
/// # Examples
///
/// ```
/// use pkgver_go::version::escape_module_path;
///
/// assert_eq!(
///     escape_module_path("github.com/Azure/azure-sdk-for-go"),
///     "github.com/!azure/azure-sdk-for-go"
/// );
/// ```
pub fn escape_module_path(path: &str) -> String {
    let mut result = String::with_capacity(path.len() + 10);

    for c in path.chars() {
        if c.is_uppercase() {
            result.push('!');
            result.push(c.to_ascii_lowercase());
        } else if c.is_ascii_alphanumeric()
            || c == '/'
            || c == '-'
            || c == '.'
            || c == '_'
            || c == '~'
        {
            result.push(c);
        } else {
            let mut buf = [0u8; 4];
            let encoded = c.encode_utf8(&mut buf);
            for &byte in encoded.as_bytes() {
                result.push_str(&format!("%{:02X}", byte));
            }
        }
    }

    result
}
