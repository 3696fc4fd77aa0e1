//! Minimal absolute-URL resolution for `Node::abs_url`/`Document` base URI
//! handling. Not a general-purpose URI library: just enough of RFC 3986
//! §5.3 ("Component Recomposition") to resolve the relative `href`/`src`
//! values real HTML documents contain against a base URL, the way a
//! browser's `<a href>` resolution behaves.

/// Resolves `relative` against `base`. Returns `None` when neither `base`
/// nor `relative` carries enough information to produce an absolute URL
/// (e.g. `base` is empty and `relative` has no scheme).
pub fn resolve(base: &str, relative: &str) -> Option<String> {
    let relative = relative.trim();
    if relative.is_empty() {
        return if has_scheme(base) { Some(base.to_string()) } else { None };
    }
    if has_scheme(relative) {
        return Some(relative.to_string());
    }

    let base = parse_base(base)?;

    if let Some(rest) = relative.strip_prefix("//") {
        return Some(format!("{}://{}", base.scheme, rest));
    }

    if let Some(rest) = relative.strip_prefix('/') {
        return Some(format!("{}://{}/{}", base.scheme, base.authority, rest));
    }

    if relative.starts_with('#') || relative.starts_with('?') {
        return Some(format!(
            "{}://{}{}{}",
            base.scheme, base.authority, base.path, relative
        ));
    }

    let merged_path = merge_paths(&base.path, relative);
    Some(format!("{}://{}{}", base.scheme, base.authority, merged_path))
}

fn has_scheme(s: &str) -> bool {
    match s.find(':') {
        Some(colon) if colon > 0 => {
            let scheme = &s[..colon];
            scheme.chars().next().unwrap().is_ascii_alphabetic()
                && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

struct Base<'a> {
    scheme: &'a str,
    authority: &'a str,
    /// Always starts with `/`; the directory-relative merge target (i.e.
    /// everything up to and including the last `/`, dropping query/fragment).
    path: String,
}

fn parse_base(base: &str) -> Option<Base<'_>> {
    let scheme_end = base.find("://")?;
    let scheme = &base[..scheme_end];
    let rest = &base[scheme_end + 3..];
    let path_start = rest.find('/').unwrap_or(rest.len());
    let authority = &rest[..path_start];
    let mut path = &rest[path_start..];
    if path.is_empty() {
        path = "/";
    }
    // Strip query/fragment, then truncate to the last path segment boundary.
    let path = path.split(['?', '#']).next().unwrap_or("/");
    let dir = match path.rfind('/') {
        Some(i) => &path[..=i],
        None => "/",
    };
    Some(Base {
        scheme,
        authority,
        path: dir.to_string(),
    })
}

/// Appends `relative` to `base_dir` (already directory-terminated) and
/// collapses `.`/`..` segments per RFC 3986 §5.2.4.
fn merge_paths(base_dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for part in relative.split('/') {
        match part {
            "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_root_relative_path() {
        assert_eq!(
            resolve("http://example.com/", "/foo").as_deref(),
            Some("http://example.com/foo")
        );
    }

    #[test]
    fn resolves_sibling_relative_path() {
        assert_eq!(
            resolve("http://example.com/a/b.html", "c.html").as_deref(),
            Some("http://example.com/a/c.html")
        );
    }

    #[test]
    fn absolute_relative_value_passes_through() {
        assert_eq!(
            resolve("http://example.com/", "https://other.org/x").as_deref(),
            Some("https://other.org/x")
        );
    }

    #[test]
    fn dot_dot_segments_are_collapsed() {
        assert_eq!(
            resolve("http://example.com/a/b/c.html", "../d.html").as_deref(),
            Some("http://example.com/a/d.html")
        );
    }

    #[test]
    fn protocol_relative_keeps_base_scheme() {
        assert_eq!(
            resolve("https://example.com/", "//cdn.example.com/x.js").as_deref(),
            Some("https://cdn.example.com/x.js")
        );
    }

    #[test]
    fn empty_base_with_relative_value_is_unresolvable() {
        assert_eq!(resolve("", "/foo"), None);
    }
}
