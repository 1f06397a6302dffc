//! Undoing the directory manipulation applied when a component was
//! checked out, and line-ending normalization.

use std::borrow::Cow;

/// Bytes inspected when deciding whether content is binary.
const BINARY_SNIFF_LEN: usize = 8000;

/// Forward slashes, no `.` or empty segments.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Map a working-tree path back to the path it had when the component was
/// authored: strip the wrap directory, then restore the shared directory.
pub fn revert_dir_manipulation(
    path: &str,
    originally_shared_dir: Option<&str>,
    wrap_dir: Option<&str>,
) -> String {
    let mut path = normalize_path(path);
    if let Some(wrap) = wrap_dir.map(normalize_path).filter(|w| !w.is_empty()) {
        if let Some(rest) = path.strip_prefix(&wrap).and_then(|r| r.strip_prefix('/')) {
            path = rest.to_string();
        }
    }
    match originally_shared_dir.map(normalize_path).filter(|s| !s.is_empty()) {
        Some(shared) => normalize_path(&format!("{shared}/{path}")),
        None => path,
    }
}

/// Content with a NUL byte near the start is treated as binary.
pub fn is_binary(contents: &[u8]) -> bool {
    contents.iter().take(BINARY_SNIFF_LEN).any(|b| *b == 0)
}

/// Replace CRLF with LF in text content. Binary content is returned as is.
pub fn to_linux_eol(contents: &[u8]) -> Cow<'_, [u8]> {
    if is_binary(contents) || !contents.windows(2).any(|w| w == b"\r\n") {
        return Cow::Borrowed(contents);
    }
    let mut out = Vec::with_capacity(contents.len());
    let mut iter = contents.iter().peekable();
    while let Some(b) = iter.next() {
        if *b == b'\r' && iter.peek() == Some(&&b'\n') {
            continue;
        }
        out.push(*b);
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_cosmetics() {
        assert_eq!(normalize_path("./src//utils\\a.ts"), "src/utils/a.ts");
        assert_eq!(normalize_path("a.ts"), "a.ts");
        assert_eq!(normalize_path(""), "");
    }

    #[test]
    fn revert_restores_shared_dir() {
        assert_eq!(revert_dir_manipulation("a.ts", Some("src"), None), "src/a.ts");
        assert_eq!(revert_dir_manipulation("utils/a.ts", Some("src/"), None), "src/utils/a.ts");
    }

    #[test]
    fn revert_strips_wrap_dir_first() {
        assert_eq!(
            revert_dir_manipulation("package/a.ts", Some("src"), Some("package")),
            "src/a.ts"
        );
        assert_eq!(revert_dir_manipulation("package/a.ts", None, Some("package")), "a.ts");
        // Paths outside the wrap dir are left alone.
        assert_eq!(revert_dir_manipulation("package.json", None, Some("package")), "package.json");
    }

    #[test]
    fn revert_without_manipulation_only_normalizes() {
        assert_eq!(revert_dir_manipulation(".\\lib\\b.ts", None, None), "lib/b.ts");
    }

    #[test]
    fn crlf_becomes_lf() {
        assert_eq!(to_linux_eol(b"a\r\nb\r\n").as_ref(), b"a\nb\n");
        assert_eq!(to_linux_eol(b"lone\rcr").as_ref(), b"lone\rcr");
        assert!(matches!(to_linux_eol(b"a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn binary_content_is_untouched() {
        let data = b"\x89PNG\0\r\n";
        assert!(is_binary(data));
        assert_eq!(to_linux_eol(data).as_ref(), data);
    }
}
