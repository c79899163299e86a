//! Path arithmetic for the virtual filesystem.

/// Resolve `path` against `current_path` into a normalized absolute path.
///
/// `.` segments are dropped and `..` pops one segment, clamping at root.
pub fn resolve_path(path: &str, current_path: &str) -> String {
    let joined: Vec<&str> = if path.starts_with('/') {
        path.split('/').filter(|s| !s.is_empty()).collect()
    } else {
        current_path
            .split('/')
            .chain(path.split('/'))
            .filter(|s| !s.is_empty())
            .collect()
    };

    let mut resolved: Vec<&str> = Vec::with_capacity(joined.len());
    for segment in joined {
        match segment {
            "." => {}
            ".." => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }
    format!("/{}", resolved.join("/"))
}

/// Path segments of an absolute path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Join a directory path and a child name.
pub fn join(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{name}")
    } else {
        format!("{}/{name}", dir.trim_end_matches('/'))
    }
}

/// Parent directory of an absolute path (root is its own parent).
pub fn parent(path: &str) -> String {
    resolve_path("..", path)
}

/// Last segment of a path, or `/` for root.
pub fn file_name(path: &str) -> &str {
    segments(path).last().unwrap_or("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn relative_and_absolute() {
        assert_eq!(resolve_path("ops", "/"), "/ops");
        assert_eq!(resolve_path("medical", "/ops"), "/ops/medical");
        assert_eq!(resolve_path("/comms/psi", "/ops"), "/comms/psi");
        assert_eq!(resolve_path("./psi/", "/comms"), "/comms/psi");
    }

    #[test]
    fn dot_dot_clamps_at_root() {
        assert_eq!(resolve_path("..", "/a/b"), "/a");
        assert_eq!(resolve_path("../..", "/a/b"), "/");
        assert_eq!(resolve_path("../../../..", "/a/b"), "/");
        assert_eq!(resolve_path("..", "/"), "/");
    }

    #[test]
    fn helpers() {
        assert_eq!(join("/", "ops"), "/ops");
        assert_eq!(join("/ops", "prato"), "/ops/prato");
        assert_eq!(parent("/ops/prato"), "/ops");
        assert_eq!(parent("/"), "/");
        assert_eq!(file_name("/ops/prato/report.txt"), "report.txt");
        assert_eq!(file_name("/"), "/");
    }

    proptest! {
        #[test]
        fn normalized_paths_are_fixed_points(parts in proptest::collection::vec("[a-z_]{1,8}", 0..5)) {
            let path = format!("/{}", parts.join("/"));
            prop_assert_eq!(resolve_path(&path, "/anywhere"), path.clone());
            prop_assert_eq!(resolve_path(&resolve_path(&path, "/"), "/"), path);
        }
    }
}
