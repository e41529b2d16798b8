#![forbid(unsafe_code)]

use std::path::{Component, Path};

/// Joins the components of a relative path with `/`, regardless of host separator.
pub fn to_virtual(rel: &Path) -> String {
    let mut out = String::new();
    for comp in rel.components() {
        if let Component::Normal(c) = comp {
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(&c.to_string_lossy());
        }
    }
    out.replace('\\', "/")
}

/// Virtual path of `file_path` relative to `root`, or `None` when it is not under `root`
/// or names `root` itself.
pub fn relative_to(root: &Path, file_path: &Path) -> Option<String> {
    let rel = file_path.strip_prefix(root).ok()?;
    let out = to_virtual(rel);
    if out.is_empty() {
        return None;
    }
    Some(out)
}

/// Normalizes a virtual path: backslashes become `/`, leading `./` is stripped,
/// empty and `.` segments are dropped. A leading `/` is preserved.
pub fn canonicalize(path: &str) -> String {
    let p = path.replace('\\', "/");
    let absolute = p.starts_with('/');
    let joined = p
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

pub fn prefixed(prefix: &str, rel: &str) -> String {
    if prefix.is_empty() {
        return rel.to_string();
    }
    let mut p = prefix.replace('\\', "/");
    if !p.ends_with('/') {
        p.push('/');
    }
    let r = rel.trim_start_matches('/');
    format!("{p}{r}")
}

pub fn should_exclude(norm_path: &str, excludes: &[String]) -> bool {
    excludes.iter().any(|e| !e.is_empty() && norm_path.contains(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn relative_paths_use_forward_slashes() {
        let root = PathBuf::from("/work/assets");
        let file = root.join("textures").join("hero.png");
        assert_eq!(relative_to(&root, &file).as_deref(), Some("textures/hero.png"));
        assert_eq!(relative_to(&root, &root), None);
        assert_eq!(relative_to(&root, Path::new("/elsewhere/a.png")), None);
    }

    #[test]
    fn canonicalize_strips_noise() {
        assert_eq!(canonicalize("textures\\hero.horsetex"), "textures/hero.horsetex");
        assert_eq!(canonicalize("./././a/b"), "a/b");
        assert_eq!(canonicalize("a//./b/"), "a/b");
        assert_eq!(canonicalize("/abs/./path"), "/abs/path");
        assert_eq!(canonicalize("."), "");
    }

    #[test]
    fn prefix_and_excludes() {
        assert_eq!(prefixed("", "a/b"), "a/b");
        assert_eq!(prefixed("assets", "/a/b"), "assets/a/b");
        assert_eq!(prefixed("assets\\", "a"), "assets/a");
        let ex = vec![".git".to_string(), String::new()];
        assert!(should_exclude("x/.git/config", &ex));
        assert!(!should_exclude("x/y", &ex));
    }
}
