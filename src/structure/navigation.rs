use super::Structure;

/// Resolve a nested structure by a path of instance names relative to `root`.
/// An empty path resolves to `root` itself.
pub fn resolve_instance_path<'a>(root: &'a Structure, path: &[String]) -> Option<&'a Structure> {
    let mut cur = root;
    for name in path {
        cur = &cur.substructures.get(name.as_str())?.structure;
    }
    Some(cur)
}

/// Parse "/u1/x" style paths into instance names.
pub fn split_instance_path(path: &str) -> Vec<String> {
    path.trim()
        .trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Collect the paths of all nested instances, depth first in declaration order.
pub fn collect_instance_paths(root: &Structure) -> Vec<Vec<String>> {
    fn rec(cur: &Structure, path: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
        for (name, sub) in &cur.substructures {
            path.push(name.clone());
            out.push(path.clone());
            rec(&sub.structure, path, out);
            path.pop();
        }
    }
    let mut out = Vec::new();
    let mut p = Vec::new();
    rec(root, &mut p, &mut out);
    out
}
