use serde_json::Value;

/// Walk a dotted path such as `a.b[0].c` from `root`.
///
/// Each segment is a map lookup, optionally followed by one or more
/// `[index]` suffixes applied to lists. Returns `None` when any step is
/// missing: a key that does not exist, `null` part way through, an index
/// that is not a non-negative integer or is out of range, or an index
/// applied to something other than a list. An empty path yields `root`.
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
  if path.is_empty() {
    return Some(root);
  }

  path.split('.').try_fold(root, |current, segment| {
    match segment.find('[') {
      Some(bracket) if segment.ends_with(']') => {
        let (key, indices) = segment.split_at(bracket);
        let mut value = current.as_object()?.get(key)?;
        for index in indices[1..indices.len() - 1].split("][") {
          let index: usize = index.parse().ok()?;
          value = value.as_array()?.get(index)?;
        }
        Some(value)
      }
      _ => current.as_object()?.get(segment),
    }
  })
}
