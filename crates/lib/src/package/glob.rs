//! File-name wildcard matching.
//!
//! Supports `*` (any run of characters, possibly empty) and `?` (exactly one
//! character). Patterns match against a bare file name, never a path.

/// Returns true if `name` matches `pattern`.
pub fn matches(pattern: &str, name: &str) -> bool {
  let pattern: Vec<char> = pattern.chars().collect();
  let name: Vec<char> = name.chars().collect();

  let (mut p, mut n) = (0, 0);
  // Position of the last `*` seen and the name index it was tried against
  let mut backtrack: Option<(usize, usize)> = None;

  while n < name.len() {
    match pattern.get(p) {
      Some('*') => {
        backtrack = Some((p, n));
        p += 1;
      }
      Some('?') => {
        p += 1;
        n += 1;
      }
      Some(c) if *c == name[n] => {
        p += 1;
        n += 1;
      }
      _ => match backtrack {
        Some((star, tried)) => {
          p = star + 1;
          n = tried + 1;
          backtrack = Some((star, tried + 1));
        }
        None => return false,
      },
    }
  }

  pattern[p..].iter().all(|c| *c == '*')
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn literal() {
    assert!(matches("unlicense.txt", "unlicense.txt"));
    assert!(!matches("unlicense.txt", "unlicense.txt.bak"));
    assert!(!matches("unlicense.txt", "LICENSE"));
  }

  #[test]
  fn star_suffix() {
    assert!(matches("*.h", "aes.h"));
    assert!(matches("*.h", ".h"));
    assert!(!matches("*.h", "aes.hpp"));
    assert!(!matches("*.h", "aes.c"));
  }

  #[test]
  fn star_needs_backtracking() {
    assert!(matches("*.a", "libtiny-aes.a"));
    assert!(matches("lib*.a", "lib.a.a"));
    assert!(matches("*a*b", "xaxxab"));
    assert!(!matches("*a*b", "xaxxa"));
  }

  #[test]
  fn question_mark() {
    assert!(matches("aes.?pp", "aes.hpp"));
    assert!(!matches("aes.?", "aes.hpp"));
  }

  #[test]
  fn empty_inputs() {
    assert!(matches("*", ""));
    assert!(matches("", ""));
    assert!(!matches("", "a"));
    assert!(!matches("?", ""));
  }
}
