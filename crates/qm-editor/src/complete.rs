//! Path completion for file prompts.
//!
//! The typed text is split at its last `/` into a directory part and a
//! file-name prefix. Entries of that directory starting with the prefix are
//! the candidates (sorted, directories marked with a trailing `/`, dotfiles
//! only when the prefix itself starts with `.`). The input is extended to
//! the longest prefix shared by all candidates.
//!
//! A leading `~/` reads from the home directory but stays `~/` in the
//! input.
//!
//! `M-x` completes command names the same way.

use std::fs;
use std::path::{Path, PathBuf};

use crate::keymap::Command;

/// Outcome of completing one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The input after extension (unchanged if nothing could be added).
    pub input: String,
    /// Matching entry names, directories ending in `/`.
    pub candidates: Vec<String>,
}

impl Completion {
    /// Exactly one entry matched and the input now names it.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.candidates.len() == 1
    }
}

/// Complete `input` against the filesystem.
#[must_use]
pub fn complete_path(input: &str) -> Completion {
    let (dir_part, prefix) = split_input(input);
    let dir = if dir_part.is_empty() {
        PathBuf::from(".")
    } else {
        expand_tilde(dir_part)
    };

    let candidates = list_matches(&dir, prefix);
    tracing::debug!(input, matches = candidates.len(), "path completion");

    let common = longest_common_prefix(&candidates);
    let input = if common.len() > prefix.len() {
        format!("{dir_part}{common}")
    } else {
        input.to_string()
    };

    Completion { input, candidates }
}

/// Expand a leading `~` or `~/` to the home directory.
#[must_use]
pub fn expand_tilde(input: &str) -> PathBuf {
    let rest = match input {
        "~" => Some(""),
        _ => input.strip_prefix("~/"),
    };
    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(input),
    }
}

/// `"src/ma"` → `("src/", "ma")`; `"ma"` → `("", "ma")`.
fn split_input(input: &str) -> (&str, &str) {
    input
        .rfind('/')
        .map_or(("", input), |i| input.split_at(i + 1))
}

fn list_matches(dir: &Path, prefix: &str) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let show_hidden = prefix.starts_with('.');
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            if !name.starts_with(prefix) || (name.starts_with('.') && !show_hidden) {
                return None;
            }
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir())
                || entry.path().is_dir();
            Some(if is_dir { format!("{name}/") } else { name })
        })
        .collect();
    names.sort();
    names
}

/// Complete an `M-x` command name.
#[must_use]
pub fn complete_command(input: &str) -> Completion {
    let prefix = input.trim_start();
    let candidates: Vec<String> = Command::names_with_prefix(prefix)
        .into_iter()
        .map(str::to_string)
        .collect();
    let common = longest_common_prefix(&candidates);
    let input = if common.len() > prefix.len() {
        common.to_string()
    } else {
        input.to_string()
    };
    Completion { input, candidates }
}

/// Longest string every candidate starts with, on char boundaries.
#[must_use]
pub fn longest_common_prefix<S: AsRef<str>>(candidates: &[S]) -> &str {
    let Some(first) = candidates.first().map(AsRef::as_ref) else {
        return "";
    };
    let mut end = first.len();
    for other in &candidates[1..] {
        end = first
            .char_indices()
            .zip(other.as_ref().chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((i, a), _)| i + a.len_utf8())
            .min(end);
    }
    &first[..end]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.rs"), "").unwrap();
        fs::write(dir.path().join("mod.rs"), "").unwrap();
        fs::write(dir.path().join("readme.md"), "").unwrap();
        fs::write(dir.path().join(".hidden"), "").unwrap();
        fs::create_dir(dir.path().join("module")).unwrap();
        dir
    }

    fn root(dir: &tempfile::TempDir) -> String {
        format!("{}/", dir.path().display())
    }

    #[test]
    fn split_at_last_slash() {
        assert_eq!(split_input("src/ma"), ("src/", "ma"));
        assert_eq!(split_input("ma"), ("", "ma"));
        assert_eq!(split_input("a/b/"), ("a/b/", ""));
        assert_eq!(split_input("/"), ("/", ""));
    }

    #[test]
    fn common_prefix() {
        let v = |xs: &[&str]| xs.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(longest_common_prefix(&v(&[])), "");
        assert_eq!(longest_common_prefix(&v(&["main.rs"])), "main.rs");
        assert_eq!(longest_common_prefix(&v(&["mod.rs", "module/"])), "mod");
        assert_eq!(longest_common_prefix(&v(&["abc", "xyz"])), "");
        assert_eq!(longest_common_prefix(&v(&["café", "cafè"])), "caf");
    }

    #[test]
    fn unique_match_completes_fully() {
        let dir = fixture();
        let base = root(&dir);
        let c = complete_path(&format!("{base}ma"));
        assert_eq!(c.input, format!("{base}main.rs"));
        assert_eq!(c.candidates, vec!["main.rs"]);
        assert!(c.is_unique());
    }

    #[test]
    fn directories_get_a_slash() {
        let dir = fixture();
        let base = root(&dir);
        let c = complete_path(&format!("{base}modu"));
        assert_eq!(c.input, format!("{base}module/"));
    }

    #[test]
    fn ambiguous_extends_to_common_prefix() {
        let dir = fixture();
        let base = root(&dir);
        let c = complete_path(&format!("{base}m"));
        assert_eq!(c.candidates, vec!["main.rs", "mod.rs", "module/"]);
        assert_eq!(c.input, format!("{base}m"));

        let c = complete_path(&format!("{base}mo"));
        assert_eq!(c.candidates, vec!["mod.rs", "module/"]);
        assert_eq!(c.input, format!("{base}mod"));
    }

    #[test]
    fn empty_prefix_lists_visible_entries() {
        let dir = fixture();
        let c = complete_path(&root(&dir));
        assert_eq!(c.candidates, vec!["main.rs", "mod.rs", "module/", "readme.md"]);
    }

    #[test]
    fn dot_prefix_shows_hidden() {
        let dir = fixture();
        let base = root(&dir);
        let c = complete_path(&format!("{base}.h"));
        assert_eq!(c.candidates, vec![".hidden"]);
        assert_eq!(c.input, format!("{base}.hidden"));
    }

    #[test]
    fn no_match_leaves_input() {
        let dir = fixture();
        let input = format!("{}zzz", root(&dir));
        let c = complete_path(&input);
        assert!(c.candidates.is_empty());
        assert_eq!(c.input, input);
    }

    #[test]
    fn missing_directory_yields_nothing() {
        let c = complete_path("/definitely/not/a/dir/x");
        assert!(c.candidates.is_empty());
        assert_eq!(c.input, "/definitely/not/a/dir/x");
    }

    #[test]
    fn command_names() {
        let c = complete_command("save-buffer");
        assert_eq!(c.candidates, vec!["save-buffer", "save-buffers-kill-terminal"]);
        assert_eq!(c.input, "save-buffer");

        let c = complete_command("find");
        assert_eq!(c.input, "find-file");
        assert!(c.is_unique());

        let c = complete_command("forw");
        assert_eq!(c.input, "forward-");
        assert_eq!(c.candidates, vec!["forward-char", "forward-word"]);

        assert!(complete_command("xyzzy").candidates.is_empty());
    }

    #[test]
    fn tilde_expansion() {
        assert_eq!(expand_tilde("plain/path"), PathBuf::from("plain/path"));
        assert_eq!(expand_tilde("a~/b"), PathBuf::from("a~/b"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~"), home);
            assert_eq!(expand_tilde("~/x.txt"), home.join("x.txt"));
        }
    }
}
