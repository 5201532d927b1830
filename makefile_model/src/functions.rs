//! Renderers for `make` text and file-name function calls.
//!
//! Substitution-style functions take comma-separated arguments; the
//! file-matching, filtering and sorting functions take a whitespace-joined
//! word list. All of these are pure and total.

fn words<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|a| a.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `$(subst from,to,text)` - literal text replacement.
pub fn subst(from: &str, to: &str, text: &str) -> String {
    format!("$(subst {from},{to},{text})")
}

/// `$(patsubst pattern,replacement,text)` - pattern-based replacement.
pub fn patsubst(pattern: &str, replacement: &str, text: &str) -> String {
    format!("$(patsubst {pattern},{replacement},{text})")
}

/// `$(wildcard pattern...)` - file-name expansion.
pub fn wildcard<S: AsRef<str>>(patterns: &[S]) -> String {
    format!("$(wildcard {})", words(patterns))
}

/// `$(filter word...)` - keep matching words.
pub fn filter<S: AsRef<str>>(args: &[S]) -> String {
    format!("$(filter {})", words(args))
}

/// `$(filter-out word...)` - drop matching words.
pub fn filter_out<S: AsRef<str>>(args: &[S]) -> String {
    format!("$(filter-out {})", words(args))
}

/// `$(sort word...)` - sorted, deduplicated word list.
pub fn sort<S: AsRef<str>>(args: &[S]) -> String {
    format!("$(sort {})", words(args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitution_functions_join_with_commas() {
        assert_eq!(subst("ee", "EE", "feet on the street"), "$(subst ee,EE,feet on the street)");
        assert_eq!(patsubst("%.c", "%.o", "$(SOURCES)"), "$(patsubst %.c,%.o,$(SOURCES))");
    }

    #[test]
    fn word_list_functions_join_with_whitespace() {
        assert_eq!(wildcard(&["*.c", "*.h"]), "$(wildcard *.c *.h)");
        assert_eq!(filter(&["%.c", "%.s"]), "$(filter %.c %.s)");
        assert_eq!(filter_out(&["main.o"]), "$(filter-out main.o)");
        assert_eq!(sort(&["foo", "bar", "lose"]), "$(sort foo bar lose)");
    }
}
