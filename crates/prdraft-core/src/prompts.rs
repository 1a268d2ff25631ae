/// Diffs longer than this are cut before they reach the agent
pub const DEFAULT_MAX_DIFF_BYTES: usize = 100_000;

/// What the prompt needs besides the diff itself
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub feature_branch: &'a str,
    pub base_branch: &'a str,
    pub max_diff_bytes: usize,
}

/// Prompt templates for the description agent
pub struct DescriptionPrompts;

impl DescriptionPrompts {
    /// Build the description prompt around `diff`
    pub fn build(diff: &str, context: PromptContext<'_>) -> String {
        let (diff, truncated) = Self::truncate_diff(diff, context.max_diff_bytes);
        let truncation_note = if truncated {
            format!(
                "\nNote: the diff was cut to its first {} bytes. Describe what is shown and mention that the change is larger.\n",
                diff.len()
            )
        } else {
            String::new()
        };

        format!(
            r#"You are a senior software engineer who writes clear, accurate pull request descriptions for your team.

## Task
Write a pull request description for merging `{feature}` into `{base}`, based only on the diff below.

## Diff
```diff
{diff}
```
{note}
---

## Instructions

Structure the description in Markdown with these sections:

1. **Title**: one line, imperative mood, under 72 characters.
2. **Summary**: two to four sentences on what the change does and why it matters.
3. **Changes**: a bulleted list of the notable changes, grouped by area. Mention new files, removed files and changed public interfaces.
4. **Testing**: how the change is or should be verified. If the diff adds or changes tests, say which.
5. **Notes for reviewers**: risks, follow-ups, or anything that needs a closer look. Omit this section if there is nothing to say.

Rules:
- Describe only what the diff shows. Do not invent motivation, tickets or benchmarks.
- Do not reproduce the diff or large code blocks.
- Reply with the description only, no preamble and no closing remarks.
"#,
            feature = context.feature_branch,
            base = context.base_branch,
            diff = diff.trim_end_matches('\n'),
            note = truncation_note,
        )
    }

    /// Cut `diff` to at most `max_bytes`, ending on a whole line when one fits.
    ///
    /// Returns the kept text and whether anything was dropped.
    pub fn truncate_diff(diff: &str, max_bytes: usize) -> (&str, bool) {
        if diff.len() <= max_bytes {
            return (diff, false);
        }

        let mut end = max_bytes;
        while !diff.is_char_boundary(end) {
            end -= 1;
        }

        let head = &diff[..end];
        let kept = match head.rfind('\n') {
            Some(newline) => &head[..=newline],
            None => head,
        };

        (kept, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> PromptContext<'static> {
        PromptContext {
            feature_branch: "feature",
            base_branch: "main",
            max_diff_bytes: DEFAULT_MAX_DIFF_BYTES,
        }
    }

    #[test]
    fn test_prompt_embeds_diff_and_branches() {
        let diff = "diff --git a/README.md b/README.md\n+An update\n";
        let prompt = DescriptionPrompts::build(diff, context());

        assert!(prompt.contains("```diff\ndiff --git a/README.md b/README.md\n+An update\n```"));
        assert!(prompt.contains("merging `feature` into `main`"));
        assert!(!prompt.contains("the diff was cut"));
    }

    #[test]
    fn test_prompt_mentions_truncation() {
        let diff = "+line one\n+line two\n+line three\n";
        let prompt = DescriptionPrompts::build(
            diff,
            PromptContext {
                max_diff_bytes: 15,
                ..context()
            },
        );

        assert!(prompt.contains("+line one\n```"));
        assert!(!prompt.contains("+line two"));
        assert!(prompt.contains("the diff was cut to its first 10 bytes"));
    }

    #[test]
    fn test_truncate_keeps_short_diff() {
        let (kept, truncated) = DescriptionPrompts::truncate_diff("+a\n", 10);
        assert_eq!(kept, "+a\n");
        assert!(!truncated);
    }

    #[test]
    fn test_truncate_ends_on_line_break() {
        let (kept, truncated) = DescriptionPrompts::truncate_diff("+first\n+second\n", 10);
        assert_eq!(kept, "+first\n");
        assert!(truncated);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // "é" is two bytes, so a 2-byte limit lands inside the first one
        let (kept, truncated) = DescriptionPrompts::truncate_diff("aéé", 2);
        assert_eq!(kept, "a");
        assert!(truncated);
    }
}
