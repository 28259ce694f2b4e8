// Copyright (C) Brian G. Milnes 2025

//! Fixer module for applying suggested fixes to Go source

pub mod fixer {
    use crate::analyzer::analyzer::{Diagnostic, TextEdit};
    use crate::syntax::syntax::FileId;
    use anyhow::{bail, Result};
    use log::debug;

    /// Result of fixing one file.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FixOutcome {
        pub text: String,
        /// Fixes applied.
        pub applied: usize,
        /// Fixes dropped because they overlapped an accepted one.
        pub skipped: usize,
    }

    /// Apply non-overlapping edits to `source`.
    pub fn apply_edits(source: &str, edits: &[TextEdit]) -> Result<String> {
        let edits = normalize(edits);
        let mut last_end = 0;
        for edit in &edits {
            if edit.pos > edit.end || edit.end > source.len() {
                bail!("edit {}..{} outside source of {} bytes", edit.pos, edit.end, source.len());
            }
            if !source.is_char_boundary(edit.pos) || !source.is_char_boundary(edit.end) {
                bail!("edit {}..{} splits a character", edit.pos, edit.end);
            }
            if edit.pos < last_end {
                bail!("edit {}..{} overlaps the edit ending at {}", edit.pos, edit.end, last_end);
            }
            last_end = edit.end;
        }

        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;
        for edit in &edits {
            out.push_str(&source[cursor..edit.pos]);
            out.push_str(&edit.new_text);
            cursor = edit.end;
        }
        out.push_str(&source[cursor..]);
        Ok(out)
    }

    /// Sorted by position with exact duplicates removed.
    fn normalize(edits: &[TextEdit]) -> Vec<TextEdit> {
        let mut edits = edits.to_vec();
        edits.sort_by(|a, b| (a.pos, a.end).cmp(&(b.pos, b.end)));
        edits.dedup();
        edits
    }

    fn overlaps(a: &TextEdit, b: &TextEdit) -> bool {
        if a == b {
            return false;
        }
        // Two insertions at one point would reorder text.
        if a.pos == a.end && b.pos == b.end {
            return a.pos == b.pos;
        }
        a.pos < b.end && b.pos < a.end
    }

    /// Apply the first suggested fix of every diagnostic reported against
    /// `file`. Each fix goes in whole or not at all.
    pub fn fix_source(source: &str, file: FileId, diagnostics: &[Diagnostic]) -> Result<FixOutcome> {
        let mut accepted: Vec<TextEdit> = Vec::new();
        let mut applied = 0;
        let mut skipped = 0;
        for diagnostic in diagnostics.iter().filter(|d| d.file == file) {
            let Some(fix) = diagnostic.suggested_fixes.first() else { continue };
            let conflict = fix
                .text_edits
                .iter()
                .any(|edit| accepted.iter().any(|taken| overlaps(edit, taken)));
            if conflict {
                debug!("skipping fix at {}: overlaps an earlier fix", diagnostic);
                skipped += 1;
                continue;
            }
            accepted.extend(fix.text_edits.iter().cloned());
            applied += 1;
        }
        Ok(FixOutcome {
            text: apply_edits(source, &accepted)?,
            applied,
            skipped,
        })
    }
}
