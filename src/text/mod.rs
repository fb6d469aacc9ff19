use regex::{Regex, RegexBuilder};

use crate::config::Options;
use crate::data::DataSet;
use crate::error::Result;

type KeepFn<'a> = Box<dyn Fn(&DataSet, usize, usize) -> bool + 'a>;

/// Joins the text grid of a [`DataSet`] into one string, e.g. to assemble a query or the
/// body of a report table.
///
/// ```ignore
/// let sql = TextPaste::new()
///     .before("select ")
///     .between(", ")
///     .after(" from data_table")
///     .paste(&column_names);
/// ```
pub struct TextPaste<'a> {
    between: String,
    before: Option<String>,
    after: Option<String>,
    between_cols: Option<String>,
    keep: Option<KeepFn<'a>>,
    options: Options,
}

impl<'a> TextPaste<'a> {
    pub fn new() -> Self {
        TextPaste {
            between: " ".to_string(),
            before: None,
            after: None,
            between_cols: None,
            keep: None,
            options: Options::default(),
        }
    }

    /// Separator between rows. Default: a single space.
    pub fn between(mut self, between: impl Into<String>) -> Self {
        self.between = between.into();
        self
    }

    pub fn before(mut self, before: impl Into<String>) -> Self {
        self.before = Some(before.into());
        self
    }

    pub fn after(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }

    /// Separator between cells of one row. Default: same as `between`.
    pub fn between_cols(mut self, between_cols: impl Into<String>) -> Self {
        self.between_cols = Some(between_cols.into());
        self
    }

    /// Only cells for which `keep(data, row, col)` is true are pasted. A row with no kept
    /// cells is skipped entirely.
    pub fn keep<F>(mut self, keep: F) -> Self
    where
        F: Fn(&DataSet, usize, usize) -> bool + 'a,
    {
        self.keep = Some(Box::new(keep));
        self
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn paste(&self, data: &DataSet) -> String {
        let between_cols = self.between_cols.as_deref().unwrap_or(&self.between);
        let text = data.text();

        let rows: Vec<String> = (0..text.nrows())
            .filter_map(|i| {
                let cells: Vec<&str> = (0..text.ncols())
                    .filter(|&j| self.keep.as_ref().map_or(true, |keep| keep(data, i, j)))
                    .map(|j| text[[i, j]].as_str())
                    .collect();
                (!cells.is_empty()).then(|| cells.join(between_cols))
            })
            .collect();

        let mut out = String::new();
        if let Some(before) = &self.before {
            out.push_str(before);
        }
        out.push_str(&rows.join(&self.between));
        if let Some(after) = &self.after {
            out.push_str(after);
        }
        self.options.notify(3, &out);
        out
    }
}

impl Default for TextPaste<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegexOptions {
    /// Matching ignores case unless this is set.
    pub case_sensitive: bool,
}

fn compile(pattern: &str, opts: &RegexOptions) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern)
        .case_insensitive(!opts.case_sensitive)
        .build()?)
}

/// Whether `pattern` matches anywhere in `text`.
pub fn regex_match(text: &str, pattern: &str, opts: &RegexOptions) -> Result<bool> {
    Ok(compile(pattern, opts)?.is_match(text))
}

/// Every successive, non-overlapping match of `pattern` in `text`, with the capture
/// groups of each match as one row of text in the returned data set.
///
/// The count of matches comes first. With no match the count is zero and the data set
/// has no text. Groups that did not take part in a match are empty strings.
pub fn regex_substrings(
    text: &str,
    pattern: &str,
    opts: &RegexOptions,
) -> Result<(usize, DataSet)> {
    let re = compile(pattern, opts)?;
    let groups = re.captures_len() - 1;

    let rows: Vec<Vec<String>> = re
        .captures_iter(text)
        .map(|caps| {
            (1..=groups)
                .map(|g| caps.get(g).map_or_else(String::new, |m| m.as_str().to_string()))
                .collect()
        })
        .collect();

    let mut out = DataSet::new();
    if !rows.is_empty() {
        out.text_alloc(rows.len(), groups)?;
        for (i, row) in rows.into_iter().enumerate() {
            for (j, cell) in row.into_iter().enumerate() {
                out.set_text(i, j, cell)?;
            }
        }
    }
    Ok((out.height(), out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use ndarray::Array2;

    fn grid(rows: &[&[&str]]) -> DataSet {
        let cols = rows.first().map_or(0, |r| r.len());
        DataSet::from_text(Array2::from_shape_fn((rows.len(), cols), |(i, j)| {
            rows[i][j].to_string()
        }))
    }

    #[test]
    fn test_paste_query() {
        let names = grid(&[&["id"], &["age"], &["income"]]);
        let sql = TextPaste::new()
            .before("select ")
            .between(", ")
            .after(" from data_table")
            .paste(&names);
        assert_eq!(sql, "select id, age, income from data_table");
    }

    #[test]
    fn test_paste_html_rows() {
        let table = grid(&[&["1", "2"], &["3", "4"]]);
        let html = TextPaste::new()
            .before("<table><tr><td>")
            .between("</td></tr>\n<tr><td>")
            .between_cols("</td><td>")
            .after("</td></tr></table>")
            .paste(&table);
        assert_eq!(
            html,
            "<table><tr><td>1</td><td>2</td></tr>\n<tr><td>3</td><td>4</td></tr></table>"
        );
    }

    #[test]
    fn test_paste_defaults_and_empty() {
        let table = grid(&[&["a", "b"], &["c", "d"]]);
        assert_eq!(TextPaste::default().paste(&table), "a b c d");

        let empty = DataSet::new();
        let out = TextPaste::new().before("[").after("]").paste(&empty);
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_paste_keep_skips_cells_and_rows() {
        let table = grid(&[&["a", "", "b"], &["", "", ""], &["c", "d", ""]]);
        let out = TextPaste::new()
            .between("; ")
            .between_cols(",")
            .keep(|data, i, j| !data.text()[[i, j]].is_empty())
            .paste(&table);
        assert_eq!(out, "a,b; c,d");

        let only_first = TextPaste::new().keep(|_, _, j| j == 0).paste(&table);
        assert_eq!(only_first, "a  c");
    }

    #[test]
    fn test_regex_match_case() {
        let ci = RegexOptions::default();
        assert!(regex_match("P value", "p.val", &ci).unwrap());
        assert!(regex_match("tempeval", "p.val", &ci).unwrap());
        let cs = RegexOptions { case_sensitive: true };
        assert!(!regex_match("P value", "p.val", &cs).unwrap());
        assert!(!regex_match("nothing", "p.val", &ci).unwrap());
    }

    #[test]
    fn test_regex_substrings_rows_per_match() {
        let (count, subs) =
            regex_substrings("a1 b2 c3", "([a-z])([0-9])", &RegexOptions::default()).unwrap();
        assert_eq!(count, 3);
        assert_eq!(subs.text().dim(), (3, 2));
        assert_eq!(subs.text()[[0, 0]], "a");
        assert_eq!(subs.text()[[1, 1]], "2");
        assert_eq!(subs.text()[[2, 0]], "c");
    }

    #[test]
    fn test_regex_substrings_optional_group_and_no_match() {
        let (count, subs) =
            regex_substrings("key=", "([a-z]+)=([0-9]+)?", &RegexOptions::default()).unwrap();
        assert_eq!(count, 1);
        assert_eq!(subs.text()[[0, 0]], "key");
        assert_eq!(subs.text()[[0, 1]], "");

        let (count, subs) = regex_substrings("xyz", "([0-9])", &RegexOptions::default()).unwrap();
        assert_eq!(count, 0);
        assert_eq!(subs.text().nrows(), 0);
    }

    #[test]
    fn test_regex_without_groups_counts_matches() {
        let (count, subs) = regex_substrings("aXbXc", "x", &RegexOptions::default()).unwrap();
        assert_eq!(count, 2);
        assert_eq!(subs.text().dim(), (2, 0));
    }

    #[test]
    fn test_bad_regex() {
        assert!(matches!(
            regex_match("abc", "(unclosed", &RegexOptions::default()),
            Err(Error::Regex(_))
        ));
    }
}
