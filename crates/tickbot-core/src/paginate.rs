use std::str::FromStr;

use crate::command::Embed;
use crate::error::{BotError, Result};
use crate::text::truncate;

/// Split `lines` into pages of at most `per_page` lines and `max_chars`
/// characters (newlines included). A line longer than `max_chars` is
/// truncated to fit a page of its own. Always returns at least one page.
pub fn paginate_lines<S: AsRef<str>>(lines: &[S], per_page: usize, max_chars: usize) -> Vec<String> {
    let per_page = per_page.max(1);
    let mut pages = Vec::new();
    let mut page = String::new();
    let mut page_lines = 0;

    for line in lines {
        let line = truncate(line.as_ref(), max_chars);
        let line_chars = line.chars().count();
        let needed = if page_lines == 0 {
            line_chars
        } else {
            page.chars().count() + 1 + line_chars
        };

        if page_lines > 0 && (page_lines == per_page || needed > max_chars) {
            pages.push(std::mem::take(&mut page));
            page_lines = 0;
        }
        if page_lines > 0 {
            page.push('\n');
        }
        page.push_str(&line);
        page_lines += 1;
    }

    if page_lines > 0 || pages.is_empty() {
        pages.push(page);
    }
    pages
}

// ---------------------------------------------------------------------------
// PageControl
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    First,
    Prev,
    Next,
    Last,
}

impl FromStr for PageControl {
    type Err = BotError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first" => Ok(PageControl::First),
            "prev" | "previous" => Ok(PageControl::Prev),
            "next" => Ok(PageControl::Next),
            "last" => Ok(PageControl::Last),
            other => Err(BotError::InvalidPageControl(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Paginator
// ---------------------------------------------------------------------------

/// A titled list of pages with a cursor. The cursor never leaves the page
/// range.
#[derive(Debug, Clone)]
pub struct Paginator {
    title: String,
    pages: Vec<String>,
    current: usize,
}

impl Paginator {
    pub fn new(title: impl Into<String>, mut pages: Vec<String>) -> Self {
        if pages.is_empty() {
            pages.push(String::new());
        }
        Self {
            title: title.into(),
            pages,
            current: 0,
        }
    }

    pub fn from_lines<S: AsRef<str>>(
        title: impl Into<String>,
        lines: &[S],
        per_page: usize,
        max_chars: usize,
    ) -> Self {
        Self::new(title, paginate_lines(lines, per_page, max_chars))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Never true: a paginator always holds at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// 1-based number of the current page.
    pub fn page_number(&self) -> usize {
        self.current + 1
    }

    pub fn next(&mut self) {
        self.current = (self.current + 1).min(self.pages.len() - 1);
    }

    pub fn prev(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub fn first(&mut self) {
        self.current = 0;
    }

    pub fn last(&mut self) {
        self.current = self.pages.len() - 1;
    }

    /// Jump to 1-based page `n`, clamped to the page range.
    pub fn go_to(&mut self, n: usize) {
        self.current = n.clamp(1, self.pages.len()) - 1;
    }

    pub fn apply(&mut self, control: PageControl) {
        match control {
            PageControl::First => self.first(),
            PageControl::Prev => self.prev(),
            PageControl::Next => self.next(),
            PageControl::Last => self.last(),
        }
    }

    /// Position the cursor from a command's `page` and `control` options:
    /// jump to `page` (default 1), then step by `control` if one is given.
    pub fn seek(&mut self, page: Option<i64>, control: Option<&str>) -> Result<()> {
        let control = control.map(str::parse::<PageControl>).transpose()?;
        self.go_to(page.and_then(|p| usize::try_from(p).ok()).unwrap_or(1));
        if let Some(control) = control {
            self.apply(control);
        }
        Ok(())
    }

    pub fn render(&self) -> Embed {
        Embed {
            title: self.title.clone(),
            description: self.pages[self.current].clone(),
            footer: Some(format!("Page {}/{}", self.page_number(), self.len())),
        }
    }
}
