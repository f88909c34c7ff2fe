//! Cursor based pagination over a list that is completely loaded into memory.
//!
//! This follows the "array connection" algorithm of `graphql-relay`: the
//! cursors encode offsets into the full list, and `first`/`after` and
//! `last`/`before` narrow down the window.

use super::{
    common::{Cursor, PageInfo},
    err::{invalid_input, ApiResult},
};


/// The standard Relay connection arguments.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConnectionArgs {
    pub(crate) first: Option<i32>,
    pub(crate) after: Option<Cursor>,
    pub(crate) last: Option<i32>,
    pub(crate) before: Option<Cursor>,
}

/// One page of a connection, with all items paired with their cursor.
#[derive(Debug)]
pub(crate) struct Page<T> {
    pub(crate) edges: Vec<(Cursor, T)>,
    pub(crate) page_info: PageInfo,

    /// Number of items in the whole list, not just on this page.
    pub(crate) total_count: usize,
}

/// Selects the page described by `args` from `items`.
pub(crate) fn paginate<T>(items: Vec<T>, args: &ConnectionArgs) -> ApiResult<Page<T>> {
    let len = items.len();

    let after = args.after.as_ref().map(Cursor::offset).transpose()?;
    let before = args.before.as_ref().map(Cursor::offset).transpose()?;
    let first = args.first.map(|n| check_count("first", n)).transpose()?;
    let last = args.last.map(|n| check_count("last", n)).transpose()?;

    // The window in which `first` and `last` operate.
    let lower_bound = after.map_or(0, |a| a.saturating_add(1)).min(len);
    let upper_bound = before.map_or(len, |b| b.min(len));

    let mut start = lower_bound;
    let mut end = upper_bound.max(start);
    if let Some(first) = first {
        end = end.min(start.saturating_add(first));
    }
    if let Some(last) = last {
        start = start.max(end.saturating_sub(last));
    }

    let edges = items.into_iter()
        .enumerate()
        .skip(start)
        .take(end - start)
        .map(|(offset, item)| (Cursor::from_offset(offset), item))
        .collect::<Vec<_>>();

    let page_info = PageInfo {
        has_next_page: first.is_some() && end < upper_bound,
        has_previous_page: last.is_some() && start > lower_bound,
        start_cursor: edges.first().map(|(cursor, _)| cursor.clone()),
        end_cursor: edges.last().map(|(cursor, _)| cursor.clone()),
    };

    Ok(Page { edges, page_info, total_count: len })
}

/// Returns the cursor pointing at the first item of `items` that `is_target`
/// returns `true` for.
pub(crate) fn cursor_for<T>(items: &[T], is_target: impl Fn(&T) -> bool) -> Option<Cursor> {
    items.iter().position(is_target).map(Cursor::from_offset)
}

fn check_count(name: &str, n: i32) -> ApiResult<usize> {
    usize::try_from(n)
        .map_err(|_| invalid_input!("argument '{name}' has to be >= 0, but is {n}"))
}


#[cfg(test)]
mod tests {
    use super::{ConnectionArgs, Cursor, cursor_for, paginate};

    const LETTERS: [char; 5] = ['a', 'b', 'c', 'd', 'e'];

    fn args(
        first: Option<i32>,
        after: Option<usize>,
        last: Option<i32>,
        before: Option<usize>,
    ) -> ConnectionArgs {
        ConnectionArgs {
            first,
            after: after.map(Cursor::from_offset),
            last,
            before: before.map(Cursor::from_offset),
        }
    }

    #[track_caller]
    fn check(args: ConnectionArgs, expected: &str, has_previous: bool, has_next: bool) {
        let page = paginate(LETTERS.to_vec(), &args).unwrap();
        let items = page.edges.iter().map(|(_, c)| *c).collect::<String>();
        assert_eq!(items, expected);
        assert_eq!(page.page_info.has_previous_page, has_previous);
        assert_eq!(page.page_info.has_next_page, has_next);
        assert_eq!(page.total_count, LETTERS.len());

        for (cursor, c) in &page.edges {
            let offset = cursor.offset().unwrap();
            assert_eq!(LETTERS[offset], *c);
        }
    }

    #[test]
    fn everything() {
        check(ConnectionArgs::default(), "abcde", false, false);
    }

    #[test]
    fn forward() {
        check(args(Some(2), None, None, None), "ab", false, true);
        check(args(Some(5), None, None, None), "abcde", false, false);
        check(args(Some(10), None, None, None), "abcde", false, false);
        check(args(Some(2), Some(1), None, None), "cd", false, true);
        check(args(Some(2), Some(2), None, None), "de", false, false);
        check(args(None, Some(1), None, None), "cde", false, false);
        check(args(Some(2), Some(4), None, None), "", false, false);
        check(args(Some(2), Some(10), None, None), "", false, false);
        check(args(Some(0), None, None, None), "", false, true);
    }

    #[test]
    fn backward() {
        check(args(None, None, Some(2), None), "de", true, false);
        check(args(None, None, Some(10), None), "abcde", false, false);
        check(args(None, None, Some(2), Some(3)), "bc", true, false);
        check(args(None, None, Some(2), Some(1)), "a", false, false);
        check(args(None, None, None, Some(2)), "ab", false, false);
        check(args(None, None, Some(2), Some(0)), "", false, false);
    }

    #[test]
    fn window() {
        check(args(None, Some(0), None, Some(4)), "bcd", false, false);
        check(args(Some(1), Some(0), None, Some(4)), "b", false, true);
        check(args(None, Some(0), Some(1), Some(4)), "d", true, false);
        check(args(Some(2), Some(3), None, Some(1)), "", false, false);
    }

    #[test]
    fn page_cursors() {
        let page = paginate(LETTERS.to_vec(), &args(Some(2), Some(0), None, None)).unwrap();
        assert_eq!(page.page_info.start_cursor, Some(Cursor::from_offset(1)));
        assert_eq!(page.page_info.end_cursor, Some(Cursor::from_offset(2)));

        let page = paginate(Vec::<char>::new(), &ConnectionArgs::default()).unwrap();
        assert!(page.edges.is_empty());
        assert_eq!(page.page_info.start_cursor, None);
        assert_eq!(page.page_info.end_cursor, None);
        assert_eq!(page.total_count, 0);
    }

    #[test]
    fn invalid_args() {
        assert!(paginate(LETTERS.to_vec(), &args(Some(-1), None, None, None)).is_err());
        assert!(paginate(LETTERS.to_vec(), &args(None, None, Some(-3), None)).is_err());

        let bad_cursor = ConnectionArgs { after: Some(Cursor::from("nope")), ..Default::default() };
        assert!(paginate(LETTERS.to_vec(), &bad_cursor).is_err());
    }

    #[test]
    fn find_cursor() {
        assert_eq!(cursor_for(&LETTERS, |&c| c == 'c'), Some(Cursor::from_offset(2)));
        assert_eq!(cursor_for(&LETTERS, |&c| c == 'z'), None);
    }
}
