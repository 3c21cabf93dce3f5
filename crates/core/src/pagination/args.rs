//! Paging arguments and their validation.

use crate::error::{PagingError, PagingResult};

use super::cursor::{decode_key, Cursor};

/// Page size used when neither `first` nor `last` is given.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound applied to requested page sizes.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Paginator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    /// Page size when the caller gives neither `first` nor `last`.
    pub default_page_size: u32,
    /// Requests above this size are clamped to it.
    pub max_page_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Relay pagination arguments, as received from a client.
///
/// Supports forward pagination (`first`/`after`) and backward
/// pagination (`last`/`before`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagingArguments {
    /// Number of items to fetch (forward pagination).
    pub first: Option<i32>,
    /// Cursor to start after.
    pub after: Option<Cursor>,
    /// Number of items to fetch (backward pagination).
    pub last: Option<i32>,
    /// Cursor to end before.
    pub before: Option<Cursor>,
}

impl PagingArguments {
    /// First `n` items.
    pub fn first(n: i32) -> Self {
        Self {
            first: Some(n),
            ..Default::default()
        }
    }

    /// Last `n` items.
    pub fn last(n: i32) -> Self {
        Self {
            last: Some(n),
            ..Default::default()
        }
    }

    pub fn after(mut self, cursor: impl Into<Cursor>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<Cursor>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    /// Validate the arguments and decode cursors.
    pub fn validate(&self, config: &PagingConfig) -> PagingResult<PageRequest> {
        let first = positive("first", self.first)?;
        let last = positive("last", self.last)?;

        if first.is_some() && last.is_some() {
            return Err(PagingError::InvalidArgument(
                "first and last cannot be combined".to_string(),
            ));
        }

        let direction = if first.is_none() && last.is_some() {
            PageDirection::Backward
        } else {
            PageDirection::Forward
        };

        let limit = first
            .or(last)
            .unwrap_or(config.default_page_size)
            .min(config.max_page_size)
            .max(1);

        Ok(PageRequest {
            direction,
            limit,
            after: self.after.as_ref().map(decode_key).transpose()?,
            before: self.before.as_ref().map(decode_key).transpose()?,
        })
    }
}

fn positive(name: &str, value: Option<i32>) -> PagingResult<Option<u32>> {
    match value {
        None => Ok(None),
        Some(n) if n > 0 => Ok(Some(n as u32)),
        Some(n) => Err(PagingError::InvalidArgument(format!(
            "{} must be a positive integer, got {}",
            name, n
        ))),
    }
}

/// Which end of the eligible interval a page is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    /// Head of the interval (`first`, or no size at all).
    Forward,
    /// Tail of the interval (`last` only).
    Backward,
}

impl PageDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            PageDirection::Forward => "forward",
            PageDirection::Backward => "backward",
        }
    }
}

/// Validated paging request with decoded bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub direction: PageDirection,
    pub limit: u32,
    /// Exclusive lower bound on the ordering key.
    pub after: Option<i64>,
    /// Exclusive upper bound on the ordering key.
    pub before: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(args: PagingArguments) -> PagingResult<PageRequest> {
        args.validate(&PagingConfig::default())
    }

    #[test]
    fn test_defaults_to_forward_page_of_ten() {
        let req = validate(PagingArguments::default()).unwrap();
        assert_eq!(req.direction, PageDirection::Forward);
        assert_eq!(req.limit, 10);
        assert_eq!(req.after, None);
        assert_eq!(req.before, None);
    }

    #[test]
    fn test_last_only_is_backward() {
        let req = validate(PagingArguments::last(15).before("9986")).unwrap();
        assert_eq!(req.direction, PageDirection::Backward);
        assert_eq!(req.limit, 15);
        assert_eq!(req.before, Some(9986));
    }

    #[test]
    fn test_cursors_without_size_stay_forward() {
        let req = validate(PagingArguments::default().before("50")).unwrap();
        assert_eq!(req.direction, PageDirection::Forward);
        assert_eq!(req.before, Some(50));
    }

    // Test critique: tailles non positives rejetées (pas de clamp silencieux)
    #[test]
    fn test_rejects_non_positive_sizes() {
        for args in [
            PagingArguments::first(0),
            PagingArguments::first(-3),
            PagingArguments::last(0),
            PagingArguments::last(-1),
        ] {
            let err = validate(args).unwrap_err();
            assert!(matches!(err, PagingError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_rejects_first_with_last() {
        let args = PagingArguments {
            first: Some(5),
            last: Some(5),
            ..Default::default()
        };
        let err = validate(args).unwrap_err();
        assert!(err.to_string().contains("first and last"));
    }

    #[test]
    fn test_clamps_to_max_page_size() {
        let config = PagingConfig {
            default_page_size: 10,
            max_page_size: 25,
        };
        let req = PagingArguments::first(10_000).validate(&config).unwrap();
        assert_eq!(req.limit, 25);
    }

    #[test]
    fn test_bad_cursor_is_invalid_cursor() {
        let err = validate(PagingArguments::first(5).after("nope")).unwrap_err();
        assert!(matches!(err, PagingError::InvalidCursor(_)));
    }
}
