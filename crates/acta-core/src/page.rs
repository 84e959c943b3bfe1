//! Pagination types shared by every list/search operation.
//!
//! Pages are 1-based. `total` is always counted over the *filtered* set, not
//! the unfiltered table, so `page_count` is meaningful to callers rendering
//! pagers.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── PageRequest ─────────────────────────────────────────────────────────────

/// A validated page request: `page_number >= 1`, `page_size > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
  page_number: u32,
  page_size:   u32,
}

impl PageRequest {
  pub const DEFAULT_PAGE_SIZE: u32 = 20;

  pub fn new(page_number: u32, page_size: u32) -> Result<Self> {
    if page_number < 1 {
      return Err(Error::InvalidPage("page_number must be >= 1".into()));
    }
    if page_size < 1 {
      return Err(Error::InvalidPage("page_size must be > 0".into()));
    }
    Ok(Self { page_number, page_size })
  }

  /// Page 1 with the default size.
  pub fn first() -> Self {
    Self { page_number: 1, page_size: Self::DEFAULT_PAGE_SIZE }
  }

  pub fn page_number(&self) -> u32 { self.page_number }

  pub fn page_size(&self) -> u32 { self.page_size }

  /// Number of records to skip before this page starts.
  pub fn offset(&self) -> u64 {
    u64::from(self.page_number - 1) * u64::from(self.page_size)
  }
}

impl Default for PageRequest {
  fn default() -> Self { Self::first() }
}

// ─── Page ────────────────────────────────────────────────────────────────────

/// One page of results plus the total size of the filtered set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  pub items:       Vec<T>,
  pub total:       u64,
  pub page_number: u32,
  pub page_size:   u32,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
    Self {
      items,
      total,
      page_number: request.page_number(),
      page_size: request.page_size(),
    }
  }

  /// Total number of pages for the filtered set.
  pub fn page_count(&self) -> u64 {
    self.total.div_ceil(u64::from(self.page_size))
  }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;

  use super::*;

  #[test]
  fn rejects_zero_page_number_and_size() {
    assert!(PageRequest::new(0, 10).is_err());
    assert!(PageRequest::new(1, 0).is_err());
    assert!(PageRequest::new(1, 1).is_ok());
  }

  #[test]
  fn offset_is_zero_based() {
    let req = PageRequest::new(3, 25).unwrap();
    assert_eq!(req.offset(), 50);
  }

  proptest! {
    // Walking every page of an N-item filtered set covers each item exactly
    // once: no duplicates, no gaps.
    #[test]
    fn pages_partition_the_filtered_set(
      total in 0u64..10_000,
      size in 1u32..500,
    ) {
      let page = Page::<u64> {
        items:       Vec::new(),
        total,
        page_number: 1,
        page_size:   size,
      };
      let pages = page.page_count();

      let mut covered = 0u64;
      for number in 1..=pages {
        let req = PageRequest::new(number as u32, size).unwrap();
        prop_assert_eq!(req.offset(), covered);
        covered += (total - req.offset()).min(u64::from(size));
      }
      prop_assert_eq!(covered, total);
    }
  }
}
