use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};

use crate::models::Trip;
use crate::{CoreError, CoreResult};

/// Raw query-string parameters of the trip search page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    On(NaiveDate),
    /// The date parameter could not be parsed; nothing can match it.
    Unmatchable,
}

/// Filters layered on top of the open, not-yet-departed base set.
/// Every filter is optional and they combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripSearch {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<DateFilter>,
}

impl TripSearch {
    /// Empty parameters are treated as absent.
    pub fn from_params(params: &SearchParams) -> Self {
        let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

        let date = params
            .date
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|raw| match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => DateFilter::On(date),
                Err(_) => DateFilter::Unmatchable,
            });

        Self {
            origin: non_empty(&params.origin),
            destination: non_empty(&params.destination),
            date,
        }
    }

    /// In-process form of the search predicate, base filter included.
    pub fn matches(&self, trip: &Trip, now: DateTime<Utc>) -> bool {
        if !trip.is_listed(now) {
            return false;
        }
        if let Some(origin) = &self.origin {
            if !contains_ignore_case(&trip.origin, origin) {
                return false;
            }
        }
        if let Some(destination) = &self.destination {
            if !contains_ignore_case(&trip.destination, destination) {
                return false;
            }
        }
        match self.date {
            Some(DateFilter::On(date)) => trip.departure_time.date_naive() == date,
            Some(DateFilter::Unmatchable) => false,
            None => true,
        }
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// ============================================================================
// Pagination
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u32,
    pub size: u32,
}

impl PageRequest {
    /// A missing page means the first one. Anything that is not a positive
    /// integer is reported as a missing page.
    pub fn parse(raw: Option<&str>, size: u32) -> CoreResult<Self> {
        let number = match raw.filter(|s| !s.is_empty()) {
            None => 1,
            Some(s) => s
                .parse::<u32>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or(CoreError::NotFound("Page"))?,
        };
        Ok(Self { number, size: size.max(1) })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn num_pages(&self) -> u32 {
        page_count(self.total, self.size)
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages()
    }
}

/// Number of pages needed for `total` rows. An empty result still has page 1.
pub fn page_count(total: u64, size: u32) -> u32 {
    let size = u64::from(size.max(1));
    let pages = total.div_ceil(size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}
