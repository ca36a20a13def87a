//! Composable booking queries understood by every store

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{Booking, BookingStatus},
};

/// Whose bookings a query looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingScope {
    /// Bookings made by this user
    Booker(i64),
    /// Bookings on items owned by this user
    Owner(i64),
    /// Bookings on this item
    Item(i64),
    /// Bookings of one item made by one user
    BookerOnItem { booker_id: i64, item_id: i64 },
}

/// Time predicate relative to an instant captured by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFilter {
    /// `start > t`
    StartsAfter(DateTime<Utc>),
    /// `start < t`
    StartsBefore(DateTime<Utc>),
    /// `end < t`
    EndsBefore(DateTime<Utc>),
    /// `start <= t <= end`
    Covers(DateTime<Utc>),
}

impl TimeFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        match *self {
            TimeFilter::StartsAfter(t) => booking.start > t,
            TimeFilter::StartsBefore(t) => booking.start < t,
            TimeFilter::EndsBefore(t) => booking.end < t,
            TimeFilter::Covers(t) => booking.start <= t && t <= booking.end,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Primary sort key; ties are always broken by ascending id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl BookingSort {
    pub const START_ASC: BookingSort = BookingSort {
        field: SortField::Start,
        direction: SortDirection::Asc,
    };
    pub const START_DESC: BookingSort = BookingSort {
        field: SortField::Start,
        direction: SortDirection::Desc,
    };
    pub const END_DESC: BookingSort = BookingSort {
        field: SortField::End,
        direction: SortDirection::Desc,
    };

    pub fn compare(&self, a: &Booking, b: &Booking) -> Ordering {
        let primary = match self.field {
            SortField::Start => a.start.cmp(&b.start),
            SortField::End => a.end.cmp(&b.end),
        };
        let primary = match self.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

/// A page of rows: `size` rows starting at `index * size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub index: i64,
    pub size: i64,
}

impl PageRequest {
    /// Build a page from a client supplied `from`/`size` pair.
    ///
    /// `from` is turned into a page number (`from / size`), not used as a row
    /// offset: `from = 15, size = 10` yields rows 10..20.
    pub fn from_offset(from: i64, size: i64) -> AppResult<Self> {
        if from < 0 {
            return Err(AppError::Validation(format!("invalid from: {}", from)));
        }
        if size <= 0 {
            return Err(AppError::Validation(format!("invalid size: {}", size)));
        }
        let index = if from > 0 { from / size } else { 0 };
        Ok(Self { index, size })
    }

    /// First row only
    pub fn first() -> Self {
        Self { index: 0, size: 1 }
    }

    pub fn offset(&self) -> i64 {
        self.index * self.size
    }
}

/// Filtered, sorted and optionally paged booking query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingQuery {
    pub scope: BookingScope,
    pub status: Option<BookingStatus>,
    pub time: Option<TimeFilter>,
    pub sort: BookingSort,
    pub page: Option<PageRequest>,
}

impl BookingQuery {
    pub fn new(scope: BookingScope, sort: BookingSort) -> Self {
        Self {
            scope,
            status: None,
            time: None,
            sort,
            page: None,
        }
    }

    pub fn with_status(mut self, status: BookingStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_time(mut self, time: TimeFilter) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    /// Status and time predicates; scope is resolved by the store
    pub fn matches(&self, booking: &Booking) -> bool {
        if let Some(status) = self.status {
            if booking.status != status {
                return false;
            }
        }
        self.time.map_or(true, |t| t.matches(booking))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap() + Duration::hours(h)
    }

    fn booking(id: i64, start: i64, end: i64) -> Booking {
        Booking {
            id,
            start: at(start),
            end: at(end),
            item_id: 1,
            booker_id: 2,
            status: BookingStatus::Waiting,
        }
    }

    #[test]
    fn test_page_from_offset() {
        assert_eq!(PageRequest::from_offset(0, 10).unwrap(), PageRequest { index: 0, size: 10 });
        assert_eq!(PageRequest::from_offset(15, 10).unwrap().index, 1);
        assert_eq!(PageRequest::from_offset(15, 10).unwrap().offset(), 10);
        assert_eq!(PageRequest::from_offset(9, 10).unwrap().offset(), 0);
        assert_eq!(PageRequest::from_offset(20, 10).unwrap().offset(), 20);
    }

    #[test]
    fn test_page_rejects_bad_input() {
        assert!(matches!(PageRequest::from_offset(-1, 10), Err(AppError::Validation(_))));
        assert!(matches!(PageRequest::from_offset(0, 0), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_covers_is_inclusive() {
        let b = booking(1, 2, 4);
        assert!(TimeFilter::Covers(at(2)).matches(&b));
        assert!(TimeFilter::Covers(at(4)).matches(&b));
        assert!(!TimeFilter::Covers(at(5)).matches(&b));
        assert!(!TimeFilter::EndsBefore(at(4)).matches(&b));
        assert!(TimeFilter::EndsBefore(at(5)).matches(&b));
        assert!(!TimeFilter::StartsAfter(at(2)).matches(&b));
        assert!(TimeFilter::StartsBefore(at(3)).matches(&b));
    }

    #[test]
    fn test_sort_breaks_ties_by_id() {
        let mut rows = vec![booking(3, 1, 5), booking(1, 2, 5), booking(2, 1, 5)];

        rows.sort_by(|a, b| BookingSort::START_DESC.compare(a, b));
        assert_eq!(rows.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        rows.sort_by(|a, b| BookingSort::START_ASC.compare(a, b));
        assert_eq!(rows.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2, 3, 1]);

        rows.sort_by(|a, b| BookingSort::END_DESC.compare(a, b));
        assert_eq!(rows.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_matches_status_and_time() {
        let mut b = booking(1, 2, 4);
        let query = BookingQuery::new(BookingScope::Item(1), BookingSort::START_ASC)
            .with_status(BookingStatus::Approved)
            .with_time(TimeFilter::StartsAfter(at(0)));
        assert!(!query.matches(&b));
        b.status = BookingStatus::Approved;
        assert!(query.matches(&b));
    }
}
