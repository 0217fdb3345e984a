//! Dashboard listing: filtering, responsive pagination and summary counts.
//!
//! Filtering keeps the store's insertion order; nothing is sorted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::user::{Role, UserRecord};

/// Page sizes by viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSizing {
    /// Viewport width in pixels at which the wide page size starts.
    pub breakpoint_px: u32,
    /// Page size below the breakpoint.
    pub narrow_page_size: usize,
    /// Page size at or above the breakpoint.
    pub wide_page_size: usize,
}

impl Default for PageSizing {
    fn default() -> Self {
        Self {
            breakpoint_px: 768,
            narrow_page_size: 5,
            wide_page_size: 10,
        }
    }
}

impl PageSizing {
    /// Page size for a viewport width.
    #[must_use]
    pub fn page_size_for(&self, width_px: u32) -> usize {
        if width_px < self.breakpoint_px {
            self.narrow_page_size
        } else {
            self.wide_page_size
        }
    }
}

/// The three independent listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    /// Free text matched against name, last name, email, phone and role label.
    pub search: String,
    /// Exact role, if set.
    pub role: Option<Role>,
    /// Exact online status, if set.
    pub online: Option<bool>,
}

impl ListingFilter {
    /// Whether a user passes every active filter.
    ///
    /// The search is a case-insensitive substring match; a blank search
    /// matches everyone.
    #[must_use]
    pub fn matches(&self, user: &UserRecord) -> bool {
        self.matches_search(user)
            && self.role.is_none_or(|role| user.role == role)
            && self.online.is_none_or(|online| user.is_online == online)
    }

    fn matches_search(&self, user: &UserRecord) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            user.name.as_str(),
            user.last_name.as_str(),
            user.email.as_str(),
            user.phone.as_str(),
            user.role.label(),
        ]
        .iter()
        .any(|haystack| haystack.to_lowercase().contains(&needle))
    }

    /// The matching subsequence of `users`, in original order.
    #[must_use]
    pub fn apply<'a>(&self, users: &'a [UserRecord]) -> Vec<&'a UserRecord> {
        users.iter().filter(|user| self.matches(user)).collect()
    }
}

/// One rendered page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<'a> {
    /// Users on this page.
    pub items: Vec<&'a UserRecord>,
    /// One-based page number actually shown.
    pub page: usize,
    /// Total number of pages, at least one.
    pub total_pages: usize,
    /// Number of users matching the filters.
    pub total_matches: usize,
    /// Page size in effect.
    pub page_size: usize,
}

/// Listing state: filters, current page and viewport-driven page size.
///
/// Changing any filter moves back to page 1.
#[derive(Debug, Clone)]
pub struct Listing {
    filter: ListingFilter,
    current_page: usize,
    sizing: PageSizing,
    page_size: usize,
}

impl Listing {
    /// Create a listing for a viewport width.
    #[must_use]
    pub fn new(sizing: PageSizing, width_px: u32) -> Self {
        Self {
            filter: ListingFilter::default(),
            current_page: 1,
            sizing,
            page_size: sizing.page_size_for(width_px),
        }
    }

    /// The active filters.
    #[must_use]
    pub fn filter(&self) -> &ListingFilter {
        &self.filter
    }

    /// The requested one-based page.
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// The page size in effect.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replace the search text.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
        self.reset_page();
    }

    /// Replace the role filter.
    pub fn set_role(&mut self, role: Option<Role>) {
        self.filter.role = role;
        self.reset_page();
    }

    /// Replace the online-status filter.
    pub fn set_online(&mut self, online: Option<bool>) {
        self.filter.online = online;
        self.reset_page();
    }

    /// Replace all filters at once.
    pub fn set_filter(&mut self, filter: ListingFilter) {
        self.filter = filter;
        self.reset_page();
    }

    /// React to a viewport resize.
    pub fn set_viewport_width(&mut self, width_px: u32) {
        self.page_size = self.sizing.page_size_for(width_px);
    }

    /// Jump to a page; values below 1 select page 1.
    pub fn go_to(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    /// Advance one page, stopping at `total_pages`.
    pub fn next_page(&mut self, total_pages: usize) {
        self.current_page = self.current_page.saturating_add(1).min(total_pages.max(1));
    }

    /// Go back one page, stopping at page 1.
    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    fn reset_page(&mut self) {
        self.current_page = 1;
    }

    /// Filter `users` and slice out the current page.
    ///
    /// A requested page past the end is clamped to the last page.
    #[must_use]
    pub fn view<'a>(&self, users: &'a [UserRecord]) -> Page<'a> {
        let matches = self.filter.apply(users);
        let total_matches = matches.len();
        let page_size = self.page_size.max(1);
        let total_pages = total_matches.div_ceil(page_size).max(1);
        let page = self.current_page.clamp(1, total_pages);

        let items = matches
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        debug!(total_matches, page, total_pages, "Rendered listing page");
        Page {
            items,
            page,
            total_pages,
            total_matches,
            page_size,
        }
    }
}

/// Count of users holding a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleCount {
    /// The role.
    pub role: Role,
    /// Number of users with it.
    pub count: usize,
}

/// Summary counts shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// All users.
    pub total: usize,
    /// Users with an enabled account.
    pub active: usize,
    /// Users with a live session.
    pub online: usize,
    /// Users per role, in role order.
    pub by_role: Vec<RoleCount>,
}

impl DashboardStats {
    /// Compute the counts over a user set.
    #[must_use]
    pub fn compute(users: &[UserRecord]) -> Self {
        Self {
            total: users.len(),
            active: users.iter().filter(|u| u.is_active).count(),
            online: users.iter().filter(|u| u.is_online).count(),
            by_role: Role::ALL
                .into_iter()
                .map(|role| RoleCount {
                    role,
                    count: users.iter().filter(|u| u.role == role).count(),
                })
                .collect(),
        }
    }

    /// The count for one role.
    #[must_use]
    pub fn count_for(&self, role: Role) -> usize {
        self.by_role
            .iter()
            .find(|rc| rc.role == role)
            .map_or(0, |rc| rc.count)
    }
}
