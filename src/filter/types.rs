use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Columns a task listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortColumn {
    Title,
    IsDone,
    CreatedAt,
}

impl TaskSortColumn {
    pub fn parse(column: &str) -> Option<Self> {
        match column {
            "title" => Some(TaskSortColumn::Title),
            "is_done" => Some(TaskSortColumn::IsDone),
            "created_at" => Some(TaskSortColumn::CreatedAt),
            _ => None,
        }
    }

    pub fn as_column(&self) -> &'static str {
        match self {
            TaskSortColumn::Title => "title",
            TaskSortColumn::IsDone => "is_done",
            TaskSortColumn::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: TaskSortColumn,
    pub sort: SortDirection,
}

/// 1-based page request, already clamped to the configured limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, per_page: Option<u32>, default_per_page: u32, max_per_page: u32) -> Self {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page.unwrap_or(default_per_page).clamp(1, max_per_page.max(1));
        Self { page, per_page }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, per_page: 15 }
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    /// Slice an already filtered and ordered collection.
    pub fn from_vec(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .collect();
        Self { items, total, request }
    }

    pub fn last_page(&self) -> u64 {
        let per_page = u64::from(self.request.per_page);
        (self.total.div_ceil(per_page)).max(1)
    }

    pub fn meta(&self) -> PageMeta {
        PageMeta {
            current_page: self.request.page,
            per_page: self.request.per_page,
            total: self.total,
            last_page: self.last_page(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u64,
}

/// Everything a task listing can be narrowed and ordered by.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub is_done: Option<bool>,
    pub order: Vec<FilterOrderInfo>,
    pub page: PageRequest,
}

/// Relations a project listing may embed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectIncludes {
    pub tasks: bool,
    pub members: bool,
}
