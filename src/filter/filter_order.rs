use super::error::FilterError;
use super::types::{FilterOrderInfo, ProjectIncludes, SortDirection, TaskSortColumn};

pub struct FilterOrder;

impl FilterOrder {
    /// Listings without an explicit sort show the newest tasks first.
    pub fn default_task_order() -> Vec<FilterOrderInfo> {
        vec![FilterOrderInfo { column: TaskSortColumn::CreatedAt, sort: SortDirection::Desc }]
    }

    /// Parse `sort=-created_at,title`: comma separated columns, a leading `-`
    /// means descending. Only whitelisted task columns are accepted.
    pub fn parse_task_sort(s: Option<&str>) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let Some(s) = s else { return Ok(Self::default_task_order()) };

        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() { continue; }
            let (name, sort) = match trimmed.strip_prefix('-') {
                Some(rest) => (rest, SortDirection::Desc),
                None => (trimmed, SortDirection::Asc),
            };
            let column = TaskSortColumn::parse(name)
                .ok_or_else(|| FilterError::InvalidSort(name.to_string()))?;
            out.push(FilterOrderInfo { column, sort });
        }

        if out.is_empty() {
            return Ok(Self::default_task_order());
        }
        Ok(out)
    }

    /// `filter[is_done]` accepts true/false as words or digits.
    pub fn parse_is_done(value: Option<&str>) -> Result<Option<bool>, FilterError> {
        match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some("true") | Some("1") => Ok(Some(true)),
            Some("false") | Some("0") => Ok(Some(false)),
            Some(other) => Err(FilterError::InvalidFilterValue {
                column: "is_done".to_string(),
                value: other.to_string(),
            }),
        }
    }

    pub fn parse_project_includes(s: Option<&str>) -> Result<ProjectIncludes, FilterError> {
        let mut includes = ProjectIncludes::default();
        for part in s.unwrap_or_default().split(',') {
            match part.trim() {
                "" => {}
                "tasks" => includes.tasks = true,
                "members" => includes.members = true,
                other => return Err(FilterError::InvalidInclude(other.to_string())),
            }
        }
        Ok(includes)
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() { return String::new(); }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column.as_column(), i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
