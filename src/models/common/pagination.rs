use serde::{Deserialize, Serialize};

/// 单页最大条数
pub const MAX_PAGE_SIZE: i64 = 100;

// 分页查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationQuery {
    #[serde(
        default = "default_page",
        deserialize_with = "deserialize_string_to_i64"
    )]
    pub page: i64,
    #[serde(
        default = "default_page_size",
        alias = "size",
        deserialize_with = "deserialize_string_to_i64"
    )]
    pub page_size: i64,
}

impl PaginationQuery {
    /// 规范化后的页码（从 1 开始）
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// 规范化后的每页条数
    pub fn page_size(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

// 分页响应信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationInfo {
    pub fn new(page: i64, page_size: i64, total: i64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = if total <= 0 {
            0
        } else {
            (total + page_size - 1) / page_size
        };

        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

// 分页列表响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, page: i64, page_size: i64, total: i64) -> Self {
        Self {
            items,
            pagination: PaginationInfo::new(page, page_size, total),
        }
    }

    /// 转换列表元素类型，分页信息不变
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

// 自定义反序列化函数，支持字符串到i64的转换
pub(crate) fn deserialize_string_to_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{Error, Unexpected, Visitor};
    use std::fmt;

    struct I64Visitor;

    impl<'de> Visitor<'de> for I64Visitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer or a string containing an integer")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            i64::try_from(value).map_err(|_| Error::invalid_value(Unexpected::Unsigned(value), &self))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            value
                .trim()
                .parse()
                .map_err(|_| Error::invalid_value(Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(I64Visitor)
}

// 可选数字过滤参数（查询字符串中的值都是字符串）
pub(crate) fn deserialize_optional_string_to_i64<'de, D>(
    deserializer: D,
) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        Text(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid integer: '{s}'"))),
    }
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::web::Query;

    #[test]
    fn test_last_page_has_no_next() {
        let info = PaginationInfo::new(3, 10, 25);
        assert_eq!(info.total_pages, 3);
        assert!(!info.has_next);
        assert!(info.has_prev);
    }

    #[test]
    fn test_middle_page() {
        let info = PaginationInfo::new(2, 10, 25);
        assert!(info.has_next);
        assert!(info.has_prev);
    }

    #[test]
    fn test_exact_multiple() {
        let info = PaginationInfo::new(2, 10, 20);
        assert_eq!(info.total_pages, 2);
        assert!(!info.has_next);
    }

    #[test]
    fn test_empty_result() {
        let info = PaginationInfo::new(1, 10, 0);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next);
        assert!(!info.has_prev);
    }

    #[test]
    fn test_query_accepts_strings_and_alias() {
        let query = Query::<PaginationQuery>::from_query("page=2&size=500")
            .expect("query should parse")
            .into_inner();
        assert_eq!(query.page(), 2);
        assert_eq!(query.page_size(), MAX_PAGE_SIZE);

        let query = Query::<PaginationQuery>::from_query("page=0&page_size=5")
            .expect("query should parse")
            .into_inner();
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), 5);
    }

    #[test]
    fn test_query_defaults() {
        let query = Query::<PaginationQuery>::from_query("")
            .expect("query should parse")
            .into_inner();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 10);
    }
}
