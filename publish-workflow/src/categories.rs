use publisher_core::{Category, CoreError, EndpointConfig};
use std::fmt;
use tracing::info;

use crate::site::Site;

/// Categories exactly as the site returned them, in server order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryList {
    categories: Vec<Category>,
}

impl CategoryList {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// One `id<TAB>name` line per category.
    pub fn format(&self) -> String {
        self.categories
            .iter()
            .map(|category| format!("{}\t{}", category.id, category.name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for CategoryList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl Site {
    pub async fn list_categories(&self) -> Result<CategoryList, CoreError> {
        self.validate()?;
        let client = self.connect()?;
        let categories = client.list_categories().await?;
        info!("Listed {} categories", categories.len());
        Ok(CategoryList::new(categories))
    }
}

pub async fn list_categories(config: EndpointConfig) -> Result<CategoryList, CoreError> {
    Site::new(config).list_categories().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let list = CategoryList::new(vec![
            Category {
                id: 1,
                name: "Uncategorized".to_string(),
            },
            Category {
                id: 12,
                name: "Rust & Systems".to_string(),
            },
        ]);
        assert_eq!(list.format(), "1\tUncategorized\n12\tRust & Systems");
        assert_eq!(list.to_string(), list.format());
    }

    #[test]
    fn test_format_empty() {
        let list = CategoryList::new(Vec::new());
        assert!(list.is_empty());
        assert_eq!(list.format(), "");
    }
}
