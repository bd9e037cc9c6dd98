//! Knowledge Base Models (知识库)
//!
//! Categories form a tree through `parent_id`. The tree is held as an arena
//! ([`CategoryTree`]) keyed by id; traversal always goes through lookups, no
//! node owns its children.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Knowledge category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct KnowledgeCategory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct KnowledgeCategoryInput {
    #[validate(length(min = 1, max = 100, message = "请输入分类名称"))]
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
}

/// Knowledge article
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct KnowledgeArticle {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category_id: Option<i64>,
    pub author_id: i64,
    pub publish_time: i64,
    pub update_time: i64,
    pub is_published: bool,
    pub view_count: i64,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct KnowledgeArticleInput {
    #[validate(length(min = 1, max = 255, message = "请输入文章标题"))]
    pub title: String,
    #[validate(length(min = 1, message = "请输入文章内容"))]
    pub content: String,
    pub category_id: Option<i64>,
    pub tags: Option<String>,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

fn default_published() -> bool {
    true
}

/// Knowledge base home
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeHome {
    pub categories: Vec<KnowledgeCategory>,
    pub recent_articles: Vec<KnowledgeArticle>,
}

/// Category page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeCategoryPage {
    pub category: KnowledgeCategory,
    /// Root first, excluding the category itself
    pub breadcrumb: Vec<KnowledgeCategory>,
    pub subcategories: Vec<KnowledgeCategory>,
    pub articles: Vec<KnowledgeArticle>,
}

/// Arena of categories keyed by id
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: HashMap<i64, KnowledgeCategory>,
}

impl CategoryTree {
    pub fn new(categories: impl IntoIterator<Item = KnowledgeCategory>) -> Self {
        Self {
            nodes: categories.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn get(&self, id: i64) -> Option<&KnowledgeCategory> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Categories without a parent, ordered by id
    pub fn roots(&self) -> Vec<&KnowledgeCategory> {
        self.sorted(|c| c.parent_id.is_none())
    }

    /// Direct children of `id`, ordered by id
    pub fn children(&self, id: i64) -> Vec<&KnowledgeCategory> {
        self.sorted(|c| c.parent_id == Some(id))
    }

    /// Ancestors of `id`, root first
    ///
    /// Stops on a dangling parent reference or a corrupted (cyclic) chain.
    pub fn ancestors(&self, id: i64) -> Vec<&KnowledgeCategory> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut cursor = self.get(id).and_then(|c| c.parent_id);

        while let Some(parent_id) = cursor {
            if !seen.insert(parent_id) {
                break;
            }
            match self.get(parent_id) {
                Some(parent) => {
                    chain.push(parent);
                    cursor = parent.parent_id;
                }
                None => break,
            }
        }

        chain.reverse();
        chain
    }

    /// Whether re-parenting `id` under `new_parent` would close a loop
    pub fn would_create_cycle(&self, id: i64, new_parent: Option<i64>) -> bool {
        let Some(parent_id) = new_parent else {
            return false;
        };
        if parent_id == id {
            return true;
        }
        self.ancestors(parent_id).iter().any(|c| c.id == id)
    }

    fn sorted(&self, pred: impl Fn(&KnowledgeCategory) -> bool) -> Vec<&KnowledgeCategory> {
        let mut out: Vec<_> = self.nodes.values().filter(|c| pred(c)).collect();
        out.sort_by_key(|c| c.id);
        out
    }
}
