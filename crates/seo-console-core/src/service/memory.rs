//! In-memory [`ResourceService`] for tests and offline use.
//!
//! Records live in a `Vec` behind `std::sync::RwLock`, in insertion order.
//! Listing applies [`LocalResource::matches`], sorts by
//! [`LocalResource::sort_key`] when `sort_by` is set, and slices out the
//! requested page. New records get a UUID v4 identifier.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use super::{CallResult, CollaboratorError, ResourceService};
use crate::resource::{page_count, ListQuery, LocalResource, Page, SortOrder};

pub struct InMemoryService<T: LocalResource> {
    records: RwLock<Vec<T>>,
}

impl<T: LocalResource> InMemoryService<T> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    /// Apply `f` to one record in place and return the updated copy.
    ///
    /// Serves feature-specific actions (rerun, retry) offline.
    pub fn modify(&self, id: &str, f: impl FnOnce(&mut T)) -> CallResult<T> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        f(record);
        Ok(record.clone())
    }

    fn not_found(id: &str) -> CollaboratorError {
        CollaboratorError::new(format!("{} not found: {}", T::SINGULAR, id)).with_status(404)
    }
}

impl<T: LocalResource> Default for InMemoryService<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: LocalResource> ResourceService<T> for InMemoryService<T> {
    async fn list(&self, query: &ListQuery) -> CallResult<Page<T>> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut matched: Vec<&T> = records.iter().filter(|r| r.matches(&query.filters)).collect();

        if let Some(ref field) = query.filters.sort_by {
            matched.sort_by(|a, b| {
                let ord = match (a.sort_key(field), b.sort_key(field)) {
                    (Some(x), Some(y)) => x.compare(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                };
                match query.filters.sort_order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        let limit = query.limit.max(1);
        let page = query.page.max(1);
        let total = matched.len() as u64;
        let start = (page as usize - 1).saturating_mul(limit as usize);
        let items = matched
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(Page {
            items,
            total,
            page,
            limit,
            total_pages: Some(page_count(total, limit)),
        })
    }

    async fn create(&self, draft: &T::Draft) -> CallResult<T> {
        let record = T::from_draft(uuid::Uuid::new_v4().to_string(), draft);
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, patch: &T::Patch) -> CallResult<T> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        record.apply_patch(patch);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> CallResult<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn bulk_create(&self, drafts: &[T::Draft]) -> CallResult<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        for draft in drafts {
            records.push(T::from_draft(uuid::Uuid::new_v4().to_string(), draft));
        }
        Ok(())
    }

    async fn bulk_update(&self, patches: &[(String, T::Patch)]) -> CallResult<()> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if let Some((missing, _)) = patches
            .iter()
            .find(|(id, _)| !records.iter().any(|r| r.id() == id))
        {
            return Err(Self::not_found(missing));
        }
        for (id, patch) in patches {
            if let Some(record) = records.iter_mut().find(|r| r.id() == id) {
                record.apply_patch(patch);
            }
        }
        Ok(())
    }

    async fn bulk_delete(&self, ids: &[String]) -> CallResult<()> {
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|r| !doomed.contains(r.id()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Filters, Resource, SortKey, Validate};
    use serde::Serialize;

    #[derive(Debug, Clone, PartialEq)]
    struct Term {
        id: String,
        text: String,
        volume: u32,
        status: String,
    }

    #[derive(Debug, Clone, Serialize)]
    struct TermDraft {
        text: String,
        volume: u32,
    }
    impl Validate for TermDraft {}

    #[derive(Debug, Clone, Serialize)]
    struct TermPatch {
        status: String,
    }
    impl Validate for TermPatch {}

    impl Resource for Term {
        type Draft = TermDraft;
        type Patch = TermPatch;
        const SINGULAR: &'static str = "term";
        const PLURAL: &'static str = "terms";

        fn id(&self) -> &str {
            &self.id
        }
    }

    impl LocalResource for Term {
        fn from_draft(id: String, draft: &TermDraft) -> Self {
            Term {
                id,
                text: draft.text.clone(),
                volume: draft.volume,
                status: "active".into(),
            }
        }

        fn apply_patch(&mut self, patch: &TermPatch) {
            self.status = patch.status.clone();
        }

        fn search_text(&self) -> String {
            self.text.clone()
        }

        fn status(&self) -> Option<&str> {
            Some(&self.status)
        }

        fn sort_key(&self, field: &str) -> Option<SortKey> {
            match field {
                "volume" => Some(SortKey::Int(i64::from(self.volume))),
                "text" => Some(SortKey::Text(self.text.clone())),
                _ => None,
            }
        }
    }

    fn term(id: &str, text: &str, volume: u32) -> Term {
        Term {
            id: id.into(),
            text: text.into(),
            volume,
            status: "active".into(),
        }
    }

    fn query(page: u32, limit: u32, filters: Filters) -> ListQuery {
        ListQuery {
            page,
            limit,
            filters,
        }
    }

    fn seeded() -> InMemoryService<Term> {
        InMemoryService::with_records(vec![
            term("1", "running shoes", 900),
            term("2", "trail shoes", 300),
            term("3", "rain jacket", 1200),
            term("4", "Shoe laces", 50),
        ])
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let svc = seeded();
        let page = svc.list(&query(2, 3, Filters::default())).await.unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.total_pages, Some(2));
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "4");
    }

    #[tokio::test]
    async fn test_list_filters_case_insensitive() {
        let svc = seeded();
        let filters = Filters {
            search: Some("SHOE".into()),
            ..Default::default()
        };
        let page = svc.list(&query(1, 10, filters)).await.unwrap();
        let ids: Vec<&str> = page.items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "4"]);
    }

    #[tokio::test]
    async fn test_list_sorts_desc() {
        let svc = seeded();
        let filters = Filters {
            sort_by: Some("volume".into()),
            sort_order: SortOrder::Desc,
            ..Default::default()
        };
        let page = svc.list(&query(1, 10, filters)).await.unwrap();
        let volumes: Vec<u32> = page.items.iter().map(|t| t.volume).collect();
        assert_eq!(volumes, vec![1200, 900, 300, 50]);
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let svc: InMemoryService<Term> = InMemoryService::new();
        let created = svc
            .create(&TermDraft {
                text: "seo audit".into(),
                volume: 10,
            })
            .await
            .unwrap();
        assert_eq!(svc.len(), 1);

        let updated = svc
            .update(
                &created.id,
                &TermPatch {
                    status: "paused".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, "paused");

        svc.delete(&created.id).await.unwrap();
        assert!(svc.is_empty());
        let err = svc.delete(&created.id).await.unwrap_err();
        assert_eq!(err.status, Some(404));
    }

    #[tokio::test]
    async fn test_bulk_update_is_all_or_nothing() {
        let svc = seeded();
        let patch = TermPatch {
            status: "archived".into(),
        };
        let err = svc
            .bulk_update(&[("1".into(), patch.clone()), ("nope".into(), patch.clone())])
            .await
            .unwrap_err();
        assert_eq!(err.status, Some(404));
        assert_eq!(svc.get("1").unwrap().status, "active");

        svc.bulk_update(&[("1".into(), patch)]).await.unwrap();
        assert_eq!(svc.get("1").unwrap().status, "archived");
    }

    #[test]
    fn test_modify_in_place() {
        let svc = seeded();
        let changed = svc.modify("2", |t| t.status = "queued".into()).unwrap();
        assert_eq!(changed.status, "queued");
        assert_eq!(svc.get("2").unwrap().status, "queued");
        assert_eq!(svc.modify("9", |_| {}).unwrap_err().status, Some(404));
    }

    #[tokio::test]
    async fn test_bulk_delete() {
        let svc = seeded();
        svc.bulk_delete(&["1".into(), "3".into(), "ghost".into()])
            .await
            .unwrap();
        assert_eq!(svc.len(), 2);
        assert!(svc.get("3").is_none());
    }
}
