use crate::StoreError;
use hireflow_schema::{EmployeeId, HiringState, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::{Deserialize, Serialize};

/// Business attributes of an employee. Opaque to the workflow.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeRecord {
    pub id: EmployeeId,
    pub status: HiringState,
    #[serde(default)]
    pub attributes: Attributes,
    pub created_at: String,
    pub updated_at: String,
    /// blake3 checksum for integrity verification. Only set on stored copies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl EmployeeRecord {
    pub fn new(id: EmployeeId, status: HiringState, attributes: Attributes) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id,
            status,
            attributes,
            created_at: now.clone(),
            updated_at: now,
            checksum: None,
        }
    }

    /// A copy of this record moved to `status`, with a fresh `updated_at`.
    #[must_use]
    pub fn with_status(&self, status: HiringState) -> Self {
        let mut next = self.clone();
        next.status = status;
        next.updated_at = chrono::Utc::now().to_rfc3339();
        next.checksum = None;
        next
    }

    /// Compute the checksum over the record content (excluding the checksum field itself).
    pub(crate) fn compute_checksum(&self) -> Result<String, StoreError> {
        let mut copy = self.clone();
        copy.checksum = None;
        let json = serde_json::to_string_pretty(&copy)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    pub(crate) fn verify_checksum(&self) -> Result<(), StoreError> {
        if let Some(ref expected) = self.checksum {
            let actual = self.compute_checksum()?;
            if actual != *expected {
                return Err(StoreError::IntegrityFailure {
                    id: self.id,
                    expected: expected.clone(),
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// Zero-based page selector. `size` is clamped to `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total: usize,
}

impl<T> Page<T> {
    /// Cut the requested page out of an already ordered collection.
    pub fn from_sorted(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(request.size)
            .collect();
        Self {
            items,
            page: request.page,
            size: request.size,
            total,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EmployeeRecord {
        let mut attributes = Attributes::new();
        attributes.insert("name".to_owned(), serde_json::json!("Ada Lovelace"));
        EmployeeRecord::new(EmployeeId::new(1), HiringState::Added, attributes)
    }

    #[test]
    fn with_status_keeps_identity_and_attributes() {
        let record = sample();
        let next = record.with_status(HiringState::InCheck);
        assert_eq!(next.id, record.id);
        assert_eq!(next.status, HiringState::InCheck);
        assert_eq!(next.attributes, record.attributes);
        assert_eq!(next.created_at, record.created_at);
        assert_eq!(record.status, HiringState::Added);
    }

    #[test]
    fn checksum_detects_tampering() {
        let mut record = sample();
        record.checksum = Some(record.compute_checksum().unwrap());
        record.verify_checksum().unwrap();

        record.status = HiringState::Approved;
        assert!(matches!(
            record.verify_checksum(),
            Err(StoreError::IntegrityFailure { .. })
        ));
    }

    #[test]
    fn missing_checksum_is_accepted() {
        sample().verify_checksum().unwrap();
    }

    #[test]
    fn page_request_clamps_size() {
        assert_eq!(PageRequest::new(0, 0).size, 1);
        assert_eq!(PageRequest::new(0, 10_000).size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::default().size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn page_from_sorted_slices() {
        let page = Page::from_sorted((1..=7).collect::<Vec<_>>(), PageRequest::new(1, 3));
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = Page::from_sorted(vec![1, 2], PageRequest::new(5, 2));
        assert!(page.items.is_empty());
        assert_eq!(page.total, 2);
    }

    #[test]
    fn attributes_default_when_absent() {
        let json = r#"{
            "id": 9,
            "status": "IN_CHECK",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }"#;
        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert!(record.attributes.is_empty());
        assert_eq!(record.status, HiringState::InCheck);
        assert!(record.checksum.is_none());
    }
}
